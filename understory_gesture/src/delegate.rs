// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Callback surfaces: delegates that arbitrate, and targets that act.
//!
//! Both are held by the engine as [`Weak`](alloc::rc::Weak) references; the
//! caller owns them. A dropped delegate is treated as absent and a dropped
//! target simply receives nothing. The engine clears the dead reference on
//! its next pass.
//!
//! Every delegate hook returns `Option<bool>`, where `None` means "no opinion"
//! and falls through to the other recognizer's delegate and then to the
//! default policy.

use kurbo::Point;

use crate::engine::ActionContext;
use crate::{GestureState, InputEvent, RecognizerId};

/// A snapshot of a recognizer handed to delegates and targets.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GestureInfo<V> {
    /// The recognizer.
    pub id: RecognizerId,
    /// The view it is attached to.
    pub view: V,
    /// Its state at the time of the call.
    pub state: GestureState,
    /// [`GestureKind::name`](crate::GestureKind::name) of its kind.
    pub kind: &'static str,
    /// Location of the last event it consumed, in window coordinates.
    pub location: Point,
}

/// Opaque action handle passed back to an [`ActionTarget`].
///
/// Plays the role of a selector: one target can serve several recognizers and
/// tell them apart by action.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Action(pub u32);

/// Receives a recognizer's action.
///
/// Invoked when the recognizer enters [`GestureState::Began`], on every
/// [`GestureState::Changed`], and on [`GestureState::Ended`]. Never for
/// `Possible`, `Cancelled` or `Failed`.
///
/// Closures with the same signature implement this trait.
pub trait ActionTarget<V> {
    /// Perform `action` for the recognizer described by `gesture`.
    fn perform(&self, action: Action, gesture: &GestureInfo<V>, cx: &mut ActionContext<'_, V>);
}

impl<V, F> ActionTarget<V> for F
where
    F: Fn(Action, &GestureInfo<V>, &mut ActionContext<'_, V>),
{
    fn perform(&self, action: Action, gesture: &GestureInfo<V>, cx: &mut ActionContext<'_, V>) {
        self(action, gesture, cx);
    }
}

/// Optional arbitration hooks for a recognizer.
///
/// Hooks are queried whenever a decision is made, never cached, so answers may
/// depend on application state. They run synchronously on the dispatching
/// thread and cannot reach the engine.
pub trait GestureDelegate<V> {
    /// Whether `recognizer` should take part in the attempt that `event` opens.
    ///
    /// `Some(false)` keeps it out of the attempt; it stays `Possible`.
    fn should_attempt(&self, recognizer: &GestureInfo<V>, event: &InputEvent) -> Option<bool> {
        let _ = (recognizer, event);
        None
    }

    /// Whether `recognizer` may leave `Possible`.
    ///
    /// `Some(false)` fails it.
    fn should_begin(&self, recognizer: &GestureInfo<V>) -> Option<bool> {
        let _ = recognizer;
        None
    }

    /// Whether `recognizer` and `other` may be recognized at the same time.
    fn should_recognize_simultaneously(
        &self,
        recognizer: &GestureInfo<V>,
        other: &GestureInfo<V>,
    ) -> Option<bool> {
        let _ = (recognizer, other);
        None
    }

    /// Whether `recognizer` must wait for `other` to fail.
    fn should_require_failure_of(
        &self,
        recognizer: &GestureInfo<V>,
        other: &GestureInfo<V>,
    ) -> Option<bool> {
        let _ = (recognizer, other);
        None
    }

    /// Whether `other` must wait for `recognizer` to fail.
    fn should_be_required_to_fail_by(
        &self,
        recognizer: &GestureInfo<V>,
        other: &GestureInfo<V>,
    ) -> Option<bool> {
        let _ = (recognizer, other);
        None
    }
}

/// Run a delegate hook.
///
/// With the `std` feature a panicking hook counts as "no opinion".
pub(crate) fn consult(hook: impl FnOnce() -> Option<bool>) -> Option<bool> {
    #[cfg(feature = "std")]
    {
        match std::panic::catch_unwind(core::panic::AssertUnwindSafe(hook)) {
            Ok(answer) => answer,
            Err(_) => {
                tracing::warn!("gesture delegate panicked; treating it as no opinion");
                None
            }
        }
    }
    #[cfg(not(feature = "std"))]
    {
        hook()
    }
}

#[cfg(test)]
mod tests {
    use super::consult;

    #[test]
    fn answers_pass_through() {
        assert_eq!(consult(|| Some(true)), Some(true));
        assert_eq!(consult(|| None), None);
    }

    #[cfg(feature = "std")]
    #[test]
    fn panics_become_no_opinion() {
        assert_eq!(consult(|| panic!("delegate bug")), None);
    }
}
