// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The extension point for per-gesture transition logic.
//!
//! A [`GestureKind`] looks at one event at a time and asks for a state. The
//! engine owns the recognizer's actual [`GestureState`] and decides whether the
//! request is granted: arbitration may suspend, fail or cancel it. Kinds
//! therefore keep their own progress (press location, click count, translation)
//! and must tolerate having requests ignored.
//!
//! ## Minimal example
//!
//! ```
//! use understory_gesture::{EventClass, EventKind, GestureKind, GestureState, InputEvent};
//!
//! /// Recognizes any key press.
//! #[derive(Debug, Default)]
//! struct AnyKey;
//!
//! impl GestureKind for AnyKey {
//!     fn interest(&self) -> EventClass {
//!         EventClass::KEY
//!     }
//!
//!     fn process(&mut self, event: &InputEvent, _state: GestureState) -> Option<GestureState> {
//!         matches!(event.kind, EventKind::KeyDown { .. }).then_some(GestureState::Ended)
//!     }
//! }
//! ```

use core::any::Any;
use core::fmt;

use crate::{EventClass, GestureState, InputEvent};

/// A view of another recognizer offered to the arbitration overrides of
/// [`GestureKind`].
#[derive(Copy, Clone)]
pub struct Peer<'a> {
    /// The other recognizer's kind; downcast through [`Any`] to inspect it.
    pub kind: &'a dyn GestureKind,
    /// The other recognizer's current state.
    pub state: GestureState,
    /// Whether both recognizers are attached to the same view.
    pub same_view: bool,
}

impl Peer<'_> {
    /// Returns `true` if the other recognizer is of kind `T`.
    pub fn is<T: GestureKind>(&self) -> bool {
        let any: &dyn Any = self.kind;
        any.is::<T>()
    }
}

impl fmt::Debug for Peer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Peer")
            .field("kind", &self.kind.name())
            .field("state", &self.state)
            .field("same_view", &self.same_view)
            .finish()
    }
}

/// Per-gesture transition logic.
///
/// Only [`process`](Self::process) is required. Everything else has a default
/// matching a plain recognizer that competes exclusively with its peers.
pub trait GestureKind: Any + fmt::Debug {
    /// Consume one event and return the requested next state, if any.
    ///
    /// `state` is the recognizer's current state as granted by the engine.
    /// Terminal recognizers are never called.
    fn process(&mut self, event: &InputEvent, state: GestureState) -> Option<GestureState>;

    /// Observe the passage of time without an event.
    ///
    /// Called by [`GestureEngine::tick`](crate::GestureEngine::tick) for
    /// participants that are not terminal. `now` uses the same clock as
    /// [`InputEvent::time`].
    fn tick(&mut self, now: u64, state: GestureState) -> Option<GestureState> {
        let _ = (now, state);
        None
    }

    /// Forget all progress; called whenever the recognizer returns to
    /// [`GestureState::Possible`].
    fn reset(&mut self) {}

    /// The event classes this kind consumes.
    ///
    /// Recognizers only join attempts for, and only receive, events in these
    /// classes.
    fn interest(&self) -> EventClass {
        EventClass::all()
    }

    /// Short name used in logs and [`GestureInfo`](crate::GestureInfo).
    fn name(&self) -> &'static str {
        let full = core::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Whether this recognizer, once recognized, prevents `other` from
    /// recognizing.
    fn can_prevent(&self, other: &Peer<'_>) -> bool {
        let _ = other;
        true
    }

    /// Whether `other`, once recognized, may prevent this recognizer.
    fn can_be_prevented_by(&self, other: &Peer<'_>) -> bool {
        let _ = other;
        true
    }

    /// Whether this recognizer must wait for `other` to fail before it may
    /// leave [`GestureState::Possible`].
    fn should_require_failure_of(&self, other: &Peer<'_>) -> bool {
        let _ = other;
        false
    }

    /// Whether `other` must wait for this recognizer to fail.
    fn should_be_required_to_fail_by(&self, other: &Peer<'_>) -> bool {
        let _ = other;
        false
    }
}
