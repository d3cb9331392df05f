// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recognizer states and the transition table shared by every gesture kind.
//!
//! A recognizer starts in [`GestureState::Possible`]. Within one attempt it
//! moves forward only:
//!
//! ```text
//! Possible ─┬─> Began ─> Changed* ─┬─> Ended
//!           │                      └─> Cancelled
//!           ├─> Ended   (discrete gestures)
//!           └─> Failed
//! ```
//!
//! Kinds request a state; [`GestureState::advance`] decides what that request
//! means from the current state.

/// The state of a gesture recognizer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum GestureState {
    /// Not yet recognized; still consuming events.
    #[default]
    Possible,
    /// A continuous gesture was recognized and has started.
    Began,
    /// A continuous gesture produced an update.
    Changed,
    /// The gesture finished successfully.
    ///
    /// This is also the recognized state of discrete gestures, see
    /// [`GestureState::RECOGNIZED`].
    Ended,
    /// A continuous gesture was interrupted after it began.
    Cancelled,
    /// The input did not match the gesture.
    Failed,
}

impl GestureState {
    /// Alias for [`GestureState::Ended`], the recognized state of discrete gestures.
    pub const RECOGNIZED: Self = Self::Ended;

    /// Returns `true` for [`Ended`](Self::Ended), [`Cancelled`](Self::Cancelled)
    /// and [`Failed`](Self::Failed).
    ///
    /// Terminal recognizers receive no events until they are reset.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled | Self::Failed)
    }

    /// Returns `true` while a continuous gesture is in progress.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Began | Self::Changed)
    }

    /// Returns `true` once the recognizer has left `Possible` successfully.
    pub const fn is_recognized(self) -> bool {
        matches!(self, Self::Began | Self::Changed | Self::Ended)
    }

    /// Resolve a requested state against the current one.
    ///
    /// Returns the state the recognizer moves to, or `None` when the request
    /// does not change anything (including every request made in a terminal
    /// state).
    ///
    /// Requests that would break monotonicity are normalised:
    /// - `Possible` → `Cancelled` becomes `Failed` (nothing began).
    /// - `Began` while already active becomes `Changed`.
    /// - `Changed` from `Possible` becomes `Began`.
    /// - `Failed` while active becomes `Cancelled`.
    ///
    /// ```
    /// use understory_gesture::GestureState;
    ///
    /// assert_eq!(GestureState::Possible.advance(GestureState::Changed), Some(GestureState::Began));
    /// assert_eq!(GestureState::Began.advance(GestureState::Failed), Some(GestureState::Cancelled));
    /// assert_eq!(GestureState::Ended.advance(GestureState::Began), None);
    /// ```
    pub const fn advance(self, requested: Self) -> Option<Self> {
        match self {
            Self::Possible => match requested {
                Self::Possible => None,
                Self::Began | Self::Changed => Some(Self::Began),
                Self::Ended => Some(Self::Ended),
                Self::Cancelled | Self::Failed => Some(Self::Failed),
            },
            Self::Began | Self::Changed => match requested {
                Self::Possible => None,
                Self::Began | Self::Changed => Some(Self::Changed),
                Self::Ended => Some(Self::Ended),
                Self::Cancelled | Self::Failed => Some(Self::Cancelled),
            },
            Self::Ended | Self::Cancelled | Self::Failed => None,
        }
    }

    /// Returns `true` when entering this state invokes the action target.
    pub(crate) const fn fires_action(self) -> bool {
        self.is_recognized()
    }
}

#[cfg(test)]
mod tests {
    use super::GestureState::{self, *};
    use alloc::vec;
    use alloc::vec::Vec;

    const ALL: [GestureState; 6] = [Possible, Began, Changed, Ended, Cancelled, Failed];

    #[test]
    fn terminal_states_ignore_every_request() {
        for from in [Ended, Cancelled, Failed] {
            for to in ALL {
                assert_eq!(from.advance(to), None, "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn possible_never_moves_to_cancelled() {
        assert_eq!(Possible.advance(Cancelled), Some(Failed));
        assert_eq!(Possible.advance(Failed), Some(Failed));
        assert_eq!(Possible.advance(Possible), None);
    }

    #[test]
    fn discrete_gestures_jump_straight_to_ended() {
        assert_eq!(Possible.advance(Ended), Some(Ended));
        assert_eq!(RECOGNIZED_ALIAS, Ended);
    }

    const RECOGNIZED_ALIAS: GestureState = GestureState::RECOGNIZED;

    #[test]
    fn active_gestures_only_move_forward() {
        for from in [Began, Changed] {
            assert_eq!(from.advance(Began), Some(Changed));
            assert_eq!(from.advance(Changed), Some(Changed));
            assert_eq!(from.advance(Ended), Some(Ended));
            assert_eq!(from.advance(Failed), Some(Cancelled));
            assert_eq!(from.advance(Possible), None);
        }
    }

    #[test]
    fn only_recognized_states_fire() {
        let firing: Vec<_> = ALL.into_iter().filter(|s| s.fires_action()).collect();
        assert_eq!(firing, vec![Began, Changed, Ended]);
    }
}
