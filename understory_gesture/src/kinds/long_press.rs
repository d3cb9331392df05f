// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;

use super::beyond;
use crate::{EventClass, EventKind, GestureConfig, GestureKind, GestureState, InputEvent};

/// A press held in place.
///
/// Begins once the press has lasted the minimum duration without moving more
/// than the allowable movement, changes on drags after that, and ends on
/// release. Time is observed through
/// [`GestureEngine::tick`](crate::GestureEngine::tick) or any later event.
#[derive(Clone, Debug)]
pub struct LongPress {
    duration: u64,
    movement: f64,
    buttons: EventClass,
    pressed: Option<(Point, u64)>,
}

impl Default for LongPress {
    fn default() -> Self {
        Self::new()
    }
}

impl LongPress {
    /// A primary-button long press with default thresholds.
    pub fn new() -> Self {
        Self::from_config(&GestureConfig::default())
    }

    /// A primary-button long press with thresholds from `config`.
    pub fn from_config(config: &GestureConfig) -> Self {
        Self {
            duration: config.long_press_duration,
            movement: config.long_press_movement,
            buttons: EventClass::PRIMARY_MOUSE,
            pressed: None,
        }
    }

    /// Set the minimum press duration in milliseconds.
    #[must_use]
    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    /// The minimum press duration in milliseconds.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    fn held_long_enough(&self, now: u64) -> bool {
        self.pressed
            .is_some_and(|(_, t)| now.saturating_sub(t) >= self.duration)
    }
}

impl GestureKind for LongPress {
    fn interest(&self) -> EventClass {
        self.buttons
    }

    fn process(&mut self, event: &InputEvent, state: GestureState) -> Option<GestureState> {
        match event.kind {
            EventKind::MouseDown(_) => {
                if self.pressed.is_some() {
                    return None;
                }
                self.pressed = Some((event.location, event.time));
                None
            }
            EventKind::MouseDragged(_) => {
                let (origin, _) = self.pressed?;
                if state.is_active() {
                    Some(GestureState::Changed)
                } else if beyond(origin, event.location, self.movement) {
                    Some(GestureState::Failed)
                } else {
                    self.held_long_enough(event.time)
                        .then_some(GestureState::Began)
                }
            }
            EventKind::MouseUp(_) => {
                self.pressed?;
                if state.is_active() || self.held_long_enough(event.time) {
                    Some(GestureState::Ended)
                } else {
                    Some(GestureState::Failed)
                }
            }
            _ => None,
        }
    }

    fn tick(&mut self, now: u64, state: GestureState) -> Option<GestureState> {
        (state == GestureState::Possible && self.held_long_enough(now))
            .then_some(GestureState::Began)
    }

    fn reset(&mut self) {
        self.pressed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MouseButton;

    const P: GestureState = GestureState::Possible;

    #[test]
    fn begins_after_the_duration() {
        let mut press = LongPress::new();
        let down = InputEvent::mouse_down(MouseButton::Primary, Point::ZERO, 0);
        assert_eq!(press.process(&down, P), None);
        assert_eq!(press.tick(499, P), None);
        assert_eq!(press.tick(500, P), Some(GestureState::Began));
        let up = InputEvent::mouse_up(MouseButton::Primary, Point::ZERO, 700);
        assert_eq!(
            press.process(&up, GestureState::Began),
            Some(GestureState::Ended)
        );
    }

    #[test]
    fn early_release_or_movement_fails() {
        let mut press = LongPress::new().with_duration(300);
        assert_eq!(press.duration(), 300);
        let down = InputEvent::mouse_down(MouseButton::Primary, Point::ZERO, 0);
        press.process(&down, P);
        let up = InputEvent::mouse_up(MouseButton::Primary, Point::ZERO, 100);
        assert_eq!(press.process(&up, P), Some(GestureState::Failed));

        press.reset();
        press.process(&down, P);
        let drag = InputEvent::mouse_dragged(MouseButton::Primary, Point::new(30.0, 0.0), 50);
        assert_eq!(press.process(&drag, P), Some(GestureState::Failed));
    }
}
