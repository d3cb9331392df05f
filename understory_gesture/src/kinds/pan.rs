// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Vec2};

use super::beyond;
use crate::{EventClass, EventKind, GestureConfig, GestureKind, GestureState, InputEvent};

/// A continuous drag.
///
/// Begins once the pointer has travelled past the drag threshold from the
/// press, changes on every further drag, and ends on release. Releasing before
/// the threshold fails it.
#[derive(Clone, Debug)]
pub struct Pan {
    threshold: f64,
    buttons: EventClass,
    origin: Option<Point>,
    last: Option<(Point, u64)>,
    translation: Vec2,
    velocity: Vec2,
}

impl Default for Pan {
    fn default() -> Self {
        Self::new()
    }
}

impl Pan {
    /// A primary-button pan with the default drag threshold.
    pub fn new() -> Self {
        Self::from_config(&GestureConfig::default())
    }

    /// A primary-button pan with the drag threshold from `config`.
    pub fn from_config(config: &GestureConfig) -> Self {
        Self {
            threshold: config.drag_threshold,
            buttons: EventClass::PRIMARY_MOUSE,
            origin: None,
            last: None,
            translation: Vec2::ZERO,
            velocity: Vec2::ZERO,
        }
    }

    /// Track drags of these mouse buttons.
    #[must_use]
    pub fn with_buttons(mut self, buttons: EventClass) -> Self {
        self.buttons = buttons & EventClass::MOUSE;
        self
    }

    /// Offset of the pointer from the press location.
    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    /// Pointer velocity between the last two events, in pixels per second.
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Where the drag started.
    pub fn origin(&self) -> Option<Point> {
        self.origin
    }
}

impl GestureKind for Pan {
    fn interest(&self) -> EventClass {
        self.buttons
    }

    fn process(&mut self, event: &InputEvent, state: GestureState) -> Option<GestureState> {
        match event.kind {
            EventKind::MouseDown(_) => {
                if self.origin.is_none() {
                    self.origin = Some(event.location);
                    self.last = Some((event.location, event.time));
                }
                None
            }
            EventKind::MouseDragged(_) => {
                let origin = self.origin?;
                self.translation = event.location - origin;
                if let Some((at, time)) = self.last {
                    let dt = event.time.saturating_sub(time);
                    if dt > 0 {
                        let per_second = 1000.0 / dt as f64;
                        self.velocity = (event.location - at) * per_second;
                    }
                }
                self.last = Some((event.location, event.time));
                match state {
                    GestureState::Possible => beyond(origin, event.location, self.threshold)
                        .then_some(GestureState::Began),
                    _ => Some(GestureState::Changed),
                }
            }
            EventKind::MouseUp(_) => {
                self.origin?;
                if state.is_active() {
                    Some(GestureState::Ended)
                } else {
                    Some(GestureState::Failed)
                }
            }
            _ => None,
        }
    }

    fn reset(&mut self) {
        self.origin = None;
        self.last = None;
        self.translation = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MouseButton;

    fn drag(x: f64, t: u64) -> InputEvent {
        InputEvent::mouse_dragged(MouseButton::Primary, Point::new(x, 0.0), t)
    }

    #[test]
    fn begins_past_the_threshold_then_changes() {
        let mut pan = Pan::new();
        let down = InputEvent::mouse_down(MouseButton::Primary, Point::ZERO, 0);
        assert_eq!(pan.process(&down, GestureState::Possible), None);
        assert_eq!(pan.process(&drag(3.0, 10), GestureState::Possible), None);
        assert_eq!(
            pan.process(&drag(12.0, 20), GestureState::Possible),
            Some(GestureState::Began)
        );
        assert_eq!(
            pan.process(&drag(22.0, 30), GestureState::Began),
            Some(GestureState::Changed)
        );
        assert_eq!(pan.translation(), Vec2::new(22.0, 0.0));
        assert_eq!(pan.velocity(), Vec2::new(1000.0, 0.0));
    }

    #[test]
    fn release_before_threshold_fails() {
        let mut pan = Pan::new();
        let down = InputEvent::mouse_down(MouseButton::Primary, Point::ZERO, 0);
        pan.process(&down, GestureState::Possible);
        let up = InputEvent::mouse_up(MouseButton::Primary, Point::new(2.0, 0.0), 40);
        assert_eq!(
            pan.process(&up, GestureState::Possible),
            Some(GestureState::Failed)
        );
        pan.reset();
        assert_eq!(pan.origin(), None);
        assert_eq!(pan.translation(), Vec2::ZERO);
    }
}
