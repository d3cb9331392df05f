// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;

use super::beyond;
use crate::{EventClass, EventKind, GestureConfig, GestureKind, GestureState, InputEvent};

/// A discrete click or multi-click.
///
/// Recognizes (`Ended`) on the release that completes the required number of
/// clicks. Fails when a press uses a button outside the mask, when the
/// pointer strays more than the slop from the first press, or when the next
/// press does not come within the multi-click interval.
///
/// The interval timeout is only noticed on the next event or on
/// [`GestureEngine::tick`](crate::GestureEngine::tick).
#[derive(Clone, Debug)]
pub struct Tap {
    clicks_required: u32,
    buttons: EventClass,
    interval: u64,
    slop: f64,
    origin: Option<Point>,
    pressed: bool,
    clicks: u32,
    last_release: Option<u64>,
}

impl Default for Tap {
    fn default() -> Self {
        Self::new()
    }
}

impl Tap {
    /// A single primary-button click with default thresholds.
    pub fn new() -> Self {
        Self::from_config(&GestureConfig::default())
    }

    /// A single primary-button click with thresholds from `config`.
    pub fn from_config(config: &GestureConfig) -> Self {
        Self {
            clicks_required: 1,
            buttons: EventClass::PRIMARY_MOUSE,
            interval: config.multi_click_interval,
            slop: config.tap_slop,
            origin: None,
            pressed: false,
            clicks: 0,
            last_release: None,
        }
    }

    /// Require `clicks` clicks (at least one).
    #[must_use]
    pub fn with_clicks(mut self, clicks: u32) -> Self {
        self.clicks_required = clicks.max(1);
        self
    }

    /// Accept presses of these mouse buttons.
    #[must_use]
    pub fn with_buttons(mut self, buttons: EventClass) -> Self {
        self.buttons = buttons & EventClass::MOUSE;
        self
    }

    /// The number of clicks required.
    pub fn clicks_required(&self) -> u32 {
        self.clicks_required
    }

    /// Clicks completed so far in this attempt.
    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    fn timed_out(&self, now: u64) -> bool {
        !self.pressed
            && self.clicks < self.clicks_required
            && self
                .last_release
                .is_some_and(|t| now.saturating_sub(t) > self.interval)
    }
}

impl GestureKind for Tap {
    fn interest(&self) -> EventClass {
        EventClass::MOUSE
    }

    fn process(&mut self, event: &InputEvent, _state: GestureState) -> Option<GestureState> {
        match event.kind {
            EventKind::MouseDown(button) => {
                if !self.buttons.intersects(button.class()) || self.timed_out(event.time) {
                    return Some(GestureState::Failed);
                }
                let origin = *self.origin.get_or_insert(event.location);
                if beyond(origin, event.location, self.slop) {
                    return Some(GestureState::Failed);
                }
                self.pressed = true;
                None
            }
            EventKind::MouseDragged(_) => {
                let origin = self.origin?;
                (self.pressed && beyond(origin, event.location, self.slop))
                    .then_some(GestureState::Failed)
            }
            EventKind::MouseUp(_) => {
                if !self.pressed {
                    return None;
                }
                self.pressed = false;
                if self
                    .origin
                    .is_some_and(|o| beyond(o, event.location, self.slop))
                {
                    return Some(GestureState::Failed);
                }
                self.clicks += 1;
                self.last_release = Some(event.time);
                (self.clicks >= self.clicks_required).then_some(GestureState::Ended)
            }
            _ => None,
        }
    }

    fn tick(&mut self, now: u64, state: GestureState) -> Option<GestureState> {
        (state == GestureState::Possible && self.timed_out(now)).then_some(GestureState::Failed)
    }

    fn reset(&mut self) {
        self.origin = None;
        self.pressed = false;
        self.clicks = 0;
        self.last_release = None;
    }

    fn name(&self) -> &'static str {
        match self.clicks_required {
            1 => "Tap",
            2 => "DoubleTap",
            _ => "MultiTap",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MouseButton;

    fn down(x: f64, t: u64) -> InputEvent {
        InputEvent::mouse_down(MouseButton::Primary, Point::new(x, 0.0), t)
    }

    fn up(x: f64, t: u64) -> InputEvent {
        InputEvent::mouse_up(MouseButton::Primary, Point::new(x, 0.0), t)
    }

    const P: GestureState = GestureState::Possible;

    #[test]
    fn single_click_ends_on_release() {
        let mut tap = Tap::new();
        assert_eq!(tap.process(&down(0.0, 0), P), None);
        assert_eq!(tap.process(&up(1.0, 40), P), Some(GestureState::Ended));
        assert_eq!(tap.clicks(), 1);
    }

    #[test]
    fn double_click_needs_both_clicks_in_time() {
        let mut tap = Tap::new().with_clicks(2);
        assert_eq!(tap.process(&down(0.0, 0), P), None);
        assert_eq!(tap.process(&up(0.0, 50), P), None);
        assert_eq!(tap.tick(200, P), None);
        assert_eq!(tap.process(&down(0.0, 250), P), None);
        assert_eq!(tap.process(&up(0.0, 300), P), Some(GestureState::Ended));

        tap.reset();
        tap.process(&down(0.0, 0), P);
        tap.process(&up(0.0, 50), P);
        assert_eq!(tap.tick(400, P), Some(GestureState::Failed));
    }

    #[test]
    fn wrong_button_and_travel_fail() {
        let mut tap = Tap::new();
        let right = InputEvent::mouse_down(MouseButton::Secondary, Point::ZERO, 0);
        assert_eq!(tap.process(&right, P), Some(GestureState::Failed));

        let mut tap = Tap::new();
        tap.process(&down(0.0, 0), P);
        let drag = InputEvent::mouse_dragged(MouseButton::Primary, Point::new(20.0, 0.0), 10);
        assert_eq!(tap.process(&drag, P), Some(GestureState::Failed));
    }

    #[test]
    fn names_follow_click_count() {
        assert_eq!(Tap::new().name(), "Tap");
        assert_eq!(Tap::new().with_clicks(2).name(), "DoubleTap");
        assert_eq!(Tap::new().with_clicks(0).clicks_required(), 1);
    }
}
