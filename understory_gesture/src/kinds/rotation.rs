// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::f64::consts::PI;

use crate::{EventClass, EventKind, GestureConfig, GestureKind, GestureState, InputEvent, TouchPhase};

/// A trackpad rotation.
///
/// Begins once the accumulated rotation exceeds the threshold and ends with the
/// rotate sequence. Positive angles are counterclockwise.
#[derive(Clone, Debug)]
pub struct Rotation {
    threshold: f64,
    degrees: f64,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::new()
    }
}

impl Rotation {
    /// A rotation with the default threshold.
    pub fn new() -> Self {
        Self::from_config(&GestureConfig::default())
    }

    /// A rotation with the threshold from `config`.
    pub fn from_config(config: &GestureConfig) -> Self {
        Self {
            threshold: config.rotation_threshold,
            degrees: 0.0,
        }
    }

    /// Accumulated rotation in radians.
    pub fn rotation(&self) -> f64 {
        self.degrees * PI / 180.0
    }

    /// Accumulated rotation in degrees.
    pub fn rotation_in_degrees(&self) -> f64 {
        self.degrees
    }
}

impl GestureKind for Rotation {
    fn interest(&self) -> EventClass {
        EventClass::ROTATE
    }

    fn process(&mut self, event: &InputEvent, state: GestureState) -> Option<GestureState> {
        let EventKind::Rotate { delta, phase } = event.kind else {
            return None;
        };
        match phase {
            TouchPhase::Started | TouchPhase::Moved => {
                self.degrees += delta;
                if state.is_active() {
                    Some(GestureState::Changed)
                } else {
                    (self.degrees.abs() >= self.threshold).then_some(GestureState::Began)
                }
            }
            TouchPhase::Ended if state.is_active() => Some(GestureState::Ended),
            TouchPhase::Ended => Some(GestureState::Failed),
            TouchPhase::Cancelled => Some(GestureState::Cancelled),
        }
    }

    fn reset(&mut self) {
        self.degrees = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn reports_degrees_and_radians() {
        let mut rotation = Rotation::new();
        let event = InputEvent::new(
            EventKind::Rotate {
                delta: 90.0,
                phase: TouchPhase::Started,
            },
            Point::ZERO,
            0,
        );
        assert_eq!(
            rotation.process(&event, GestureState::Possible),
            Some(GestureState::Began)
        );
        assert_eq!(rotation.rotation_in_degrees(), 90.0);
        assert!((rotation.rotation() - PI / 2.0).abs() < 1e-12);
        rotation.reset();
        assert_eq!(rotation.rotation_in_degrees(), 0.0);
    }
}
