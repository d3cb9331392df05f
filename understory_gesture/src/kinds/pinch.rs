// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{EventClass, EventKind, GestureConfig, GestureKind, GestureState, InputEvent, TouchPhase};

/// A trackpad magnification.
///
/// Begins once the accumulated magnification exceeds the threshold in either
/// direction and ends with the magnify sequence.
#[derive(Clone, Debug)]
pub struct Pinch {
    threshold: f64,
    magnification: f64,
}

impl Default for Pinch {
    fn default() -> Self {
        Self::new()
    }
}

impl Pinch {
    /// A pinch with the default threshold.
    pub fn new() -> Self {
        Self::from_config(&GestureConfig::default())
    }

    /// A pinch with the threshold from `config`.
    pub fn from_config(config: &GestureConfig) -> Self {
        Self {
            threshold: config.pinch_threshold,
            magnification: 0.0,
        }
    }

    /// Accumulated magnification; `0.0` is unchanged, `1.0` doubled.
    pub fn magnification(&self) -> f64 {
        self.magnification
    }

    /// Scale factor implied by [`magnification`](Self::magnification).
    pub fn scale(&self) -> f64 {
        1.0 + self.magnification
    }
}

impl GestureKind for Pinch {
    fn interest(&self) -> EventClass {
        EventClass::MAGNIFY
    }

    fn process(&mut self, event: &InputEvent, state: GestureState) -> Option<GestureState> {
        let EventKind::Magnify { delta, phase } = event.kind else {
            return None;
        };
        match phase {
            TouchPhase::Started | TouchPhase::Moved => {
                self.magnification += delta;
                if state.is_active() {
                    Some(GestureState::Changed)
                } else {
                    (self.magnification.abs() >= self.threshold).then_some(GestureState::Began)
                }
            }
            TouchPhase::Ended if state.is_active() => Some(GestureState::Ended),
            TouchPhase::Ended => Some(GestureState::Failed),
            TouchPhase::Cancelled => Some(GestureState::Cancelled),
        }
    }

    fn reset(&mut self) {
        self.magnification = 0.0;
    }
}
