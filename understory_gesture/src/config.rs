// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thresholds for the built-in gesture kinds and engine limits.
//!
//! Distances are in logical pixels, durations in milliseconds.

/// Thresholds and timeouts used by the kinds in [`kinds`](crate::kinds).
///
/// Each kind copies the values it needs in its `from_config` constructor, so
/// changing a config after constructing a kind has no effect on it.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureConfig {
    /// Maximum gap between the release of one click and the press of the next
    /// in a multi-click tap (default: 300ms).
    pub multi_click_interval: u64,
    /// Maximum pointer travel from the press location for a tap (default: 4.0).
    pub tap_slop: f64,
    /// Pointer travel from the press location before a pan begins (default: 8.0).
    pub drag_threshold: f64,
    /// Hold time before a press is recognized (default: 500ms).
    pub long_press_duration: u64,
    /// Maximum pointer travel during a press before it is recognized (default: 10.0).
    pub long_press_movement: f64,
    /// Accumulated magnification before a pinch begins (default: 0.02).
    pub pinch_threshold: f64,
    /// Accumulated rotation in degrees before a rotation begins (default: 1.5).
    pub rotation_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            multi_click_interval: 300,
            tap_slop: 4.0,
            drag_threshold: 8.0,
            long_press_duration: 500,
            long_press_movement: 10.0,
            pinch_threshold: 0.02,
            rotation_threshold: 1.5,
        }
    }
}

/// Limits applied by [`GestureEngine`](crate::GestureEngine).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of events action targets may post during one call to
    /// [`dispatch`](crate::GestureEngine::dispatch) or
    /// [`tick`](crate::GestureEngine::tick) (default: 64).
    ///
    /// Further posted events are dropped with a warning.
    pub max_posted_events: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_posted_events: 64,
        }
    }
}
