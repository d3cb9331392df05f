// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in gesture kinds.
//!
//! | Kind          | Style      | Consumes                |
//! |---------------|------------|-------------------------|
//! | [`Tap`]       | discrete   | mouse presses           |
//! | [`LongPress`] | continuous | mouse presses and drags |
//! | [`Pan`]       | continuous | mouse drags             |
//! | [`Pinch`]     | continuous | trackpad magnify        |
//! | [`Rotation`]  | continuous | trackpad rotate         |
//!
//! Discrete kinds go straight from `Possible` to `Ended`. Continuous kinds go
//! through `Began` and `Changed`, and their accessors report progress while the
//! action target runs.

mod long_press;
mod pan;
mod pinch;
mod rotation;
mod tap;

pub use long_press::LongPress;
pub use pan::Pan;
pub use pinch::Pinch;
pub use rotation::Rotation;
pub use tap::Tap;

use kurbo::Point;

/// Whether `b` is more than `radius` away from `a`.
fn beyond(a: Point, b: Point, radius: f64) -> bool {
    (b - a).hypot2() > radius * radius
}
