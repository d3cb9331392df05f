// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Gesture: gesture recognizer state machines and their arbitration.
//!
//! ## Overview
//!
//! A gesture recognizer turns a stream of low-level input events into a
//! higher-level gesture: a tap, a pan, a long press. Each recognizer is a small
//! state machine ([`GestureState`]) driven by a [`GestureKind`], attached to a
//! view of your toolkit. The [`GestureEngine`] owns the recognizers, routes
//! events to them along a hit-test path, and decides which of several
//! competing recognizers gets to recognize.
//!
//! This crate does not hit test and does not know about windows. Views are
//! whatever small key type you use (`V`), and the front-to-back path for an
//! event comes from you, or from a [`ViewHierarchy`] implementation.
//!
//! ## Arbitration
//!
//! Within one attempt:
//!
//! - A recognized recognizer prevents its competitors, unless a
//!   [`GestureDelegate`] allows the pair to recognize simultaneously. Two
//!   recognizers on the same view are mutually exclusive without any
//!   configuration, and front-most views are tried first.
//! - A recognizer may require another to fail first, like a single tap that
//!   waits for a double tap to give up. Until then it is suspended: its kind
//!   keeps tracking, but it stays `Possible` and its action does not fire.
//! - Dependency cycles are detected and every member fails.
//!
//! Relationships are never stored; delegates and kinds are asked each time.
//!
//! ## Delivery
//!
//! Every dispatched event is also returned for standard view handling in a
//! [`DispatchReport`]. Recognizers with delay flags
//! ([`GestureRecognizer::with_delays`]) hold that delivery back until they
//! either fail or recognize.
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use kurbo::Point;
//! use understory_gesture::kinds::{Pan, Tap};
//! use understory_gesture::{
//!     Action, ActionContext, GestureEngine, GestureInfo, GestureRecognizer, GestureState,
//!     InputEvent, MouseButton,
//! };
//!
//! let log: Rc<RefCell<Vec<(&'static str, GestureState)>>> = Rc::default();
//! let sink = log.clone();
//! let target = Rc::new(
//!     move |_: Action, info: &GestureInfo<u32>, _: &mut ActionContext<'_, u32>| {
//!         sink.borrow_mut().push((info.kind, info.state));
//!     },
//! );
//!
//! const CANVAS: u32 = 1;
//! let mut engine = GestureEngine::new();
//! let tap = engine.attach(CANVAS, GestureRecognizer::new(Tap::new()).with_target(&target, Action(0)));
//! let pan = engine.attach(CANVAS, GestureRecognizer::new(Pan::new()).with_target(&target, Action(1)));
//!
//! let at = |x: f64| Point::new(x, 10.0);
//! engine.dispatch(InputEvent::mouse_down(MouseButton::Primary, at(0.0), 0), &[CANVAS]);
//! engine.dispatch(InputEvent::mouse_dragged(MouseButton::Primary, at(30.0), 16), &[CANVAS]);
//! assert_eq!(engine.state(pan), Ok(GestureState::Began));
//! assert_eq!(engine.state(tap), Ok(GestureState::Failed));
//!
//! engine.dispatch(InputEvent::mouse_up(MouseButton::Primary, at(40.0), 32), &[CANVAS]);
//! assert!(!engine.is_tracking());
//! assert_eq!(
//!     *log.borrow(),
//!     [("Pan", GestureState::Began), ("Pan", GestureState::Ended)]
//! );
//! ```
//!
//! ## Features
//!
//! - `std` (default): catches panics in delegate hooks and treats them as "no
//!   opinion". Without it the crate is `no_std` + `alloc`.
//! - `libm`: use `libm` for Kurbo's float math in `no_std` builds.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod arbitration;
mod attempt;
mod config;
mod delegate;
mod engine;
mod error;
mod event;
mod id;
mod kind;
pub mod kinds;
mod registry;
mod routing;
mod state;

pub use config::{EngineConfig, GestureConfig};
pub use delegate::{Action, ActionTarget, GestureDelegate, GestureInfo};
pub use engine::{ActionContext, GestureEngine};
pub use error::GestureError;
pub use event::{EventClass, EventKind, InputEvent, Modifiers, MouseButton, TouchPhase};
pub use id::RecognizerId;
pub use kind::{GestureKind, Peer};
pub use registry::GestureRecognizer;
pub use routing::{DispatchReport, ViewEvent, ViewHierarchy};
pub use state::GestureState;
