// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for the engine tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use kurbo::Point;
use understory_gesture::{
    Action, ActionContext, ActionTarget, EventClass, EventKind, GestureDelegate, GestureInfo,
    GestureKind, GestureState, InputEvent, MouseButton,
};

/// A kind that answers each event with the next scripted request.
#[derive(Debug)]
pub struct Script {
    pub label: &'static str,
    pub steps: VecDeque<Option<GestureState>>,
    pub calls: Rc<Cell<usize>>,
    pub interest: EventClass,
}

impl Script {
    pub fn new(label: &'static str, steps: impl IntoIterator<Item = Option<GestureState>>) -> Self {
        Self {
            label,
            steps: steps.into_iter().collect(),
            calls: Rc::default(),
            interest: EventClass::all(),
        }
    }

    /// A script that never asks for anything.
    pub fn idle(label: &'static str) -> Self {
        Self::new(label, [])
    }

    pub fn with_interest(mut self, interest: EventClass) -> Self {
        self.interest = interest;
        self
    }
}

impl GestureKind for Script {
    fn process(&mut self, _: &InputEvent, _: GestureState) -> Option<GestureState> {
        self.calls.set(self.calls.get() + 1);
        self.steps.pop_front().flatten()
    }

    fn interest(&self) -> EventClass {
        self.interest
    }

    fn name(&self) -> &'static str {
        self.label
    }
}

/// Records every action it receives.
#[derive(Debug, Default)]
pub struct Recorder {
    pub log: RefCell<Vec<(Action, &'static str, GestureState)>>,
}

impl Recorder {
    pub fn new() -> Rc<Self> {
        Rc::default()
    }

    pub fn entries(&self) -> Vec<(&'static str, GestureState)> {
        self.log.borrow().iter().map(|&(_, k, s)| (k, s)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }
}

impl ActionTarget<u32> for Recorder {
    fn perform(&self, action: Action, gesture: &GestureInfo<u32>, _: &mut ActionContext<'_, u32>) {
        self.log
            .borrow_mut()
            .push((action, gesture.kind, gesture.state));
    }
}

/// Delegate that makes its recognizer wait for recognizers named `on`.
#[derive(Debug)]
pub struct WaitFor(pub &'static str);

impl GestureDelegate<u32> for WaitFor {
    fn should_require_failure_of(
        &self,
        _: &GestureInfo<u32>,
        other: &GestureInfo<u32>,
    ) -> Option<bool> {
        Some(other.kind == self.0)
    }
}

/// Delegate that makes recognizers named `by` wait for its recognizer.
#[derive(Debug)]
pub struct FailsBefore(pub &'static str);

impl GestureDelegate<u32> for FailsBefore {
    fn should_be_required_to_fail_by(
        &self,
        _: &GestureInfo<u32>,
        other: &GestureInfo<u32>,
    ) -> Option<bool> {
        Some(other.kind == self.0)
    }
}

/// Delegate whose recognizer never waits for anything.
#[derive(Debug)]
pub struct Independent;

impl GestureDelegate<u32> for Independent {
    fn should_require_failure_of(
        &self,
        _: &GestureInfo<u32>,
        _: &GestureInfo<u32>,
    ) -> Option<bool> {
        Some(false)
    }
}

/// Delegate that lets its recognizer recognize alongside everything.
#[derive(Debug)]
pub struct Together;

impl GestureDelegate<u32> for Together {
    fn should_recognize_simultaneously(
        &self,
        _: &GestureInfo<u32>,
        _: &GestureInfo<u32>,
    ) -> Option<bool> {
        Some(true)
    }
}

pub fn down(x: f64, time: u64) -> InputEvent {
    InputEvent::mouse_down(MouseButton::Primary, Point::new(x, 0.0), time)
}

pub fn drag(x: f64, time: u64) -> InputEvent {
    InputEvent::mouse_dragged(MouseButton::Primary, Point::new(x, 0.0), time)
}

pub fn up(x: f64, time: u64) -> InputEvent {
    InputEvent::mouse_up(MouseButton::Primary, Point::new(x, 0.0), time)
}

pub fn key_down(key_code: u16, time: u64) -> InputEvent {
    InputEvent::new(
        EventKind::KeyDown {
            key_code,
            repeat: false,
        },
        Point::ZERO,
        time,
    )
}
