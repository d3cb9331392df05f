// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event routing: candidate lists from hit-test paths, and the view delivery
//! queue that honors delay flags.
//!
//! ## Candidates
//!
//! The hit-test path is ordered front to back. Candidates are the recognizers
//! attached to each view of the path, front-most view first and in
//! attachment order within a view. This ordering is what gives the deepest
//! view's recognizers precedence: they are offered the event first and so are
//! the first to recognize and prevent the rest.
//!
//! ## Delivery
//!
//! Every dispatched event is also due for standard handling by its view. It
//! is queued, and released in arrival order once no participant that delays
//! its class is still undecided.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::hash::Hash;

use kurbo::Point;
use smallvec::SmallVec;

use crate::registry::Registry;
use crate::{EventClass, GestureState, InputEvent, RecognizerId};

/// The view-hierarchy collaborator.
///
/// ```
/// use kurbo::{Point, Rect};
/// use understory_gesture::ViewHierarchy;
///
/// /// Two nested rectangles; `2` sits on top of `1`.
/// struct Nested;
///
/// impl ViewHierarchy<u32> for Nested {
///     fn hit_test(&self, point: Point) -> Vec<u32> {
///         let inner = Rect::new(10.0, 10.0, 20.0, 20.0);
///         let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
///         let mut path = Vec::new();
///         if inner.contains(point) {
///             path.push(2);
///         }
///         if outer.contains(point) {
///             path.push(1);
///         }
///         path
///     }
/// }
///
/// assert_eq!(Nested.hit_test(Point::new(15.0, 15.0)), vec![2, 1]);
/// ```
pub trait ViewHierarchy<V> {
    /// Views under `point` (window coordinates), front-most first, ending with
    /// the outermost ancestor.
    fn hit_test(&self, point: Point) -> Vec<V>;

    /// Convert a window-coordinate point into `view`'s coordinate space.
    fn to_local(&self, view: V, point: Point) -> Point {
        let _ = view;
        point
    }
}

/// An event due for standard handling by a view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewEvent<V> {
    /// The front-most view of the event's path, if any.
    pub view: Option<V>,
    /// The event.
    pub event: InputEvent,
    /// `true` if delivery was held back by a recognizer that then recognized.
    ///
    /// Toolkits that suppress view handling of recognized gestures skip these.
    pub superseded: bool,
}

/// What a call into the engine produced for the surrounding toolkit.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchReport<V> {
    /// Events released for view delivery, oldest first.
    ///
    /// May include events dispatched earlier whose delivery was delayed.
    pub deliver: Vec<ViewEvent<V>>,
    /// Whether a recognized participant consumes the dispatched event's class.
    pub claimed: bool,
    /// Events still held back after this call.
    pub held: usize,
    /// Events posted by action targets and dispatched during this call.
    pub posted: usize,
}

impl<V> Default for DispatchReport<V> {
    fn default() -> Self {
        Self {
            deliver: Vec::new(),
            claimed: false,
            held: 0,
            posted: 0,
        }
    }
}

/// Recognizers attached along `path` that may join an attempt on an event of
/// class `class`.
pub(crate) fn candidates<V: Copy + Eq + Hash>(
    registry: &Registry<V>,
    path: &[V],
    class: EventClass,
) -> SmallVec<[RecognizerId; 8]> {
    let mut out = SmallVec::new();
    for &view in path {
        for &id in registry.attached(view) {
            let Some(entry) = registry.get(id) else {
                continue;
            };
            if entry.recognizer.enabled
                && entry.state == GestureState::Possible
                && entry.recognizer.kind.interest().intersects(class)
                && !out.contains(&id)
            {
                out.push(id);
            }
        }
    }
    out
}

#[derive(Debug)]
struct Held<V> {
    event: ViewEvent<V>,
    waiting: SmallVec<[RecognizerId; 2]>,
}

/// FIFO of events awaiting view delivery.
#[derive(Debug)]
pub(crate) struct DeliveryQueue<V> {
    held: VecDeque<Held<V>>,
}

impl<V> Default for DeliveryQueue<V> {
    fn default() -> Self {
        Self {
            held: VecDeque::new(),
        }
    }
}

impl<V: Copy + Eq + Hash> DeliveryQueue<V> {
    /// Queue `event` behind everything already held. `waiting` lists the
    /// recognizers whose disposition it waits for.
    pub(crate) fn push(&mut self, event: ViewEvent<V>, waiting: SmallVec<[RecognizerId; 2]>) {
        self.held.push_back(Held { event, waiting });
    }

    /// Move every releasable event from the front of the queue into `out`.
    ///
    /// A recognizer has settled once it left `Possible`, left the attempt, or
    /// was detached.
    pub(crate) fn release(
        &mut self,
        registry: &Registry<V>,
        participants: &[RecognizerId],
        out: &mut Vec<ViewEvent<V>>,
    ) {
        let undecided = |id: &RecognizerId| {
            participants.contains(id)
                && registry
                    .get(*id)
                    .is_some_and(|e| e.state == GestureState::Possible)
        };
        while let Some(front) = self.held.front() {
            if front.waiting.iter().any(undecided) {
                break;
            }
            let Some(mut held) = self.held.pop_front() else {
                break;
            };
            held.event.superseded = held
                .waiting
                .iter()
                .any(|id| registry.get(*id).is_some_and(|e| e.state.is_recognized()));
            out.push(held.event);
        }
    }

    /// Drop every held event, returning how many were dropped.
    pub(crate) fn clear(&mut self) -> usize {
        let n = self.held.len();
        self.held.clear();
        n
    }

    pub(crate) fn len(&self) -> usize {
        self.held.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GestureKind, GestureRecognizer, MouseButton};
    use smallvec::smallvec;

    #[derive(Debug)]
    struct Keys;

    impl GestureKind for Keys {
        fn interest(&self) -> EventClass {
            EventClass::KEY
        }

        fn process(&mut self, _: &InputEvent, _: GestureState) -> Option<GestureState> {
            None
        }
    }

    #[derive(Debug)]
    struct Mouse;

    impl GestureKind for Mouse {
        fn interest(&self) -> EventClass {
            EventClass::MOUSE
        }

        fn process(&mut self, _: &InputEvent, _: GestureState) -> Option<GestureState> {
            None
        }
    }

    fn click(time: u64) -> ViewEvent<u32> {
        ViewEvent {
            view: Some(1),
            event: InputEvent::mouse_down(MouseButton::Primary, Point::ZERO, time),
            superseded: false,
        }
    }

    #[test]
    fn candidates_run_front_to_back_and_filter_interest() {
        let mut reg = Registry::<u32>::default();
        let outer = reg.insert(1, GestureRecognizer::new(Mouse));
        let key = reg.insert(2, GestureRecognizer::new(Keys));
        let inner = reg.insert(2, GestureRecognizer::new(Mouse));
        let off = reg.insert(2, GestureRecognizer::new(Mouse).with_enabled(false));

        let got = candidates(&reg, &[2, 1], EventClass::PRIMARY_MOUSE);
        assert_eq!(got.as_slice(), &[inner, outer]);
        assert!(!got.contains(&key));
        assert!(!got.contains(&off));
    }

    #[test]
    fn held_events_release_in_order_once_settled() {
        let mut reg = Registry::<u32>::default();
        let r = reg.insert(1, GestureRecognizer::new(Mouse));
        let participants = [r];
        let mut queue = DeliveryQueue::default();
        queue.push(click(1), smallvec![r]);
        queue.push(click(2), SmallVec::new());

        let mut out = Vec::new();
        queue.release(&reg, &participants, &mut out);
        assert!(out.is_empty(), "the second event must not overtake the first");
        assert_eq!(queue.len(), 2);

        if let Some(e) = reg.get_mut(r) {
            e.state = GestureState::Ended;
        }
        queue.release(&reg, &participants, &mut out);
        assert_eq!(out.len(), 2);
        assert!(out[0].superseded);
        assert!(!out[1].superseded);
        assert_eq!(out[0].event.time, 1);
    }

    #[test]
    fn leaving_the_attempt_settles_a_recognizer() {
        let mut reg = Registry::<u32>::default();
        let r = reg.insert(1, GestureRecognizer::new(Mouse));
        let mut queue = DeliveryQueue::default();
        queue.push(click(1), smallvec![r]);
        let mut out = Vec::new();
        queue.release(&reg, &[], &mut out);
        assert_eq!(out.len(), 1);
        assert!(!out[0].superseded);
        assert_eq!(queue.clear(), 0);
    }
}
