// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The gesture engine: attempts, passes, and the callbacks they trigger.
//!
//! ## Attempts
//!
//! An attempt starts with the first event that reaches any recognizer and
//! lasts until every participant is terminal. Recognizers join when they are
//! candidates for an initiating event (see [`InputEvent::is_initiating`]); from
//! then on they receive every event of the attempt that matches their
//! interest, in join order, wherever the pointer goes. When the attempt
//! finishes every participant is reset to [`GestureState::Possible`].
//!
//! The passes themselves live in `attempt`.
//!
//! Action targets run after the state change they report. Events they post
//! through [`ActionContext::post_event`] are dispatched after the pass that
//! produced them.

use alloc::collections::VecDeque;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use kurbo::Point;
use smallvec::SmallVec;

use crate::registry::Registry;
use crate::routing::DeliveryQueue;
use crate::{
    Action, ActionTarget, DispatchReport, EngineConfig, EventClass, GestureDelegate, GestureError,
    GestureInfo, GestureKind, GestureRecognizer, GestureState, InputEvent, RecognizerId,
    ViewHierarchy,
};

#[derive(Debug)]
pub(crate) struct Posted<V> {
    pub(crate) event: InputEvent,
    pub(crate) path: Vec<V>,
}

/// Owns recognizers and drives their state machines.
///
/// `V` is the caller's view key; it only needs to be a small, hashable handle
/// such as a box-tree node id.
pub struct GestureEngine<V> {
    pub(crate) registry: Registry<V>,
    pub(crate) participants: SmallVec<[RecognizerId; 8]>,
    pub(crate) deliveries: DeliveryQueue<V>,
    pub(crate) posted: VecDeque<Posted<V>>,
    pub(crate) config: EngineConfig,
}

impl<V: fmt::Debug> fmt::Debug for GestureEngine<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureEngine")
            .field("participants", &self.participants)
            .field("held", &self.deliveries)
            .field("posted", &self.posted.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<V> Default for GestureEngine<V> {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl<V> GestureEngine<V> {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty engine with the given limits.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            registry: Registry::default(),
            participants: SmallVec::new(),
            deliveries: DeliveryQueue::default(),
            posted: VecDeque::new(),
            config,
        }
    }

    /// The engine's limits.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl<V: Copy + Eq + Hash + fmt::Debug + 'static> GestureEngine<V> {
    // --- Attachment ------------------------------------------------------

    /// Attach a recognizer to `view`.
    ///
    /// Recognizers attached while an attempt is in progress join at the next
    /// initiating event.
    pub fn attach(&mut self, view: V, recognizer: GestureRecognizer<V>) -> RecognizerId {
        let id = self.registry.insert(view, recognizer);
        tracing::debug!(?id, ?view, "attached gesture recognizer");
        id
    }

    /// Detach a recognizer, returning it.
    ///
    /// It leaves the current attempt immediately; peers stop waiting for it.
    pub fn detach(&mut self, id: RecognizerId) -> Result<GestureRecognizer<V>, GestureError> {
        let entry = self
            .registry
            .remove(id)
            .ok_or(GestureError::StaleRecognizer(id))?;
        self.participants.retain(|p| *p != id);
        tracing::debug!(?id, view = ?entry.view, "detached gesture recognizer");
        self.resolve_suspended();
        Ok(entry.recognizer)
    }

    /// Detach every recognizer attached to `view`. Returns how many were
    /// detached.
    pub fn detach_view(&mut self, view: V) -> usize {
        let ids: SmallVec<[RecognizerId; 4]> = self.registry.attached(view).into();
        ids.into_iter()
            .filter(|&id| self.detach(id).is_ok())
            .count()
    }

    /// Returns `true` if `id` refers to an attached recognizer.
    pub fn is_alive(&self, id: RecognizerId) -> bool {
        self.registry.contains(id)
    }

    /// Recognizers attached to `view`, in attachment order.
    pub fn recognizers(&self, view: V) -> &[RecognizerId] {
        self.registry.attached(view)
    }

    // --- Queries ---------------------------------------------------------

    /// The recognizer's current state.
    pub fn state(&self, id: RecognizerId) -> Result<GestureState, GestureError> {
        self.registry
            .get(id)
            .map(|e| e.state)
            .ok_or(GestureError::StaleRecognizer(id))
    }

    /// A snapshot of the recognizer.
    pub fn info(&self, id: RecognizerId) -> Option<GestureInfo<V>> {
        self.registry.get(id).map(|e| e.info(id))
    }

    /// The recognizer's kind, if it is a `T`.
    pub fn kind<T: GestureKind>(&self, id: RecognizerId) -> Option<&T> {
        let kind: &dyn core::any::Any = &*self.registry.get(id)?.recognizer.kind;
        kind.downcast_ref()
    }

    /// The recognizer's kind, mutably, if it is a `T`.
    ///
    /// Use this to change a kind's settings between attempts.
    pub fn kind_mut<T: GestureKind>(&mut self, id: RecognizerId) -> Option<&mut T> {
        let kind: &mut dyn core::any::Any = &mut *self.registry.get_mut(id)?.recognizer.kind;
        kind.downcast_mut()
    }

    /// Location of the last event the recognizer consumed, in `view`'s
    /// coordinates, or in window coordinates when `view` is `None`.
    pub fn location_in(
        &self,
        id: RecognizerId,
        view: Option<V>,
        hierarchy: &impl ViewHierarchy<V>,
    ) -> Result<Point, GestureError> {
        let entry = self
            .registry
            .get(id)
            .ok_or(GestureError::StaleRecognizer(id))?;
        Ok(match view {
            Some(view) => hierarchy.to_local(view, entry.location),
            None => entry.location,
        })
    }

    /// Participants of the current attempt, in offer order.
    pub fn participants(&self) -> &[RecognizerId] {
        &self.participants
    }

    /// Returns `true` while an attempt is in progress.
    pub fn is_tracking(&self) -> bool {
        !self.participants.is_empty()
    }

    // --- Configuration ---------------------------------------------------

    /// Whether the recognizer takes part in recognition.
    pub fn is_enabled(&self, id: RecognizerId) -> Result<bool, GestureError> {
        self.registry
            .get(id)
            .map(|e| e.recognizer.enabled)
            .ok_or(GestureError::StaleRecognizer(id))
    }

    /// Enable or disable a recognizer.
    ///
    /// Disabling a participant cancels it if it was active and fails it if it
    /// was still `Possible`, without invoking its action.
    pub fn set_enabled(&mut self, id: RecognizerId, enabled: bool) -> Result<(), GestureError> {
        let entry = self
            .registry
            .get_mut(id)
            .ok_or(GestureError::StaleRecognizer(id))?;
        entry.recognizer.enabled = enabled;
        if !enabled && self.participants.contains(&id) {
            self.abandon(id);
            self.resolve_suspended();
        }
        Ok(())
    }

    /// Set the event classes whose view delivery waits for this recognizer.
    pub fn set_delays(&mut self, id: RecognizerId, delays: EventClass) -> Result<(), GestureError> {
        let entry = self
            .registry
            .get_mut(id)
            .ok_or(GestureError::StaleRecognizer(id))?;
        entry.recognizer.delays = delays & EventClass::DELAYABLE;
        Ok(())
    }

    /// Replace the recognizer's delegate. Only a weak reference is kept.
    pub fn set_delegate<D: GestureDelegate<V> + 'static>(
        &mut self,
        id: RecognizerId,
        delegate: Option<&Rc<D>>,
    ) -> Result<(), GestureError> {
        let entry = self
            .registry
            .get_mut(id)
            .ok_or(GestureError::StaleRecognizer(id))?;
        entry.recognizer.delegate = delegate.map(|d| {
            let weak = Rc::downgrade(d);
            let weak: Weak<dyn GestureDelegate<V>> = weak;
            weak
        });
        Ok(())
    }

    /// Replace the recognizer's action target. Only a weak reference is kept.
    pub fn set_target<T: ActionTarget<V> + 'static>(
        &mut self,
        id: RecognizerId,
        target: Option<(&Rc<T>, Action)>,
    ) -> Result<(), GestureError> {
        let entry = self
            .registry
            .get_mut(id)
            .ok_or(GestureError::StaleRecognizer(id))?;
        entry.recognizer.target = target.map(|(t, action)| {
            let weak = Rc::downgrade(t);
            let weak: Weak<dyn ActionTarget<V>> = weak;
            (weak, action)
        });
        Ok(())
    }

    // --- Lifecycle -------------------------------------------------------

    /// Return a recognizer to `Possible`, whatever its state, and remove it
    /// from the current attempt.
    pub fn reset(&mut self, id: RecognizerId) -> Result<(), GestureError> {
        let entry = self
            .registry
            .get_mut(id)
            .ok_or(GestureError::StaleRecognizer(id))?;
        entry.reset();
        self.participants.retain(|p| *p != id);
        tracing::trace!(?id, "reset gesture recognizer");
        self.resolve_suspended();
        Ok(())
    }

    /// Cancel the current attempt, e.g. when the window resigns key.
    ///
    /// Active recognizers move straight to `Cancelled` without further events
    /// or action calls, then every participant is reset. Held view deliveries
    /// are discarded. Returns how many recognizers were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let mut cancelled = 0;
        for id in self.participants.clone() {
            if let Some(entry) = self.registry.get_mut(id)
                && entry.state.is_active()
            {
                entry.state = GestureState::Cancelled;
                cancelled += 1;
            }
        }
        let dropped = self.deliveries.clear();
        for id in core::mem::take(&mut self.participants) {
            if let Some(entry) = self.registry.get_mut(id) {
                entry.reset();
            }
        }
        tracing::debug!(cancelled, dropped, "cancelled gesture attempt");
        cancelled
    }

    /// The view is about to leave its window: cancel or fail its recognizers'
    /// progress in the current attempt.
    pub fn view_will_leave_window(&mut self, view: V) -> DispatchReport<V> {
        let ids: SmallVec<[RecognizerId; 4]> = self.registry.attached(view).into();
        for id in ids {
            if self.participants.contains(&id) {
                self.abandon(id);
            }
        }
        self.resolve_suspended();
        let mut report = DispatchReport::default();
        self.settle(&mut report);
        report
    }

    // --- Dispatch --------------------------------------------------------

    /// Dispatch an event along a hit-test path (front-most view first).
    ///
    /// Keyboard events usually dispatch along the focus chain instead.
    pub fn dispatch(&mut self, event: InputEvent, path: &[V]) -> DispatchReport<V> {
        let mut report = DispatchReport::default();
        let claimed = self.run_pass(&event, path, &mut report);
        report.claimed = claimed;
        self.drain_posted(&mut report);
        report
    }

    /// Hit test the event's location and dispatch along the result.
    pub fn dispatch_hit(
        &mut self,
        event: InputEvent,
        hierarchy: &impl ViewHierarchy<V>,
    ) -> DispatchReport<V> {
        let path = hierarchy.hit_test(event.location);
        self.dispatch(event, &path)
    }

    /// Let time-driven kinds (long press, multi-click timeouts) observe `now`.
    pub fn tick(&mut self, now: u64) -> DispatchReport<V> {
        let mut report = DispatchReport::default();
        self.registry.prune_dead_references();
        for id in self.participants.clone() {
            let Some(entry) = self.registry.get_mut(id) else {
                continue;
            };
            if !entry.recognizer.enabled || entry.state.is_terminal() {
                continue;
            }
            let state = entry.apparent_state();
            if let Some(requested) = entry.recognizer.kind.tick(now, state) {
                self.request(id, requested);
            }
            self.resolve_suspended();
        }
        self.settle(&mut report);
        self.drain_posted(&mut report);
        report
    }
}

/// Engine access for action targets.
///
/// Targets run in the middle of a pass, so this exposes only operations that
/// are safe there. New events cannot be dispatched re-entrantly; they are
/// posted and dispatched once the current pass has finished.
pub struct ActionContext<'a, V> {
    engine: &'a mut GestureEngine<V>,
}

impl<'a, V> ActionContext<'a, V> {
    pub(crate) fn new(engine: &'a mut GestureEngine<V>) -> Self {
        Self { engine }
    }
}

impl<V: fmt::Debug> fmt::Debug for ActionContext<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("posted", &self.engine.posted.len())
            .finish_non_exhaustive()
    }
}

impl<V: Copy + Eq + Hash + fmt::Debug + 'static> ActionContext<'_, V> {
    /// Queue an event to dispatch along `path` after the current pass.
    pub fn post_event(&mut self, event: InputEvent, path: &[V]) {
        tracing::debug!(kind = ?event.kind, "deferring event posted during gesture dispatch");
        self.engine.posted.push_back(Posted {
            event,
            path: path.to_vec(),
        });
    }

    /// See [`GestureEngine::attach`].
    pub fn attach(&mut self, view: V, recognizer: GestureRecognizer<V>) -> RecognizerId {
        self.engine.attach(view, recognizer)
    }

    /// See [`GestureEngine::detach`].
    pub fn detach(&mut self, id: RecognizerId) -> Result<GestureRecognizer<V>, GestureError> {
        self.engine.detach(id)
    }

    /// See [`GestureEngine::reset`].
    pub fn reset(&mut self, id: RecognizerId) -> Result<(), GestureError> {
        self.engine.reset(id)
    }

    /// See [`GestureEngine::set_enabled`].
    pub fn set_enabled(&mut self, id: RecognizerId, enabled: bool) -> Result<(), GestureError> {
        self.engine.set_enabled(id, enabled)
    }

    /// See [`GestureEngine::info`].
    pub fn info(&self, id: RecognizerId) -> Option<GestureInfo<V>> {
        self.engine.info(id)
    }

    /// See [`GestureEngine::kind`].
    pub fn kind<T: GestureKind>(&self, id: RecognizerId) -> Option<&T> {
        self.engine.kind(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_ids_are_errors() {
        #[derive(Debug)]
        struct Inert;
        impl GestureKind for Inert {
            fn process(&mut self, _: &InputEvent, _: GestureState) -> Option<GestureState> {
                None
            }
        }

        let mut engine = GestureEngine::<u32>::new();
        let id = engine.attach(1, GestureRecognizer::new(Inert));
        assert!(engine.detach(id).is_ok());
        assert_eq!(engine.state(id), Err(GestureError::StaleRecognizer(id)));
        assert!(engine.set_enabled(id, false).is_err());
        assert!(engine.reset(id).is_err());
        assert!(engine.detach(id).is_err());
        assert!(!engine.is_alive(id));
    }
}
