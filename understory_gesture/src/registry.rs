// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recognizer storage: generational slots plus the per-view attachment lists.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::Point;
use smallvec::SmallVec;

use crate::attempt::Pending;
use crate::{
    Action, ActionTarget, EventClass, GestureDelegate, GestureInfo, GestureKind, GestureState,
    RecognizerId,
};

/// A recognizer ready to be attached with
/// [`GestureEngine::attach`](crate::GestureEngine::attach).
///
/// ```
/// use std::rc::Rc;
/// use understory_gesture::kinds::Tap;
/// use understory_gesture::{Action, ActionContext, ActionTarget, EventClass, GestureInfo, GestureRecognizer};
///
/// struct Log;
/// impl ActionTarget<u32> for Log {
///     fn perform(&self, _: Action, _: &GestureInfo<u32>, _: &mut ActionContext<'_, u32>) {}
/// }
///
/// let log = Rc::new(Log);
/// let tap = GestureRecognizer::new(Tap::new())
///     .with_target(&log, Action(7))
///     .with_delays(EventClass::PRIMARY_MOUSE);
/// assert!(tap.is_enabled());
/// ```
#[derive(Debug)]
pub struct GestureRecognizer<V> {
    pub(crate) kind: Box<dyn GestureKind>,
    pub(crate) enabled: bool,
    pub(crate) delays: EventClass,
    pub(crate) delegate: Option<Weak<dyn GestureDelegate<V>>>,
    pub(crate) target: Option<(Weak<dyn ActionTarget<V>>, Action)>,
}

impl<V: 'static> GestureRecognizer<V> {
    /// Wrap a gesture kind. The recognizer starts enabled, with no delays,
    /// no target and no delegate.
    pub fn new(kind: impl GestureKind) -> Self {
        Self::from_boxed(Box::new(kind))
    }

    /// Wrap an already boxed gesture kind.
    pub fn from_boxed(kind: Box<dyn GestureKind>) -> Self {
        Self {
            kind,
            enabled: true,
            delays: EventClass::empty(),
            delegate: None,
            target: None,
        }
    }

    /// Set the action target. The recognizer only keeps a weak reference.
    #[must_use]
    pub fn with_target<T: ActionTarget<V> + 'static>(mut self, target: &Rc<T>, action: Action) -> Self {
        let weak = Rc::downgrade(target);
        let weak: Weak<dyn ActionTarget<V>> = weak;
        self.target = Some((weak, action));
        self
    }

    /// Set the delegate. The recognizer only keeps a weak reference.
    #[must_use]
    pub fn with_delegate<D: GestureDelegate<V> + 'static>(mut self, delegate: &Rc<D>) -> Self {
        let weak = Rc::downgrade(delegate);
        let weak: Weak<dyn GestureDelegate<V>> = weak;
        self.delegate = Some(weak);
        self
    }

    /// Set the event classes whose view delivery waits for this recognizer.
    ///
    /// Only [`EventClass::DELAYABLE`] classes are kept.
    #[must_use]
    pub fn with_delays(mut self, delays: EventClass) -> Self {
        self.delays = delays & EventClass::DELAYABLE;
        self
    }

    /// Set the initial enabled flag.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl<V> GestureRecognizer<V> {
    /// Whether the recognizer takes part in recognition.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The event classes whose view delivery waits for this recognizer.
    pub fn delays(&self) -> EventClass {
        self.delays
    }

    /// The gesture kind.
    pub fn kind(&self) -> &dyn GestureKind {
        &*self.kind
    }

    /// Consume the recognizer, returning its kind.
    pub fn into_kind(self) -> Box<dyn GestureKind> {
        self.kind
    }

    pub(crate) fn live_delegate(&self) -> Option<Rc<dyn GestureDelegate<V>>> {
        self.delegate.as_ref().and_then(Weak::upgrade)
    }

    /// Drop references whose referent is gone. Returns `true` if anything
    /// was cleared.
    fn prune(&mut self) -> bool {
        let mut cleared = false;
        if self.delegate.as_ref().is_some_and(|d| d.strong_count() == 0) {
            self.delegate = None;
            cleared = true;
        }
        if self
            .target
            .as_ref()
            .is_some_and(|(t, _)| t.strong_count() == 0)
        {
            self.target = None;
            cleared = true;
        }
        cleared
    }
}

/// A recognizer attached to a view, plus the engine's bookkeeping.
#[derive(Debug)]
pub(crate) struct Entry<V> {
    pub(crate) view: V,
    pub(crate) recognizer: GestureRecognizer<V>,
    pub(crate) state: GestureState,
    /// Progress requested while suspended on a failure dependency.
    pub(crate) suspended: Option<Pending>,
    pub(crate) location: Point,
}

impl<V: Copy> Entry<V> {
    pub(crate) fn info(&self, id: RecognizerId) -> GestureInfo<V> {
        GestureInfo {
            id,
            view: self.view,
            state: self.state,
            kind: self.recognizer.kind.name(),
            location: self.location,
        }
    }

    /// The state shown to the kind: its recorded progress while suspended.
    pub(crate) fn apparent_state(&self) -> GestureState {
        self.suspended.map_or(self.state, Pending::shown)
    }

    /// Return to `Possible` and forget all progress.
    pub(crate) fn reset(&mut self) {
        self.state = GestureState::Possible;
        self.suspended = None;
        self.recognizer.kind.reset();
    }
}

#[derive(Debug)]
struct Slot<V> {
    generation: u32,
    entry: Option<Entry<V>>,
}

#[derive(Debug)]
pub(crate) struct Registry<V> {
    slots: Vec<Slot<V>>,
    free: Vec<u32>,
    by_view: HashMap<V, SmallVec<[RecognizerId; 4]>>,
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            by_view: HashMap::new(),
        }
    }
}

impl<V: Copy + Eq + Hash> Registry<V> {
    pub(crate) fn insert(&mut self, view: V, recognizer: GestureRecognizer<V>) -> RecognizerId {
        let entry = Entry {
            view,
            recognizer,
            state: GestureState::Possible,
            suspended: None,
            location: Point::ZERO,
        };
        let id = if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.entry = Some(entry);
            RecognizerId::new(idx, slot.generation)
        } else {
            // Ids carry a `u32` index; past that every new slot would share
            // the last index.
            debug_assert!(
                u32::try_from(self.slots.len()).is_ok(),
                "recognizer slot indices exhausted"
            );
            let idx = u32::try_from(self.slots.len()).unwrap_or_else(|_| {
                tracing::error!("recognizer slot indices exhausted; ids will alias");
                u32::MAX
            });
            self.slots.push(Slot {
                generation: 1,
                entry: Some(entry),
            });
            RecognizerId::new(idx, 1)
        };
        self.by_view.entry(view).or_default().push(id);
        id
    }

    pub(crate) fn remove(&mut self, id: RecognizerId) -> Option<Entry<V>> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        let entry = slot.entry.take()?;
        self.free.push(id.0);
        if let Some(list) = self.by_view.get_mut(&entry.view) {
            list.retain(|other| *other != id);
            if list.is_empty() {
                self.by_view.remove(&entry.view);
            }
        }
        Some(entry)
    }

    pub(crate) fn get(&self, id: RecognizerId) -> Option<&Entry<V>> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.entry.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: RecognizerId) -> Option<&mut Entry<V>> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.entry.as_mut()
    }

    pub(crate) fn contains(&self, id: RecognizerId) -> bool {
        self.get(id).is_some()
    }

    /// Recognizers attached to `view`, in attachment order.
    pub(crate) fn attached(&self, view: V) -> &[RecognizerId] {
        self.by_view
            .get(&view)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    /// Clear delegate and target references whose referent was dropped.
    pub(crate) fn prune_dead_references(&mut self) {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if let Some(entry) = slot.entry.as_mut()
                && entry.recognizer.prune()
            {
                tracing::debug!(slot = idx, "cleared dropped gesture target or delegate");
            }
        }
    }
}
