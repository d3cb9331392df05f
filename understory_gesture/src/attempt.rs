// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Passes over the current attempt.
//!
//! Each call to [`GestureEngine::dispatch`] or [`GestureEngine::tick`] runs one
//! pass over a snapshot of the participants. For each participant, in order:
//!
//! 1. Terminal, disabled and uninterested recognizers are skipped.
//! 2. A `Possible` recognizer that a recognized peer prevents fails without
//!    seeing the event.
//! 3. The kind processes the event and may request a state.
//! 4. A request to leave `Possible` is checked against failure dependencies
//!    (suspend, fail, or break a cycle), then prevention, then the delegate's
//!    `should_begin`.
//! 5. Suspended recognizers whose dependencies have now failed resume.
//!
//! A suspended recognizer stays `Possible` to everyone else, but its kind is
//! shown the progress it recorded, so a continuous gesture keeps tracking as
//! if it had begun.

use core::fmt;
use core::hash::Hash;

use smallvec::SmallVec;

use crate::arbitration::{self, Gate};
use crate::delegate::consult;
use crate::engine::ActionContext;
use crate::routing;
use crate::{
    DispatchReport, EventClass, GestureEngine, GestureState, InputEvent, RecognizerId, ViewEvent,
};

/// Progress a kind reported while its recognizer was suspended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Pending {
    /// A continuous gesture began.
    Began,
    /// A continuous gesture began and has since ended.
    BeganAndEnded,
    /// A discrete gesture completed.
    Ended,
}

impl Pending {
    fn from_state(state: GestureState) -> Self {
        if state == GestureState::Ended {
            Self::Ended
        } else {
            Self::Began
        }
    }

    /// Fold a new request into the recorded progress. Completion is never
    /// undone.
    pub(crate) fn merge(recorded: Option<Self>, requested: GestureState) -> Self {
        match (recorded, requested) {
            (Some(Self::Ended), _) => Self::Ended,
            (Some(Self::BeganAndEnded), _) | (Some(Self::Began), GestureState::Ended) => {
                Self::BeganAndEnded
            }
            (Some(Self::Began), _) => Self::Began,
            (None, requested) => Self::from_state(requested),
        }
    }

    /// The state the kind is shown while suspended.
    pub(crate) fn shown(self) -> GestureState {
        match self {
            Self::Began => GestureState::Began,
            Self::BeganAndEnded | Self::Ended => GestureState::Ended,
        }
    }

    /// The first state entered on resuming.
    fn first(self) -> GestureState {
        match self {
            Self::Began | Self::BeganAndEnded => GestureState::Began,
            Self::Ended => GestureState::Ended,
        }
    }
}

impl<V: Copy + Eq + Hash + fmt::Debug + 'static> GestureEngine<V> {
    /// One pass of `event` over the attempt. Returns whether the event's
    /// class is claimed by a recognized participant.
    pub(crate) fn run_pass(
        &mut self,
        event: &InputEvent,
        path: &[V],
        report: &mut DispatchReport<V>,
    ) -> bool {
        self.registry.prune_dead_references();
        self.settle(report);

        let class = event.class();
        self.join(event, path, class);

        for id in self.participants.clone() {
            self.offer(id, event, class);
            self.resolve_suspended();
        }

        let waiting = self.delaying(class);
        let view = path.first().copied();
        self.deliveries.push(
            ViewEvent {
                view,
                event: *event,
                superseded: false,
            },
            waiting,
        );
        let claimed = self.claimed(class);
        self.settle(report);
        claimed
    }

    /// Add the path's candidates to the attempt.
    fn join(&mut self, event: &InputEvent, path: &[V], class: EventClass) {
        if !self.participants.is_empty() && !event.is_initiating() {
            return;
        }
        for id in routing::candidates(&self.registry, path, class) {
            if self.participants.contains(&id) {
                continue;
            }
            let Some(entry) = self.registry.get(id) else {
                continue;
            };
            let info = entry.info(id);
            if let Some(d) = entry.recognizer.live_delegate()
                && consult(|| d.should_attempt(&info, event)) == Some(false)
            {
                tracing::trace!(?id, "delegate declined gesture attempt");
                continue;
            }
            if self.participants.is_empty() {
                tracing::debug!(view = ?path.first(), "gesture attempt started");
            }
            self.participants.push(id);
        }
    }

    fn offer(&mut self, id: RecognizerId, event: &InputEvent, class: EventClass) {
        let Some(entry) = self.registry.get(id) else {
            return;
        };
        if !entry.recognizer.enabled
            || entry.state.is_terminal()
            || !entry.recognizer.kind.interest().intersects(class)
        {
            return;
        }
        // Suspended recognizers keep their book-keeping and skip prevention:
        // failure dependencies are decided first.
        if entry.state == GestureState::Possible
            && entry.suspended.is_none()
            && let Some(by) = arbitration::preventer(&self.registry, &self.participants, id)
        {
            tracing::trace!(?id, ?by, "gesture prevented");
            self.set_state(id, GestureState::Failed);
            return;
        }
        let Some(entry) = self.registry.get_mut(id) else {
            return;
        };
        entry.location = event.location;
        let state = entry.apparent_state();
        if let Some(requested) = entry.recognizer.kind.process(event, state) {
            self.request(id, requested);
        }
    }

    /// Handle a kind's request for a new state.
    pub(crate) fn request(&mut self, id: RecognizerId, requested: GestureState) {
        let Some(entry) = self.registry.get_mut(id) else {
            return;
        };
        let current = entry.state;
        if current == GestureState::Possible && entry.suspended.is_some() {
            match requested {
                GestureState::Possible => {}
                GestureState::Cancelled | GestureState::Failed => {
                    self.set_state(id, GestureState::Failed);
                }
                _ => entry.suspended = Some(Pending::merge(entry.suspended, requested)),
            }
            return;
        }
        let Some(next) = current.advance(requested) else {
            return;
        };
        if current == GestureState::Possible && next.is_recognized() {
            self.leave_possible(id, Pending::from_state(next));
        } else {
            self.set_state(id, next);
            self.fire(id);
        }
    }

    /// Try to move `id` out of `Possible` with the given progress.
    fn leave_possible(&mut self, id: RecognizerId, pending: Pending) {
        match arbitration::failure_gate(&self.registry, &self.participants, id) {
            Gate::Clear => {}
            Gate::Blocked => {
                if let Some(entry) = self.registry.get_mut(id) {
                    entry.suspended = Some(pending);
                    tracing::trace!(?id, progress = ?pending, "gesture suspended on failure dependency");
                }
                return;
            }
            Gate::Doomed(by) => {
                tracing::trace!(?id, ?by, "failure dependency recognized");
                self.set_state(id, GestureState::Failed);
                return;
            }
            Gate::Cycle(members) => {
                tracing::warn!(?members, "cyclic gesture failure dependency; failing every member");
                for member in members {
                    self.set_state(member, GestureState::Failed);
                }
                return;
            }
        }
        if let Some(by) = arbitration::preventer(&self.registry, &self.participants, id) {
            tracing::trace!(?id, ?by, "gesture prevented");
            self.set_state(id, GestureState::Failed);
            return;
        }
        if let Some(entry) = self.registry.get(id)
            && let Some(d) = entry.recognizer.live_delegate()
        {
            let info = entry.info(id);
            if consult(|| d.should_begin(&info)) == Some(false) {
                tracing::trace!(?id, "delegate refused gesture begin");
                self.set_state(id, GestureState::Failed);
                return;
            }
        }
        self.set_state(id, pending.first());
        self.sweep(id);
        self.fire(id);

        // The action may have reset or detached it.
        if pending == Pending::BeganAndEnded
            && self
                .registry
                .get(id)
                .is_some_and(|e| e.state == GestureState::Began)
        {
            self.set_state(id, GestureState::Ended);
            self.fire(id);
        }
    }

    /// `winner` just recognized: fail the `Possible` participants that depend
    /// on its failure or that it prevents.
    fn sweep(&mut self, winner: RecognizerId) {
        for other in self.participants.clone() {
            if other == winner
                || self
                    .registry
                    .get(other)
                    .is_none_or(|e| e.state != GestureState::Possible)
            {
                continue;
            }
            if arbitration::requires_failure(&self.registry, other, winner) {
                tracing::trace!(id = ?other, by = ?winner, "failure dependency recognized");
                self.set_state(other, GestureState::Failed);
            } else if arbitration::prevents(&self.registry, winner, other) {
                tracing::trace!(id = ?other, by = ?winner, "gesture prevented");
                self.set_state(other, GestureState::Failed);
            }
        }
    }

    /// Resume suspended recognizers whose dependencies have resolved, until
    /// nothing changes.
    pub(crate) fn resolve_suspended(&mut self) {
        loop {
            let mut progressed = false;
            for id in self.participants.clone() {
                let Some(entry) = self.registry.get_mut(id) else {
                    continue;
                };
                if entry.state != GestureState::Possible {
                    continue;
                }
                let Some(pending) = entry.suspended.take() else {
                    continue;
                };
                self.leave_possible(id, pending);
                if self
                    .registry
                    .get(id)
                    .is_some_and(|e| e.state != GestureState::Possible)
                {
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
    }

    /// Take a participant out of recognition without invoking its action.
    pub(crate) fn abandon(&mut self, id: RecognizerId) {
        let Some(entry) = self.registry.get(id) else {
            return;
        };
        match entry.state {
            GestureState::Began | GestureState::Changed => {
                self.set_state(id, GestureState::Cancelled);
            }
            GestureState::Possible => self.set_state(id, GestureState::Failed),
            _ => {}
        }
    }

    fn set_state(&mut self, id: RecognizerId, next: GestureState) {
        let Some(entry) = self.registry.get_mut(id) else {
            return;
        };
        tracing::trace!(?id, kind = entry.recognizer.kind.name(), from = ?entry.state, to = ?next, "gesture state");
        entry.state = next;
        entry.suspended = None;
    }

    /// Invoke the action target for the recognizer's current state.
    fn fire(&mut self, id: RecognizerId) {
        let Some(entry) = self.registry.get_mut(id) else {
            return;
        };
        if !entry.state.fires_action() {
            return;
        }
        let Some((weak, action)) = entry.recognizer.target.clone() else {
            return;
        };
        let Some(target) = weak.upgrade() else {
            tracing::debug!(?id, "gesture action target dropped; clearing it");
            entry.recognizer.target = None;
            return;
        };
        let info = entry.info(id);
        let mut cx = ActionContext::new(self);
        target.perform(action, &info, &mut cx);
    }

    /// Participants that hold back view delivery of `class` events.
    fn delaying(&self, class: EventClass) -> SmallVec<[RecognizerId; 2]> {
        self.participants
            .iter()
            .copied()
            .filter(|&id| {
                self.registry.get(id).is_some_and(|e| {
                    e.state == GestureState::Possible
                        && e.recognizer.enabled
                        && e.recognizer.delays.delays(class)
                        && e.recognizer.kind.interest().intersects(class)
                })
            })
            .collect()
    }

    fn claimed(&self, class: EventClass) -> bool {
        self.participants.iter().any(|&id| {
            self.registry.get(id).is_some_and(|e| {
                e.state.is_recognized() && e.recognizer.kind.interest().intersects(class)
            })
        })
    }

    /// Release deliveries, and close the attempt once every participant is
    /// terminal.
    pub(crate) fn settle(&mut self, report: &mut DispatchReport<V>) {
        let registry = &self.registry;
        self.participants.retain(|id| registry.contains(*id));
        self.deliveries
            .release(&self.registry, &self.participants, &mut report.deliver);

        let finished = !self.participants.is_empty()
            && self
                .participants
                .iter()
                .all(|&id| self.registry.get(id).is_none_or(|e| e.state.is_terminal()));
        if finished {
            for id in core::mem::take(&mut self.participants) {
                if let Some(entry) = self.registry.get_mut(id) {
                    entry.reset();
                }
            }
            // Nothing is undecided any more.
            self.deliveries.release(&self.registry, &[], &mut report.deliver);
            tracing::debug!("gesture attempt finished");
        }
        report.held = self.deliveries.len();
    }

    pub(crate) fn drain_posted(&mut self, report: &mut DispatchReport<V>) {
        let mut budget = self.config.max_posted_events;
        while let Some(posted) = self.posted.pop_front() {
            if budget == 0 {
                let dropped = self.posted.len() + 1;
                self.posted.clear();
                tracing::warn!(dropped, "too many events posted from gesture actions; dropping the rest");
                break;
            }
            budget -= 1;
            report.posted += 1;
            self.run_pass(&posted.event, &posted.path, report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_progress_is_never_undone() {
        assert_eq!(Pending::merge(None, GestureState::Began), Pending::Began);
        assert_eq!(Pending::merge(None, GestureState::Changed), Pending::Began);
        assert_eq!(Pending::merge(None, GestureState::Ended), Pending::Ended);
        assert_eq!(
            Pending::merge(Some(Pending::Began), GestureState::Changed),
            Pending::Began
        );
        assert_eq!(
            Pending::merge(Some(Pending::Began), GestureState::Ended),
            Pending::BeganAndEnded
        );
        assert_eq!(
            Pending::merge(Some(Pending::BeganAndEnded), GestureState::Changed),
            Pending::BeganAndEnded
        );
        assert_eq!(
            Pending::merge(Some(Pending::Ended), GestureState::Began),
            Pending::Ended
        );
    }

    #[test]
    fn kinds_see_their_recorded_progress() {
        assert_eq!(Pending::Began.shown(), GestureState::Began);
        assert_eq!(Pending::BeganAndEnded.shown(), GestureState::Ended);
        assert_eq!(Pending::BeganAndEnded.first(), GestureState::Began);
        assert_eq!(Pending::Ended.first(), GestureState::Ended);
    }
}
