// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pairwise arbitration between participants of one attempt.
//!
//! Nothing here is cached. Every relation is derived from delegates and kinds
//! at the moment it is needed, in this order:
//!
//! 1. the delegate of the recognizer the question is about,
//! 2. the delegate of the other recognizer,
//! 3. the kinds' own overrides, or the default policy.

use core::hash::Hash;

use smallvec::SmallVec;

use crate::GestureState;
use crate::delegate::consult;
use crate::kind::Peer;
use crate::registry::{Entry, Registry};
use crate::RecognizerId;

/// The outcome of checking a recognizer's failure dependencies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Gate {
    /// No unresolved dependency; the recognizer may proceed.
    Clear,
    /// At least one dependency is still `Possible`.
    Blocked,
    /// A dependency did not fail; the recognizer must fail.
    Doomed(RecognizerId),
    /// The recognizer waits on itself through these members.
    Cycle(SmallVec<[RecognizerId; 4]>),
}

fn peer<'a, V: Eq>(entry: &'a Entry<V>, relative_to: &Entry<V>) -> Peer<'a> {
    Peer {
        kind: &*entry.recognizer.kind,
        state: entry.state,
        same_view: entry.view == relative_to.view,
    }
}

fn pair<V: Copy + Eq + Hash>(
    registry: &Registry<V>,
    a: RecognizerId,
    b: RecognizerId,
) -> Option<(&Entry<V>, &Entry<V>)> {
    Some((registry.get(a)?, registry.get(b)?))
}

/// Whether `a` and `b` may be recognized together. Defaults to `false`.
pub(crate) fn simultaneous<V: Copy + Eq + Hash>(
    registry: &Registry<V>,
    a: RecognizerId,
    b: RecognizerId,
) -> bool {
    let Some((ea, eb)) = pair(registry, a, b) else {
        return false;
    };
    let (ia, ib) = (ea.info(a), eb.info(b));
    if let Some(d) = ea.recognizer.live_delegate()
        && let Some(answer) = consult(|| d.should_recognize_simultaneously(&ia, &ib))
    {
        return answer;
    }
    if let Some(d) = eb.recognizer.live_delegate()
        && let Some(answer) = consult(|| d.should_recognize_simultaneously(&ib, &ia))
    {
        return answer;
    }
    false
}

/// Whether `a`, once recognized, keeps `b` from recognizing.
pub(crate) fn prevents<V: Copy + Eq + Hash>(
    registry: &Registry<V>,
    a: RecognizerId,
    b: RecognizerId,
) -> bool {
    let Some((ea, eb)) = pair(registry, a, b) else {
        return false;
    };
    ea.recognizer.kind.can_prevent(&peer(eb, ea))
        && eb.recognizer.kind.can_be_prevented_by(&peer(ea, eb))
        && !simultaneous(registry, a, b)
}

/// Whether `a` must wait for `b` to fail.
pub(crate) fn requires_failure<V: Copy + Eq + Hash>(
    registry: &Registry<V>,
    a: RecognizerId,
    b: RecognizerId,
) -> bool {
    let Some((ea, eb)) = pair(registry, a, b) else {
        return false;
    };
    let (ia, ib) = (ea.info(a), eb.info(b));
    if let Some(d) = ea.recognizer.live_delegate()
        && let Some(answer) = consult(|| d.should_require_failure_of(&ia, &ib))
    {
        return answer;
    }
    if let Some(d) = eb.recognizer.live_delegate()
        && let Some(answer) = consult(|| d.should_be_required_to_fail_by(&ib, &ia))
    {
        return answer;
    }
    ea.recognizer.kind.should_require_failure_of(&peer(eb, ea))
        || eb.recognizer.kind.should_be_required_to_fail_by(&peer(ea, eb))
}

fn unresolved<V: Copy + Eq + Hash>(registry: &Registry<V>, id: RecognizerId) -> bool {
    registry
        .get(id)
        .is_some_and(|e| e.recognizer.enabled && e.state == GestureState::Possible)
}

/// The first recognized participant that prevents `id`, if any.
pub(crate) fn preventer<V: Copy + Eq + Hash>(
    registry: &Registry<V>,
    participants: &[RecognizerId],
    id: RecognizerId,
) -> Option<RecognizerId> {
    participants.iter().copied().find(|&other| {
        other != id
            && registry.get(other).is_some_and(|e| e.state.is_recognized())
            && prevents(registry, other, id)
    })
}

/// Check whether `id` may leave `Possible` as far as failure dependencies go.
pub(crate) fn failure_gate<V: Copy + Eq + Hash>(
    registry: &Registry<V>,
    participants: &[RecognizerId],
    id: RecognizerId,
) -> Gate {
    let mut blocked = false;
    for &other in participants {
        if other == id || !requires_failure(registry, id, other) {
            continue;
        }
        let Some(entry) = registry.get(other) else {
            continue;
        };
        match entry.state {
            GestureState::Failed => {}
            GestureState::Possible if !entry.recognizer.enabled => {}
            GestureState::Possible => blocked = true,
            GestureState::Began
            | GestureState::Changed
            | GestureState::Ended
            | GestureState::Cancelled => return Gate::Doomed(other),
        }
    }
    if !blocked {
        return Gate::Clear;
    }
    match find_cycle(registry, participants, id) {
        Some(members) => Gate::Cycle(members),
        None => Gate::Blocked,
    }
}

/// Find a chain of unresolved failure dependencies leading from `start` back
/// to itself.
///
/// Edges run from a recognizer to each unresolved participant it requires to
/// fail. Returns the members of the first cycle found, starting with `start`.
pub(crate) fn find_cycle<V: Copy + Eq + Hash>(
    registry: &Registry<V>,
    participants: &[RecognizerId],
    start: RecognizerId,
) -> Option<SmallVec<[RecognizerId; 4]>> {
    // (child, parent) links of the search tree.
    let mut parents: SmallVec<[(RecognizerId, RecognizerId); 8]> = SmallVec::new();
    let mut visited: SmallVec<[RecognizerId; 8]> = SmallVec::new();
    let mut stack: SmallVec<[RecognizerId; 8]> = SmallVec::new();
    visited.push(start);
    stack.push(start);

    while let Some(current) = stack.pop() {
        for &next in participants {
            if next == current || !unresolved(registry, next) {
                continue;
            }
            if !requires_failure(registry, current, next) {
                continue;
            }
            if next == start {
                let mut cycle: SmallVec<[RecognizerId; 4]> = SmallVec::new();
                let mut node = current;
                cycle.push(node);
                while node != start {
                    let Some(&(_, parent)) = parents.iter().find(|(child, _)| *child == node)
                    else {
                        break;
                    };
                    node = parent;
                    cycle.push(node);
                }
                cycle.reverse();
                return Some(cycle);
            }
            if !visited.contains(&next) {
                visited.push(next);
                parents.push((next, current));
                stack.push(next);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;

    use crate::{GestureDelegate, GestureInfo, GestureKind, GestureRecognizer, InputEvent};

    #[derive(Debug)]
    struct Waits {
        on: &'static str,
        label: &'static str,
    }

    impl GestureKind for Waits {
        fn process(&mut self, _: &InputEvent, _: GestureState) -> Option<GestureState> {
            None
        }

        fn name(&self) -> &'static str {
            self.label
        }

        fn should_require_failure_of(&self, other: &Peer<'_>) -> bool {
            other.kind.name() == self.on
        }
    }

    fn waits(label: &'static str, on: &'static str) -> GestureRecognizer<u32> {
        GestureRecognizer::new(Waits { on, label })
    }

    /// Gives the same fixed answer to every relationship question.
    struct Answer(Option<bool>);

    impl GestureDelegate<u32> for Answer {
        fn should_recognize_simultaneously(
            &self,
            _: &GestureInfo<u32>,
            _: &GestureInfo<u32>,
        ) -> Option<bool> {
            self.0
        }

        fn should_require_failure_of(
            &self,
            _: &GestureInfo<u32>,
            _: &GestureInfo<u32>,
        ) -> Option<bool> {
            self.0
        }

        fn should_be_required_to_fail_by(
            &self,
            _: &GestureInfo<u32>,
            _: &GestureInfo<u32>,
        ) -> Option<bool> {
            self.0
        }
    }

    #[test]
    fn same_view_recognizers_exclude_each_other_by_default() {
        let mut reg = Registry::<u32>::default();
        let a = reg.insert(1, waits("a", "-"));
        let b = reg.insert(1, waits("b", "-"));
        assert!(prevents(&reg, a, b));
        assert!(prevents(&reg, b, a));
        assert!(!simultaneous(&reg, a, b));
    }

    #[test]
    fn kind_overrides_declare_failure_dependencies() {
        let mut reg = Registry::<u32>::default();
        let a = reg.insert(1, waits("a", "b"));
        let b = reg.insert(1, waits("b", "-"));
        assert!(requires_failure(&reg, a, b));
        assert!(!requires_failure(&reg, b, a));
        assert_eq!(failure_gate(&reg, &[a, b], a), Gate::Blocked);
        assert_eq!(failure_gate(&reg, &[a, b], b), Gate::Clear);

        if let Some(e) = reg.get_mut(b) {
            e.state = GestureState::Failed;
        }
        assert_eq!(failure_gate(&reg, &[a, b], a), Gate::Clear);

        if let Some(e) = reg.get_mut(b) {
            e.state = GestureState::Began;
        }
        assert_eq!(failure_gate(&reg, &[a, b], a), Gate::Doomed(b));
    }

    #[test]
    fn other_delegate_can_ask_to_fail_first() {
        let yes = Rc::new(Answer(Some(true)));
        let mut reg = Registry::<u32>::default();
        let a = reg.insert(1, waits("a", "-"));
        let b = reg.insert(1, waits("b", "-").with_delegate(&yes));
        assert!(requires_failure(&reg, a, b));
    }

    #[test]
    fn own_delegate_overrides_the_other_delegate() {
        let yes = Rc::new(Answer(Some(true)));
        let no = Rc::new(Answer(Some(false)));
        let mut reg = Registry::<u32>::default();
        let a = reg.insert(1, waits("a", "b").with_delegate(&no));
        let b = reg.insert(1, waits("b", "-").with_delegate(&yes));
        assert!(!requires_failure(&reg, a, b));
        assert!(requires_failure(&reg, b, a));
        assert!(!simultaneous(&reg, a, b));
        assert!(simultaneous(&reg, b, a));
    }

    #[test]
    fn other_delegate_overrides_kind_defaults() {
        let no = Rc::new(Answer(Some(false)));
        let silent = Rc::new(Answer(None));
        let mut reg = Registry::<u32>::default();
        let a = reg.insert(1, waits("a", "b").with_delegate(&silent));
        let b = reg.insert(1, waits("b", "-").with_delegate(&no));
        assert!(!requires_failure(&reg, a, b));

        let c = reg.insert(1, waits("c", "d"));
        let d = reg.insert(1, waits("d", "-").with_delegate(&silent));
        assert!(requires_failure(&reg, c, d), "no opinion falls back to the kind");
    }

    #[test]
    fn dependencies_outside_the_attempt_are_ignored() {
        let mut reg = Registry::<u32>::default();
        let a = reg.insert(1, waits("a", "b"));
        let _b = reg.insert(1, waits("b", "-"));
        assert_eq!(failure_gate(&reg, &[a], a), Gate::Clear);
    }

    #[test]
    fn cycles_are_reported_with_every_member() {
        let mut reg = Registry::<u32>::default();
        let a = reg.insert(1, waits("a", "b"));
        let b = reg.insert(1, waits("b", "c"));
        let c = reg.insert(2, waits("c", "a"));
        let all = [a, b, c];
        let cycle = find_cycle(&reg, &all, a);
        assert_eq!(cycle.as_deref(), Some(&[a, b, c][..]));
        assert!(matches!(failure_gate(&reg, &all, b), Gate::Cycle(m) if m.len() == 3));
    }

    #[test]
    fn chains_without_a_loop_are_not_cycles() {
        let mut reg = Registry::<u32>::default();
        let a = reg.insert(1, waits("a", "b"));
        let b = reg.insert(1, waits("b", "c"));
        let c = reg.insert(1, waits("c", "-"));
        assert_eq!(find_cycle(&reg, &[a, b, c], a), None);
    }
}
