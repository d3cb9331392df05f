// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recognizer handles.

/// Identifier for a recognizer attached to a [`GestureEngine`](crate::GestureEngine).
///
/// This is a small, copyable handle consisting of a slot index and a
/// generation counter.
///
/// ## Semantics
///
/// - On attach, a fresh slot is allocated with generation `1`.
/// - On detach, the slot is freed; any existing `RecognizerId` that pointed to
///   that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new,
///   distinct `RecognizerId`.
///
/// Stale ids never alias a different live recognizer because the generation
/// must match. Use [`GestureEngine::is_alive`](crate::GestureEngine::is_alive)
/// to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RecognizerId(pub(crate) u32, pub(crate) u32);

impl RecognizerId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}
