// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by engine operations.

use core::fmt;

use crate::RecognizerId;

/// Error returned when an engine operation cannot be applied.
///
/// Recognition itself never fails with an error; anomalies during dispatch are
/// modelled as state transitions. These errors only report API misuse.
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum GestureError {
    /// The recognizer was detached, or the id belongs to another engine.
    StaleRecognizer(RecognizerId),
}

impl fmt::Debug for GestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleRecognizer(id) => write!(f, "StaleRecognizer({id:?})"),
        }
    }
}

impl fmt::Display for GestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleRecognizer(id) => {
                write!(f, "recognizer {id:?} is not attached to this engine")
            }
        }
    }
}

impl core::error::Error for GestureError {}
