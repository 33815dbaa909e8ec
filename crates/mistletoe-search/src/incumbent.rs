// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Shared Incumbent (Best Assignment Holder)
//!
//! A concurrent container for the best assignment discovered so far. Workers
//! read the objective of the incumbent through a lock-free `AtomicU64` that
//! holds the bits of an `f64`, and install improvements under a `Mutex` that
//! guards the assignment itself.
//!
//! The search maximizes, so the sentinel for "no incumbent yet" is
//! `f64::NEG_INFINITY`. Weights are finite, so every real objective compares
//! strictly above the sentinel.
//!
//! ## Usage
//!
//! ```rust
//! use mistletoe_search::incumbent::SharedIncumbent;
//! use mistletoe_model::{assignment::Assignment, index::ParticipantIndex};
//! use mistletoe_model::{model::ModelBuilder, weights::WeightMatrix};
//!
//! let model = ModelBuilder::new(WeightMatrix::uniform(3, 1.5).unwrap()).build().unwrap();
//! let inc = SharedIncumbent::new();
//! assert_eq!(inc.best_objective(), f64::NEG_INFINITY);
//!
//! let edge = (ParticipantIndex::new(0), ParticipantIndex::new(1));
//! let candidate = Assignment::from_edges(&model, [edge]);
//! assert!(inc.try_install(&candidate));
//! assert_eq!(inc.best_objective(), 1.5);
//! ```

use mistletoe_model::assignment::Assignment;
use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};

/// A concurrent holder for the best (incumbent) assignment found during search.
///
/// - `best_bits` is the objective of the incumbent as `f64::to_bits`, read with
///   `Ordering::Relaxed` by workers that only need a pruning threshold.
/// - `assignment` is the source of truth. Installs lock it, re-check against
///   the stored objective and then raise `best_bits` by compare-and-swap.
///
/// A poisoned lock is recovered rather than propagated: the stored value is
/// always a complete assignment, so a panic in another worker cannot leave it
/// half-written.
#[derive(Debug)]
pub struct SharedIncumbent {
    best_bits: AtomicU64,
    assignment: Mutex<Option<Assignment>>,
}

impl Default for SharedIncumbent {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SharedIncumbent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Incumbent(best_objective: {})", self.best_objective())
    }
}

impl SharedIncumbent {
    /// Creates a new shared incumbent with no assignment installed.
    #[inline]
    pub fn new() -> Self {
        SharedIncumbent {
            best_bits: AtomicU64::new(f64::NEG_INFINITY.to_bits()),
            assignment: Mutex::new(None),
        }
    }

    /// Returns the objective of the current incumbent, or negative infinity.
    #[inline]
    pub fn best_objective(&self) -> f64 {
        f64::from_bits(self.best_bits.load(Ordering::Relaxed))
    }

    /// Returns `true` if an assignment has been installed.
    #[inline]
    pub fn has_solution(&self) -> bool {
        self.best_objective() > f64::NEG_INFINITY
    }

    /// Returns a clone of the current incumbent, if any.
    pub fn snapshot(&self) -> Option<Assignment> {
        let guard = self
            .assignment
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    /// Attempts to install `candidate` as the new incumbent.
    ///
    /// Returns `true` only if its objective is strictly greater than the
    /// objective of the current incumbent.
    pub fn try_install(&self, candidate: &Assignment) -> bool {
        let candidate_objective = candidate.objective();
        if candidate_objective <= self.best_objective() {
            return false;
        }

        let mut guard = self
            .assignment
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // The hint may be stale; the stored assignment decides.
        if let Some(current) = guard.as_ref() {
            if candidate_objective <= current.objective() {
                return false;
            }
        }

        *guard = Some(candidate.clone());
        let _ = self
            .best_bits
            .fetch_update(Ordering::Release, Ordering::Relaxed, |bits| {
                (candidate_objective > f64::from_bits(bits)).then(|| candidate_objective.to_bits())
            });

        true
    }

    /// Consumes the incumbent and returns the stored assignment.
    pub fn into_inner(self) -> Option<Assignment> {
        self.assignment
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
