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

//! Incumbent management for branch-and-bound
//!
//! Declares `IncumbentStore`, a minimal interface to read/update the best
//! known objective (a lower bound on the optimum, since the search maximizes)
//! and publish new solutions during search.
//!
//! Implementations
//! - `NoSharedIncumbent`: local only. `initial_lower_bound = -inf`,
//!   `tighten(x) = x`, and `on_solution_found` is a no-op.
//! - `SharedIncumbentAdapter<'a>`: wraps `mistletoe_search::incumbent::SharedIncumbent`;
//!   `initial_lower_bound()` mirrors the shared value, `tighten(x)` returns
//!   `max(shared, x)`, and `on_solution_found` attempts installation.

use mistletoe_model::assignment::Assignment;
use mistletoe_search::incumbent::SharedIncumbent;

/// Synchronizes the local best objective of one search with the outside.
pub trait IncumbentStore {
    /// Returns the objective a solution must beat at the start of the search.
    fn initial_lower_bound(&self) -> f64;
    /// Combines the local best objective with whatever is known externally.
    fn tighten(&self, current_local_best: f64) -> f64;
    /// Notifies the backing that a new improving solution has been found.
    fn on_solution_found(&self, assignment: &Assignment);
}

/// An `IncumbentStore` that does not share anything. Use this for
/// single-threaded or isolated solving.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSharedIncumbent;

impl NoSharedIncumbent {
    #[inline(always)]
    pub fn new() -> Self {
        Self
    }
}

impl IncumbentStore for NoSharedIncumbent {
    #[inline(always)]
    fn initial_lower_bound(&self) -> f64 {
        f64::NEG_INFINITY
    }

    #[inline(always)]
    fn tighten(&self, current_local_best: f64) -> f64 {
        current_local_best
    }

    #[inline(always)]
    fn on_solution_found(&self, _: &Assignment) {}
}

/// An `IncumbentStore` backed by a `SharedIncumbent` that several workers
/// read and update concurrently.
#[repr(transparent)]
#[derive(Debug, Clone, Copy)]
pub struct SharedIncumbentAdapter<'a> {
    inner: &'a SharedIncumbent,
}

impl<'a> SharedIncumbentAdapter<'a> {
    #[inline(always)]
    pub fn new(inner: &'a SharedIncumbent) -> Self {
        Self { inner }
    }
}

impl<'a> IncumbentStore for SharedIncumbentAdapter<'a> {
    #[inline(always)]
    fn initial_lower_bound(&self) -> f64 {
        self.inner.best_objective()
    }

    #[inline(always)]
    fn tighten(&self, current_local_best: f64) -> f64 {
        self.inner.best_objective().max(current_local_best)
    }

    #[inline(always)]
    fn on_solution_found(&self, assignment: &Assignment) {
        self.inner.try_install(assignment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mistletoe_model::{index::ParticipantIndex, model::ModelBuilder, weights::WeightMatrix};

    fn assignment(weight: f64) -> Assignment {
        let model = ModelBuilder::new(WeightMatrix::uniform(2, weight).unwrap())
            .build()
            .unwrap();
        Assignment::from_edges(&model, [(ParticipantIndex::new(0), ParticipantIndex::new(1))])
    }

    #[test]
    fn test_no_shared_incumbent_is_local() {
        let store = NoSharedIncumbent::new();
        assert_eq!(store.initial_lower_bound(), f64::NEG_INFINITY);
        assert_eq!(store.tighten(3.0), 3.0);
        store.on_solution_found(&assignment(1.0));
        assert_eq!(store.tighten(f64::NEG_INFINITY), f64::NEG_INFINITY);
    }

    #[test]
    fn test_shared_adapter_tightens_to_max() {
        let shared = SharedIncumbent::new();
        let store = SharedIncumbentAdapter::new(&shared);
        assert_eq!(store.initial_lower_bound(), f64::NEG_INFINITY);

        store.on_solution_found(&assignment(4.0));
        assert_eq!(shared.best_objective(), 4.0);
        assert_eq!(store.initial_lower_bound(), 4.0);
        assert_eq!(store.tighten(2.0), 4.0);
        assert_eq!(store.tighten(6.0), 6.0);

        // Worse solutions never replace the shared one.
        store.on_solution_found(&assignment(3.0));
        assert_eq!(shared.best_objective(), 4.0);
    }
}
