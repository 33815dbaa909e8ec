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

//! Adapter for solver-agnostic search monitors
//!
//! `WrapperMonitor` bridges this crate's `TreeSearchMonitor` with a generic
//! `SearchMonitor` from `mistletoe_search`. It forwards lifecycle events and
//! commands to the inner monitor while ignoring tree-specific callbacks.
//!
//! Behavior
//! - Delegates: enter, step, solution, exit, and `search_command`.
//! - No-ops: prune, descend, backtrack, bound, and decisions-enqueued.
//! - `name()` is `WrapperMonitor(inner.name())`.

use crate::{
    branching::decision::Decision,
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    state::SearchState,
    stats::BnbSolverStatistics,
};
use mistletoe_model::{assignment::Assignment, model::ConstraintModel};
use mistletoe_search::monitor::search_monitor::{SearchCommand, SearchMonitor};

pub struct WrapperMonitor<'a> {
    inner: &'a mut dyn SearchMonitor,
    name: String,
}

impl<'a> WrapperMonitor<'a> {
    #[inline(always)]
    pub fn new(inner: &'a mut dyn SearchMonitor) -> Self {
        let name = format!("WrapperMonitor({})", inner.name());
        Self { inner, name }
    }
}

impl<'a> std::fmt::Debug for WrapperMonitor<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrapperMonitor")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<'a> TreeSearchMonitor for WrapperMonitor<'a> {
    #[inline(always)]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    fn on_enter_search(&mut self, model: &ConstraintModel, _statistics: &BnbSolverStatistics) {
        self.inner.on_enter_search(model);
    }

    #[inline(always)]
    fn on_exit_search(&mut self, _statistics: &BnbSolverStatistics) {
        self.inner.on_exit_search();
    }

    #[inline(always)]
    fn search_command(
        &mut self,
        _state: &SearchState,
        _statistics: &BnbSolverStatistics,
    ) -> SearchCommand {
        self.inner.search_command()
    }

    #[inline(always)]
    fn on_step(&mut self, _state: &SearchState, _statistics: &BnbSolverStatistics) {
        self.inner.on_step();
    }

    #[inline(always)]
    fn on_upper_bound_computed(
        &mut self,
        _state: &SearchState,
        _upper_bound: f64,
        _estimated_remaining: f64,
        _statistics: &BnbSolverStatistics,
    ) {
    }

    #[inline(always)]
    fn on_prune(
        &mut self,
        _state: &SearchState,
        _reason: PruneReason,
        _statistics: &BnbSolverStatistics,
    ) {
    }

    #[inline(always)]
    fn on_decisions_enqueued(
        &mut self,
        _state: &SearchState,
        _count: usize,
        _statistics: &BnbSolverStatistics,
    ) {
    }

    #[inline(always)]
    fn on_descend(
        &mut self,
        _state: &SearchState,
        _decision: Decision,
        _statistics: &BnbSolverStatistics,
    ) {
    }

    #[inline(always)]
    fn on_backtrack(&mut self, _state: &SearchState, _statistics: &BnbSolverStatistics) {}

    #[inline(always)]
    fn on_solution_found(&mut self, assignment: &Assignment, _statistics: &BnbSolverStatistics) {
        self.inner.on_solution_found(assignment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mistletoe_model::{index::ParticipantIndex, model::ModelBuilder, weights::WeightMatrix};
    use mistletoe_search::monitor::solution::SolutionMonitor;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_forwards_solutions_and_commands() {
        let model = ModelBuilder::new(WeightMatrix::uniform(5, 1.0).unwrap())
            .build()
            .unwrap();
        let state = SearchState::new(&model);
        let stats = BnbSolverStatistics::default();
        let assignment =
            Assignment::from_edges(&model, [(ParticipantIndex::new(0), ParticipantIndex::new(1))]);

        let counter = AtomicU64::new(0);
        let mut inner = SolutionMonitor::with_limit(&counter, 1);
        let mut wrapper = WrapperMonitor::new(&mut inner);
        assert_eq!(wrapper.name(), "WrapperMonitor(SolutionMonitor)");

        wrapper.on_enter_search(&model, &stats);
        assert_eq!(wrapper.search_command(&state, &stats), SearchCommand::Continue);
        wrapper.on_solution_found(&assignment, &stats);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
        assert!(matches!(
            wrapper.search_command(&state, &stats),
            SearchCommand::Terminate(_)
        ));
    }
}
