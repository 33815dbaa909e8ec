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

//! Monitoring combinators for tree search
//!
//! Provides `CompositeTreeSearchMonitor`, a fan-out monitor that forwards every
//! event to its children, so logging and early stopping can be mixed without
//! coupling them to the solver.
//!
//! Behavior
//! - Events are dispatched to child monitors in insertion order.
//! - `search_command` short-circuits on the first non-`Continue` response;
//!   put stricter stop conditions first.
//! - Other callbacks always fan out to all children.

use crate::{
    branching::decision::Decision,
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    state::SearchState,
    stats::BnbSolverStatistics,
};
use mistletoe_model::{assignment::Assignment, model::ConstraintModel};
use mistletoe_search::monitor::search_monitor::SearchCommand;

pub struct CompositeTreeSearchMonitor<'a> {
    monitors: Vec<Box<dyn TreeSearchMonitor + 'a>>,
}

impl<'a> Default for CompositeTreeSearchMonitor<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CompositeTreeSearchMonitor<'a> {
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: TreeSearchMonitor + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    #[inline(always)]
    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn TreeSearchMonitor + 'a>) {
        self.monitors.push(monitor);
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl<'a> FromIterator<Box<dyn TreeSearchMonitor + 'a>> for CompositeTreeSearchMonitor<'a> {
    #[inline(always)]
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn TreeSearchMonitor + 'a>>,
    {
        Self {
            monitors: iter.into_iter().collect(),
        }
    }
}

impl<'a> std::fmt::Debug for CompositeTreeSearchMonitor<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeTreeSearchMonitor")
            .field("monitors", &self.monitors)
            .finish()
    }
}

impl<'a> TreeSearchMonitor for CompositeTreeSearchMonitor<'a> {
    #[inline(always)]
    fn name(&self) -> &str {
        "CompositeTreeSearchMonitor"
    }

    #[inline(always)]
    fn on_enter_search(&mut self, model: &ConstraintModel, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_enter_search(model, statistics);
        }
    }

    #[inline(always)]
    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search(statistics);
        }
    }

    #[inline(always)]
    fn search_command(
        &mut self,
        state: &SearchState,
        statistics: &BnbSolverStatistics,
    ) -> SearchCommand {
        for monitor in &mut self.monitors {
            let command = monitor.search_command(state, statistics);
            if !matches!(command, SearchCommand::Continue) {
                return command;
            }
        }
        SearchCommand::Continue
    }

    #[inline(always)]
    fn on_step(&mut self, state: &SearchState, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_step(state, statistics);
        }
    }

    #[inline(always)]
    fn on_upper_bound_computed(
        &mut self,
        state: &SearchState,
        upper_bound: f64,
        estimated_remaining: f64,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_upper_bound_computed(state, upper_bound, estimated_remaining, statistics);
        }
    }

    #[inline(always)]
    fn on_prune(
        &mut self,
        state: &SearchState,
        reason: PruneReason,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_prune(state, reason, statistics);
        }
    }

    #[inline(always)]
    fn on_decisions_enqueued(
        &mut self,
        state: &SearchState,
        count: usize,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_decisions_enqueued(state, count, statistics);
        }
    }

    #[inline(always)]
    fn on_descend(
        &mut self,
        state: &SearchState,
        decision: Decision,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_descend(state, decision, statistics);
        }
    }

    #[inline(always)]
    fn on_backtrack(&mut self, state: &SearchState, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_backtrack(state, statistics);
        }
    }

    #[inline(always)]
    fn on_solution_found(&mut self, assignment: &Assignment, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_solution_found(assignment, statistics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{no_op::NoOperationMonitor, wrapper::WrapperMonitor};
    use mistletoe_model::{model::ModelBuilder, weights::WeightMatrix};
    use mistletoe_search::monitor::interrupt::InterruptMonitor;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_first_terminate_wins() {
        let model = ModelBuilder::new(WeightMatrix::uniform(5, 1.0).unwrap())
            .build()
            .unwrap();
        let state = SearchState::new(&model);
        let stats = BnbSolverStatistics::default();
        let flag = AtomicBool::new(false);
        let mut interrupt = InterruptMonitor::new(&flag);

        let mut composite = CompositeTreeSearchMonitor::with_capacity(2);
        composite.add_monitor(NoOperationMonitor::new());
        composite.add_monitor(WrapperMonitor::new(&mut interrupt));
        assert_eq!(composite.len(), 2);

        composite.on_enter_search(&model, &stats);
        assert_eq!(composite.search_command(&state, &stats), SearchCommand::Continue);

        flag.store(true, Ordering::Relaxed);
        assert_eq!(
            composite.search_command(&state, &stats),
            SearchCommand::Terminate("interrupt signal received".to_string())
        );
    }

    #[test]
    fn test_empty_composite_continues() {
        let model = ModelBuilder::new(WeightMatrix::uniform(5, 1.0).unwrap())
            .build()
            .unwrap();
        let state = SearchState::new(&model);
        let mut composite = CompositeTreeSearchMonitor::default();
        assert!(composite.is_empty());
        assert_eq!(
            composite.search_command(&state, &BnbSolverStatistics::default()),
            SearchCommand::Continue
        );
    }
}
