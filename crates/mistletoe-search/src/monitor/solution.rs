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

//! # Solution Count Monitor
//!
//! Counts improving solutions in a shared `AtomicU64` and optionally stops the
//! search once the shared count reaches a limit. Every worker of a parallel
//! solve holds its own monitor over the same counter, so the limit is global.

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
use mistletoe_model::{assignment::Assignment, model::ConstraintModel};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct SolutionMonitor<'a> {
    solutions_found: &'a AtomicU64,
    solution_limit: Option<u64>,
}

impl<'a> SolutionMonitor<'a> {
    #[inline]
    pub fn new(solutions_found: &'a AtomicU64, solution_limit: Option<u64>) -> Self {
        Self {
            solutions_found,
            solution_limit,
        }
    }

    #[inline]
    pub fn with_limit(solutions_found: &'a AtomicU64, limit: u64) -> Self {
        Self::new(solutions_found, Some(limit))
    }

    #[inline]
    pub fn without_limit(solutions_found: &'a AtomicU64) -> Self {
        Self::new(solutions_found, None)
    }

    #[inline]
    fn reached_limit(&self) -> bool {
        self.solution_limit
            .is_some_and(|limit| self.solutions_found.load(Ordering::Relaxed) >= limit)
    }
}

impl<'a> SearchMonitor for SolutionMonitor<'a> {
    fn name(&self) -> &str {
        "SolutionMonitor"
    }

    fn on_enter_search(&mut self, _model: &ConstraintModel) {}

    fn on_exit_search(&mut self) {}

    fn on_solution_found(&mut self, _assignment: &Assignment) {
        self.solutions_found.fetch_add(1, Ordering::Relaxed);
    }

    fn on_step(&mut self) {}

    fn search_command(&self) -> SearchCommand {
        if self.reached_limit() {
            SearchCommand::Terminate("global solution limit reached".to_string())
        } else {
            SearchCommand::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SolutionMonitor;
    use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
    use mistletoe_model::{
        assignment::Assignment, index::ParticipantIndex, model::ModelBuilder,
        weights::WeightMatrix,
    };
    use std::sync::atomic::{AtomicU64, Ordering};

    fn dummy_assignment() -> Assignment {
        let model = ModelBuilder::new(WeightMatrix::uniform(2, 1.0).unwrap())
            .build()
            .unwrap();
        Assignment::from_edges(&model, [(ParticipantIndex::new(0), ParticipantIndex::new(1))])
    }

    #[test]
    fn test_terminates_at_limit() {
        let counter = AtomicU64::new(0);
        let mut monitor = SolutionMonitor::with_limit(&counter, 2);
        let assignment = dummy_assignment();

        assert_eq!(monitor.search_command(), SearchCommand::Continue);
        monitor.on_solution_found(&assignment);
        assert_eq!(monitor.search_command(), SearchCommand::Continue);
        monitor.on_solution_found(&assignment);
        assert_eq!(
            monitor.search_command(),
            SearchCommand::Terminate("global solution limit reached".to_string())
        );
    }

    #[test]
    fn test_shared_counter_is_global() {
        let counter = AtomicU64::new(0);
        let mut first = SolutionMonitor::with_limit(&counter, 2);
        let mut second = SolutionMonitor::with_limit(&counter, 2);
        let assignment = dummy_assignment();

        first.on_solution_found(&assignment);
        second.on_solution_found(&assignment);
        assert_eq!(counter.load(Ordering::Relaxed), 2);
        assert!(matches!(first.search_command(), SearchCommand::Terminate(_)));
        assert!(matches!(second.search_command(), SearchCommand::Terminate(_)));
    }

    #[test]
    fn test_without_limit_only_counts() {
        let counter = AtomicU64::new(0);
        let mut monitor = SolutionMonitor::without_limit(&counter);
        let assignment = dummy_assignment();
        for _ in 0..10 {
            monitor.on_solution_found(&assignment);
        }
        assert_eq!(counter.load(Ordering::Relaxed), 10);
        assert_eq!(monitor.search_command(), SearchCommand::Continue);
    }
}
