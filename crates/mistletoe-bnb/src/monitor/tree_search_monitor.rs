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

//! Tree search monitoring interface
//!
//! Declares the `TreeSearchMonitor` trait and `PruneReason` for observing and
//! controlling branch-and-bound. Callbacks track the solver lifecycle, and a
//! monitor can stop the search via `SearchCommand` (default: Continue).
//!
//! Lifecycle
//! - enter -> step -> {bound/prune | decisions/descend/backtrack} -> solution -> exit
//! - `BnbSolverStatistics` is provided to every callback for telemetry.

use crate::{branching::decision::Decision, state::SearchState, stats::BnbSolverStatistics};
use mistletoe_model::{assignment::Assignment, model::ConstraintModel};
use mistletoe_search::monitor::search_monitor::SearchCommand;

/// Why a node was discarded.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PruneReason {
    /// Propagation found a rule violation or a participant that cannot reach
    /// its degree target.
    Infeasible,
    /// The upper bound does not exceed the incumbent.
    BoundDominated,
}

impl std::fmt::Display for PruneReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PruneReason::Infeasible => write!(f, "Infeasible"),
            PruneReason::BoundDominated => write!(f, "BoundDominated"),
        }
    }
}

pub trait TreeSearchMonitor {
    fn name(&self) -> &str;

    fn on_enter_search(&mut self, model: &ConstraintModel, statistics: &BnbSolverStatistics);

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics);

    /// Polled once per step; anything but `Continue` stops the search.
    fn search_command(
        &mut self,
        _state: &SearchState,
        _statistics: &BnbSolverStatistics,
    ) -> SearchCommand {
        SearchCommand::Continue
    }

    fn on_step(&mut self, state: &SearchState, statistics: &BnbSolverStatistics);

    /// Called after the bound of a node has been evaluated.
    fn on_upper_bound_computed(
        &mut self,
        state: &SearchState,
        upper_bound: f64,
        estimated_remaining: f64,
        statistics: &BnbSolverStatistics,
    );

    fn on_prune(
        &mut self,
        state: &SearchState,
        reason: PruneReason,
        statistics: &BnbSolverStatistics,
    );

    fn on_decisions_enqueued(
        &mut self,
        state: &SearchState,
        count: usize,
        statistics: &BnbSolverStatistics,
    );

    fn on_descend(
        &mut self,
        state: &SearchState,
        decision: Decision,
        statistics: &BnbSolverStatistics,
    );

    fn on_backtrack(&mut self, state: &SearchState, statistics: &BnbSolverStatistics);

    fn on_solution_found(&mut self, assignment: &Assignment, statistics: &BnbSolverStatistics);
}

impl std::fmt::Debug for dyn TreeSearchMonitor + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}

impl std::fmt::Display for dyn TreeSearchMonitor + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}
