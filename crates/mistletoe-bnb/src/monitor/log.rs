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

//! Progress logging through `tracing`
//!
//! `LogTreeSearchMonitor` emits an `info!` progress event at most once per
//! `log_interval`. The clock is only read when
//! `(nodes_explored & clock_check_mask) == 0`, so cheap nodes stay cheap.
//! New incumbents are reported at `debug!` level and the end of the search
//! produces one `info!` summary.
//!
//! The monitor never installs a subscriber; the application decides where the
//! events go.

use crate::{
    branching::decision::Decision,
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    state::SearchState,
    stats::BnbSolverStatistics,
};
use mistletoe_model::{assignment::Assignment, model::ConstraintModel};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct LogTreeSearchMonitor {
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
    best_objective: Option<f64>,
    last_upper_bound: f64,
    depth: u64,
    log_lines: u64,
}

impl LogTreeSearchMonitor {
    /// 4096 - 1 = 4095 = 0xFFF
    pub const DEFAULT_CLOCK_CHECK_MASK: u64 = 0xFFF;

    pub fn new(log_interval: Duration, clock_check_mask: u64) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_log_time: now,
            log_interval,
            clock_check_mask,
            best_objective: None,
            last_upper_bound: f64::INFINITY,
            depth: 0,
            log_lines: 0,
        }
    }

    #[inline]
    pub fn with_interval(log_interval: Duration) -> Self {
        Self::new(log_interval, Self::DEFAULT_CLOCK_CHECK_MASK)
    }

    /// Number of progress events emitted since the search started.
    #[inline]
    pub fn log_lines(&self) -> u64 {
        self.log_lines
    }

    #[inline]
    pub fn best_objective(&self) -> Option<f64> {
        self.best_objective
    }

    fn log_progress(&mut self, state: &SearchState, stats: &BnbSolverStatistics) {
        let now = Instant::now();
        info!(
            elapsed = format_args!("{:.1}s", now.duration_since(self.start_time).as_secs_f32()),
            nodes = stats.nodes_explored,
            depth = self.depth,
            undecided = state.num_undecided(),
            best = self.best_objective.unwrap_or(f64::NEG_INFINITY),
            bound = self.last_upper_bound,
            backtracks = stats.backtracks,
            prunings_bound = stats.prunings_bound,
            prunings_infeasible = stats.prunings_infeasible,
            "branch-and-bound progress"
        );
        self.last_log_time = now;
        self.log_lines += 1;
    }
}

impl Default for LogTreeSearchMonitor {
    fn default() -> Self {
        Self::with_interval(Duration::from_secs(1))
    }
}

impl std::fmt::Display for LogTreeSearchMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LogTreeSearchMonitor(log_interval: {:?}, clock_check_mask: {})",
            self.log_interval, self.clock_check_mask
        )
    }
}

impl TreeSearchMonitor for LogTreeSearchMonitor {
    fn name(&self) -> &str {
        "LogTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, model: &ConstraintModel, _statistics: &BnbSolverStatistics) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.best_objective = None;
        self.last_upper_bound = f64::INFINITY;
        self.depth = 0;
        self.log_lines = 0;
        debug!(
            participants = model.participant_count(),
            candidate_edges = model.num_candidate_edges(),
            complexity = %model.complexity(),
            "branch-and-bound search started"
        );
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        info!(
            elapsed = ?self.start_time.elapsed(),
            nodes = statistics.nodes_explored,
            solutions = statistics.solutions_found,
            best = self.best_objective.unwrap_or(f64::NEG_INFINITY),
            "branch-and-bound search finished"
        );
    }

    fn on_step(&mut self, _state: &SearchState, _statistics: &BnbSolverStatistics) {}

    fn on_upper_bound_computed(
        &mut self,
        _state: &SearchState,
        upper_bound: f64,
        _estimated_remaining: f64,
        _statistics: &BnbSolverStatistics,
    ) {
        self.last_upper_bound = upper_bound;
    }

    fn on_prune(
        &mut self,
        _state: &SearchState,
        _reason: PruneReason,
        _statistics: &BnbSolverStatistics,
    ) {
    }

    fn on_decisions_enqueued(
        &mut self,
        _state: &SearchState,
        _count: usize,
        _statistics: &BnbSolverStatistics,
    ) {
    }

    fn on_descend(
        &mut self,
        state: &SearchState,
        _decision: Decision,
        statistics: &BnbSolverStatistics,
    ) {
        self.depth += 1;
        if (statistics.nodes_explored & self.clock_check_mask) == 0
            && self.last_log_time.elapsed() >= self.log_interval
        {
            self.log_progress(state, statistics);
        }
    }

    fn on_backtrack(&mut self, _state: &SearchState, _statistics: &BnbSolverStatistics) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn on_solution_found(&mut self, assignment: &Assignment, statistics: &BnbSolverStatistics) {
        self.best_objective = Some(assignment.objective());
        debug!(
            objective = assignment.objective(),
            nodes = statistics.nodes_explored,
            "new incumbent"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mistletoe_model::{index::ParticipantIndex, model::ModelBuilder, weights::WeightMatrix};

    #[test]
    fn test_logs_when_mask_and_interval_allow() {
        let model = ModelBuilder::new(WeightMatrix::uniform(5, 1.0).unwrap())
            .build()
            .unwrap();
        let state = SearchState::new(&model);
        let mut stats = BnbSolverStatistics::default();
        let decision = Decision::include(ParticipantIndex::new(0), ParticipantIndex::new(1));

        let mut monitor = LogTreeSearchMonitor::new(Duration::ZERO, 0b1);
        monitor.on_enter_search(&model, &stats);

        stats.nodes_explored = 1;
        monitor.on_descend(&state, decision, &stats);
        assert_eq!(monitor.log_lines(), 0);

        stats.nodes_explored = 2;
        monitor.on_descend(&state, decision, &stats);
        assert_eq!(monitor.log_lines(), 1);

        monitor.on_backtrack(&state, &stats);
        monitor.on_backtrack(&state, &stats);
        monitor.on_backtrack(&state, &stats);
        assert_eq!(monitor.depth, 0);
    }

    #[test]
    fn test_long_interval_suppresses_progress() {
        let model = ModelBuilder::new(WeightMatrix::uniform(5, 1.0).unwrap())
            .build()
            .unwrap();
        let state = SearchState::new(&model);
        let stats = BnbSolverStatistics::default();
        let decision = Decision::exclude(ParticipantIndex::new(0), ParticipantIndex::new(1));

        let mut monitor = LogTreeSearchMonitor::with_interval(Duration::from_secs(3600));
        monitor.on_enter_search(&model, &stats);
        for _ in 0..10 {
            monitor.on_descend(&state, decision, &stats);
        }
        assert_eq!(monitor.log_lines(), 0);
    }

    #[test]
    fn test_tracks_best_objective() {
        let model = ModelBuilder::new(WeightMatrix::uniform(5, 2.0).unwrap())
            .build()
            .unwrap();
        let stats = BnbSolverStatistics::default();
        let assignment =
            Assignment::from_edges(&model, [(ParticipantIndex::new(0), ParticipantIndex::new(1))]);

        let mut monitor = LogTreeSearchMonitor::default();
        monitor.on_enter_search(&model, &stats);
        assert_eq!(monitor.best_objective(), None);
        monitor.on_solution_found(&assignment, &stats);
        assert_eq!(monitor.best_objective(), Some(2.0));
        monitor.on_exit_search(&stats);
    }
}
