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

//! # Parallel Branch-and-Bound Orchestrator
//!
//! Splits the search tree of a `ConstraintModel` into independent subtrees,
//! solves them on a pool of scoped worker threads, and combines the results
//! into one `SolverOutcome`.
//!
//! ## Highlights
//!
//! - Subtree execution:
//!   - `SubtreeSplitter` fixes the first `split_depth` branch decisions,
//!     giving up to `2^split_depth` subtrees.
//!   - Workers spawned with `std::thread::scope` pull subtrees from a shared
//!     atomic cursor, each with its own `BnbSolver`.
//! - Shared state:
//!   - `SharedIncumbent` stores the best assignment (atomic objective hint
//!     plus a mutex-guarded assignment). Workers prune against it.
//!   - A global `AtomicU64` solution counter and an `AtomicBool` stop signal.
//! - Termination:
//!   - Every worker stacks an interrupt monitor on the stop signal, the
//!     optional external interrupt, the solution limit and the deadline.
//!   - The first worker to abort raises the stop signal for all others.
//! - Outcome construction:
//!   - Any abort gives `Cancelled` with the best assignment so far;
//!     otherwise the search is exhaustive and the result is `Optimal` or
//!     `Infeasible`.
//!
//! ## Usage
//!
//! ```rust
//! use mistletoe_model::{model::ModelBuilder, weights::WeightMatrix};
//! use mistletoe_search::result::SolverResult;
//! use mistletoe_solver::solver::SolverBuilder;
//!
//! let model = ModelBuilder::new(WeightMatrix::uniform(5, 1.0).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let solver = SolverBuilder::new().with_threads(2).build();
//! let outcome = solver.solve(&model);
//! assert_eq!(outcome.result.objective(), Some(10.0));
//! assert!(matches!(outcome.result, SolverResult::Optimal(_)));
//! ```

use mistletoe_bnb::{
    bnb::BnbSolver,
    branching::heaviest::HeaviestEdgeBuilder,
    fixed::FixedEdge,
    monitor::{
        composite::CompositeTreeSearchMonitor, log::LogTreeSearchMonitor,
        wrapper::WrapperMonitor,
    },
    split::SubtreeSplitter,
};
use mistletoe_model::{assignment::Assignment, model::ConstraintModel};
use mistletoe_search::{
    incumbent::SharedIncumbent,
    monitor::{
        composite::CompositeMonitor, deadline::DeadlineMonitor, interrupt::InterruptMonitor,
        solution::SolutionMonitor,
    },
    result::{SolverOutcome, TerminationReason},
    stats::{SolverStatistics, SolverStatisticsBuilder},
};
use std::{
    sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

/// Why a worker stopped early.
#[derive(Debug, Clone)]
struct WorkerAbort {
    reason: String,
    /// `true` for the worker that raised the stop signal.
    initiated: bool,
}

#[derive(Debug, Clone, Default)]
struct WorkerReport {
    subtrees_solved: usize,
    nodes_explored: u64,
    prunings: u64,
    abort: Option<WorkerAbort>,
}

/// Borrowed, per-solve state every worker reads.
struct SolveContext<'s, 'a> {
    model: &'s ConstraintModel,
    subtrees: &'s [Vec<FixedEdge>],
    cursor: &'s AtomicUsize,
    incumbent: &'s SharedIncumbent,
    solution_count: &'s AtomicU64,
    stop_signal: &'s AtomicBool,
    interrupt: Option<&'a AtomicBool>,
    solution_limit: Option<u64>,
    deadline: Option<Instant>,
    log_interval: Option<Duration>,
}

/// A configured parallel solver. Build one with `SolverBuilder`.
#[derive(Debug, Clone)]
pub struct Solver<'a> {
    threads: usize,
    split_depth: usize,
    solution_limit: Option<u64>,
    time_limit: Option<Duration>,
    deadline: Option<Instant>,
    interrupt: Option<&'a AtomicBool>,
    log_interval: Option<Duration>,
}

impl<'a> Solver<'a> {
    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    #[inline]
    pub fn split_depth(&self) -> usize {
        self.split_depth
    }

    #[inline]
    pub fn solution_limit(&self) -> Option<u64> {
        self.solution_limit
    }

    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Solves `model` to proven optimality, infeasibility, or cancellation.
    pub fn solve(&self, model: &ConstraintModel) -> SolverOutcome {
        let start_time = Instant::now();
        let deadline = self.effective_deadline(start_time);

        let subtrees =
            SubtreeSplitter::new(self.split_depth).split(model, &mut HeaviestEdgeBuilder::new());
        info!(
            participants = model.participant_count(),
            candidate_edges = model.num_candidate_edges(),
            threads = self.threads,
            subtrees = subtrees.len(),
            "solve started"
        );

        if subtrees.is_empty() {
            let stats = SolverStatisticsBuilder::new()
                .used_threads(0)
                .subtrees(0)
                .solve_duration(start_time.elapsed())
                .build();
            info!(elapsed = ?start_time.elapsed(), "solve finished: root infeasible");
            return SolverOutcome::infeasible(stats);
        }

        let incumbent = SharedIncumbent::new();
        let solution_count = AtomicU64::new(0);
        let stop_signal = AtomicBool::new(false);
        let cursor = AtomicUsize::new(0);
        let ctx = SolveContext {
            model,
            subtrees: &subtrees,
            cursor: &cursor,
            incumbent: &incumbent,
            solution_count: &solution_count,
            stop_signal: &stop_signal,
            interrupt: self.interrupt,
            solution_limit: self.solution_limit,
            deadline,
            log_interval: self.log_interval,
        };

        let used_threads = self.threads.min(subtrees.len()).max(1);
        let reports = Self::run_workers(&ctx, used_threads);

        let stats = Self::build_statistics(
            &reports,
            solution_count.load(Ordering::Relaxed),
            used_threads,
            subtrees.len(),
            start_time,
        );
        Self::construct_outcome(&reports, incumbent.into_inner(), stats)
    }

    /// The earlier of the absolute deadline and `start + time_limit`.
    fn effective_deadline(&self, start_time: Instant) -> Option<Instant> {
        let from_limit = self
            .time_limit
            .and_then(|limit| start_time.checked_add(limit));
        match (self.deadline, from_limit) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn run_workers(ctx: &SolveContext<'_, 'a>, threads: usize) -> Vec<WorkerReport> {
        if threads == 1 {
            return vec![Self::run_worker(ctx, 0)];
        }

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|worker| scope.spawn(move || Self::run_worker(ctx, worker)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        })
    }

    fn run_worker(ctx: &SolveContext<'_, 'a>, worker: usize) -> WorkerReport {
        let mut global = CompositeMonitor::with_capacity(4);
        global.add_monitor(InterruptMonitor::new(ctx.stop_signal));
        if let Some(flag) = ctx.interrupt {
            global.add_monitor(InterruptMonitor::new(flag));
        }
        global.add_monitor(SolutionMonitor::new(ctx.solution_count, ctx.solution_limit));
        if let Some(deadline) = ctx.deadline {
            global.add_monitor(DeadlineMonitor::new(deadline));
        }

        let mut solver = BnbSolver::preallocated(ctx.model);
        let mut builder = HeaviestEdgeBuilder::new();
        let mut report = WorkerReport::default();
        debug!(worker, "worker started");

        loop {
            let index = ctx.cursor.fetch_add(1, Ordering::Relaxed);
            let Some(prefix) = ctx.subtrees.get(index) else {
                break;
            };

            let mut monitor = CompositeTreeSearchMonitor::with_capacity(2);
            monitor.add_monitor(WrapperMonitor::new(&mut global));
            if let Some(interval) = ctx.log_interval {
                monitor.add_monitor(LogTreeSearchMonitor::with_interval(interval));
            }

            let outcome = solver.solve_with_fixed_and_incumbent(
                ctx.model,
                prefix,
                &mut builder,
                monitor,
                ctx.incumbent,
            );

            let stats = outcome.statistics();
            report.subtrees_solved += 1;
            report.nodes_explored += stats.nodes_explored;
            report.prunings += stats.total_prunings();
            debug!(
                worker,
                subtree = index,
                prefix_len = prefix.len(),
                nodes = stats.nodes_explored,
                objective = ?outcome.result().objective(),
                "subtree finished"
            );

            if let TerminationReason::Aborted(reason) = outcome.termination_reason() {
                let initiated = !ctx.stop_signal.swap(true, Ordering::Relaxed);
                report.abort = Some(WorkerAbort {
                    reason: reason.clone(),
                    initiated,
                });
                break;
            }
        }

        debug!(
            worker,
            subtrees = report.subtrees_solved,
            nodes = report.nodes_explored,
            "worker finished"
        );
        report
    }

    fn build_statistics(
        reports: &[WorkerReport],
        solutions_found: u64,
        used_threads: usize,
        subtrees: usize,
        start_time: Instant,
    ) -> SolverStatistics {
        SolverStatisticsBuilder::new()
            .solutions_found(solutions_found)
            .used_threads(used_threads)
            .subtrees(subtrees)
            .nodes_explored(reports.iter().map(|r| r.nodes_explored).sum())
            .prunings(reports.iter().map(|r| r.prunings).sum())
            .solve_duration(start_time.elapsed())
            .build()
    }

    fn construct_outcome(
        reports: &[WorkerReport],
        best: Option<Assignment>,
        stats: SolverStatistics,
    ) -> SolverOutcome {
        // The worker that raised the stop signal knows the real reason.
        let abort = reports
            .iter()
            .filter_map(|r| r.abort.as_ref())
            .min_by_key(|a| !a.initiated);

        match (abort, best) {
            (Some(abort), best) => {
                warn!(
                    reason = %abort.reason,
                    best = ?best.as_ref().map(|a| a.objective()),
                    nodes = stats.nodes_explored,
                    "solve cancelled"
                );
                SolverOutcome::cancelled(best, abort.reason.clone(), stats)
            }
            (None, Some(best)) => {
                info!(
                    objective = best.objective(),
                    nodes = stats.nodes_explored,
                    elapsed = ?stats.solve_duration,
                    "solve finished: optimal"
                );
                SolverOutcome::optimal(best, stats)
            }
            (None, None) => {
                info!(
                    nodes = stats.nodes_explored,
                    elapsed = ?stats.solve_duration,
                    "solve finished: infeasible"
                );
                SolverOutcome::infeasible(stats)
            }
        }
    }
}

/// Configures a `Solver`.
///
/// # Defaults
///
/// | Field | Default |
/// | :--- | :--- |
/// | `threads` | available parallelism |
/// | `split_depth` | `SubtreeSplitter::DEFAULT_DEPTH` |
/// | limits | none |
/// | logging | off |
#[derive(Debug, Clone)]
pub struct SolverBuilder<'a> {
    threads: usize,
    split_depth: usize,
    solution_limit: Option<u64>,
    time_limit: Option<Duration>,
    deadline: Option<Instant>,
    interrupt: Option<&'a AtomicBool>,
    log_interval: Option<Duration>,
}

impl<'a> Default for SolverBuilder<'a> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SolverBuilder<'a> {
    #[inline]
    pub fn new() -> Self {
        Self {
            threads: std::thread::available_parallelism().map_or(1, |n| n.get()),
            split_depth: SubtreeSplitter::DEFAULT_DEPTH,
            solution_limit: None,
            time_limit: None,
            deadline: None,
            interrupt: None,
            log_interval: None,
        }
    }

    /// Sets the number of worker threads. Zero is treated as one.
    #[inline]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    #[inline]
    pub fn with_split_depth(mut self, depth: usize) -> Self {
        self.split_depth = depth;
        self
    }

    /// Stops the search once this many improving solutions were found.
    #[inline]
    pub fn with_solution_limit(mut self, limit: u64) -> Self {
        self.solution_limit = Some(limit);
        self
    }

    /// Limits the wall-clock time of each `solve`, measured from its start.
    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Stops the search as soon as `flag` is set.
    #[inline]
    pub fn with_interrupt(mut self, flag: &'a AtomicBool) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Emits progress events through `tracing` at most once per `interval`
    /// and worker.
    #[inline]
    pub fn with_logging(mut self, interval: Duration) -> Self {
        self.log_interval = Some(interval);
        self
    }

    #[inline]
    pub fn build(self) -> Solver<'a> {
        Solver {
            threads: self.threads,
            split_depth: self.split_depth,
            solution_limit: self.solution_limit,
            time_limit: self.time_limit,
            deadline: self.deadline,
            interrupt: self.interrupt,
            log_interval: self.log_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mistletoe_model::{
        extract::SolutionExtractor, index::ParticipantIndex, model::ModelBuilder,
        weights::WeightMatrix,
    };
    use mistletoe_search::result::SolverResult;

    fn build_model(n: usize) -> ConstraintModel {
        let weights =
            WeightMatrix::from_fn(n, |i, j| ((i.get() * 7 + j.get() * 13) % 10) as f64 + 1.0)
                .unwrap();
        let mut builder = ModelBuilder::new(weights);
        builder.add_couple(ParticipantIndex::new(0), ParticipantIndex::new(1));
        builder.add_last_year(
            ParticipantIndex::new(2),
            [ParticipantIndex::new(3), ParticipantIndex::new(4)],
        );
        builder.build().unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let solver = SolverBuilder::new().build();
        assert!(solver.threads() >= 1);
        assert_eq!(solver.split_depth(), 4);
        assert_eq!(solver.solution_limit(), None);
        assert_eq!(solver.time_limit(), None);
        assert_eq!(solver.deadline(), None);
        assert_eq!(SolverBuilder::new().with_threads(0).build().threads(), 1);
    }

    #[test]
    fn test_effective_deadline_takes_the_earlier() {
        let start = Instant::now();
        let solver = SolverBuilder::new()
            .with_time_limit(Duration::from_secs(10))
            .with_deadline(start + Duration::from_secs(5))
            .build();
        assert_eq!(
            solver.effective_deadline(start),
            Some(start + Duration::from_secs(5))
        );

        let solver = SolverBuilder::new()
            .with_time_limit(Duration::from_secs(1))
            .build();
        assert_eq!(
            solver.effective_deadline(start),
            Some(start + Duration::from_secs(1))
        );
        assert_eq!(SolverBuilder::new().build().effective_deadline(start), None);
    }

    #[test]
    fn test_thread_counts_agree() {
        let model = build_model(8);
        let sequential = SolverBuilder::new().with_threads(1).build().solve(&model);
        assert!(sequential.is_optimal());
        assert!(
            SolutionExtractor::new(&model)
                .verify(sequential.result.assignment().unwrap())
                .is_ok()
        );

        for threads in [2, 4] {
            let parallel = SolverBuilder::new()
                .with_threads(threads)
                .build()
                .solve(&model);
            assert!(parallel.is_optimal());
            assert_eq!(parallel.result.objective(), sequential.result.objective());
            assert!(parallel.statistics.used_threads <= threads);
        }
    }

    #[test]
    fn test_single_thread_is_reproducible() {
        let model = build_model(7);
        let solver = SolverBuilder::new().with_threads(1).build();
        let first = solver.solve(&model);
        let second = solver.solve(&model);
        assert_eq!(first.result, second.result);
        assert_eq!(
            first.statistics.nodes_explored,
            second.statistics.nodes_explored
        );
    }

    #[test]
    fn test_infeasible_root_skips_workers() {
        let model = ModelBuilder::new(WeightMatrix::uniform(4, 1.0).unwrap())
            .build()
            .unwrap();
        let outcome = SolverBuilder::new().with_threads(4).build().solve(&model);
        assert!(outcome.is_infeasible());
        assert_eq!(outcome.statistics.used_threads, 0);
    }

    #[test]
    fn test_raised_interrupt_cancels() {
        let model = build_model(8);
        let flag = AtomicBool::new(true);
        let outcome = SolverBuilder::new()
            .with_threads(2)
            .with_interrupt(&flag)
            .build()
            .solve(&model);

        assert_eq!(outcome.result, SolverResult::Cancelled(None));
        assert_eq!(
            outcome.reason,
            TerminationReason::Aborted("interrupt signal received".to_string())
        );
    }

    #[test]
    fn test_solution_limit_cancels_with_incumbent() {
        let model = build_model(9);
        let outcome = SolverBuilder::new()
            .with_threads(1)
            .with_split_depth(0)
            .with_solution_limit(1)
            .build()
            .solve(&model);

        assert!(outcome.is_cancelled());
        assert!(outcome.has_solution());
        assert_eq!(
            outcome.reason,
            TerminationReason::Aborted("global solution limit reached".to_string())
        );
    }
}
