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

//! Branch-and-bound solver for the gift-exchange problem.
//!
//! This module implements a stateful search engine that decides every
//! candidate edge of a `ConstraintModel` by depth-first binary branching,
//! propagating the degree and anti-reciprocity rules after each decision and
//! pruning nodes whose upper bound cannot beat the incumbent. The
//! `BnbSolver` owns reusable trail, stack, propagator and bound buffers; a
//! fast `reset` keeps their capacities between solves.
//!
//! A search session object encapsulates per-run state, statistics, and
//! timing. With the same model and builder the session explores the same
//! tree in the same order, so single-worker runs are reproducible.

use crate::{
    bound::BoundEstimator,
    branching::decision::{Decision, DecisionBuilder},
    fixed::FixedEdge,
    incumbent::{IncumbentStore, NoSharedIncumbent, SharedIncumbentAdapter},
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    propagate::Propagator,
    result::BnbSolverOutcome,
    stack::SearchStack,
    state::SearchState,
    stats::BnbSolverStatistics,
    trail::SearchTrail,
};
use mistletoe_model::{assignment::Assignment, extract::SolutionExtractor, model::ConstraintModel};
use mistletoe_search::{
    incumbent::SharedIncumbent, monitor::search_monitor::SearchCommand,
    result::TerminationReason,
};

/// An exact branch-and-bound solver over the edge variables of a
/// `ConstraintModel`.
///
/// This is just the execution engine: which edge to branch on is decided by
/// a `DecisionBuilder`, and what happens along the way can be observed or
/// stopped through a `TreeSearchMonitor`.
#[derive(Clone, Debug, Default)]
pub struct BnbSolver {
    trail: SearchTrail,
    stack: SearchStack,
    propagator: Propagator,
    bound: BoundEstimator,
}

impl BnbSolver {
    #[inline]
    pub fn new() -> Self {
        Self {
            trail: SearchTrail::new(),
            stack: SearchStack::new(),
            propagator: Propagator::new(),
            bound: BoundEstimator::new(),
        }
    }

    /// Creates a solver with storage sized for `model`.
    ///
    /// Every solve ensures sufficient capacity anyway; preallocating only
    /// moves the allocations to construction time.
    #[inline]
    pub fn preallocated(model: &ConstraintModel) -> Self {
        let n = model.participant_count();
        let edges = model.num_candidate_edges();
        Self {
            trail: SearchTrail::preallocated(edges),
            stack: SearchStack::preallocated(edges),
            propagator: Propagator::preallocated(n),
            bound: BoundEstimator::preallocated(n),
        }
    }

    /// Solves `model` as a standalone, single-threaded search.
    #[inline]
    pub fn solve<B, S>(
        &mut self,
        model: &ConstraintModel,
        builder: &mut B,
        monitor: S,
    ) -> BnbSolverOutcome
    where
        B: DecisionBuilder,
        S: TreeSearchMonitor,
    {
        self.solve_internal(model, &[], builder, monitor, NoSharedIncumbent::new())
    }

    /// Solves `model` while reading and publishing the best known solution
    /// through `incumbent`.
    #[inline]
    pub fn solve_with_incumbent<B, S>(
        &mut self,
        model: &ConstraintModel,
        builder: &mut B,
        monitor: S,
        incumbent: &SharedIncumbent,
    ) -> BnbSolverOutcome
    where
        B: DecisionBuilder,
        S: TreeSearchMonitor,
    {
        self.solve_internal(
            model,
            &[],
            builder,
            monitor,
            SharedIncumbentAdapter::new(incumbent),
        )
    }

    /// Solves the subtree of `model` in which every edge of `fixed` is
    /// pinned.
    #[inline]
    pub fn solve_with_fixed<B, S>(
        &mut self,
        model: &ConstraintModel,
        fixed: &[FixedEdge],
        builder: &mut B,
        monitor: S,
    ) -> BnbSolverOutcome
    where
        B: DecisionBuilder,
        S: TreeSearchMonitor,
    {
        self.solve_internal(model, fixed, builder, monitor, NoSharedIncumbent::new())
    }

    /// Solves the subtree of `model` in which every edge of `fixed` is
    /// pinned, sharing the best known solution through `incumbent`. This is
    /// what each worker of a parallel solve runs.
    #[inline]
    pub fn solve_with_fixed_and_incumbent<B, S>(
        &mut self,
        model: &ConstraintModel,
        fixed: &[FixedEdge],
        builder: &mut B,
        monitor: S,
        incumbent: &SharedIncumbent,
    ) -> BnbSolverOutcome
    where
        B: DecisionBuilder,
        S: TreeSearchMonitor,
    {
        self.solve_internal(
            model,
            fixed,
            builder,
            monitor,
            SharedIncumbentAdapter::new(incumbent),
        )
    }

    #[inline(always)]
    fn solve_internal<B, S, I>(
        &mut self,
        model: &ConstraintModel,
        fixed: &[FixedEdge],
        builder: &mut B,
        mut monitor: S,
        backing: I,
    ) -> BnbSolverOutcome
    where
        B: DecisionBuilder,
        S: TreeSearchMonitor,
        I: IncumbentStore,
    {
        let session =
            BnbSolverSearchSession::new(self, model, fixed, builder, &mut monitor, backing);
        let outcome = session.run();
        self.reset();
        outcome
    }

    /// Clears the logical state of the internal buffers without releasing
    /// their memory.
    #[inline]
    fn reset(&mut self) {
        self.trail.reset();
        self.stack.reset();
    }
}

/// The state and logic of a single search run.
struct BnbSolverSearchSession<'a, B, S, I>
where
    I: IncumbentStore,
{
    solver: &'a mut BnbSolver,
    model: &'a ConstraintModel,
    fixed: &'a [FixedEdge],
    builder: &'a mut B,
    monitor: &'a mut S,
    incumbent: I,
    state: SearchState,
    best_objective: f64,
    best_solution: Option<Assignment>,
    stats: BnbSolverStatistics,
    start_time: std::time::Instant,
}

impl<'a, B, S, I> std::fmt::Debug for BnbSolverSearchSession<'a, B, S, I>
where
    I: IncumbentStore,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("model", &self.model)
            .field("state", &self.state)
            .field("best_objective", &self.best_objective)
            .field("best_solution", &self.best_solution)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<'a, B, S, I> BnbSolverSearchSession<'a, B, S, I>
where
    B: DecisionBuilder,
    S: TreeSearchMonitor,
    I: IncumbentStore,
{
    #[inline]
    fn new(
        solver: &'a mut BnbSolver,
        model: &'a ConstraintModel,
        fixed: &'a [FixedEdge],
        builder: &'a mut B,
        monitor: &'a mut S,
        incumbent: I,
    ) -> Self {
        let best_objective = incumbent.initial_lower_bound();
        Self {
            solver,
            model,
            fixed,
            builder,
            monitor,
            incumbent,
            state: SearchState::new(model),
            best_objective,
            best_solution: None,
            stats: BnbSolverStatistics::default(),
            start_time: std::time::Instant::now(),
        }
    }

    fn run(mut self) -> BnbSolverOutcome {
        self.monitor.on_enter_search(self.model, &self.stats);

        // Root propagation or the fixed prefix may already be contradictory.
        if !self.initialize() {
            self.stats.set_total_time(self.start_time.elapsed());
            self.monitor.on_exit_search(&self.stats);
            return self.finalize_result(TerminationReason::InfeasibilityProven);
        }

        let termination_reason = loop {
            self.best_objective = self.incumbent.tighten(self.best_objective);
            self.monitor.on_step(&self.state, &self.stats);

            if let SearchCommand::Terminate(msg) =
                self.monitor.search_command(&self.state, &self.stats)
            {
                break TerminationReason::Aborted(msg);
            }

            if self.solver.stack.is_current_level_empty() {
                if self.solver.stack.depth() <= 1 {
                    break if self.best_solution.is_some() {
                        TerminationReason::OptimalityProven
                    } else {
                        TerminationReason::InfeasibilityProven
                    };
                }
                self.backtrack_step();
            } else {
                self.process_next_decision();
            }
        };

        self.stats.set_total_time(self.start_time.elapsed());
        self.monitor.on_exit_search(&self.stats);
        self.finalize_result(termination_reason)
    }

    /// Turns the termination reason into an outcome. Consumes the session.
    fn finalize_result(self, reason: TerminationReason) -> BnbSolverOutcome {
        match reason {
            TerminationReason::OptimalityProven => match self.best_solution {
                Some(assignment) => BnbSolverOutcome::optimal(assignment, self.stats),
                None => BnbSolverOutcome::infeasible(self.stats),
            },
            TerminationReason::InfeasibilityProven => BnbSolverOutcome::infeasible(self.stats),
            TerminationReason::Aborted(msg) => {
                BnbSolverOutcome::aborted(self.best_solution, msg, self.stats)
            }
        }
    }

    /// Opens the root level, applies root propagation and the fixed prefix,
    /// and expands the root. Returns `false` if the root is infeasible.
    fn initialize(&mut self) -> bool {
        let n = self.model.participant_count();
        let edges = self.model.num_candidate_edges();
        self.solver.trail.ensure_capacity(edges);
        self.solver.stack.ensure_capacity(edges);
        self.solver.propagator.reset(n);
        self.solver.bound.reset(n);

        self.solver.trail.push_frame(&self.state);
        self.solver.stack.push_frame();
        self.stats.on_node_explored();

        let root = self
            .solver
            .propagator
            .propagate_all(self.model, &mut self.state, &mut self.solver.trail);
        if root.is_err() {
            self.prune(PruneReason::Infeasible);
            return false;
        }

        for &fixed in self.fixed {
            let applied = self.solver.propagator.apply(
                self.model,
                &mut self.state,
                &mut self.solver.trail,
                Decision::from(fixed),
            );
            if applied.is_err() {
                self.prune(PruneReason::Infeasible);
                return false;
            }
        }

        match self
            .solver
            .bound
            .upper_bound(self.model, &mut self.state)
        {
            Some(upper_bound) => self.stats.set_root_upper_bound(upper_bound),
            None => {
                self.prune(PruneReason::Infeasible);
                return false;
            }
        }

        self.expand_node();
        true
    }

    #[inline]
    fn backtrack_step(&mut self) {
        self.stats.on_backtrack();
        self.monitor.on_backtrack(&self.state, &self.stats);
        self.solver.trail.backtrack(&mut self.state);
        self.solver.stack.pop_frame();
    }

    #[inline]
    fn process_next_decision(&mut self) {
        if let Some(decision) = self.solver.stack.pop() {
            self.descend(decision);
        }
    }

    fn descend(&mut self, decision: Decision) {
        self.solver.trail.push_frame(&self.state);
        self.solver.stack.push_frame();

        self.stats.on_node_explored();
        self.stats
            .on_depth_update(self.solver.stack.depth().saturating_sub(1) as u64);
        self.monitor.on_descend(&self.state, decision, &self.stats);

        let applied = self.solver.propagator.apply(
            self.model,
            &mut self.state,
            &mut self.solver.trail,
            decision,
        );
        if applied.is_err() {
            self.prune(PruneReason::Infeasible);
            self.backtrack_step();
            return;
        }

        // Dead ends leave the level empty; the main loop backtracks it.
        self.expand_node();
    }

    /// Evaluates the current node: records it if complete, otherwise prunes
    /// it or pushes its children. Returns `true` if children were pushed.
    fn expand_node(&mut self) -> bool {
        if self.state.is_complete() {
            self.handle_complete_solution();
            return false;
        }

        let Some(remaining) = self
            .solver
            .bound
            .remaining_bound(self.model, &mut self.state)
        else {
            self.prune(PruneReason::Infeasible);
            return false;
        };
        let upper_bound = self.state.committed() + remaining;
        self.monitor
            .on_upper_bound_computed(&self.state, upper_bound, remaining, &self.stats);

        if upper_bound <= self.best_objective {
            self.prune(PruneReason::BoundDominated);
            return false;
        }

        let before = self.solver.stack.num_entries();
        self.solver
            .stack
            .extend(self.builder.next_decision(self.model, &self.state));
        let count = self.solver.stack.num_entries() - before;
        if count == 0 {
            return false;
        }

        self.stats.on_decisions_generated(count);
        self.monitor
            .on_decisions_enqueued(&self.state, count, &self.stats);
        true
    }

    fn handle_complete_solution(&mut self) {
        let assignment = self.state.to_assignment(self.model);
        debug_assert!(
            SolutionExtractor::new(self.model).verify(&assignment).is_ok(),
            "complete search state violates the model: {:?}",
            SolutionExtractor::new(self.model).verify(&assignment)
        );

        let objective = assignment.objective();
        if objective > self.best_objective {
            self.best_objective = objective;
            self.incumbent.on_solution_found(&assignment);
            self.stats.on_solution_found();
            self.monitor.on_solution_found(&assignment, &self.stats);
            self.best_solution = Some(assignment);
        } else {
            self.prune(PruneReason::BoundDominated);
        }
    }

    #[inline]
    fn prune(&mut self, reason: PruneReason) {
        match reason {
            PruneReason::Infeasible => self.stats.on_pruning_infeasible(),
            PruneReason::BoundDominated => self.stats.on_pruning_bound(),
        }
        self.monitor.on_prune(&self.state, reason, &self.stats);
    }
}
