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

//! Splitting the search tree into independent subtrees
//!
//! `SubtreeSplitter` walks the top of the branch-and-bound tree with the same
//! `DecisionBuilder` and `Propagator` the engine uses, and returns one fixed
//! prefix per open node at the split depth. Prefixes that propagate to a
//! conflict, or whose bound proves them infeasible, are dropped. The
//! remaining prefixes are pairwise disjoint and together cover every
//! feasible assignment, so solving each with
//! `BnbSolver::solve_with_fixed_and_incumbent` and keeping the best result is
//! equivalent to one sequential solve.
//!
//! Prefixes come out in the order the sequential engine would visit them.

use crate::{
    bound::BoundEstimator,
    branching::decision::{Decision, DecisionBuilder},
    fixed::FixedEdge,
    propagate::Propagator,
    state::SearchState,
    trail::SearchTrail,
};
use mistletoe_model::model::ConstraintModel;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubtreeSplitter {
    depth: usize,
}

impl Default for SubtreeSplitter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEPTH)
    }
}

impl SubtreeSplitter {
    /// Up to 16 subtrees.
    pub const DEFAULT_DEPTH: usize = 4;

    #[inline]
    pub const fn new(depth: usize) -> Self {
        Self { depth }
    }

    #[inline]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the fixed prefixes of all feasible subtrees at the split depth.
    ///
    /// An empty result means the root itself is infeasible. Branches that
    /// complete above the split depth are returned with a shorter prefix.
    pub fn split<B>(&self, model: &ConstraintModel, builder: &mut B) -> Vec<Vec<FixedEdge>>
    where
        B: DecisionBuilder,
    {
        let n = model.participant_count();
        let mut walk = SplitWalk {
            model,
            builder,
            state: SearchState::new(model),
            trail: SearchTrail::preallocated(model.num_candidate_edges()),
            propagator: Propagator::preallocated(n),
            bound: BoundEstimator::preallocated(n),
            prefix: Vec::with_capacity(self.depth),
            subtrees: Vec::new(),
            depth: self.depth,
        };
        walk.propagator.reset(n);
        walk.bound.reset(n);
        walk.trail.push_frame(&walk.state);

        let root = walk
            .propagator
            .propagate_all(model, &mut walk.state, &mut walk.trail);
        if root.is_ok() {
            walk.visit();
        }

        debug!(
            depth = self.depth,
            subtrees = walk.subtrees.len(),
            "search tree split"
        );
        walk.subtrees
    }
}

struct SplitWalk<'a, B> {
    model: &'a ConstraintModel,
    builder: &'a mut B,
    state: SearchState,
    trail: SearchTrail,
    propagator: Propagator,
    bound: BoundEstimator,
    prefix: Vec<FixedEdge>,
    subtrees: Vec<Vec<FixedEdge>>,
    depth: usize,
}

impl<B> SplitWalk<'_, B>
where
    B: DecisionBuilder,
{
    fn visit(&mut self) {
        if !self.state.is_complete()
            && self
                .bound
                .remaining_bound(self.model, &mut self.state)
                .is_none()
        {
            return;
        }
        if self.prefix.len() >= self.depth || self.state.is_complete() {
            self.subtrees.push(self.prefix.clone());
            return;
        }

        let decisions: Vec<Decision> = self
            .builder
            .next_decision(self.model, &self.state)
            .collect();
        if decisions.is_empty() {
            self.subtrees.push(self.prefix.clone());
            return;
        }

        // Builders yield in stack order; the engine explores the last one first.
        for decision in decisions.into_iter().rev() {
            self.trail.push_frame(&self.state);
            let applied =
                self.propagator
                    .apply(self.model, &mut self.state, &mut self.trail, decision);
            if applied.is_ok() {
                self.prefix.push(FixedEdge::from(decision));
                self.visit();
                self.prefix.pop();
            }
            self.trail.backtrack(&mut self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bnb::BnbSolver, branching::heaviest::HeaviestEdgeBuilder,
        monitor::no_op::NoOperationMonitor,
    };
    use mistletoe_model::{index::ParticipantIndex, model::ModelBuilder, weights::WeightMatrix};
    use mistletoe_search::{incumbent::SharedIncumbent, result::SolverResult};

    fn p(i: usize) -> ParticipantIndex {
        ParticipantIndex::new(i)
    }

    fn model_7() -> ConstraintModel {
        let weights =
            WeightMatrix::from_fn(7, |i, j| ((i.get() * 5 + j.get() * 3) % 9) as f64).unwrap();
        let mut builder = ModelBuilder::new(weights);
        builder.add_couple(p(2), p(3));
        builder.add_last_year(p(0), [p(6)]);
        builder.build().unwrap()
    }

    fn contradicts(a: &[FixedEdge], b: &[FixedEdge]) -> bool {
        a.iter().any(|x| {
            b.iter()
                .any(|y| x.giver == y.giver && x.receiver == y.receiver && x.selected != y.selected)
        })
    }

    #[test]
    fn test_depth_zero_yields_the_root() {
        let model = model_7();
        let subtrees = SubtreeSplitter::new(0).split(&model, &mut HeaviestEdgeBuilder::new());
        assert_eq!(subtrees, vec![Vec::<FixedEdge>::new()]);
    }

    #[test]
    fn test_infeasible_root_yields_nothing() {
        let model = ModelBuilder::new(WeightMatrix::uniform(4, 1.0).unwrap())
            .build()
            .unwrap();
        let subtrees = SubtreeSplitter::default().split(&model, &mut HeaviestEdgeBuilder::new());
        assert!(subtrees.is_empty());
    }

    #[test]
    fn test_prefixes_are_disjoint_and_bounded() {
        let model = model_7();
        let splitter = SubtreeSplitter::new(3);
        let subtrees = splitter.split(&model, &mut HeaviestEdgeBuilder::new());

        assert!(!subtrees.is_empty());
        assert!(subtrees.len() <= 1 << splitter.depth());
        for (i, a) in subtrees.iter().enumerate() {
            assert!(a.len() <= splitter.depth());
            for b in &subtrees[i + 1..] {
                assert!(contradicts(a, b), "{:?} overlaps {:?}", a, b);
            }
        }
        // Include is explored first, as in the sequential engine.
        assert!(subtrees[0][0].selected);
    }

    #[test]
    fn test_subtrees_cover_the_optimum() {
        let model = model_7();
        let sequential = BnbSolver::new().solve(
            &model,
            &mut HeaviestEdgeBuilder::new(),
            NoOperationMonitor::new(),
        );

        let shared = SharedIncumbent::new();
        let mut solver = BnbSolver::preallocated(&model);
        for prefix in SubtreeSplitter::new(3).split(&model, &mut HeaviestEdgeBuilder::new()) {
            let outcome = solver.solve_with_fixed_and_incumbent(
                &model,
                &prefix,
                &mut HeaviestEdgeBuilder::new(),
                NoOperationMonitor::new(),
                &shared,
            );
            assert!(!matches!(outcome.result(), SolverResult::Cancelled(_)));
        }

        assert_eq!(
            sequential.result().objective(),
            shared.snapshot().map(|a| a.objective())
        );
    }
}
