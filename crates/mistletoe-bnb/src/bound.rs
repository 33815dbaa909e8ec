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

//! Admissible upper bound on the weight still reachable from a node
//!
//! For every giver with remaining need `r`, the best it can still add is the
//! sum of its `r` heaviest undecided outgoing candidates. Summing over givers
//! bounds the remaining weight from above; the same holds for receivers and
//! incoming candidates. The estimator returns the smaller of the two sums,
//! or `None` when some participant has fewer undecided candidates than it
//! still needs.
//!
//! Row and column contributions are cached. Only rows and columns the
//! `SearchState` marked dirty since the previous call are recomputed; this
//! covers both descent and backtracking because every status change, undo
//! included, marks its row and column.

use crate::state::SearchState;
use fixedbitset::FixedBitSet;
use mistletoe_model::{index::ParticipantIndex, model::ConstraintModel};

#[derive(Clone, Debug, Default)]
pub struct BoundEstimator {
    row_bounds: Vec<Option<f64>>,
    col_bounds: Vec<Option<f64>>,
    scratch_rows: FixedBitSet,
    scratch_cols: FixedBitSet,
}

impl BoundEstimator {
    #[inline]
    pub fn new() -> Self {
        Self {
            row_bounds: Vec::new(),
            col_bounds: Vec::new(),
            scratch_rows: FixedBitSet::new(),
            scratch_cols: FixedBitSet::new(),
        }
    }

    #[inline]
    pub fn preallocated(num_participants: usize) -> Self {
        Self {
            row_bounds: Vec::with_capacity(num_participants),
            col_bounds: Vec::with_capacity(num_participants),
            scratch_rows: FixedBitSet::with_capacity(num_participants),
            scratch_cols: FixedBitSet::with_capacity(num_participants),
        }
    }

    /// Resizes the caches for `num_participants`. The state must have every
    /// row and column marked dirty, as a freshly reset `SearchState` does.
    pub fn reset(&mut self, num_participants: usize) {
        self.row_bounds.clear();
        self.row_bounds.resize(num_participants, None);
        self.col_bounds.clear();
        self.col_bounds.resize(num_participants, None);
        self.scratch_rows.clear();
        self.scratch_rows.grow(num_participants);
        self.scratch_cols.clear();
        self.scratch_cols.grow(num_participants);
    }

    /// Returns an upper bound on the weight the open edges can still add to
    /// `state.committed()`, or `None` if the node cannot be completed.
    pub fn remaining_bound(
        &mut self,
        model: &ConstraintModel,
        state: &mut SearchState,
    ) -> Option<f64> {
        state.drain_dirty(&mut self.scratch_rows, &mut self.scratch_cols);

        for giver in self.scratch_rows.ones() {
            self.row_bounds[giver] =
                Self::row_bound(model, state, ParticipantIndex::new(giver));
        }
        for receiver in self.scratch_cols.ones() {
            self.col_bounds[receiver] =
                Self::col_bound(model, state, ParticipantIndex::new(receiver));
        }

        let mut sum_out = 0.0;
        for bound in &self.row_bounds {
            sum_out += (*bound)?;
        }
        let mut sum_in = 0.0;
        for bound in &self.col_bounds {
            sum_in += (*bound)?;
        }
        Some(sum_out.min(sum_in))
    }

    /// Returns `committed + remaining_bound`.
    #[inline]
    pub fn upper_bound(
        &mut self,
        model: &ConstraintModel,
        state: &mut SearchState,
    ) -> Option<f64> {
        let remaining = self.remaining_bound(model, state)?;
        Some(state.committed() + remaining)
    }

    #[inline]
    fn row_bound(
        model: &ConstraintModel,
        state: &SearchState,
        giver: ParticipantIndex,
    ) -> Option<f64> {
        let need = state.out_need(giver);
        if need == 0 {
            return Some(0.0);
        }
        if state.out_open(giver) < need {
            return None;
        }
        let sum = model
            .out_candidates_by_weight(giver)
            .iter()
            .filter(|&&receiver| state.is_undecided(giver, receiver))
            .take(need)
            .map(|&receiver| model.weight(giver, receiver))
            .sum();
        Some(sum)
    }

    #[inline]
    fn col_bound(
        model: &ConstraintModel,
        state: &SearchState,
        receiver: ParticipantIndex,
    ) -> Option<f64> {
        let need = state.in_need(receiver);
        if need == 0 {
            return Some(0.0);
        }
        if state.in_open(receiver) < need {
            return None;
        }
        let sum = model
            .in_candidates_by_weight(receiver)
            .iter()
            .filter(|&&giver| state.is_undecided(giver, receiver))
            .take(need)
            .map(|&giver| model.weight(giver, receiver))
            .sum();
        Some(sum)
    }
}
