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

//! Search state for edge branching
//!
//! `SearchState` is the mutable partial assignment explored by the solver.
//! Every ordered pair carries an `EdgeStatus`; forbidden pairs start out
//! `Excluded` and never change. Per-participant counters track how many gifts
//! are already selected and how many undecided candidates remain, so
//! feasibility and remaining need are O(1) queries.
//!
//! Every status change marks the touched row (giver) and column (receiver)
//! dirty. The `BoundEstimator` drains these marks to refresh only the cached
//! contributions that may have changed, both after descending and after
//! backtracking.

use fixedbitset::FixedBitSet;
use mistletoe_model::{
    assignment::Assignment,
    index::{ParticipantIndex, flatten_pair, unflatten_pair},
    model::ConstraintModel,
};

/// The decision status of a single ordered pair.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum EdgeStatus {
    #[default]
    Undecided,
    Included,
    Excluded,
}

impl std::fmt::Display for EdgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeStatus::Undecided => write!(f, "Undecided"),
            EdgeStatus::Included => write!(f, "Included"),
            EdgeStatus::Excluded => write!(f, "Excluded"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SearchState {
    num_participants: usize,
    degree: usize,
    status: Vec<EdgeStatus>, // len = n * n
    out_selected: Vec<usize>,
    in_selected: Vec<usize>,
    out_open: Vec<usize>,
    in_open: Vec<usize>,
    num_undecided: usize,
    committed: f64,
    dirty_rows: FixedBitSet,
    dirty_cols: FixedBitSet,
}

impl SearchState {
    /// Creates the root state of `model`: forbidden pairs excluded, every
    /// candidate undecided, every row and column dirty.
    pub fn new(model: &ConstraintModel) -> Self {
        let mut state = Self {
            num_participants: 0,
            degree: 0,
            status: Vec::new(),
            out_selected: Vec::new(),
            in_selected: Vec::new(),
            out_open: Vec::new(),
            in_open: Vec::new(),
            num_undecided: 0,
            committed: 0.0,
            dirty_rows: FixedBitSet::new(),
            dirty_cols: FixedBitSet::new(),
        };
        state.reset(model);
        state
    }

    /// Resets the state to the root of `model`, reusing allocations.
    pub fn reset(&mut self, model: &ConstraintModel) {
        let n = model.participant_count();
        self.num_participants = n;
        self.degree = model.degree_target();

        self.status.clear();
        self.status.resize(n * n, EdgeStatus::Excluded);
        for &(giver, receiver) in model.edges_by_weight() {
            self.status[flatten_pair(n, giver, receiver)] = EdgeStatus::Undecided;
        }

        self.out_selected.clear();
        self.out_selected.resize(n, 0);
        self.in_selected.clear();
        self.in_selected.resize(n, 0);

        self.out_open.clear();
        self.out_open.extend(
            (0..n).map(|i| model.out_candidates_by_weight(ParticipantIndex::new(i)).len()),
        );
        self.in_open.clear();
        self.in_open.extend(
            (0..n).map(|j| model.in_candidates_by_weight(ParticipantIndex::new(j)).len()),
        );

        self.num_undecided = model.num_candidate_edges();
        self.committed = 0.0;

        self.dirty_rows.clear();
        self.dirty_rows.grow(n);
        self.dirty_rows.insert_range(..);
        self.dirty_cols.clear();
        self.dirty_cols.grow(n);
        self.dirty_cols.insert_range(..);
    }

    #[inline]
    pub fn num_participants(&self) -> usize {
        self.num_participants
    }

    #[inline]
    pub fn degree_target(&self) -> usize {
        self.degree
    }

    #[inline(always)]
    pub fn status(&self, giver: ParticipantIndex, receiver: ParticipantIndex) -> EdgeStatus {
        debug_assert!(
            giver.get() < self.num_participants && receiver.get() < self.num_participants,
            "called `SearchState::status` with pair ({}, {}) out of bounds for {} participants",
            giver.get(),
            receiver.get(),
            self.num_participants
        );
        self.status[flatten_pair(self.num_participants, giver, receiver)]
    }

    #[inline(always)]
    pub fn is_undecided(&self, giver: ParticipantIndex, receiver: ParticipantIndex) -> bool {
        self.status(giver, receiver) == EdgeStatus::Undecided
    }

    /// Number of gifts `giver` already gives.
    #[inline(always)]
    pub fn out_selected(&self, giver: ParticipantIndex) -> usize {
        self.out_selected[giver.get()]
    }

    /// Number of gifts `receiver` already receives.
    #[inline(always)]
    pub fn in_selected(&self, receiver: ParticipantIndex) -> usize {
        self.in_selected[receiver.get()]
    }

    /// Number of undecided outgoing candidates of `giver`.
    #[inline(always)]
    pub fn out_open(&self, giver: ParticipantIndex) -> usize {
        self.out_open[giver.get()]
    }

    /// Number of undecided incoming candidates of `receiver`.
    #[inline(always)]
    pub fn in_open(&self, receiver: ParticipantIndex) -> usize {
        self.in_open[receiver.get()]
    }

    /// Gifts `giver` still has to give.
    #[inline(always)]
    pub fn out_need(&self, giver: ParticipantIndex) -> usize {
        self.degree.saturating_sub(self.out_selected(giver))
    }

    /// Gifts `receiver` still has to receive.
    #[inline(always)]
    pub fn in_need(&self, receiver: ParticipantIndex) -> usize {
        self.degree.saturating_sub(self.in_selected(receiver))
    }

    #[inline]
    pub fn num_undecided(&self) -> usize {
        self.num_undecided
    }

    /// Returns `true` once every candidate edge is decided.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.num_undecided == 0
    }

    /// Total weight of the edges included so far.
    #[inline(always)]
    pub fn committed(&self) -> f64 {
        self.committed
    }

    #[inline(always)]
    pub(crate) fn set_committed(&mut self, committed: f64) {
        self.committed = committed;
    }

    /// Marks an undecided edge as included.
    #[inline]
    pub(crate) fn include(
        &mut self,
        giver: ParticipantIndex,
        receiver: ParticipantIndex,
        weight: f64,
    ) {
        let offset = flatten_pair(self.num_participants, giver, receiver);
        debug_assert_eq!(
            self.status[offset],
            EdgeStatus::Undecided,
            "called `SearchState::include` on decided edge ({}, {})",
            giver.get(),
            receiver.get()
        );
        self.status[offset] = EdgeStatus::Included;
        self.out_selected[giver.get()] += 1;
        self.in_selected[receiver.get()] += 1;
        self.close(giver, receiver);
        self.committed += weight;
    }

    /// Marks an undecided edge as excluded.
    #[inline]
    pub(crate) fn exclude(&mut self, giver: ParticipantIndex, receiver: ParticipantIndex) {
        let offset = flatten_pair(self.num_participants, giver, receiver);
        debug_assert_eq!(
            self.status[offset],
            EdgeStatus::Undecided,
            "called `SearchState::exclude` on decided edge ({}, {})",
            giver.get(),
            receiver.get()
        );
        self.status[offset] = EdgeStatus::Excluded;
        self.close(giver, receiver);
    }

    /// Returns a decided edge to `Undecided`. The committed weight is restored
    /// separately by the trail.
    #[inline]
    pub(crate) fn revert(&mut self, offset: usize) {
        let (giver, receiver) = unflatten_pair(self.num_participants, offset);
        match self.status[offset] {
            EdgeStatus::Included => {
                self.out_selected[giver.get()] -= 1;
                self.in_selected[receiver.get()] -= 1;
            }
            EdgeStatus::Excluded => {}
            EdgeStatus::Undecided => {
                debug_assert!(
                    false,
                    "called `SearchState::revert` on undecided edge ({}, {})",
                    giver.get(),
                    receiver.get()
                );
                return;
            }
        }
        self.status[offset] = EdgeStatus::Undecided;
        self.out_open[giver.get()] += 1;
        self.in_open[receiver.get()] += 1;
        self.num_undecided += 1;
        self.mark_dirty(giver, receiver);
    }

    #[inline(always)]
    fn close(&mut self, giver: ParticipantIndex, receiver: ParticipantIndex) {
        self.out_open[giver.get()] -= 1;
        self.in_open[receiver.get()] -= 1;
        self.num_undecided -= 1;
        self.mark_dirty(giver, receiver);
    }

    #[inline(always)]
    fn mark_dirty(&mut self, giver: ParticipantIndex, receiver: ParticipantIndex) {
        self.dirty_rows.insert(giver.get());
        self.dirty_cols.insert(receiver.get());
    }

    /// Moves the dirty marks into `rows` and `cols`, leaving the state clean.
    #[inline]
    pub(crate) fn drain_dirty(&mut self, rows: &mut FixedBitSet, cols: &mut FixedBitSet) {
        std::mem::swap(&mut self.dirty_rows, rows);
        std::mem::swap(&mut self.dirty_cols, cols);
        self.dirty_rows.clear();
        self.dirty_rows.grow(self.num_participants);
        self.dirty_cols.clear();
        self.dirty_cols.grow(self.num_participants);
    }

    /// Iterates the included edges in ascending `(giver, receiver)` order.
    pub fn included_edges(
        &self,
    ) -> impl Iterator<Item = (ParticipantIndex, ParticipantIndex)> + '_ {
        let n = self.num_participants;
        self.status
            .iter()
            .enumerate()
            .filter(|(_, status)| **status == EdgeStatus::Included)
            .map(move |(offset, _)| unflatten_pair(n, offset))
    }

    /// Snapshots the included edges as an `Assignment`. The objective is
    /// summed in row-major order, so equal edge sets always carry equal
    /// objectives regardless of the order they were included in.
    pub fn to_assignment(&self, model: &ConstraintModel) -> Assignment {
        let n = self.num_participants;
        let mut bits = FixedBitSet::with_capacity(n * n);
        let mut objective = 0.0;
        for (giver, receiver) in self.included_edges() {
            bits.insert(flatten_pair(n, giver, receiver));
            objective += model.weight(giver, receiver);
        }
        Assignment::new(n, objective, bits)
    }
}

impl std::fmt::Display for SearchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchState(participants: {}, undecided: {}, committed: {})",
            self.num_participants, self.num_undecided, self.committed
        )
    }
}
