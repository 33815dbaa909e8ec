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

//! Constraint propagation over the edge variables
//!
//! The `Propagator` applies a decision to the `SearchState`, records every
//! edge it decides on the `SearchTrail`, and then runs the degree rules to a
//! fixpoint:
//!
//! - including `i -> j` excludes the reverse edge `j -> i`;
//! - a row (column) that already holds `k` gifts excludes its remaining
//!   undecided candidates;
//! - a row (column) whose undecided candidates exactly cover its remaining
//!   need includes all of them;
//! - a row (column) with fewer undecided candidates than it still needs is a
//!   conflict.
//!
//! Every forced assignment goes through the same checks as a branching
//! decision, so any rule violation surfaces as a `Conflict`. The caller
//! backtracks the whole frame on conflict; partial work is never repaired.

use crate::{
    branching::decision::Decision,
    state::{EdgeStatus, SearchState},
    trail::SearchTrail,
};
use fixedbitset::FixedBitSet;
use mistletoe_model::{
    index::{ParticipantIndex, flatten_pair},
    model::ConstraintModel,
};

/// Raised when a node cannot be extended to a valid assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Conflict;

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Conflict")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Line {
    Row(ParticipantIndex),
    Col(ParticipantIndex),
}

#[derive(Clone, Debug, Default)]
pub struct Propagator {
    queue: Vec<Line>,
    queued_rows: FixedBitSet,
    queued_cols: FixedBitSet,
}

impl Propagator {
    #[inline]
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            queued_rows: FixedBitSet::new(),
            queued_cols: FixedBitSet::new(),
        }
    }

    #[inline]
    pub fn preallocated(num_participants: usize) -> Self {
        Self {
            queue: Vec::with_capacity(2 * num_participants),
            queued_rows: FixedBitSet::with_capacity(num_participants),
            queued_cols: FixedBitSet::with_capacity(num_participants),
        }
    }

    /// Clears pending work and resizes for `num_participants`.
    pub fn reset(&mut self, num_participants: usize) {
        self.queue.clear();
        self.queued_rows.clear();
        self.queued_rows.grow(num_participants);
        self.queued_cols.clear();
        self.queued_cols.grow(num_participants);
    }

    /// Checks every row and column of the current state, forcing what the
    /// degree rules imply. Used once at the root.
    pub fn propagate_all(
        &mut self,
        model: &ConstraintModel,
        state: &mut SearchState,
        trail: &mut SearchTrail,
    ) -> Result<(), Conflict> {
        for index in 0..model.participant_count() {
            let participant = ParticipantIndex::new(index);
            self.enqueue(Line::Row(participant));
            self.enqueue(Line::Col(participant));
        }
        self.run(model, state, trail)
    }

    /// Applies `decision` and propagates its consequences to a fixpoint.
    pub fn apply(
        &mut self,
        model: &ConstraintModel,
        state: &mut SearchState,
        trail: &mut SearchTrail,
        decision: Decision,
    ) -> Result<(), Conflict> {
        let (giver, receiver) = decision.edge();
        let applied = if decision.is_include() {
            self.set_included(model, state, trail, giver, receiver)
        } else {
            self.set_excluded(state, trail, giver, receiver)
        };
        match applied {
            Ok(()) => self.run(model, state, trail),
            Err(conflict) => {
                self.clear_queue();
                Err(conflict)
            }
        }
    }

    fn run(
        &mut self,
        model: &ConstraintModel,
        state: &mut SearchState,
        trail: &mut SearchTrail,
    ) -> Result<(), Conflict> {
        while let Some(line) = self.queue.pop() {
            match line {
                Line::Row(giver) => self.queued_rows.set(giver.get(), false),
                Line::Col(receiver) => self.queued_cols.set(receiver.get(), false),
            }
            if let Err(conflict) = self.process(model, state, trail, line) {
                self.clear_queue();
                return Err(conflict);
            }
        }
        Ok(())
    }

    fn process(
        &mut self,
        model: &ConstraintModel,
        state: &mut SearchState,
        trail: &mut SearchTrail,
        line: Line,
    ) -> Result<(), Conflict> {
        let (need, open) = match line {
            Line::Row(giver) => (state.out_need(giver), state.out_open(giver)),
            Line::Col(receiver) => (state.in_need(receiver), state.in_open(receiver)),
        };
        if open < need {
            return Err(Conflict);
        }
        if open == 0 {
            return Ok(());
        }

        let include = if need == 0 {
            false
        } else if open == need {
            true
        } else {
            return Ok(());
        };

        match line {
            Line::Row(giver) => {
                for &receiver in model.out_candidates_by_weight(giver) {
                    if state.is_undecided(giver, receiver) {
                        self.force(model, state, trail, giver, receiver, include)?;
                    }
                }
            }
            Line::Col(receiver) => {
                for &giver in model.in_candidates_by_weight(receiver) {
                    if state.is_undecided(giver, receiver) {
                        self.force(model, state, trail, giver, receiver, include)?;
                    }
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn force(
        &mut self,
        model: &ConstraintModel,
        state: &mut SearchState,
        trail: &mut SearchTrail,
        giver: ParticipantIndex,
        receiver: ParticipantIndex,
        include: bool,
    ) -> Result<(), Conflict> {
        if include {
            self.set_included(model, state, trail, giver, receiver)
        } else {
            self.set_excluded(state, trail, giver, receiver)
        }
    }

    fn set_included(
        &mut self,
        model: &ConstraintModel,
        state: &mut SearchState,
        trail: &mut SearchTrail,
        giver: ParticipantIndex,
        receiver: ParticipantIndex,
    ) -> Result<(), Conflict> {
        match state.status(giver, receiver) {
            EdgeStatus::Included => return Ok(()),
            EdgeStatus::Excluded => return Err(Conflict),
            EdgeStatus::Undecided => {}
        }

        let degree = state.degree_target();
        if state.out_selected(giver) >= degree || state.in_selected(receiver) >= degree {
            return Err(Conflict);
        }
        if state.status(receiver, giver) == EdgeStatus::Included {
            return Err(Conflict);
        }

        let n = state.num_participants();
        state.include(giver, receiver, model.weight(giver, receiver));
        trail.record(flatten_pair(n, giver, receiver));
        self.enqueue(Line::Row(giver));
        self.enqueue(Line::Col(receiver));

        if state.is_undecided(receiver, giver) {
            self.set_excluded(state, trail, receiver, giver)?;
        }
        Ok(())
    }

    fn set_excluded(
        &mut self,
        state: &mut SearchState,
        trail: &mut SearchTrail,
        giver: ParticipantIndex,
        receiver: ParticipantIndex,
    ) -> Result<(), Conflict> {
        match state.status(giver, receiver) {
            EdgeStatus::Excluded => return Ok(()),
            EdgeStatus::Included => return Err(Conflict),
            EdgeStatus::Undecided => {}
        }

        let n = state.num_participants();
        state.exclude(giver, receiver);
        trail.record(flatten_pair(n, giver, receiver));
        self.enqueue(Line::Row(giver));
        self.enqueue(Line::Col(receiver));
        Ok(())
    }

    #[inline(always)]
    fn enqueue(&mut self, line: Line) {
        let fresh = match line {
            Line::Row(giver) => !self.queued_rows.put(giver.get()),
            Line::Col(receiver) => !self.queued_cols.put(receiver.get()),
        };
        if fresh {
            self.queue.push(line);
        }
    }

    #[inline]
    fn clear_queue(&mut self) {
        self.queue.clear();
        self.queued_rows.clear();
        self.queued_cols.clear();
    }
}
