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

//! Re-verification and export of completed assignments.
//!
//! The search engine maintains every structural rule incrementally, so an
//! assignment that reaches the `SolutionExtractor` should always pass. The
//! extractor checks them again from scratch anyway, against the model alone,
//! and reports the first broken rule as `ModelError::InvariantViolated`.
//! Checking is read-only, so running it twice on the same assignment gives the
//! same answer.

use crate::{
    assignment::Assignment,
    error::{Invariant, ModelError},
    index::ParticipantIndex,
    model::ConstraintModel,
    schedule::{GiftSchedule, GiverRecord},
};

#[inline]
fn violation(invariant: Invariant, detail: String) -> ModelError {
    ModelError::InvariantViolated { invariant, detail }
}

/// Checks assignments against a `ConstraintModel` and converts them into
/// per-giver `GiftSchedule`s.
#[derive(Clone, Copy, Debug)]
pub struct SolutionExtractor<'a> {
    model: &'a ConstraintModel,
}

impl<'a> SolutionExtractor<'a> {
    #[inline]
    pub fn new(model: &'a ConstraintModel) -> Self {
        Self { model }
    }

    /// Verifies all structural invariants of `assignment`.
    ///
    /// Rules are checked in a fixed order (dimension, self gifts, excluded
    /// pairs, reciprocity, out-degree, in-degree) and the first failure is
    /// returned.
    pub fn verify(&self, assignment: &Assignment) -> Result<(), ModelError> {
        let n = self.model.participant_count();
        if assignment.participant_count() != n {
            return Err(violation(
                Invariant::Dimension,
                format!(
                    "assignment covers {} participants, model has {}",
                    assignment.participant_count(),
                    n
                ),
            ));
        }

        for (giver, receiver) in assignment.edges() {
            if giver == receiver {
                return Err(violation(
                    Invariant::SelfGift,
                    format!("participant {} gives to themselves", giver.get()),
                ));
            }
            if self.model.is_forbidden(giver, receiver) {
                return Err(violation(
                    Invariant::ExcludedEdge,
                    format!("{} -> {} is excluded", giver.get(), receiver.get()),
                ));
            }
        }

        for (giver, receiver) in assignment.edges() {
            if giver < receiver && assignment.contains(receiver, giver) {
                return Err(violation(
                    Invariant::Reciprocal,
                    format!("{} <-> {}", giver.get(), receiver.get()),
                ));
            }
        }

        let k = self.model.degree_target();
        for p in (0..n).map(ParticipantIndex::new) {
            let out = assignment.out_degree(p);
            if out != k {
                return Err(violation(
                    Invariant::OutDegree,
                    format!("participant {} gives {} gifts, expected {}", p.get(), out, k),
                ));
            }
        }
        for p in (0..n).map(ParticipantIndex::new) {
            let inc = assignment.in_degree(p);
            if inc != k {
                return Err(violation(
                    Invariant::InDegree,
                    format!("participant {} receives {} gifts, expected {}", p.get(), inc, k),
                ));
            }
        }

        Ok(())
    }

    /// Verifies `assignment` and returns its gift schedule.
    ///
    /// The total weight is recomputed from the model rather than taken from
    /// the assignment's cached objective.
    pub fn extract(&self, assignment: &Assignment) -> Result<GiftSchedule, ModelError> {
        self.verify(assignment)?;

        let n = self.model.participant_count();
        let mut total_weight = 0.0;
        let mut records = Vec::with_capacity(n);
        for giver in (0..n).map(ParticipantIndex::new) {
            let receivers = assignment.receivers_of(giver).collect();
            records.push(GiverRecord::new(giver, receivers));
        }
        for (giver, receiver) in assignment.edges() {
            total_weight += self.model.weight(giver, receiver);
        }

        Ok(GiftSchedule::new(records, total_weight))
    }
}
