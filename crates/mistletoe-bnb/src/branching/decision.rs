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

use crate::state::SearchState;
use mistletoe_model::{index::ParticipantIndex, model::ConstraintModel};
use std::iter::FusedIterator;

/// A single branching decision: fix one ordered pair to selected or
/// not selected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Decision {
    Include {
        giver: ParticipantIndex,
        receiver: ParticipantIndex,
    },
    Exclude {
        giver: ParticipantIndex,
        receiver: ParticipantIndex,
    },
}

impl Decision {
    #[inline(always)]
    pub const fn include(giver: ParticipantIndex, receiver: ParticipantIndex) -> Self {
        Decision::Include { giver, receiver }
    }

    #[inline(always)]
    pub const fn exclude(giver: ParticipantIndex, receiver: ParticipantIndex) -> Self {
        Decision::Exclude { giver, receiver }
    }

    #[inline(always)]
    pub const fn giver(&self) -> ParticipantIndex {
        match *self {
            Decision::Include { giver, .. } | Decision::Exclude { giver, .. } => giver,
        }
    }

    #[inline(always)]
    pub const fn receiver(&self) -> ParticipantIndex {
        match *self {
            Decision::Include { receiver, .. } | Decision::Exclude { receiver, .. } => receiver,
        }
    }

    #[inline(always)]
    pub const fn edge(&self) -> (ParticipantIndex, ParticipantIndex) {
        (self.giver(), self.receiver())
    }

    #[inline(always)]
    pub const fn is_include(&self) -> bool {
        matches!(self, Decision::Include { .. })
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Include { giver, receiver } => {
                write!(f, "Include({} -> {})", giver.get(), receiver.get())
            }
            Decision::Exclude { giver, receiver } => {
                write!(f, "Exclude({} -> {})", giver.get(), receiver.get())
            }
        }
    }
}

/// Yields the two children of a binary edge branch.
///
/// The engine pushes decisions onto a LIFO stack, so the exclude child is
/// yielded first and the include child is explored first.
#[derive(Clone, Debug)]
pub struct BinaryBranch {
    edge: Option<(ParticipantIndex, ParticipantIndex)>,
    emitted: u8,
}

impl BinaryBranch {
    #[inline]
    pub fn new(edge: Option<(ParticipantIndex, ParticipantIndex)>) -> Self {
        Self { edge, emitted: 0 }
    }

    #[inline]
    pub fn empty() -> Self {
        Self::new(None)
    }
}

impl Iterator for BinaryBranch {
    type Item = Decision;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let (giver, receiver) = self.edge?;
        let decision = match self.emitted {
            0 => Decision::exclude(giver, receiver),
            1 => Decision::include(giver, receiver),
            _ => return None,
        };
        self.emitted += 1;
        Some(decision)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.edge {
            Some(_) => 2usize.saturating_sub(self.emitted as usize),
            None => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BinaryBranch {}
impl FusedIterator for BinaryBranch {}

/// Chooses the next edge to branch on.
///
/// Implementations return the children of the current node in push order;
/// an empty iterator means there is nothing left to branch on.
pub trait DecisionBuilder {
    type DecisionIterator<'a>: Iterator<Item = Decision> + FusedIterator + 'a
    where
        Self: 'a;

    fn name(&self) -> &str;

    fn next_decision<'a>(
        &'a mut self,
        model: &'a ConstraintModel,
        search_state: &'a SearchState,
    ) -> Self::DecisionIterator<'a>;
}
