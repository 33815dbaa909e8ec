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

use crate::{
    index::{ParticipantIndex, flatten_pair, unflatten_pair},
    model::ConstraintModel,
};
use fixedbitset::FixedBitSet;

/// A complete selection of gift edges together with its total weight.
///
/// Edges are stored in a `FixedBitSet` keyed by `giver * n + receiver`.
/// An `Assignment` carries no validity guarantee on its own; pass it through
/// `SolutionExtractor` to check it against a model.
#[derive(Clone, PartialEq)]
pub struct Assignment {
    n: usize,
    objective: f64,
    edges: FixedBitSet,
}

impl Assignment {
    /// Creates an assignment over `n` participants from raw parts.
    #[inline]
    pub fn new(n: usize, objective: f64, edges: FixedBitSet) -> Self {
        debug_assert_eq!(
            edges.len(),
            n * n,
            "called `Assignment::new` with a bitset of length {} for {} participants",
            edges.len(),
            n
        );
        Self {
            n,
            objective,
            edges,
        }
    }

    /// Builds an assignment from explicit edges, summing their weights in `model`.
    pub fn from_edges<I>(model: &ConstraintModel, edges: I) -> Self
    where
        I: IntoIterator<Item = (ParticipantIndex, ParticipantIndex)>,
    {
        let n = model.participant_count();
        let mut bits = FixedBitSet::with_capacity(n * n);
        for (giver, receiver) in edges {
            bits.insert(flatten_pair(n, giver, receiver));
        }
        let objective = bits
            .ones()
            .map(|offset| {
                let (giver, receiver) = unflatten_pair(n, offset);
                model.weight(giver, receiver)
            })
            .sum();
        Self::new(n, objective, bits)
    }

    /// Returns the number of participants.
    #[inline]
    pub fn participant_count(&self) -> usize {
        self.n
    }

    /// Returns the total weight of the selected edges.
    #[inline]
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Returns `true` if `giver -> receiver` is selected.
    #[inline]
    pub fn contains(&self, giver: ParticipantIndex, receiver: ParticipantIndex) -> bool {
        self.edges.contains(flatten_pair(self.n, giver, receiver))
    }

    /// Returns the number of selected edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.count_ones(..)
    }

    /// Returns how many gifts `giver` gives.
    pub fn out_degree(&self, giver: ParticipantIndex) -> usize {
        let start = giver.get() * self.n;
        self.edges.count_ones(start..start + self.n)
    }

    /// Returns how many gifts `receiver` receives.
    pub fn in_degree(&self, receiver: ParticipantIndex) -> usize {
        (0..self.n)
            .filter(|&i| self.edges.contains(i * self.n + receiver.get()))
            .count()
    }

    /// Returns the receivers of `giver` in ascending index order.
    pub fn receivers_of(&self, giver: ParticipantIndex) -> impl Iterator<Item = ParticipantIndex> + '_ {
        let start = giver.get() * self.n;
        (0..self.n)
            .filter(move |&j| self.edges.contains(start + j))
            .map(ParticipantIndex::new)
    }

    /// Iterates over all selected edges in row-major order.
    pub fn edges(&self) -> impl Iterator<Item = (ParticipantIndex, ParticipantIndex)> + '_ {
        let n = self.n;
        self.edges.ones().map(move |offset| unflatten_pair(n, offset))
    }

    /// Returns the underlying bitset.
    #[inline]
    pub fn as_bitset(&self) -> &FixedBitSet {
        &self.edges
    }
}

impl std::fmt::Debug for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assignment")
            .field("objective", &self.objective)
            .field(
                "edges",
                &self
                    .edges()
                    .map(|(i, j)| (i.get(), j.get()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl std::fmt::Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Assignment(objective: {}, edges: {})",
            self.objective,
            self.num_edges()
        )
    }
}
