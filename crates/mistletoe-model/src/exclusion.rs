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

use crate::index::{ParticipantIndex, flatten_pair};
use fixedbitset::FixedBitSet;

/// The set of ordered `(giver, receiver)` pairs that may never be selected.
///
/// Backed by a `FixedBitSet` keyed by `giver * n + receiver`. The diagonal is
/// inserted on construction, so self gifts are always forbidden.
#[derive(Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    n: usize,
    bits: FixedBitSet,
}

impl ExclusionSet {
    /// Creates a set over `n` participants that forbids only self gifts.
    pub fn new(n: usize) -> Self {
        let mut bits = FixedBitSet::with_capacity(n * n);
        for i in 0..n {
            bits.insert(i * n + i);
        }
        Self { n, bits }
    }

    /// Returns the number of participants the set is defined over.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Forbids the ordered pair `giver -> receiver`.
    #[inline]
    pub fn forbid(&mut self, giver: ParticipantIndex, receiver: ParticipantIndex) {
        debug_assert!(giver.get() < self.n && receiver.get() < self.n);
        self.bits.insert(flatten_pair(self.n, giver, receiver));
    }

    /// Forbids both `a -> b` and `b -> a`.
    #[inline]
    pub fn forbid_both(&mut self, a: ParticipantIndex, b: ParticipantIndex) {
        self.forbid(a, b);
        self.forbid(b, a);
    }

    /// Returns `true` if `giver -> receiver` is forbidden.
    #[inline]
    pub fn contains(&self, giver: ParticipantIndex, receiver: ParticipantIndex) -> bool {
        self.bits.contains(flatten_pair(self.n, giver, receiver))
    }

    /// Returns the number of forbidden ordered pairs, including the diagonal.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Returns `true` if the set is over zero participants.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Iterates over all forbidden off-diagonal pairs in row-major order.
    pub fn iter_off_diagonal(&self) -> impl Iterator<Item = (ParticipantIndex, ParticipantIndex)> + '_ {
        let n = self.n;
        self.bits.ones().filter_map(move |offset| {
            let (giver, receiver) = crate::index::unflatten_pair(n, offset);
            (giver != receiver).then_some((giver, receiver))
        })
    }
}

impl std::fmt::Debug for ExclusionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter_off_diagonal()).finish()
    }
}

impl std::fmt::Display for ExclusionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ExclusionSet(n: {}, forbidden: {})",
            self.n,
            self.len().saturating_sub(self.n)
        )
    }
}
