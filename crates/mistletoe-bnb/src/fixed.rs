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

//! Fixed edge decisions
//!
//! `FixedEdge` pins one ordered pair to selected or not selected before the
//! search starts. Sequences of fixed edges describe the root of a subtree;
//! the parallel orchestrator hands one such prefix to each worker.
//!
//! Ordering
//! - Total order: by `giver`, then `receiver`, then exclusions before inclusions.

use crate::branching::decision::Decision;
use mistletoe_model::index::ParticipantIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixedEdge {
    pub giver: ParticipantIndex,
    pub receiver: ParticipantIndex,
    pub selected: bool,
}

impl FixedEdge {
    #[inline]
    pub fn new(giver: ParticipantIndex, receiver: ParticipantIndex, selected: bool) -> Self {
        Self {
            giver,
            receiver,
            selected,
        }
    }

    #[inline]
    pub fn include(giver: ParticipantIndex, receiver: ParticipantIndex) -> Self {
        Self::new(giver, receiver, true)
    }

    #[inline]
    pub fn exclude(giver: ParticipantIndex, receiver: ParticipantIndex) -> Self {
        Self::new(giver, receiver, false)
    }
}

impl From<Decision> for FixedEdge {
    #[inline]
    fn from(decision: Decision) -> Self {
        Self::new(decision.giver(), decision.receiver(), decision.is_include())
    }
}

impl From<FixedEdge> for Decision {
    #[inline]
    fn from(fixed: FixedEdge) -> Self {
        if fixed.selected {
            Decision::include(fixed.giver, fixed.receiver)
        } else {
            Decision::exclude(fixed.giver, fixed.receiver)
        }
    }
}

impl std::fmt::Display for FixedEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FixedEdge(giver: {}, receiver: {}, selected: {})",
            self.giver.get(),
            self.receiver.get(),
            self.selected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(i: usize) -> ParticipantIndex {
        ParticipantIndex::new(i)
    }

    #[test]
    fn test_conversions_round_trip() {
        let decision = Decision::include(p(2), p(1));
        let fixed = FixedEdge::from(decision);
        assert_eq!(fixed, FixedEdge::include(p(2), p(1)));
        assert_eq!(Decision::from(fixed), decision);

        let fixed = FixedEdge::exclude(p(0), p(3));
        assert_eq!(Decision::from(fixed), Decision::exclude(p(0), p(3)));
    }

    #[test]
    fn test_ordering() {
        let mut edges = vec![
            FixedEdge::include(p(1), p(0)),
            FixedEdge::include(p(0), p(2)),
            FixedEdge::exclude(p(0), p(2)),
        ];
        edges.sort();
        assert_eq!(
            edges,
            vec![
                FixedEdge::exclude(p(0), p(2)),
                FixedEdge::include(p(0), p(2)),
                FixedEdge::include(p(1), p(0)),
            ]
        );
        assert_eq!(
            edges[0].to_string(),
            "FixedEdge(giver: 0, receiver: 2, selected: false)"
        );
    }
}
