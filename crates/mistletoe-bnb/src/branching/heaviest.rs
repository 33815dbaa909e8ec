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
    branching::decision::{BinaryBranch, DecisionBuilder},
    state::SearchState,
};
use mistletoe_model::model::ConstraintModel;

/// Branches on the undecided edge of highest weight.
///
/// The model keeps every candidate edge sorted by descending weight with
/// ascending `(giver, receiver)` on ties, so the first undecided entry is the
/// branching edge and the tie-break is deterministic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaviestEdgeBuilder;

impl HeaviestEdgeBuilder {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl DecisionBuilder for HeaviestEdgeBuilder {
    type DecisionIterator<'a>
        = BinaryBranch
    where
        Self: 'a;

    fn name(&self) -> &str {
        "HeaviestEdgeBuilder"
    }

    #[inline]
    fn next_decision<'a>(
        &'a mut self,
        model: &'a ConstraintModel,
        search_state: &'a SearchState,
    ) -> Self::DecisionIterator<'a> {
        let edge = model
            .edges_by_weight()
            .iter()
            .copied()
            .find(|&(giver, receiver)| search_state.is_undecided(giver, receiver));
        BinaryBranch::new(edge)
    }
}
