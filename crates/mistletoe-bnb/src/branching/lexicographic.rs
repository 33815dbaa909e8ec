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
use mistletoe_model::{index::ParticipantIndex, model::ConstraintModel};

/// Branches on the undecided edge with the lowest `(giver, receiver)`,
/// ignoring weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexicographicBuilder;

impl LexicographicBuilder {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl DecisionBuilder for LexicographicBuilder {
    type DecisionIterator<'a>
        = BinaryBranch
    where
        Self: 'a;

    fn name(&self) -> &str {
        "LexicographicBuilder"
    }

    fn next_decision<'a>(
        &'a mut self,
        model: &'a ConstraintModel,
        search_state: &'a SearchState,
    ) -> Self::DecisionIterator<'a> {
        let n = model.participant_count();
        let edge = (0..n)
            .map(ParticipantIndex::new)
            .filter(|&giver| search_state.out_open(giver) > 0)
            .find_map(|giver| {
                (0..n)
                    .map(ParticipantIndex::new)
                    .find(|&receiver| search_state.is_undecided(giver, receiver))
                    .map(|receiver| (giver, receiver))
            });
        BinaryBranch::new(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branching::decision::Decision;
    use mistletoe_model::{model::ModelBuilder, weights::WeightMatrix};

    fn p(i: usize) -> ParticipantIndex {
        ParticipantIndex::new(i)
    }

    #[test]
    fn test_walks_pairs_in_row_major_order() {
        let weights = WeightMatrix::from_fn(3, |i, j| (i.get() * 3 + j.get()) as f64).unwrap();
        let model = ModelBuilder::new(weights).build().unwrap();
        let mut state = SearchState::new(&model);
        let mut builder = LexicographicBuilder::new();

        let children: Vec<Decision> = builder.next_decision(&model, &state).collect();
        assert_eq!(
            children,
            vec![Decision::exclude(p(0), p(1)), Decision::include(p(0), p(1))]
        );

        state.exclude(p(0), p(1));
        state.exclude(p(0), p(2));
        let children: Vec<Decision> = builder.next_decision(&model, &state).collect();
        assert_eq!(children[1], Decision::include(p(1), p(0)));
    }
}
