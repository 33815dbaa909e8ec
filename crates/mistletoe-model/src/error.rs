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

//! Error taxonomy for model construction and solution validation.
//!
//! Construction errors (`InvalidPartition`, `DuplicateCouple`,
//! `OverlappingGroup`, `UnknownParticipant`, ...) are raised before any search
//! starts and always name the offending participant or group so the input can
//! be fixed. `InvariantViolated` is an internal-fault signal raised only by the
//! `SolutionExtractor`; it points at a bookkeeping bug in the search engine,
//! never at bad data.

use thiserror::Error;

/// The structural rule an assignment broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Invariant {
    /// The assignment does not match the model's dimension.
    Dimension,
    /// A participant gives a gift to themselves.
    SelfGift,
    /// A selected edge is in the exclusion set.
    ExcludedEdge,
    /// Both `i -> j` and `j -> i` are selected.
    Reciprocal,
    /// A participant does not give exactly the target number of gifts.
    OutDegree,
    /// A participant does not receive exactly the target number of gifts.
    InDegree,
}

impl std::fmt::Display for Invariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Invariant::Dimension => write!(f, "dimension"),
            Invariant::SelfGift => write!(f, "no self gifts"),
            Invariant::ExcludedEdge => write!(f, "no excluded pairs"),
            Invariant::Reciprocal => write!(f, "no reciprocal gifts"),
            Invariant::OutDegree => write!(f, "out-degree target"),
            Invariant::InDegree => write!(f, "in-degree target"),
        }
    }
}

/// Errors raised while building a model or validating an assignment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The family groups do not cover every participant.
    #[error("family groups do not partition the participants: `{participant}` is in no group")]
    InvalidPartition { participant: String },

    /// A participant appears in more than one couple, or twice in the same couple.
    #[error("participant `{participant}` appears in more than one couple")]
    DuplicateCouple { participant: String },

    /// A participant appears in more than one family group, or twice in one group.
    #[error("participant `{participant}` appears in family groups {first_group} and {second_group}")]
    OverlappingGroup {
        participant: String,
        first_group: usize,
        second_group: usize,
    },

    /// A referenced participant is not part of the eligible set.
    #[error("unknown participant `{participant}`")]
    UnknownParticipant { participant: String },

    /// The eligible list contains the same identifier twice.
    #[error("participant `{participant}` is listed more than once")]
    DuplicateParticipant { participant: String },

    /// Last year's record lists the same giver twice.
    #[error("giver `{participant}` appears more than once in last year's record")]
    DuplicateGiver { participant: String },

    /// The weight matrix is not square with one row per participant.
    #[error("weight matrix must be {expected}x{expected}, found a row of length {found} at row {row}")]
    WeightDimension {
        expected: usize,
        row: usize,
        found: usize,
    },

    /// The weight matrix has the wrong number of entries.
    #[error("weight matrix must have {expected} entries, found {found}")]
    WeightCount { expected: usize, found: usize },

    /// An off-diagonal weight is NaN or infinite.
    #[error("weight for {giver} -> {receiver} is not finite")]
    NonFiniteWeight { giver: usize, receiver: usize },

    /// The weights are finite but too large to sum without overflowing.
    #[error("weight magnitudes are too large to sum without overflow")]
    WeightOverflow,

    /// The degree target must be at least one gift.
    #[error("degree target must be positive, got {degree}")]
    InvalidDegreeTarget { degree: usize },

    /// A completed assignment broke a structural invariant.
    #[error("assignment violates invariant `{invariant}`: {detail}")]
    InvariantViolated { invariant: Invariant, detail: String },
}

impl ModelError {
    /// Returns `true` if this error signals a solver bug rather than bad input.
    #[inline]
    pub fn is_internal_fault(&self) -> bool {
        matches!(self, ModelError::InvariantViolated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = ModelError::DuplicateCouple {
            participant: "alice".to_string(),
        };
        assert!(err.to_string().contains("alice"));

        let err = ModelError::OverlappingGroup {
            participant: "bob".to_string(),
            first_group: 0,
            second_group: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("bob"));
        assert!(msg.contains('0') && msg.contains('2'));
    }

    #[test]
    fn test_only_invariant_violations_are_internal_faults() {
        let fault = ModelError::InvariantViolated {
            invariant: Invariant::Reciprocal,
            detail: "0 <-> 1".to_string(),
        };
        assert!(fault.is_internal_fault());
        assert!(fault.to_string().contains("no reciprocal gifts"));

        let input = ModelError::UnknownParticipant {
            participant: "zed".to_string(),
        };
        assert!(!input.is_internal_fault());
    }
}
