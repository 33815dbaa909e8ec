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

//! Identifier-level problem construction.
//!
//! `ProblemBuilder` accepts participant data keyed by opaque string
//! identifiers, validates it against the eligible set, restricts it to the
//! participants who signed up for this run, and hands the index-level rules to
//! `ModelBuilder`. The resulting `Problem` keeps the identifier order so a
//! `GiftSchedule` can be rendered back into identifiers.
//!
//! Eligibility and signups are two different sets. Couples, families and last
//! year's record are validated against the eligible set. Entries that mention
//! an eligible participant who did not sign up are dropped without error.

use crate::{
    error::ModelError,
    index::ParticipantIndex,
    model::{ConstraintModel, DEFAULT_DEGREE_TARGET, ModelBuilder},
    schedule::GiftSchedule,
    weights::WeightMatrix,
};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

fn unknown(id: &str) -> ModelError {
    ModelError::UnknownParticipant {
        participant: id.to_string(),
    }
}

/// A validated problem: the constraint model plus the identifiers of its
/// participants in index order.
#[derive(Clone, Debug)]
pub struct Problem {
    participants: Vec<String>,
    lookup: FxHashMap<String, ParticipantIndex>,
    model: ConstraintModel,
}

impl Problem {
    #[inline]
    pub fn model(&self) -> &ConstraintModel {
        &self.model
    }

    /// Returns the identifiers of the active participants in index order.
    #[inline]
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// Returns the index of `id`, if it is an active participant.
    #[inline]
    pub fn index_of(&self, id: &str) -> Option<ParticipantIndex> {
        self.lookup.get(id).copied()
    }

    /// Returns the identifier at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not within `0..participants().len()`.
    #[inline]
    pub fn id_of(&self, index: ParticipantIndex) -> &str {
        &self.participants[index.get()]
    }

    /// Renders a schedule into identifier records, one per giver.
    pub fn records(&self, schedule: &GiftSchedule) -> Vec<GiftRecord> {
        schedule
            .records()
            .iter()
            .map(|r| GiftRecord {
                giver: self.id_of(r.giver()).to_string(),
                receivers: r
                    .receivers()
                    .iter()
                    .map(|&j| self.id_of(j).to_string())
                    .collect(),
            })
            .collect()
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Problem(participants: {}, {})", self.participants.len(), self.model)
    }
}

/// One giver and the identifiers they give to, receivers in index order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GiftRecord {
    pub giver: String,
    pub receivers: SmallVec<[String; 2]>,
}

impl std::fmt::Display for GiftRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.giver, self.receivers.join(", "))
    }
}

/// Builds a `Problem` from identifier-keyed participant data.
///
/// # Defaults
///
/// | Field | Default | Semantics |
/// | :--- | :--- | :--- |
/// | `signups` | all eligible | Everyone eligible takes part, in eligible order. |
/// | `weights` | uniform `1.0` | Every allowed edge is equally novel. |
/// | `degree` | `2` | Everyone gives and receives two gifts. |
///
/// Families are required: they must partition the eligible set exactly.
///
/// # Examples
///
/// ```rust
/// # use mistletoe_model::problem::ProblemBuilder;
///
/// let problem = ProblemBuilder::new(["ann", "bob", "cat", "dan", "eve"])
///     .couple("ann", "bob")
///     .family(["ann", "bob"])
///     .family(["cat"])
///     .family(["dan"])
///     .family(["eve"])
///     .last_year("cat", ["dan", "eve"])
///     .build()
///     .unwrap();
///
/// let model = problem.model();
/// let ann = problem.index_of("ann").unwrap();
/// let bob = problem.index_of("bob").unwrap();
/// assert!(model.is_forbidden(ann, bob));
/// assert_eq!(problem.participants().len(), 5);
/// ```
#[derive(Clone, Debug)]
pub struct ProblemBuilder {
    eligible: Vec<String>,
    signups: Option<Vec<String>>,
    couples: Vec<(String, String)>,
    families: Vec<Vec<String>>,
    last_year: Vec<(String, Vec<String>)>,
    weights: Option<WeightMatrix>,
    degree: usize,
}

impl ProblemBuilder {
    /// Creates a builder over the eligible participant identifiers.
    pub fn new<I, S>(eligible: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            eligible: eligible.into_iter().map(Into::into).collect(),
            signups: None,
            couples: Vec::new(),
            families: Vec::new(),
            last_year: Vec::new(),
            weights: None,
            degree: DEFAULT_DEGREE_TARGET,
        }
    }

    /// Sets the participants taking part this run, in weight matrix order.
    pub fn signups<I, S>(mut self, signups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signups = Some(signups.into_iter().map(Into::into).collect());
        self
    }

    pub fn couple(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.couples.push((a.into(), b.into()));
        self
    }

    pub fn family<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.families
            .push(members.into_iter().map(Into::into).collect());
        self
    }

    /// Records whom `giver` gave to last year.
    pub fn last_year<I, S>(mut self, giver: impl Into<String>, receivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.last_year
            .push((giver.into(), receivers.into_iter().map(Into::into).collect()));
        self
    }

    /// Sets the novelty weights, indexed by signup order.
    pub fn weights(mut self, weights: WeightMatrix) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn degree_target(mut self, degree: usize) -> Self {
        self.degree = degree;
        self
    }

    /// Validates the collected data and builds the problem.
    ///
    /// # Errors
    ///
    /// - `DuplicateParticipant` if the eligible list or the signups repeat an identifier.
    /// - `UnknownParticipant` if a signup, couple, family or last-year entry names
    ///   an identifier outside the eligible set.
    /// - `DuplicateCouple` if an identifier is in more than one couple.
    /// - `OverlappingGroup` if an identifier is in more than one family.
    /// - `InvalidPartition` if an eligible identifier is in no family.
    /// - `DuplicateGiver` if last year's record lists a giver twice.
    /// - `WeightDimension` if the weights do not match the number of signups.
    /// - `InvalidDegreeTarget` if the degree target is zero.
    pub fn build(self) -> Result<Problem, ModelError> {
        let mut eligible: FxHashSet<&str> = FxHashSet::default();
        for id in &self.eligible {
            if !eligible.insert(id.as_str()) {
                return Err(ModelError::DuplicateParticipant {
                    participant: id.clone(),
                });
            }
        }

        let participants: Vec<String> = match &self.signups {
            None => self.eligible.clone(),
            Some(signups) => {
                let mut seen: FxHashSet<&str> = FxHashSet::default();
                for id in signups {
                    if !eligible.contains(id.as_str()) {
                        return Err(unknown(id));
                    }
                    if !seen.insert(id.as_str()) {
                        return Err(ModelError::DuplicateParticipant {
                            participant: id.clone(),
                        });
                    }
                }
                signups.clone()
            }
        };

        let lookup: FxHashMap<String, ParticipantIndex> = participants
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), ParticipantIndex::new(i)))
            .collect();

        let check = |id: &str| -> Result<(), ModelError> {
            if eligible.contains(id) {
                Ok(())
            } else {
                Err(unknown(id))
            }
        };

        let mut coupled: FxHashSet<&str> = FxHashSet::default();
        for (a, b) in &self.couples {
            for id in [a, b] {
                check(id.as_str())?;
                if !coupled.insert(id.as_str()) {
                    return Err(ModelError::DuplicateCouple {
                        participant: id.clone(),
                    });
                }
            }
        }

        let mut group_of: FxHashMap<&str, usize> = FxHashMap::default();
        for (group, members) in self.families.iter().enumerate() {
            for id in members {
                check(id.as_str())?;
                if let Some(&first_group) = group_of.get(id.as_str()) {
                    return Err(ModelError::OverlappingGroup {
                        participant: id.clone(),
                        first_group,
                        second_group: group,
                    });
                }
                group_of.insert(id.as_str(), group);
            }
        }
        if let Some(missing) = self
            .eligible
            .iter()
            .find(|id| !group_of.contains_key(id.as_str()))
        {
            return Err(ModelError::InvalidPartition {
                participant: missing.clone(),
            });
        }

        let mut givers: FxHashSet<&str> = FxHashSet::default();
        for (giver, receivers) in &self.last_year {
            check(giver.as_str())?;
            if !givers.insert(giver.as_str()) {
                return Err(ModelError::DuplicateGiver {
                    participant: giver.clone(),
                });
            }
            for receiver in receivers {
                check(receiver.as_str())?;
            }
        }

        let n = participants.len();
        let weights = match self.weights {
            Some(weights) => weights,
            None => WeightMatrix::uniform(n, 1.0)?,
        };
        if weights.dimension() != n {
            return Err(ModelError::WeightDimension {
                expected: n,
                row: 0,
                found: weights.dimension(),
            });
        }

        let active = |id: &String| lookup.get(id.as_str()).copied();

        let mut builder = ModelBuilder::new(weights);
        builder.set_degree_target(self.degree);
        for (a, b) in &self.couples {
            if let (Some(a), Some(b)) = (active(a), active(b)) {
                builder.add_couple(a, b);
            }
        }
        for members in &self.families {
            let members: Vec<ParticipantIndex> = members.iter().filter_map(active).collect();
            if !members.is_empty() {
                builder.add_family(members);
            }
        }
        for (giver, receivers) in &self.last_year {
            if let Some(giver) = active(giver) {
                builder.add_last_year(giver, receivers.iter().filter_map(active));
            }
        }
        let model = builder.build()?;

        Ok(Problem {
            participants,
            lookup,
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn singles(ids: &[&str]) -> ProblemBuilder {
        ids.iter()
            .fold(ProblemBuilder::new(ids.iter().copied()), |b, id| b.family([*id]))
    }

    #[test]
    fn test_defaults_use_all_eligible_in_order() {
        let problem = singles(&["a", "b", "c", "d"]).build().unwrap();
        assert_eq!(problem.participants(), &["a", "b", "c", "d"]);
        assert_eq!(problem.index_of("c"), Some(ParticipantIndex::new(2)));
        assert_eq!(problem.id_of(ParticipantIndex::new(3)), "d");
        assert_eq!(problem.model().degree_target(), 2);
        assert_eq!(problem.model().num_candidate_edges(), 12);
    }

    #[test]
    fn test_duplicate_eligible_id() {
        let err = ProblemBuilder::new(["a", "b", "a"]).build().unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateParticipant {
                participant: "a".to_string()
            }
        );
    }

    #[test]
    fn test_signup_must_be_eligible_and_unique() {
        let err = singles(&["a", "b", "c"])
            .signups(["a", "z"])
            .build()
            .unwrap_err();
        assert_eq!(err, unknown("z"));

        let err = singles(&["a", "b", "c"])
            .signups(["a", "b", "a"])
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateParticipant { .. }));
    }

    #[test]
    fn test_couple_errors() {
        let err = singles(&["a", "b", "c"]).couple("a", "q").build().unwrap_err();
        assert_eq!(err, unknown("q"));

        let err = singles(&["a", "b", "c"])
            .couple("a", "b")
            .couple("c", "a")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateCouple {
                participant: "a".to_string()
            }
        );
    }

    #[test]
    fn test_family_errors() {
        let err = ProblemBuilder::new(["a", "b", "c"])
            .family(["a", "b"])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidPartition {
                participant: "c".to_string()
            }
        );

        let err = ProblemBuilder::new(["a", "b", "c"])
            .family(["a", "b"])
            .family(["c", "b"])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::OverlappingGroup {
                participant: "b".to_string(),
                first_group: 0,
                second_group: 1
            }
        );

        let err = ProblemBuilder::new(["a", "b"])
            .family(["a", "b", "x"])
            .build()
            .unwrap_err();
        assert_eq!(err, unknown("x"));
    }

    #[test]
    fn test_last_year_errors() {
        let err = singles(&["a", "b", "c"])
            .last_year("a", ["b", "c"])
            .last_year("a", ["c"])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateGiver {
                participant: "a".to_string()
            }
        );

        let err = singles(&["a", "b", "c"])
            .last_year("a", ["b", "gone"])
            .build()
            .unwrap_err();
        assert_eq!(err, unknown("gone"));
    }

    #[test]
    fn test_inactive_references_are_dropped() {
        let problem = ProblemBuilder::new(["a", "b", "c", "d", "e"])
            .signups(["e", "a", "c", "d"])
            .couple("a", "b")
            .couple("c", "d")
            .family(["a", "b", "c"])
            .family(["d", "e"])
            .last_year("b", ["a", "e"])
            .last_year("e", ["a", "b"])
            .build()
            .unwrap();

        assert_eq!(problem.participants(), &["e", "a", "c", "d"]);
        assert_eq!(problem.index_of("b"), None);

        let idx = |id: &str| problem.index_of(id).unwrap();
        let model = problem.model();
        assert!(model.is_forbidden(idx("c"), idx("d")));
        assert!(model.is_forbidden(idx("a"), idx("c")));
        assert!(model.is_forbidden(idx("d"), idx("e")));
        assert!(model.is_forbidden(idx("e"), idx("a")));
        assert!(!model.is_forbidden(idx("a"), idx("e")));
        assert!(!model.is_forbidden(idx("a"), idx("d")));
    }

    #[test]
    fn test_weights_must_match_signups() {
        let err = singles(&["a", "b", "c"])
            .weights(WeightMatrix::uniform(4, 1.0).unwrap())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::WeightDimension {
                expected: 3,
                row: 0,
                found: 4
            }
        );
    }

    #[test]
    fn test_records_render_identifiers() {
        use crate::{assignment::Assignment, extract::SolutionExtractor};

        let problem = singles(&["v", "w", "x", "y", "z"]).build().unwrap();
        let model = problem.model();
        let p = ParticipantIndex::new;
        let assignment = Assignment::from_edges(
            model,
            (0..5).flat_map(|i| [(p(i), p((i + 1) % 5)), (p(i), p((i + 2) % 5))]),
        );
        let schedule = SolutionExtractor::new(model).extract(&assignment).unwrap();
        let records = problem.records(&schedule);

        assert_eq!(records.len(), 5);
        assert_eq!(records[0].giver, "v");
        assert_eq!(records[0].receivers.as_slice(), &["w".to_string(), "x".to_string()]);
        assert_eq!(records[4].to_string(), "z -> v, w");
    }
}
