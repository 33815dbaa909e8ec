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
    error::ModelError,
    exclusion::ExclusionSet,
    index::ParticipantIndex,
    weights::WeightMatrix,
};
use smallvec::SmallVec;

/// The default number of gifts each participant gives and receives.
pub const DEFAULT_DEGREE_TARGET: usize = 2;

/// Represents the theoretical search space size of a gift exchange.
///
/// Every non-forbidden ordered pair is a binary decision, so the space is
/// approximated as $2^E$ where $E$ is the number of candidate edges.
/// Since these numbers quickly exceed any integer type, the value is stored
/// in **Logarithmic Space** ($\log_{10}$).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, PartialOrd)]
pub struct Complexity {
    log_val: f64,
}

impl Complexity {
    /// Calculates the complexity for a given number of binary edge variables.
    pub fn new(num_edge_variables: usize) -> Self {
        Complexity {
            log_val: num_edge_variables as f64 * std::f64::consts::LOG10_2,
        }
    }

    /// Returns the percentage of the search space that was actually explored.
    /// Returns `Some(0.0)` if the space is too large for the ratio to be meaningful.
    pub fn coverage(&self, nodes_explored: u64) -> Option<f64> {
        if self.log_val > 15.0 {
            return Some(0.0);
        }

        let total_size = 10.0_f64.powf(self.log_val);
        if total_size == 0.0 {
            return None;
        }

        Some((nodes_explored as f64 / total_size) * 100.0)
    }

    /// Returns the order of magnitude.
    #[inline]
    pub fn exponent(&self) -> u64 {
        self.log_val.floor() as u64
    }

    /// Returns the coefficient in `[1, 10)`.
    #[inline]
    pub fn mantissa(&self) -> f64 {
        let fractional_part = self.log_val - self.log_val.floor();
        10.0_f64.powf(fractional_part)
    }

    #[inline]
    pub fn raw(&self) -> f64 {
        self.log_val
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} × 10^{}", self.mantissa(), self.exponent())
    }
}

impl std::fmt::Debug for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Complexity(log10={:.4})", self.log_val)
    }
}

/// The immutable constraint model of a gift exchange.
///
/// This struct holds all pre-validated, queryable data:
/// - `weights`: the dense novelty matrix.
/// - `exclusions`: every ordered pair that can never be selected (self gifts,
///   last year's pairs, couples and family groups).
/// - `out_candidates[i]`: the receivers `i` may give to, sorted by descending
///   weight and ascending index on ties.
/// - `in_candidates[j]`: the givers `j` may receive from, same order.
/// - `edges_by_weight`: every candidate edge, sorted by descending weight and
///   ascending `(giver, receiver)` on ties.
///
/// Construction:
/// - Use `ModelBuilder` and call `ModelBuilder::build` to obtain a validated model.
#[derive(Clone)]
pub struct ConstraintModel {
    degree: usize,
    weights: WeightMatrix,
    exclusions: ExclusionSet,
    out_candidates: Vec<Vec<ParticipantIndex>>, // len = n
    in_candidates: Vec<Vec<ParticipantIndex>>,  // len = n
    edges_by_weight: Vec<(ParticipantIndex, ParticipantIndex)>,
}

impl ConstraintModel {
    /// Returns the number of participants.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use mistletoe_model::model::ModelBuilder;
    /// # use mistletoe_model::weights::WeightMatrix;
    ///
    /// let weights = WeightMatrix::uniform(4, 1.0).unwrap();
    /// let model = ModelBuilder::new(weights).build().unwrap();
    /// assert_eq!(model.participant_count(), 4);
    /// ```
    #[inline]
    pub fn participant_count(&self) -> usize {
        self.weights.dimension()
    }

    /// Returns the number of gifts each participant gives and receives.
    #[inline]
    pub fn degree_target(&self) -> usize {
        self.degree
    }

    /// Returns the novelty weight of `giver -> receiver`.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if either index is out of bounds.
    #[inline]
    pub fn weight(&self, giver: ParticipantIndex, receiver: ParticipantIndex) -> f64 {
        self.weights.get(giver, receiver)
    }

    /// Returns `true` if `giver -> receiver` can never be selected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use mistletoe_model::model::ModelBuilder;
    /// # use mistletoe_model::weights::WeightMatrix;
    /// # use mistletoe_model::index::ParticipantIndex;
    ///
    /// let weights = WeightMatrix::uniform(4, 1.0).unwrap();
    /// let mut builder = ModelBuilder::new(weights);
    /// builder.add_couple(ParticipantIndex::new(0), ParticipantIndex::new(1));
    /// let model = builder.build().unwrap();
    ///
    /// assert!(model.is_forbidden(ParticipantIndex::new(0), ParticipantIndex::new(0)));
    /// assert!(model.is_forbidden(ParticipantIndex::new(1), ParticipantIndex::new(0)));
    /// assert!(!model.is_forbidden(ParticipantIndex::new(0), ParticipantIndex::new(2)));
    /// ```
    #[inline]
    pub fn is_forbidden(&self, giver: ParticipantIndex, receiver: ParticipantIndex) -> bool {
        self.exclusions.contains(giver, receiver)
    }

    /// Returns the receivers `giver` may give to, heaviest first.
    #[inline]
    pub fn out_candidates_by_weight(&self, giver: ParticipantIndex) -> &[ParticipantIndex] {
        &self.out_candidates[giver.get()]
    }

    /// Returns the givers `receiver` may receive from, heaviest first.
    #[inline]
    pub fn in_candidates_by_weight(&self, receiver: ParticipantIndex) -> &[ParticipantIndex] {
        &self.in_candidates[receiver.get()]
    }

    /// Returns every candidate edge, heaviest first.
    #[inline]
    pub fn edges_by_weight(&self) -> &[(ParticipantIndex, ParticipantIndex)] {
        &self.edges_by_weight
    }

    /// Returns the number of off-diagonal ordered pairs, `N * (N - 1)`.
    #[inline]
    pub fn num_edge_variables(&self) -> usize {
        let n = self.participant_count();
        n * n.saturating_sub(1)
    }

    /// Returns the number of ordered pairs that are not forbidden.
    #[inline]
    pub fn num_candidate_edges(&self) -> usize {
        self.edges_by_weight.len()
    }

    #[inline]
    pub fn weights(&self) -> &WeightMatrix {
        &self.weights
    }

    #[inline]
    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// Returns the theoretical size of the search space.
    #[inline]
    pub fn complexity(&self) -> Complexity {
        Complexity::new(self.num_candidate_edges())
    }

    /// Returns the total weight of the `degree` heaviest outgoing candidates
    /// summed over all givers, or `None` if some giver has too few candidates.
    pub fn root_upper_bound(&self) -> Option<f64> {
        let k = self.degree;
        let mut sum = 0.0;
        for (i, row) in self.out_candidates.iter().enumerate() {
            if row.len() < k {
                return None;
            }
            let giver = ParticipantIndex::new(i);
            sum += row[..k].iter().map(|&j| self.weight(giver, j)).sum::<f64>();
        }
        Some(sum)
    }
}

impl std::fmt::Debug for ConstraintModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintModel")
            .field("participants", &self.participant_count())
            .field("degree", &self.degree)
            .field("weights", &self.weights)
            .field("exclusions", &self.exclusions)
            .finish()
    }
}

impl std::fmt::Display for ConstraintModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ConstraintModel(participants: {}, degree: {}, candidate_edges: {})",
            self.participant_count(),
            self.degree,
            self.num_candidate_edges()
        )
    }
}

/// Index-level builder for a `ConstraintModel`.
///
/// Participants are `0..N` where `N` is the dimension of the weight matrix.
/// All rules are collected first and validated together in `build`.
///
/// # Defaults
///
/// | Field | Default | Semantics |
/// | :--- | :--- | :--- |
/// | `degree` | `2` | Everyone gives and receives two gifts. |
/// | `couples` | none | No couple exclusions. |
/// | `families` | none | Every participant forms their own family group. |
/// | `last_year` | none | No repeat exclusions. |
#[derive(Clone, Debug)]
pub struct ModelBuilder {
    weights: WeightMatrix,
    degree: usize,
    couples: Vec<(ParticipantIndex, ParticipantIndex)>,
    families: Vec<Vec<ParticipantIndex>>,
    last_year: Vec<(ParticipantIndex, SmallVec<[ParticipantIndex; 2]>)>,
}

impl ModelBuilder {
    /// Creates a builder over the participants of `weights`.
    pub fn new(weights: WeightMatrix) -> Self {
        Self {
            weights,
            degree: DEFAULT_DEGREE_TARGET,
            couples: Vec::new(),
            families: Vec::new(),
            last_year: Vec::new(),
        }
    }

    /// Returns the number of participants.
    #[inline]
    pub fn participant_count(&self) -> usize {
        self.weights.dimension()
    }

    /// Sets the number of gifts each participant gives and receives.
    #[inline]
    pub fn set_degree_target(&mut self, degree: usize) -> &mut Self {
        self.degree = degree;
        self
    }

    /// Declares `a` and `b` a couple. They may not give to each other.
    #[inline]
    pub fn add_couple(&mut self, a: ParticipantIndex, b: ParticipantIndex) -> &mut Self {
        self.couples.push((a, b));
        self
    }

    /// Declares a family group. No member may give to another member.
    ///
    /// Once any family is added, the groups must partition all participants.
    pub fn add_family<I>(&mut self, members: I) -> &mut Self
    where
        I: IntoIterator<Item = ParticipantIndex>,
    {
        self.families.push(members.into_iter().collect());
        self
    }

    /// Records that `giver` gave to `receivers` last year.
    pub fn add_last_year<I>(&mut self, giver: ParticipantIndex, receivers: I) -> &mut Self
    where
        I: IntoIterator<Item = ParticipantIndex>,
    {
        self.last_year.push((giver, receivers.into_iter().collect()));
        self
    }

    /// Validates all collected rules and builds the model.
    ///
    /// # Errors
    ///
    /// - `InvalidDegreeTarget` if the degree target is zero.
    /// - `UnknownParticipant` if any index is not within `0..N`.
    /// - `DuplicateCouple` if a participant is in two couples or coupled with themselves.
    /// - `OverlappingGroup` if a participant is in two family groups.
    /// - `InvalidPartition` if family groups were given but miss a participant.
    /// - `DuplicateGiver` if last year's record lists a giver twice.
    pub fn build(self) -> Result<ConstraintModel, ModelError> {
        let n = self.participant_count();
        if self.degree == 0 {
            return Err(ModelError::InvalidDegreeTarget { degree: 0 });
        }

        let check = |p: ParticipantIndex| -> Result<ParticipantIndex, ModelError> {
            if p.get() < n {
                Ok(p)
            } else {
                Err(ModelError::UnknownParticipant {
                    participant: p.get().to_string(),
                })
            }
        };

        let mut exclusions = ExclusionSet::new(n);

        let mut coupled = vec![false; n];
        for &(a, b) in &self.couples {
            let (a, b) = (check(a)?, check(b)?);
            for p in [a, b] {
                if coupled[p.get()] {
                    return Err(ModelError::DuplicateCouple {
                        participant: p.get().to_string(),
                    });
                }
                coupled[p.get()] = true;
            }
            exclusions.forbid_both(a, b);
        }

        if !self.families.is_empty() {
            let mut group_of: Vec<Option<usize>> = vec![None; n];
            for (group, members) in self.families.iter().enumerate() {
                for &member in members {
                    let member = check(member)?;
                    if let Some(first_group) = group_of[member.get()] {
                        return Err(ModelError::OverlappingGroup {
                            participant: member.get().to_string(),
                            first_group,
                            second_group: group,
                        });
                    }
                    group_of[member.get()] = Some(group);
                }
                for &a in members {
                    for &b in members {
                        exclusions.forbid(a, b);
                    }
                }
            }
            if let Some(missing) = group_of.iter().position(Option::is_none) {
                return Err(ModelError::InvalidPartition {
                    participant: missing.to_string(),
                });
            }
        }

        let mut seen_giver = vec![false; n];
        for (giver, receivers) in &self.last_year {
            let giver = check(*giver)?;
            if seen_giver[giver.get()] {
                return Err(ModelError::DuplicateGiver {
                    participant: giver.get().to_string(),
                });
            }
            seen_giver[giver.get()] = true;
            for &receiver in receivers {
                exclusions.forbid(giver, check(receiver)?);
            }
        }

        Ok(ConstraintModel::assemble(self.weights, exclusions, self.degree))
    }
}

impl ConstraintModel {
    fn assemble(weights: WeightMatrix, exclusions: ExclusionSet, degree: usize) -> Self {
        let n = weights.dimension();
        let by_weight_desc = |w: &WeightMatrix,
                              a: (ParticipantIndex, ParticipantIndex),
                              b: (ParticipantIndex, ParticipantIndex)| {
            w.get(b.0, b.1)
                .total_cmp(&w.get(a.0, a.1))
                .then_with(|| a.cmp(&b))
        };

        let mut out_candidates = Vec::with_capacity(n);
        let mut in_candidates = Vec::with_capacity(n);
        for i in (0..n).map(ParticipantIndex::new) {
            let mut out: Vec<ParticipantIndex> = (0..n)
                .map(ParticipantIndex::new)
                .filter(|&j| !exclusions.contains(i, j))
                .collect();
            out.sort_by(|&a, &b| by_weight_desc(&weights, (i, a), (i, b)));
            out_candidates.push(out);

            let mut inc: Vec<ParticipantIndex> = (0..n)
                .map(ParticipantIndex::new)
                .filter(|&g| !exclusions.contains(g, i))
                .collect();
            inc.sort_by(|&a, &b| {
                weights
                    .get(b, i)
                    .total_cmp(&weights.get(a, i))
                    .then_with(|| a.cmp(&b))
            });
            in_candidates.push(inc);
        }

        let mut edges_by_weight: Vec<(ParticipantIndex, ParticipantIndex)> = out_candidates
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().map(move |&j| (ParticipantIndex::new(i), j)))
            .collect();
        edges_by_weight.sort_by(|&a, &b| by_weight_desc(&weights, a, b));

        Self {
            degree,
            weights,
            exclusions,
            out_candidates,
            in_candidates,
            edges_by_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(i: usize) -> ParticipantIndex {
        ParticipantIndex::new(i)
    }

    fn weights_4() -> WeightMatrix {
        WeightMatrix::from_rows(&[
            vec![0.0, 5.0, 1.0, 3.0],
            vec![2.0, 0.0, 2.0, 7.0],
            vec![4.0, 4.0, 0.0, 1.0],
            vec![6.0, 1.0, 9.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_default_model_forbids_only_self_gifts() {
        let model = ModelBuilder::new(weights_4()).build().unwrap();
        assert_eq!(model.participant_count(), 4);
        assert_eq!(model.degree_target(), DEFAULT_DEGREE_TARGET);
        assert_eq!(model.num_edge_variables(), 12);
        assert_eq!(model.num_candidate_edges(), 12);
        for i in 0..4 {
            assert!(model.is_forbidden(p(i), p(i)));
            assert!(!model.out_candidates_by_weight(p(i)).contains(&p(i)));
        }
    }

    #[test]
    fn test_candidates_sorted_by_weight_then_index() {
        let model = ModelBuilder::new(weights_4()).build().unwrap();
        assert_eq!(model.out_candidates_by_weight(p(0)), &[p(1), p(3), p(2)]);
        // Ties on 2.0 resolve to the lower receiver first.
        assert_eq!(model.out_candidates_by_weight(p(1)), &[p(3), p(0), p(2)]);
        assert_eq!(model.out_candidates_by_weight(p(2)), &[p(0), p(1), p(3)]);
        assert_eq!(model.in_candidates_by_weight(p(0)), &[p(3), p(2), p(1)]);
        assert_eq!(model.in_candidates_by_weight(p(3)), &[p(1), p(0), p(2)]);
    }

    #[test]
    fn test_edges_by_weight_global_order() {
        let model = ModelBuilder::new(weights_4()).build().unwrap();
        let edges = model.edges_by_weight();
        assert_eq!(edges[0], (p(3), p(2)));
        assert_eq!(edges[1], (p(1), p(3)));
        assert_eq!(edges[2], (p(3), p(0)));
        // (0,1) and the two 4.0 edges: 5.0 first, then (2,0) before (2,1).
        assert_eq!(edges[3], (p(0), p(1)));
        assert_eq!(edges[4], (p(2), p(0)));
        assert_eq!(edges[5], (p(2), p(1)));
        for pair in edges.windows(2) {
            let a = model.weight(pair[0].0, pair[0].1);
            let b = model.weight(pair[1].0, pair[1].1);
            assert!(a > b || (a == b && pair[0] < pair[1]));
        }
    }

    #[test]
    fn test_couple_family_and_last_year_exclusions() {
        let mut builder = ModelBuilder::new(WeightMatrix::uniform(6, 1.0).unwrap());
        builder
            .add_couple(p(0), p(1))
            .add_family([p(0), p(1), p(2)])
            .add_family([p(3), p(4)])
            .add_family([p(5)])
            .add_last_year(p(5), [p(0), p(3)]);
        let model = builder.build().unwrap();

        assert!(model.is_forbidden(p(0), p(1)));
        assert!(model.is_forbidden(p(1), p(0)));
        assert!(model.is_forbidden(p(2), p(0)));
        assert!(model.is_forbidden(p(1), p(2)));
        assert!(model.is_forbidden(p(3), p(4)));
        assert!(model.is_forbidden(p(4), p(3)));
        assert!(model.is_forbidden(p(5), p(0)));
        assert!(model.is_forbidden(p(5), p(3)));
        assert!(!model.is_forbidden(p(0), p(5)));
        assert!(!model.is_forbidden(p(3), p(5)));
        assert!(!model.is_forbidden(p(0), p(3)));

        assert_eq!(model.out_candidates_by_weight(p(5)), &[p(1), p(2), p(4)]);
        assert_eq!(model.in_candidates_by_weight(p(5)), &[p(0), p(1), p(2), p(3), p(4)]);
    }

    #[test]
    fn test_zero_degree_is_rejected() {
        let mut builder = ModelBuilder::new(weights_4());
        builder.set_degree_target(0);
        assert_eq!(
            builder.build().unwrap_err(),
            ModelError::InvalidDegreeTarget { degree: 0 }
        );
    }

    #[test]
    fn test_out_of_range_index_is_unknown() {
        let mut builder = ModelBuilder::new(weights_4());
        builder.add_couple(p(0), p(9));
        assert_eq!(
            builder.build().unwrap_err(),
            ModelError::UnknownParticipant {
                participant: "9".to_string()
            }
        );
    }

    #[test]
    fn test_participant_in_two_couples() {
        let mut builder = ModelBuilder::new(weights_4());
        builder.add_couple(p(0), p(1)).add_couple(p(2), p(1));
        assert_eq!(
            builder.build().unwrap_err(),
            ModelError::DuplicateCouple {
                participant: "1".to_string()
            }
        );

        let mut builder = ModelBuilder::new(weights_4());
        builder.add_couple(p(2), p(2));
        assert!(matches!(
            builder.build(),
            Err(ModelError::DuplicateCouple { .. })
        ));
    }

    #[test]
    fn test_families_must_partition() {
        let mut builder = ModelBuilder::new(weights_4());
        builder.add_family([p(0), p(1)]).add_family([p(1), p(2), p(3)]);
        assert_eq!(
            builder.build().unwrap_err(),
            ModelError::OverlappingGroup {
                participant: "1".to_string(),
                first_group: 0,
                second_group: 1
            }
        );

        let mut builder = ModelBuilder::new(weights_4());
        builder.add_family([p(0), p(1)]).add_family([p(3)]);
        assert_eq!(
            builder.build().unwrap_err(),
            ModelError::InvalidPartition {
                participant: "2".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_last_year_giver() {
        let mut builder = ModelBuilder::new(weights_4());
        builder
            .add_last_year(p(0), [p(1), p(2)])
            .add_last_year(p(0), [p(3)]);
        assert_eq!(
            builder.build().unwrap_err(),
            ModelError::DuplicateGiver {
                participant: "0".to_string()
            }
        );
    }

    #[test]
    fn test_root_upper_bound() {
        let model = ModelBuilder::new(weights_4()).build().unwrap();
        // Row maxima pairs: 5+3, 7+2, 4+4, 9+6.
        assert_eq!(model.root_upper_bound(), Some(40.0));

        let mut builder = ModelBuilder::new(WeightMatrix::uniform(3, 1.0).unwrap());
        builder.add_couple(p(0), p(1));
        let model = builder.build().unwrap();
        assert_eq!(model.root_upper_bound(), None);
    }

    #[test]
    fn test_complexity_display() {
        let c = Complexity::new(10);
        assert_eq!(c.exponent(), 3);
        assert!((c.mantissa() - 1.024).abs() < 1e-9);
        assert_eq!(c.to_string(), "1.02 × 10^3");
        assert!(c.coverage(1024).is_some_and(|v| (v - 100.0).abs() < 1e-6));
    }
}
