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

use mistletoe_model::{
    extract::SolutionExtractor,
    index::ParticipantIndex,
    model::{ConstraintModel, ModelBuilder},
    problem::ProblemBuilder,
    weights::WeightMatrix,
};
use mistletoe_search::result::{SolverResult, TerminationReason};
use mistletoe_solver::solver::SolverBuilder;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn p(i: usize) -> ParticipantIndex {
    ParticipantIndex::new(i)
}

fn uniform(n: usize) -> ConstraintModel {
    ModelBuilder::new(WeightMatrix::uniform(n, 1.0).unwrap())
        .build()
        .unwrap()
}

/// Best objective over every assignment that satisfies the model, found by
/// letting each giver pick every possible set of receivers.
fn enumerate_optimum(model: &ConstraintModel) -> Option<f64> {
    fn pick(
        model: &ConstraintModel,
        giver: usize,
        start: usize,
        left: usize,
        chosen: &mut Vec<Vec<bool>>,
        in_degree: &mut Vec<usize>,
        weight: f64,
        best: &mut Option<f64>,
    ) {
        let n = model.participant_count();
        let k = model.degree_target();
        if left == 0 {
            if giver + 1 == n {
                if in_degree.iter().all(|&d| d == k) {
                    *best = Some(best.map_or(weight, |b: f64| b.max(weight)));
                }
            } else {
                pick(model, giver + 1, 0, k, chosen, in_degree, weight, best);
            }
            return;
        }
        for receiver in start..n {
            if model.is_forbidden(p(giver), p(receiver))
                || chosen[receiver][giver]
                || in_degree[receiver] >= k
            {
                continue;
            }
            chosen[giver][receiver] = true;
            in_degree[receiver] += 1;
            let w = weight + model.weight(p(giver), p(receiver));
            pick(model, giver, receiver + 1, left - 1, chosen, in_degree, w, best);
            in_degree[receiver] -= 1;
            chosen[giver][receiver] = false;
        }
    }

    let n = model.participant_count();
    if n == 0 {
        return Some(0.0);
    }
    let mut best = None;
    let mut chosen = vec![vec![false; n]; n];
    let mut in_degree = vec![0; n];
    pick(
        model,
        0,
        0,
        model.degree_target(),
        &mut chosen,
        &mut in_degree,
        0.0,
        &mut best,
    );
    best
}

fn assert_valid(model: &ConstraintModel, result: &SolverResult) {
    if let Some(assignment) = result.assignment() {
        assert!(SolutionExtractor::new(model).verify(assignment).is_ok());
        for giver in 0..model.participant_count() {
            assert!(!assignment.contains(p(giver), p(giver)));
        }
    }
}

#[test]
fn test_four_uniform_participants_cannot_exchange() {
    init_tracing();
    // Eight gifts would need eight distinct unordered pairs; four people
    // only form six.
    let model = uniform(4);
    let outcome = SolverBuilder::new().build().solve(&model);

    assert!(outcome.is_infeasible());
    assert_eq!(outcome.reason, TerminationReason::InfeasibilityProven);
    assert_eq!(enumerate_optimum(&model), None);
}

#[test]
fn test_five_uniform_participants_reach_full_weight() {
    init_tracing();
    let model = uniform(5);
    let outcome = SolverBuilder::new().build().solve(&model);

    assert!(outcome.is_optimal());
    assert_eq!(outcome.result.objective(), Some(10.0));
    assert_eq!(enumerate_optimum(&model), Some(10.0));
    assert_valid(&model, &outcome.result);
}

#[test]
fn test_three_participants_are_infeasible() {
    init_tracing();
    let model = uniform(3);
    let outcome = SolverBuilder::new().build().solve(&model);
    assert_eq!(outcome.result, SolverResult::Infeasible);
    assert_eq!(enumerate_optimum(&model), None);
}

#[test]
fn test_couples_match_enumeration() {
    init_tracing();
    let mut builder = ModelBuilder::new(WeightMatrix::uniform(4, 1.0).unwrap());
    builder.add_couple(p(0), p(1));
    let model = builder.build().unwrap();
    let outcome = SolverBuilder::new().build().solve(&model);
    assert_eq!(outcome.result.objective(), enumerate_optimum(&model));

    let weights =
        WeightMatrix::from_fn(6, |i, j| ((i.get() * 3 + j.get() * 5) % 7) as f64).unwrap();
    let mut builder = ModelBuilder::new(weights);
    builder.add_couple(p(0), p(1));
    builder.add_couple(p(2), p(3));
    let model = builder.build().unwrap();
    let outcome = SolverBuilder::new().build().solve(&model);

    assert!(outcome.is_optimal());
    assert_eq!(outcome.result.objective(), enumerate_optimum(&model));
    let assignment = outcome.result.assignment().unwrap();
    assert!(!assignment.contains(p(0), p(1)));
    assert!(!assignment.contains(p(1), p(0)));
    assert!(!assignment.contains(p(2), p(3)));
    assert!(!assignment.contains(p(3), p(2)));
}

#[test]
fn test_last_year_excludes_the_heaviest_edge() {
    init_tracing();
    let weights = WeightMatrix::from_fn(6, |i, j| {
        if (i.get(), j.get()) == (1, 4) {
            50.0
        } else {
            ((i.get() + 4 * j.get()) % 6) as f64
        }
    })
    .unwrap();
    let mut builder = ModelBuilder::new(weights);
    builder.add_last_year(p(1), [p(4), p(5)]);
    let model = builder.build().unwrap();

    let outcome = SolverBuilder::new().build().solve(&model);
    let assignment = outcome.result.assignment().unwrap();
    assert!(!assignment.contains(p(1), p(4)));
    assert!(!assignment.contains(p(1), p(5)));
    assert_eq!(Some(assignment.objective()), enumerate_optimum(&model));
}

#[test]
fn test_random_instances_match_enumeration() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(2025);
    for round in 0..10 {
        let n = 5 + round % 2;
        let weights = WeightMatrix::from_fn(n, |_, _| rng.random_range(0..10) as f64).unwrap();
        let mut builder = ModelBuilder::new(weights);
        if rng.random_bool(0.5) {
            builder.add_couple(p(1), p(2));
        }
        let giver = rng.random_range(0..n);
        builder.add_last_year(p(giver), [p((giver + 1) % n)]);
        let model = builder.build().unwrap();

        let outcome = SolverBuilder::new()
            .with_threads(2)
            .with_split_depth(2)
            .build()
            .solve(&model);
        assert_eq!(
            outcome.result.objective(),
            enumerate_optimum(&model),
            "round {}",
            round
        );
        assert!(!outcome.is_cancelled());
        assert_valid(&model, &outcome.result);
    }
}

#[test]
fn test_objective_is_independent_of_threads_and_repeats() {
    init_tracing();
    let weights =
        WeightMatrix::from_fn(9, |i, j| ((i.get() * 11 + j.get() * 17) % 13) as f64).unwrap();
    let mut builder = ModelBuilder::new(weights);
    builder.add_couple(p(0), p(8));
    builder.add_family([p(3), p(4), p(5)]);
    for single in [0, 1, 2, 6, 7, 8] {
        builder.add_family([p(single)]);
    }
    let model = builder.build().unwrap();

    let reference = SolverBuilder::new().with_threads(1).build().solve(&model);
    assert!(reference.is_optimal());
    assert_valid(&model, &reference.result);

    let again = SolverBuilder::new().with_threads(1).build().solve(&model);
    assert_eq!(reference.result, again.result);

    for (threads, depth) in [(2, 2), (4, 4), (3, 6)] {
        let outcome = SolverBuilder::new()
            .with_threads(threads)
            .with_split_depth(depth)
            .build()
            .solve(&model);
        assert!(outcome.is_optimal());
        assert_eq!(outcome.result.objective(), reference.result.objective());
        assert_valid(&model, &outcome.result);
    }
}

fn dense_model() -> ConstraintModel {
    let weights =
        WeightMatrix::from_fn(12, |i, j| ((i.get() * 5 + j.get() * 7) % 11) as f64).unwrap();
    let mut builder = ModelBuilder::new(weights);
    for family in [[0, 1, 2], [3, 4, 5], [6, 7, 8], [9, 10, 11]] {
        builder.add_family(family.map(p));
    }
    builder.add_couple(p(2), p(3));
    builder.add_couple(p(8), p(9));
    for giver in 0..12 {
        builder.add_last_year(p(giver), [p((giver + 4) % 12), p((giver + 7) % 12)]);
    }
    builder.build().unwrap()
}

#[test]
fn test_cancelled_dense_instance_never_beats_optimum() {
    init_tracing();
    let model = dense_model();

    let reference = SolverBuilder::new().with_threads(2).build().solve(&model);
    assert!(reference.is_optimal());
    assert_eq!(reference.reason, TerminationReason::OptimalityProven);
    assert_eq!(reference.result.objective(), Some(187.0));
    assert_valid(&model, &reference.result);

    // Stopped after the first complete schedule.
    let first = SolverBuilder::new()
        .with_threads(1)
        .with_split_depth(0)
        .with_solution_limit(1)
        .build()
        .solve(&model);
    assert!(first.is_cancelled());
    assert_eq!(
        first.reason,
        TerminationReason::Aborted("global solution limit reached".to_string())
    );
    let objective = first.result.objective().unwrap();
    assert!(objective <= 187.0);
    assert_valid(&model, &first.result);

    // A deadline that has already passed stops before any schedule exists.
    let late = SolverBuilder::new()
        .with_threads(2)
        .with_deadline(Instant::now() - Duration::from_millis(1))
        .build()
        .solve(&model);
    assert_eq!(late.result, SolverResult::Cancelled(None));
    assert_eq!(
        late.reason,
        TerminationReason::Aborted("deadline reached".to_string())
    );
}

#[test]
fn test_plan_from_identifiers() {
    init_tracing();
    let ids = ["ann", "bob", "cat", "dan", "eve", "fay", "gus"];
    let weights =
        WeightMatrix::from_fn(6, |i, j| 1.0 + ((i.get() + 2 * j.get()) % 4) as f64).unwrap();
    let problem = ProblemBuilder::new(ids)
        .signups(["ann", "bob", "cat", "dan", "eve", "fay"])
        .couple("ann", "bob")
        .couple("fay", "gus")
        .family(["ann", "bob"])
        .family(["cat"])
        .family(["dan"])
        .family(["eve"])
        .family(["fay", "gus"])
        .last_year("dan", ["eve", "gus"])
        .weights(weights)
        .build()
        .unwrap();

    let outcome = SolverBuilder::new()
        .with_logging(Duration::ZERO)
        .build()
        .plan(&problem)
        .unwrap();

    let model = problem.model();
    assert!(outcome.plan().is_optimal(), "{}", outcome);
    assert_eq!(outcome.plan().total_weight(), enumerate_optimum(model));

    let records = outcome.records(&problem).unwrap();
    assert_eq!(records.len(), 6);
    for record in &records {
        assert_eq!(record.receivers.len(), 2);
        assert!(!record.receivers.iter().any(|r| r == "gus"));
        match record.giver.as_str() {
            "ann" => assert!(!record.receivers.iter().any(|r| r == "bob")),
            "bob" => assert!(!record.receivers.iter().any(|r| r == "ann")),
            "dan" => assert!(!record.receivers.iter().any(|r| r == "eve")),
            _ => {}
        }
    }
}
