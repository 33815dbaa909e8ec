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

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mistletoe_model::{
    index::ParticipantIndex,
    model::{ConstraintModel, ModelBuilder},
    weights::WeightMatrix,
};
use mistletoe_solver::solver::SolverBuilder;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::hint::black_box;

fn pi(i: usize) -> ParticipantIndex {
    ParticipantIndex::new(i)
}

/// Twelve participants in four families of three, two couples across
/// families and a full last-year record.
fn build_model(seed: u64) -> ConstraintModel {
    let mut rng = StdRng::seed_from_u64(seed);
    let weights = WeightMatrix::from_fn(12, |_, _| rng.random_range(1..=20) as f64)
        .expect("weights are finite");
    let mut builder = ModelBuilder::new(weights);
    for family in [[0, 1, 2], [3, 4, 5], [6, 7, 8], [9, 10, 11]] {
        builder.add_family(family.map(pi));
    }
    builder.add_couple(pi(2), pi(3));
    builder.add_couple(pi(8), pi(9));
    for giver in 0..12 {
        builder.add_last_year(pi(giver), [pi((giver + 5) % 12), pi((giver + 7) % 12)]);
    }
    builder.build().expect("benchmark model is valid")
}

fn bench_solver(c: &mut Criterion) {
    let model = build_model(0x5eed);
    let mut group = c.benchmark_group("solver_benchmark");
    group.sample_size(10);

    for threads in [1, 2, 4] {
        let solver = SolverBuilder::new().with_threads(threads).build();
        group.bench_with_input(
            BenchmarkId::new("twelve_participants", threads),
            &model,
            |b, model| {
                b.iter(|| {
                    let outcome = solver.solve(black_box(model));
                    black_box(outcome.result.objective())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_solver);
criterion_main!(benches);
