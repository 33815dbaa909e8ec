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

//! # Mistletoe Model
//!
//! **The Core Domain Model for the Mistletoe Gift-Exchange Solver.**
//!
//! This crate defines the data structures describing a gift exchange in which
//! every participant gives and receives a fixed number of gifts. It is the
//! interchange layer between raw participant data (identifiers, couples,
//! families, last year's record) and the search engine (`mistletoe_bnb`).
//!
//! ## Architecture
//!
//! * **`index`**: Strongly-typed `ParticipantIndex` to keep giver/receiver
//!   positions apart from arbitrary `usize` counters.
//! * **`weights`**: The dense `WeightMatrix` of novelty scores.
//! * **`exclusion`**: The precomputed `ExclusionSet` of forbidden ordered pairs.
//! * **`model`**: The immutable `ConstraintModel` and its index-level `ModelBuilder`.
//! * **`problem`**: The identifier-level `ProblemBuilder` adapter.
//! * **`assignment`**: The boolean edge selection produced by the search.
//! * **`extract`**: The `SolutionExtractor`, re-verifying assignments and
//!   turning them into a `GiftSchedule`.
//! * **`schedule`**: Per-giver output records.
//! * **`error`**: The `ModelError` taxonomy.
//!
//! ## Design Philosophy
//!
//! 1.  **Fail-Fast**: Builders validate eagerly so the solver never sees a
//!     malformed model.
//! 2.  **Immutable Models**: Once built, a `ConstraintModel` only answers
//!     queries over precomputed data.
//! 3.  **Flat Layouts**: Matrices and pair sets are stored row-major in flat
//!     vectors and bitsets for cache-friendly access in the search loop.

pub mod assignment;
pub mod error;
pub mod exclusion;
pub mod extract;
pub mod index;
pub mod model;
pub mod problem;
pub mod schedule;
pub mod weights;
