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

//! # Mistletoe Solver
//!
//! High-level orchestration for exact gift-exchange planning. This crate
//! splits the branch-and-bound search into subtrees, runs them on worker
//! threads that share one incumbent, enforces global termination, and turns
//! the result into a validated gift plan.
//!
//! ## Modules
//!
//! - `solver`: parallel orchestrator with a builder, per-worker monitor
//!   stacks, shared incumbent, global counters, and unified outcome
//!   construction.
//! - `plan`: `GiftPlan` and `PlanOutcome`, the validated identifier-level
//!   view of a solve, and `PlanError`.
//!
//! ## Example
//!
//! ```rust
//! use mistletoe_model::problem::ProblemBuilder;
//! use mistletoe_solver::solver::SolverBuilder;
//!
//! let ids = ["ann", "bob", "cat", "dan", "eve"];
//! let problem = ProblemBuilder::new(ids)
//!     .family(["ann"])
//!     .family(["bob"])
//!     .family(["cat"])
//!     .family(["dan"])
//!     .family(["eve"])
//!     .build()
//!     .unwrap();
//!
//! let outcome = SolverBuilder::new().build().plan(&problem).unwrap();
//! assert!(outcome.plan().is_optimal());
//! for record in outcome.records(&problem).unwrap() {
//!     assert_eq!(record.receivers.len(), 2);
//! }
//! ```

pub mod plan;
pub mod solver;
