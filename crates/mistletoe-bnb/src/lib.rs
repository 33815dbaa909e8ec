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

//! Mistletoe-BnB: branch-and-bound for gift exchanges
//!
//! Exact solver for the degree-constrained gift assignment problem: every
//! participant gives and receives exactly `k` gifts, no forbidden pair is
//! used, no two participants give to each other, and the total weight is
//! maximal.
//!
//! Core flow
//! - Build a `mistletoe_model::model::ConstraintModel`.
//! - Choose a `branching::decision::DecisionBuilder` (edge ordering).
//! - Optionally fix edges, share an incumbent, and attach monitors.
//! - Run `bnb::BnbSolver` directly, or split the tree with
//!   `split::SubtreeSplitter` and solve the subtrees in parallel.
//!
//! Design highlights
//! - Every candidate edge is a binary variable; decisions include or exclude
//!   one edge and `propagate::Propagator` derives the forced consequences.
//! - Tight inner loop: state is mutated in place and restored via a trail.
//! - `bound::BoundEstimator` caches per-row and per-column bounds and only
//!   recomputes lines touched since the previous node.
//! - Deterministic given a deterministic builder.
//!
//! Module map
//! - `bnb`: the solver engine and session orchestration.
//! - `bound`: admissible upper bound on the remaining weight.
//! - `branching`: decision builders.
//! - `fixed`: pinned edges for subtree solves.
//! - `monitor`: tree-search monitors (log, composite, wrappers).
//! - `propagate`: degree and reciprocity propagation.
//! - `result`: solver outcomes with termination reasons.
//! - `split`: subtree enumeration for parallel search.
//! - `state`: the per-edge search state.
//! - `stats`: lightweight counters and timing.

pub mod bnb;
pub mod bound;
pub mod branching;
pub mod fixed;
mod incumbent;
pub mod monitor;
pub mod propagate;
pub mod result;
pub mod split;
mod stack;
pub mod state;
pub mod stats;
mod trail;
