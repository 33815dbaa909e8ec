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

//! # Mistletoe Search
//!
//! Solver-agnostic search infrastructure shared by the branch-and-bound engine
//! and the parallel orchestrator.
//!
//! * **`incumbent`**: `SharedIncumbent`, the best-known assignment slot with a
//!   lock-free objective hint.
//! * **`result`**: `SolverResult`, `TerminationReason` and `SolverOutcome`.
//! * **`stats`**: aggregate `SolverStatistics`.
//! * **`monitor`**: global `SearchMonitor`s for interrupts, deadlines and
//!   solution limits.

pub mod incumbent;
pub mod monitor;
pub mod result;
pub mod stats;
