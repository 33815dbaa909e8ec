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

//! Branching rules for edge selection
//!
//! Every node of the search branches on one undecided ordered pair with two
//! children: include the edge, then exclude it. Builders only differ in
//! which edge they pick.
//!
//! Provided builders:
//! - `heaviest`: the undecided edge of highest weight, ties by lowest
//!   `(giver, receiver)`. This is the default rule.
//! - `lexicographic`: the lowest undecided `(giver, receiver)` regardless of
//!   weight. Useful as a baseline and for reproducing fixed prefixes.
//!
//! All iterators are fused: once exhausted, further `next()` calls yield `None`.

pub mod decision;
pub mod heaviest;
pub mod lexicographic;
