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

use crate::state::SearchState;

/// A frame marker describing the boundaries of a decision level on the trail.
///
/// `FrameEntry` stores:
/// - the committed weight before the level was entered (restored verbatim, so
///   backtracking never accumulates floating-point drift),
/// - the `entry_start_index` in the trail where this frame began.
///
/// All edge offsets recorded after `entry_start_index` belong to this frame and
/// are returned to `Undecided` on backtrack.
#[derive(Copy, Debug, Clone, PartialEq)]
pub struct FrameEntry {
    previous_committed: f64,
    entry_start_index: usize,
}

impl FrameEntry {
    #[inline(always)]
    pub fn new(previous_committed: f64, entry_start_index: usize) -> Self {
        Self {
            previous_committed,
            entry_start_index,
        }
    }

    #[inline]
    pub fn previous_committed(&self) -> f64 {
        self.previous_committed
    }

    #[inline]
    pub fn entry_start_index(&self) -> usize {
        self.entry_start_index
    }
}

impl std::fmt::Display for FrameEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FrameEntry(previous_committed: {}, entry_start_index: {})",
            self.previous_committed, self.entry_start_index
        )
    }
}

/// A linear undo log with frame markers for efficient backtracking.
///
/// Each entry is the flattened offset of one edge whose status left
/// `Undecided`. Undoing always returns the edge to `Undecided`, so the offset
/// alone is enough. Typical usage:
/// 1. Call `push_frame(state)` before applying a decision,
/// 2. `record` every edge the decision and its propagation decide,
/// 3. Call `backtrack(state)` to restore the state to the start of the frame.
#[derive(Debug, Clone, Default)]
pub struct SearchTrail {
    entries: Vec<usize>,
    frames: Vec<FrameEntry>,
}

impl SearchTrail {
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Creates a trail with room for every candidate edge of a model.
    #[inline]
    pub fn preallocated(num_candidate_edges: usize) -> Self {
        Self {
            entries: Vec::with_capacity(num_candidate_edges),
            frames: Vec::with_capacity(num_candidate_edges.saturating_add(1)),
        }
    }

    #[inline]
    pub fn ensure_capacity(&mut self, num_candidate_edges: usize) {
        if self.entries.capacity() < num_candidate_edges {
            self.entries
                .reserve(num_candidate_edges - self.entries.len());
        }
        let frame_capacity = num_candidate_edges.saturating_add(1);
        if self.frames.capacity() < frame_capacity {
            self.frames.reserve(frame_capacity - self.frames.len());
        }
    }

    #[inline]
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Opens a new decision level.
    #[inline]
    pub fn push_frame(&mut self, state: &SearchState) {
        self.frames
            .push(FrameEntry::new(state.committed(), self.entries.len()));
    }

    /// Records that the edge at `offset` was decided in the current level.
    #[inline(always)]
    pub fn record(&mut self, offset: usize) {
        self.entries.push(offset);
    }

    /// Undoes every edge recorded in the current level, newest first.
    /// Returns `false` if there was no frame to pop.
    #[inline]
    pub fn backtrack(&mut self, state: &mut SearchState) -> bool {
        let Some(frame) = self.frames.pop() else {
            return false;
        };
        let start = frame.entry_start_index();
        while self.entries.len() > start {
            if let Some(offset) = self.entries.pop() {
                state.revert(offset);
            }
        }
        state.set_committed(frame.previous_committed());
        true
    }

    #[inline]
    pub fn reset(&mut self) {
        self.entries.clear();
        self.frames.clear();
    }
}

impl std::fmt::Display for SearchTrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchTrail(depth: {}, entries: {})",
            self.frames.len(),
            self.entries.len()
        )
    }
}
