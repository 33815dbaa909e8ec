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

/// The position of a participant inside a `ConstraintModel`.
///
/// Participants are numbered `0..N` in signup order. The wrapper is
/// `#[repr(transparent)]` over `usize`, so it costs nothing at runtime but
/// keeps participant positions from being mixed up with counters or flattened
/// pair offsets.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantIndex(usize);

impl ParticipantIndex {
    /// Creates a new `ParticipantIndex`.
    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying `usize` index.
    #[inline(always)]
    pub const fn get(&self) -> usize {
        self.0
    }
}

impl std::fmt::Debug for ParticipantIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParticipantIndex({})", self.0)
    }
}

impl std::fmt::Display for ParticipantIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParticipantIndex({})", self.0)
    }
}

impl From<usize> for ParticipantIndex {
    #[inline(always)]
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl From<ParticipantIndex> for usize {
    #[inline(always)]
    fn from(index: ParticipantIndex) -> Self {
        index.0
    }
}

/// Flattens an ordered pair `(giver, receiver)` into a row-major offset
/// of an `n x n` matrix.
#[inline(always)]
pub fn flatten_pair(n: usize, giver: ParticipantIndex, receiver: ParticipantIndex) -> usize {
    giver.get() * n + receiver.get()
}

/// Inverse of `flatten_pair`.
#[inline(always)]
pub fn unflatten_pair(n: usize, offset: usize) -> (ParticipantIndex, ParticipantIndex) {
    debug_assert!(
        n > 0,
        "called `unflatten_pair` with an empty matrix dimension"
    );
    (
        ParticipantIndex::new(offset / n),
        ParticipantIndex::new(offset % n),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_get_and_conversions() {
        let p = ParticipantIndex::new(7);
        assert_eq!(p.get(), 7);

        let q: ParticipantIndex = 3.into();
        let raw: usize = q.into();
        assert_eq!(raw, 3);
    }

    #[test]
    fn test_display_and_debug() {
        let p = ParticipantIndex::new(4);
        assert_eq!(format!("{}", p), "ParticipantIndex(4)");
        assert_eq!(format!("{:?}", p), "ParticipantIndex(4)");
    }

    #[test]
    fn test_flatten_roundtrip_on_corners() {
        let n = 5;
        let a = ParticipantIndex::new(0);
        let b = ParticipantIndex::new(4);
        assert_eq!(flatten_pair(n, a, b), 4);
        assert_eq!(flatten_pair(n, b, a), 20);
        assert_eq!(unflatten_pair(n, 20), (b, a));
        assert_eq!(unflatten_pair(n, 24), (b, b));
    }
}
