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

use crate::index::ParticipantIndex;
use smallvec::SmallVec;

/// The gifts one participant gives, receivers in ascending index order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GiverRecord {
    giver: ParticipantIndex,
    receivers: SmallVec<[ParticipantIndex; 2]>,
}

impl GiverRecord {
    #[inline]
    pub fn new(giver: ParticipantIndex, receivers: SmallVec<[ParticipantIndex; 2]>) -> Self {
        debug_assert!(
            receivers.windows(2).all(|w| w[0] < w[1]),
            "called `GiverRecord::new` with unsorted receivers"
        );
        Self { giver, receivers }
    }

    #[inline]
    pub fn giver(&self) -> ParticipantIndex {
        self.giver
    }

    #[inline]
    pub fn receivers(&self) -> &[ParticipantIndex] {
        &self.receivers
    }
}

impl std::fmt::Display for GiverRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ->", self.giver.get())?;
        for receiver in &self.receivers {
            write!(f, " {}", receiver.get())?;
        }
        Ok(())
    }
}

/// A validated gift schedule: one record per giver in index order, plus the
/// total novelty weight of all selected edges.
#[derive(Clone, Debug, PartialEq)]
pub struct GiftSchedule {
    records: Vec<GiverRecord>,
    total_weight: f64,
}

impl GiftSchedule {
    #[inline]
    pub(crate) fn new(records: Vec<GiverRecord>, total_weight: f64) -> Self {
        Self {
            records,
            total_weight,
        }
    }

    /// Returns the per-giver records, ordered by giver index.
    #[inline]
    pub fn records(&self) -> &[GiverRecord] {
        &self.records
    }

    /// Returns the receivers of `giver`.
    ///
    /// # Panics
    ///
    /// Panics if `giver` is not within `0..len()`.
    #[inline]
    pub fn receivers_of(&self, giver: ParticipantIndex) -> &[ParticipantIndex] {
        self.records[giver.get()].receivers()
    }

    #[inline]
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Returns the number of givers.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over all `(giver, receiver)` pairs in schedule order.
    pub fn edges(&self) -> impl Iterator<Item = (ParticipantIndex, ParticipantIndex)> + '_ {
        self.records
            .iter()
            .flat_map(|r| r.receivers.iter().map(move |&j| (r.giver, j)))
    }
}

impl std::fmt::Display for GiftSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "GiftSchedule(total_weight: {})", self.total_weight)?;
        for record in &self.records {
            writeln!(f, "  {}", record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn p(i: usize) -> ParticipantIndex {
        ParticipantIndex::new(i)
    }

    #[test]
    fn test_schedule_accessors_and_display() {
        let schedule = GiftSchedule::new(
            vec![
                GiverRecord::new(p(0), smallvec![p(1), p(2)]),
                GiverRecord::new(p(1), smallvec![p(0), p(2)]),
            ],
            3.5,
        );
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.receivers_of(p(1)), &[p(0), p(2)]);
        assert_eq!(schedule.edges().count(), 4);
        assert_eq!(
            schedule.to_string(),
            "GiftSchedule(total_weight: 3.5)\n  0 -> 1 2\n  1 -> 0 2\n"
        );
    }
}
