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

//! Dense novelty weights.
//!
//! `WeightMatrix` stores `weight(i, j)`, the desirability of participant `i`
//! giving to participant `j`, in a flat row-major vector. The diagonal is kept
//! for layout simplicity but never consulted: self gifts are always forbidden.

use crate::{
    error::ModelError,
    index::{ParticipantIndex, flatten_pair},
};

/// An `n x n` matrix of finite `f64` novelty weights.
#[derive(Clone, PartialEq)]
pub struct WeightMatrix {
    n: usize,
    values: Vec<f64>,
}

impl WeightMatrix {
    /// Builds a matrix from one row per giver.
    ///
    /// Fails with `ModelError::WeightDimension` if any row does not have one
    /// entry per participant, and with `ModelError::NonFiniteWeight` if an
    /// off-diagonal entry is NaN or infinite.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, ModelError>
    where
        R: AsRef<[f64]>,
    {
        let n = rows.len();
        let mut values = Vec::with_capacity(n * n);
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n {
                return Err(ModelError::WeightDimension {
                    expected: n,
                    row: row_index,
                    found: row.len(),
                });
            }
            values.extend_from_slice(row);
        }
        Self::from_flat(n, values)
    }

    /// Builds a matrix from a flat row-major vector of length `n * n`.
    ///
    /// Fails with `ModelError::WeightOverflow` if the off-diagonal weights
    /// are so large that summing their magnitudes overflows `f64`.
    pub fn from_flat(n: usize, values: Vec<f64>) -> Result<Self, ModelError> {
        if values.len() != n * n {
            return Err(ModelError::WeightCount {
                expected: n * n,
                found: values.len(),
            });
        }

        let mut magnitude = 0.0_f64;
        for giver in 0..n {
            for receiver in 0..n {
                let weight = values[giver * n + receiver];
                if giver == receiver {
                    continue;
                }
                if !weight.is_finite() {
                    return Err(ModelError::NonFiniteWeight { giver, receiver });
                }
                magnitude += weight.abs();
            }
        }

        // Committed weight plus the remaining bound never exceeds twice the
        // absolute sum, so both stay finite.
        if !(2.0 * magnitude).is_finite() {
            return Err(ModelError::WeightOverflow);
        }

        Ok(Self { n, values })
    }

    /// Builds a matrix by evaluating `f(giver, receiver)` for every pair.
    /// The diagonal is filled with `0.0` without calling `f`.
    pub fn from_fn<F>(n: usize, mut f: F) -> Result<Self, ModelError>
    where
        F: FnMut(ParticipantIndex, ParticipantIndex) -> f64,
    {
        let mut values = vec![0.0; n * n];
        for giver in 0..n {
            for receiver in 0..n {
                if giver != receiver {
                    values[giver * n + receiver] =
                        f(ParticipantIndex::new(giver), ParticipantIndex::new(receiver));
                }
            }
        }
        Self::from_flat(n, values)
    }

    /// A matrix where every off-diagonal entry equals `weight`.
    pub fn uniform(n: usize, weight: f64) -> Result<Self, ModelError> {
        Self::from_fn(n, |_, _| weight)
    }

    /// Returns the dimension `n`.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Returns `weight(giver, receiver)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is not within `0..dimension()`.
    #[inline]
    pub fn get(&self, giver: ParticipantIndex, receiver: ParticipantIndex) -> f64 {
        debug_assert!(
            giver.get() < self.n && receiver.get() < self.n,
            "called `WeightMatrix::get` with index out of bounds: the dimension is {} but the pair is ({}, {})",
            self.n,
            giver.get(),
            receiver.get()
        );
        self.values[flatten_pair(self.n, giver, receiver)]
    }

    /// Returns the raw row-major values.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl std::fmt::Debug for WeightMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightMatrix")
            .field("n", &self.n)
            .field("values", &self.values)
            .finish()
    }
}

impl std::fmt::Display for WeightMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WeightMatrix({}x{})", self.n, self.n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(i: usize) -> ParticipantIndex {
        ParticipantIndex::new(i)
    }

    #[test]
    fn test_from_rows_row_major_access() {
        let m = WeightMatrix::from_rows(&[
            vec![0.0, 1.0, 2.0],
            vec![3.0, 0.0, 4.0],
            vec![5.0, 6.0, 0.0],
        ])
        .unwrap();
        assert_eq!(m.dimension(), 3);
        assert_eq!(m.get(p(0), p(2)), 2.0);
        assert_eq!(m.get(p(2), p(1)), 6.0);
        assert_eq!(m.get(p(1), p(0)), 3.0);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let err = WeightMatrix::from_rows(&[vec![0.0, 1.0], vec![1.0]]).unwrap_err();
        assert_eq!(
            err,
            ModelError::WeightDimension {
                expected: 2,
                row: 1,
                found: 1
            }
        );
    }

    #[test]
    fn test_non_finite_off_diagonal_is_rejected_but_diagonal_is_ignored() {
        let ok = WeightMatrix::from_rows(&[vec![f64::NAN, 1.0], vec![1.0, f64::INFINITY]]);
        assert!(ok.is_ok());

        let err = WeightMatrix::from_rows(&[vec![0.0, f64::NAN], vec![1.0, 0.0]]).unwrap_err();
        assert_eq!(
            err,
            ModelError::NonFiniteWeight {
                giver: 0,
                receiver: 1
            }
        );
    }

    #[test]
    fn test_from_fn_skips_diagonal() {
        let m = WeightMatrix::from_fn(3, |i, j| (i.get() * 10 + j.get()) as f64).unwrap();
        assert_eq!(m.get(p(1), p(1)), 0.0);
        assert_eq!(m.get(p(1), p(2)), 12.0);
        assert_eq!(m.get(p(2), p(0)), 20.0);
    }

    #[test]
    fn test_weights_whose_sum_overflows_are_rejected() {
        let err = WeightMatrix::uniform(4, 1e307).unwrap_err();
        assert_eq!(err, ModelError::WeightOverflow);

        let err = WeightMatrix::from_rows(&[vec![0.0, f64::MAX], vec![-f64::MAX, 0.0]])
            .unwrap_err();
        assert_eq!(err, ModelError::WeightOverflow);

        // Large but summable weights are fine.
        let m = WeightMatrix::uniform(4, 1e300).unwrap();
        assert_eq!(m.get(p(0), p(3)), 1e300);
    }

    #[test]
    fn test_flat_length_mismatch() {
        let err = WeightMatrix::from_flat(2, vec![0.0; 3]).unwrap_err();
        assert_eq!(
            err,
            ModelError::WeightCount {
                expected: 4,
                found: 3
            }
        );
    }
}
