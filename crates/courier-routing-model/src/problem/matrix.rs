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

use crate::problem::err::TravelMatrixError;

/// Dense L x L travel-time matrix, row-major.
///
/// Entries are non-negative finite values. The matrix is not assumed to be
/// symmetric and is not assumed to respect the triangle inequality.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelMatrix {
    size: usize,
    values: Vec<f64>,
}

impl TravelMatrix {
    /// Matrix over zero locations.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            size: 0,
            values: Vec::new(),
        }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, TravelMatrixError> {
        let size = rows.len();
        let mut values = Vec::with_capacity(size * size);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(TravelMatrixError::RaggedRow {
                    row: i,
                    expected: size,
                    actual: row.len(),
                });
            }
            for (j, v) in row.into_iter().enumerate() {
                if !v.is_finite() || v < 0.0 {
                    return Err(TravelMatrixError::InvalidEntry {
                        row: i,
                        column: j,
                        value: v,
                    });
                }
                values.push(v);
            }
        }
        Ok(Self { size, values })
    }

    /// Number of locations.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Travel time from `from` to `to`.
    #[inline]
    pub fn travel(&self, from: usize, to: usize) -> f64 {
        self.values[from * self.size + to]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_accepts_square_matrix() {
        let m = TravelMatrix::from_rows(vec![vec![0.0, 2.0], vec![3.0, 0.0]]).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.travel(0, 1), 2.0);
        assert_eq!(m.travel(1, 0), 3.0);
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let err = TravelMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]]).unwrap_err();
        match err {
            TravelMatrixError::RaggedRow { row, expected, actual } => {
                assert_eq!(row, 1);
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("expected RaggedRow, got {other}"),
        }
    }

    #[test]
    fn test_from_rows_rejects_negative_entries() {
        let err = TravelMatrix::from_rows(vec![vec![0.0, -1.0], vec![1.0, 0.0]]).unwrap_err();
        assert!(matches!(err, TravelMatrixError::InvalidEntry { .. }));
    }

    #[test]
    fn test_from_rows_rejects_nan_entries() {
        let err = TravelMatrix::from_rows(vec![vec![0.0, f64::NAN], vec![1.0, 0.0]]).unwrap_err();
        assert!(matches!(err, TravelMatrixError::InvalidEntry { row: 0, column: 1, .. }));
    }

    #[test]
    fn test_matrix_may_be_asymmetric() {
        let m = TravelMatrix::from_rows(vec![vec![0.0, 1.0], vec![100.0, 0.0]]).unwrap();
        assert_ne!(m.travel(0, 1), m.travel(1, 0));
    }
}
