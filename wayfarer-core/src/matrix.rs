//! Dense pairwise distance matrix.

use thiserror::Error;

/// Square matrix of road distances in kilometres.
///
/// Entries are non-negative and finite with a zero diagonal. The matrix is
/// not required to be symmetric: `distance(i, j)` is the cost of driving from
/// waypoint `i` to waypoint `j`.
///
/// # Examples
/// ```
/// use wayfarer_core::DistanceMatrix;
///
/// let matrix = DistanceMatrix::from_rows(vec![
///     vec![0.0, 2.5],
///     vec![3.0, 0.0],
/// ])?;
/// assert_eq!(matrix.distance(0, 1), 2.5);
/// assert_eq!(matrix.distance(1, 0), 3.0);
/// # Ok::<(), wayfarer_core::MatrixError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    cells: Vec<f64>,
}

/// Errors returned when building a [`DistanceMatrix`] from raw rows.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    /// A row did not have as many columns as there are rows.
    #[error("row {row} has {actual} columns, expected {expected}")]
    NotSquare {
        /// Row index.
        row: usize,
        /// Expected column count.
        expected: usize,
        /// Actual column count.
        actual: usize,
    },
    /// An entry was negative, NaN or infinite.
    #[error("entry ({from}, {to}) is not a finite non-negative distance: {value}")]
    InvalidDistance {
        /// Row index.
        from: usize,
        /// Column index.
        to: usize,
        /// Offending value.
        value: f64,
    },
    /// A diagonal entry was not zero.
    #[error("diagonal entry {index} must be zero, found {value}")]
    NonZeroDiagonal {
        /// Diagonal index.
        index: usize,
        /// Offending value.
        value: f64,
    },
}

impl DistanceMatrix {
    /// Create an all-zero matrix for `size` waypoints.
    #[must_use]
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            cells: vec![0.0; size * size],
        }
    }

    /// Build a matrix from nested rows, validating every entry.
    ///
    /// # Errors
    ///
    /// Returns a [`MatrixError`] describing the first offending row or entry.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for (from, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(MatrixError::NotSquare {
                    row: from,
                    expected: size,
                    actual: row.len(),
                });
            }
            for (to, value) in row.into_iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(MatrixError::InvalidDistance { from, to, value });
                }
                if from == to && value != 0.0 {
                    return Err(MatrixError::NonZeroDiagonal { index: from, value });
                }
                cells.push(value);
            }
        }
        Ok(Self { size, cells })
    }

    /// Number of waypoints covered by the matrix.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` when the matrix covers no waypoints.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Distance in kilometres from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[must_use]
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        assert!(from < self.size && to < self.size, "index out of bounds");
        self.cells[from * self.size + to]
    }

    /// Record the distance from `from` to `to`.
    ///
    /// Diagonal writes are ignored so the diagonal stays zero. Negative or
    /// non-finite values are clamped to zero.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn set(&mut self, from: usize, to: usize, km: f64) {
        assert!(from < self.size && to < self.size, "index out of bounds");
        if from == to {
            return;
        }
        let value = if km.is_finite() && km > 0.0 { km } else { 0.0 };
        self.cells[from * self.size + to] = value;
    }

    /// Iterate over the rows of the matrix.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.cells.chunks(self.size.max(1)).take(self.size)
    }

    /// The pair of distinct waypoints with the greatest distance between
    /// them, comparing `d(i, j)` in both directions. Ties keep the first pair
    /// found in row-major order.
    #[must_use]
    pub fn farthest_pair(&self) -> Option<(usize, usize)> {
        let mut best: Option<((usize, usize), f64)> = None;
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                let d = self.distance(i, j).max(self.distance(j, i));
                if best.is_none_or(|(_, current)| d > current) {
                    best = Some(((i, j), d));
                }
            }
        }
        best.map(|(pair, _)| pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn rejects_ragged_rows() {
        let err = DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]])
            .expect_err("ragged rows");
        assert_eq!(
            err,
            MatrixError::NotSquare {
                row: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn rejects_invalid_entries(#[case] value: f64) {
        let err = DistanceMatrix::from_rows(vec![vec![0.0, value], vec![1.0, 0.0]])
            .expect_err("invalid entry");
        assert!(matches!(
            err,
            MatrixError::InvalidDistance { from: 0, to: 1, .. }
        ));
    }

    #[rstest]
    fn rejects_non_zero_diagonal() {
        let err = DistanceMatrix::from_rows(vec![vec![1.0, 1.0], vec![1.0, 0.0]])
            .expect_err("diagonal");
        assert_eq!(
            err,
            MatrixError::NonZeroDiagonal {
                index: 0,
                value: 1.0
            }
        );
    }

    #[rstest]
    fn set_keeps_diagonal_zero() {
        let mut matrix = DistanceMatrix::zeros(2);
        matrix.set(0, 0, 4.0);
        matrix.set(0, 1, 4.0);
        matrix.set(1, 0, -2.0);
        assert_eq!(matrix.distance(0, 0), 0.0);
        assert_eq!(matrix.distance(0, 1), 4.0);
        assert_eq!(matrix.distance(1, 0), 0.0);
    }

    #[rstest]
    fn farthest_pair_considers_both_directions() {
        let matrix = DistanceMatrix::from_rows(vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 1.0],
            vec![9.0, 1.0, 0.0],
        ])
        .expect("valid matrix");
        assert_eq!(matrix.farthest_pair(), Some((0, 2)));
        assert_eq!(DistanceMatrix::zeros(1).farthest_pair(), None);
    }

    #[rstest]
    fn rows_yield_each_row() {
        let matrix = DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![2.0, 0.0]])
            .expect("valid matrix");
        let rows: Vec<Vec<f64>> = matrix.rows().map(<[f64]>::to_vec).collect();
        assert_eq!(rows, vec![vec![0.0, 1.0], vec![2.0, 0.0]]);
    }
}
