//! Tours: visiting orders over waypoint indices.

use std::ops::Range;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::DistanceMatrix;

/// Fixed-endpoint constraints applied to every tour of a request.
///
/// When `fixed_start` is set the tour must begin at waypoint `0`; when
/// `fixed_end` is set it must finish at waypoint `n - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TourConstraints {
    /// Pin waypoint `0` to the first position.
    pub fixed_start: bool,
    /// Pin waypoint `n - 1` to the last position.
    pub fixed_end: bool,
}

impl Default for TourConstraints {
    fn default() -> Self {
        Self::both_fixed()
    }
}

impl TourConstraints {
    /// Both endpoints pinned.
    #[must_use]
    pub const fn both_fixed() -> Self {
        Self {
            fixed_start: true,
            fixed_end: true,
        }
    }

    /// No endpoints pinned.
    #[must_use]
    pub const fn free() -> Self {
        Self {
            fixed_start: false,
            fixed_end: false,
        }
    }

    /// Positions a search may rearrange for a tour of `n` waypoints.
    ///
    /// # Examples
    /// ```
    /// use wayfarer_core::TourConstraints;
    ///
    /// assert_eq!(TourConstraints::both_fixed().free_positions(5), 1..4);
    /// assert_eq!(TourConstraints::free().free_positions(5), 0..5);
    /// assert!(TourConstraints::both_fixed().free_positions(2).is_empty());
    /// ```
    #[must_use]
    pub fn free_positions(self, n: usize) -> Range<usize> {
        let start = usize::from(self.fixed_start).min(n);
        let end = n.saturating_sub(usize::from(self.fixed_end)).max(start);
        start..end
    }

    /// Returns `true` when position `pos` of an `n`-stop tour is pinned.
    #[must_use]
    pub const fn is_fixed(self, pos: usize, n: usize) -> bool {
        (self.fixed_start && pos == 0) || (self.fixed_end && n > 0 && pos == n - 1)
    }
}

/// Errors returned by [`Tour::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TourError {
    /// The tour does not visit every waypoint exactly once by length.
    #[error("tour has {actual} stops, expected {expected}")]
    WrongLength {
        /// Expected number of stops.
        expected: usize,
        /// Actual number of stops.
        actual: usize,
    },
    /// A stop referenced a waypoint that does not exist.
    #[error("tour references waypoint {index} but only {count} exist")]
    UnknownWaypoint {
        /// Offending index.
        index: usize,
        /// Number of waypoints.
        count: usize,
    },
    /// A waypoint was visited more than once.
    #[error("waypoint {index} is visited more than once")]
    Duplicate {
        /// Repeated index.
        index: usize,
    },
    /// The fixed start waypoint is not first.
    #[error("tour must start at waypoint 0")]
    StartNotFixed,
    /// The fixed end waypoint is not last.
    #[error("tour must end at waypoint {expected}")]
    EndNotFixed {
        /// The waypoint that must close the tour.
        expected: usize,
    },
}

/// An open-path visiting order over waypoint indices.
///
/// The cost of a tour sums consecutive legs only; there is no edge from the
/// last stop back to the first.
///
/// # Examples
/// ```
/// use wayfarer_core::{DistanceMatrix, Tour};
///
/// let matrix = DistanceMatrix::from_rows(vec![
///     vec![0.0, 1.0, 5.0],
///     vec![1.0, 0.0, 2.0],
///     vec![5.0, 2.0, 0.0],
/// ])?;
/// let tour = Tour::new(vec![0, 1, 2]);
/// assert_eq!(tour.cost(&matrix), 3.0);
/// # Ok::<(), wayfarer_core::MatrixError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Tour(Vec<usize>);

impl Tour {
    /// Wrap an order without validating it.
    #[must_use]
    pub const fn new(order: Vec<usize>) -> Self {
        Self(order)
    }

    /// The identity order `0..n`.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        Self((0..n).collect())
    }

    /// Borrow the order.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Mutably borrow the order.
    pub fn as_mut_slice(&mut self) -> &mut [usize] {
        &mut self.0
    }

    /// Consume the tour, returning the order.
    #[must_use]
    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }

    /// Number of stops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the tour has no stops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of matrix distances over consecutive stops.
    ///
    /// # Panics
    ///
    /// Panics if the tour references an index outside the matrix.
    #[must_use]
    pub fn cost(&self, matrix: &DistanceMatrix) -> f64 {
        self.0
            .windows(2)
            .map(|leg| match leg {
                [from, to] => matrix.distance(*from, *to),
                _ => 0.0,
            })
            .sum()
    }

    /// Check the tour is a permutation of `0..n` honouring `constraints`.
    ///
    /// # Errors
    ///
    /// Returns the first [`TourError`] found.
    pub fn validate(&self, n: usize, constraints: TourConstraints) -> Result<(), TourError> {
        if self.0.len() != n {
            return Err(TourError::WrongLength {
                expected: n,
                actual: self.0.len(),
            });
        }
        let mut seen = vec![false; n];
        for &index in &self.0 {
            let slot = seen.get_mut(index).ok_or(TourError::UnknownWaypoint {
                index,
                count: n,
            })?;
            if *slot {
                return Err(TourError::Duplicate { index });
            }
            *slot = true;
        }
        if constraints.fixed_start && self.0.first() != Some(&0) {
            return Err(TourError::StartNotFixed);
        }
        if constraints.fixed_end && n > 0 && self.0.last() != Some(&(n - 1)) {
            return Err(TourError::EndNotFixed { expected: n - 1 });
        }
        Ok(())
    }
}

impl From<Vec<usize>> for Tour {
    fn from(order: Vec<usize>) -> Self {
        Self(order)
    }
}

impl AsRef<[usize]> for Tour {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn line_matrix() -> DistanceMatrix {
        DistanceMatrix::from_rows(vec![
            vec![0.0, 1.0, 2.0, 3.0],
            vec![1.0, 0.0, 1.0, 2.0],
            vec![2.0, 1.0, 0.0, 1.0],
            vec![3.0, 2.0, 1.0, 0.0],
        ])
        .expect("valid matrix")
    }

    #[rstest]
    fn cost_excludes_return_leg() {
        let tour = Tour::new(vec![0, 1, 2, 3]);
        assert_eq!(tour.cost(&line_matrix()), 3.0);
    }

    #[rstest]
    fn cost_of_single_stop_is_zero() {
        assert_eq!(Tour::new(vec![2]).cost(&line_matrix()), 0.0);
    }

    #[rstest]
    #[case(vec![0, 1, 2], TourError::WrongLength { expected: 4, actual: 3 })]
    #[case(vec![0, 1, 2, 7], TourError::UnknownWaypoint { index: 7, count: 4 })]
    #[case(vec![0, 1, 1, 3], TourError::Duplicate { index: 1 })]
    #[case(vec![1, 0, 2, 3], TourError::StartNotFixed)]
    #[case(vec![0, 1, 3, 2], TourError::EndNotFixed { expected: 3 })]
    fn validate_reports_violations(#[case] order: Vec<usize>, #[case] expected: TourError) {
        let err = Tour::new(order)
            .validate(4, TourConstraints::both_fixed())
            .expect_err("invalid tour");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn free_tours_ignore_endpoints() {
        Tour::new(vec![3, 1, 0, 2])
            .validate(4, TourConstraints::free())
            .expect("free tour is valid");
    }

    #[rstest]
    #[case(TourConstraints { fixed_start: true, fixed_end: false }, 1..4)]
    #[case(TourConstraints { fixed_start: false, fixed_end: true }, 0..3)]
    fn free_positions_follow_constraints(
        #[case] constraints: TourConstraints,
        #[case] expected: Range<usize>,
    ) {
        assert_eq!(constraints.free_positions(4), expected);
    }
}
