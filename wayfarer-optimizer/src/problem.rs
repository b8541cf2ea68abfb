//! The search space shared by every phase.

use std::ops::Range;

use wayfarer_core::{DistanceMatrix, Tour, TourConstraints, TourError};

/// A distance matrix paired with the endpoint constraints of a request.
#[derive(Debug, Clone, Copy)]
pub struct Problem<'a> {
    matrix: &'a DistanceMatrix,
    constraints: TourConstraints,
}

impl<'a> Problem<'a> {
    /// Pair `matrix` with `constraints`.
    #[must_use]
    pub const fn new(matrix: &'a DistanceMatrix, constraints: TourConstraints) -> Self {
        Self {
            matrix,
            constraints,
        }
    }

    /// Number of waypoints.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.matrix.len()
    }

    /// Returns `true` when there are no waypoints.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// Underlying distances.
    #[must_use]
    pub const fn matrix(&self) -> &'a DistanceMatrix {
        self.matrix
    }

    /// Endpoint constraints.
    #[must_use]
    pub const fn constraints(&self) -> TourConstraints {
        self.constraints
    }

    /// Tour positions a search may rearrange.
    #[must_use]
    pub fn free_positions(&self) -> Range<usize> {
        self.constraints.free_positions(self.len())
    }

    /// Kilometre cost of `tour`.
    #[must_use]
    pub fn cost(&self, tour: &Tour) -> f64 {
        tour.cost(self.matrix)
    }

    /// Check that `tour` is a permutation respecting the constraints.
    ///
    /// # Errors
    ///
    /// See [`TourError`].
    pub fn validate(&self, tour: &Tour) -> Result<(), TourError> {
        tour.validate(self.len(), self.constraints)
    }
}
