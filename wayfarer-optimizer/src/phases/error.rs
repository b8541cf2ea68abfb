use thiserror::Error;
use wayfarer_core::{Phase, TourError};

/// Internal failure of a search phase.
///
/// The pipeline never surfaces these; it logs them and substitutes a
/// nearest-neighbour tour.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhaseError {
    /// The problem has no waypoints to arrange.
    #[error("problem has no waypoints")]
    EmptyProblem,
    /// The sampler could not build a distribution from its weights.
    #[error("sampling weights are unusable: {message}")]
    Sampling {
        /// Description from the sampler.
        message: String,
    },
    /// A phase produced a tour that breaks the constraints.
    #[error("{phase} produced an invalid tour: {source}")]
    InvalidTour {
        /// Phase at fault.
        phase: Phase,
        /// Validation failure.
        #[source]
        source: TourError,
    },
}
