//! The three search phases of the pipeline.
//!
//! Each phase returns a [`PhaseResult`](wayfarer_core::PhaseResult) whose
//! tour has already been checked against the problem's constraints.

mod error;
mod exploit;
mod explore;
mod refine;

pub use error::PhaseError;
pub use exploit::exploit;
pub use explore::explore;
pub use refine::refine;

use wayfarer_core::{Phase, PhaseResult, Tour};

use crate::Problem;

/// Improvement threshold below which two costs are considered equal.
pub(crate) const EPSILON_KM: f64 = 1e-9;

/// Validate `tour` and package it as the output of `phase`.
pub(crate) fn finish(
    problem: &Problem<'_>,
    phase: Phase,
    algorithm: &'static str,
    tour: Tour,
    rounds: usize,
) -> Result<PhaseResult, PhaseError> {
    problem
        .validate(&tour)
        .map_err(|source| PhaseError::InvalidTour { phase, source })?;
    Ok(PhaseResult {
        phase,
        algorithm,
        cost: problem.cost(&tour),
        tour,
        rounds,
        fallback: false,
    })
}
