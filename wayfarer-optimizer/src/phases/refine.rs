//! First-improvement 2-opt.

use log::debug;
use wayfarer_core::{Phase, PhaseResult, Tour};

use super::{EPSILON_KM, PhaseError, finish};
use crate::Problem;

const ALGORITHM: &str = "two_opt";

/// Improve `tour` by reversing sub-sequences.
///
/// Each pass scans pairs `i < j` with `i ≥ 1` and reverses positions
/// `i..j`. The first reversal that lowers the cost is applied and the scan
/// restarts. The search stops when a full scan finds nothing or after
/// `max_passes` improvements. With a fixed end the last position is never
/// part of a reversal. Costs are recomputed over the whole tour, so
/// asymmetric matrices are handled exactly.
///
/// The returned cost never exceeds the cost of `tour`.
///
/// # Errors
///
/// Returns [`PhaseError::InvalidTour`] when `tour` breaks the constraints.
///
/// # Examples
/// ```
/// use wayfarer_core::{DistanceMatrix, Tour, TourConstraints};
/// use wayfarer_optimizer::{Problem, refine};
///
/// let positions = [0.0_f64, 2.0, 1.0, 3.0];
/// let matrix = DistanceMatrix::from_rows(
///     positions.iter().map(|a| positions.iter().map(|b| (a - b).abs()).collect()).collect(),
/// )?;
/// let problem = Problem::new(&matrix, TourConstraints::both_fixed());
/// let result = refine(&problem, &Tour::identity(4), 50)?;
/// assert_eq!(result.tour.as_slice(), &[0, 2, 1, 3]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn refine(
    problem: &Problem<'_>,
    tour: &Tour,
    max_passes: usize,
) -> Result<PhaseResult, PhaseError> {
    problem
        .validate(tour)
        .map_err(|source| PhaseError::InvalidTour {
            phase: Phase::Refine,
            source,
        })?;
    let n = problem.len();
    let lower = problem.free_positions().start.max(1);
    let upper = if problem.constraints().fixed_end {
        n.saturating_sub(1)
    } else {
        n
    };
    let mut current = tour.clone();
    let mut cost = problem.cost(&current);
    let mut passes = 0;
    while passes < max_passes {
        passes += 1;
        match first_improvement(problem, &current, cost, lower, upper) {
            Some((better, better_cost)) => {
                debug!("refine pass {passes}: cost {better_cost:.3} km");
                current = better;
                cost = better_cost;
            }
            None => break,
        }
    }
    finish(problem, Phase::Refine, ALGORITHM, current, passes)
}

fn first_improvement(
    problem: &Problem<'_>,
    tour: &Tour,
    cost: f64,
    lower: usize,
    upper: usize,
) -> Option<(Tour, f64)> {
    for i in lower..upper {
        for j in (i + 2)..=upper {
            let mut candidate = tour.clone();
            if let Some(span) = candidate.as_mut_slice().get_mut(i..j) {
                span.reverse();
            }
            let candidate_cost = problem.cost(&candidate);
            if improves(candidate_cost, cost) {
                return Some((candidate, candidate_cost));
            }
        }
    }
    None
}

#[expect(clippy::float_arithmetic, reason = "costs compare with a tolerance")]
fn improves(cost: f64, incumbent: f64) -> bool {
    cost < incumbent - EPSILON_KM
}
