//! Annealed sampling over whole tours.
//!
//! Each round fixes an annealing angle `2π · round / rounds` and builds one
//! tour by filling free positions left to right. A waypoint's chance of
//! taking the next slot is its rotating bias `(1 + cos(angle + 2π·i/n)) / 2n`
//! scaled by how close it is to the previous stop. Sweeping the angle moves
//! the bias across the waypoints, so successive rounds favour different
//! orders while still preferring short legs.

use std::f64::consts::TAU;

use log::debug;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use wayfarer_core::{DistanceMatrix, Phase, PhaseResult, Tour};

use super::{EPSILON_KM, PhaseError, finish};
use crate::Problem;

const ALGORITHM: &str = "annealed_sampling";

/// Keeps every waypoint drawable when its bias is zero.
const BIAS_FLOOR: f64 = 1e-6;

/// Run the exploration phase for `rounds` rounds.
///
/// The identity tour is the starting incumbent; a sampled tour replaces it
/// only when strictly cheaper.
///
/// # Errors
///
/// Returns [`PhaseError::EmptyProblem`] for a problem without waypoints and
/// [`PhaseError::Sampling`] when the weights cannot form a distribution.
///
/// # Examples
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use wayfarer_core::{DistanceMatrix, TourConstraints};
/// use wayfarer_optimizer::{Problem, explore};
///
/// let matrix = DistanceMatrix::from_rows(vec![
///     vec![0.0, 2.0, 1.0],
///     vec![2.0, 0.0, 1.0],
///     vec![1.0, 1.0, 0.0],
/// ])?;
/// let problem = Problem::new(&matrix, TourConstraints::free());
/// let result = explore(&problem, 20, &mut ChaCha8Rng::seed_from_u64(42))?;
/// assert!(result.cost <= 3.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn explore<R: Rng + ?Sized>(
    problem: &Problem<'_>,
    rounds: usize,
    rng: &mut R,
) -> Result<PhaseResult, PhaseError> {
    if problem.is_empty() {
        return Err(PhaseError::EmptyProblem);
    }
    let scale = mean_leg(problem.matrix());
    let mut best = Tour::identity(problem.len());
    let mut best_cost = problem.cost(&best);
    for round in 0..rounds {
        let candidate = sample(problem, angle(round, rounds), scale, rng)?;
        let cost = problem.cost(&candidate);
        if improves(cost, best_cost) {
            debug!("explore round {round}: cost {cost:.3} km");
            best = candidate;
            best_cost = cost;
        }
    }
    finish(problem, Phase::Explore, ALGORITHM, best, rounds)
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "annealing angle is a fraction of a full turn"
)]
fn angle(round: usize, rounds: usize) -> f64 {
    TAU * round as f64 / rounds.max(1) as f64
}

#[expect(clippy::float_arithmetic, reason = "costs compare with a tolerance")]
fn improves(cost: f64, incumbent: f64) -> bool {
    cost < incumbent - EPSILON_KM
}

fn sample<R: Rng + ?Sized>(
    problem: &Problem<'_>,
    angle: f64,
    scale: f64,
    rng: &mut R,
) -> Result<Tour, PhaseError> {
    let n = problem.len();
    let free = problem.free_positions();
    let mut order = Tour::identity(n).into_inner();
    let mut pool = order
        .get(free.clone())
        .map(<[usize]>::to_vec)
        .unwrap_or_default();
    for pos in free {
        let previous = pos.checked_sub(1).and_then(|p| order.get(p).copied());
        let weights: Vec<f64> = pool
            .iter()
            .map(|&city| weight(problem.matrix(), angle, scale, previous, city))
            .collect();
        let distribution = WeightedIndex::new(&weights).map_err(|err| PhaseError::Sampling {
            message: err.to_string(),
        })?;
        let city = pool.remove(distribution.sample(rng));
        if let Some(slot) = order.get_mut(pos) {
            *slot = city;
        }
    }
    Ok(Tour::new(order))
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "sampling weights are trigonometric"
)]
fn weight(
    matrix: &DistanceMatrix,
    angle: f64,
    scale: f64,
    previous: Option<usize>,
    city: usize,
) -> f64 {
    let n = matrix.len() as f64;
    let phase = TAU * city as f64 / n;
    let bias = (1.0 + (angle + phase).cos()) / (2.0 * n) + BIAS_FLOOR;
    let attraction = previous.map_or(1.0, |from| 1.0 / (1.0 + matrix.distance(from, city) / scale));
    bias * attraction
}

/// Mean off-diagonal distance, or `1.0` when every leg is zero.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "averaging kilometre distances"
)]
fn mean_leg(matrix: &DistanceMatrix) -> f64 {
    let (sum, count) = matrix
        .rows()
        .enumerate()
        .flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(move |(j, _)| *j != i)
                .map(|(_, km)| *km)
        })
        .fold((0.0, 0_usize), |(sum, count), km| (sum + km, count + 1));
    if count == 0 || sum <= 0.0 {
        1.0
    } else {
        sum / count as f64
    }
}
