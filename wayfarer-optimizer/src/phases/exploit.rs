//! Whale-optimization population search over tours.
//!
//! A pod of agents starts on the seed tour. Each round the control
//! coefficient `a` decays linearly from 2 towards 0 and every agent draws
//! `A ∈ [-a, a]`, `C ∈ [0, 2]`, `p ∈ [0, 1)` and `l ∈ [-1, 1]`:
//!
//! - `p < 0.5`, `|A| < 1`: encircle the best tour with `⌈|A|·n⌉` swaps.
//! - `p < 0.5`, `|A| ≥ 1`: search towards a random other agent instead.
//! - `p ≥ 0.5`: spiral with `max(2, ⌊|l|·n⌋)` random swaps.
//!
//! An encircling swap puts the target's waypoint into a randomly chosen slot;
//! with probability `C / 2` it is a random swap instead. Only free positions
//! are ever swapped.

use log::debug;
use rand::Rng;
use rand::seq::index;
use wayfarer_core::{Phase, PhaseResult, Tour};

use super::{EPSILON_KM, PhaseError, finish};
use crate::Problem;

const ALGORITHM: &str = "whale_optimization";

const MIN_AGENTS: usize = 5;
const MAX_AGENTS: usize = 10;
const A_MAX: f64 = 2.0;

/// Run the exploitation phase for `rounds` rounds starting from `seed`.
///
/// The pod holds `max(5, min(n, 10))` agents. The global best is updated
/// after every agent move.
///
/// # Errors
///
/// Returns [`PhaseError::EmptyProblem`] for a problem without waypoints and
/// [`PhaseError::InvalidTour`] when `seed` breaks the constraints.
pub fn exploit<R: Rng + ?Sized>(
    problem: &Problem<'_>,
    seed: &Tour,
    rounds: usize,
    rng: &mut R,
) -> Result<PhaseResult, PhaseError> {
    if problem.is_empty() {
        return Err(PhaseError::EmptyProblem);
    }
    problem
        .validate(seed)
        .map_err(|source| PhaseError::InvalidTour {
            phase: Phase::Exploit,
            source,
        })?;
    let n = problem.len();
    let free: Vec<usize> = problem.free_positions().collect();
    let mut agents = vec![seed.clone(); n.clamp(MIN_AGENTS, MAX_AGENTS)];
    let mut best = seed.clone();
    let mut best_cost = problem.cost(seed);

    for round in 0..rounds {
        let a = control(round, rounds);
        for i in 0..agents.len() {
            let mv = Move::draw(a, rng);
            let target = match mv {
                Move::Encircle { .. } => Some(best.clone()),
                Move::Search { .. } => other_agent(&agents, i, rng),
                Move::Spiral { .. } => None,
            };
            let Some(agent) = agents.get_mut(i) else {
                continue;
            };
            mv.apply(agent, target.as_ref(), &free, rng);
            let cost = problem.cost(agent);
            if improves(cost, best_cost) {
                best = agent.clone();
                best_cost = cost;
            }
        }
        debug!("exploit round {round}: best {best_cost:.3} km");
    }
    finish(problem, Phase::Exploit, ALGORITHM, best, rounds)
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "control coefficient decays linearly"
)]
fn control(round: usize, rounds: usize) -> f64 {
    A_MAX - round as f64 * (A_MAX / rounds.max(1) as f64)
}

#[expect(clippy::float_arithmetic, reason = "costs compare with a tolerance")]
fn improves(cost: f64, incumbent: f64) -> bool {
    cost < incumbent - EPSILON_KM
}

fn other_agent<R: Rng + ?Sized>(agents: &[Tour], current: usize, rng: &mut R) -> Option<Tour> {
    if agents.len() < 2 {
        return agents.get(current).cloned();
    }
    let pick = rng.gen_range(0..agents.len() - 1);
    let pick = if pick >= current { pick + 1 } else { pick };
    agents.get(pick).cloned()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Move {
    Encircle { a_coeff: f64, c_coeff: f64 },
    Search { a_coeff: f64, c_coeff: f64 },
    Spiral { l: f64 },
}

impl Move {
    #[expect(clippy::float_arithmetic, reason = "whale coefficients")]
    fn draw<R: Rng + ?Sized>(a: f64, rng: &mut R) -> Self {
        let r: f64 = rng.gen_range(0.0..1.0);
        let a_coeff = 2.0 * a * r - a;
        let c_coeff = 2.0 * r;
        let l: f64 = rng.gen_range(-1.0..=1.0);
        let p: f64 = rng.gen_range(0.0..1.0);
        if p >= 0.5 {
            Self::Spiral { l }
        } else if a_coeff.abs() < 1.0 {
            Self::Encircle { a_coeff, c_coeff }
        } else {
            Self::Search { a_coeff, c_coeff }
        }
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "swap counts scale with the coefficients"
    )]
    fn swaps(self, n: usize) -> usize {
        let scale = n as f64;
        match self {
            Self::Encircle { a_coeff, .. } | Self::Search { a_coeff, .. } => {
                ((a_coeff.abs() * scale).ceil() as usize).max(1)
            }
            Self::Spiral { l } => ((l.abs() * scale).floor() as usize).max(2),
        }
    }

    fn apply<R: Rng + ?Sized>(
        self,
        agent: &mut Tour,
        target: Option<&Tour>,
        free: &[usize],
        rng: &mut R,
    ) {
        if free.len() < 2 {
            return;
        }
        let explore_chance = match self {
            Self::Encircle { c_coeff, .. } | Self::Search { c_coeff, .. } => half(c_coeff),
            Self::Spiral { .. } => 1.0,
        };
        for _ in 0..self.swaps(agent.len()) {
            match target {
                Some(target) if !rng.gen_bool(explore_chance) => {
                    pull_towards(agent, target, free, rng);
                }
                _ => random_swap(agent, free, rng),
            }
        }
    }
}

#[expect(clippy::float_arithmetic, reason = "probability from C in [0, 2]")]
fn half(c_coeff: f64) -> f64 {
    (c_coeff / 2.0).clamp(0.0, 1.0)
}

fn random_swap<R: Rng + ?Sized>(agent: &mut Tour, free: &[usize], rng: &mut R) {
    let picked = index::sample(rng, free.len(), 2);
    if let (Some(&a), Some(&b)) = (free.get(picked.index(0)), free.get(picked.index(1))) {
        agent.as_mut_slice().swap(a, b);
    }
}

/// Move the waypoint `target` holds at a random free slot into that slot.
fn pull_towards<R: Rng + ?Sized>(agent: &mut Tour, target: &Tour, free: &[usize], rng: &mut R) {
    let Some(&slot) = free.get(rng.gen_range(0..free.len())) else {
        return;
    };
    let Some(&wanted) = target.as_slice().get(slot) else {
        return;
    };
    let order = agent.as_mut_slice();
    if let Some(from) = order.iter().position(|&city| city == wanted)
        && from != slot
    {
        order.swap(from, slot);
    }
}
