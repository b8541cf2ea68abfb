//! Deterministic and seeded tour constructions.
//!
//! Every construction respects the problem's endpoint constraints: pinned
//! waypoints never leave their slots.

use rand::Rng;
use rand::seq::SliceRandom;
use wayfarer_core::Tour;

use crate::Problem;

/// Greedy tour that always moves to the closest unvisited waypoint.
///
/// The walk starts at waypoint `0`. With a fixed end, waypoint `n - 1` is
/// held back for the last slot. Ties go to the lowest index.
///
/// # Examples
/// ```
/// use wayfarer_core::{DistanceMatrix, TourConstraints};
/// use wayfarer_optimizer::{Problem, nearest_neighbour};
///
/// let matrix = DistanceMatrix::from_rows(vec![
///     vec![0.0, 9.0, 1.0, 5.0],
///     vec![9.0, 0.0, 1.0, 1.0],
///     vec![1.0, 1.0, 0.0, 9.0],
///     vec![5.0, 1.0, 9.0, 0.0],
/// ])?;
/// let tour = nearest_neighbour(&Problem::new(&matrix, TourConstraints::both_fixed()));
/// assert_eq!(tour.as_slice(), &[0, 2, 1, 3]);
/// # Ok::<(), wayfarer_core::MatrixError>(())
/// ```
#[must_use]
pub fn nearest_neighbour(problem: &Problem<'_>) -> Tour {
    let n = problem.len();
    if n <= 2 {
        return Tour::identity(n);
    }
    let reserved = problem.constraints().fixed_end.then_some(n - 1);
    let mut remaining: Vec<usize> = (1..n).filter(|&i| Some(i) != reserved).collect();
    let mut order = Vec::with_capacity(n);
    order.push(0);
    let mut current = 0;
    while let Some(pos) = closest(problem, current, &remaining) {
        current = remaining.remove(pos);
        order.push(current);
    }
    order.extend(reserved);
    Tour::new(order)
}

fn closest(problem: &Problem<'_>, from: usize, candidates: &[usize]) -> Option<usize> {
    let matrix = problem.matrix();
    candidates
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            matrix
                .distance(from, **a)
                .total_cmp(&matrix.distance(from, **b))
        })
        .map(|(pos, _)| pos)
}

/// Tour built by repeatedly inserting the waypoint farthest from the tour.
///
/// The initial pair is the two most distant waypoints, replaced by the
/// pinned anchors when endpoints are fixed. Each step picks the unvisited
/// waypoint whose nearest tour member is farthest away and inserts it where
/// `d(prev, new) + d(new, next) - d(prev, next)` is smallest. Insertion before
/// the first or after the last stop is only considered at a free end.
#[must_use]
pub fn farthest_insertion(problem: &Problem<'_>) -> Tour {
    let n = problem.len();
    if n <= 2 {
        return Tour::identity(n);
    }
    let mut tour = seed_pair(problem);
    let mut unvisited: Vec<usize> = (0..n).filter(|i| !tour.contains(i)).collect();
    while let Some(pos) = farthest(problem, &tour, &unvisited) {
        let city = unvisited.remove(pos);
        let slot = cheapest_slot(problem, &tour, city);
        tour.insert(slot, city);
    }
    Tour::new(tour)
}

fn seed_pair(problem: &Problem<'_>) -> Vec<usize> {
    let n = problem.len();
    let last = n - 1;
    let constraints = problem.constraints();
    match (constraints.fixed_start, constraints.fixed_end) {
        (true, true) => vec![0, last],
        (true, false) => vec![0, farthest_from(problem, 0)],
        (false, true) => vec![farthest_from(problem, last), last],
        (false, false) => problem
            .matrix()
            .farthest_pair()
            .map_or_else(|| vec![0, last], |(a, b)| vec![a, b]),
    }
}

fn farthest_from(problem: &Problem<'_>, anchor: usize) -> usize {
    let matrix = problem.matrix();
    let spread = |i: usize| matrix.distance(anchor, i).max(matrix.distance(i, anchor));
    let mut best: Option<(usize, f64)> = None;
    for i in (0..problem.len()).filter(|&i| i != anchor) {
        let d = spread(i);
        if best.is_none_or(|(_, top)| d > top) {
            best = Some((i, d));
        }
    }
    best.map_or(anchor, |(i, _)| i)
}

fn farthest(problem: &Problem<'_>, tour: &[usize], unvisited: &[usize]) -> Option<usize> {
    let matrix = problem.matrix();
    let mut best: Option<(usize, f64)> = None;
    for (pos, &city) in unvisited.iter().enumerate() {
        let nearest = tour
            .iter()
            .map(|&member| matrix.distance(city, member))
            .fold(f64::INFINITY, f64::min);
        if best.is_none_or(|(_, top)| nearest > top) {
            best = Some((pos, nearest));
        }
    }
    best.map(|(pos, _)| pos)
}

#[expect(
    clippy::float_arithmetic,
    reason = "insertion cost compares kilometre detours"
)]
fn cheapest_slot(problem: &Problem<'_>, tour: &[usize], city: usize) -> usize {
    let matrix = problem.matrix();
    let constraints = problem.constraints();
    let mut best: Option<(usize, f64)> = None;
    let mut consider = |slot: usize, cost: f64| {
        if best.is_none_or(|(_, top)| cost < top) {
            best = Some((slot, cost));
        }
    };
    if !constraints.fixed_start
        && let Some(&first) = tour.first()
    {
        consider(0, matrix.distance(city, first));
    }
    for (offset, pair) in tour.windows(2).enumerate() {
        if let [prev, next] = *pair {
            let detour = matrix.distance(prev, city) + matrix.distance(city, next)
                - matrix.distance(prev, next);
            consider(offset + 1, detour);
        }
    }
    if !constraints.fixed_end
        && let Some(&last) = tour.last()
    {
        consider(tour.len(), matrix.distance(last, city));
    }
    best.map_or(tour.len().saturating_sub(1).max(1), |(slot, _)| slot)
}

/// Identity tour with its free positions shuffled by `rng`.
///
/// # Examples
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use wayfarer_core::{DistanceMatrix, TourConstraints};
/// use wayfarer_optimizer::{Problem, random_tour};
///
/// let matrix = DistanceMatrix::zeros(6);
/// let problem = Problem::new(&matrix, TourConstraints::both_fixed());
/// let tour = random_tour(&problem, &mut ChaCha8Rng::seed_from_u64(42));
/// assert_eq!(tour.as_slice().first(), Some(&0));
/// assert_eq!(tour.as_slice().last(), Some(&5));
/// ```
#[must_use]
pub fn random_tour<R: Rng + ?Sized>(problem: &Problem<'_>, rng: &mut R) -> Tour {
    let mut tour = Tour::identity(problem.len());
    if let Some(free) = tour.as_mut_slice().get_mut(problem.free_positions()) {
        free.shuffle(rng);
    }
    tour
}
