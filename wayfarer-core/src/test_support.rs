//! Test-only routing providers used by unit and behaviour tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crate::{
    LatLng, ProviderError, ProviderTag, RoadRoute, RouteDetail, RoutePreference, RoutingProvider,
};

/// Name reported by [`StubRoutingProvider`] routes.
pub const STUB_PROVIDER: &str = "stub";

/// Kilometres per degree used by the straight-line mode.
const KM_PER_DEGREE: f64 = 111.0;

/// Deterministic in-memory [`RoutingProvider`].
///
/// Distances come from an explicit matrix keyed by coordinates when one is
/// supplied; pairs not covered by the matrix use a planar approximation of
/// 111 km per degree. Durations assume 40 km/h. Every call is counted so tests
/// can assert on caching and coalescing.
#[derive(Debug, Default)]
pub struct StubRoutingProvider {
    points: Vec<LatLng>,
    distances: Vec<Vec<f64>>,
    unreachable: Vec<(usize, usize)>,
    alternative_factors: Vec<f64>,
    alternatives_too_long: bool,
    preference_factors: Vec<(RoutePreference, f64)>,
    latency: Option<Duration>,
    route_calls: AtomicUsize,
    alternative_calls: AtomicUsize,
}

impl StubRoutingProvider {
    /// Provider using the planar approximation for every pair.
    #[must_use]
    pub fn straight_line() -> Self {
        Self::default()
    }

    /// Provider answering `distances[i][j]` for the route from `points[i]` to
    /// `points[j]`.
    #[must_use]
    pub fn with_matrix(points: Vec<LatLng>, distances: Vec<Vec<f64>>) -> Self {
        Self {
            points,
            distances,
            ..Self::default()
        }
    }

    /// Report [`ProviderError::RouteNotFound`] from `points[from]` to
    /// `points[to]`.
    #[must_use]
    pub fn unreachable(mut self, from: usize, to: usize) -> Self {
        self.unreachable.push((from, to));
        self
    }

    /// Multipliers applied to the base distance to produce alternatives.
    #[must_use]
    pub fn with_alternative_factors(mut self, factors: Vec<f64>) -> Self {
        self.alternative_factors = factors;
        self
    }

    /// Reject every multi-route request with [`ProviderError::RouteTooLong`].
    #[must_use]
    pub fn with_alternatives_too_long(mut self) -> Self {
        self.alternatives_too_long = true;
        self
    }

    /// Multiply distances for routes requested under `preference`.
    #[must_use]
    pub fn with_preference_factor(mut self, preference: RoutePreference, factor: f64) -> Self {
        self.preference_factors.push((preference, factor));
        self
    }

    /// Sleep for `latency` before answering each call.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of single-route calls received.
    #[must_use]
    pub fn route_calls(&self) -> usize {
        self.route_calls.load(Ordering::SeqCst)
    }

    /// Number of multi-route calls received.
    #[must_use]
    pub fn alternative_calls(&self) -> usize {
        self.alternative_calls.load(Ordering::SeqCst)
    }

    /// Total calls of either kind.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.route_calls() + self.alternative_calls()
    }

    fn position(&self, point: LatLng) -> Option<usize> {
        self.points.iter().position(|candidate| *candidate == point)
    }

    fn base_distance(&self, from: LatLng, to: LatLng) -> Result<f64, ProviderError> {
        if let (Some(i), Some(j)) = (self.position(from), self.position(to)) {
            if self.unreachable.contains(&(i, j)) {
                return Err(ProviderError::RouteNotFound);
            }
            if let Some(km) = self.distances.get(i).and_then(|row| row.get(j)) {
                return Ok(*km);
            }
        }
        let dlat = to.lat - from.lat;
        let dlng = to.lng - from.lng;
        Ok(dlat.hypot(dlng) * KM_PER_DEGREE)
    }

    fn build(from: LatLng, to: LatLng, km: f64) -> RoadRoute {
        let midpoint = LatLng::new((from.lat + to.lat) / 2.0, (from.lng + to.lng) / 2.0);
        RoadRoute::new(
            km,
            RouteDetail {
                duration_minutes: km * 1.5,
                geometry: vec![from, midpoint, to],
                provider: ProviderTag::Provider(STUB_PROVIDER.to_owned()),
            },
        )
    }

    fn pause(&self) {
        if let Some(latency) = self.latency {
            thread::sleep(latency);
        }
    }
}

impl RoutingProvider for StubRoutingProvider {
    fn route(
        &self,
        from: LatLng,
        to: LatLng,
        preference: RoutePreference,
    ) -> Result<RoadRoute, ProviderError> {
        self.route_calls.fetch_add(1, Ordering::SeqCst);
        self.pause();
        let factor = self
            .preference_factors
            .iter()
            .find(|(candidate, _)| *candidate == preference)
            .map_or(1.0, |(_, factor)| *factor);
        let km = self.base_distance(from, to)? * factor;
        Ok(Self::build(from, to, km))
    }

    fn alternatives(
        &self,
        from: LatLng,
        to: LatLng,
        max_routes: usize,
    ) -> Result<Vec<RoadRoute>, ProviderError> {
        self.alternative_calls.fetch_add(1, Ordering::SeqCst);
        self.pause();
        if self.alternatives_too_long {
            return Err(ProviderError::RouteTooLong);
        }
        let base = self.base_distance(from, to)?;
        let factors: &[f64] = if self.alternative_factors.is_empty() {
            &[1.0]
        } else {
            &self.alternative_factors
        };
        Ok(factors
            .iter()
            .take(max_routes)
            .map(|factor| Self::build(from, to, base * factor))
            .collect())
    }
}

/// [`RoutingProvider`] that fails every call with the same error.
#[derive(Debug)]
pub struct FailingRoutingProvider {
    error: ProviderError,
    calls: AtomicUsize,
}

impl FailingRoutingProvider {
    /// Fail with `error`.
    #[must_use]
    pub const fn new(error: ProviderError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail with a network error, as an unreachable service would.
    #[must_use]
    pub fn offline() -> Self {
        Self::new(ProviderError::Network {
            message: "connection refused".to_owned(),
        })
    }

    /// Number of calls received.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RoutingProvider for FailingRoutingProvider {
    fn route(
        &self,
        _from: LatLng,
        _to: LatLng,
        _preference: RoutePreference,
    ) -> Result<RoadRoute, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }

    fn alternatives(
        &self,
        _from: LatLng,
        _to: LatLng,
        _max_routes: usize,
    ) -> Result<Vec<RoadRoute>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn points() -> Vec<LatLng> {
        vec![LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0)]
    }

    #[rstest]
    fn matrix_lookup_is_directional() {
        let provider =
            StubRoutingProvider::with_matrix(points(), vec![vec![0.0, 4.0], vec![6.0, 0.0]]);
        let [a, b] = [points()[0], points()[1]];
        let forward = provider
            .route(a, b, RoutePreference::Recommended)
            .expect("route");
        let backward = provider
            .route(b, a, RoutePreference::Recommended)
            .expect("route");
        assert_eq!(forward.distance_km, 4.0);
        assert_eq!(backward.distance_km, 6.0);
        assert_eq!(provider.route_calls(), 2);
    }

    #[rstest]
    fn unreachable_pairs_report_not_found() {
        let provider =
            StubRoutingProvider::with_matrix(points(), vec![vec![0.0, 4.0], vec![6.0, 0.0]])
                .unreachable(0, 1);
        let err = provider
            .route(points()[0], points()[1], RoutePreference::Fastest)
            .expect_err("unreachable");
        assert_eq!(err, ProviderError::RouteNotFound);
    }

    #[rstest]
    fn alternatives_scale_base_distance() {
        let provider = StubRoutingProvider::straight_line().with_alternative_factors(vec![1.0, 1.2, 2.0]);
        let routes = provider
            .alternatives(points()[0], points()[1], 2)
            .expect("alternatives");
        assert_eq!(routes.len(), 2);
        assert!((routes[1].distance_km - 111.0 * 1.2).abs() < 1e-9);
    }

    #[rstest]
    fn failing_provider_counts_calls() {
        let provider = FailingRoutingProvider::offline();
        provider
            .route(points()[0], points()[1], RoutePreference::Recommended)
            .expect_err("offline");
        assert_eq!(provider.calls(), 1);
    }
}
