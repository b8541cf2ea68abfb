//! Geometric estimate used when the routing provider cannot answer.

use geo::{Distance, Haversine};
use wayfarer_core::{
    LatLng, ProviderError, ProviderTag, RoadRoute, RouteDetail, RoutePreference, RoutingProvider,
};

/// Multiplier turning great-circle distance into an approximate road distance.
pub const ROAD_FACTOR: f64 = 1.3;

/// Great-circle distance between two points in kilometres.
#[must_use]
pub fn haversine_km(from: LatLng, to: LatLng) -> f64 {
    Haversine.distance(from.to_point(), to.to_point()) / 1000.0
}

/// Estimate a road route as a straight line inflated by [`ROAD_FACTOR`].
///
/// The duration assumes `average_speed_kmh`; the geometry is the two
/// endpoints.
///
/// # Examples
/// ```
/// use wayfarer_core::LatLng;
/// use wayfarer_routing::{fallback_route, haversine_km};
///
/// let a = LatLng::new(0.0, 0.0);
/// let b = LatLng::new(0.0, 1.0);
/// let route = fallback_route(a, b, 40.0);
/// assert!((route.distance_km - haversine_km(a, b) * 1.3).abs() < 1e-9);
/// assert!(route.is_fallback());
/// ```
#[must_use]
pub fn fallback_route(from: LatLng, to: LatLng, average_speed_kmh: f64) -> RoadRoute {
    let distance_km = haversine_km(from, to) * ROAD_FACTOR;
    RoadRoute::new(
        distance_km,
        RouteDetail {
            duration_minutes: minutes_at(distance_km, average_speed_kmh),
            geometry: vec![from, to],
            provider: ProviderTag::Fallback,
        },
    )
}

/// Minutes needed to cover `distance_km` at `speed_kmh`.
///
/// Non-positive speeds yield zero rather than infinity.
#[must_use]
pub fn minutes_at(distance_km: f64, speed_kmh: f64) -> f64 {
    if speed_kmh > 0.0 && speed_kmh.is_finite() {
        distance_km / speed_kmh * 60.0
    } else {
        0.0
    }
}

/// Routing provider answering every query with [`fallback_route`].
///
/// Stands in for the HTTP provider when no routing service credentials are
/// configured, so lookups never leave the process.
///
/// # Examples
/// ```
/// use wayfarer_core::{LatLng, RoutePreference, RoutingProvider};
/// use wayfarer_routing::GreatCircleProvider;
///
/// let provider = GreatCircleProvider::new(40.0);
/// let (a, b) = (LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0));
/// let route = provider.route(a, b, RoutePreference::Recommended)?;
/// assert!(route.is_fallback());
/// # Ok::<(), wayfarer_core::ProviderError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreatCircleProvider {
    average_speed_kmh: f64,
}

impl GreatCircleProvider {
    /// Estimate durations at `average_speed_kmh`.
    #[must_use]
    pub const fn new(average_speed_kmh: f64) -> Self {
        Self { average_speed_kmh }
    }
}

impl RoutingProvider for GreatCircleProvider {
    fn route(
        &self,
        from: LatLng,
        to: LatLng,
        _preference: RoutePreference,
    ) -> Result<RoadRoute, ProviderError> {
        Ok(fallback_route(from, to, self.average_speed_kmh))
    }

    fn alternatives(
        &self,
        from: LatLng,
        to: LatLng,
        _max_routes: usize,
    ) -> Result<Vec<RoadRoute>, ProviderError> {
        Ok(vec![fallback_route(from, to, self.average_speed_kmh)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn one_degree_of_longitude_at_equator() {
        let km = haversine_km(LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0));
        assert!((km - 111.19).abs() < 0.1, "got {km}");
    }

    #[rstest]
    fn fallback_duration_follows_speed() {
        let route = fallback_route(LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0), 40.0);
        let expected = route.distance_km / 40.0 * 60.0;
        assert!((route.detail.duration_minutes - expected).abs() < 1e-9);
        assert_eq!(route.detail.geometry.len(), 2);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-5.0)]
    #[case(f64::NAN)]
    fn invalid_speed_gives_zero_minutes(#[case] speed: f64) {
        assert_eq!(minutes_at(10.0, speed), 0.0);
    }

    #[rstest]
    fn great_circle_provider_offers_one_estimate() {
        let provider = GreatCircleProvider::new(40.0);
        let (a, b) = (LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0));
        let routes = provider.alternatives(a, b, 3).expect("estimate");
        assert_eq!(routes, vec![fallback_route(a, b, 40.0)]);
        assert!(routes.iter().all(RoadRoute::is_fallback));
    }
}
