//! Routing provider trait and route preferences.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{LatLng, RoadRoute};

use super::error::ProviderError;

/// Weighting a provider should apply when choosing a single route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RoutePreference {
    /// The provider's default weighting.
    #[default]
    Recommended,
    /// Minimise travel time.
    Fastest,
    /// Minimise distance.
    Shortest,
    /// Stay off motorways and major highways.
    AvoidHighways,
}

impl RoutePreference {
    /// Preferences used to synthesise alternatives when a provider refuses a
    /// multi-route request, in query order.
    pub const SYNTHESIS_ORDER: [Self; 3] = [Self::Fastest, Self::Shortest, Self::AvoidHighways];
}

/// Fetch road routes between pairs of points.
///
/// Implementations are blocking and shared between threads, so they must be
/// `Send + Sync`. Distances are kilometres, durations minutes, and geometry
/// runs from `from` to `to`.
///
/// # Examples
///
/// ```rust
/// use wayfarer_core::{
///     LatLng, ProviderError, ProviderTag, RoadRoute, RouteDetail, RoutePreference,
///     RoutingProvider,
/// };
///
/// struct StraightLine;
///
/// impl RoutingProvider for StraightLine {
///     fn route(
///         &self,
///         from: LatLng,
///         to: LatLng,
///         _preference: RoutePreference,
///     ) -> Result<RoadRoute, ProviderError> {
///         Ok(RoadRoute::new(
///             1.0,
///             RouteDetail {
///                 duration_minutes: 1.5,
///                 geometry: vec![from, to],
///                 provider: ProviderTag::Provider("straight".into()),
///             },
///         ))
///     }
///
///     fn alternatives(
///         &self,
///         from: LatLng,
///         to: LatLng,
///         _max_routes: usize,
///     ) -> Result<Vec<RoadRoute>, ProviderError> {
///         Ok(vec![self.route(from, to, RoutePreference::Recommended)?])
///     }
/// }
///
/// let route = StraightLine.route(
///     LatLng::new(0.0, 0.0),
///     LatLng::new(0.0, 1.0),
///     RoutePreference::Recommended,
/// )?;
/// assert_eq!(route.detail.geometry.len(), 2);
/// # Ok::<(), ProviderError>(())
/// ```
pub trait RoutingProvider: Send + Sync {
    /// Return the best route from `from` to `to` under `preference`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::RouteNotFound`] when no road path exists and a
    /// transport or service variant when the provider cannot answer.
    fn route(
        &self,
        from: LatLng,
        to: LatLng,
        preference: RoutePreference,
    ) -> Result<RoadRoute, ProviderError>;

    /// Return up to `max_routes` alternative routes from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::RouteTooLong`] when the provider refuses
    /// multi-route requests for this distance, plus the errors of
    /// [`RoutingProvider::route`].
    fn alternatives(
        &self,
        from: LatLng,
        to: LatLng,
        max_routes: usize,
    ) -> Result<Vec<RoadRoute>, ProviderError>;
}

impl<T: RoutingProvider + ?Sized> RoutingProvider for std::sync::Arc<T> {
    fn route(
        &self,
        from: LatLng,
        to: LatLng,
        preference: RoutePreference,
    ) -> Result<RoadRoute, ProviderError> {
        (**self).route(from, to, preference)
    }

    fn alternatives(
        &self,
        from: LatLng,
        to: LatLng,
        max_routes: usize,
    ) -> Result<Vec<RoadRoute>, ProviderError> {
        (**self).alternatives(from, to, max_routes)
    }
}

impl<T: RoutingProvider + ?Sized> RoutingProvider for Box<T> {
    fn route(
        &self,
        from: LatLng,
        to: LatLng,
        preference: RoutePreference,
    ) -> Result<RoadRoute, ProviderError> {
        (**self).route(from, to, preference)
    }

    fn alternatives(
        &self,
        from: LatLng,
        to: LatLng,
        max_routes: usize,
    ) -> Result<Vec<RoadRoute>, ProviderError> {
        (**self).alternatives(from, to, max_routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubRoutingProvider;
    use rstest::rstest;
    use std::sync::Arc;

    #[rstest]
    fn shared_providers_forward_calls() {
        let stub = Arc::new(StubRoutingProvider::straight_line());
        let boxed: Box<dyn RoutingProvider> = Box::new(Arc::clone(&stub));
        let route = boxed
            .route(
                LatLng::new(0.0, 0.0),
                LatLng::new(1.0, 0.0),
                RoutePreference::Recommended,
            )
            .expect("stub route");
        assert!((route.distance_km - 111.0).abs() < 1e-9);
        assert_eq!(stub.route_calls(), 1);
    }

    #[rstest]
    fn synthesis_starts_with_fastest() {
        assert_eq!(RoutePreference::SYNTHESIS_ORDER[0], RoutePreference::Fastest);
        assert_eq!(RoutePreference::default(), RoutePreference::Recommended);
    }
}
