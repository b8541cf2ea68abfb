//! Rendering tours into segments, totals, and path geometry.

use wayfarer_core::{
    AlternativeRoute, LatLng, OptimizeError, RoadRoute, RoutingProvider, Segment,
    SegmentEndpoint, Tour, Waypoint,
};
use wayfarer_routing::DistanceOracle;

/// A tour with its per-leg breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRoute {
    /// Visiting order over waypoint indices.
    pub order: Vec<usize>,
    /// Sum of segment distances.
    pub distance_km: f64,
    /// Sum of segment durations.
    pub duration_minutes: f64,
    /// Segment geometries joined end to end.
    pub geometry: Vec<LatLng>,
    /// One entry per consecutive pair of the order.
    pub segments: Vec<Segment>,
}

impl AssembledRoute {
    /// Label and colour the route for presentation.
    #[must_use]
    pub fn into_alternative(self, name: impl Into<String>, color: &str) -> AlternativeRoute {
        AlternativeRoute {
            name: name.into(),
            order: self.order,
            distance_km: self.distance_km,
            duration_minutes: self.duration_minutes,
            geometry: self.geometry,
            segments: self.segments,
            color: color.to_owned(),
        }
    }

    #[expect(clippy::float_arithmetic, reason = "route totals are sums")]
    fn from_segments(order: Vec<usize>, segments: Vec<Segment>) -> Self {
        let distance_km = segments.iter().map(|s| s.distance_km).sum();
        let duration_minutes = segments.iter().map(|s| s.duration_minutes).sum();
        Self {
            order,
            distance_km,
            duration_minutes,
            geometry: join_geometry(&segments),
            segments,
        }
    }
}

impl From<AlternativeRoute> for AssembledRoute {
    fn from(route: AlternativeRoute) -> Self {
        Self {
            order: route.order,
            distance_km: route.distance_km,
            duration_minutes: route.duration_minutes,
            geometry: route.geometry,
            segments: route.segments,
        }
    }
}

/// Builds [`AssembledRoute`]s from oracle lookups.
///
/// Lookups go through the oracle's cache, so assembling a tour whose legs
/// were already used for the distance matrix makes no provider calls.
#[derive(Debug)]
pub struct RouteAssembler<'a, P> {
    oracle: &'a DistanceOracle<P>,
    waypoints: &'a [Waypoint],
}

impl<'a, P: RoutingProvider> RouteAssembler<'a, P> {
    /// Assemble routes over `waypoints` using `oracle`.
    #[must_use]
    pub const fn new(oracle: &'a DistanceOracle<P>, waypoints: &'a [Waypoint]) -> Self {
        Self { oracle, waypoints }
    }

    /// The leg from waypoint `from` to waypoint `to`.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::RouteImpossible`] when the oracle finds no
    /// road path and [`OptimizeError::NoValidTour`] for an unknown index.
    pub fn segment(&self, from: usize, to: usize) -> Result<Segment, OptimizeError> {
        let (start, end) = self.endpoints(from, to)?;
        let route = self
            .oracle
            .distance(start.coordinates, end.coordinates)
            .map_err(|_| OptimizeError::RouteImpossible { from, to })?;
        Ok(Self::leg(start, end, route))
    }

    /// Render `tour` leg by leg.
    ///
    /// # Errors
    ///
    /// Fails like [`RouteAssembler::segment`] on the first bad leg.
    pub fn assemble(&self, tour: &Tour) -> Result<AssembledRoute, OptimizeError> {
        let segments = tour
            .as_slice()
            .windows(2)
            .filter_map(|pair| match *pair {
                [from, to] => Some(self.segment(from, to)),
                _ => None,
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AssembledRoute::from_segments(tour.as_slice().to_vec(), segments))
    }

    /// Up to `max_routes` distinct road routes from waypoint `from` to
    /// waypoint `to`, each rendered as a one-leg route, shortest first.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::RouteImpossible`] when no road path exists
    /// and [`OptimizeError::NoValidTour`] for an unknown index.
    pub fn alternatives(
        &self,
        from: usize,
        to: usize,
        max_routes: usize,
    ) -> Result<Vec<AssembledRoute>, OptimizeError> {
        let (start, end) = self.endpoints(from, to)?;
        let routes = self
            .oracle
            .alternatives(start.coordinates, end.coordinates, max_routes)
            .map_err(|_| OptimizeError::RouteImpossible { from, to })?;
        routes
            .into_iter()
            .map(|route| self.direct(from, to, route))
            .collect()
    }

    /// Render a single road route between two waypoints.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::NoValidTour`] for an unknown index.
    pub fn direct(
        &self,
        from: usize,
        to: usize,
        route: RoadRoute,
    ) -> Result<AssembledRoute, OptimizeError> {
        let (start, end) = self.endpoints(from, to)?;
        Ok(AssembledRoute::from_segments(
            vec![from, to],
            vec![Self::leg(start, end, route)],
        ))
    }

    fn endpoints(
        &self,
        from: usize,
        to: usize,
    ) -> Result<(SegmentEndpoint, SegmentEndpoint), OptimizeError> {
        let endpoint = |index: usize| {
            self.waypoints
                .get(index)
                .map(|waypoint| SegmentEndpoint {
                    index,
                    name: waypoint.name.clone(),
                    coordinates: waypoint.location,
                })
                .ok_or(OptimizeError::NoValidTour)
        };
        Ok((endpoint(from)?, endpoint(to)?))
    }

    fn leg(from: SegmentEndpoint, to: SegmentEndpoint, route: RoadRoute) -> Segment {
        Segment {
            from,
            to,
            distance_km: route.distance_km,
            duration_minutes: route.detail.duration_minutes,
            geometry: route.detail.geometry,
        }
    }
}

/// Concatenate segment geometries, skipping a first vertex that repeats the
/// previous segment's last vertex.
///
/// # Examples
/// ```
/// use wayfarer_core::{LatLng, Segment, SegmentEndpoint};
/// use wayfarer_optimizer::join_geometry;
///
/// let end = |index| SegmentEndpoint { index, name: String::new(), coordinates: LatLng::new(0.0, 0.0) };
/// let leg = |points: Vec<LatLng>| Segment {
///     from: end(0),
///     to: end(1),
///     distance_km: 0.0,
///     duration_minutes: 0.0,
///     geometry: points,
/// };
/// let a = LatLng::new(0.0, 0.0);
/// let b = LatLng::new(0.0, 1.0);
/// let c = LatLng::new(1.0, 1.0);
/// assert_eq!(join_geometry(&[leg(vec![a, b]), leg(vec![b, c])]), vec![a, b, c]);
/// ```
#[must_use]
pub fn join_geometry(segments: &[Segment]) -> Vec<LatLng> {
    let mut path: Vec<LatLng> = Vec::new();
    for segment in segments {
        let mut points = segment.geometry.iter().copied().peekable();
        if path.last().is_some() && path.last() == points.peek() {
            points.next();
        }
        path.extend(points);
    }
    path
}
