//! OpenRouteService directions request and response types.
//!
//! Requests target the GeoJSON flavour of the directions endpoint, which
//! returns a feature collection with one `LineString` feature per route.
//!
//! See: <https://openrouteservice.org/dev/#/api-docs/v2/directions/{profile}/geojson/post>

use serde::{Deserialize, Serialize};
use wayfarer_core::{LatLng, RoutePreference};

/// Snap radius, in metres, applied to both endpoints.
pub const SNAP_RADIUS_M: u32 = 10_000;

/// Minimum share of a route that must differ from the others.
pub const ALTERNATIVE_SHARE_FACTOR: f64 = 0.8;

/// Maximum length of an alternative relative to the best route.
pub const ALTERNATIVE_WEIGHT_FACTOR: f64 = 2.0;

/// Error code: route distance exceeds the limit for alternative routes.
pub const CODE_ROUTE_TOO_LONG: u32 = 2004;

/// Error code: no route between the points.
pub const CODE_ROUTE_NOT_FOUND: u32 = 2009;

/// Error code: a point could not be matched to the road network.
pub const CODE_POINT_NOT_FOUND: u32 = 2010;

/// Body of a directions request.
#[derive(Debug, Serialize)]
pub struct DirectionsRequest {
    /// Endpoints as `[lng, lat]`.
    pub coordinates: [[f64; 2]; 2],
    /// Snap radius per endpoint.
    pub radiuses: [u32; 2],
    /// Weighting for a single route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<&'static str>,
    /// Routing options such as features to avoid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<RouteOptions>,
    /// Parameters for multi-route requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_routes: Option<AlternativeRoutes>,
}

/// Routing options.
#[derive(Debug, Serialize)]
pub struct RouteOptions {
    /// Road features the route must avoid.
    pub avoid_features: Vec<&'static str>,
}

/// Alternative route parameters.
#[derive(Debug, Serialize)]
pub struct AlternativeRoutes {
    /// Number of routes wanted.
    pub target_count: usize,
    /// Minimum differing share.
    pub share_factor: f64,
    /// Maximum relative length.
    pub weight_factor: f64,
}

impl DirectionsRequest {
    fn between(from: LatLng, to: LatLng) -> Self {
        Self {
            coordinates: [[from.lng, from.lat], [to.lng, to.lat]],
            radiuses: [SNAP_RADIUS_M; 2],
            preference: None,
            options: None,
            alternative_routes: None,
        }
    }

    /// Request for a single route under `preference`.
    #[must_use]
    pub fn single(from: LatLng, to: LatLng, preference: RoutePreference) -> Self {
        let mut request = Self::between(from, to);
        match preference {
            RoutePreference::Recommended => {}
            RoutePreference::Fastest => request.preference = Some("fastest"),
            RoutePreference::Shortest => request.preference = Some("shortest"),
            RoutePreference::AvoidHighways => {
                request.options = Some(RouteOptions {
                    avoid_features: vec!["highways"],
                });
            }
        }
        request
    }

    /// Request for up to `target_count` alternative routes.
    #[must_use]
    pub fn alternatives(from: LatLng, to: LatLng, target_count: usize) -> Self {
        let mut request = Self::between(from, to);
        request.alternative_routes = Some(AlternativeRoutes {
            target_count,
            share_factor: ALTERNATIVE_SHARE_FACTOR,
            weight_factor: ALTERNATIVE_WEIGHT_FACTOR,
        });
        request
    }
}

/// Successful directions response.
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    /// One feature per route, best first.
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// A single route.
#[derive(Debug, Deserialize)]
pub struct Feature {
    /// Route metadata.
    pub properties: FeatureProperties,
    /// Route path.
    pub geometry: LineString,
}

/// Route metadata.
#[derive(Debug, Deserialize)]
pub struct FeatureProperties {
    /// Aggregate length and duration.
    #[serde(default)]
    pub summary: Summary,
}

/// Aggregate route figures. ORS omits zero-valued fields.
#[derive(Debug, Default, Deserialize)]
pub struct Summary {
    /// Length in metres.
    #[serde(default)]
    pub distance: f64,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: f64,
}

/// GeoJSON line geometry.
#[derive(Debug, Deserialize)]
pub struct LineString {
    /// Vertices as `[lng, lat]` or `[lng, lat, elevation]`.
    #[serde(default)]
    pub coordinates: Vec<Vec<f64>>,
}

impl LineString {
    /// Vertices as [`LatLng`], or `None` if any vertex is malformed.
    #[must_use]
    pub fn to_lat_lngs(&self) -> Option<Vec<LatLng>> {
        self.coordinates
            .iter()
            .map(|vertex| match vertex.as_slice() {
                [lng, lat, ..] => Some(LatLng::new(*lat, *lng)),
                _ => None,
            })
            .collect()
    }
}

/// Error response body.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error detail.
    pub error: ErrorBody,
}

/// Error detail, either structured or a bare message.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorBody {
    /// Structured error with an ORS code.
    Detailed {
        /// ORS error code.
        code: u32,
        /// Human-readable message.
        #[serde(default)]
        message: Option<String>,
    },
    /// Bare message.
    Message(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn single_request_swaps_to_lng_lat() {
        let request = DirectionsRequest::single(
            LatLng::new(51.5, -0.1),
            LatLng::new(51.6, -0.2),
            RoutePreference::Recommended,
        );
        let json = serde_json::to_value(&request).expect("serialise");
        assert_eq!(json["coordinates"][0][0], -0.1);
        assert_eq!(json["coordinates"][0][1], 51.5);
        assert_eq!(json["radiuses"][1], 10_000);
        assert!(json.get("preference").is_none());
        assert!(json.get("alternative_routes").is_none());
    }

    #[rstest]
    #[case(RoutePreference::Fastest, Some("fastest"), false)]
    #[case(RoutePreference::Shortest, Some("shortest"), false)]
    #[case(RoutePreference::AvoidHighways, None, true)]
    fn preferences_map_to_request_fields(
        #[case] preference: RoutePreference,
        #[case] expected: Option<&str>,
        #[case] avoids: bool,
    ) {
        let request =
            DirectionsRequest::single(LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0), preference);
        assert_eq!(request.preference, expected);
        assert_eq!(request.options.is_some(), avoids);
    }

    #[rstest]
    fn alternatives_request_carries_factors() {
        let request = DirectionsRequest::alternatives(LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0), 3);
        let json = serde_json::to_value(&request).expect("serialise");
        assert_eq!(json["alternative_routes"]["target_count"], 3);
        assert_eq!(json["alternative_routes"]["share_factor"], 0.8);
        assert_eq!(json["alternative_routes"]["weight_factor"], 2.0);
    }

    #[rstest]
    fn deserialise_feature_collection() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"summary": {"distance": 1500.0, "duration": 120.0}},
                "geometry": {"type": "LineString", "coordinates": [[-0.1, 51.5, 12.0], [-0.2, 51.6]]}
            }]
        }"#;
        let collection: FeatureCollection = serde_json::from_str(json).expect("deserialise");
        let feature = &collection.features[0];
        assert_eq!(feature.properties.summary.distance, 1500.0);
        let points = feature.geometry.to_lat_lngs().expect("valid geometry");
        assert_eq!(points[0], LatLng::new(51.5, -0.1));
    }

    #[rstest]
    fn missing_summary_fields_default_to_zero() {
        let json = r#"{"features": [{"properties": {"summary": {}}, "geometry": {"coordinates": []}}]}"#;
        let collection: FeatureCollection = serde_json::from_str(json).expect("deserialise");
        assert_eq!(collection.features[0].properties.summary.duration, 0.0);
    }

    #[rstest]
    #[case(r#"{"error": {"code": 2004, "message": "too long"}}"#, Some(2004))]
    #[case(r#"{"error": "Access to this API has been disallowed"}"#, None)]
    fn deserialise_error_bodies(#[case] json: &str, #[case] code: Option<u32>) {
        let response: ErrorResponse = serde_json::from_str(json).expect("deserialise");
        let parsed = match response.error {
            ErrorBody::Detailed { code, .. } => Some(code),
            ErrorBody::Message(_) => None,
        };
        assert_eq!(parsed, code);
    }

    #[rstest]
    fn malformed_vertices_are_rejected() {
        let line = LineString {
            coordinates: vec![vec![1.0]],
        };
        assert!(line.to_lat_lngs().is_none());
    }
}
