//! Road routes and the rendered output built from them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::LatLng;

/// Identifies where a route came from.
///
/// Serialises as a plain string: the provider's name, or `"fallback"` for
/// geometric estimates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum ProviderTag {
    /// Returned by the named routing provider.
    Provider(String),
    /// Estimated from great-circle distance.
    Fallback,
}

impl ProviderTag {
    const FALLBACK: &'static str = "fallback";

    /// Returns `true` for geometric estimates.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}

impl From<String> for ProviderTag {
    fn from(value: String) -> Self {
        if value == Self::FALLBACK {
            Self::Fallback
        } else {
            Self::Provider(value)
        }
    }
}

impl From<ProviderTag> for String {
    fn from(value: ProviderTag) -> Self {
        match value {
            ProviderTag::Provider(name) => name,
            ProviderTag::Fallback => ProviderTag::FALLBACK.to_owned(),
        }
    }
}

/// Duration, geometry and provenance of a single road route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteDetail {
    /// Estimated travel time in minutes.
    pub duration_minutes: f64,
    /// Path vertices from origin to destination.
    pub geometry: Vec<LatLng>,
    /// Where the route came from.
    pub provider: ProviderTag,
}

/// A road route between two points: its length and its detail.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoadRoute {
    /// Route length in kilometres.
    pub distance_km: f64,
    /// Duration, geometry and provenance.
    pub detail: RouteDetail,
}

impl RoadRoute {
    /// Construct a route from its parts.
    #[must_use]
    pub const fn new(distance_km: f64, detail: RouteDetail) -> Self {
        Self {
            distance_km,
            detail,
        }
    }

    /// Returns `true` when the route is a geometric estimate.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.detail.provider.is_fallback()
    }
}

/// One end of a [`Segment`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentEndpoint {
    /// Waypoint index.
    pub index: usize,
    /// Waypoint name.
    pub name: String,
    /// Waypoint position.
    pub coordinates: LatLng,
}

/// A single leg of a rendered tour.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    /// Departure waypoint.
    pub from: SegmentEndpoint,
    /// Arrival waypoint.
    pub to: SegmentEndpoint,
    /// Leg length in kilometres.
    pub distance_km: f64,
    /// Leg travel time in minutes.
    pub duration_minutes: f64,
    /// Leg path vertices.
    pub geometry: Vec<LatLng>,
}

/// A fully rendered candidate route offered to the caller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlternativeRoute {
    /// Display label such as `"Optimal Route"`.
    pub name: String,
    /// Visiting order over waypoint indices.
    pub order: Vec<usize>,
    /// Total length in kilometres.
    pub distance_km: f64,
    /// Total travel time in minutes.
    pub duration_minutes: f64,
    /// Concatenated path vertices.
    pub geometry: Vec<LatLng>,
    /// Per-leg breakdown.
    pub segments: Vec<Segment>,
    /// Display colour as a CSS hex string.
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("fallback", ProviderTag::Fallback)]
    #[case("openrouteservice", ProviderTag::Provider("openrouteservice".to_owned()))]
    fn provider_tag_parses_from_string(#[case] raw: &str, #[case] expected: ProviderTag) {
        assert_eq!(ProviderTag::from(raw.to_owned()), expected);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn route_detail_serialises_tag_as_string() {
        let detail = RouteDetail {
            duration_minutes: 1.5,
            geometry: vec![LatLng::new(0.0, 0.0)],
            provider: ProviderTag::Fallback,
        };
        let value = serde_json::to_value(&detail).expect("serialise");
        assert_eq!(value["provider"], "fallback");
        assert_eq!(value["geometry"][0][1], 0.0);
    }
}
