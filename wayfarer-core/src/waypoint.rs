//! Waypoints and the coordinate pairs that locate them.

use geo::Point;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A WGS84 position expressed as latitude and longitude in degrees.
///
/// Serialises as a two-element `[lat, lng]` array, the shape map front ends
/// expect for polyline vertices.
///
/// # Examples
/// ```
/// use wayfarer_core::LatLng;
///
/// let point = LatLng::new(51.5, -0.1);
/// assert_eq!(point.to_point().x(), -0.1);
/// assert_eq!(point.to_point().y(), 51.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[f64; 2]", into = "[f64; 2]"))]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Construct a position from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Convert to a `geo` point (`x = lng`, `y = lat`).
    #[must_use]
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }

    /// Check the position is finite and inside the WGS84 bounds.
    ///
    /// # Errors
    ///
    /// Returns [`WaypointError::NonFiniteCoordinate`] or
    /// [`WaypointError::OutOfRange`] naming the waypoint `index`.
    pub fn validate(self, index: usize) -> Result<(), WaypointError> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(WaypointError::NonFiniteCoordinate { index });
        }
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lng) {
            return Err(WaypointError::OutOfRange {
                index,
                lat: self.lat,
                lng: self.lng,
            });
        }
        Ok(())
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(value: LatLng) -> Self {
        [value.lat, value.lng]
    }
}

/// A waypoint as supplied by a caller, before indices are assigned.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WaypointInput {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Optional display name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
}

impl WaypointInput {
    /// Construct an input from coordinates and an optional name.
    #[must_use]
    pub fn new(lat: f64, lng: f64, name: Option<&str>) -> Self {
        Self {
            lat,
            lng,
            name: name.map(str::to_owned),
        }
    }
}

/// A validated stop on a tour.
///
/// `index` is the position of the waypoint in the caller's input list and is
/// the value tours are expressed in. Waypoints do not change once a request
/// begins.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Waypoint {
    /// Position in the input list.
    pub index: usize,
    /// Geographic position.
    pub location: LatLng,
    /// Display name; defaults to `Point {index + 1}`.
    pub name: String,
}

impl Waypoint {
    /// Construct a waypoint with an explicit name.
    #[must_use]
    pub fn new(index: usize, location: LatLng, name: impl Into<String>) -> Self {
        Self {
            index,
            location,
            name: name.into(),
        }
    }

    /// Construct a waypoint named after its position.
    ///
    /// # Examples
    /// ```
    /// use wayfarer_core::{LatLng, Waypoint};
    ///
    /// let waypoint = Waypoint::unnamed(2, LatLng::new(0.0, 0.0));
    /// assert_eq!(waypoint.name, "Point 3");
    /// ```
    #[must_use]
    pub fn unnamed(index: usize, location: LatLng) -> Self {
        Self::new(index, location, default_name(index))
    }
}

fn default_name(index: usize) -> String {
    format!("Point {}", index.saturating_add(1))
}

/// Errors raised while validating waypoints.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WaypointError {
    /// Fewer than two waypoints were supplied.
    #[error("at least 2 waypoints are required, got {count}")]
    TooFew {
        /// Number of waypoints supplied.
        count: usize,
    },
    /// A coordinate was NaN or infinite.
    #[error("waypoint {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Offending waypoint index.
        index: usize,
    },
    /// A coordinate was outside the WGS84 range.
    #[error("waypoint {index} has out-of-range coordinates ({lat}, {lng})")]
    OutOfRange {
        /// Offending waypoint index.
        index: usize,
        /// Supplied latitude.
        lat: f64,
        /// Supplied longitude.
        lng: f64,
    },
}

/// Validate caller input and assign indices.
///
/// # Errors
///
/// Returns [`WaypointError::TooFew`] for fewer than two entries, or the first
/// coordinate error encountered.
///
/// # Examples
/// ```
/// use wayfarer_core::{WaypointInput, validate_waypoints};
///
/// let inputs = vec![
///     WaypointInput::new(13.08, 80.27, Some("Chennai")),
///     WaypointInput::new(11.93, 79.81, None),
/// ];
/// let waypoints = validate_waypoints(&inputs)?;
/// assert_eq!(waypoints[1].name, "Point 2");
/// # Ok::<(), wayfarer_core::WaypointError>(())
/// ```
pub fn validate_waypoints(inputs: &[WaypointInput]) -> Result<Vec<Waypoint>, WaypointError> {
    if inputs.len() < 2 {
        return Err(WaypointError::TooFew {
            count: inputs.len(),
        });
    }
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let location = LatLng::new(input.lat, input.lng);
            location.validate(index)?;
            let name = input
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map_or_else(|| default_name(index), str::to_owned);
            Ok(Waypoint::new(index, location, name))
        })
        .collect()
}
