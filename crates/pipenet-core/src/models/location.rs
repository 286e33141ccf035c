//! Geographic locations and pipe centerlines.
//!
//! Internally every location is `(lat, lng)`. GeoJSON stores positions as
//! `[lng, lat]` and the `geo` crate uses `x = lng, y = lat`; the conversions
//! below are the only places that axis order is handled.

use serde::{Deserialize, Serialize};

/// Spherical Earth radius used for every metric computation
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Length of one degree of latitude on that sphere
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;

/// A WGS-84 location in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a location only if it is finite and within WGS-84 bounds
    pub fn checked(lat: f64, lng: f64) -> Option<Self> {
        let location = Self::new(lat, lng);
        location.is_valid().then_some(location)
    }

    /// Finite and within `lat ∈ [-90, 90]`, `lng ∈ [-180, 180]`
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Read a GeoJSON position (`[lng, lat, ...]`).
    ///
    /// Returns `None` when the position has fewer than two ordinates. Extra
    /// ordinates (altitude) are ignored. Range checks are left to the caller.
    pub fn from_geojson_position(position: &[f64]) -> Option<Self> {
        match position {
            [lng, lat, ..] => Some(Self::new(*lat, *lng)),
            _ => None,
        }
    }

    /// Write as a GeoJSON position (`[lng, lat]`)
    pub fn to_geojson_position(&self) -> Vec<f64> {
        vec![self.lng, self.lat]
    }

    pub fn to_geo_point(&self) -> geo::Point<f64> {
        geo::Point::new(self.lng, self.lat)
    }

    pub fn to_geo_coord(&self) -> geo::Coord<f64> {
        geo::Coord { x: self.lng, y: self.lat }
    }
}

impl From<geo::Point<f64>> for LatLng {
    fn from(point: geo::Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

impl From<geo::Coord<f64>> for LatLng {
    fn from(coord: geo::Coord<f64>) -> Self {
        Self::new(coord.y, coord.x)
    }
}

/// Ordered vertices of a pipe centerline.
///
/// Consecutive vertices are joined by straight ground segments. Any vertex
/// count is representable; algorithms decide what degenerate lines mean.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    vertices: Vec<LatLng>,
}

impl Polyline {
    pub fn new(vertices: Vec<LatLng>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[LatLng] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn first(&self) -> Option<LatLng> {
        self.vertices.first().copied()
    }

    pub fn last(&self) -> Option<LatLng> {
        self.vertices.last().copied()
    }

    /// Consecutive vertex pairs
    pub fn segments(&self) -> impl Iterator<Item = (LatLng, LatLng)> + '_ {
        self.vertices.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// True when every vertex is a valid location
    pub fn is_valid(&self) -> bool {
        self.vertices.iter().all(LatLng::is_valid)
    }

    /// Read GeoJSON `LineString` coordinates. `None` if any position is short.
    pub fn from_geojson_positions(positions: &[Vec<f64>]) -> Option<Self> {
        positions
            .iter()
            .map(|position| LatLng::from_geojson_position(position))
            .collect::<Option<Vec<_>>>()
            .map(Self::new)
    }

    pub fn to_geojson_positions(&self) -> Vec<Vec<f64>> {
        self.vertices.iter().map(LatLng::to_geojson_position).collect()
    }

    pub fn to_geo_line_string(&self) -> geo::LineString<f64> {
        geo::LineString::new(self.vertices.iter().map(LatLng::to_geo_coord).collect())
    }
}

impl FromIterator<LatLng> for Polyline {
    fn from_iter<I: IntoIterator<Item = LatLng>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<Vec<LatLng>> for Polyline {
    fn from(vertices: Vec<LatLng>) -> Self {
        Self::new(vertices)
    }
}
