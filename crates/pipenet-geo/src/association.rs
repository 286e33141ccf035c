//! Point-to-pipe association.
//!
//! A dispatcher drops an application marker on the map; it belongs to a pipe
//! when it is within tolerance of any segment of the pipe's centerline.
//! Distances are planar, either in raw `(lat, lng)` degrees or in meters on a
//! local equirectangular projection centered on the query point.

use pipenet_core::models::{LatLng, Polyline, Tolerance, ToleranceUnit, METERS_PER_DEGREE};
use serde::Serialize;

/// Verdict of a single point/pipe association
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AssociationResult {
    pub is_near: bool,
    /// Minimum distance in the tolerance's unit, `None` if nothing was measurable
    pub min_distance: Option<f64>,
    pub tolerance: Tolerance,
}

/// Whether `point` lies within `tolerance` of `polyline` (inclusive)
pub fn is_point_near_polyline(point: LatLng, polyline: &Polyline, tolerance: Tolerance) -> bool {
    associate(point, polyline, tolerance).is_near
}

/// Associate a point with a pipe centerline, reporting the minimum distance
pub fn associate(point: LatLng, polyline: &Polyline, tolerance: Tolerance) -> AssociationResult {
    let min_distance = distance_to_polyline(point, polyline, tolerance.unit);
    let is_near = tolerance.is_usable()
        && min_distance.map(|d| d <= tolerance.value).unwrap_or(false);

    AssociationResult {
        is_near,
        min_distance,
        tolerance,
    }
}

/// Minimum planar distance from `point` to `polyline` in `unit`.
///
/// Every segment is measured by projecting the point onto it and clamping
/// to the endpoints; every vertex is measured directly, which also covers
/// single-vertex lines. Invalid vertices and the segments touching them are
/// skipped. Returns `None` for an invalid point or a line with no valid
/// vertex.
pub fn distance_to_polyline(point: LatLng, polyline: &Polyline, unit: ToleranceUnit) -> Option<f64> {
    if !point.is_valid() {
        return None;
    }

    let plane = Plane::centered_on(point, unit);
    let p = plane.project(point);

    let segments = polyline
        .segments()
        .filter(|(a, b)| a.is_valid() && b.is_valid())
        .map(|(a, b)| segment_distance(p, plane.project(a), plane.project(b)));
    let vertices = polyline
        .vertices()
        .iter()
        .filter(|v| v.is_valid())
        .map(|v| distance(p, plane.project(*v)));

    segments.chain(vertices).fold(None, |min: Option<f64>, d| {
        Some(match min {
            Some(m) if m <= d => m,
            _ => d,
        })
    })
}

/// Planar frame distances are measured in
#[derive(Debug, Clone, Copy)]
enum Plane {
    /// `x = lat, y = lng`, unscaled
    Degrees,
    /// Meters east/north of `origin`
    Local { origin: LatLng, lng_scale: f64 },
}

impl Plane {
    fn centered_on(origin: LatLng, unit: ToleranceUnit) -> Self {
        match unit {
            ToleranceUnit::Degrees => Plane::Degrees,
            ToleranceUnit::Meters => Plane::Local {
                origin,
                lng_scale: origin.lat.to_radians().cos() * METERS_PER_DEGREE,
            },
        }
    }

    fn project(&self, location: LatLng) -> (f64, f64) {
        match *self {
            Plane::Degrees => (location.lat, location.lng),
            Plane::Local { origin, lng_scale } => {
                // Shortest way round across the antimeridian
                let dlng = (location.lng - origin.lng + 180.0).rem_euclid(360.0) - 180.0;
                (dlng * lng_scale, (location.lat - origin.lat) * METERS_PER_DEGREE)
            }
        }
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Distance from `p` to the segment `a`-`b`, clamped to the endpoints
fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return distance(p, a);
    }

    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0);
    distance(p, (a.0 + t * dx, a.1 + t * dy))
}
