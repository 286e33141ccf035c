//! Pipe lengths, midpoints and flow-direction arrows.
//!
//! All metric values use a spherical Earth of radius
//! [`EARTH_RADIUS_METERS`]. Lengths are reported in meters rounded to
//! centimeters, the precision the pipe register stores.

use pipenet_core::models::{LatLng, NetworkObject, Polyline, EARTH_RADIUS_METERS};
use serde::Serialize;

/// Great-circle distance in meters
pub fn haversine_distance(a: LatLng, b: LatLng) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Unrounded ground length of a polyline in meters.
///
/// `None` for fewer than two vertices or any invalid vertex.
pub fn ground_track_length(polyline: &Polyline) -> Option<f64> {
    if polyline.len() < 2 || !polyline.is_valid() {
        return None;
    }
    Some(polyline.segments().map(|(a, b)| haversine_distance(a, b)).sum())
}

/// Ground length of a polyline in meters, rounded to two decimals
pub fn polyline_length(polyline: &Polyline) -> Option<f64> {
    ground_track_length(polyline).map(round_centimeters)
}

/// Length shown for a pipe: a positive manual measurement wins over geometry
pub fn display_length(manual: Option<f64>, polyline: &Polyline) -> Option<f64> {
    manual
        .filter(|m| m.is_finite() && *m > 0.0)
        .or_else(|| polyline_length(polyline))
}

fn round_centimeters(meters: f64) -> f64 {
    (meters * 100.0).round() / 100.0
}

/// Where a displayed pipe length came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthSource {
    Manual,
    Computed,
    Unknown,
}

/// Length summary for one pipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipeLength {
    pub pipe_id: i64,
    pub computed_m: Option<f64>,
    pub manual_m: Option<f64>,
    pub display_m: Option<f64>,
    pub source: LengthSource,
    pub midpoint: Option<LatLng>,
}

/// Summarize the length of a line object; `None` for wells and chambers
pub fn pipe_length(object: &NetworkObject) -> Option<PipeLength> {
    let polyline = object.polyline()?;
    let computed_m = polyline_length(polyline);
    let manual_m = object.pipe.manual_length_m;
    let display_m = display_length(manual_m, polyline);

    let source = if manual_m.is_some_and(|m| m.is_finite() && m > 0.0) {
        LengthSource::Manual
    } else if computed_m.is_some() {
        LengthSource::Computed
    } else {
        LengthSource::Unknown
    };

    Some(PipeLength {
        pipe_id: object.id,
        computed_m,
        manual_m,
        display_m,
        source,
        midpoint: polyline_midpoint(polyline),
    })
}

/// Point at half the ground length of the line.
///
/// Used as the anchor when an application is created from a pipe. A single
/// vertex is its own midpoint and a line of zero length resolves to its
/// first vertex.
pub fn polyline_midpoint(polyline: &Polyline) -> Option<LatLng> {
    if polyline.is_empty() || !polyline.is_valid() {
        return None;
    }
    let total: f64 = polyline.segments().map(|(a, b)| haversine_distance(a, b)).sum();
    point_along(polyline, total / 2.0)
}

/// Flow-direction marker placed along a pipe
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowArrow {
    pub position: LatLng,
    /// Degrees clockwise from east, in `[0, 360)`
    pub rotation_deg: f64,
}

/// Evenly spaced arrows pointing from the first vertex towards the last.
///
/// Between two and five arrows depending on the vertex count; none for lines
/// with fewer than two vertices or any invalid vertex.
pub fn flow_arrows(polyline: &Polyline) -> Vec<FlowArrow> {
    let (Some(first), Some(last)) = (polyline.first(), polyline.last()) else {
        return Vec::new();
    };
    if polyline.len() < 2 || !polyline.is_valid() {
        return Vec::new();
    }

    let count = (polyline.len() / 2).clamp(2, 5);
    let heading = (last.lng - first.lng).atan2(last.lat - first.lat).to_degrees();
    let rotation_deg = (90.0 - heading).rem_euclid(360.0);

    let total: f64 = polyline.segments().map(|(a, b)| haversine_distance(a, b)).sum();
    (1..=count)
        .filter_map(|k| point_along(polyline, total * k as f64 / (count + 1) as f64))
        .map(|position| FlowArrow {
            position,
            rotation_deg,
        })
        .collect()
}

/// Point `distance` meters along the line, interpolated linearly in
/// `(lat, lng)` within the segment it falls in. Clamps to the last vertex.
fn point_along(polyline: &Polyline, distance: f64) -> Option<LatLng> {
    let mut walked = 0.0;
    for (a, b) in polyline.segments() {
        let step = haversine_distance(a, b);
        if step > 0.0 && walked + step >= distance {
            let t = ((distance - walked) / step).clamp(0.0, 1.0);
            return Some(LatLng::new(a.lat + t * (b.lat - a.lat), a.lng + t * (b.lng - a.lng)));
        }
        walked += step;
    }

    if walked > 0.0 {
        polyline.last()
    } else {
        polyline.first()
    }
}
