//! Association tolerance with an explicit unit.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::location::METERS_PER_DEGREE;

/// Unit a tolerance is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToleranceUnit {
    /// Raw coordinate delta in the `(lat, lng)` plane.
    ///
    /// One unit is ~111 km north-south everywhere, but east-west it shrinks
    /// with `cos(lat)`.
    #[default]
    Degrees,
    /// Ground distance, measured on a local equirectangular projection
    Meters,
}

impl ToleranceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToleranceUnit::Degrees => "degrees",
            ToleranceUnit::Meters => "meters",
        }
    }
}

impl fmt::Display for ToleranceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maximum distance at which a point counts as "on" a pipe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub value: f64,
    pub unit: ToleranceUnit,
}

impl Default for Tolerance {
    /// 0.001° (~100 m north-south), the value the dispatch map has always used
    fn default() -> Self {
        Self::degrees(0.001)
    }
}

impl Tolerance {
    pub fn new(value: f64, unit: ToleranceUnit) -> Self {
        Self { value, unit }
    }

    pub fn degrees(value: f64) -> Self {
        Self::new(value, ToleranceUnit::Degrees)
    }

    pub fn meters(value: f64) -> Self {
        Self::new(value, ToleranceUnit::Meters)
    }

    /// Negative or non-finite tolerances match nothing
    pub fn is_usable(&self) -> bool {
        self.value.is_finite() && self.value >= 0.0
    }

    /// Half-extent `(lat, lng)` in degrees of a box that contains every point
    /// within this tolerance of a location at latitude `lat`.
    pub fn degree_radius_at(&self, lat: f64) -> (f64, f64) {
        match self.unit {
            ToleranceUnit::Degrees => (self.value, self.value),
            ToleranceUnit::Meters => {
                let dlat = self.value / METERS_PER_DEGREE;
                let cos = lat.to_radians().cos().abs().max(1e-6);
                (dlat, (dlat / cos).min(360.0))
            }
        }
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tolerance() {
        let tolerance = Tolerance::default();
        assert_eq!(tolerance.unit, ToleranceUnit::Degrees);
        assert_eq!(tolerance.value, 0.001);
        assert_eq!(tolerance.to_string(), "0.001 degrees");
    }

    #[test]
    fn test_usable() {
        assert!(Tolerance::meters(0.0).is_usable());
        assert!(!Tolerance::meters(-1.0).is_usable());
        assert!(!Tolerance::degrees(f64::NAN).is_usable());
        assert!(!Tolerance::degrees(f64::INFINITY).is_usable());
    }

    #[test]
    fn test_degree_radius() {
        assert_eq!(Tolerance::degrees(0.5).degree_radius_at(60.0), (0.5, 0.5));

        let (dlat, dlng) = Tolerance::meters(METERS_PER_DEGREE).degree_radius_at(60.0);
        assert!((dlat - 1.0).abs() < 1e-9);
        // cos(60°) = 0.5, so a degree of longitude is half as long
        assert!((dlng - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_unit_serialization() {
        let unit: ToleranceUnit = serde_json::from_str("\"meters\"").unwrap();
        assert_eq!(unit, ToleranceUnit::Meters);
    }
}
