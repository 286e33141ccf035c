//! Network infrastructure layer: wells, chambers, pipes and well valves.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::location::{LatLng, Polyline};

/// Which utility network an object belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Water,
    Sewer,
}

impl LayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Water => "water",
            LayerKind::Sewer => "sewer",
        }
    }

    /// Stroke color used for pipes of this layer
    pub fn line_color(&self) -> &'static str {
        match self {
            LayerKind::Water => "#0066cc",
            LayerKind::Sewer => "#8B4513",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of layer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Well,
    Chamber,
    Line,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Well => "well",
            ObjectKind::Chamber => "chamber",
            ObjectKind::Line => "line",
        }
    }
}

/// Geometry of a layer object after boundary conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum NetworkGeometry {
    Point(LatLng),
    Line(Polyline),
}

/// Attributes recorded for pipes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipeAttributes {
    /// Nominal diameter as entered by the operator (e.g. "110 мм")
    pub size: Option<String>,

    pub material: Option<String>,

    /// Manually measured length in meters; overrides the computed length
    pub manual_length_m: Option<f64>,

    /// Ownership boundary (utility / customer balance)
    pub balance_delimitation: Option<String>,
}

/// Operational state of a valve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValveStatus {
    #[default]
    Working,
    NotWorking,
    NeedsRepair,
}

/// A valve installed in a well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valve {
    pub id: i64,
    #[serde(default)]
    pub valve_type: Option<String>,
    #[serde(default)]
    pub valve_number: Option<String>,
    #[serde(default)]
    pub status: ValveStatus,
    #[serde(default)]
    pub description: Option<String>,
}

/// A well, chamber or pipe on one of the network layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkObject {
    pub id: i64,
    pub layer: LayerKind,
    pub kind: ObjectKind,
    pub geometry: NetworkGeometry,
    pub address: Option<String>,
    pub description: Option<String>,
    pub pipe: PipeAttributes,
    pub valves: Vec<Valve>,
}

impl NetworkObject {
    pub fn is_pipe(&self) -> bool {
        self.kind == ObjectKind::Line
    }

    /// Centerline of a pipe; `None` for point objects
    pub fn polyline(&self) -> Option<&Polyline> {
        match &self.geometry {
            NetworkGeometry::Line(line) => Some(line),
            NetworkGeometry::Point(_) => None,
        }
    }

    /// Location of a well or chamber; `None` for pipes
    pub fn location(&self) -> Option<LatLng> {
        match &self.geometry {
            NetworkGeometry::Point(location) => Some(*location),
            NetworkGeometry::Line(_) => None,
        }
    }

    /// Valves that are not in working order
    pub fn faulty_valves(&self) -> impl Iterator<Item = &Valve> {
        self.valves.iter().filter(|valve| valve.status != ValveStatus::Working)
    }
}
