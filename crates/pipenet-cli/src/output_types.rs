use pipenet_core::models::{LatLng, Tolerance};
use pipenet_geo::{ClusterCounts, PipeLength, PipeResolution};
use serde::Serialize;
use std::collections::BTreeMap;

/// Output for length command
#[derive(Debug, Serialize)]
pub struct LengthOutput {
    pub pipes: Vec<PipeLength>,
    /// Sum of displayed lengths, pipes without a length excluded
    pub total_display_m: f64,
}

/// Output for associate command
#[derive(Debug, Serialize)]
pub struct AssociateOutput {
    pub tolerance: Tolerance,
    pub applications: Vec<ApplicationPipe>,
    pub pipes_with_open_applications: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationPipe {
    pub application_id: i64,
    pub status: String,
    pub resolution: PipeResolution,
}

/// Output for cluster command
#[derive(Debug, Serialize)]
pub struct ClusterOutput {
    pub cluster_tolerance: f64,
    pub application_count: usize,
    pub groups: Vec<ClusterSummary>,
}

#[derive(Debug, Serialize)]
pub struct ClusterSummary {
    pub key: (i64, i64),
    pub location: LatLng,
    pub badge: String,
    pub tone: String,
    pub color: String,
    pub counts: ClusterCounts,
    pub member_ids: Vec<i64>,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub values: BTreeMap<String, ConfigEntry>,
}

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: String,
}
