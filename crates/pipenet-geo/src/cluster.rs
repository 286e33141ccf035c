//! Marker clustering.
//!
//! Applications reported at (nearly) the same spot collapse into one map
//! badge. Locations are snapped to a grid of `tolerance` degrees; records in
//! the same cell form a group. Two points just across a cell edge stay in
//! separate groups even when they are closer to each other than to the rest
//! of their own cell.

use std::collections::HashMap;

use pipenet_core::models::{ApplicationRecord, ApplicationStatus, LatLng, TeamCategory};
use serde::Serialize;
use tracing::debug;

/// Grid cell of a location: `(round(lat / tol), round(lng / tol))`.
///
/// Halves round away from zero. `None` for an invalid location, a tolerance
/// that is not positive and finite, or a cell index that does not fit an
/// `i64` (saturating would put distant points in one cell).
pub fn bucket_key(location: LatLng, tolerance_degrees: f64) -> Option<(i64, i64)> {
    if !location.is_valid() || !(tolerance_degrees.is_finite() && tolerance_degrees > 0.0) {
        return None;
    }
    let cell = |coordinate: f64| {
        let index = (coordinate / tolerance_degrees).round();
        // i64::MAX as f64 is 2^63, the first value that no longer fits
        (index.is_finite() && index.abs() < i64::MAX as f64).then_some(index as i64)
    };
    Some((cell(location.lat)?, cell(location.lng)?))
}

/// Applications still shown on the map
pub fn active_applications<'a, I>(records: I) -> impl Iterator<Item = &'a ApplicationRecord>
where
    I: IntoIterator<Item = &'a ApplicationRecord>,
{
    records.into_iter().filter(|record| record.is_active())
}

/// Group applications by grid cell.
///
/// Records without a usable location are left out. Groups come back in the
/// order their first member appears and keep their members in input order;
/// the first member's location represents the group.
pub fn group_by_location<'a, I>(applications: I, tolerance_degrees: f64) -> Vec<ClusterGroup<'a>>
where
    I: IntoIterator<Item = &'a ApplicationRecord>,
{
    if !(tolerance_degrees.is_finite() && tolerance_degrees > 0.0) {
        debug!(tolerance_degrees, "Cluster tolerance is not positive, no groups formed");
        return Vec::new();
    }

    let mut groups: Vec<ClusterGroup<'a>> = Vec::new();
    let mut by_key: HashMap<(i64, i64), usize> = HashMap::new();

    for record in applications {
        let Some((location, key)) = record
            .valid_location()
            .and_then(|location| bucket_key(location, tolerance_degrees).map(|key| (location, key)))
        else {
            debug!(application_id = record.id, "Skipping application without a usable location");
            continue;
        };

        let index = *by_key.entry(key).or_insert_with(|| {
            groups.push(ClusterGroup::new(key, location));
            groups.len() - 1
        });
        groups[index].push(record);
    }

    groups
}

/// Applications sharing one grid cell
#[derive(Debug, Clone, Serialize)]
pub struct ClusterGroup<'a> {
    pub key: (i64, i64),
    /// Location of the first member
    pub location: LatLng,
    pub members: Vec<&'a ApplicationRecord>,
    pub counts: ClusterCounts,
}

impl<'a> ClusterGroup<'a> {
    fn new(key: (i64, i64), location: LatLng) -> Self {
        Self {
            key,
            location,
            members: Vec::new(),
            counts: ClusterCounts::default(),
        }
    }

    fn push(&mut self, record: &'a ApplicationRecord) {
        self.counts.add(record);
        self.members.push(record);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_ids(&self) -> Vec<i64> {
        self.members.iter().map(|record| record.id).collect()
    }

    /// Badge text: "w/s" for a mixed group, else the water, sewer or total count
    pub fn badge_label(&self) -> String {
        let counts = &self.counts;
        match (counts.water, counts.sewer) {
            (w, s) if w > 0 && s > 0 => "w/s".to_string(),
            (w, _) if w > 0 => w.to_string(),
            (_, s) if s > 0 => s.to_string(),
            _ => counts.total.to_string(),
        }
    }

    /// Marker color; a lone application is colored as itself
    pub fn tone(&self) -> MarkerTone {
        match self.members.as_slice() {
            [single] => MarkerTone::for_application(single),
            _ => MarkerTone::for_counts(&self.counts),
        }
    }
}

/// Per-crew and per-status tallies of a group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClusterCounts {
    pub total: usize,
    pub water: usize,
    pub sewer: usize,
    pub other_team: usize,
    pub unassigned: usize,
    pub water_in_progress: usize,
    pub sewer_in_progress: usize,
    pub new_unassigned: usize,
}

impl ClusterCounts {
    fn add(&mut self, record: &ApplicationRecord) {
        let in_progress = record.status == ApplicationStatus::InProgress;
        self.total += 1;
        match record.team_category() {
            Some(TeamCategory::Water) => {
                self.water += 1;
                self.water_in_progress += usize::from(in_progress);
            }
            Some(TeamCategory::Sewer) => {
                self.sewer += 1;
                self.sewer_in_progress += usize::from(in_progress);
            }
            Some(TeamCategory::Other) => self.other_team += 1,
            None => {
                self.unassigned += 1;
                self.new_unassigned += usize::from(record.status == ApplicationStatus::New);
            }
        }
    }
}

/// Marker color family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerTone {
    Unassigned,
    Water,
    WaterActive,
    Sewer,
    SewerActive,
}

impl MarkerTone {
    pub fn hex(&self) -> &'static str {
        match self {
            MarkerTone::Unassigned => "#dc2626",
            MarkerTone::Water => "#0066cc",
            MarkerTone::WaterActive => "#0066ff",
            MarkerTone::Sewer => "#fbbf24",
            MarkerTone::SewerActive => "#facc15",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerTone::Unassigned => "unassigned",
            MarkerTone::Water => "water",
            MarkerTone::WaterActive => "water_active",
            MarkerTone::Sewer => "sewer",
            MarkerTone::SewerActive => "sewer_active",
        }
    }

    /// Tone of a single application. Any crew that is not the water crew
    /// is drawn in the sewer colors.
    pub fn for_application(record: &ApplicationRecord) -> Self {
        let active = record.status == ApplicationStatus::InProgress;
        match record.team_category() {
            None => MarkerTone::Unassigned,
            Some(TeamCategory::Water) if active => MarkerTone::WaterActive,
            Some(TeamCategory::Water) => MarkerTone::Water,
            Some(_) if active => MarkerTone::SewerActive,
            Some(_) => MarkerTone::Sewer,
        }
    }

    /// Tone of a group. Mixed groups take the active color of whichever crew
    /// has more work in progress, sewer on a tie.
    pub fn for_counts(counts: &ClusterCounts) -> Self {
        let water_active = counts.water_in_progress > 0;
        let sewer_active = counts.sewer_in_progress > 0;
        match (counts.water > 0, counts.sewer > 0) {
            (true, true) if water_active || sewer_active => {
                if counts.water_in_progress > counts.sewer_in_progress {
                    MarkerTone::WaterActive
                } else {
                    MarkerTone::SewerActive
                }
            }
            (true, true) => MarkerTone::Water,
            (true, false) if water_active => MarkerTone::WaterActive,
            (true, false) => MarkerTone::Water,
            (false, true) if sewer_active => MarkerTone::SewerActive,
            (false, true) => MarkerTone::Sewer,
            (false, false) => MarkerTone::Unassigned,
        }
    }
}
