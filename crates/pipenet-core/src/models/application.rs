//! Service applications (trouble tickets) and the crews they are assigned to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::location::LatLng;

/// Lifecycle state of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    New,
    InProgress,
    Completed,
}

impl ApplicationStatus {
    /// Completed applications are no longer shown on the map
    pub fn is_active(&self) -> bool {
        !matches!(self, ApplicationStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::New => "new",
            ApplicationStatus::InProgress => "in_progress",
            ApplicationStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which network a crew works on, derived from the crew name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamCategory {
    Water,
    Sewer,
    Other,
}

impl TeamCategory {
    /// Classify a crew by name.
    ///
    /// The dispatch database names the two standing crews in Russian
    /// ("водосеть", "канализация"); English names are accepted as well.
    pub fn from_team_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "водосеть" | "water" => TeamCategory::Water,
            "канализация" | "sewer" => TeamCategory::Sewer,
            _ => TeamCategory::Other,
        }
    }
}

/// Reference to the crew an application is assigned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: Option<i64>,
    pub name: String,
}

impl TeamRef {
    pub fn new(id: Option<i64>, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }

    pub fn category(&self) -> TeamCategory {
        TeamCategory::from_team_name(&self.name)
    }
}

/// A service application as read from storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: i64,

    /// Where the problem was reported; absent when the row had no usable coordinates
    pub location: Option<LatLng>,

    /// Explicit pipe reference, set when the application was created on a line
    pub line_id: Option<i64>,

    pub status: ApplicationStatus,

    pub team: Option<TeamRef>,

    pub address: Option<String>,

    pub description: Option<String>,

    pub created_at: Option<DateTime<Utc>>,

    pub completed_at: Option<DateTime<Utc>>,
}

impl ApplicationRecord {
    pub fn new(id: i64, status: ApplicationStatus) -> Self {
        Self {
            id,
            location: None,
            line_id: None,
            status,
            team: None,
            address: None,
            description: None,
            created_at: None,
            completed_at: None,
        }
    }

    pub fn at(mut self, lat: f64, lng: f64) -> Self {
        self.location = Some(LatLng::new(lat, lng));
        self
    }

    pub fn team(mut self, name: impl Into<String>) -> Self {
        self.team = Some(TeamRef::new(None, name));
        self
    }

    pub fn on_line(mut self, line_id: i64) -> Self {
        self.line_id = Some(line_id);
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// The location, if present and usable for geometry
    pub fn valid_location(&self) -> Option<LatLng> {
        self.location.filter(LatLng::is_valid)
    }

    pub fn team_category(&self) -> Option<TeamCategory> {
        self.team.as_ref().map(TeamRef::category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        let status: ApplicationStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, ApplicationStatus::InProgress);
        assert_eq!(serde_json::to_string(&ApplicationStatus::Completed).unwrap(), "\"completed\"");
        assert_eq!(ApplicationStatus::New.to_string(), "new");
    }

    #[test]
    fn test_active_status() {
        assert!(ApplicationStatus::New.is_active());
        assert!(ApplicationStatus::InProgress.is_active());
        assert!(!ApplicationStatus::Completed.is_active());
    }

    #[test]
    fn test_team_category_from_name() {
        assert_eq!(TeamCategory::from_team_name("водосеть"), TeamCategory::Water);
        assert_eq!(TeamCategory::from_team_name(" Канализация "), TeamCategory::Sewer);
        assert_eq!(TeamCategory::from_team_name("WATER"), TeamCategory::Water);
        assert_eq!(TeamCategory::from_team_name("sewer"), TeamCategory::Sewer);
        assert_eq!(TeamCategory::from_team_name("аварийная"), TeamCategory::Other);
    }

    #[test]
    fn test_valid_location_filters_nan() {
        let record = ApplicationRecord::new(1, ApplicationStatus::New).at(f64::NAN, 53.0);
        assert!(record.location.is_some());
        assert!(record.valid_location().is_none());

        let record = ApplicationRecord::new(2, ApplicationStatus::New).at(56.0, 53.0);
        assert_eq!(record.valid_location(), Some(LatLng::new(56.0, 53.0)));
    }

    #[test]
    fn test_builder() {
        let record = ApplicationRecord::new(7, ApplicationStatus::InProgress)
            .at(56.4767, 53.8036)
            .team("водосеть")
            .on_line(12);
        assert_eq!(record.team_category(), Some(TeamCategory::Water));
        assert_eq!(record.line_id, Some(12));
        assert!(record.is_active());
    }
}
