//! Map tool modes.
//!
//! The map is always in exactly one mode. Every user gesture is a [`MapEvent`];
//! [`MapMode::apply`] returns the next mode and, when the gesture completes an
//! edit, the [`MapAction`] the caller should carry out.

use serde::{Deserialize, Serialize};

use super::location::LatLng;
use super::network::{LayerKind, ObjectKind};

/// Editing tools offered by the map toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Well,
    Chamber,
    Line,
    HouseRelease,
}

/// Start or end of a line being drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Anchor {
    Point { at: LatLng },
    Well { id: i64, at: LatLng },
}

impl Anchor {
    pub fn location(&self) -> LatLng {
        match self {
            Anchor::Point { at } | Anchor::Well { at, .. } => *at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MapMode {
    #[default]
    Idle,
    PlacingWell {
        layer: LayerKind,
    },
    PlacingChamber {
        layer: LayerKind,
    },
    DrawingLine {
        layer: LayerKind,
        start: Option<Anchor>,
    },
    ConnectingWells {
        layer: LayerKind,
        start_well: i64,
    },
    ReleasingFromHouse {
        layer: LayerKind,
        house: Option<LatLng>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    SelectTool(Tool, LayerKind),
    MapClick(LatLng),
    WellClick { id: i64, layer: LayerKind, at: LatLng },
    StartConnection { well_id: i64, layer: LayerKind },
    Cancel,
}

/// Edit requested by a completed gesture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MapAction {
    OpenApplicationForm {
        at: LatLng,
    },
    PlaceObject {
        layer: LayerKind,
        kind: ObjectKind,
        at: LatLng,
    },
    CreateLine {
        layer: LayerKind,
        from: Anchor,
        to: Anchor,
    },
    ConnectWells {
        layer: LayerKind,
        from: i64,
        to: i64,
    },
    CreateServiceLine {
        layer: LayerKind,
        house: LatLng,
        connection: LatLng,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub mode: MapMode,
    pub action: Option<MapAction>,
}

impl Transition {
    fn to(mode: MapMode) -> Self {
        Self { mode, action: None }
    }

    fn with(mode: MapMode, action: MapAction) -> Self {
        Self { mode, action: Some(action) }
    }
}

impl MapMode {
    /// Mode entered when a toolbar tool is selected
    pub fn for_tool(tool: Tool, layer: LayerKind) -> Self {
        match tool {
            Tool::Well => MapMode::PlacingWell { layer },
            Tool::Chamber => MapMode::PlacingChamber { layer },
            Tool::Line => MapMode::DrawingLine { layer, start: None },
            Tool::HouseRelease => MapMode::ReleasingFromHouse { layer, house: None },
        }
    }

    /// Creating applications by clicking the map is only allowed when idle
    pub fn applications_blocked(&self) -> bool {
        !matches!(self, MapMode::Idle)
    }

    pub fn layer(&self) -> Option<LayerKind> {
        match self {
            MapMode::Idle => None,
            MapMode::PlacingWell { layer }
            | MapMode::PlacingChamber { layer }
            | MapMode::DrawingLine { layer, .. }
            | MapMode::ConnectingWells { layer, .. }
            | MapMode::ReleasingFromHouse { layer, .. } => Some(*layer),
        }
    }

    pub fn apply(self, event: MapEvent) -> Transition {
        let event = match event {
            MapEvent::Cancel => return Transition::to(MapMode::Idle),
            MapEvent::SelectTool(tool, layer) => {
                return Transition::to(MapMode::for_tool(tool, layer))
            }
            MapEvent::StartConnection { well_id, layer } => {
                return Transition::to(MapMode::ConnectingWells { layer, start_well: well_id })
            }
            MapEvent::MapClick(at) if !at.is_valid() => {
                tracing::debug!(lat = at.lat, lng = at.lng, "ignoring map click with invalid location");
                return Transition::to(self);
            }
            other => other,
        };

        match (self, event) {
            (MapMode::Idle, MapEvent::MapClick(at)) => {
                Transition::with(MapMode::Idle, MapAction::OpenApplicationForm { at })
            }

            (MapMode::PlacingWell { layer }, MapEvent::MapClick(at)) => Transition::with(
                MapMode::PlacingWell { layer },
                MapAction::PlaceObject { layer, kind: ObjectKind::Well, at },
            ),
            (MapMode::PlacingChamber { layer }, MapEvent::MapClick(at)) => Transition::with(
                MapMode::PlacingChamber { layer },
                MapAction::PlaceObject { layer, kind: ObjectKind::Chamber, at },
            ),

            (MapMode::DrawingLine { layer, start }, MapEvent::MapClick(at)) => {
                extend_line(layer, start, Anchor::Point { at })
            }
            (MapMode::DrawingLine { layer, start }, MapEvent::WellClick { id, layer: well_layer, at })
                if well_layer == layer =>
            {
                extend_line(layer, start, Anchor::Well { id, at })
            }

            (
                MapMode::ConnectingWells { layer, start_well },
                MapEvent::WellClick { id, layer: well_layer, .. },
            ) if well_layer == layer && id != start_well => Transition::with(
                MapMode::Idle,
                MapAction::ConnectWells { layer, from: start_well, to: id },
            ),

            (MapMode::ReleasingFromHouse { layer, house: None }, MapEvent::MapClick(at)) => {
                Transition::to(MapMode::ReleasingFromHouse { layer, house: Some(at) })
            }
            (
                MapMode::ReleasingFromHouse { layer, house: Some(house) },
                MapEvent::MapClick(connection) | MapEvent::WellClick { at: connection, .. },
            ) => Transition::with(
                MapMode::Idle,
                MapAction::CreateServiceLine { layer, house, connection },
            ),

            (mode, _) => Transition::to(mode),
        }
    }
}

/// Lines are drawn as a chain: each finished segment starts the next one.
fn extend_line(layer: LayerKind, start: Option<Anchor>, clicked: Anchor) -> Transition {
    match start {
        None => Transition::to(MapMode::DrawingLine { layer, start: Some(clicked) }),
        Some(from) => Transition::with(
            MapMode::DrawingLine { layer, start: Some(clicked) },
            MapAction::CreateLine { layer, from, to: clicked },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATER: LayerKind = LayerKind::Water;

    fn p(lat: f64, lng: f64) -> LatLng {
        LatLng::new(lat, lng)
    }

    #[test]
    fn test_idle_click_opens_application_form() {
        let t = MapMode::Idle.apply(MapEvent::MapClick(p(56.0, 53.0)));
        assert_eq!(t.mode, MapMode::Idle);
        assert_eq!(t.action, Some(MapAction::OpenApplicationForm { at: p(56.0, 53.0) }));
        assert!(!t.mode.applications_blocked());
    }

    #[test]
    fn test_invalid_click_is_ignored() {
        let t = MapMode::Idle.apply(MapEvent::MapClick(p(f64::NAN, 53.0)));
        assert_eq!(t.mode, MapMode::Idle);
        assert!(t.action.is_none());
    }

    #[test]
    fn test_placing_well_persists() {
        let mode = MapMode::Idle.apply(MapEvent::SelectTool(Tool::Well, WATER)).mode;
        assert!(mode.applications_blocked());

        let t = mode.apply(MapEvent::MapClick(p(1.0, 2.0)));
        assert_eq!(t.mode, MapMode::PlacingWell { layer: WATER });
        assert_eq!(
            t.action,
            Some(MapAction::PlaceObject { layer: WATER, kind: ObjectKind::Well, at: p(1.0, 2.0) })
        );
    }

    #[test]
    fn test_line_drawing_chains_segments() {
        let mode = MapMode::for_tool(Tool::Line, WATER);

        let t = mode.apply(MapEvent::WellClick { id: 5, layer: WATER, at: p(1.0, 1.0) });
        assert!(t.action.is_none());
        let first = Anchor::Well { id: 5, at: p(1.0, 1.0) };
        assert_eq!(t.mode, MapMode::DrawingLine { layer: WATER, start: Some(first) });

        let t = t.mode.apply(MapEvent::MapClick(p(2.0, 2.0)));
        let second = Anchor::Point { at: p(2.0, 2.0) };
        assert_eq!(t.action, Some(MapAction::CreateLine { layer: WATER, from: first, to: second }));
        assert_eq!(t.mode, MapMode::DrawingLine { layer: WATER, start: Some(second) });
    }

    #[test]
    fn test_line_ignores_wells_of_other_layer() {
        let mode = MapMode::for_tool(Tool::Line, WATER);
        let t = mode.clone().apply(MapEvent::WellClick {
            id: 5,
            layer: LayerKind::Sewer,
            at: p(1.0, 1.0),
        });
        assert_eq!(t.mode, mode);
        assert!(t.action.is_none());
    }

    #[test]
    fn test_connecting_wells() {
        let mode = MapMode::Idle.apply(MapEvent::StartConnection { well_id: 1, layer: WATER }).mode;
        assert_eq!(mode, MapMode::ConnectingWells { layer: WATER, start_well: 1 });

        // Same well and bare map clicks do nothing
        let t = mode.clone().apply(MapEvent::WellClick { id: 1, layer: WATER, at: p(0.0, 0.0) });
        assert_eq!(t.mode, mode);
        let t = mode.clone().apply(MapEvent::MapClick(p(0.0, 0.0)));
        assert_eq!(t.mode, mode);
        assert!(t.action.is_none());

        let t = mode.apply(MapEvent::WellClick { id: 2, layer: WATER, at: p(0.0, 0.0) });
        assert_eq!(t.mode, MapMode::Idle);
        assert_eq!(t.action, Some(MapAction::ConnectWells { layer: WATER, from: 1, to: 2 }));
    }

    #[test]
    fn test_house_release_two_clicks() {
        let mode = MapMode::for_tool(Tool::HouseRelease, LayerKind::Sewer);
        let t = mode.apply(MapEvent::MapClick(p(1.0, 1.0)));
        assert!(t.action.is_none());
        assert_eq!(
            t.mode,
            MapMode::ReleasingFromHouse { layer: LayerKind::Sewer, house: Some(p(1.0, 1.0)) }
        );

        let t = t.mode.apply(MapEvent::WellClick { id: 4, layer: LayerKind::Sewer, at: p(1.5, 1.5) });
        assert_eq!(t.mode, MapMode::Idle);
        assert_eq!(
            t.action,
            Some(MapAction::CreateServiceLine {
                layer: LayerKind::Sewer,
                house: p(1.0, 1.0),
                connection: p(1.5, 1.5),
            })
        );
    }

    #[test]
    fn test_cancel_and_tool_switch_from_any_mode() {
        let modes = vec![
            MapMode::PlacingChamber { layer: WATER },
            MapMode::DrawingLine { layer: WATER, start: Some(Anchor::Point { at: p(0.0, 0.0) }) },
            MapMode::ConnectingWells { layer: WATER, start_well: 3 },
            MapMode::ReleasingFromHouse { layer: WATER, house: Some(p(0.0, 0.0)) },
        ];
        for mode in modes {
            assert_eq!(mode.clone().apply(MapEvent::Cancel).mode, MapMode::Idle);
            assert_eq!(
                mode.apply(MapEvent::SelectTool(Tool::Well, LayerKind::Sewer)).mode,
                MapMode::PlacingWell { layer: LayerKind::Sewer }
            );
        }
    }

    #[test]
    fn test_layer_of_mode() {
        assert_eq!(MapMode::Idle.layer(), None);
        assert_eq!(MapMode::for_tool(Tool::Chamber, WATER).layer(), Some(WATER));
    }
}
