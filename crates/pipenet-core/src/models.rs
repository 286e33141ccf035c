pub mod application;
pub mod location;
pub mod mode;
pub mod network;
pub mod tolerance;

pub use application::{ApplicationRecord, ApplicationStatus, TeamCategory, TeamRef};
pub use location::{LatLng, Polyline, EARTH_RADIUS_METERS, METERS_PER_DEGREE};
pub use mode::{Anchor, MapAction, MapEvent, MapMode, Tool, Transition};
pub use network::{
    LayerKind, NetworkGeometry, NetworkObject, ObjectKind, PipeAttributes, Valve, ValveStatus,
};
pub use tolerance::{Tolerance, ToleranceUnit};
