//! pipenet geo - pipe association, pipe lengths, and marker clustering
//!
//! Everything here is a pure function of its arguments: no I/O, no shared
//! state, nothing that can fail. Malformed input (missing or NaN
//! coordinates, degenerate lines) degrades to a documented sentinel such as
//! `false`, `None` or "left out of the grouping".

pub mod association;
pub mod cluster;
pub mod index;
pub mod length;

pub use association::{associate, distance_to_polyline, is_point_near_polyline, AssociationResult};
pub use cluster::{active_applications, bucket_key, group_by_location, ClusterCounts, ClusterGroup, MarkerTone};
pub use index::{pipe_has_open_applications, resolve_pipe, PipeIndex, PipeMatch, PipeResolution};
pub use length::{
    display_length, flow_arrows, ground_track_length, haversine_distance, pipe_length,
    polyline_length, polyline_midpoint, FlowArrow, LengthSource, PipeLength,
};
