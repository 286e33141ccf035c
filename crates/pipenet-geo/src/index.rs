//! R-tree over pipe centerlines.
//!
//! Envelopes are stored in `geo` axis order (`x = lng, y = lat`).

use std::collections::BTreeSet;

use geo::algorithm::bounding_rect::BoundingRect;
use pipenet_core::models::{
    ApplicationRecord, LatLng, LayerKind, NetworkObject, Polyline, Tolerance, ToleranceUnit,
};
use rstar::{RTree, RTreeObject, AABB};
use serde::Serialize;
use tracing::debug;

use crate::association::{associate, is_point_near_polyline};

/// A pipe stored in the index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPipe {
    pub id: i64,
    pub layer: Option<LayerKind>,
    pub polyline: Polyline,
    envelope: AABB<[f64; 2]>,
}

impl IndexedPipe {
    /// `None` when the line is empty or has an invalid vertex
    pub fn new(id: i64, layer: Option<LayerKind>, polyline: Polyline) -> Option<Self> {
        if !polyline.is_valid() {
            return None;
        }
        let rect = polyline.to_geo_line_string().bounding_rect()?;
        let (min, max) = (rect.min(), rect.max());
        Some(Self {
            id,
            layer,
            polyline,
            envelope: AABB::from_corners([min.x, min.y], [max.x, max.y]),
        })
    }
}

impl RTreeObject for IndexedPipe {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// A pipe close enough to a point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PipeMatch {
    pub pipe_id: i64,
    /// In the tolerance's unit
    pub distance: f64,
}

/// Spatial index of the pipes of a network
pub struct PipeIndex {
    tree: RTree<IndexedPipe>,
    ids: BTreeSet<i64>,
}

impl PipeIndex {
    /// Index every line object of a network; wells and chambers are ignored
    pub fn from_network<'a, I>(objects: I) -> Self
    where
        I: IntoIterator<Item = &'a NetworkObject>,
    {
        Self::from_pipes(objects.into_iter().filter_map(|object| {
            let polyline = object.polyline()?;
            IndexedPipe::new(object.id, Some(object.layer), polyline.clone()).or_else(|| {
                debug!(pipe_id = object.id, "Pipe has no indexable geometry, skipping");
                None
            })
        }))
    }

    /// Index bare `(id, centerline)` pairs; unusable lines are skipped
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (i64, Polyline)>,
    {
        Self::from_pipes(
            lines
                .into_iter()
                .filter_map(|(id, polyline)| IndexedPipe::new(id, None, polyline)),
        )
    }

    fn from_pipes(pipes: impl Iterator<Item = IndexedPipe>) -> Self {
        let pipes: Vec<IndexedPipe> = pipes.collect();
        let ids = pipes.iter().map(|pipe| pipe.id).collect();
        Self {
            tree: RTree::bulk_load(pipes),
            ids,
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    pub fn contains(&self, pipe_id: i64) -> bool {
        self.ids.contains(&pipe_id)
    }

    /// Pipes whose envelope comes within `tolerance` of `point`, by id.
    ///
    /// A superset of the pipes actually within tolerance. Meter tolerances
    /// reach across the antimeridian the same way the association does.
    pub fn candidates(&self, point: LatLng, tolerance: Tolerance) -> Vec<&IndexedPipe> {
        if !point.is_valid() || !tolerance.is_usable() {
            return Vec::new();
        }
        let (dlat, dlng) = tolerance.degree_radius_at(point.lat);
        let (south, north) = (point.lat - dlat, point.lat + dlat);
        let (west, east) = (point.lng - dlng, point.lng + dlng);

        let mut spans = vec![(west, east)];
        if tolerance.unit == ToleranceUnit::Meters {
            if west < -180.0 {
                spans.push((west + 360.0, 180.0));
            }
            if east > 180.0 {
                spans.push((-180.0, east - 360.0));
            }
        }

        let mut found: Vec<&IndexedPipe> = Vec::new();
        for (west, east) in spans {
            let query = AABB::from_corners([west, south], [east, north]);
            found.extend(self.tree.locate_in_envelope_intersecting(&query));
        }
        found.sort_by_key(|pipe| (pipe.id, *pipe as *const IndexedPipe as usize));
        found.dedup_by(|a, b| std::ptr::eq(*a, *b));
        found
    }

    /// Closest pipe within tolerance; the lower id wins a tie
    pub fn nearest_pipe(&self, point: LatLng, tolerance: Tolerance) -> Option<PipeMatch> {
        self.candidates(point, tolerance)
            .into_iter()
            .filter_map(|pipe| {
                let result = associate(point, &pipe.polyline, tolerance);
                match (result.is_near, result.min_distance) {
                    (true, Some(distance)) => Some(PipeMatch {
                        pipe_id: pipe.id,
                        distance,
                    }),
                    _ => None,
                }
            })
            .fold(None, |best: Option<PipeMatch>, candidate| match best {
                Some(best) if (best.distance, best.pipe_id) <= (candidate.distance, candidate.pipe_id) => {
                    Some(best)
                }
                _ => Some(candidate),
            })
    }

    /// Ids of indexed pipes with at least one open application on them
    pub fn pipes_with_open_applications<'a, I>(&self, applications: I, tolerance: Tolerance) -> BTreeSet<i64>
    where
        I: IntoIterator<Item = &'a ApplicationRecord>,
    {
        let mut pipes = BTreeSet::new();
        for application in applications.into_iter().filter(|a| a.is_active()) {
            match (application.line_id, application.valid_location()) {
                (Some(line_id), _) => {
                    if self.contains(line_id) {
                        pipes.insert(line_id);
                    }
                }
                (None, Some(location)) => {
                    pipes.extend(
                        self.candidates(location, tolerance)
                            .into_iter()
                            .filter(|pipe| is_point_near_polyline(location, &pipe.polyline, tolerance))
                            .map(|pipe| pipe.id),
                    );
                }
                (None, None) => {}
            }
        }
        pipes
    }
}

/// How an application was tied to a pipe
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipeResolution {
    /// The application was created on this pipe
    Explicit { pipe_id: i64 },
    /// Closest pipe within tolerance of the application's location
    Nearest(PipeMatch),
    Unresolved,
}

impl PipeResolution {
    pub fn pipe_id(&self) -> Option<i64> {
        match self {
            PipeResolution::Explicit { pipe_id } => Some(*pipe_id),
            PipeResolution::Nearest(found) => Some(found.pipe_id),
            PipeResolution::Unresolved => None,
        }
    }
}

/// Pipe an application belongs to: its explicit `line_id`, else the nearest
/// pipe within tolerance.
pub fn resolve_pipe(application: &ApplicationRecord, index: &PipeIndex, tolerance: Tolerance) -> PipeResolution {
    if let Some(pipe_id) = application.line_id {
        return PipeResolution::Explicit { pipe_id };
    }
    application
        .valid_location()
        .and_then(|location| index.nearest_pipe(location, tolerance))
        .map_or(PipeResolution::Unresolved, PipeResolution::Nearest)
}

/// Whether a pipe has unfinished work on it.
///
/// Applications carrying a `line_id` match by id only; the rest match when
/// their location is within tolerance of the pipe.
pub fn pipe_has_open_applications<'a, I>(
    pipe_id: i64,
    polyline: &Polyline,
    applications: I,
    tolerance: Tolerance,
) -> bool
where
    I: IntoIterator<Item = &'a ApplicationRecord>,
{
    applications
        .into_iter()
        .filter(|application| application.is_active())
        .any(|application| match application.line_id {
            Some(line_id) => line_id == pipe_id,
            None => application
                .valid_location()
                .is_some_and(|location| is_point_near_polyline(location, polyline, tolerance)),
        })
}
