//! Storage-boundary decoding.
//!
//! Rows arrive as JSON exactly as the REST layer serves them: coordinates may
//! be numbers, decimal strings or null, geometries are GeoJSON with
//! `[lng, lat]` positions, and optional columns may be missing altogether.
//! Everything is converted to the typed models here, once. A bad row is
//! rejected on its own and never aborts the batch it came in.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{PipenetError, Result};
use crate::models::{
    ApplicationRecord, ApplicationStatus, LatLng, LayerKind, NetworkGeometry, NetworkObject,
    ObjectKind, PipeAttributes, Polyline, TeamRef, Valve,
};

/// Read a nullable decimal column: number, decimal string, empty string or null.
///
/// Anything unparsable or non-finite is treated as absent.
pub fn decimal_from_json(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::debug!(value = %s, "unparsable decimal column treated as absent");
                None
            }
        },
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn lenient_decimal<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_json))
}

/// `{lat, lng}` object used by the REST payload
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CoordinatesRow {
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TeamRow {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

/// A service application row, either flat from SQL or shaped by the REST layer
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApplicationRow {
    pub id: i64,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub coordinates: Option<CoordinatesRow>,

    #[serde(default)]
    pub line_id: Option<i64>,
    #[serde(default)]
    pub status: ApplicationStatus,

    #[serde(default)]
    pub team: Option<TeamRow>,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub team_name: Option<String>,

    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ApplicationRow {
    /// Nested `coordinates` wins over the flat columns
    fn raw_location(&self) -> (Option<f64>, Option<f64>) {
        match &self.coordinates {
            Some(c) => (c.lat, c.lng),
            None => (self.latitude, self.longitude),
        }
    }
}

impl From<ApplicationRow> for ApplicationRecord {
    fn from(row: ApplicationRow) -> Self {
        let location = match row.raw_location() {
            (Some(lat), Some(lng)) => {
                let location = LatLng::checked(lat, lng);
                if location.is_none() {
                    tracing::debug!(id = row.id, lat, lng, "application coordinates out of range");
                }
                location
            }
            _ => None,
        };

        let team = match (row.team, row.team_name) {
            (Some(team), _) => Some(TeamRef::new(team.id, team.name)),
            (None, Some(name)) => Some(TeamRef::new(row.team_id, name)),
            (None, None) => None,
        };

        ApplicationRecord {
            id: row.id,
            location,
            line_id: row.line_id,
            status: row.status,
            team,
            address: row.address,
            description: row.description,
            created_at: row.created_at,
            completed_at: row.completed_at,
        }
    }
}

/// A layer object row (`layer_objects` table)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkObjectRow {
    pub id: i64,
    pub layer_type: LayerKind,
    pub object_type: ObjectKind,
    pub geojson: Value,

    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub pipe_size: Option<String>,
    #[serde(default)]
    pub pipe_material: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub pipe_length: Option<f64>,
    #[serde(default)]
    pub balance_delimitation: Option<String>,

    #[serde(default)]
    pub valves: Vec<Valve>,
}

impl TryFrom<NetworkObjectRow> for NetworkObject {
    type Error = PipenetError;

    fn try_from(row: NetworkObjectRow) -> Result<Self> {
        let feature_id = row.id.to_string();
        let geometry = geometry_from_geojson(&feature_id, &row.geojson)?;

        match (row.object_type, &geometry) {
            (ObjectKind::Line, NetworkGeometry::Line(_))
            | (ObjectKind::Well | ObjectKind::Chamber, NetworkGeometry::Point(_)) => {}
            (kind, _) => {
                return Err(PipenetError::InvalidGeometry {
                    feature_id,
                    reason: format!("geometry does not match object type {}", kind.as_str()),
                })
            }
        }

        Ok(NetworkObject {
            id: row.id,
            layer: row.layer_type,
            kind: row.object_type,
            geometry,
            address: row.address,
            description: row.description,
            pipe: PipeAttributes {
                size: row.pipe_size,
                material: row.pipe_material,
                manual_length_m: row.pipe_length,
                balance_delimitation: row.balance_delimitation,
            },
            valves: row.valves,
        })
    }
}

/// Convert a GeoJSON `Point` or `LineString` into a typed geometry.
///
/// Accepts the geometry as a JSON object or as JSON text (some drivers hand
/// `jsonb` back as a string).
pub fn geometry_from_geojson(feature_id: &str, value: &Value) -> Result<NetworkGeometry> {
    let invalid = |reason: String| PipenetError::InvalidGeometry {
        feature_id: feature_id.to_string(),
        reason,
    };

    let object = match value {
        Value::String(text) => serde_json::from_str::<Value>(text)
            .map_err(|e| invalid(format!("geojson text is not JSON: {}", e)))?,
        other => other.clone(),
    };

    let geometry: geojson::Geometry = serde_json::from_value(object)
        .map_err(|e| invalid(format!("not a GeoJSON geometry: {}", e)))?;

    match geometry.value {
        geojson::Value::Point(position) => {
            let at = LatLng::from_geojson_position(&position)
                .ok_or_else(|| invalid("point needs [lng, lat]".to_string()))?;
            if !at.is_valid() {
                return Err(PipenetError::InvalidCoordinate { lat: at.lat, lng: at.lng });
            }
            Ok(NetworkGeometry::Point(at))
        }
        geojson::Value::LineString(positions) => {
            let line = Polyline::from_geojson_positions(&positions)
                .ok_or_else(|| invalid("every line position needs [lng, lat]".to_string()))?;
            if !line.is_valid() {
                return Err(invalid("line has an out-of-range vertex".to_string()));
            }
            Ok(NetworkGeometry::Line(line))
        }
        other => Err(PipenetError::UnsupportedGeometry {
            feature_id: feature_id.to_string(),
            geometry_type: geojson_type_name(&other).to_string(),
        }),
    }
}

fn geojson_type_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Serialize a typed geometry back to GeoJSON (`[lng, lat]` order)
pub fn geometry_to_geojson(geometry: &NetworkGeometry) -> Value {
    let value = match geometry {
        NetworkGeometry::Point(at) => geojson::Value::Point(at.to_geojson_position()),
        NetworkGeometry::Line(line) => geojson::Value::LineString(line.to_geojson_positions()),
    };
    serde_json::to_value(geojson::Geometry::new(value)).unwrap_or(Value::Null)
}

/// A row that could not be decoded
#[derive(Debug)]
pub struct RejectedRow {
    pub index: usize,
    pub id: Option<i64>,
    pub error: PipenetError,
}

/// Outcome of decoding a batch of rows
#[derive(Debug)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub rejected: Vec<RejectedRow>,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self { records: Vec::new(), rejected: Vec::new() }
    }
}

/// Split a payload into raw rows.
///
/// Accepts a bare JSON array or an object wrapping the array under `key`
/// (`{"applications": [...]}`, `{"objects": [...]}`).
pub fn payload_rows(content: &str, key: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(content)? {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(rows)) => Ok(rows),
            Some(_) => Err(PipenetError::Serialization(format!("'{}' is not an array", key))),
            None => Err(PipenetError::Serialization(format!("missing '{}' array", key))),
        },
        _ => Err(PipenetError::Serialization(
            "expected a JSON array or object of rows".to_string(),
        )),
    }
}

fn decode_rows<R, T, F>(rows: Vec<Value>, convert: F) -> Decoded<T>
where
    R: DeserializeOwned,
    F: Fn(R) -> Result<T>,
{
    let mut decoded = Decoded::default();

    for (index, raw) in rows.into_iter().enumerate() {
        let id = raw.get("id").and_then(Value::as_i64);
        let result = serde_json::from_value::<R>(raw)
            .map_err(PipenetError::from)
            .and_then(&convert);

        match result {
            Ok(record) => decoded.records.push(record),
            Err(error) => {
                tracing::warn!(index, ?id, %error, "skipping row");
                decoded.rejected.push(RejectedRow { index, id, error });
            }
        }
    }

    decoded
}

/// Decode an applications payload
pub fn decode_applications(content: &str) -> Result<Decoded<ApplicationRecord>> {
    let rows = payload_rows(content, "applications")?;
    Ok(decode_rows(rows, |row: ApplicationRow| Ok(ApplicationRecord::from(row))))
}

/// Decode a layer objects payload
pub fn decode_network(content: &str) -> Result<Decoded<NetworkObject>> {
    let rows = payload_rows(content, "objects")?;
    Ok(decode_rows(rows, |row: NetworkObjectRow| NetworkObject::try_from(row)))
}
