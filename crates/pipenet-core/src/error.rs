//! Error types for pipenet

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipenetError {
    // Geometry errors
    #[error("Invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("Invalid geometry at feature {feature_id}: {reason}")]
    InvalidGeometry { feature_id: String, reason: String },

    #[error("Unsupported geometry type {geometry_type} at feature {feature_id}")]
    UnsupportedGeometry {
        feature_id: String,
        geometry_type: String,
    },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PipenetError {
    fn from(err: serde_json::Error) -> Self {
        PipenetError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipenetError>;
