//! pipenet core - domain models, storage-boundary decoding, and configuration
//!
//! This crate holds the typed records the geospatial engine works on and the
//! single place where raw storage rows (GeoJSON `[lng, lat]` geometries,
//! nullable decimal coordinates) become those records.

pub mod config;
pub mod error;
pub mod models;
pub mod rows;

pub use error::{PipenetError, Result};
