//! Reading exported application and layer object payloads

use anyhow::{Context, Result};
use pipenet_core::models::{ApplicationRecord, NetworkObject};
use pipenet_core::rows::{decode_applications, decode_network, Decoded};
use std::fs;
use std::path::Path;

use crate::output::OutputWriter;

pub fn read_applications(path: &Path, output: &OutputWriter) -> Result<Vec<ApplicationRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read applications from {}", path.display()))?;
    let decoded = decode_applications(&content)
        .with_context(|| format!("Invalid applications payload in {}", path.display()))?;
    Ok(report_rejected(decoded, "application", output))
}

pub fn read_network(path: &Path, output: &OutputWriter) -> Result<Vec<NetworkObject>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read layer objects from {}", path.display()))?;
    let decoded = decode_network(&content)
        .with_context(|| format!("Invalid layer objects payload in {}", path.display()))?;
    Ok(report_rejected(decoded, "layer object", output))
}

fn report_rejected<T>(decoded: Decoded<T>, what: &str, output: &OutputWriter) -> Vec<T> {
    if !decoded.rejected.is_empty() {
        output.warning(format!(
            "Skipped {} {} row(s) that could not be decoded",
            decoded.rejected.len(),
            what
        ));
    }
    decoded.records
}
