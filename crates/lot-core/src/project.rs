//! Lot document import/export
//!
//! The exported shape is `{ "version": <int>, "lot": { ... } }`. Imports
//! check the document version before trusting the rest of the payload.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::FORMAT_VERSION;
use crate::lot::Lot;

/// Serialized lot together with its format version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotDocument {
    pub version: u32,
    pub lot: Lot,
}

impl LotDocument {
    pub fn new(lot: Lot) -> Self {
        Self {
            version: FORMAT_VERSION,
            lot,
        }
    }
}

/// Persistence and configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("JSON error: {0}")]
    Json(String),
    #[error("Document has no version field")]
    MissingVersion,
    #[error("Document version is not a number: {0}")]
    InvalidVersion(String),
    #[error("Unsupported document version {0}")]
    UnsupportedVersion(u64),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Serialize a lot as a pretty JSON document
pub fn export_json(lot: &Lot) -> Result<String, ProjectError> {
    serde_json::to_string_pretty(&LotDocument::new(lot.clone()))
        .map_err(|e| ProjectError::Json(e.to_string()))
}

/// Parse a lot document, validating its version first
pub fn import_json(text: &str) -> Result<Lot, ProjectError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ProjectError::Json(e.to_string()))?;

    let version = value.get("version").ok_or(ProjectError::MissingVersion)?;
    let version = version
        .as_u64()
        .ok_or_else(|| ProjectError::InvalidVersion(version.to_string()))?;
    if version > u64::from(FORMAT_VERSION) {
        return Err(ProjectError::UnsupportedVersion(version));
    }

    let document: LotDocument =
        serde_json::from_value(value).map_err(|e| ProjectError::Json(e.to_string()))?;
    tracing::info!(
        "Imported lot {}x{} with {} object(s), {} wall(s), {} tile(s)",
        document.lot.width,
        document.lot.depth,
        document.lot.objects().len(),
        document.lot.walls().len(),
        document.lot.floor().len()
    );
    Ok(document.lot)
}

/// Save a lot document to a file
pub fn save_lot(lot: &Lot, path: impl AsRef<Path>) -> Result<(), ProjectError> {
    let content = export_json(lot)?;
    std::fs::write(path.as_ref(), content).map_err(|e| ProjectError::Io(e.to_string()))
}

/// Load a lot document from a file
pub fn load_lot(path: impl AsRef<Path>) -> Result<Lot, ProjectError> {
    let content =
        std::fs::read_to_string(path.as_ref()).map_err(|e| ProjectError::Io(e.to_string()))?;
    import_json(&content)
}
