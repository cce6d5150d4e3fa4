//! Document storage
//!
//! Scenarios and results are stored as YAML or JSON, chosen by file
//! extension (`.json` is JSON, anything else YAML).

use std::fs;
use std::path::Path;

use lifeplan_core::model::Scenario;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::util::io::atomic_write;

/// Error types for storage operations
#[derive(Debug)]
pub enum StorageError {
    Io(String),
    Parse(String),
    Serialize(String),
    Invalid(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(msg) => write!(f, "IO error: {msg}"),
            StorageError::Parse(msg) => write!(f, "Parse error: {msg}"),
            StorageError::Serialize(msg) => write!(f, "Serialization error: {msg}"),
            StorageError::Invalid(msg) => write!(f, "Invalid data: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }

    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, String> {
        match self {
            DocumentFormat::Yaml => serde_saphyr::from_str(content).map_err(|e| e.to_string()),
            DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }

    pub fn render<T: Serialize>(self, value: &T) -> Result<String, String> {
        match self {
            DocumentFormat::Yaml => serde_saphyr::to_string(value).map_err(|e| e.to_string()),
            DocumentFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
        }
    }
}

/// Read and parse a YAML or JSON document
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let content = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {e}", path.display())))?;
    DocumentFormat::from_path(path)
        .parse(&content)
        .map_err(|e| StorageError::Parse(format!("Failed to parse {}: {e}", path.display())))
}

/// Serialize `value` and write it atomically to `path`
pub fn save_document<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let content = DocumentFormat::from_path(path).render(value).map_err(|e| {
        StorageError::Serialize(format!("Failed to serialize {}: {e}", path.display()))
    })?;
    atomic_write(path, &content)
        .map_err(|e| StorageError::Io(format!("Failed to write {}: {e}", path.display())))
}

pub fn load_scenario(path: &Path) -> Result<Scenario, StorageError> {
    let scenario: Scenario = load_document(path)?;
    tracing::debug!(
        name = %scenario.name,
        events = scenario.events.len(),
        investments = scenario.investments.len(),
        "Loaded scenario"
    );
    Ok(scenario)
}
