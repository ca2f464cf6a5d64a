//! Output of the documentation object as YAML or JSON.

use crate::collector::ApiDocumentation;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes the documentation to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &ApiDocumentation) -> Result<String> {
    debug!("Serializing {} endpoints to YAML", doc.apis.len());
    serde_yaml::to_string(doc).context("Failed to serialize API documentation to YAML")
}

/// Serializes the documentation to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &ApiDocumentation) -> Result<String> {
    debug!("Serializing {} endpoints to JSON", doc.apis.len());
    serde_json::to_string_pretty(doc).context("Failed to serialize API documentation to JSON")
}

/// Writes string content to a file, creating parent directories as needed and
/// overwriting any existing file.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
