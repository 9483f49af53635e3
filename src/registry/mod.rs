//! Declared type descriptors and the resolver that maps them to tables

pub mod descriptor;
pub mod resolver;

pub use descriptor::*;
pub use resolver::*;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Load a registry file: a JSON array of type descriptors
pub fn load_registry(path: &Path) -> Result<Vec<TypeDescriptor>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read registry: {:?}", path))?;
    let registry: Vec<TypeDescriptor> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse registry: {:?}", path))?;

    tracing::debug!(?path, types = registry.len(), "loaded registry");
    Ok(registry)
}
