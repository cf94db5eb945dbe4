use std::fs;
use std::path::Path;
use anyhow::{Context as AnyhowContext, Result};
use crate::dsl::Document;

pub fn load_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read chain document from {}", path.display()))?;
    parse_document(&content).with_context(|| format!("Failed to parse chain document {}", path.display()))
}

/// Parses YAML (and therefore JSON) document text.
pub fn parse_document(content: &str) -> Result<Document> {
    let document: Document = serde_yaml::from_str(content)?;
    Ok(document)
}
