//! Loading structure specifications from JSON

use crate::error::ExtractorError;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use wordseer_domain::StructureSpec;

/// Decode a structure specification from a JSON string
pub fn parse_structure(json: &str) -> Result<StructureSpec, ExtractorError> {
    let structure: StructureSpec = serde_json::from_str(json)?;
    debug!(
        "Loaded structure '{}' ({} levels deep)",
        structure.name(),
        structure.depth()
    );
    Ok(structure)
}

/// Decode a structure specification from a reader
pub fn read_structure<R: Read>(mut reader: R) -> Result<StructureSpec, ExtractorError> {
    let mut json = String::new();
    reader.read_to_string(&mut json)?;
    parse_structure(&json)
}

/// Decode a structure specification file
pub fn load_structure(path: impl AsRef<Path>) -> Result<StructureSpec, ExtractorError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .map_err(|e| ExtractorError::Io(format!("{}: {}", path.display(), e)))?;
    parse_structure(&json)
}
