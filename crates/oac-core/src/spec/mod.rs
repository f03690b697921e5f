pub mod operation;
pub mod tree;

pub use operation::{OperationSpec, ParameterLocation};
pub use tree::{SpecTree, lookup};

use std::path::Path;

use crate::error::SpecError;

/// Supported specification formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
}

impl SpecFormat {
    /// File extensions classified as this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            SpecFormat::Json => &["json"],
            SpecFormat::Yaml => &["yaml", "yml"],
        }
    }

    /// Classify a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<SpecFormat> {
        let ext = ext.to_ascii_lowercase();
        [SpecFormat::Json, SpecFormat::Yaml]
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
    }
}

/// Parse a spec document from JSON.
pub fn from_json(input: &str) -> Result<SpecTree, SpecError> {
    Ok(SpecTree::new(serde_json::from_str(input)?))
}

/// Parse a spec document from YAML.
pub fn from_yaml(input: &str) -> Result<SpecTree, SpecError> {
    Ok(SpecTree::new(serde_yaml_ng::from_str(input)?))
}

/// Parse a spec document with an explicit format.
pub fn from_str(input: &str, format: SpecFormat) -> Result<SpecTree, SpecError> {
    match format {
        SpecFormat::Json => from_json(input),
        SpecFormat::Yaml => from_yaml(input),
    }
}

/// Load a spec from a local file; the file extension picks the format.
pub fn from_file(path: impl AsRef<Path>) -> Result<SpecTree, SpecError> {
    let path = path.as_ref();
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(SpecFormat::from_extension)
        .ok_or(SpecError::UnknownFormat)?;
    let source = std::fs::read_to_string(path)?;
    from_str(&source, format)
}

/// Classify fetched content by attempting a JSON parse first, falling back
/// to YAML. Used for network sources where no file extension is available.
pub fn sniff(source: &str) -> Result<SpecTree, SpecError> {
    match from_json(source) {
        Ok(tree) => Ok(tree),
        Err(_) => from_yaml(source),
    }
}
