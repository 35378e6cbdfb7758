//! YAML rendering of a finished document.

use crate::error::Result;
use crate::openapi::Document;

/// File name the plugin writes.
pub const OUTPUT_FILE: &str = "openapi.yaml";

const BANNER: &str = "\
# Generated with protoc-gen-openapi
# Do not edit: regenerate from the protobuf sources.
";

/// Render `document` as YAML, prefixed with a two-line comment banner.
///
/// # Errors
///
/// Returns [`Error::Yaml`](crate::Error::Yaml) if serialization fails.
pub fn render(document: &Document) -> Result<String> {
    let yaml = serde_yaml_ng::to_string(document)?;
    Ok(format!("{BANNER}\n{yaml}"))
}
