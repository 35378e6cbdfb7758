//! Generator options: document metadata, naming mode and validation toggle.
//!
//! Options arrive either as the `protoc` plugin parameter string or from a
//! YAML file for standalone use.
//!
//! # Parameter string
//!
//! ```text
//! protoc --openapi_out=naming=proto,validate=true,version=1.2.3:out/ ...
//! ```
//!
//! # File format
//!
//! ```yaml
//! # api/openapi/config.yaml
//! version: 1.2.3
//! title: Library API
//! description: Manages shelves and books.
//!
//! # `proto` keeps raw protobuf identifiers; anything else selects camelCase.
//! naming: json
//!
//! # Project `validate.rules` constraints onto schemas.
//! validate: true
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Document version used when none is configured.
pub const DEFAULT_VERSION: &str = "0.0.1";

/// How schema and property names are derived from protobuf identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Naming {
    /// Message names with the first letter upper-cased; field names from
    /// the field's canonical lowerCamelCase JSON name.
    #[default]
    Json,
    /// Raw protobuf identifiers, verbatim.
    Proto,
}

impl Naming {
    /// Parse a naming mode. Only `proto` is special; every other value
    /// selects [`Naming::Json`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "proto" => Self::Proto,
            "json" | "" => Self::Json,
            other => {
                tracing::warn!(naming = other, "unknown naming mode, using json");
                Self::Json
            }
        }
    }
}

impl From<String> for Naming {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

/// Options for one generator invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Document version (`info.version`).
    pub version: String,

    /// Document title (`info.title`). Empty means "infer when there is
    /// exactly one service".
    pub title: String,

    /// Document description (`info.description`).
    pub description: String,

    /// Naming mode for schemas, properties and parameters.
    pub naming: Naming,

    /// Project `validate.rules` constraints onto field schemas.
    pub validate: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            title: String::new(),
            description: String::new(),
            naming: Naming::default(),
            validate: false,
        }
    }
}

impl Configuration {
    /// Parse a `protoc` plugin parameter string (`key=value` pairs separated
    /// by commas). An empty string yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for unknown keys, pairs without
    /// `=`, or a `validate` value that is not a boolean.
    pub fn from_parameter(parameter: &str) -> Result<Self> {
        let mut config = Self::default();

        for pair in parameter.split(',').filter(|p| !p.trim().is_empty()) {
            let invalid = |key: &str, value: &str| Error::InvalidParameter {
                key: key.to_string(),
                value: value.to_string(),
            };

            let Some((key, value)) = pair.split_once('=') else {
                return Err(invalid(pair.trim(), ""));
            };
            let key = key.trim();

            match key {
                "version" => config.version = value.to_string(),
                "title" => config.title = value.to_string(),
                "description" => config.description = value.to_string(),
                "naming" => config.naming = Naming::parse(value),
                "validate" => {
                    config.validate = parse_bool(value).ok_or_else(|| invalid(key, value))?;
                }
                _ => return Err(invalid(key, value)),
            }
        }

        Ok(config)
    }

    /// Load options from a YAML file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Set the document version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the document title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the document description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the naming mode.
    #[must_use]
    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    /// Enable or disable validation-constraint projection.
    #[must_use]
    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

/// Boolean spellings accepted for flag values.
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "1" | "t" | "T" | "TRUE" | "True" => Some(true),
        "false" | "0" | "f" | "F" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_parameter_yields_defaults() {
        let config = Configuration::from_parameter("").unwrap();
        assert_eq!(config, Configuration::default());
        assert_eq!(config.version, "0.0.1");
        assert_eq!(config.naming, Naming::Json);
        assert!(!config.validate);
    }

    #[test]
    fn parameter_pairs_are_applied() {
        let config =
            Configuration::from_parameter("naming=proto,validate=true,version=1.2.3,title=Shelves")
                .unwrap();
        assert_eq!(config.naming, Naming::Proto);
        assert!(config.validate);
        assert_eq!(config.version, "1.2.3");
        assert_eq!(config.title, "Shelves");
    }

    #[test]
    fn unknown_naming_falls_back_to_json() {
        let config = Configuration::from_parameter("naming=snake").unwrap();
        assert_eq!(config.naming, Naming::Json);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = Configuration::from_parameter("flavour=vanilla").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidParameter { ref key, ref value } if key == "flavour" && value == "vanilla"
        ));
    }

    #[test]
    fn malformed_bool_is_rejected() {
        assert!(Configuration::from_parameter("validate=maybe").is_err());
    }

    #[test]
    fn pair_without_equals_is_rejected() {
        assert!(Configuration::from_parameter("validate").is_err());
    }

    #[test]
    fn builders_chain() {
        let config = Configuration::default()
            .with_version("2.0.0")
            .with_title("T")
            .with_description("D")
            .with_naming(Naming::Proto)
            .with_validate(true);
        assert_eq!(config.version, "2.0.0");
        assert_eq!(config.title, "T");
        assert_eq!(config.description, "D");
        assert_eq!(config.naming, Naming::Proto);
        assert!(config.validate);
    }

    #[test]
    fn deserialize_defaults() {
        let config: Configuration = serde_yaml_ng::from_str("{}").unwrap();
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn deserialize_full() {
        let yaml = indoc::indoc! {"
            version: 3.1.4
            title: Library
            description: Books.
            naming: proto
            validate: true
        "};
        let config: Configuration = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.version, "3.1.4");
        assert_eq!(config.title, "Library");
        assert_eq!(config.description, "Books.");
        assert_eq!(config.naming, Naming::Proto);
        assert!(config.validate);
    }

    #[test]
    fn load_from_file() {
        let dir = std::env::temp_dir().join("proto-openapi-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        std::fs::write(&path, "validate: true\n").unwrap();

        let config = Configuration::load(&path).unwrap();
        assert!(config.validate);
        // Defaults still apply
        assert_eq!(config.version, DEFAULT_VERSION);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_nonexistent_file_returns_error() {
        let result = Configuration::load(Path::new("/nonexistent/config.yaml"));
        assert!(result.is_err());
    }
}
