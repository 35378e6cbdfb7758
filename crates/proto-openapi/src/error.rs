//! Typed error enum for the `proto-openapi` library API.
//!
//! Generation itself degrades rather than fails; the variants below cover
//! the edges: reading input, decoding descriptors, parsing options and
//! rendering the document. The binary converts these to `anyhow::Error`
//! (standalone mode) or to the plugin response's `error` field (plugin mode).

/// Errors produced by `proto-openapi` library operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// File I/O failure (reading config or descriptor files).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing (config) or serialization (document) failure.
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Proto `CodeGeneratorRequest` / `FileDescriptorSet` decoding failure.
    #[error("failed to decode proto descriptor: {0}")]
    ProtoDecode(#[from] prost::DecodeError),

    /// A plugin parameter was not recognized or had an unusable value.
    ///
    /// Recognized keys are `version`, `title`, `description`, `naming` and
    /// `validate`.
    #[error("invalid plugin parameter '{key}={value}'")]
    InvalidParameter {
        /// Parameter key as given.
        key: String,
        /// Parameter value as given.
        value: String,
    },
}

/// Convenience alias used throughout the library's public API.
pub type Result<T> = std::result::Result<T, Error>;
