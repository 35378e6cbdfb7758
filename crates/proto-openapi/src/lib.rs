#![allow(clippy::doc_markdown)] // "OpenAPI" proper noun throughout
//! OpenAPI 3.0.3 generation from annotated protobuf descriptors.
//!
//! Reads services annotated with `google.api.http`, messages with
//! `google.api.resource`, fields with `google.api.field_behavior` and
//! (optionally) `validate.rules`, and produces one OpenAPI document:
//!
//! 1. every HTTP-bound method becomes an operation under its rewritten path
//! 2. every message reachable from an operation becomes a component schema
//! 3. tags, paths and schemas are sorted so output is stable across runs
//!
//! # As a `protoc` plugin
//!
//! ```text
//! protoc --openapi_out=naming=proto,validate=true:out/ -I proto library/v1/library.proto
//! ```
//!
//! # As a library
//!
//! ```no_run
//! use prost::Message;
//! use proto_openapi::{build_document, render, Configuration, FileDescriptorSet, ProtoSet};
//!
//! let bytes = std::fs::read("descriptor.bin")?;
//! let set = FileDescriptorSet::decode(bytes.as_slice())?;
//! let pool = ProtoSet::new(&set.file, |name| name.starts_with("library/"));
//! let yaml = render(&build_document(&pool, &Configuration::default()))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod generator;
mod naming;
pub mod openapi;
mod plugin;
mod render;
mod schema;
mod validate;

pub use config::{Configuration, Naming, DEFAULT_VERSION};
pub use error::{Error, Result};
pub use generator::build_document;
pub use plugin::{generate, generate_with, respond, run};
pub use proto_openapi_core::descriptor;
pub use proto_openapi_core::descriptor::{CodeGeneratorRequest, FileDescriptorSet};
pub use proto_openapi_core::walk::ProtoSet;
pub use render::{render, OUTPUT_FILE};
