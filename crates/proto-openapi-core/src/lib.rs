//! Protobuf descriptor types and traversal for the proto-openapi generator.
//!
//! This crate provides custom [`prost::Message`] types that preserve the
//! option extensions standard `prost_types` descriptors drop during decoding:
//! `google.api.http`, `google.api.resource`, `google.api.field_behavior` and
//! `validate.rules`. On top of them, [`walk::ProtoSet`] presents files,
//! services, methods, messages and fields in declaration order with their
//! leading comments resolved.
//!
//! You should not need to depend on this crate directly; use
//! `proto-openapi` instead.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod descriptor;
pub mod walk;
