//! `protoc` plugin protocol: request in, response out.

use prost::Message;
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::CodeGeneratorResponse;
use proto_openapi_core::descriptor::CodeGeneratorRequest;
use proto_openapi_core::walk::ProtoSet;

use crate::config::Configuration;
use crate::error::Result;
use crate::generator::build_document;
use crate::render::{render, OUTPUT_FILE};

/// Generate the rendered document for a plugin request.
///
/// Options come from the request's parameter string.
///
/// # Errors
///
/// Returns an error if the parameter string is invalid or rendering fails.
pub fn generate(request: &CodeGeneratorRequest) -> Result<String> {
    let config = Configuration::from_parameter(request.parameter.as_deref().unwrap_or(""))?;
    generate_with(request, &config)
}

/// Generate the rendered document for a plugin request with explicit options.
///
/// # Errors
///
/// Returns an error if rendering fails.
pub fn generate_with(request: &CodeGeneratorRequest, config: &Configuration) -> Result<String> {
    let pool = ProtoSet::from_request(request);
    tracing::debug!(
        files = pool.files().len(),
        generate = request.file_to_generate.len(),
        "building document"
    );
    render(&build_document(&pool, config))
}

/// Answer a plugin request. Failures travel in the response's `error`
/// field, as the plugin protocol expects.
#[must_use]
pub fn respond(request: &CodeGeneratorRequest) -> CodeGeneratorResponse {
    let mut response = CodeGeneratorResponse {
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    };

    match generate(request) {
        Ok(content) => response.file.push(File {
            name: Some(OUTPUT_FILE.to_string()),
            content: Some(content),
            ..Default::default()
        }),
        Err(err) => {
            tracing::error!(error = %err, "generation failed");
            response.error = Some(err.to_string());
        }
    }

    response
}

/// Decode an encoded `CodeGeneratorRequest`, answer it and encode the
/// response.
///
/// # Errors
///
/// Returns [`Error::ProtoDecode`](crate::Error::ProtoDecode) if `input` is
/// not a valid request. Generation failures are carried in the response.
pub fn run(input: &[u8]) -> Result<Vec<u8>> {
    let request = CodeGeneratorRequest::decode(input)?;
    Ok(respond(&request).encode_to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_request_yields_one_file() {
        let response = respond(&CodeGeneratorRequest::default());
        assert!(response.error.is_none());
        assert_eq!(response.file.len(), 1);
        assert_eq!(response.file[0].name.as_deref(), Some(OUTPUT_FILE));
        assert_eq!(response.supported_features, Some(1));
    }

    #[test]
    fn run_answers_encoded_request() {
        let request = CodeGeneratorRequest {
            parameter: Some("naming=proto".to_string()),
            ..Default::default()
        };
        let output = run(&request.encode_to_vec()).unwrap();
        let response = CodeGeneratorResponse::decode(output.as_slice()).unwrap();
        assert!(response.error.is_none());
        assert_eq!(response.file[0].name.as_deref(), Some(OUTPUT_FILE));
    }

    #[test]
    fn run_rejects_truncated_request() {
        // Field 1, length 5, no payload.
        let result = run(&[0x0a, 0x05]);
        assert!(matches!(result, Err(Error::ProtoDecode(_))));
    }

    #[test]
    fn bad_parameter_is_reported_in_response() {
        let request = CodeGeneratorRequest {
            parameter: Some("validate=sometimes".to_string()),
            ..Default::default()
        };
        let response = respond(&request);
        assert!(response.file.is_empty());
        assert!(response.error.unwrap().contains("validate=sometimes"));
    }
}
