//! JSON and YAML encoding and decoding of whole documents.
//!
//! Decoding stamps the minor version parsed from the `openapi` field onto
//! every node, so a decoded document validates with the rules of the
//! version it declares.

use crate::error::{OpenApiError, OpenApiResult};
use crate::openapi::OpenApi;
use crate::version;
use crate::versioning::StampVersion;
use tracing::{debug, warn};

/// Decode a JSON document
pub fn decode_json(input: &[u8]) -> OpenApiResult<OpenApi> {
    debug!(bytes = input.len(), "decoding JSON document");
    let doc = serde_json::from_slice(input)?;
    Ok(stamp_declared_version(doc))
}

/// Decode a YAML document
pub fn decode_yaml(input: &[u8]) -> OpenApiResult<OpenApi> {
    debug!(bytes = input.len(), "decoding YAML document");
    let doc = serde_yaml::from_slice(input)?;
    Ok(stamp_declared_version(doc))
}

/// Decode JSON when the first non-whitespace byte is `{`, YAML otherwise
pub fn decode(input: &[u8]) -> OpenApiResult<OpenApi> {
    match input.iter().find(|byte| !byte.is_ascii_whitespace()) {
        Some(b'{') => decode_json(input),
        Some(_) => decode_yaml(input),
        None => Err(OpenApiError::decode("empty document")),
    }
}

pub fn encode_json(doc: &OpenApi) -> OpenApiResult<Vec<u8>> {
    debug!(openapi = %doc.openapi, "encoding JSON document");
    serde_json::to_vec(doc).map_err(|e| OpenApiError::encode(e.to_string()))
}

pub fn encode_json_pretty(doc: &OpenApi) -> OpenApiResult<Vec<u8>> {
    debug!(openapi = %doc.openapi, "encoding pretty JSON document");
    serde_json::to_vec_pretty(doc).map_err(|e| OpenApiError::encode(e.to_string()))
}

pub fn encode_yaml(doc: &OpenApi) -> OpenApiResult<String> {
    debug!(openapi = %doc.openapi, "encoding YAML document");
    serde_yaml::to_string(doc).map_err(|e| OpenApiError::encode(e.to_string()))
}

fn stamp_declared_version(mut doc: OpenApi) -> OpenApi {
    let minor = match version::parse_minor(&doc.openapi) {
        Some(minor) => minor,
        None => {
            warn!(
                openapi = %doc.openapi,
                "cannot read minor version, validating as 3.{}",
                version::BASE_MINOR
            );
            version::BASE_MINOR
        }
    };
    doc.stamp_version(minor);
    doc
}

impl OpenApi {
    pub fn from_json(input: &str) -> OpenApiResult<Self> {
        decode_json(input.as_bytes())
    }

    pub fn from_yaml(input: &str) -> OpenApiResult<Self> {
        decode_yaml(input.as_bytes())
    }

    pub fn to_json(&self) -> OpenApiResult<String> {
        serde_json::to_string(self).map_err(|e| OpenApiError::encode(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> OpenApiResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| OpenApiError::encode(e.to_string()))
    }

    pub fn to_yaml(&self) -> OpenApiResult<String> {
        encode_yaml(self)
    }
}
