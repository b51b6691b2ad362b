//! External Documentation Object for OpenAPI documents.

use crate::{
    Extensions,
    error::OpenApiResult,
    extensions::impl_extensible,
    validation::{Validate, ValidationOptions},
    versioning::{StampVersion, Versioned},
};
use bon::Builder;
use serde::{Deserialize, Serialize};

/// Allows referencing an external resource for extended documentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct ExternalDocs {
    /// A description of the target documentation.
    /// CommonMark syntax MAY be used for rich text representation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The URL for the target documentation.
    /// Value MUST be in the format of a URL.
    #[serde(default)]
    pub url: String,

    /// Unrecognised fields
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl ExternalDocs {
    /// Create a new ExternalDocs with required URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            description: None,
            url: url.into(),
            extensions: Extensions::new(),
            minor_version: 0,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an extension field
    pub fn with_extension(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.extensions.insert(key, value);
        self
    }
}

impl_extensible!(ExternalDocs);

impl StampVersion for ExternalDocs {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
    }
}

impl Versioned for ExternalDocs {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for ExternalDocs {
    fn validate(&self, _options: &ValidationOptions) -> OpenApiResult<()> {
        crate::validation::validate_url(&self.url, "url")
    }
}
