//! Tag Object for OpenAPI documents.

use crate::{
    Extensions, ExternalDocs,
    error::OpenApiResult,
    extensions::impl_extensible,
    validation::{Validate, ValidateUnique, ValidationOptions, require_non_empty},
    versioning::{StampVersion, Versioned},
};
use bon::Builder;
use serde::{Deserialize, Serialize};

/// Adds metadata to a single tag that is used by the Operation Object.
/// It is not mandatory to have a Tag Object per tag defined in the
/// Operation Object instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct Tag {
    /// The name of the tag.
    #[serde(default)]
    pub name: String,

    /// A description for the tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Additional external documentation for this tag.
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl Tag {
    /// Create a new Tag with required name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            external_docs: None,
            extensions: Extensions::new(),
            minor_version: 0,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the external docs
    pub fn with_external_docs(mut self, external_docs: ExternalDocs) -> Self {
        self.external_docs = Some(external_docs);
        self
    }
}

impl_extensible!(Tag);

impl StampVersion for Tag {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        self.external_docs.stamp_version(minor);
    }
}

impl Versioned for Tag {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for Tag {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        require_non_empty(&self.name, "name")?;

        if let Some(ref external_docs) = self.external_docs {
            external_docs
                .validate(options)
                .map_err(|e| e.within("external docs"))?;
        }

        Ok(())
    }
}

/// The root-level tag list.
pub type Tags = Vec<Tag>;

impl Validate for Tags {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        for tag in self {
            tag.validate(options)
                .map_err(|e| e.within(format!("tag '{}'", tag.name)))?;
        }

        self.validate_unique(|tag| tag.name.clone(), "tag")
    }
}
