//! Reference Object for OpenAPI documents.
//!
//! A simple object to allow referencing other components in the document,
//! internally and externally.

use crate::Extensions;
use crate::error::{OpenApiError, OpenApiResult};
use crate::extensions::impl_extensible;
use crate::validation::{Validate, ValidationOptions, require_minor};
use crate::versioning::{StampVersion, Versioned};
use bon::Builder;
use serde::{Deserialize, Serialize};

/// A `$ref` pointer, optionally with the `summary`/`description` overrides
/// that OpenAPI 3.1 allows next to it. Any other sibling key is kept in
/// `extensions` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct Reference {
    /// The reference string.
    #[serde(rename = "$ref")]
    pub reference: String,

    /// Overrides the summary of the referenced component (3.1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Overrides the description of the referenced component (3.1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl Reference {
    /// Create a new reference with a custom reference string
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            summary: None,
            description: None,
            extensions: Extensions::new(),
            minor_version: 0,
        }
    }

    /// Create a new reference to a component
    pub fn component(component_type: &str, name: &str) -> Self {
        Self::new(format!("#/components/{component_type}/{name}"))
    }

    /// Reference to `#/components/schemas/<name>`
    pub fn schema(name: &str) -> Self {
        Self::component("schemas", name)
    }

    pub fn parameter(name: &str) -> Self {
        Self::component("parameters", name)
    }

    pub fn response(name: &str) -> Self {
        Self::component("responses", name)
    }

    /// Set the summary override
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set the description override
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if this is an internal reference (starts with #)
    pub fn is_internal(&self) -> bool {
        self.reference.starts_with('#')
    }

    /// Component name for `#/components/<kind>/<name>` references
    pub fn component_name(&self) -> Option<&str> {
        let path = self.reference.strip_prefix("#/components/")?;
        let (_, name) = path.split_once('/')?;
        Some(name)
    }
}

impl_extensible!(Reference);

impl StampVersion for Reference {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
    }
}

impl Versioned for Reference {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for Reference {
    fn validate(&self, _options: &ValidationOptions) -> OpenApiResult<()> {
        if self.reference.is_empty() {
            return Err(OpenApiError::missing_field("$ref"));
        }
        if self.summary.is_some() {
            require_minor(self.minor_version, 1, "summary")?;
        }
        if self.description.is_some() {
            require_minor(self.minor_version, 1, "description")?;
        }
        Ok(())
    }
}

/// Either an inline object or a [`Reference`] to one in `components`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceOr<T> {
    Reference(Reference),
    Item(T),
}

impl<T> ReferenceOr<T> {
    /// The inline object, if this is not a reference
    pub fn as_item(&self) -> Option<&T> {
        match self {
            ReferenceOr::Item(item) => Some(item),
            ReferenceOr::Reference(_) => None,
        }
    }

    pub fn as_item_mut(&mut self) -> Option<&mut T> {
        match self {
            ReferenceOr::Item(item) => Some(item),
            ReferenceOr::Reference(_) => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            ReferenceOr::Reference(reference) => Some(reference),
            ReferenceOr::Item(_) => None,
        }
    }
}

impl<T> From<Reference> for ReferenceOr<T> {
    fn from(reference: Reference) -> Self {
        ReferenceOr::Reference(reference)
    }
}

impl<T: StampVersion> StampVersion for ReferenceOr<T> {
    fn stamp_version(&mut self, minor: u64) {
        match self {
            ReferenceOr::Reference(reference) => reference.stamp_version(minor),
            ReferenceOr::Item(item) => item.stamp_version(minor),
        }
    }
}

impl<T: Validate> Validate for ReferenceOr<T> {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        match self {
            ReferenceOr::Reference(reference) => reference.validate(options),
            ReferenceOr::Item(item) => item.validate(options),
        }
    }
}
