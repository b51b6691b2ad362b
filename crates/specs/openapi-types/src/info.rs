//! Info Object and related types for OpenAPI documents.
//!
//! The Info object provides metadata about the API.

use crate::{
    Extensions,
    error::{OpenApiError, OpenApiResult},
    extensions::impl_extensible,
    validation::{Validate, ValidationOptions, require_minor, require_non_empty},
    versioning::{StampVersion, Versioned},
};
use bon::Builder;
use serde::{Deserialize, Serialize};

/// The object provides metadata about the API.
/// The metadata MAY be used by the clients if needed, and MAY be presented
/// in editing or documentation generation tools for convenience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct Info {
    /// The title of the API.
    #[serde(default)]
    pub title: String,

    /// A short summary of the API. OpenAPI 3.1 only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// A description of the API.
    /// CommonMark syntax MAY be used for rich text representation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// A URL to the Terms of Service for the API.
    #[serde(rename = "termsOfService", skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,

    /// The contact information for the exposed API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,

    /// The license information for the exposed API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,

    /// The version of the OpenAPI document (which is distinct from the
    /// OpenAPI Specification version or the API implementation version).
    #[serde(default)]
    pub version: String,

    /// Unrecognised fields
    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl Info {
    /// Create a new Info object with required fields
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: None,
            description: None,
            terms_of_service: None,
            contact: None,
            license: None,
            version: version.into(),
            extensions: Extensions::new(),
            minor_version: 0,
        }
    }

    /// Set the summary (3.1)
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the terms of service URL
    pub fn with_terms_of_service(mut self, terms_of_service: impl Into<String>) -> Self {
        self.terms_of_service = Some(terms_of_service.into());
        self
    }

    /// Set the contact
    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = Some(contact);
        self
    }

    /// Set the license
    pub fn with_license(mut self, license: License) -> Self {
        self.license = Some(license);
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

impl StampVersion for Info {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        self.contact.stamp_version(minor);
        self.license.stamp_version(minor);
    }
}

impl Versioned for Info {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for Info {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        require_non_empty(&self.title, "title")?;
        require_non_empty(&self.version, "version")?;

        if self.summary.is_some() {
            require_minor(self.minor_version, 1, "summary")?;
        }

        if let Some(ref tos) = self.terms_of_service {
            crate::validation::validate_url(tos, "termsOfService")?;
        }

        if let Some(ref contact) = self.contact {
            contact.validate(options).map_err(|e| e.within("contact"))?;
        }

        if let Some(ref license) = self.license {
            license.validate(options).map_err(|e| e.within("license"))?;
        }

        Ok(())
    }
}

/// Contact information for the exposed API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct Contact {
    /// The identifying name of the contact person/organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The URL pointing to the contact information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// The email address of the contact person/organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl Contact {
    /// Create a new empty Contact
    pub fn new() -> Self {
        Self {
            name: None,
            url: None,
            email: None,
            extensions: Extensions::new(),
            minor_version: 0,
        }
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl Default for Contact {
    fn default() -> Self {
        Self::new()
    }
}

impl StampVersion for Contact {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
    }
}

impl Versioned for Contact {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for Contact {
    fn validate(&self, _options: &ValidationOptions) -> OpenApiResult<()> {
        if let Some(ref url) = self.url {
            crate::validation::validate_url(url, "url")?;
        }

        if let Some(ref email) = self.email {
            crate::validation::validate_email(email, "email")?;
        }

        Ok(())
    }
}

/// License information for the exposed API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct License {
    /// The license name used for the API.
    #[serde(default)]
    pub name: String,

    /// An SPDX license expression for the API. OpenAPI 3.1 only, and
    /// mutually exclusive with `url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// A URL to the license used for the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl License {
    /// Create a new License with required name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: None,
            url: None,
            extensions: Extensions::new(),
            minor_version: 0,
        }
    }

    /// Set the SPDX license identifier (3.1)
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Set the URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl StampVersion for License {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
    }
}

impl Versioned for License {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for License {
    fn validate(&self, _options: &ValidationOptions) -> OpenApiResult<()> {
        require_non_empty(&self.name, "name")?;

        if self.identifier.is_some() {
            require_minor(self.minor_version, 1, "identifier")?;
            if self.url.is_some() {
                return Err(OpenApiError::structural(
                    "identifier and url are mutually exclusive",
                ));
            }
        }

        if let Some(ref url) = self.url {
            crate::validation::validate_url(url, "url")?;
        }

        Ok(())
    }
}

impl_extensible!(Info, Contact, License);
