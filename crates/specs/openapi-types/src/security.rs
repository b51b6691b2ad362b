//! Security Requirement Objects.

use crate::error::{OpenApiError, OpenApiResult};
use crate::validation::{Validate, ValidationOptions};
use crate::versioning::{StampVersion, Versioned};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Lists the security schemes required to execute an operation, each mapped
/// to the scopes it needs. An empty requirement makes security optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityRequirement {
    schemes: IndexMap<String, Vec<String>>,

    #[serde(skip)]
    minor_version: u64,
}

impl SecurityRequirement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `scheme` with the given scopes
    pub fn with_scheme<I, S>(mut self, scheme: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemes
            .insert(scheme.into(), scopes.into_iter().map(Into::into).collect());
        self
    }

    pub fn scopes(&self, scheme: &str) -> Option<&[String]> {
        self.schemes.get(scheme).map(Vec::as_slice)
    }

    pub fn schemes(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.schemes.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

impl StampVersion for SecurityRequirement {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
    }
}

impl Versioned for SecurityRequirement {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for SecurityRequirement {
    fn validate(&self, _options: &ValidationOptions) -> OpenApiResult<()> {
        for (scheme, scopes) in &self.schemes {
            if scheme.is_empty() {
                return Err(OpenApiError::structural(
                    "security scheme name cannot be empty",
                ));
            }
            if scopes.iter().any(String::is_empty) {
                return Err(OpenApiError::invalid_value(
                    scheme.as_str(),
                    "scope names cannot be empty",
                ));
            }
        }
        Ok(())
    }
}

/// Alternative security requirements; satisfying any one is enough.
pub type SecurityRequirements = Vec<SecurityRequirement>;

impl Validate for SecurityRequirements {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        for (i, requirement) in self.iter().enumerate() {
            requirement
                .validate(options)
                .map_err(|e| e.within(format!("security requirement {i}")))?;
        }
        Ok(())
    }
}
