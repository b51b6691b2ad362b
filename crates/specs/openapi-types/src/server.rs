//! Server Object and Server Variable Object for OpenAPI documents.

use crate::{
    Extensions,
    error::{OpenApiError, OpenApiResult},
    extensions::impl_extensible,
    validation::{Validate, ValidationOptions, require_non_empty, template_variables},
    versioning::{StampVersion, Versioned},
};
use bon::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An object representing a Server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct Server {
    /// A URL to the target host. This URL supports Server Variables and MAY be
    /// relative, to indicate that the host location is relative to the
    /// location where the OpenAPI document is being served. Variable
    /// substitutions will be made when a variable is named in `{brackets}`.
    #[serde(default)]
    pub url: String,

    /// An optional string describing the host designated by the URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// A map between a variable name and its value. The value is used for
    /// substitution in the server's URL template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<IndexMap<String, ServerVariable>>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl Server {
    /// Create a new Server with required URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: None,
            variables: None,
            extensions: Extensions::new(),
            minor_version: 0,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a variable
    pub fn with_variable(mut self, name: impl Into<String>, variable: ServerVariable) -> Self {
        self.variables
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), variable);
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

    /// Get the resolved URL by substituting variable defaults
    pub fn resolve_url(&self) -> String {
        let mut resolved_url = self.url.clone();

        if let Some(ref variables) = self.variables {
            for (name, variable) in variables {
                let placeholder = format!("{{{}}}", name);
                resolved_url = resolved_url.replace(&placeholder, &variable.default);
            }
        }

        resolved_url
    }
}

impl_extensible!(Server, ServerVariable);

impl StampVersion for Server {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        self.variables.stamp_version(minor);
    }
}

impl Versioned for Server {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for Server {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        require_non_empty(&self.url, "url")?;

        // Every templated name in the URL needs a declared variable
        for name in template_variables(&self.url) {
            let declared = self
                .variables
                .as_ref()
                .is_some_and(|variables| variables.contains_key(name));
            if !declared {
                return Err(OpenApiError::structural(format!(
                    "server url variable '{name}' is not declared in variables"
                )));
            }
        }

        if let Some(ref variables) = self.variables {
            for (name, variable) in variables {
                variable
                    .validate(options)
                    .map_err(|e| e.within(format!("variable '{name}'")))?;
            }
        }

        Ok(())
    }
}

/// The root-level (or path-/operation-level) server list.
pub type Servers = Vec<Server>;

impl Validate for Servers {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        for (i, server) in self.iter().enumerate() {
            server
                .validate(options)
                .map_err(|e| e.within(format!("server {i}")))?;
        }
        Ok(())
    }
}

/// An object representing a Server Variable for server URL template substitution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct ServerVariable {
    /// An enumeration of string values to be used if the substitution options
    /// are from a limited set.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    /// The default value to use for substitution.
    #[serde(default)]
    pub default: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl ServerVariable {
    /// Create a new ServerVariable with required default value
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            enum_values: None,
            default: default.into(),
            description: None,
            extensions: Extensions::new(),
            minor_version: 0,
        }
    }

    /// Set the enum values
    pub fn with_enum(mut self, enum_values: Vec<String>) -> Self {
        self.enum_values = Some(enum_values);
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl StampVersion for ServerVariable {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
    }
}

impl Versioned for ServerVariable {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for ServerVariable {
    fn validate(&self, _options: &ValidationOptions) -> OpenApiResult<()> {
        require_non_empty(&self.default, "default")?;

        let Some(ref values) = self.enum_values else {
            return Ok(());
        };

        if values.is_empty() {
            // 3.0 tolerates an empty enum, 3.1 forbids it
            if self.is_at_least_3_1() {
                return Err(OpenApiError::invalid_value("enum", "must not be empty"));
            }
            return Ok(());
        }

        if !values.contains(&self.default) {
            return Err(OpenApiError::invalid_value(
                "default",
                format!("'{}' is not one of the enum values", self.default),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_creation() {
        let server = Server::new("https://api.example.com").with_description("Production API");

        assert_eq!(server.url, "https://api.example.com");
        assert_eq!(server.description.as_deref(), Some("Production API"));
        assert!(server.variables.is_none());
    }

    #[test]
    fn test_server_validation() {
        let options = ValidationOptions::default();
        assert!(Server::new("/v1").validate(&options).is_ok());

        assert_eq!(
            Server::new("").validate(&options),
            Err(OpenApiError::missing_field("url"))
        );
    }

    #[test]
    fn test_server_url_variables_must_be_declared() {
        let options = ValidationOptions::default();
        let server = Server::new("https://{region}.example.com/{basePath}")
            .with_variable("region", ServerVariable::new("eu"));

        assert_eq!(
            server.validate(&options),
            Err(OpenApiError::structural(
                "server url variable 'basePath' is not declared in variables"
            ))
        );

        let server = server.with_variable("basePath", ServerVariable::new("v1"));
        assert!(server.validate(&options).is_ok());
        assert_eq!(server.resolve_url(), "https://eu.example.com/v1");
    }

    #[test]
    fn test_server_variable_enum_rules() {
        let options = ValidationOptions::default();

        let variable = ServerVariable::new("8443").with_enum(vec!["443".to_string()]);
        let err = variable.validate(&options).unwrap_err();
        assert!(matches!(err, OpenApiError::InvalidValue { ref field, .. } if field == "default"));

        let mut empty = ServerVariable::new("8443").with_enum(vec![]);
        assert!(empty.validate(&options).is_ok());
        empty.stamp_version(1);
        assert_eq!(
            empty.validate(&options),
            Err(OpenApiError::invalid_value("enum", "must not be empty"))
        );
    }

    #[test]
    fn test_server_variable_without_default() {
        let server: Server = serde_json::from_value(json!({
            "url": "https://{env}.example.com",
            "variables": {"env": {"enum": ["prod"]}}
        }))
        .unwrap();

        let err = server.validate(&ValidationOptions::default()).unwrap_err();
        assert_eq!(err.attribution(), vec!["variable 'env'"]);
        assert_eq!(err.root_cause(), &OpenApiError::missing_field("default"));
    }

    #[test]
    fn test_servers_attribute_by_index() {
        let servers: Servers = vec![Server::new("/ok"), Server::new("")];
        let err = servers.validate(&ValidationOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "invalid server 1: missing field 'url'");
    }

    #[test]
    fn test_server_variable_serialization() {
        let server = Server::new("https://{env}.example.com")
            .with_variable(
                "env",
                ServerVariable::new("prod").with_enum(vec!["prod".into(), "staging".into()]),
            )
            .with_extension("x-internal", false);

        let value = serde_json::to_value(&server).unwrap();
        assert_eq!(
            value,
            json!({
                "url": "https://{env}.example.com",
                "variables": {
                    "env": {"enum": ["prod", "staging"], "default": "prod"}
                },
                "x-internal": false
            })
        );

        let back: Server = serde_json::from_value(value).unwrap();
        assert_eq!(back, server);
    }
}
