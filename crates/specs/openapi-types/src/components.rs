//! Components Object and Security Scheme Objects.
//!
//! Components hold reusable objects that the rest of the document points at
//! with `$ref`. Every map key must match `^[a-zA-Z0-9.\-_]+$`.

use crate::{
    Example, Extensions, Header, Parameter, PathItem, ReferenceOr, RequestBody,
    Response, Schema,
    error::{OpenApiError, OpenApiResult},
    extensions::impl_extensible,
    validation::{
        Validate, ValidationOptions, require_minor, require_non_empty, validate_component_key,
        validate_url,
    },
    versioning::{StampVersion, Versioned},
};
use bon::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Holds a set of reusable objects for different aspects of the document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<IndexMap<String, Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<IndexMap<String, ReferenceOr<Response>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<IndexMap<String, ReferenceOr<Parameter>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<IndexMap<String, ReferenceOr<Example>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_bodies: Option<IndexMap<String, ReferenceOr<RequestBody>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, ReferenceOr<Header>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<IndexMap<String, ReferenceOr<SecurityScheme>>>,

    /// Reusable path items. OpenAPI 3.1 only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_items: Option<IndexMap<String, PathItem>>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl Components {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing would be written for this object
    pub fn is_empty(&self) -> bool {
        self.schemas.is_none()
            && self.responses.is_none()
            && self.parameters.is_none()
            && self.examples.is_none()
            && self.request_bodies.is_none()
            && self.headers.is_none()
            && self.security_schemes.is_none()
            && self.path_items.is_none()
            && self.extensions.is_empty()
    }

    /// Add a schema
    pub fn with_schema(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.schemas
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), schema);
        self
    }

    /// Add a reusable response
    pub fn with_response(mut self, name: impl Into<String>, response: Response) -> Self {
        self.responses
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), ReferenceOr::Item(response));
        self
    }

    /// Add a reusable parameter
    pub fn with_parameter(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
        self.parameters
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), ReferenceOr::Item(parameter));
        self
    }

    /// Add a security scheme
    pub fn with_security_scheme(mut self, name: impl Into<String>, scheme: SecurityScheme) -> Self {
        self.security_schemes
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), ReferenceOr::Item(scheme));
        self
    }

    /// Add a reusable path item (3.1)
    pub fn with_path_item(mut self, name: impl Into<String>, item: PathItem) -> Self {
        self.path_items
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), item);
        self
    }
}

fn validate_entries<T: Validate>(
    kind: &str,
    entries: Option<&IndexMap<String, T>>,
    options: &ValidationOptions,
) -> OpenApiResult<()> {
    for (key, value) in entries.into_iter().flatten() {
        validate_component_key(key)
            .and_then(|()| value.validate(options))
            .map_err(|e| e.within(format!("{kind} {key}")))?;
    }
    Ok(())
}

impl StampVersion for Components {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        self.schemas.stamp_version(minor);
        self.responses.stamp_version(minor);
        self.parameters.stamp_version(minor);
        self.examples.stamp_version(minor);
        self.request_bodies.stamp_version(minor);
        self.headers.stamp_version(minor);
        self.security_schemes.stamp_version(minor);
        self.path_items.stamp_version(minor);
    }
}

impl Versioned for Components {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for Components {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        validate_entries("schema", self.schemas.as_ref(), options)?;
        validate_entries("parameter", self.parameters.as_ref(), options)?;
        validate_entries("request body", self.request_bodies.as_ref(), options)?;
        validate_entries("response", self.responses.as_ref(), options)?;
        validate_entries("header", self.headers.as_ref(), options)?;
        validate_entries("security scheme", self.security_schemes.as_ref(), options)?;
        validate_entries("example", self.examples.as_ref(), options)?;

        if let Some(ref path_items) = self.path_items {
            require_minor(self.minor_version, 1, "pathItems")?;

            for (key, item) in path_items {
                validate_component_key(key)
                    .and_then(|()| item.validate(options))
                    .and_then(|()| validate_component_operations(item, options))
                    .map_err(|e| e.within(format!("path item {key}")))?;
            }
        }

        Ok(())
    }
}

fn validate_component_operations(item: &PathItem, options: &ValidationOptions) -> OpenApiResult<()> {
    for (method, operation) in item.operations() {
        operation
            .validate(options)
            .map_err(|e| e.within(format!("operation {method}")))?;
    }
    Ok(())
}

/// The type of a security scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecuritySchemeType {
    #[serde(rename = "apiKey")]
    ApiKey,
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "oauth2")]
    OAuth2,
    #[serde(rename = "openIdConnect")]
    OpenIdConnect,
    /// OpenAPI 3.1 only
    #[serde(rename = "mutualTLS")]
    MutualTls,
}

/// Where an API key is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

/// Defines a security scheme that can be used by the operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: SecuritySchemeType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Header, query or cookie parameter name (`apiKey`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Location of the API key (`apiKey`)
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ApiKeyLocation>,

    /// HTTP Authorization scheme name (`http`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,

    /// Supported flows (`oauth2`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows: Option<OAuthFlows>,

    #[serde(rename = "openIdConnectUrl", skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url: Option<String>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl SecurityScheme {
    fn of_type(scheme_type: SecuritySchemeType) -> Self {
        Self {
            scheme_type,
            description: None,
            name: None,
            location: None,
            scheme: None,
            bearer_format: None,
            flows: None,
            open_id_connect_url: None,
            extensions: Extensions::new(),
            minor_version: 0,
        }
    }

    pub fn api_key(name: impl Into<String>, location: ApiKeyLocation) -> Self {
        Self {
            name: Some(name.into()),
            location: Some(location),
            ..Self::of_type(SecuritySchemeType::ApiKey)
        }
    }

    pub fn http(scheme: impl Into<String>) -> Self {
        Self {
            scheme: Some(scheme.into()),
            ..Self::of_type(SecuritySchemeType::Http)
        }
    }

    pub fn bearer(format: impl Into<String>) -> Self {
        Self {
            bearer_format: Some(format.into()),
            ..Self::http("bearer")
        }
    }

    pub fn oauth2(flows: OAuthFlows) -> Self {
        Self {
            flows: Some(flows),
            ..Self::of_type(SecuritySchemeType::OAuth2)
        }
    }

    pub fn open_id_connect(url: impl Into<String>) -> Self {
        Self {
            open_id_connect_url: Some(url.into()),
            ..Self::of_type(SecuritySchemeType::OpenIdConnect)
        }
    }

    pub fn mutual_tls() -> Self {
        Self::of_type(SecuritySchemeType::MutualTls)
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl StampVersion for SecurityScheme {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        self.flows.stamp_version(minor);
    }
}

impl Versioned for SecurityScheme {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for SecurityScheme {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        match self.scheme_type {
            SecuritySchemeType::ApiKey => {
                require_non_empty(self.name.as_deref().unwrap_or_default(), "name")?;
                if self.location.is_none() {
                    return Err(OpenApiError::missing_field("in"));
                }
            }
            SecuritySchemeType::Http => {
                require_non_empty(self.scheme.as_deref().unwrap_or_default(), "scheme")?;
            }
            SecuritySchemeType::OAuth2 => {
                let flows = self
                    .flows
                    .as_ref()
                    .ok_or_else(|| OpenApiError::missing_field("flows"))?;
                flows.validate(options).map_err(|e| e.within("flows"))?;
            }
            SecuritySchemeType::OpenIdConnect => {
                let url = self.open_id_connect_url.as_deref().unwrap_or_default();
                validate_url(url, "openIdConnectUrl")?;
            }
            SecuritySchemeType::MutualTls => {
                require_minor(self.minor_version, 1, "type")?;
            }
        }
        Ok(())
    }
}

/// Configuration of the supported OAuth flows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlows {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuthFlow>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlow>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OAuthFlow>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OAuthFlow>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl OAuthFlows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the authorization code flow
    pub fn with_authorization_code(mut self, flow: OAuthFlow) -> Self {
        self.authorization_code = Some(flow);
        self
    }

    /// Set the client credentials flow
    pub fn with_client_credentials(mut self, flow: OAuthFlow) -> Self {
        self.client_credentials = Some(flow);
        self
    }

    /// Set the implicit flow
    pub fn with_implicit(mut self, flow: OAuthFlow) -> Self {
        self.implicit = Some(flow);
        self
    }

    /// Set the resource owner password flow
    pub fn with_password(mut self, flow: OAuthFlow) -> Self {
        self.password = Some(flow);
        self
    }
}

impl StampVersion for OAuthFlows {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        self.implicit.stamp_version(minor);
        self.password.stamp_version(minor);
        self.client_credentials.stamp_version(minor);
        self.authorization_code.stamp_version(minor);
    }
}

impl Versioned for OAuthFlows {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for OAuthFlows {
    fn validate(&self, _options: &ValidationOptions) -> OpenApiResult<()> {
        let flows = [
            (&self.implicit, "implicit", true, false),
            (&self.password, "password", false, true),
            (&self.client_credentials, "client credentials", false, true),
            (&self.authorization_code, "authorization code", true, true),
        ];

        for (flow, label, needs_authorization_url, needs_token_url) in flows {
            if let Some(flow) = flow {
                flow.validate_for(needs_authorization_url, needs_token_url)
                    .map_err(|e| e.within(label))?;
            }
        }

        Ok(())
    }
}

/// Configuration details for a supported OAuth flow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,

    /// Scope name to a short description. May be empty.
    #[serde(default)]
    #[builder(default)]
    pub scopes: IndexMap<String, String>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl OAuthFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the authorization URL
    pub fn with_authorization_url(mut self, url: impl Into<String>) -> Self {
        self.authorization_url = Some(url.into());
        self
    }

    /// Set the token URL
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    /// Add a scope and its description
    pub fn with_scope(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.scopes.insert(name.into(), description.into());
        self
    }

    fn validate_for(&self, needs_authorization_url: bool, needs_token_url: bool) -> OpenApiResult<()> {
        match self.authorization_url.as_deref() {
            Some(url) => validate_url(url, "authorizationUrl")?,
            None if needs_authorization_url => {
                return Err(OpenApiError::missing_field("authorizationUrl"));
            }
            None => {}
        }

        match self.token_url.as_deref() {
            Some(url) => validate_url(url, "tokenUrl")?,
            None if needs_token_url => return Err(OpenApiError::missing_field("tokenUrl")),
            None => {}
        }

        if let Some(ref url) = self.refresh_url {
            validate_url(url, "refreshUrl")?;
        }

        Ok(())
    }
}

impl StampVersion for OAuthFlow {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
    }
}

impl Versioned for OAuthFlow {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl_extensible!(Components, SecurityScheme, OAuthFlows, OAuthFlow);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HttpMethod, Operation, Responses};
    use serde_json::json;

    #[test]
    fn test_empty_components() {
        let components = Components::new();
        assert!(components.is_empty());
        assert!(components.validate(&ValidationOptions::default()).is_ok());
        assert_eq!(serde_json::to_value(&components).unwrap(), json!({}));
    }

    #[test]
    fn test_component_keys_are_checked() {
        let components = Components::new().with_schema("Pet Store", Schema::object());
        let err = components.validate(&ValidationOptions::default()).unwrap_err();

        assert_eq!(err.attribution(), vec!["schema Pet Store"]);
        assert!(matches!(
            err.root_cause(),
            OpenApiError::StructuralViolation { .. }
        ));
    }

    #[test]
    fn test_component_entries_are_attributed() {
        let components = Components::new()
            .with_schema("Pet", Schema::object())
            .with_response("NotFound", Response::new(""));

        let err = components.validate(&ValidationOptions::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid response NotFound: missing field 'description'"
        );
    }

    #[test]
    fn test_path_items_require_3_1() {
        let item = PathItem::new().with_operation(
            HttpMethod::Get,
            Operation::new().with_responses(Responses::new().with_response("200", Response::new("OK"))),
        );
        let mut components = Components::new().with_path_item("PetCollection", item);

        assert_eq!(
            components.validate(&ValidationOptions::default()),
            Err(OpenApiError::invalid_value(
                "pathItems",
                "requires OpenAPI 3.1 or later"
            ))
        );

        components.stamp_version(1);
        assert!(components.validate(&ValidationOptions::default()).is_ok());

        let mut broken = components.clone();
        if let Some(item) = broken
            .path_items
            .as_mut()
            .and_then(|items| items.get_mut("PetCollection"))
        {
            item.set_operation(HttpMethod::Get, Operation::new().with_responses(Responses::new()));
        }
        let err = broken.validate(&ValidationOptions::default()).unwrap_err();
        assert_eq!(
            err.attribution(),
            vec!["path item PetCollection", "operation get", "responses"]
        );
    }

    #[test]
    fn test_security_scheme_required_fields() {
        let options = ValidationOptions::default();

        assert!(SecurityScheme::api_key("X-API-Key", ApiKeyLocation::Header)
            .validate(&options)
            .is_ok());
        assert!(SecurityScheme::bearer("JWT").validate(&options).is_ok());
        assert!(SecurityScheme::open_id_connect("https://example.com/.well-known/openid-configuration")
            .validate(&options)
            .is_ok());

        let mut missing_in = SecurityScheme::api_key("X-API-Key", ApiKeyLocation::Header);
        missing_in.location = None;
        assert_eq!(
            missing_in.validate(&options),
            Err(OpenApiError::missing_field("in"))
        );

        let mut missing_scheme = SecurityScheme::http("basic");
        missing_scheme.scheme = None;
        assert_eq!(
            missing_scheme.validate(&options),
            Err(OpenApiError::missing_field("scheme"))
        );

        let mut missing_flows = SecurityScheme::oauth2(OAuthFlows::new());
        missing_flows.flows = None;
        assert_eq!(
            missing_flows.validate(&options),
            Err(OpenApiError::missing_field("flows"))
        );
    }

    #[test]
    fn test_mutual_tls_requires_3_1() {
        let options = ValidationOptions::default();
        let mut scheme = SecurityScheme::mutual_tls();
        assert!(scheme.validate(&options).is_err());

        scheme.stamp_version(1);
        assert!(scheme.validate(&options).is_ok());
    }

    #[test]
    fn test_oauth_flow_urls() {
        let options = ValidationOptions::default();
        let flows = OAuthFlows::new().with_authorization_code(
            OAuthFlow::new()
                .with_authorization_url("https://example.com/authorize")
                .with_scope("read:pets", "read your pets"),
        );

        let err = SecurityScheme::oauth2(flows).validate(&options).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid flows: invalid authorization code: missing field 'tokenUrl'"
        );

        let flows = OAuthFlows::new()
            .with_client_credentials(OAuthFlow::new().with_token_url("https://example.com/token"));
        assert!(SecurityScheme::oauth2(flows).validate(&options).is_ok());
    }

    #[test]
    fn test_security_scheme_serialization() {
        let scheme = SecurityScheme::api_key("api_key", ApiKeyLocation::Header);
        let value = serde_json::to_value(&scheme).unwrap();
        assert_eq!(
            value,
            json!({"type": "apiKey", "name": "api_key", "in": "header"})
        );

        let back: SecurityScheme = serde_json::from_value(value).unwrap();
        assert_eq!(back, scheme);

        let tls: SecurityScheme = serde_json::from_value(json!({"type": "mutualTLS"})).unwrap();
        assert_eq!(tls.scheme_type, SecuritySchemeType::MutualTls);
    }
}
