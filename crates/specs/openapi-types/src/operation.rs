//! Operation Object and the objects nested inside it.

use crate::{
    Example, Extensions, ExternalDocs, Reference, ReferenceOr, Schema, SecurityRequirements,
    Servers,
    error::{OpenApiError, OpenApiResult},
    extensions::{deserialize_patterned, impl_extensible, serialize_patterned},
    validation::{Validate, ValidationOptions, require_non_empty, validate_example_exclusivity},
    versioning::{StampVersion, Versioned},
};
use bon::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Describes a single API operation on a path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Builder)]
pub struct Operation {
    /// A list of tags for API documentation control.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub tags: Vec<String>,

    /// A short summary of what the operation does.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// A verbose explanation of the operation behavior.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,

    /// Unique string used to identify the operation.
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    /// Parameters that are applicable for this operation. They override
    /// path-level parameters with the same name and location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ReferenceOr<Parameter>>>,

    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<ReferenceOr<RequestBody>>,

    /// The list of possible responses as they are returned from executing
    /// this operation. Required in OpenAPI 3.0, optional in 3.1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<Responses>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    /// Overrides the top-level security declaration for this operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityRequirements>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Servers>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl Operation {
    /// Create an empty operation
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the operation id, unique across the document
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Set the summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add an inline parameter
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters
            .get_or_insert_with(Vec::new)
            .push(ReferenceOr::Item(parameter));
        self
    }

    /// Add a parameter defined in `components`
    pub fn with_parameter_ref(mut self, reference: Reference) -> Self {
        self.parameters
            .get_or_insert_with(Vec::new)
            .push(ReferenceOr::Reference(reference));
        self
    }

    /// Set the request body
    pub fn with_request_body(mut self, request_body: RequestBody) -> Self {
        self.request_body = Some(ReferenceOr::Item(request_body));
        self
    }

    /// Set the responses
    pub fn with_responses(mut self, responses: Responses) -> Self {
        self.responses = Some(responses);
        self
    }

    /// Override the document-wide security requirements
    pub fn with_security(mut self, security: SecurityRequirements) -> Self {
        self.security = Some(security);
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

    /// Inline parameters declared with `in: path`
    pub(crate) fn path_parameter_names(&self) -> impl Iterator<Item = &str> {
        inline_path_parameters(self.parameters.as_deref())
    }
}

pub(crate) fn inline_path_parameters(
    parameters: Option<&[ReferenceOr<Parameter>]>,
) -> impl Iterator<Item = &str> {
    parameters
        .unwrap_or_default()
        .iter()
        .filter_map(ReferenceOr::as_item)
        .filter(|parameter| parameter.location == ParameterLocation::Path)
        .map(|parameter| parameter.name.as_str())
}

/// Fail when two inline parameters share both name and location
pub(crate) fn validate_parameter_list(
    parameters: &[ReferenceOr<Parameter>],
    options: &ValidationOptions,
) -> OpenApiResult<()> {
    let mut seen = HashSet::new();
    for (i, parameter) in parameters.iter().enumerate() {
        let label = match parameter {
            ReferenceOr::Item(p) => format!("parameter '{}' in {}", p.name, p.location),
            ReferenceOr::Reference(r) => format!("parameter {i} ({})", r.reference),
        };
        parameter.validate(options).map_err(|e| e.within(label))?;

        if let ReferenceOr::Item(p) = parameter {
            if !seen.insert((p.name.as_str(), p.location)) {
                return Err(OpenApiError::structural(format!(
                    "duplicate parameter '{}' in {}",
                    p.name, p.location
                )));
            }
        }
    }
    Ok(())
}

impl StampVersion for Operation {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        self.external_docs.stamp_version(minor);
        self.parameters.stamp_version(minor);
        self.request_body.stamp_version(minor);
        self.responses.stamp_version(minor);
        self.security.stamp_version(minor);
        self.servers.stamp_version(minor);
    }
}

impl Versioned for Operation {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for Operation {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        if let Some(ref parameters) = self.parameters {
            validate_parameter_list(parameters, options)?;
        }

        if let Some(ref request_body) = self.request_body {
            request_body
                .validate(options)
                .map_err(|e| e.within("request body"))?;
        }

        match self.responses {
            Some(ref responses) => responses
                .validate(options)
                .map_err(|e| e.within("responses"))?,
            None if !self.is_at_least_3_1() => {
                return Err(OpenApiError::missing_field("responses"));
            }
            None => {}
        }

        if let Some(ref security) = self.security {
            security.validate(options).map_err(|e| e.within("security"))?;
        }

        if let Some(ref servers) = self.servers {
            servers.validate(options).map_err(|e| e.within("servers"))?;
        }

        if let Some(ref external_docs) = self.external_docs {
            external_docs
                .validate(options)
                .map_err(|e| e.within("external docs"))?;
        }

        Ok(())
    }
}

/// The location of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Path => "path",
            ParameterLocation::Cookie => "cookie",
        };
        f.write_str(name)
    }
}

/// Describes a single operation parameter, unique by name and location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Must be `true` for path parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    /// A map containing the representations for the parameter.
    /// Exactly one of `schema` and `content` is expected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<IndexMap<String, ReferenceOr<Example>>>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl Parameter {
    /// Create a parameter described by `schema`
    pub fn new(name: impl Into<String>, location: ParameterLocation, schema: Schema) -> Self {
        Self {
            name: name.into(),
            location,
            description: None,
            required: (location == ParameterLocation::Path).then_some(true),
            deprecated: None,
            schema: Some(schema),
            content: None,
            example: None,
            examples: None,
            extensions: Extensions::new(),
            minor_version: 0,
        }
    }

    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Path, Schema::string())
    }

    pub fn query(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, ParameterLocation::Query, schema)
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the example value
    pub fn with_example(mut self, example: impl Into<Value>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

impl StampVersion for Parameter {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        self.schema.stamp_version(minor);
        self.content.stamp_version(minor);
        self.examples.stamp_version(minor);
    }
}

impl Versioned for Parameter {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for Parameter {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        require_non_empty(&self.name, "name")?;

        if self.location == ParameterLocation::Path && !self.is_required() {
            return Err(OpenApiError::invalid_value(
                "required",
                "path parameters must be required",
            ));
        }

        match (&self.schema, &self.content) {
            (Some(schema), None) => schema.validate(options).map_err(|e| e.within("schema"))?,
            (None, Some(content)) => validate_content(content, options)?,
            (Some(_), Some(_)) => {
                return Err(OpenApiError::structural(
                    "schema and content are mutually exclusive",
                ));
            }
            (None, None) => {
                return Err(OpenApiError::structural(
                    "one of schema or content is required",
                ));
            }
        }

        validate_example_exclusivity(self.example.is_some(), self.examples.is_some(), options)?;
        validate_examples(self.examples.as_ref(), options)
    }
}

/// Describes a single request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The content of the request body, keyed by media type.
    pub content: IndexMap<String, MediaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl RequestBody {
    pub fn new() -> Self {
        Self {
            description: None,
            content: IndexMap::new(),
            required: None,
            extensions: Extensions::new(),
            minor_version: 0,
        }
    }

    /// Add a media type to the content
    pub fn with_content(mut self, media_type: impl Into<String>, content: MediaType) -> Self {
        self.content.insert(media_type.into(), content);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }
}

impl Default for RequestBody {
    fn default() -> Self {
        Self::new()
    }
}

impl StampVersion for RequestBody {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        self.content.stamp_version(minor);
    }
}

impl Versioned for RequestBody {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for RequestBody {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        validate_content(&self.content, options)
    }
}

/// Container for the expected responses of an operation, keyed by HTTP
/// status code (`"200"`, `"4XX"`) or `"default"`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Responses {
    entries: IndexMap<String, ReferenceOr<Response>>,
    pub extensions: Extensions,
    minor_version: u64,
}

impl Responses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response for a status code or `default`
    pub fn with_response(mut self, status: impl Into<String>, response: Response) -> Self {
        self.insert(status, ReferenceOr::Item(response));
        self
    }

    pub fn insert(&mut self, status: impl Into<String>, response: ReferenceOr<Response>) {
        self.entries.insert(status.into(), response);
    }

    pub fn get(&self, status: &str) -> Option<&ReferenceOr<Response>> {
        self.entries.get(status)
    }

    /// The `default` response, if declared
    pub fn default_response(&self) -> Option<&ReferenceOr<Response>> {
        self.entries.get("default")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ReferenceOr<Response>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_status_key(key: &str) -> bool {
    if key == "default" {
        return true;
    }
    let bytes = key.as_bytes();
    bytes.len() == 3
        && matches!(bytes[0], b'1'..=b'5')
        && ((bytes[1].is_ascii_digit() && bytes[2].is_ascii_digit())
            || (bytes[1] == b'X' && bytes[2] == b'X'))
}

impl Serialize for Responses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_patterned(&self.entries, &self.extensions, serializer)
    }
}

impl<'de> Deserialize<'de> for Responses {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (entries, extensions) = deserialize_patterned(deserializer)?;
        Ok(Self {
            entries,
            extensions,
            minor_version: 0,
        })
    }
}

impl StampVersion for Responses {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        self.entries.stamp_version(minor);
    }
}

impl Versioned for Responses {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for Responses {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        if self.entries.is_empty() {
            return Err(OpenApiError::structural("at least one response is required"));
        }

        for (status, response) in &self.entries {
            if !is_status_key(status) {
                return Err(OpenApiError::structural(format!(
                    "'{status}' is not a status code"
                )));
            }
            response
                .validate(options)
                .map_err(|e| e.within(format!("response {status}")))?;
        }

        Ok(())
    }
}

/// Describes a single response from an API operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct Response {
    /// A description of the response. Required.
    #[serde(default)]
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, ReferenceOr<Header>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl Response {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            headers: None,
            content: None,
            extensions: Extensions::new(),
            minor_version: 0,
        }
    }

    /// Add a media type to the content
    pub fn with_content(mut self, media_type: impl Into<String>, content: MediaType) -> Self {
        self.content
            .get_or_insert_with(IndexMap::new)
            .insert(media_type.into(), content);
        self
    }

    /// Add a response header
    pub fn with_header(mut self, name: impl Into<String>, header: Header) -> Self {
        self.headers
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), ReferenceOr::Item(header));
        self
    }
}

impl StampVersion for Response {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        self.headers.stamp_version(minor);
        self.content.stamp_version(minor);
    }
}

impl Versioned for Response {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for Response {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        require_non_empty(&self.description, "description")?;

        if let Some(ref headers) = self.headers {
            for (name, header) in headers {
                header
                    .validate(options)
                    .map_err(|e| e.within(format!("header '{name}'")))?;
            }
        }

        if let Some(ref content) = self.content {
            validate_content(content, options)?;
        }

        Ok(())
    }
}

/// Describes a response header. Follows the structure of a Parameter
/// without `name` and `in`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl Header {
    pub fn new(schema: Schema) -> Self {
        Self {
            description: None,
            required: None,
            schema: Some(schema),
            extensions: Extensions::new(),
            minor_version: 0,
        }
    }
}

impl StampVersion for Header {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        self.schema.stamp_version(minor);
    }
}

impl Versioned for Header {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for Header {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        if let Some(ref schema) = self.schema {
            schema.validate(options).map_err(|e| e.within("schema"))?;
        }
        Ok(())
    }
}

/// Provides schema and examples for the media type identified by its key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Builder)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<IndexMap<String, ReferenceOr<Example>>>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl MediaType {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Some(schema),
            ..Self::default()
        }
    }

    /// Set the example value
    pub fn with_example(mut self, example: impl Into<Value>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Add a named example
    pub fn with_named_example(mut self, name: impl Into<String>, example: Example) -> Self {
        self.examples
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), ReferenceOr::Item(example));
        self
    }
}

impl StampVersion for MediaType {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        self.schema.stamp_version(minor);
        self.examples.stamp_version(minor);
    }
}

impl Versioned for MediaType {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for MediaType {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        if let Some(ref schema) = self.schema {
            schema.validate(options).map_err(|e| e.within("schema"))?;
        }

        validate_example_exclusivity(self.example.is_some(), self.examples.is_some(), options)?;
        validate_examples(self.examples.as_ref(), options)
    }
}

fn validate_content(
    content: &IndexMap<String, MediaType>,
    options: &ValidationOptions,
) -> OpenApiResult<()> {
    for (media_type, value) in content {
        value
            .validate(options)
            .map_err(|e| e.within(format!("content {media_type}")))?;
    }
    Ok(())
}

fn validate_examples(
    examples: Option<&IndexMap<String, ReferenceOr<Example>>>,
    options: &ValidationOptions,
) -> OpenApiResult<()> {
    for (name, example) in examples.into_iter().flatten() {
        example
            .validate(options)
            .map_err(|e| e.within(format!("example '{name}'")))?;
    }
    Ok(())
}

impl_extensible!(Operation, Parameter, RequestBody, Responses, Response, Header, MediaType);
