//! Root OpenAPI document and the document validation engine.

use crate::{
    Components, Extensions, ExternalDocs, HttpMethod, Info, Operation, Paths,
    SecurityRequirements, Server, Servers, Tags,
    error::{OpenApiError, OpenApiResult},
    extensions::impl_extensible,
    validation::{Validate, ValidationOptions, validate_openapi_version},
    versioning::{StampVersion, Versioned},
};
use bon::Builder;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// The root object of an OpenAPI document.
///
/// A document put together with [`OpenApi::builder`] is stamped for 3.0 and
/// its children are not stamped at all. Follow `build()` with
/// [`OpenApi::with_minor_version`] so a 3.1 document validates as 3.1:
///
/// ```
/// use openapi_types::{Info, OpenApi, Paths, Versioned};
///
/// let doc = OpenApi::builder()
///     .openapi("3.1.0".to_string())
///     .info(Info::new("Pets", "1.0.0").with_summary("Pet store"))
///     .paths(Paths::new())
///     .build()
///     .with_minor_version(1);
///
/// assert_eq!(doc.minor_version(), 1);
/// assert!(doc.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct OpenApi {
    /// The version of the OpenAPI Specification that the document uses,
    /// e.g. `3.0.3` or `3.1.0`.
    #[serde(default)]
    pub openapi: String,

    /// Metadata about the API. Required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,

    /// The available paths and operations for the API. Required, may be
    /// empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Paths>,

    /// Reusable objects. Omitted on encode when empty.
    #[serde(default, skip_serializing_if = "Components::is_empty")]
    #[builder(default)]
    pub components: Components,

    /// Security mechanisms that can be used across the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityRequirements>,

    /// Connectivity information for target servers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Servers>,

    /// Tags used by the document with additional metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,

    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    /// Minor version every node below was stamped with. Builders start at
    /// 0 and leave children unstamped.
    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

type Step<'a> = (&'static str, Box<dyn Fn() -> OpenApiResult<()> + 'a>);

impl OpenApi {
    /// Create an empty document declaring `version`.
    ///
    /// `info` and `paths` start absent and `components` empty, so the result
    /// does not validate until both are set. The minor version stamp starts
    /// at 0 whatever `version` says; decoding is what reads it.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            openapi: version.into(),
            info: None,
            paths: None,
            components: Components::new(),
            security: None,
            servers: None,
            tags: None,
            external_docs: None,
            extensions: Extensions::new(),
            minor_version: 0,
        }
    }

    /// Set the info object and stamp it with the document version
    pub fn with_info(mut self, info: Info) -> Self {
        self.info = Some(info);
        self.stamp_version(self.minor_version);
        self
    }

    /// Set the paths and stamp them with the document version
    pub fn with_paths(mut self, paths: Paths) -> Self {
        self.paths = Some(paths);
        self.stamp_version(self.minor_version);
        self
    }

    /// Set the components and stamp them with the document version
    pub fn with_components(mut self, components: Components) -> Self {
        self.components = components;
        self.stamp_version(self.minor_version);
        self
    }

    /// Set the document-wide security requirements
    pub fn with_security(mut self, security: SecurityRequirements) -> Self {
        self.security = Some(security);
        self.stamp_version(self.minor_version);
        self
    }

    /// Set the tags
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self.stamp_version(self.minor_version);
        self
    }

    /// Set the external documentation
    pub fn with_external_docs(mut self, external_docs: ExternalDocs) -> Self {
        self.external_docs = Some(external_docs);
        self.stamp_version(self.minor_version);
        self
    }

    /// Add a server
    pub fn with_server(mut self, server: Server) -> Self {
        self.add_server(server);
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

    /// Re-stamp the whole tree with `minor`. The `openapi` string is left
    /// untouched.
    pub fn set_minor_version(&mut self, minor: u64) -> &mut Self {
        self.stamp_version(minor);
        self
    }

    /// Re-stamp the whole tree with `minor`, see [`OpenApi::set_minor_version`]
    pub fn with_minor_version(mut self, minor: u64) -> Self {
        self.set_minor_version(minor);
        self
    }

    /// Attach `operation` under `path` and `method`, creating `paths` and
    /// the path item when needed. Replaces any operation already there.
    pub fn add_operation(
        &mut self,
        path: impl Into<String>,
        method: HttpMethod,
        mut operation: Operation,
    ) {
        let minor = self.minor_version;
        operation.stamp_version(minor);

        let paths = self.paths.get_or_insert_with(|| {
            let mut paths = Paths::new();
            paths.stamp_version(minor);
            paths
        });
        let item = paths.item_mut(path);
        item.set_operation(method, operation);
        item.stamp_version(minor);
    }

    /// Append a server, creating the list when absent. Duplicates are kept.
    pub fn add_server(&mut self, mut server: Server) {
        server.stamp_version(self.minor_version);
        self.servers.get_or_insert_with(Vec::new).push(server);
    }

    /// Look up an operation by method and path
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.as_ref()?.get(path)?.get_operation(method)
    }

    /// Validate with default options
    pub fn validate(&self) -> OpenApiResult<()> {
        self.validate_with(&ValidationOptions::default())
    }

    /// Validate the whole document.
    ///
    /// Top-level steps run in a fixed order: `openapi`, `components`,
    /// `info`, `paths`, `security`, `servers`, `tags`, `external docs`.
    /// The first failure is returned wrapped in the step's label unless
    /// [`ValidationOptions::accumulate_errors`] is set, in which case every
    /// step runs and the failures come back together.
    pub fn validate_with(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        debug!(
            openapi = %self.openapi,
            minor = self.minor_version,
            accumulate = options.accumulate_errors,
            "validating document"
        );

        let mut failures = Vec::new();
        for (label, step) in self.steps(options) {
            options.check_cancelled()?;
            trace!(step = label, "validation step");

            if let Err(err) = step() {
                let err = err.within(label);
                if !options.accumulate_errors {
                    debug!(error = %err, "document invalid");
                    return Err(err);
                }
                failures.push(err);
            }
        }

        debug!(failures = failures.len(), "validation finished");
        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(OpenApiError::Multiple(failures)),
        }
    }

    fn steps<'a>(&'a self, options: &'a ValidationOptions) -> [Step<'a>; 8] {
        [
            ("openapi", Box::new(move || validate_openapi_version(&self.openapi))),
            ("components", Box::new(move || self.components.validate(options))),
            (
                "info",
                Box::new(move || match self.info {
                    Some(ref info) => info.validate(options),
                    None => Err(OpenApiError::missing_field("info")),
                }),
            ),
            (
                "paths",
                Box::new(move || match self.paths {
                    Some(ref paths) => paths.validate(options),
                    None => Err(OpenApiError::missing_field("paths")),
                }),
            ),
            ("security", Box::new(move || validate_present(&self.security, options))),
            ("servers", Box::new(move || validate_present(&self.servers, options))),
            ("tags", Box::new(move || validate_present(&self.tags, options))),
            (
                "external docs",
                Box::new(move || validate_present(&self.external_docs, options)),
            ),
        ]
    }
}

fn validate_present<T: Validate>(value: &Option<T>, options: &ValidationOptions) -> OpenApiResult<()> {
    match value {
        Some(value) => value.validate(options),
        None => Ok(()),
    }
}

impl_extensible!(OpenApi);

impl StampVersion for OpenApi {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        self.info.stamp_version(minor);
        self.paths.stamp_version(minor);
        self.components.stamp_version(minor);
        self.security.stamp_version(minor);
        self.servers.stamp_version(minor);
        self.tags.stamp_version(minor);
        self.external_docs.stamp_version(minor);
    }
}

impl Versioned for OpenApi {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for OpenApi {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        self.validate_with(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Cancellation, ErrorKind, ExternalDocs, Reference, Response, Responses, SecurityRequirement,
        Tag, ValidationOption,
    };

    fn ok_operation() -> Operation {
        Operation::new().with_responses(Responses::new().with_response("200", Response::new("OK")))
    }

    fn minimal(version: &str) -> OpenApi {
        OpenApi::new(version)
            .with_info(Info::new("Pet Store", "1.0.0"))
            .with_paths(Paths::new())
    }

    #[test]
    fn test_new_document_is_incomplete() {
        let doc = OpenApi::new("3.0.3");
        assert!(doc.info.is_none());
        assert!(doc.paths.is_none());
        assert!(doc.components.is_empty());
        assert_eq!(doc.minor_version(), 0);

        assert_eq!(
            doc.validate(),
            Err(OpenApiError::missing_field("info").within("info"))
        );
    }

    #[test]
    fn test_minimal_document_is_valid() {
        assert!(minimal("3.0.3").validate().is_ok());
        assert!(minimal("3.1.0").with_minor_version(1).validate().is_ok());
    }

    #[test]
    fn test_built_document_needs_explicit_stamp() {
        let doc = OpenApi::builder()
            .openapi("3.1.0".to_string())
            .info(Info::new("Pet Store", "1.0.0").with_summary("Pets"))
            .paths(Paths::new())
            .build();

        assert_eq!(doc.minor_version(), 0);
        assert_eq!(doc.validate().unwrap_err().attribution(), vec!["info"]);

        let doc = doc.with_minor_version(1);
        assert_eq!(doc.info.as_ref().map(Versioned::minor_version), Some(1));
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_empty_version_is_attributed_to_openapi() {
        let err = minimal("").validate().unwrap_err();
        assert_eq!(err.attribution(), vec!["openapi"]);
        assert_eq!(err.root_cause(), &OpenApiError::missing_field("openapi"));
    }

    #[test]
    fn test_unsupported_version() {
        let err = minimal("2.0.0").validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(err.attribution(), vec!["openapi"]);
    }

    #[test]
    fn test_missing_paths() {
        let doc = OpenApi::new("3.0.3").with_info(Info::new("Pet Store", "1.0.0"));
        assert_eq!(doc.validate().unwrap_err().to_string(), "invalid paths: missing field 'paths'");
    }

    #[test]
    fn test_first_failure_wins() {
        let mut doc = minimal("3.0.3");
        doc.info = Some(Info::new("", "1.0.0"));
        doc.add_operation("/x", HttpMethod::Get, Operation::new());

        assert_eq!(
            doc.validate().unwrap_err().to_string(),
            "invalid info: missing field 'title'"
        );
    }

    #[test]
    fn test_operation_error_chain() {
        let mut doc = minimal("3.0.3");
        doc.add_operation("/x", HttpMethod::Get, Operation::new());

        let err = doc.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid paths: invalid operation get /x: missing field 'responses'"
        );
        assert_eq!(err.attribution(), vec!["paths", "operation get /x"]);
        assert_eq!(err.kind(), ErrorKind::MissingField);
    }

    #[test]
    fn test_responses_optional_in_3_1() {
        let mut doc = minimal("3.1.0").with_minor_version(1);
        doc.add_operation("/x", HttpMethod::Get, Operation::new());
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_minor_version_reaches_earlier_operations() {
        let mut doc = minimal("3.1.0");
        doc.add_operation("/x", HttpMethod::Get, Operation::new());
        assert!(doc.validate().is_err());

        doc.set_minor_version(1);
        assert_eq!(doc.minor_version(), 1);
        assert_eq!(
            doc.operation("/x", HttpMethod::Get).map(Versioned::minor_version),
            Some(1)
        );
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_add_operation_reuses_collections() {
        let mut doc = OpenApi::new("3.0.3");
        doc.add_operation("/pets", HttpMethod::Get, ok_operation().with_operation_id("first"));
        doc.add_operation("/pets", HttpMethod::Post, ok_operation().with_operation_id("create"));
        doc.add_operation("/pets", HttpMethod::Get, ok_operation().with_operation_id("second"));

        let paths = doc.paths.as_ref().unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths.get("/pets").unwrap().operations().count(), 2);
        assert_eq!(
            doc.operation("/pets", HttpMethod::Get)
                .and_then(|op| op.operation_id.as_deref()),
            Some("second")
        );
    }

    #[test]
    fn test_add_server_keeps_duplicates() {
        let mut doc = minimal("3.0.3");
        doc.add_server(Server::new("https://api.example.com"));
        doc.add_server(Server::new("https://api.example.com"));

        assert_eq!(doc.servers.as_ref().map(Vec::len), Some(2));
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_empty_optional_collections_are_valid() {
        let mut doc = minimal("3.0.3")
            .with_security(Vec::new())
            .with_tags(Vec::new());
        doc.servers = Some(Vec::new());
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_optional_sections_are_attributed() {
        let doc = minimal("3.0.3").with_external_docs(ExternalDocs::new("nowhere"));
        assert_eq!(doc.validate().unwrap_err().attribution(), vec!["external docs"]);

        let doc = minimal("3.0.3").with_tags(vec![Tag::new("a"), Tag::new("a")]);
        assert_eq!(
            doc.validate().unwrap_err().to_string(),
            "invalid tags: duplicate tag 'a'"
        );

        let doc = minimal("3.0.3")
            .with_security(vec![SecurityRequirement::new().with_scheme("", ["read"])]);
        assert_eq!(
            doc.validate().unwrap_err().attribution(),
            vec!["security", "security requirement 0"]
        );
    }

    #[test]
    fn test_components_validated_before_info() {
        let doc = OpenApi::new("3.0.3")
            .with_components(Components::new().with_schema("bad key", crate::Schema::object()));

        assert_eq!(
            doc.validate().unwrap_err().attribution(),
            vec!["components", "schema bad key"]
        );
    }

    #[test]
    fn test_accumulating_mode() {
        let mut doc = OpenApi::new("3.0.3");
        doc.add_server(Server::new(""));

        let options: ValidationOptions =
            std::iter::once(ValidationOption::AccumulateErrors).collect();
        let err = doc.validate_with(&options).unwrap_err();

        let OpenApiError::Multiple(failures) = &err else {
            panic!("expected several failures, got {err}");
        };
        let labels: Vec<&str> = failures.iter().map(|e| e.attribution()[0]).collect();
        assert_eq!(labels, ["info", "paths", "servers"]);

        // A single failure is not wrapped in Multiple
        let doc = OpenApi::new("3.0.3").with_paths(Paths::new());
        assert_eq!(
            doc.validate_with(&options),
            Err(OpenApiError::missing_field("info").within("info"))
        );
    }

    #[test]
    fn test_cancelled_validation() {
        let cancellation = Cancellation::new();
        let options: ValidationOptions =
            std::iter::once(ValidationOption::CancelWith(cancellation.clone())).collect();

        let doc = minimal("3.0.3");
        assert!(doc.validate_with(&options).is_ok());

        cancellation.cancel();
        assert_eq!(doc.validate_with(&options), Err(OpenApiError::Cancelled));
    }

    #[test]
    fn test_reference_siblings_follow_document_version() {
        let operation = Operation::new()
            .with_parameter_ref(Reference::parameter("limit").with_description("Page size"))
            .with_responses(Responses::new().with_response("200", Response::new("OK")));

        let mut doc = minimal("3.0.3");
        doc.add_operation("/pets", HttpMethod::Get, operation);
        let err = doc.validate().unwrap_err();
        assert_eq!(
            err.root_cause(),
            &OpenApiError::invalid_value("description", "requires OpenAPI 3.1 or later")
        );

        doc.set_minor_version(1);
        assert!(doc.validate().is_ok());
    }
}
