//! Paths Object and Path Item Object.

use crate::{
    Extensions, Operation, Parameter, ReferenceOr, Servers,
    error::{OpenApiError, OpenApiResult},
    extensions::{deserialize_patterned, impl_extensible, serialize_patterned},
    operation::{inline_path_parameters, validate_parameter_list},
    validation::{Validate, ValidateUnique, ValidationOptions, template_variables},
    versioning::{StampVersion, Versioned},
};
use bon::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The HTTP methods a path item can hold an operation for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Every method, in the order operations are visited and encoded
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// Lowercase name as used for the path item field
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = OpenApiError;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                OpenApiError::invalid_value("method", format!("'{s}' is not an HTTP method"))
            })
    }
}

/// Describes the operations available on a single path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Builder)]
pub struct PathItem {
    /// Allows for a referenced definition of this path item.
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,

    /// Alternative servers for every operation in this path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Servers>,

    /// Parameters shared by every operation in this path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ReferenceOr<Parameter>>>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl PathItem {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, method: HttpMethod) -> &Option<Operation> {
        match method {
            HttpMethod::Get => &self.get,
            HttpMethod::Put => &self.put,
            HttpMethod::Post => &self.post,
            HttpMethod::Delete => &self.delete,
            HttpMethod::Options => &self.options,
            HttpMethod::Head => &self.head,
            HttpMethod::Patch => &self.patch,
            HttpMethod::Trace => &self.trace,
        }
    }

    fn slot_mut(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Trace => &mut self.trace,
        }
    }

    /// Put `operation` in the slot for `method`, returning what was there
    pub fn set_operation(&mut self, method: HttpMethod, operation: Operation) -> Option<Operation> {
        self.slot_mut(method).replace(operation)
    }

    pub fn get_operation(&self, method: HttpMethod) -> Option<&Operation> {
        self.slot(method).as_ref()
    }

    pub fn get_operation_mut(&mut self, method: HttpMethod) -> Option<&mut Operation> {
        self.slot_mut(method).as_mut()
    }

    pub fn remove_operation(&mut self, method: HttpMethod) -> Option<Operation> {
        self.slot_mut(method).take()
    }

    /// Present operations in method order
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(|method| self.get_operation(method).map(|op| (method, op)))
    }

    /// Set the operation for `method`
    pub fn with_operation(mut self, method: HttpMethod, operation: Operation) -> Self {
        self.set_operation(method, operation);
        self
    }

    /// Add a parameter shared by every operation on this path
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters
            .get_or_insert_with(Vec::new)
            .push(ReferenceOr::Item(parameter));
        self
    }

    /// Set the summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Check the path template against declared path parameters
    fn validate_template(&self, template: &str, operation: &Operation) -> OpenApiResult<()> {
        for name in template_variables(template) {
            let declared = inline_path_parameters(self.parameters.as_deref())
                .chain(operation.path_parameter_names())
                .any(|declared| declared == name);

            // Referenced parameters cannot be resolved here, so any
            // reference is given the benefit of the doubt
            let has_references = self
                .parameters
                .iter()
                .chain(operation.parameters.iter())
                .flatten()
                .any(|parameter| parameter.as_reference().is_some());

            if !declared && !has_references {
                return Err(OpenApiError::structural(format!(
                    "path parameter '{name}' is not declared"
                )));
            }
        }
        Ok(())
    }
}

impl_extensible!(PathItem, Paths);

impl StampVersion for PathItem {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        for method in HttpMethod::ALL {
            self.slot_mut(method).stamp_version(minor);
        }
        self.servers.stamp_version(minor);
        self.parameters.stamp_version(minor);
    }
}

impl Versioned for PathItem {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

/// Validates the path-level fields only. Operations are validated by
/// [`Paths`], which knows the template they are mounted on.
impl Validate for PathItem {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        if let Some(ref parameters) = self.parameters {
            validate_parameter_list(parameters, options)?;
        }

        if let Some(ref servers) = self.servers {
            servers.validate(options).map_err(|e| e.within("servers"))?;
        }

        Ok(())
    }
}

/// Holds the relative paths to the individual endpoints and their
/// operations, in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paths {
    entries: IndexMap<String, PathItem>,
    pub extensions: Extensions,
    minor_version: u64,
}

impl Paths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, item: PathItem) -> Option<PathItem> {
        self.entries.insert(path.into(), item)
    }

    /// Add a path item
    pub fn with_path(mut self, path: impl Into<String>, item: PathItem) -> Self {
        self.insert(path, item);
        self
    }

    pub fn get(&self, path: &str) -> Option<&PathItem> {
        self.entries.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut PathItem> {
        self.entries.get_mut(path)
    }

    /// The item for `path`, created empty if missing
    pub fn item_mut(&mut self, path: impl Into<String>) -> &mut PathItem {
        self.entries.entry(path.into()).or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PathItem)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every operation with its method and path
    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &Operation)> {
        self.entries.iter().flat_map(|(path, item)| {
            item.operations()
                .map(move |(method, operation)| (path.as_str(), method, operation))
        })
    }
}

/// `/pets/{petId}` and `/pets/{id}` both become `/pets/{}`
fn normalize_template(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    let mut in_variable = false;
    for ch in path.chars() {
        match ch {
            '{' => {
                in_variable = true;
                normalized.push('{');
            }
            '}' if in_variable => {
                in_variable = false;
                normalized.push('}');
            }
            _ if in_variable => {}
            _ => normalized.push(ch),
        }
    }
    normalized
}

impl Serialize for Paths {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_patterned(&self.entries, &self.extensions, serializer)
    }
}

impl<'de> Deserialize<'de> for Paths {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (entries, extensions) = deserialize_patterned(deserializer)?;
        Ok(Self {
            entries,
            extensions,
            minor_version: 0,
        })
    }
}

impl StampVersion for Paths {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
        self.entries.stamp_version(minor);
    }
}

impl Versioned for Paths {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for Paths {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        let mut normalized: HashMap<String, &str> = HashMap::with_capacity(self.entries.len());

        for (path, item) in &self.entries {
            if !path.starts_with('/') {
                return Err(OpenApiError::structural(format!(
                    "path '{path}' does not start with '/'"
                )));
            }

            if let Some(existing) = normalized.insert(normalize_template(path), path) {
                return Err(OpenApiError::structural(format!(
                    "conflicting paths '{existing}' and '{path}'"
                )));
            }

            item.validate(options)
                .map_err(|e| e.within(format!("path {path}")))?;

            for (method, operation) in item.operations() {
                operation
                    .validate(options)
                    .and_then(|()| item.validate_template(path, operation))
                    .map_err(|e| e.within(format!("operation {method} {path}")))?;
            }
        }

        let operation_ids: Vec<&str> = self
            .operations()
            .filter_map(|(_, _, operation)| operation.operation_id.as_deref())
            .collect();
        operation_ids.validate_unique(|id| id.to_string(), "operationId")
    }
}
