//! Schema and Example objects.
//!
//! Schemas are kept as raw JSON: evaluating the schema language is not this
//! crate's job. Only the structural rules that depend on the OpenAPI minor
//! version are checked here.

use crate::error::{OpenApiError, OpenApiResult};
use crate::extensions::{impl_extensible, Extensions};
use crate::validation::{Validate, ValidationOptions};
use crate::versioning::{StampVersion, Versioned};
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keywords accepted in a schema object when extra properties are not allowed
const SCHEMA_KEYWORDS: &[&str] = &[
    "$ref",
    "$id",
    "$schema",
    "$anchor",
    "$defs",
    "$comment",
    "$dynamicRef",
    "$dynamicAnchor",
    "title",
    "description",
    "type",
    "format",
    "default",
    "enum",
    "const",
    "multipleOf",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "items",
    "prefixItems",
    "maxItems",
    "minItems",
    "uniqueItems",
    "contains",
    "maxContains",
    "minContains",
    "maxProperties",
    "minProperties",
    "required",
    "properties",
    "patternProperties",
    "additionalProperties",
    "propertyNames",
    "dependentRequired",
    "dependentSchemas",
    "unevaluatedItems",
    "unevaluatedProperties",
    "allOf",
    "oneOf",
    "anyOf",
    "not",
    "if",
    "then",
    "else",
    "nullable",
    "discriminator",
    "readOnly",
    "writeOnly",
    "xml",
    "externalDocs",
    "example",
    "examples",
    "deprecated",
    "contentMediaType",
    "contentEncoding",
    "contentSchema",
];

/// A Schema Object, held as its raw JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    value: Value,

    #[serde(skip)]
    minor_version: u64,
}

impl Schema {
    /// Wrap a raw schema value
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            minor_version: 0,
        }
    }

    pub fn string() -> Self {
        Self::of_type("string")
    }

    pub fn integer() -> Self {
        Self::of_type("integer")
    }

    pub fn object() -> Self {
        Self::of_type("object")
    }

    fn of_type(ty: &str) -> Self {
        Self::new(serde_json::json!({ "type": ty }))
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl StampVersion for Schema {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
    }
}

impl Versioned for Schema {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for Schema {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        match &self.value {
            Value::Object(map) => {
                if options.allow_extra_properties_in_schemas {
                    return Ok(());
                }
                match map
                    .keys()
                    .find(|key| !key.starts_with("x-") && !SCHEMA_KEYWORDS.contains(&key.as_str()))
                {
                    Some(key) => Err(OpenApiError::structural(format!(
                        "unsupported schema property '{key}'"
                    ))),
                    None => Ok(()),
                }
            }
            Value::Bool(_) if self.is_at_least_3_1() => Ok(()),
            Value::Bool(_) => Err(OpenApiError::invalid_value(
                "schema",
                "boolean schemas require OpenAPI 3.1 or later",
            )),
            _ => Err(OpenApiError::invalid_value("schema", "must be an object")),
        }
    }
}

/// An Example Object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct Example {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Embedded literal example.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// A URL that points to the literal example.
    #[serde(rename = "externalValue", skip_serializing_if = "Option::is_none")]
    pub external_value: Option<String>,

    #[serde(flatten, skip_serializing_if = "Extensions::is_empty")]
    #[builder(default)]
    pub extensions: Extensions,

    #[serde(skip)]
    #[builder(skip)]
    minor_version: u64,
}

impl Example {
    /// Create an example holding an embedded value
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            summary: None,
            description: None,
            value: Some(value.into()),
            external_value: None,
            extensions: Extensions::new(),
            minor_version: 0,
        }
    }

    /// Create an example pointing at an external value
    pub fn external(url: impl Into<String>) -> Self {
        Self {
            value: None,
            external_value: Some(url.into()),
            ..Self::new(Value::Null)
        }
    }

    /// Set the summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

impl_extensible!(Example);

impl StampVersion for Example {
    fn stamp_version(&mut self, minor: u64) {
        self.minor_version = minor;
    }
}

impl Versioned for Example {
    fn minor_version(&self) -> u64 {
        self.minor_version
    }
}

impl Validate for Example {
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()> {
        if options.skip_examples_validation {
            return Ok(());
        }
        if self.value.is_some() && self.external_value.is_some() {
            return Err(OpenApiError::structural(
                "value and externalValue are mutually exclusive",
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
    fn test_schema_rejects_unknown_keywords() {
        let schema = Schema::new(json!({"type": "string", "maxLenght": 3}));
        let strict = ValidationOptions::default();
        assert_eq!(
            schema.validate(&strict),
            Err(OpenApiError::structural(
                "unsupported schema property 'maxLenght'"
            ))
        );

        let relaxed = ValidationOptions::builder()
            .allow_extra_properties_in_schemas(true)
            .build();
        assert!(schema.validate(&relaxed).is_ok());
    }

    #[test]
    fn test_schema_extensions_are_allowed() {
        let schema = Schema::new(json!({"type": "string", "x-go-type": "uuid.UUID"}));
        assert!(schema.validate(&ValidationOptions::default()).is_ok());
    }

    #[test]
    fn test_boolean_schema_needs_3_1() {
        let options = ValidationOptions::default();
        let mut schema = Schema::new(true);
        assert!(schema.validate(&options).is_err());

        schema.stamp_version(1);
        assert!(schema.validate(&options).is_ok());

        assert!(Schema::new(42).validate(&options).is_err());
    }

    #[test]
    fn test_schema_is_transparent() {
        let schema: Schema = serde_json::from_value(json!({"type": "integer"})).unwrap();
        assert_eq!(schema, Schema::integer());
        assert_eq!(serde_json::to_value(&schema).unwrap(), json!({"type": "integer"}));
    }

    #[test]
    fn test_example_value_exclusivity() {
        let mut example = Example::new(json!({"id": 1}));
        example.external_value = Some("https://example.com/pet.json".to_string());

        assert!(example.validate(&ValidationOptions::default()).is_err());

        let skip = ValidationOptions::builder()
            .skip_examples_validation(true)
            .build();
        assert!(example.validate(&skip).is_ok());

        assert!(
            Example::external("https://example.com/pet.json")
                .validate(&ValidationOptions::default())
                .is_ok()
        );
    }
}
