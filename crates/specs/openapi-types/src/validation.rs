//! Validation traits, options and utilities for OpenAPI documents.

use crate::error::{OpenApiError, OpenApiResult};
use bon::Builder;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Trait for validating OpenAPI document objects.
///
/// The same options reference is handed down the whole graph, so every
/// nested validator sees the settings chosen for the call.
pub trait Validate {
    /// Returns `Ok(())` if valid, or the first failure found below this node.
    fn validate(&self, options: &ValidationOptions) -> OpenApiResult<()>;
}

/// Shared flag a caller can flip to stop an in-flight validation.
///
/// Validation checks the flag between top-level steps only.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that validations holding this handle stop
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Settings that adjust how a document is validated.
///
/// Loadable from configuration; keys this type does not know are ignored.
#[derive(Debug, Clone, Default, Deserialize, Builder)]
#[serde(default)]
pub struct ValidationOptions {
    /// Disable the `example`/`examples` and `value`/`externalValue` checks
    #[builder(default)]
    pub skip_examples_validation: bool,

    /// Accept schema keys outside the known keyword set
    #[builder(default)]
    pub allow_extra_properties_in_schemas: bool,

    /// Run every top-level step and report all failures together
    #[builder(default)]
    pub accumulate_errors: bool,

    #[serde(skip)]
    pub cancellation: Option<Cancellation>,
}

/// A single validation setting, for callers that collect options as a list.
#[derive(Debug, Clone)]
pub enum ValidationOption {
    SkipExamplesValidation,
    AllowExtraPropertiesInSchemas,
    AccumulateErrors,
    CancelWith(Cancellation),
}

impl ValidationOptions {
    /// Load options from a TOML document such as
    ///
    /// ```toml
    /// skip_examples_validation = true
    /// ```
    pub fn from_toml_str(source: &str) -> OpenApiResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Apply a single option entry
    pub fn apply(&mut self, option: ValidationOption) {
        match option {
            ValidationOption::SkipExamplesValidation => self.skip_examples_validation = true,
            ValidationOption::AllowExtraPropertiesInSchemas => {
                self.allow_extra_properties_in_schemas = true
            }
            ValidationOption::AccumulateErrors => self.accumulate_errors = true,
            ValidationOption::CancelWith(cancellation) => self.cancellation = Some(cancellation),
        }
    }

    /// Fail with [`OpenApiError::Cancelled`] if the caller asked to stop
    pub fn check_cancelled(&self) -> OpenApiResult<()> {
        match &self.cancellation {
            Some(cancellation) if cancellation.is_cancelled() => Err(OpenApiError::Cancelled),
            _ => Ok(()),
        }
    }
}

impl FromIterator<ValidationOption> for ValidationOptions {
    fn from_iter<I: IntoIterator<Item = ValidationOption>>(iter: I) -> Self {
        let mut options = Self::default();
        for option in iter {
            options.apply(option);
        }
        options
    }
}

/// Trait for validating collections with uniqueness constraints.
pub trait ValidateUnique<T> {
    /// Validate that all items have unique keys according to `key_fn`.
    fn validate_unique<K, F>(&self, key_fn: F, context: &str) -> OpenApiResult<()>
    where
        K: std::hash::Hash + Eq + std::fmt::Display,
        F: Fn(&T) -> K;
}

impl<T> ValidateUnique<T> for [T] {
    fn validate_unique<K, F>(&self, key_fn: F, context: &str) -> OpenApiResult<()>
    where
        K: std::hash::Hash + Eq + std::fmt::Display,
        F: Fn(&T) -> K,
    {
        let mut seen = HashSet::new();
        for item in self {
            let key = key_fn(item);
            let rendered = key.to_string();
            if !seen.insert(key) {
                return Err(OpenApiError::structural(format!(
                    "duplicate {context} '{rendered}'"
                )));
            }
        }
        Ok(())
    }
}

/// Fail with `MissingField` when a required string is empty
pub fn require_non_empty(value: &str, field: &str) -> OpenApiResult<()> {
    if value.is_empty() {
        return Err(OpenApiError::missing_field(field));
    }
    Ok(())
}

/// Fail with `InvalidValue` when a 3.1-only field shows up in a 3.0 document
pub fn require_minor(minor: u64, needed: u64, field: &str) -> OpenApiResult<()> {
    if minor < needed {
        return Err(OpenApiError::invalid_value(
            field,
            format!("requires OpenAPI 3.{needed} or later"),
        ));
    }
    Ok(())
}

/// Validate URL format
pub fn validate_url(url: &str, field: &str) -> OpenApiResult<()> {
    if url.is_empty() {
        return Err(OpenApiError::missing_field(field));
    }

    // Absolute URLs need a scheme; relative references are allowed
    if !url.contains("://") && !url.starts_with('/') && !url.starts_with('.') {
        return Err(OpenApiError::invalid_value(
            field,
            format!("'{url}' is not a URL"),
        ));
    }

    Ok(())
}

/// Validate email format
pub fn validate_email(email: &str, field: &str) -> OpenApiResult<()> {
    let invalid = || OpenApiError::invalid_value(field, format!("'{email}' is not an email"));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    // Domain must contain at least one dot
    if !domain.contains('.') {
        return Err(invalid());
    }

    Ok(())
}

/// Validate the root `openapi` version string
pub fn validate_openapi_version(version: &str) -> OpenApiResult<()> {
    require_non_empty(version, "openapi")?;

    match crate::version::parse_minor(version) {
        None => Err(OpenApiError::invalid_value(
            "openapi",
            format!("'{version}' does not match 3.<minor>.<patch>"),
        )),
        Some(minor) if !crate::version::SUPPORTED_MINORS.contains(&minor) => Err(
            OpenApiError::invalid_value("openapi", format!("unsupported version '{version}'")),
        ),
        Some(_) => Ok(()),
    }
}

/// Validate that a component key matches `^[a-zA-Z0-9.\-_]+$`
pub fn validate_component_key(key: &str) -> OpenApiResult<()> {
    if key.is_empty() {
        return Err(OpenApiError::structural("component key cannot be empty"));
    }

    if let Some(ch) = key
        .chars()
        .find(|ch| !ch.is_ascii_alphanumeric() && !matches!(ch, '.' | '-' | '_'))
    {
        return Err(OpenApiError::structural(format!(
            "invalid character '{ch}' in component key '{key}'"
        )));
    }

    Ok(())
}

/// Names between `{` and `}` in a templated path or server URL
pub fn template_variables(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        names.push(&after[..end]);
        rest = &after[end + 1..];
    }
    names
}

/// Fail when `example` and `examples` are both present on one object
pub fn validate_example_exclusivity(
    has_example: bool,
    has_examples: bool,
    options: &ValidationOptions,
) -> OpenApiResult<()> {
    if options.skip_examples_validation {
        return Ok(());
    }
    if has_example && has_examples {
        return Err(OpenApiError::structural(
            "example and examples are mutually exclusive",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com", "url").is_ok());
        assert!(validate_url("http://localhost:8080", "url").is_ok());
        assert!(validate_url("/relative/path", "url").is_ok());
        assert!(validate_url("./docs.html", "url").is_ok());

        assert_eq!(
            validate_url("", "url"),
            Err(OpenApiError::missing_field("url"))
        );
        assert!(validate_url("not-a-url", "url").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com", "email").is_ok());
        assert!(validate_email("user.name@domain.co.uk", "email").is_ok());

        assert!(validate_email("", "email").is_err());
        assert!(validate_email("invalid", "email").is_err());
        assert!(validate_email("@example.com", "email").is_err());
        assert!(validate_email("test@", "email").is_err());
        assert!(validate_email("test@invalid", "email").is_err());
    }

    #[test]
    fn test_validate_openapi_version() {
        assert!(validate_openapi_version("3.0.3").is_ok());
        assert!(validate_openapi_version("3.1.0").is_ok());

        assert_eq!(
            validate_openapi_version(""),
            Err(OpenApiError::missing_field("openapi"))
        );
        assert!(matches!(
            validate_openapi_version("2.0"),
            Err(OpenApiError::InvalidValue { .. })
        ));
        assert!(matches!(
            validate_openapi_version("3.9.0"),
            Err(OpenApiError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_component_key() {
        assert!(validate_component_key("Pet").is_ok());
        assert!(validate_component_key("pet.v1").is_ok());
        assert!(validate_component_key("pet-v1_final").is_ok());

        assert!(validate_component_key("").is_err());
        assert!(validate_component_key("pet store").is_err());
        assert!(validate_component_key("pet$").is_err());
    }

    #[test]
    fn test_template_variables() {
        assert_eq!(
            template_variables("/pets/{petId}/toys/{toyId}"),
            vec!["petId", "toyId"]
        );
        assert_eq!(
            template_variables("https://{region}.example.com:{port}"),
            vec!["region", "port"]
        );
        assert!(template_variables("/pets").is_empty());
        assert!(template_variables("/broken/{open").is_empty());
    }

    #[test]
    fn test_validate_unique() {
        let items = vec!["a", "b", "c"];
        assert!(items.validate_unique(|s| *s, "tag").is_ok());

        let items = vec!["a", "b", "a"];
        assert_eq!(
            items.validate_unique(|s| *s, "tag"),
            Err(OpenApiError::structural("duplicate tag 'a'"))
        );
    }

    #[test]
    fn test_options_from_iter() {
        let options: ValidationOptions = [
            ValidationOption::SkipExamplesValidation,
            ValidationOption::AccumulateErrors,
        ]
        .into_iter()
        .collect();

        assert!(options.skip_examples_validation);
        assert!(options.accumulate_errors);
        assert!(!options.allow_extra_properties_in_schemas);
        assert!(options.check_cancelled().is_ok());
    }

    #[test]
    fn test_options_from_toml_ignores_unknown_keys() {
        let options = ValidationOptions::from_toml_str(
            r#"
            allow_extra_properties_in_schemas = true
            some_future_switch = "ignored"
            "#,
        )
        .unwrap();

        assert!(options.allow_extra_properties_in_schemas);
        assert!(!options.skip_examples_validation);

        assert!(matches!(
            ValidationOptions::from_toml_str("skip_examples_validation = 3"),
            Err(OpenApiError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_options_builder() {
        let options = ValidationOptions::builder()
            .skip_examples_validation(true)
            .build();
        assert!(options.skip_examples_validation);
        assert!(!options.accumulate_errors);
    }

    #[test]
    fn test_cancellation() {
        let cancellation = Cancellation::new();
        let options: ValidationOptions =
            std::iter::once(ValidationOption::CancelWith(cancellation.clone())).collect();

        assert!(options.check_cancelled().is_ok());
        cancellation.cancel();
        assert_eq!(options.check_cancelled(), Err(OpenApiError::Cancelled));
    }

    #[test]
    fn test_example_exclusivity() {
        let strict = ValidationOptions::default();
        assert!(validate_example_exclusivity(true, false, &strict).is_ok());
        assert!(validate_example_exclusivity(true, true, &strict).is_err());

        let relaxed = ValidationOptions::builder()
            .skip_examples_validation(true)
            .build();
        assert!(validate_example_exclusivity(true, true, &relaxed).is_ok());
    }
}
