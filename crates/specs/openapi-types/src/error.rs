//! Error types for OpenAPI document validation and processing.

use thiserror::Error;

/// Errors that can occur when working with OpenAPI documents.
///
/// Validation failures are reported as a chain: every validator that hands a
/// child failure to its caller adds exactly one [`OpenApiError::Invalid`]
/// layer naming the field it was checking. The rendered message therefore
/// reads like a path, e.g.
/// `invalid paths: invalid operation get /x: missing field 'responses'`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpenApiError {
    /// A required field is absent or empty
    #[error("missing field '{field}'")]
    MissingField {
        /// Name of the missing required field
        field: String,
    },

    /// A field is present but its value breaks a format or value rule
    #[error("invalid value for '{field}': {message}")]
    InvalidValue {
        /// Name of the offending field
        field: String,
        /// Description of why the value is invalid
        message: String,
    },

    /// An internal invariant of a nested object is broken
    #[error("{message}")]
    StructuralViolation {
        /// Description of the broken invariant
        message: String,
    },

    /// Input bytes could not be decoded into a document
    #[error("decode error: {message}")]
    Decode {
        /// Underlying parser message
        message: String,
    },

    /// A document could not be encoded
    #[error("encode error: {message}")]
    Encode {
        /// Underlying serializer message
        message: String,
    },

    /// Validation options could not be loaded
    #[error("invalid validation config: {message}")]
    InvalidConfig {
        /// Underlying parser message
        message: String,
    },

    /// The caller asked for validation to stop
    #[error("validation cancelled")]
    Cancelled,

    /// Attribution layer naming the field whose validation failed
    #[error("invalid {field}: {source}")]
    Invalid {
        /// Label of the field that produced the failure
        field: String,
        /// The failure reported by that field's validator
        source: Box<OpenApiError>,
    },

    /// Several top-level failures collected in accumulating mode
    #[error("{}", render_multiple(.0))]
    Multiple(Vec<OpenApiError>),
}

/// Coarse classification of a failure's root cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingField,
    InvalidValue,
    StructuralViolation,
    Decode,
    Encode,
    InvalidConfig,
    Cancelled,
    Multiple,
}

fn render_multiple(errors: &[OpenApiError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl OpenApiError {
    /// Create a new missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a new invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new structural violation error
    pub fn structural(message: impl Into<String>) -> Self {
        Self::StructuralViolation {
            message: message.into(),
        }
    }

    /// Create a new decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a new encode error
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Create a new config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Wrap `source` in an attribution layer naming `field`
    pub fn invalid(field: impl Into<String>, source: OpenApiError) -> Self {
        Self::Invalid {
            field: field.into(),
            source: Box::new(source),
        }
    }

    /// Wrap this error in an attribution layer naming `field`
    pub fn within(self, field: impl Into<String>) -> Self {
        Self::invalid(field, self)
    }

    /// Follow attribution layers down to the failure that started the chain
    pub fn root_cause(&self) -> &OpenApiError {
        let mut current = self;
        while let Self::Invalid { source, .. } = current {
            current = source;
        }
        current
    }

    /// Labels of every attribution layer, outermost first
    pub fn attribution(&self) -> Vec<&str> {
        let mut labels = Vec::new();
        let mut current = self;
        while let Self::Invalid { field, source } = current {
            labels.push(field.as_str());
            current = source;
        }
        labels
    }

    /// Classify the root cause
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField { .. } => ErrorKind::MissingField,
            Self::InvalidValue { .. } => ErrorKind::InvalidValue,
            Self::StructuralViolation { .. } => ErrorKind::StructuralViolation,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Encode { .. } => ErrorKind::Encode,
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Multiple(_) => ErrorKind::Multiple,
            Self::Invalid { source, .. } => source.kind(),
        }
    }
}

impl From<serde_json::Error> for OpenApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

impl From<serde_yaml::Error> for OpenApiError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::decode(err.to_string())
    }
}

impl From<toml::de::Error> for OpenApiError {
    fn from(err: toml::de::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}

/// Result type for OpenAPI operations
pub type OpenApiResult<T> = Result<T, OpenApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = OpenApiError::missing_field("responses");
        assert_eq!(err.to_string(), "missing field 'responses'");

        let err = OpenApiError::invalid_value("openapi", "unsupported version 2.0");
        assert_eq!(
            err.to_string(),
            "invalid value for 'openapi': unsupported version 2.0"
        );
    }

    #[test]
    fn test_attribution_chain() {
        let err = OpenApiError::missing_field("responses")
            .within("operation get /x")
            .within("paths");

        assert_eq!(
            err.to_string(),
            "invalid paths: invalid operation get /x: missing field 'responses'"
        );
        assert_eq!(err.attribution(), vec!["paths", "operation get /x"]);
        assert_eq!(err.root_cause(), &OpenApiError::missing_field("responses"));
        assert_eq!(err.kind(), ErrorKind::MissingField);
    }

    #[test]
    fn test_source_chain() {
        let err = OpenApiError::structural("duplicate tag 'pets'").within("tags");
        let source = err.source().expect("attribution layer has a source");
        assert_eq!(source.to_string(), "duplicate tag 'pets'");
        assert!(source.source().is_none());
    }

    #[test]
    fn test_multiple_display() {
        let err = OpenApiError::Multiple(vec![
            OpenApiError::missing_field("info").within("info"),
            OpenApiError::missing_field("paths").within("paths"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid info: missing field 'info'; invalid paths: missing field 'paths'"
        );
        assert_eq!(err.kind(), ErrorKind::Multiple);
        assert!(err.attribution().is_empty());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json");
        assert!(json_err.is_err());

        let err: OpenApiError = json_err.unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
