use crate::validate::ValidationError;
use colored::Colorize;
use std::{fmt, io, path::PathBuf, sync::Arc};

/// Failure of a single conversion primitive, before it is attributed to a key
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// The text is not a valid literal of the wanted type
    #[error("invalid {expected}: {value}")]
    Invalid {
        expected: &'static str,
        value: String,
    },
    /// JSON decoding failed
    #[error("invalid json: {0}")]
    Json(String),
    /// The target type has no defined conversion
    #[error("{0}")]
    Unsupported(String),
}

impl ConversionError {
    pub(crate) fn invalid(expected: &'static str, value: impl Into<String>) -> Self {
        Self::Invalid {
            expected,
            value: value.into(),
        }
    }
}

/// Errors attributed to one environment key
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// A required key, its prefixed alias and its default were all absent
    Missing { key: String },
    /// The raw text could not be converted to the field's type
    TypeMismatch {
        key: String,
        value: String,
        reason: String,
    },
    /// The field's type has no conversion
    UnsupportedType { key: String, reason: String },
    /// Conversion succeeded but the declared rule rejected the value
    ValidationViolation {
        key: String,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn key(&self) -> &str {
        match self {
            ConfigError::Missing { key }
            | ConfigError::TypeMismatch { key, .. }
            | ConfigError::UnsupportedType { key, .. }
            | ConfigError::ValidationViolation { key, .. } => key,
        }
    }

    /// Attribute a conversion failure on `value` to `key`
    pub fn from_conversion(key: &str, value: &str, err: ConversionError) -> Self {
        match err {
            ConversionError::Unsupported(reason) => ConfigError::UnsupportedType {
                key: key.to_string(),
                reason,
            },
            other => ConfigError::TypeMismatch {
                key: key.to_string(),
                value: value.to_string(),
                reason: other.to_string(),
            },
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ConfigError::Missing { .. })
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing { key } => write!(
                f,
                "{}: Is missing from environment and is required",
                key.magenta().bold()
            ),
            ConfigError::TypeMismatch { key, value, reason } => write!(
                f,
                "{}: Invalid value {} ({})",
                key.magenta().bold(),
                format!("'{}'", value).red(),
                reason
            ),
            ConfigError::UnsupportedType { key, reason } => write!(
                f,
                "{}: Unsupported field type ({})",
                key.magenta().bold(),
                reason
            ),
            ConfigError::ValidationViolation { key, source } => write!(
                f,
                "{}: Validation failed: {}",
                key.magenta().bold(),
                source
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ValidationViolation { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Every field failure from one bind, in field declaration order
#[derive(Debug, Clone)]
pub struct BindError {
    errors: Vec<ConfigError>,
}

impl BindError {
    /// Returns `None` when there is nothing to report
    pub fn from_errors(errors: Vec<ConfigError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ConfigError> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Keys of the failing fields, in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(ConfigError::key)
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_config_errors(&self.errors))
    }
}

impl std::error::Error for BindError {}

impl<'a> IntoIterator for &'a BindError {
    type Item = &'a ConfigError;
    type IntoIter = std::slice::Iter<'a, ConfigError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Helper to format multiple configuration errors into a panic message
pub fn format_config_errors(errors: &[ConfigError]) -> String {
    let error_summary = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Configuration failed with {} error(s):\n{}",
        errors.len().to_string().yellow().bold(),
        error_summary
    )
}

/// Errors from reading or applying an env file
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("error reading env file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("invalid line {file}:{line}")]
    InvalidLine { file: String, line: usize },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_display() {
        colored::control::set_override(false);

        let error = ConfigError::Missing {
            key: "DATABASE_URL".to_string(),
        };

        let output = error.to_string();
        assert_eq!(
            output,
            "DATABASE_URL: Is missing from environment and is required"
        );
    }

    #[test]
    fn test_type_mismatch_display() {
        colored::control::set_override(false);

        let error = ConfigError::from_conversion(
            "PORT",
            "not-a-number",
            ConversionError::invalid("int", "not-a-number"),
        );

        let output = error.to_string();
        assert!(output.contains("PORT"));
        assert!(output.contains("Invalid value 'not-a-number'"));
        assert!(output.contains("invalid int: not-a-number"));
    }

    #[test]
    fn test_unsupported_conversion_maps_to_unsupported_type() {
        let error = ConfigError::from_conversion(
            "ENDPOINT",
            "https://example.com",
            ConversionError::Unsupported("use Option<Url>".to_string()),
        );

        assert!(matches!(error, ConfigError::UnsupportedType { .. }));
        assert_eq!(error.key(), "ENDPOINT");
    }

    #[test]
    fn test_validation_violation_has_source() {
        use std::error::Error;

        let error = ConfigError::ValidationViolation {
            key: "WORKERS".to_string(),
            source: ValidationError::AboveMax {
                limit: "10".to_string(),
            },
        };

        assert!(error.source().is_some());
        colored::control::set_override(false);
        assert_eq!(error.to_string(), "WORKERS: Validation failed: must be <= 10");
    }

    #[test]
    fn test_bind_error_requires_errors() {
        assert!(BindError::from_errors(Vec::new()).is_none());
    }

    #[test]
    fn test_bind_error_lists_every_key() {
        colored::control::set_override(false);

        let err = BindError::from_errors(vec![
            ConfigError::Missing {
                key: "VAR1".to_string(),
            },
            ConfigError::TypeMismatch {
                key: "VAR2".to_string(),
                value: "bad".to_string(),
                reason: "invalid int: bad".to_string(),
            },
        ])
        .unwrap();

        assert_eq!(err.len(), 2);
        assert_eq!(err.keys().collect::<Vec<_>>(), vec!["VAR1", "VAR2"]);

        let formatted = err.to_string();
        assert!(formatted.contains("Configuration failed with 2 error(s)"));
        assert!(formatted.contains("  - VAR1"));
        assert!(formatted.contains("  - VAR2"));
    }

    #[test]
    fn test_load_error_display() {
        let err = LoadError::InvalidLine {
            file: ".env".to_string(),
            line: 3,
        };
        assert_eq!(err.to_string(), "invalid line .env:3");
    }
}
