use ferry_error::{ErrorCode, ErrorContext, FerryError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Missing required property {key}")]
    MissingProperty { key: &'static str },

    #[error("Invalid value '{value}' for property {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("The dialect {dialect} does not support the property {key}")]
    UnsupportedProperty {
        key: String,
        dialect: String,
        suggestion: Option<String>,
    },

    #[error("The value '{value}' of property {key} is no longer supported")]
    LegacyValue { key: &'static str, value: String },

    #[error("The dialect {dialect} does not support {element}s but {key} is set")]
    UnsupportedStructureElement {
        key: &'static str,
        element: &'static str,
        dialect: String,
    },

    #[error("Unknown capability '{name}' in EXCLUDED_CAPABILITIES")]
    UnknownCapability {
        name: String,
        suggestion: Option<String>,
    },

    #[error("Unknown SQL dialect '{name}'")]
    UnknownDialect {
        name: String,
        available: Vec<String>,
    },
}

impl ConfigurationError {
    pub fn to_ferry_error(self) -> FerryError {
        match self {
            ConfigurationError::MissingProperty { key } => FerryError::new(
                ErrorCode::MissingProperty,
                format!("Missing required property {}", key),
            )
            .with_context(ErrorContext::Property {
                key: key.to_string(),
                value: None,
                dialect: None,
            })
            .with_hint(format!(
                "Please specify {} when creating or altering the virtual schema",
                key
            )),
            ConfigurationError::InvalidValue { key, value, reason } => FerryError::new(
                ErrorCode::InvalidPropertyValue,
                format!("Invalid value '{}' for property {}: {}", value, key, reason),
            )
            .with_context(ErrorContext::Property {
                key: key.clone(),
                value: Some(value),
                dialect: None,
            })
            .with_hint(format!("Correct the value of {}", key)),
            ConfigurationError::UnsupportedProperty {
                key,
                dialect,
                suggestion,
            } => {
                let hint = match &suggestion {
                    Some(s) => format!("Did you mean '{}'?", s),
                    None => format!("Remove {} from the virtual schema properties", key),
                };
                FerryError::new(
                    ErrorCode::UnsupportedProperty,
                    format!("The dialect {} does not support the property {}", dialect, key),
                )
                .with_context(ErrorContext::Property {
                    key,
                    value: None,
                    dialect: Some(dialect),
                })
                .with_hint(hint)
            }
            ConfigurationError::LegacyValue { key, value } => FerryError::new(
                ErrorCode::LegacyPropertyValue,
                format!("The value '{}' of property {} is no longer supported", value, key),
            )
            .with_context(ErrorContext::Property {
                key: key.to_string(),
                value: Some(value),
                dialect: None,
            })
            .with_hint(format!(
                "Remove {} or set it to {}",
                key,
                crate::properties::ImportDataTypes::Calculated.as_str()
            )),
            ConfigurationError::UnsupportedStructureElement {
                key,
                element,
                dialect,
            } => FerryError::new(
                ErrorCode::UnsupportedProperty,
                format!(
                    "The dialect {} does not support {}s but {} is set",
                    dialect, element, key
                ),
            )
            .with_context(ErrorContext::Property {
                key: key.to_string(),
                value: None,
                dialect: Some(dialect),
            })
            .with_hint(format!("Remove the property {}", key)),
            ConfigurationError::UnknownCapability { name, suggestion } => {
                let hint = match &suggestion {
                    Some(s) => format!("Did you mean '{}'?", s),
                    None => "Use LITERAL_, FN_AGG_, FN_PRED_ or FN_ prefixes for non-main capabilities"
                        .to_string(),
                };
                FerryError::new(
                    ErrorCode::UnknownCapability,
                    format!("Unknown capability '{}' in EXCLUDED_CAPABILITIES", name),
                )
                .with_context(ErrorContext::Property {
                    key: crate::properties::EXCLUDED_CAPABILITIES.to_string(),
                    value: Some(name),
                    dialect: None,
                })
                .with_hint(hint)
            }
            ConfigurationError::UnknownDialect { name, available } => {
                let hint = match ferry_error::find_closest_match(&name, &available) {
                    Some(s) => format!("Did you mean '{}'?", s),
                    None => format!("Available dialects: {}", available.join(", ")),
                };
                FerryError::new(
                    ErrorCode::UnknownDialect,
                    format!("Unknown SQL dialect '{}'", name),
                )
                .with_context(ErrorContext::Dialect {
                    requested: name,
                    available,
                })
                .with_hint(hint)
            }
        }
    }
}

impl From<ConfigurationError> for FerryError {
    fn from(err: ConfigurationError) -> Self {
        err.to_ferry_error()
    }
}
