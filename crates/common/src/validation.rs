//! Property checks shared by every dialect. Each check returns the first
//! problem found; dialects chain them in `validate_properties`.

use crate::error::ConfigurationError;
use crate::properties::{self, AdapterProperties};
use crate::telemetry;

/// Rejects keys outside `supported`, suggesting the closest supported key.
pub fn validate_supported_keys(
    props: &AdapterProperties,
    dialect: &str,
    supported: &[&str],
) -> Result<(), ConfigurationError> {
    for key in props.keys() {
        if !supported.contains(&key) {
            let options: Vec<String> = supported.iter().map(|s| s.to_string()).collect();
            return Err(ConfigurationError::UnsupportedProperty {
                key: key.to_string(),
                dialect: dialect.to_string(),
                suggestion: ferry_error::find_closest_match(key, &options),
            });
        }
    }
    Ok(())
}

pub fn validate_connection_name(props: &AdapterProperties) -> Result<(), ConfigurationError> {
    match props.connection_name() {
        Some(_) => Ok(()),
        None => Err(ConfigurationError::MissingProperty {
            key: properties::CONNECTION_NAME,
        }),
    }
}

/// CATALOG_NAME / SCHEMA_NAME are only meaningful when the remote has that
/// structure element.
pub fn validate_structure_elements(
    props: &AdapterProperties,
    dialect: &str,
    supports_catalogs: bool,
    supports_schemas: bool,
) -> Result<(), ConfigurationError> {
    if !supports_catalogs && props.catalog_name().is_some() {
        return Err(ConfigurationError::UnsupportedStructureElement {
            key: properties::CATALOG_NAME,
            element: "catalog",
            dialect: dialect.to_string(),
        });
    }
    if !supports_schemas && props.schema_name().is_some() {
        return Err(ConfigurationError::UnsupportedStructureElement {
            key: properties::SCHEMA_NAME,
            element: "schema",
            dialect: dialect.to_string(),
        });
    }
    Ok(())
}

pub fn validate_log_level(props: &AdapterProperties) -> Result<(), ConfigurationError> {
    match props.log_level() {
        Some(level) if telemetry::filter_directive(level).is_none() => {
            Err(ConfigurationError::InvalidValue {
                key: properties::LOG_LEVEL.to_string(),
                value: level.to_string(),
                reason: format!("expected one of {}", telemetry::LOG_LEVELS.join(", ")),
            })
        }
        _ => Ok(()),
    }
}

/// Checks for IGNORE_ERRORS entries: only names in `known` are accepted.
pub fn validate_ignored_errors(
    props: &AdapterProperties,
    known: &[&str],
) -> Result<(), ConfigurationError> {
    for name in props.ignored_errors() {
        if !known.contains(&name.as_str()) {
            return Err(ConfigurationError::InvalidValue {
                key: properties::IGNORE_ERRORS.to_string(),
                value: name,
                reason: if known.is_empty() {
                    "this dialect has no ignorable errors".to_string()
                } else {
                    format!("expected one of {}", known.join(", "))
                },
            });
        }
    }
    Ok(())
}

/// The checks every dialect runs, in order: connection, catalog/schema,
/// supported keys, typed values.
pub fn validate_common(
    props: &AdapterProperties,
    dialect: &str,
    supported: &[&str],
    supports_catalogs: bool,
    supports_schemas: bool,
) -> Result<(), ConfigurationError> {
    validate_connection_name(props)?;
    validate_structure_elements(props, dialect, supports_catalogs, supports_schemas)?;
    validate_supported_keys(props, dialect, supported)?;
    props.max_table_count()?;
    props.import_data_types()?;
    validate_log_level(props)?;
    Ok(())
}
