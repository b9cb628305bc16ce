//! Typed view over the virtual schema's key/value properties.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const CONNECTION_NAME: &str = "CONNECTION_NAME";
pub const CATALOG_NAME: &str = "CATALOG_NAME";
pub const SCHEMA_NAME: &str = "SCHEMA_NAME";
pub const TABLE_FILTER: &str = "TABLE_FILTER";
pub const MAX_TABLE_COUNT: &str = "MAX_TABLE_COUNT";
pub const IMPORT_DATA_TYPES: &str = "IMPORT_DATA_TYPES";
pub const EXCLUDED_CAPABILITIES: &str = "EXCLUDED_CAPABILITIES";
pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const IGNORE_ERRORS: &str = "IGNORE_ERRORS";

/// Keys every dialect accepts.
pub const COMMON_PROPERTIES: &[&str] = &[
    CONNECTION_NAME,
    TABLE_FILTER,
    MAX_TABLE_COUNT,
    IMPORT_DATA_TYPES,
    EXCLUDED_CAPABILITIES,
    LOG_LEVEL,
];

pub const DEFAULT_MAX_TABLE_COUNT: usize = 1000;

/// How column types of pushed-down results are determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportDataTypes {
    /// Types are computed from the remote's prepared statement metadata.
    #[default]
    Calculated,
}

impl ImportDataTypes {
    pub const LEGACY_FROM_RESULT_SET: &'static str = "FROM_RESULT_SET";

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportDataTypes::Calculated => "CALCULATED",
        }
    }
}

impl fmt::Display for ImportDataTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter configuration. Keys are stored as given; an empty value is treated
/// as "not set" by every accessor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdapterProperties {
    properties: BTreeMap<String, String>,
}

impl AdapterProperties {
    pub fn new(properties: BTreeMap<String, String>) -> Self {
        Self { properties }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Value of `key`, `None` when missing or empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| k.as_str())
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn connection_name(&self) -> Option<&str> {
        self.get(CONNECTION_NAME)
    }

    pub fn catalog_name(&self) -> Option<&str> {
        self.get(CATALOG_NAME)
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.get(SCHEMA_NAME)
    }

    /// Table names from the comma separated TABLE_FILTER, trimmed.
    pub fn table_filter(&self) -> Vec<String> {
        split_list(self.get(TABLE_FILTER))
    }

    pub fn max_table_count(&self) -> Result<usize, ConfigurationError> {
        match self.get(MAX_TABLE_COUNT) {
            None => Ok(DEFAULT_MAX_TABLE_COUNT),
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(ConfigurationError::InvalidValue {
                    key: MAX_TABLE_COUNT.to_string(),
                    value: raw.to_string(),
                    reason: "expected a positive integer".to_string(),
                }),
            },
        }
    }

    pub fn import_data_types(&self) -> Result<ImportDataTypes, ConfigurationError> {
        match self.get(IMPORT_DATA_TYPES) {
            None => Ok(ImportDataTypes::default()),
            Some(raw) if raw.eq_ignore_ascii_case(ImportDataTypes::Calculated.as_str()) => {
                Ok(ImportDataTypes::Calculated)
            }
            Some(raw) if raw.eq_ignore_ascii_case(ImportDataTypes::LEGACY_FROM_RESULT_SET) => {
                Err(ConfigurationError::LegacyValue {
                    key: IMPORT_DATA_TYPES,
                    value: raw.to_string(),
                })
            }
            Some(raw) => Err(ConfigurationError::InvalidValue {
                key: IMPORT_DATA_TYPES.to_string(),
                value: raw.to_string(),
                reason: format!("expected {}", ImportDataTypes::Calculated),
            }),
        }
    }

    /// Raw EXCLUDED_CAPABILITIES entries; resolution into capability
    /// enums happens where the enums live.
    pub fn excluded_capabilities(&self) -> Vec<String> {
        split_list(self.get(EXCLUDED_CAPABILITIES))
    }

    pub fn log_level(&self) -> Option<&str> {
        self.get(LOG_LEVEL)
    }

    /// Upper-cased IGNORE_ERRORS entries.
    pub fn ignored_errors(&self) -> BTreeSet<String> {
        split_list(self.get(IGNORE_ERRORS))
            .into_iter()
            .map(|s| s.to_ascii_uppercase())
            .collect()
    }

    pub fn is_error_ignored(&self, name: &str) -> bool {
        self.ignored_errors().contains(&name.to_ascii_uppercase())
    }

    /// Applies an ALTER ... SET change set: a `None` or empty value
    /// removes the key.
    pub fn merge(&self, changes: &BTreeMap<String, Option<String>>) -> Self {
        let mut merged = self.properties.clone();
        for (key, value) in changes {
            match value {
                Some(v) if !v.is_empty() => {
                    merged.insert(key.clone(), v.clone());
                }
                _ => {
                    merged.remove(key);
                }
            }
        }
        Self::new(merged)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AdapterProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
