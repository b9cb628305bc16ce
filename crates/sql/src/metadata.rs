//! Reading the remote schema into virtual schema metadata.

use crate::dialect::NullSorting;
use crate::remote::{ConnectivityError, RemoteColumn, RemoteConnection, RemoteDatabaseMetadata, RemoteTable};
use crate::typemap::TypeMapper;
use crate::types::DataType;
use ferry_common::{AdapterProperties, ConfigurationError};
use ferry_error::{ErrorCode, ErrorContext, FerryError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ANY_NAME: &str = "%";

/// How remote identifiers are presented to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentifierCase {
    Preserve,
    Upper,
}

/// Remote conventions stored with the virtual schema and handed back on
/// every pushdown request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaAdapterNotes {
    pub catalog_separator: String,
    pub identifier_quote_string: String,
    pub stores_lower_case_identifiers: bool,
    pub stores_upper_case_identifiers: bool,
    pub stores_mixed_case_identifiers: bool,
    pub supports_mixed_case_identifiers: bool,
    pub stores_lower_case_quoted_identifiers: bool,
    pub stores_upper_case_quoted_identifiers: bool,
    pub stores_mixed_case_quoted_identifiers: bool,
    pub supports_mixed_case_quoted_identifiers: bool,
    pub nulls_sorted_at_end: bool,
    pub nulls_sorted_at_start: bool,
    pub nulls_sorted_high: bool,
    pub nulls_sorted_low: bool,
}

impl SchemaAdapterNotes {
    pub fn from_remote(metadata: &RemoteDatabaseMetadata) -> Self {
        Self {
            catalog_separator: metadata.catalog_separator.clone(),
            identifier_quote_string: metadata.identifier_quote_string.clone(),
            stores_lower_case_identifiers: metadata.stores_lower_case_identifiers,
            stores_upper_case_identifiers: metadata.stores_upper_case_identifiers,
            stores_mixed_case_identifiers: metadata.stores_mixed_case_identifiers,
            supports_mixed_case_identifiers: metadata.supports_mixed_case_identifiers,
            stores_lower_case_quoted_identifiers: metadata.stores_lower_case_quoted_identifiers,
            stores_upper_case_quoted_identifiers: metadata.stores_upper_case_quoted_identifiers,
            stores_mixed_case_quoted_identifiers: metadata.stores_mixed_case_quoted_identifiers,
            supports_mixed_case_quoted_identifiers: metadata.supports_mixed_case_quoted_identifiers,
            nulls_sorted_at_end: metadata.nulls_sorted_at_end,
            nulls_sorted_at_start: metadata.nulls_sorted_at_start,
            nulls_sorted_high: metadata.nulls_sorted_high,
            nulls_sorted_low: metadata.nulls_sorted_low,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// First flag set wins; a remote that reports none sorts NULLs at the end.
    pub fn null_sorting(&self) -> NullSorting {
        if self.nulls_sorted_at_end {
            NullSorting::AtEnd
        } else if self.nulls_sorted_at_start {
            NullSorting::AtStart
        } else if self.nulls_sorted_high {
            NullSorting::High
        } else if self.nulls_sorted_low {
            NullSorting::Low
        } else {
            NullSorting::AtEnd
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub identity: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Remote type code and name, kept for diagnostics.
    pub adapter_notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub columns: Vec<ColumnMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaMetadata {
    pub tables: Vec<TableMetadata>,
    /// Serialized `SchemaAdapterNotes`.
    pub adapter_notes: String,
}

impl SchemaMetadata {
    pub fn notes(&self) -> Result<SchemaAdapterNotes, serde_json::Error> {
        SchemaAdapterNotes::from_json(&self.adapter_notes)
    }
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("The remote schema contains more than {limit} tables (read {accepted} so far)")]
    TableCountExceeded { limit: usize, accepted: usize },

    #[error("Table '{table}' contains upper-case characters and cannot be mapped")]
    UpperCaseTable { table: String },

    #[error("Failed to serialize adapter notes: {0}")]
    AdapterNotes(#[from] serde_json::Error),
}

impl MetadataError {
    pub fn to_ferry_error(self, connection_name: Option<&str>) -> FerryError {
        match self {
            MetadataError::Connectivity(e) => e.to_ferry_error(connection_name),
            MetadataError::Configuration(e) => e.to_ferry_error(),
            MetadataError::TableCountExceeded { limit, accepted } => FerryError::new(
                ErrorCode::TableCountExceeded,
                format!(
                    "The remote schema contains more than {} tables (read {} so far)",
                    limit, accepted
                ),
            )
            .with_context(ErrorContext::TableCount { limit, accepted })
            .with_hint(
                "Narrow the mapped tables with TABLE_FILTER or SCHEMA_NAME, or raise MAX_TABLE_COUNT",
            ),
            MetadataError::UpperCaseTable { table } => FerryError::new(
                ErrorCode::MetadataReadFailed,
                format!(
                    "Table '{}' contains upper-case characters and cannot be mapped",
                    table
                ),
            )
            .with_hint(
                "Rename the table, preserve the original case through the dialect's identifier mapping, \
                 or skip such tables through IGNORE_ERRORS",
            ),
            MetadataError::AdapterNotes(e) => FerryError::new(
                ErrorCode::SerializationFailed,
                format!("Failed to serialize adapter notes: {}", e),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpperCaseTables {
    Accept,
    Reject,
    Skip,
}

/// Reads tables and columns through a remote connection and maps them into
/// the canonical type system.
pub struct RemoteMetadataReader {
    dialect_name: String,
    type_mapper: Box<dyn TypeMapper>,
    table_types: Vec<&'static str>,
    identifier_case: IdentifierCase,
    upper_case_tables: UpperCaseTables,
}

impl RemoteMetadataReader {
    pub fn new(
        dialect_name: &str,
        type_mapper: Box<dyn TypeMapper>,
        table_types: Vec<&'static str>,
        identifier_case: IdentifierCase,
    ) -> Self {
        Self {
            dialect_name: dialect_name.to_string(),
            type_mapper,
            table_types,
            identifier_case,
            upper_case_tables: UpperCaseTables::Accept,
        }
    }

    /// Tables whose names are not all lower case cannot round-trip through
    /// upper-case presentation. They fail the read, or are skipped when the
    /// error is ignored.
    pub fn reject_upper_case_tables(mut self, ignored: bool) -> Self {
        self.upper_case_tables = if ignored {
            UpperCaseTables::Skip
        } else {
            UpperCaseTables::Reject
        };
        self
    }

    pub fn type_mapper(&self) -> &dyn TypeMapper {
        self.type_mapper.as_ref()
    }

    pub async fn read_schema(
        &self,
        connection: &dyn RemoteConnection,
        properties: &AdapterProperties,
    ) -> Result<SchemaMetadata, MetadataError> {
        let max_tables = properties.max_table_count()?;
        let filter = properties.table_filter();
        let catalog = properties.catalog_name();
        let schema = properties.schema_name();

        tracing::debug!(
            target: "metadata",
            dialect = %self.dialect_name,
            catalog = ?catalog,
            schema = ?schema,
            "Reading remote metadata"
        );

        let notes = SchemaAdapterNotes::from_remote(&connection.metadata().await?);
        let remote_tables = connection
            .tables(catalog, schema, ANY_NAME, &self.table_types)
            .await?;

        let mut tables = Vec::new();
        for remote_table in remote_tables {
            if !filter.is_empty() && !filter.iter().any(|f| *f == remote_table.name) {
                continue;
            }
            if !self.accept_table_name(&remote_table.name)? {
                continue;
            }

            let columns = connection
                .columns(
                    remote_table.catalog.as_deref(),
                    remote_table.schema.as_deref(),
                    &remote_table.name,
                    ANY_NAME,
                )
                .await?;
            let Some(table) = self.map_table(&remote_table, &columns) else {
                continue;
            };

            if tables.len() == max_tables {
                return Err(MetadataError::TableCountExceeded {
                    limit: max_tables,
                    accepted: tables.len() + 1,
                });
            }
            tables.push(table);
        }

        tracing::info!(
            target: "metadata",
            dialect = %self.dialect_name,
            tables = tables.len(),
            "Read remote metadata"
        );

        Ok(SchemaMetadata {
            tables,
            adapter_notes: notes.to_json()?,
        })
    }

    fn accept_table_name(&self, name: &str) -> Result<bool, MetadataError> {
        let has_upper_case = name.chars().any(char::is_uppercase);
        match (self.upper_case_tables, has_upper_case) {
            (_, false) | (UpperCaseTables::Accept, true) => Ok(true),
            (UpperCaseTables::Skip, true) => {
                tracing::warn!(
                    target: "metadata",
                    table = %name,
                    "Skipping table with upper-case characters"
                );
                Ok(false)
            }
            (UpperCaseTables::Reject, true) => Err(MetadataError::UpperCaseTable {
                table: name.to_string(),
            }),
        }
    }

    fn map_table(&self, table: &RemoteTable, columns: &[RemoteColumn]) -> Option<TableMetadata> {
        let mapped: Vec<ColumnMetadata> = columns
            .iter()
            .filter_map(|column| self.map_column(&table.name, column))
            .collect();

        if mapped.is_empty() {
            tracing::info!(
                target: "metadata",
                table = %table.name,
                "Skipping table without supported columns"
            );
            return None;
        }

        Some(TableMetadata {
            name: self.present(&table.name),
            comment: table.comment.clone(),
            columns: mapped,
        })
    }

    fn map_column(&self, table: &str, column: &RemoteColumn) -> Option<ColumnMetadata> {
        let data_type = self.type_mapper.map(&column.descriptor);
        if !data_type.is_supported() {
            tracing::info!(
                target: "metadata",
                table = %table,
                column = %column.name,
                type_code = column.descriptor.type_code.code(),
                type_name = %column.descriptor.type_name,
                "Skipping column with unsupported type"
            );
            return None;
        }

        let adapter_notes = serde_json::json!({
            "jdbcDataType": column.descriptor.type_code.code(),
            "typeName": column.descriptor.type_name,
        })
        .to_string();

        Some(ColumnMetadata {
            name: self.present(&column.name),
            data_type,
            nullable: column.nullable,
            identity: column.identity,
            default_value: column.default_value.clone(),
            comment: column.comment.clone(),
            adapter_notes,
        })
    }

    fn present(&self, name: &str) -> String {
        match self.identifier_case {
            IdentifierCase::Preserve => name.to_string(),
            IdentifierCase::Upper => name.to_uppercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notes_round_trip_through_json() {
        let notes = SchemaAdapterNotes::from_remote(&RemoteDatabaseMetadata::default());
        let json = notes.to_json().unwrap();
        assert!(json.contains("\"nullsSortedHigh\":true"));
        assert_eq!(SchemaAdapterNotes::from_json(&json).unwrap(), notes);
        assert_eq!(notes.null_sorting(), NullSorting::High);
    }

    #[test]
    fn test_partial_notes_use_defaults() {
        let notes = SchemaAdapterNotes::from_json(r#"{"nullsSortedLow":true}"#).unwrap();
        assert_eq!(notes.null_sorting(), NullSorting::Low);
        assert_eq!(SchemaAdapterNotes::default().null_sorting(), NullSorting::AtEnd);
    }

    #[test]
    fn test_table_count_error_hint() {
        let err = MetadataError::TableCountExceeded {
            limit: 2,
            accepted: 3,
        }
        .to_ferry_error(Some("C"));
        assert_eq!(err.code, ErrorCode::TableCountExceeded);
        assert!(err.hint.unwrap().contains("TABLE_FILTER"));
    }
}
