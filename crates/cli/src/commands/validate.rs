//! Offline validation of virtual schema property files.
//!
//! The file lists virtual schemas with their dialect and properties:
//!
//! ```yaml
//! schemas:
//!   - name: SALES
//!     dialect: POSTGRESQL
//!     properties:
//!       CONNECTION_NAME: PG_SALES
//!       SCHEMA_NAME: public
//! ```
//!
//! Each schema is checked the way the adapter checks it before any remote
//! access: the dialect must be registered and its properties must pass the
//! dialect's validation.

use crate::exit_codes;
use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use ferry_common::{AdapterProperties, ConfigurationError};
use ferry_error::{ErrorCode, FerryError};
use ferry_sql::registry;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub(crate) struct VirtualSchemasFile {
    #[validate(length(min = 1), nested)]
    pub schemas: Vec<VirtualSchemaEntry>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub(crate) struct VirtualSchemaEntry {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(length(min = 1))]
    pub dialect: String,

    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SchemaOutcome {
    pub name: String,
    pub dialect: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FerryError>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ValidateReport {
    pub valid: bool,
    pub schemas: Vec<SchemaOutcome>,
}

pub(crate) fn parse_file(contents: &str) -> Result<VirtualSchemasFile, FerryError> {
    let file: VirtualSchemasFile = serde_yaml::from_str(contents).map_err(|e| {
        FerryError::new(ErrorCode::InvalidYaml, format!("Invalid property file: {}", e))
            .with_hint("Expected a top-level 'schemas' list of {name, dialect, properties}")
    })?;
    file.validate().map_err(|e| {
        FerryError::new(
            ErrorCode::InvalidYaml,
            format!("Invalid property file: {}", e.to_string().replace('\n', "; ")),
        )
        .with_hint("Every schema needs a non-empty name and dialect")
    })?;
    Ok(file)
}

fn check_schema(entry: &VirtualSchemaEntry) -> Result<(), FerryError> {
    let properties = AdapterProperties::new(entry.properties.clone());
    let registry = registry::global().read().map_err(|_| {
        FerryError::new(ErrorCode::InternalPanic, "Dialect registry lock poisoned")
    })?;
    let dialect = registry
        .create(&entry.dialect, &properties)
        .map_err(ConfigurationError::to_ferry_error)?;
    dialect
        .validate_properties(&properties)
        .map_err(ConfigurationError::to_ferry_error)
}

pub(crate) fn validate_contents(contents: &str) -> Result<ValidateReport, FerryError> {
    let file = parse_file(contents)?;
    let schemas: Vec<SchemaOutcome> = file
        .schemas
        .iter()
        .map(|entry| {
            let error = check_schema(entry).err();
            if let Some(e) = &error {
                tracing::debug!(schema = %entry.name, code = %e.code, "Schema failed validation");
            }
            SchemaOutcome {
                name: entry.name.clone(),
                dialect: entry.dialect.clone(),
                valid: error.is_none(),
                error,
            }
        })
        .collect();

    Ok(ValidateReport {
        valid: schemas.iter().all(|s| s.valid),
        schemas,
    })
}

pub fn validate(file_path: &str, format: OutputFormat) -> Result<()> {
    let contents = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read property file '{}'", file_path))?;
    let report = validate_contents(&contents)?;

    if format.is_machine_readable() {
        output::print_success(format, &report)?;
        if !report.valid {
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
        return Ok(());
    }

    println!(
        "{} {} {}",
        "[Properties:".dimmed(),
        file_path.yellow(),
        "] Validating...".bold().cyan()
    );
    for schema in &report.schemas {
        match &schema.error {
            None => println!("{} {} ({}): OK", "✔".green(), schema.name, schema.dialect),
            Some(e) => println!("{} {} ({}): {}", "✘".red(), schema.name, schema.dialect, e),
        }
    }

    let first_error = report.schemas.into_iter().find_map(|s| s.error);
    match first_error {
        None => {
            println!("{}", "All virtual schemas are valid.".green().bold());
            Ok(())
        }
        Some(e) => Err(e.into()),
    }
}
