use crate::output::{self, OutputFormat};
use anyhow::Result;
use ferry_common::properties::EXCLUDED_CAPABILITIES;
use ferry_common::{AdapterProperties, ConfigurationError};
use ferry_sql::{parse_excluded_capabilities, registry};
use owo_colors::OwoColorize;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct CapabilityReport {
    pub dialect: String,
    pub capabilities: Vec<String>,
    pub excluded: Vec<String>,
}

/// The capabilities `dialect` reports once `exclude` is applied, the same way
/// the adapter negotiates them.
pub(crate) fn negotiate(dialect: &str, exclude: Option<&str>) -> Result<CapabilityReport> {
    let properties: AdapterProperties = exclude
        .map(|e| (EXCLUDED_CAPABILITIES, e))
        .into_iter()
        .collect();
    let dialect = registry::global()
        .read()
        .map_err(|_| anyhow::anyhow!("Dialect registry lock poisoned"))?
        .create(dialect, &properties)
        .map_err(ConfigurationError::to_ferry_error)?;

    let excluded = parse_excluded_capabilities(&properties.excluded_capabilities())
        .map_err(ConfigurationError::to_ferry_error)?;
    let mut capabilities = dialect.capabilities().subtract(&excluded).names();
    capabilities.sort();

    Ok(CapabilityReport {
        dialect: dialect.name().to_string(),
        capabilities,
        excluded: excluded.names(),
    })
}

pub fn capabilities(dialect: &str, exclude: Option<&str>, format: OutputFormat) -> Result<()> {
    let report = negotiate(dialect, exclude)?;
    if format.is_machine_readable() {
        return output::print_success(format, &report);
    }

    println!(
        "{} {} ({} capabilities)",
        "Dialect:".dimmed(),
        report.dialect.bold().cyan(),
        report.capabilities.len()
    );
    for name in &report.capabilities {
        println!("  {}", name);
    }
    if !report.excluded.is_empty() {
        println!("{} {}", "Excluded:".yellow(), report.excluded.join(", "));
    }
    Ok(())
}
