use crate::output::{self, OutputFormat};
use anyhow::Result;
use ferry_sql::registry;
use ferry_sql::SqlDialect;
use ferry_common::AdapterProperties;
use owo_colors::OwoColorize;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct DialectInfo {
    pub name: String,
    pub description: String,
    pub supports_catalogs: bool,
    pub supports_schemas: bool,
    pub properties: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DialectList {
    pub dialects: Vec<DialectInfo>,
}

pub(crate) fn list_dialects() -> Result<DialectList> {
    let registry = registry::global()
        .read()
        .map_err(|_| anyhow::anyhow!("Dialect registry lock poisoned"))?;
    let empty = AdapterProperties::empty();

    let mut dialects = Vec::with_capacity(registry.len());
    for name in registry.names() {
        let Some(descriptor) = registry.describe(&name) else {
            continue;
        };
        let dialect: Box<dyn SqlDialect> = (descriptor.factory)(&empty);
        dialects.push(DialectInfo {
            name: descriptor.name.to_string(),
            description: descriptor.description.to_string(),
            supports_catalogs: dialect.supports_catalogs(),
            supports_schemas: dialect.supports_schemas(),
            properties: dialect.supported_properties(),
        });
    }
    Ok(DialectList { dialects })
}

pub fn dialects(format: OutputFormat) -> Result<()> {
    let list = list_dialects()?;
    if format.is_machine_readable() {
        return output::print_success(format, &list);
    }

    for info in &list.dialects {
        println!("{:<12} {}", info.name.bold().cyan(), info.description);
        println!(
            "{:<12} {}",
            "",
            format!("properties: {}", info.properties.join(", ")).dimmed()
        );
    }
    Ok(())
}
