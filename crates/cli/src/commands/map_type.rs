use crate::output::{self, OutputFormat};
use anyhow::Result;
use ferry_common::{AdapterProperties, ConfigurationError};
use ferry_sql::registry;
use ferry_sql::types::{JdbcType, RemoteTypeDescriptor};
use ferry_sql::MappingContext;
use owo_colors::OwoColorize;
use serde::Serialize;

/// A remote column type as reported by the driver.
#[derive(Debug, Clone, clap::Args)]
pub struct MapTypeArgs {
    /// Dialect whose type mapper to use
    pub dialect: String,
    /// Numeric JDBC type code (e.g. 4 for INTEGER, 12 for VARCHAR)
    #[arg(long = "jdbc-type", allow_negative_numbers = true)]
    pub jdbc_type: i32,
    /// Precision for numbers, length for strings
    #[arg(long, default_value_t = 0)]
    pub size: u32,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub scale: i32,
    /// Maximum bytes per value; equal to size for single-byte character sets
    #[arg(long)]
    pub octet_length: Option<u32>,
    /// Remote type name (e.g. jsonb, NUMBER)
    #[arg(long)]
    pub type_name: Option<String>,
    /// Host database version, for version-dependent mappings
    #[arg(long)]
    pub host_version: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MappedType {
    pub dialect: String,
    pub remote: RemoteTypeDescriptor,
    pub mapped: String,
    pub supported: bool,
}

pub(crate) fn map_descriptor(args: &MapTypeArgs) -> Result<MappedType> {
    let dialect = registry::global()
        .read()
        .map_err(|_| anyhow::anyhow!("Dialect registry lock poisoned"))?
        .create(&args.dialect, &AdapterProperties::empty())
        .map_err(ConfigurationError::to_ferry_error)?;

    let mut descriptor = RemoteTypeDescriptor::new(
        JdbcType::from_code(args.jdbc_type),
        args.size,
        args.scale,
    );
    if let Some(octets) = args.octet_length {
        descriptor = descriptor.with_octet_length(octets);
    }
    if let Some(name) = &args.type_name {
        descriptor = descriptor.with_type_name(name.as_str());
    }

    let context = MappingContext {
        host_version: args.host_version.clone(),
    };
    let mapped = dialect.create_type_mapper(&context).map(&descriptor);
    tracing::debug!(dialect = %dialect.name(), mapped = %mapped, "Mapped remote type");

    Ok(MappedType {
        dialect: dialect.name().to_string(),
        remote: descriptor,
        mapped: mapped.to_string(),
        supported: mapped.is_supported(),
    })
}

pub fn map_type(args: &MapTypeArgs, format: OutputFormat) -> Result<()> {
    let result = map_descriptor(args)?;
    if format.is_machine_readable() {
        return output::print_success(format, &result);
    }

    if result.supported {
        println!("{} {}", "✔".green(), result.mapped.bold());
    } else {
        println!(
            "{} {} (the column would be skipped)",
            "✘".red(),
            result.mapped.bold()
        );
    }
    Ok(())
}
