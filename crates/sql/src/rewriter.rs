//! Wraps generated SQL into the load statement the host executes.
//!
//! Three shapes are produced:
//!
//! ```text
//! IMPORT FROM JDBC <conn> STATEMENT '<sql>'
//! IMPORT INTO (c1 T1, c2 T2) FROM JDBC <conn> STATEMENT '<sql>'
//! ```
//!
//! where the column list comes from a describe probe or from the types the
//! host planner already knows.

use crate::ast::SqlNode;
use crate::dialect::{SqlDialect, SqlGenerationContext};
use crate::generator::{GenerationError, SqlGenerator};
use crate::remote::{ConnectionInformation, ConnectionResolver, ConnectivityError, RemoteConnectionSource};
use crate::typemap::MappingContext;
use crate::types::{DataType, RemoteTypeDescriptor};
use ferry_common::properties::CONNECTION_NAME;
use ferry_common::{AdapterProperties, ConfigurationError};
use ferry_error::{ErrorCode, ErrorContext, FerryError};
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStrategy {
    /// No column description; the host infers types from the result set.
    Direct,
    /// Columns described by preparing the statement on the remote side.
    IntoDescribed,
    /// Columns described like `IntoDescribed`, staged through the host's
    /// temporary import relation. Planner-supplied types skip the probe.
    IntoTempTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionDefinitionStyle {
    /// `AT <connection name>`
    Named,
    /// `AT '<address>' USER '<user>' IDENTIFIED BY '<password>'`
    Inline,
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),

    #[error("Result column {position} has remote type {remote_type}, which has no supported mapping")]
    UnsupportedResultType { position: usize, remote_type: String },

    #[error("The pushed-down statement describes no result columns")]
    EmptyResultShape,
}

impl RewriteError {
    pub fn to_ferry_error(self, dialect_name: &str, connection_name: Option<&str>) -> FerryError {
        match self {
            RewriteError::Generation(e) => e.to_ferry_error(dialect_name),
            RewriteError::Configuration(e) => e.to_ferry_error(),
            RewriteError::Connectivity(e) => e.to_ferry_error(connection_name),
            RewriteError::UnsupportedResultType {
                position,
                remote_type,
            } => FerryError::new(
                ErrorCode::UnsupportedResultType,
                format!(
                    "Result column {} has remote type {}, which has no supported mapping",
                    position, remote_type
                ),
            )
            .with_context(ErrorContext::ResultColumn {
                position,
                remote_type,
            })
            .with_hint("Exclude the capability that projects this column or cast it remotely"),
            RewriteError::EmptyResultShape => FerryError::new(
                ErrorCode::EmptyResultShape,
                "The pushed-down statement describes no result columns",
            ),
        }
    }
}

/// Per-request inputs to `QueryRewriter::rewrite`.
pub struct RewriteContext<'a> {
    pub properties: &'a AdapterProperties,
    pub generation: &'a SqlGenerationContext,
    pub mapping: &'a MappingContext,
    pub resolver: &'a dyn ConnectionResolver,
    pub connections: &'a dyn RemoteConnectionSource,
    /// Result types already known to the host planner, in select-list order.
    pub select_list_data_types: Option<&'a [DataType]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRewriter {
    strategy: ImportStrategy,
    connection_style: ConnectionDefinitionStyle,
}

impl QueryRewriter {
    pub fn new(strategy: ImportStrategy, connection_style: ConnectionDefinitionStyle) -> Self {
        Self {
            strategy,
            connection_style,
        }
    }

    pub fn strategy(&self) -> ImportStrategy {
        self.strategy
    }

    pub fn connection_style(&self) -> ConnectionDefinitionStyle {
        self.connection_style
    }

    pub async fn rewrite(
        &self,
        dialect: &dyn SqlDialect,
        statement: &SqlNode,
        ctx: &RewriteContext<'_>,
    ) -> Result<String, RewriteError> {
        let sql = SqlGenerator::new(dialect, ctx.generation)?.render(statement)?;
        tracing::debug!(target: "rewriter", dialect = %dialect.name(), sql = %sql, "Generated pushdown SQL");

        let connection_name = ctx
            .properties
            .connection_name()
            .ok_or(ConfigurationError::MissingProperty {
                key: CONNECTION_NAME,
            })?;
        let info = ctx.resolver.resolve(connection_name).await?;
        let connection = self.connection_definition(connection_name, &info);

        let import = match self.strategy {
            ImportStrategy::Direct => format!(
                "IMPORT FROM JDBC {} STATEMENT {}",
                connection,
                quote_string(&sql)
            ),
            ImportStrategy::IntoDescribed => {
                let columns = self.describe(dialect, &sql, ctx).await?;
                import_into(&columns, &connection, &sql)
            }
            ImportStrategy::IntoTempTable => {
                let columns = match ctx.select_list_data_types {
                    Some(types) if !types.is_empty() => describe_known_types(types)?,
                    _ => self.describe(dialect, &sql, ctx).await?,
                };
                import_into(&columns, &connection, &sql)
            }
        };

        tracing::info!(
            target: "rewriter",
            dialect = %dialect.name(),
            strategy = ?self.strategy,
            "Rewrote pushdown into load statement"
        );
        Ok(import)
    }

    fn connection_definition(&self, connection_name: &str, info: &ConnectionInformation) -> String {
        match self.connection_style {
            ConnectionDefinitionStyle::Named => format!("AT {}", connection_name),
            ConnectionDefinitionStyle::Inline => format!(
                "AT {} USER {} IDENTIFIED BY {}",
                quote_string(&info.address),
                quote_string(&info.user),
                quote_string(info.password.expose_secret())
            ),
        }
    }

    /// Prepares the statement remotely and maps each described column.
    async fn describe(
        &self,
        dialect: &dyn SqlDialect,
        sql: &str,
        ctx: &RewriteContext<'_>,
    ) -> Result<Vec<DataType>, RewriteError> {
        let connection = ctx.connections.connection().await?;
        let descriptors = connection.prepare(sql).await?;
        let mapper = dialect.create_type_mapper(ctx.mapping);

        if descriptors.is_empty() {
            return Err(RewriteError::EmptyResultShape);
        }
        descriptors
            .iter()
            .enumerate()
            .map(|(i, descriptor)| match mapper.map(descriptor) {
                DataType::Unsupported => Err(RewriteError::UnsupportedResultType {
                    position: i + 1,
                    remote_type: describe_remote_type(descriptor),
                }),
                data_type => Ok(data_type),
            })
            .collect()
    }
}

fn describe_known_types(types: &[DataType]) -> Result<Vec<DataType>, RewriteError> {
    types
        .iter()
        .enumerate()
        .map(|(i, data_type)| match data_type {
            DataType::Unsupported => Err(RewriteError::UnsupportedResultType {
                position: i + 1,
                remote_type: data_type.to_string(),
            }),
            other => Ok(*other),
        })
        .collect()
}

fn describe_remote_type(descriptor: &RemoteTypeDescriptor) -> String {
    if descriptor.type_name.is_empty() {
        format!("JDBC type {}", descriptor.type_code.code())
    } else {
        descriptor.type_name.clone()
    }
}

fn import_into(columns: &[DataType], connection: &str, sql: &str) -> String {
    let description = columns
        .iter()
        .enumerate()
        .map(|(i, data_type)| format!("c{} {}", i + 1, data_type))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "IMPORT INTO ({}) FROM JDBC {} STATEMENT {}",
        description,
        connection,
        quote_string(sql)
    )
}

/// Single-quoted string with embedded quotes doubled.
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
