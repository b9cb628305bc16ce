//! Request-level entry point of a virtual schema.
//!
//! A `VirtualSchemaAdapter` is bound to one SQL dialect and serves the
//! host's requests against it:
//!
//! 1. **Schema lifecycle**: create, refresh, set properties and drop.
//! 2. **Capabilities**: the dialect's set minus EXCLUDED_CAPABILITIES.
//! 3. **Pushdown**: generate dialect SQL and wrap it into a load statement.
//!
//! Every request validates its properties and builds a fresh dialect from
//! the registry. The only state kept between requests is the cached remote
//! connection.

use crate::cache::ConnectionCache;
use crate::request::PushdownRequest;
use ferry_common::telemetry::{self, LoggingInit};
use ferry_common::{AdapterProperties, ConfigurationError};
use ferry_error::{ErrorCode, FerryError};
use ferry_sql::remote::{ConnectionResolver, RemoteConnectionFactory};
use ferry_sql::{
    parse_excluded_capabilities, Capabilities, DialectRegistry, MappingContext, RewriteContext,
    SchemaAdapterNotes, SchemaMetadata, SqlDialect, SqlGenerationContext,
};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct AdapterOptions {
    pub dialect: String,
    pub registry: DialectRegistry,
    pub resolver: Arc<dyn ConnectionResolver>,
    pub factory: Arc<dyn RemoteConnectionFactory>,
    /// Version of the host database, used for version-dependent type mapping.
    pub host_version: Option<String>,
}

impl AdapterOptions {
    /// Options over the built-in dialects.
    pub fn new(
        dialect: impl Into<String>,
        resolver: Arc<dyn ConnectionResolver>,
        factory: Arc<dyn RemoteConnectionFactory>,
    ) -> Self {
        Self {
            dialect: dialect.into(),
            registry: DialectRegistry::with_builtin_dialects(),
            resolver,
            factory,
            host_version: None,
        }
    }
}

pub struct VirtualSchemaAdapter {
    dialect_name: String,
    registry: DialectRegistry,
    connections: ConnectionCache,
    host_version: Option<String>,
}

impl VirtualSchemaAdapter {
    pub fn new(options: AdapterOptions) -> Result<Self, FerryError> {
        let Some(descriptor) = options.registry.describe(&options.dialect) else {
            return Err(ConfigurationError::UnknownDialect {
                name: options.dialect,
                available: options.registry.names(),
            }
            .to_ferry_error());
        };
        let dialect_name = descriptor.name.to_string();

        tracing::info!(dialect = %dialect_name, "Virtual schema adapter ready");
        Ok(Self {
            dialect_name,
            registry: options.registry,
            connections: ConnectionCache::new(options.resolver, options.factory),
            host_version: options.host_version,
        })
    }

    pub fn dialect_name(&self) -> &str {
        &self.dialect_name
    }

    pub fn connections(&self) -> &ConnectionCache {
        &self.connections
    }

    pub async fn create_virtual_schema(
        &self,
        properties: &AdapterProperties,
    ) -> Result<SchemaMetadata, FerryError> {
        tracing::info!(dialect = %self.dialect_name, "Creating virtual schema");
        self.read_metadata(properties).await
    }

    pub async fn refresh(&self, properties: &AdapterProperties) -> Result<SchemaMetadata, FerryError> {
        tracing::info!(dialect = %self.dialect_name, "Refreshing virtual schema");
        self.read_metadata(properties).await
    }

    /// Applies `changes` on top of `current` and re-reads the remote schema.
    /// A `None` or empty value removes the key.
    pub async fn set_properties(
        &self,
        current: &AdapterProperties,
        changes: &BTreeMap<String, Option<String>>,
    ) -> Result<(AdapterProperties, SchemaMetadata), FerryError> {
        let merged = current.merge(changes);
        tracing::info!(
            dialect = %self.dialect_name,
            changed = changes.len(),
            "Setting virtual schema properties"
        );
        if merged.connection_name() != current.connection_name() {
            self.connections.clear().await;
        }
        let metadata = self.read_metadata(&merged).await?;
        Ok((merged, metadata))
    }

    /// Needs no remote access.
    pub async fn drop_virtual_schema(&self) {
        tracing::info!(dialect = %self.dialect_name, "Dropping virtual schema");
        self.connections.clear().await;
    }

    pub fn get_capabilities(&self, properties: &AdapterProperties) -> Result<Capabilities, FerryError> {
        let dialect = self.dialect(properties)?;
        let excluded = parse_excluded_capabilities(&properties.excluded_capabilities())
            .map_err(ConfigurationError::to_ferry_error)?;
        let capabilities = dialect.capabilities().subtract(&excluded);

        tracing::debug!(
            dialect = %self.dialect_name,
            reported = capabilities.len(),
            excluded = excluded.len(),
            "Negotiated capabilities"
        );
        Ok(capabilities)
    }

    /// Renders the request's statement for the remote source and wraps it
    /// into the host's load statement.
    pub async fn pushdown(&self, request: &PushdownRequest) -> Result<String, FerryError> {
        let properties = &request.properties;
        let dialect = self.dialect(properties)?;

        let notes = request
            .adapter_notes
            .as_deref()
            .map(SchemaAdapterNotes::from_json)
            .transpose()
            .map_err(|e| {
                FerryError::new(
                    ErrorCode::SerializationFailed,
                    format!("Failed to read schema adapter notes: {}", e),
                )
                .with_hint("Refresh the virtual schema to rebuild its adapter notes")
            })?;

        let generation = SqlGenerationContext::from_properties(properties, notes);
        let mapping = MappingContext {
            host_version: request
                .host_version
                .clone()
                .or_else(|| self.host_version.clone()),
        };
        // Validation guarantees CONNECTION_NAME is set.
        let connection_name = properties.connection_name().unwrap_or_default();
        let source = self.connections.source(connection_name);
        let ctx = RewriteContext {
            properties,
            generation: &generation,
            mapping: &mapping,
            resolver: self.connections.resolver(),
            connections: &source,
            select_list_data_types: request.select_list_data_types.as_deref(),
        };

        let sql = dialect
            .create_query_rewriter()
            .rewrite(dialect.as_ref(), &request.statement, &ctx)
            .await
            .map_err(|e| e.to_ferry_error(&self.dialect_name, Some(connection_name)))?;

        tracing::debug!(dialect = %self.dialect_name, sql = %sql, "Pushdown statement");
        Ok(sql)
    }

    async fn read_metadata(&self, properties: &AdapterProperties) -> Result<SchemaMetadata, FerryError> {
        let dialect = self.dialect(properties)?;
        let connection_name = properties.connection_name().unwrap_or_default();
        let mapping = MappingContext {
            host_version: self.host_version.clone(),
        };

        let connection = self
            .connections
            .get(connection_name)
            .await
            .map_err(|e| e.to_ferry_error(Some(connection_name)))?;
        dialect
            .create_metadata_reader(properties, &mapping)
            .read_schema(connection.as_ref(), properties)
            .await
            .map_err(|e| e.to_ferry_error(Some(connection_name)))
    }

    /// Validates `properties`, applies LOG_LEVEL and builds a fresh dialect.
    fn dialect(&self, properties: &AdapterProperties) -> Result<Box<dyn SqlDialect>, FerryError> {
        let dialect = self
            .registry
            .create(&self.dialect_name, properties)
            .map_err(ConfigurationError::to_ferry_error)?;
        dialect
            .validate_properties(properties)
            .map_err(ConfigurationError::to_ferry_error)?;

        if let Some(level) = properties.log_level() {
            match telemetry::init_logging(Some(level)) {
                Ok(LoggingInit::ForeignSubscriber) => {
                    tracing::debug!(level = %level, "LOG_LEVEL ignored, the embedding process owns logging")
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, level = %level, "Failed to apply LOG_LEVEL"),
            }
        }
        Ok(dialect)
    }
}
