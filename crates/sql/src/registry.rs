//! Dialect lookup by name.
//!
//! Dialects are registered from a static manifest rather than discovered.
//! Names are case-insensitive; every `create` builds a fresh dialect from the
//! request's properties.

use crate::dialect::{
    generic, mysql, oracle, postgres, sqlserver, GenericDialect, MySqlDialect, OracleDialect,
    PostgresDialect, SqlDialect, SqlServerDialect,
};
use ferry_common::{AdapterProperties, ConfigurationError};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

pub type DialectFactory = Arc<dyn Fn(&AdapterProperties) -> Box<dyn SqlDialect> + Send + Sync>;

#[derive(Clone)]
pub struct DialectDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub factory: DialectFactory,
}

impl std::fmt::Debug for DialectDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl DialectDescriptor {
    pub fn new(
        name: &'static str,
        description: &'static str,
        factory: impl Fn(&AdapterProperties) -> Box<dyn SqlDialect> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            description,
            factory: Arc::new(factory),
        }
    }
}

/// Built-in dialects.
pub fn builtin_dialects() -> Vec<DialectDescriptor> {
    vec![
        DialectDescriptor::new(generic::NAME, "Any JDBC source, conventions read from the remote", |p| {
            Box::new(GenericDialect::from_properties(p))
        }),
        DialectDescriptor::new(mysql::NAME, "MySQL and MariaDB", |p| {
            Box::new(MySqlDialect::from_properties(p))
        }),
        DialectDescriptor::new(oracle::NAME, "Oracle Database", |p| {
            Box::new(OracleDialect::from_properties(p))
        }),
        DialectDescriptor::new(postgres::NAME, "PostgreSQL", |p| {
            Box::new(PostgresDialect::from_properties(p))
        }),
        DialectDescriptor::new(sqlserver::NAME, "Microsoft SQL Server", |p| {
            Box::new(SqlServerDialect::from_properties(p))
        }),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct DialectRegistry {
    dialects: BTreeMap<String, DialectDescriptor>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_dialects() -> Self {
        let mut registry = Self::new();
        for descriptor in builtin_dialects() {
            registry.register(descriptor);
        }
        registry
    }

    /// Replaces any dialect already registered under the same name.
    pub fn register(&mut self, descriptor: DialectDescriptor) {
        let key = descriptor.name.to_uppercase();
        if self.dialects.insert(key, descriptor).is_some() {
            tracing::debug!(target: "registry", "Replaced a registered dialect");
        }
    }

    pub fn create(
        &self,
        name: &str,
        properties: &AdapterProperties,
    ) -> Result<Box<dyn SqlDialect>, ConfigurationError> {
        let descriptor = self.describe(name).ok_or_else(|| {
            tracing::warn!(target: "registry", dialect = %name, "Unknown SQL dialect");
            ConfigurationError::UnknownDialect {
                name: name.to_string(),
                available: self.names(),
            }
        })?;
        Ok((descriptor.factory)(properties))
    }

    pub fn names(&self) -> Vec<String> {
        self.dialects.values().map(|d| d.name.to_string()).collect()
    }

    pub fn describe(&self, name: &str) -> Option<&DialectDescriptor> {
        self.dialects.get(&name.to_uppercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dialects.contains_key(&name.to_uppercase())
    }

    pub fn clear(&mut self) {
        self.dialects.clear();
    }

    pub fn len(&self) -> usize {
        self.dialects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialects.is_empty()
    }
}

static GLOBAL_REGISTRY: Lazy<RwLock<DialectRegistry>> =
    Lazy::new(|| RwLock::new(DialectRegistry::with_builtin_dialects()));

/// Process-wide registry, initialized with the built-in dialects on first use.
pub fn global() -> &'static RwLock<DialectRegistry> {
    &GLOBAL_REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        let registry = DialectRegistry::with_builtin_dialects();
        assert_eq!(
            registry.names(),
            vec!["GENERIC", "MYSQL", "ORACLE", "POSTGRESQL", "SQLSERVER"]
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = DialectRegistry::with_builtin_dialects();
        let dialect = registry.create("postgresql", &AdapterProperties::empty()).unwrap();
        assert_eq!(dialect.name(), "POSTGRESQL");
        assert!(registry.contains("SqlServer"));
    }

    #[test]
    fn test_unknown_dialect_lists_available() {
        let registry = DialectRegistry::with_builtin_dialects();
        match registry.create("DB2", &AdapterProperties::empty()) {
            Err(ConfigurationError::UnknownDialect { name, available }) => {
                assert_eq!(name, "DB2");
                assert_eq!(available.len(), 5);
            }
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("DB2 should not be registered"),
        }
    }

    #[test]
    fn test_register_and_clear() {
        let mut registry = DialectRegistry::new();
        assert!(registry.is_empty());
        registry.register(DialectDescriptor::new("custom", "test", |p| {
            Box::new(GenericDialect::from_properties(p))
        }));
        assert!(registry.contains("CUSTOM"));
        assert_eq!(registry.len(), 1);
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_each_create_builds_fresh_dialect() {
        let registry = DialectRegistry::with_builtin_dialects();
        let upper = registry.create("POSTGRESQL", &AdapterProperties::empty()).unwrap();
        let preserve: AdapterProperties = [(postgres::IDENTIFIER_MAPPING_PROPERTY, "PRESERVE_ORIGINAL_CASE")]
            .into_iter()
            .collect();
        let preserving = registry.create("POSTGRESQL", &preserve).unwrap();
        assert_eq!(upper.apply_quote("Orders"), "\"orders\"");
        assert_eq!(preserving.apply_quote("Orders"), "\"Orders\"");
    }

    #[test]
    fn test_global_registry() {
        let registry = global().read().unwrap();
        assert!(registry.contains("GENERIC"));
    }
}
