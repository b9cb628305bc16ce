//! Generic Dialect
//!
//! Fallback for remotes without a dedicated dialect. Null ordering is taken
//! from what the remote reported when the schema was read.

use super::{standard_capabilities, FunctionAliases, NullSortingPolicy, SqlDialect};
use crate::capabilities::Capabilities;
use crate::rewriter::ImportStrategy;
use ferry_common::AdapterProperties;

pub const NAME: &str = "GENERIC";

#[derive(Debug, Clone)]
pub struct GenericDialect {
    aliases: FunctionAliases,
}

impl Default for GenericDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl GenericDialect {
    pub fn new() -> Self {
        Self {
            aliases: FunctionAliases::new(),
        }
    }

    pub fn from_properties(_properties: &AdapterProperties) -> Self {
        Self::new()
    }
}

impl SqlDialect for GenericDialect {
    fn name(&self) -> &str {
        NAME
    }

    fn capabilities(&self) -> Capabilities {
        standard_capabilities()
    }

    fn supports_catalogs(&self) -> bool {
        true
    }

    fn supports_schemas(&self) -> bool {
        true
    }

    fn default_null_sorting(&self) -> NullSortingPolicy {
        NullSortingPolicy::FromRemote
    }

    fn function_aliases(&self) -> &FunctionAliases {
        &self.aliases
    }

    fn import_strategy(&self) -> ImportStrategy {
        ImportStrategy::IntoTempTable
    }
}
