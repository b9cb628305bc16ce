//! PostgreSQL Dialect
//!
//! PostgreSQL folds unquoted identifiers to lower case while the host folds
//! to upper case. By default remote names are presented upper-cased and
//! converted back when quoting; POSTGRESQL_IDENTIFIER_MAPPING switches this
//! off.

use super::{
    standard_capabilities, FunctionAliases, NullSorting, NullSortingPolicy, SqlDialect,
    SqlGenerationContext,
};
use crate::ast::ScalarFunction;
use crate::capabilities::{AggregateFunctionCapability, Capabilities};
use crate::metadata::{IdentifierCase, RemoteMetadataReader};
use crate::rewriter::ImportStrategy;
use crate::typemap::{BaseTypeMapper, MappingContext, TypeMapper};
use crate::types::{Charset, DataType, RemoteTypeDescriptor};
use ferry_common::{validation, AdapterProperties, ConfigurationError};

pub const NAME: &str = "POSTGRESQL";
pub const IDENTIFIER_MAPPING_PROPERTY: &str = "POSTGRESQL_IDENTIFIER_MAPPING";
pub const IGNORE_UPPERCASE_TABLES: &str = "POSTGRESQL_UPPERCASE_TABLES";

const CONVERT_TO_UPPER: &str = "CONVERT_TO_UPPER";
const PRESERVE_ORIGINAL_CASE: &str = "PRESERVE_ORIGINAL_CASE";

#[derive(Debug, Clone)]
pub struct PostgresDialect {
    aliases: FunctionAliases,
    identifier_case: IdentifierCase,
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new(IdentifierCase::Upper)
    }
}

impl PostgresDialect {
    pub fn new(identifier_case: IdentifierCase) -> Self {
        Self {
            aliases: postgres_function_aliases(),
            identifier_case,
        }
    }

    /// Unknown mapping values fall back to the default here and are
    /// reported by `validate_properties`.
    pub fn from_properties(properties: &AdapterProperties) -> Self {
        let identifier_case = match properties.get(IDENTIFIER_MAPPING_PROPERTY) {
            Some(v) if v.eq_ignore_ascii_case(PRESERVE_ORIGINAL_CASE) => IdentifierCase::Preserve,
            _ => IdentifierCase::Upper,
        };
        Self::new(identifier_case)
    }
}

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &str {
        NAME
    }

    fn capabilities(&self) -> Capabilities {
        standard_capabilities()
            .with_scalar_functions(&[
                ScalarFunction::Mod,
                ScalarFunction::Power,
                ScalarFunction::Ln,
                ScalarFunction::Exp,
                ScalarFunction::Lpad,
                ScalarFunction::Rpad,
                ScalarFunction::Repeat,
                ScalarFunction::Reverse,
                ScalarFunction::Right,
                ScalarFunction::Initcap,
                ScalarFunction::Translate,
                ScalarFunction::HashMd5,
                ScalarFunction::Greatest,
                ScalarFunction::Least,
            ])
            .with_aggregate_functions(&[
                AggregateFunctionCapability::StddevPop,
                AggregateFunctionCapability::StddevSamp,
                AggregateFunctionCapability::VarPop,
                AggregateFunctionCapability::VarSamp,
                AggregateFunctionCapability::Every,
            ])
    }

    fn supports_catalogs(&self) -> bool {
        true
    }

    fn supports_schemas(&self) -> bool {
        true
    }

    /// A connection always targets a single database.
    fn requires_catalog_qualified_table_names(&self, _context: &SqlGenerationContext) -> bool {
        false
    }

    fn default_null_sorting(&self) -> NullSortingPolicy {
        NullSortingPolicy::Fixed(NullSorting::High)
    }

    fn function_aliases(&self) -> &FunctionAliases {
        &self.aliases
    }

    fn import_strategy(&self) -> ImportStrategy {
        ImportStrategy::IntoTempTable
    }

    fn supported_properties(&self) -> Vec<&'static str> {
        let mut keys = ferry_common::properties::COMMON_PROPERTIES.to_vec();
        keys.extend([
            ferry_common::properties::CATALOG_NAME,
            ferry_common::properties::SCHEMA_NAME,
            ferry_common::properties::IGNORE_ERRORS,
            IDENTIFIER_MAPPING_PROPERTY,
        ]);
        keys
    }

    fn ignorable_errors(&self) -> &'static [&'static str] {
        &[IGNORE_UPPERCASE_TABLES]
    }

    fn apply_quote(&self, identifier: &str) -> String {
        let identifier = match self.identifier_case {
            IdentifierCase::Upper => identifier.to_lowercase(),
            IdentifierCase::Preserve => identifier.to_string(),
        };
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    fn identifier_case(&self) -> IdentifierCase {
        self.identifier_case
    }

    fn create_type_mapper(&self, context: &MappingContext) -> Box<dyn TypeMapper> {
        Box::new(PostgresTypeMapper {
            base: BaseTypeMapper::new(context),
        })
    }

    fn create_metadata_reader(
        &self,
        properties: &AdapterProperties,
        context: &MappingContext,
    ) -> RemoteMetadataReader {
        let reader = RemoteMetadataReader::new(
            self.name(),
            self.create_type_mapper(context),
            self.table_types(),
            self.identifier_case,
        );
        if self.identifier_case == IdentifierCase::Upper {
            reader.reject_upper_case_tables(properties.is_error_ignored(IGNORE_UPPERCASE_TABLES))
        } else {
            reader
        }
    }

    fn validate_properties(&self, properties: &AdapterProperties) -> Result<(), ConfigurationError> {
        validation::validate_common(
            properties,
            self.name(),
            &self.supported_properties(),
            self.supports_catalogs(),
            self.supports_schemas(),
        )?;
        validation::validate_ignored_errors(properties, self.ignorable_errors())?;
        if let Some(value) = properties.get(IDENTIFIER_MAPPING_PROPERTY) {
            if !value.eq_ignore_ascii_case(CONVERT_TO_UPPER)
                && !value.eq_ignore_ascii_case(PRESERVE_ORIGINAL_CASE)
            {
                return Err(ConfigurationError::InvalidValue {
                    key: IDENTIFIER_MAPPING_PROPERTY.to_string(),
                    value: value.to_string(),
                    reason: format!("expected {} or {}", CONVERT_TO_UPPER, PRESERVE_ORIGINAL_CASE),
                });
            }
        }
        crate::capabilities::parse_excluded_capabilities(&properties.excluded_capabilities())?;
        Ok(())
    }
}

fn postgres_function_aliases() -> FunctionAliases {
    FunctionAliases::new()
        .scalar(ScalarFunction::HashMd5, "MD5")
        .scalar(ScalarFunction::Substr, "SUBSTRING")
}

/// Maps PostgreSQL-specific `OTHER` columns the base mapping cannot see into.
#[derive(Debug)]
struct PostgresTypeMapper {
    base: BaseTypeMapper,
}

impl TypeMapper for PostgresTypeMapper {
    fn map(&self, descriptor: &RemoteTypeDescriptor) -> DataType {
        if descriptor.type_code.is_vendor_specific() {
            match descriptor.type_name.to_ascii_lowercase().as_str() {
                "json" | "jsonb" | "xml" | "varbit" => return DataType::fallback_varchar(),
                "uuid" => return DataType::varchar(36, Charset::Ascii),
                _ => {}
            }
        }
        self.base.map(descriptor)
    }
}
