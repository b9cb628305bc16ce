//! Oracle Dialect
//!
//! Schemas only, NULLs sort high, row limiting through `FETCH`.

use super::{standard_capabilities, FunctionAliases, NullSorting, NullSortingPolicy, SqlDialect};
use crate::ast::{Limit, ScalarFunction};
use crate::capabilities::{AggregateFunctionCapability, Capabilities, LiteralCapability, PredicateCapability};
use crate::rewriter::ImportStrategy;
use crate::typemap::{BaseTypeMapper, MappingContext, TypeMapper};
use crate::types::{Charset, DataType, JdbcType, RemoteTypeDescriptor, MAX_DECIMAL_PRECISION};
use ferry_common::AdapterProperties;

pub const NAME: &str = "ORACLE";

const TIMESTAMP_WITH_TIME_ZONE: i32 = -101;
const TIMESTAMP_WITH_LOCAL_TIME_ZONE: i32 = -102;
const BINARY_FLOAT: i32 = 100;
const BINARY_DOUBLE: i32 = 101;

#[derive(Debug, Clone)]
pub struct OracleDialect {
    aliases: FunctionAliases,
}

impl Default for OracleDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl OracleDialect {
    pub fn new() -> Self {
        Self {
            aliases: FunctionAliases::new(),
        }
    }

    pub fn from_properties(_properties: &AdapterProperties) -> Self {
        Self::new()
    }
}

impl SqlDialect for OracleDialect {
    fn name(&self) -> &str {
        NAME
    }

    fn capabilities(&self) -> Capabilities {
        let mut caps = standard_capabilities()
            .with_predicates(&[PredicateCapability::RegexpLike])
            .with_scalar_functions(&[
                ScalarFunction::Mod,
                ScalarFunction::Power,
                ScalarFunction::Ln,
                ScalarFunction::Exp,
                ScalarFunction::Instr,
                ScalarFunction::Lpad,
                ScalarFunction::Rpad,
                ScalarFunction::Initcap,
                ScalarFunction::Translate,
                ScalarFunction::AddMonths,
                ScalarFunction::MonthsBetween,
                ScalarFunction::Sysdate,
                ScalarFunction::Systimestamp,
                ScalarFunction::Dbtimezone,
                ScalarFunction::Sessiontimezone,
                ScalarFunction::ToChar,
                ScalarFunction::ToDate,
                ScalarFunction::ToNumber,
                ScalarFunction::ToTimestamp,
                ScalarFunction::Greatest,
                ScalarFunction::Least,
            ])
            .with_aggregate_functions(&[
                AggregateFunctionCapability::Median,
                AggregateFunctionCapability::Stddev,
                AggregateFunctionCapability::StddevPop,
                AggregateFunctionCapability::StddevSamp,
                AggregateFunctionCapability::Variance,
                AggregateFunctionCapability::VarPop,
                AggregateFunctionCapability::VarSamp,
                AggregateFunctionCapability::Listagg,
                AggregateFunctionCapability::ListaggDistinct,
                AggregateFunctionCapability::ListaggSeparator,
                AggregateFunctionCapability::ListaggOnOverflowError,
                AggregateFunctionCapability::ListaggOnOverflowTruncate,
                AggregateFunctionCapability::ListaggOrderBy,
            ]);
        // No boolean SQL type.
        caps.literals.remove(&LiteralCapability::Bool);
        caps
    }

    fn supports_catalogs(&self) -> bool {
        false
    }

    fn supports_schemas(&self) -> bool {
        true
    }

    fn default_null_sorting(&self) -> NullSortingPolicy {
        NullSortingPolicy::Fixed(NullSorting::High)
    }

    fn function_aliases(&self) -> &FunctionAliases {
        &self.aliases
    }

    fn import_strategy(&self) -> ImportStrategy {
        ImportStrategy::IntoDescribed
    }

    fn any_value_token(&self) -> &'static str {
        "1"
    }

    fn limit_clause(&self, limit: &Limit) -> String {
        if limit.offset == 0 {
            format!("FETCH FIRST {} ROWS ONLY", limit.limit)
        } else {
            format!(
                "OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
                limit.offset, limit.limit
            )
        }
    }

    fn create_type_mapper(&self, context: &MappingContext) -> Box<dyn TypeMapper> {
        Box::new(OracleTypeMapper {
            base: BaseTypeMapper::new(context),
        })
    }
}

/// Oracle reports NUMBER as NUMERIC; an unconstrained NUMBER has precision 0.
#[derive(Debug)]
struct OracleTypeMapper {
    base: BaseTypeMapper,
}

impl TypeMapper for OracleTypeMapper {
    fn map(&self, d: &RemoteTypeDescriptor) -> DataType {
        match d.type_code {
            JdbcType::Numeric | JdbcType::Decimal if d.precision_or_size == 0 => DataType::Double,
            JdbcType::Numeric if d.precision_or_size <= MAX_DECIMAL_PRECISION => {
                DataType::decimal(d.precision_or_size, d.scale.max(0) as u32)
            }
            JdbcType::Other(BINARY_FLOAT) | JdbcType::Other(BINARY_DOUBLE) => DataType::Double,
            JdbcType::Other(TIMESTAMP_WITH_TIME_ZONE) => DataType::varchar(100, Charset::Utf8),
            JdbcType::Other(TIMESTAMP_WITH_LOCAL_TIME_ZONE) => {
                let as_timestamp = RemoteTypeDescriptor {
                    type_code: JdbcType::Timestamp,
                    ..d.clone()
                };
                self.base.map(&as_timestamp)
            }
            _ => self.base.map(d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_limit() {
        let dialect = OracleDialect::new();
        assert_eq!(dialect.limit_clause(&Limit::new(10)), "FETCH FIRST 10 ROWS ONLY");
        assert_eq!(
            dialect.limit_clause(&Limit::with_offset(10, 5)),
            "OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn test_number_mapping() {
        let mapper = OracleDialect::new().create_type_mapper(&MappingContext::with_host_version("7.1"));
        assert_eq!(
            mapper.map(&RemoteTypeDescriptor::new(JdbcType::Numeric, 0, -127)),
            DataType::Double
        );
        assert_eq!(
            mapper.map(&RemoteTypeDescriptor::new(JdbcType::Numeric, 10, 2)),
            DataType::decimal(10, 2)
        );
        assert_eq!(
            mapper.map(&RemoteTypeDescriptor::new(JdbcType::Numeric, 38, 0)),
            DataType::fallback_varchar()
        );
        assert_eq!(
            mapper.map(&RemoteTypeDescriptor::new(JdbcType::Other(TIMESTAMP_WITH_LOCAL_TIME_ZONE), 0, 6)),
            DataType::timestamp(6)
        );
    }

    #[test]
    fn test_no_boolean_literals() {
        assert!(!OracleDialect::new()
            .capabilities()
            .literals
            .contains(&LiteralCapability::Bool));
    }
}
