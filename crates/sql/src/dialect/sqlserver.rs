//! SQL Server Dialect
//!
//! Bracket quoting, `TOP n` row limiting, predicates in place of boolean
//! literals. Results are imported without a column description, with
//! credentials inlined.

use super::{
    emulated_sort_key, standard_capabilities, FunctionAliases, LimitPosition, NullSorting,
    NullSortingPolicy, SqlDialect,
};
use crate::ast::{AggregateFunction, Limit, ScalarFunction};
use crate::capabilities::{
    AggregateFunctionCapability, Capabilities, LiteralCapability, MainCapability,
};
use crate::rewriter::{ConnectionDefinitionStyle, ImportStrategy};
use ferry_common::AdapterProperties;

pub const NAME: &str = "SQLSERVER";

#[derive(Debug, Clone)]
pub struct SqlServerDialect {
    aliases: FunctionAliases,
}

impl Default for SqlServerDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlServerDialect {
    pub fn new() -> Self {
        Self {
            aliases: sqlserver_function_aliases(),
        }
    }

    pub fn from_properties(_properties: &AdapterProperties) -> Self {
        Self::new()
    }
}

impl SqlDialect for SqlServerDialect {
    fn name(&self) -> &str {
        NAME
    }

    fn capabilities(&self) -> Capabilities {
        let mut caps = standard_capabilities()
            .without_scalar_functions(&[ScalarFunction::CurrentDate])
            .with_scalar_functions(&[
                ScalarFunction::Power,
                ScalarFunction::Exp,
                ScalarFunction::Ln,
                ScalarFunction::Reverse,
                ScalarFunction::Right,
                ScalarFunction::Space,
                ScalarFunction::Sysdate,
                ScalarFunction::CurrentUser,
            ])
            .with_aggregate_functions(&[
                AggregateFunctionCapability::Stddev,
                AggregateFunctionCapability::StddevPop,
                AggregateFunctionCapability::StddevSamp,
                AggregateFunctionCapability::Variance,
                AggregateFunctionCapability::VarPop,
                AggregateFunctionCapability::VarSamp,
            ]);
        // TOP has no offset.
        caps.main.remove(&MainCapability::LimitWithOffset);
        // Booleans only exist as predicates.
        caps.literals.remove(&LiteralCapability::Bool);
        caps
    }

    fn supports_catalogs(&self) -> bool {
        true
    }

    fn supports_schemas(&self) -> bool {
        true
    }

    fn default_null_sorting(&self) -> NullSortingPolicy {
        NullSortingPolicy::Fixed(NullSorting::Low)
    }

    fn function_aliases(&self) -> &FunctionAliases {
        &self.aliases
    }

    fn import_strategy(&self) -> ImportStrategy {
        ImportStrategy::Direct
    }

    fn connection_definition_style(&self) -> ConnectionDefinitionStyle {
        ConnectionDefinitionStyle::Inline
    }

    fn apply_quote(&self, identifier: &str) -> String {
        format!("[{}]", identifier.replace(']', "]]"))
    }

    fn date_literal(&self, value: &str) -> String {
        format!("CAST({} AS DATE)", self.string_literal(value))
    }

    fn timestamp_literal(&self, value: &str) -> String {
        format!("CAST({} AS DATETIME2)", self.string_literal(value))
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1 = 1"
        } else {
            "1 = 0"
        }
    }

    fn any_value_token(&self) -> &'static str {
        "1"
    }

    fn sort_key(&self, expression: &str, ascending: bool, nulls_last: Option<bool>) -> String {
        emulated_sort_key(expression, ascending, nulls_last)
    }

    fn limit_position(&self) -> LimitPosition {
        LimitPosition::AfterSelect
    }

    fn limit_clause(&self, limit: &Limit) -> String {
        format!("TOP {}", limit.limit)
    }
}

fn sqlserver_function_aliases() -> FunctionAliases {
    FunctionAliases::new()
        .scalar(ScalarFunction::Length, "LEN")
        .scalar(ScalarFunction::Substr, "SUBSTRING")
        .scalar(ScalarFunction::Ceil, "CEILING")
        .scalar(ScalarFunction::Ln, "LOG")
        .scalar(ScalarFunction::Sysdate, "GETDATE")
        .aggregate(AggregateFunction::Stddev, "STDEV")
        .aggregate(AggregateFunction::StddevSamp, "STDEV")
        .aggregate(AggregateFunction::StddevPop, "STDEVP")
        .aggregate(AggregateFunction::Variance, "VAR")
        .aggregate(AggregateFunction::VarSamp, "VAR")
        .aggregate(AggregateFunction::VarPop, "VARP")
}
