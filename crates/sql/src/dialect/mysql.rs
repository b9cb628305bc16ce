//! MySQL Dialect
//!
//! Backtick quoting, catalogs only (MySQL databases), NULLs sort low.

use super::{
    emulated_sort_key, standard_capabilities, FunctionAliases, NullSorting, NullSortingPolicy,
    SqlDialect,
};
use crate::ast::ScalarFunction;
use crate::capabilities::{
    AggregateFunctionCapability, Capabilities, MainCapability, PredicateCapability,
};
use crate::rewriter::ImportStrategy;
use ferry_common::AdapterProperties;

pub const NAME: &str = "MYSQL";

#[derive(Debug, Clone)]
pub struct MySqlDialect {
    aliases: FunctionAliases,
}

impl Default for MySqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl MySqlDialect {
    pub fn new() -> Self {
        Self {
            aliases: mysql_function_aliases(),
        }
    }

    pub fn from_properties(_properties: &AdapterProperties) -> Self {
        Self::new()
    }
}

impl SqlDialect for MySqlDialect {
    fn name(&self) -> &str {
        NAME
    }

    fn capabilities(&self) -> Capabilities {
        let mut caps = standard_capabilities()
            .with_predicates(&[PredicateCapability::RegexpLike])
            .with_scalar_functions(&[
                ScalarFunction::Mod,
                ScalarFunction::Power,
                ScalarFunction::Instr,
                ScalarFunction::Locate,
                ScalarFunction::Lpad,
                ScalarFunction::Rpad,
                ScalarFunction::Repeat,
                ScalarFunction::Reverse,
                ScalarFunction::Right,
                ScalarFunction::HashMd5,
                ScalarFunction::HashSha1,
            ])
            .with_aggregate_functions(&[
                AggregateFunctionCapability::GroupConcat,
                AggregateFunctionCapability::GroupConcatDistinct,
                AggregateFunctionCapability::GroupConcatSeparator,
                AggregateFunctionCapability::GroupConcatOrderBy,
                AggregateFunctionCapability::StddevPop,
                AggregateFunctionCapability::StddevSamp,
                AggregateFunctionCapability::VarPop,
                AggregateFunctionCapability::VarSamp,
            ]);
        // No FULL OUTER JOIN in MySQL.
        caps.main.remove(&MainCapability::JoinTypeFullOuter);
        caps
    }

    fn supports_catalogs(&self) -> bool {
        true
    }

    fn supports_schemas(&self) -> bool {
        false
    }

    fn default_null_sorting(&self) -> NullSortingPolicy {
        NullSortingPolicy::Fixed(NullSorting::Low)
    }

    fn function_aliases(&self) -> &FunctionAliases {
        &self.aliases
    }

    fn import_strategy(&self) -> ImportStrategy {
        ImportStrategy::IntoDescribed
    }

    fn sort_key(&self, expression: &str, ascending: bool, nulls_last: Option<bool>) -> String {
        emulated_sort_key(expression, ascending, nulls_last)
    }

    fn apply_quote(&self, identifier: &str) -> String {
        format!("`{}`", identifier.replace('`', "``"))
    }

    fn string_literal(&self, value: &str) -> String {
        // Backslash is an escape character in MySQL string literals.
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }
}

fn mysql_function_aliases() -> FunctionAliases {
    FunctionAliases::new()
        .scalar(ScalarFunction::HashMd5, "MD5")
        .scalar(ScalarFunction::HashSha1, "SHA1")
        .scalar(ScalarFunction::Substr, "SUBSTRING")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.apply_quote("my`table"), "`my``table`");
        assert_eq!(dialect.string_literal(r"a\b'c"), r"'a\\b''c'");
    }

    #[test]
    fn test_no_full_outer_join() {
        let caps = MySqlDialect::new().capabilities();
        assert!(caps.main.contains(&MainCapability::JoinTypeLeftOuter));
        assert!(!caps.main.contains(&MainCapability::JoinTypeFullOuter));
    }
}
