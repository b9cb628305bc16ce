//! The dialect contract.
//!
//! A dialect is the single extension point for a new remote engine: quoting,
//! qualification, null ordering, function aliases, literal forms,
//! capabilities, accepted properties and the strategies used to read
//! metadata and build load statements. The generator and rewriter only ever
//! see `&dyn SqlDialect`.

pub mod function_aliases;
pub mod generic;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlserver;

pub use self::function_aliases::FunctionAliases;
pub use self::generic::GenericDialect;
pub use self::mysql::MySqlDialect;
pub use self::oracle::OracleDialect;
pub use self::postgres::PostgresDialect;
pub use self::sqlserver::SqlServerDialect;

use crate::ast::{Limit, ScalarFunction};
use crate::capabilities::{parse_excluded_capabilities, Capabilities};
use crate::metadata::{IdentifierCase, RemoteMetadataReader, SchemaAdapterNotes};
use crate::rewriter::{ConnectionDefinitionStyle, ImportStrategy, QueryRewriter};
use crate::typemap::{BaseTypeMapper, MappingContext, TypeMapper};
use crate::types::IntervalKind;
use ferry_common::properties::{self, AdapterProperties};
use ferry_common::{validation, ConfigurationError};

/// Where NULLs land when no explicit NULLS FIRST / LAST is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullSorting {
    AtEnd,
    AtStart,
    High,
    Low,
}

impl NullSorting {
    pub const ALL: [NullSorting; 4] = [
        NullSorting::AtEnd,
        NullSorting::AtStart,
        NullSorting::High,
        NullSorting::Low,
    ];

    /// Whether NULLs come last for the given direction without an explicit
    /// NULLS clause.
    pub fn nulls_last_by_default(&self, ascending: bool) -> bool {
        if ascending {
            matches!(self, NullSorting::AtEnd | NullSorting::High)
        } else {
            matches!(self, NullSorting::AtEnd | NullSorting::Low)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullSortingPolicy {
    Fixed(NullSorting),
    /// Read from the schema adapter notes captured at metadata time.
    FromRemote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitPosition {
    /// `... ORDER BY x LIMIT n`
    Trailing,
    /// `SELECT TOP n ...`
    AfterSelect,
}

/// Per-request inputs to SQL generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlGenerationContext {
    pub catalog_name: Option<String>,
    pub schema_name: Option<String>,
    pub adapter_notes: Option<SchemaAdapterNotes>,
}

impl SqlGenerationContext {
    pub fn from_properties(
        properties: &AdapterProperties,
        adapter_notes: Option<SchemaAdapterNotes>,
    ) -> Self {
        Self {
            catalog_name: properties.catalog_name().map(str::to_string),
            schema_name: properties.schema_name().map(str::to_string),
            adapter_notes,
        }
    }
}

/// Zero-argument functions written without parentheses by default.
pub const PARENTHESIS_FREE_FUNCTIONS: &[ScalarFunction] = &[
    ScalarFunction::CurrentDate,
    ScalarFunction::CurrentTimestamp,
    ScalarFunction::CurrentUser,
    ScalarFunction::Localtimestamp,
    ScalarFunction::Sysdate,
    ScalarFunction::Systimestamp,
    ScalarFunction::Dbtimezone,
    ScalarFunction::Sessiontimezone,
    ScalarFunction::CurrentSchema,
    ScalarFunction::CurrentSession,
    ScalarFunction::CurrentStatement,
];

pub trait SqlDialect: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    fn supports_catalogs(&self) -> bool;

    fn supports_schemas(&self) -> bool;

    fn default_null_sorting(&self) -> NullSortingPolicy;

    fn function_aliases(&self) -> &FunctionAliases;

    fn import_strategy(&self) -> ImportStrategy;

    /// Property keys accepted by this dialect.
    fn supported_properties(&self) -> Vec<&'static str> {
        let mut keys = properties::COMMON_PROPERTIES.to_vec();
        if self.supports_catalogs() {
            keys.push(properties::CATALOG_NAME);
        }
        if self.supports_schemas() {
            keys.push(properties::SCHEMA_NAME);
        }
        if !self.ignorable_errors().is_empty() {
            keys.push(properties::IGNORE_ERRORS);
        }
        keys
    }

    /// Names accepted in IGNORE_ERRORS.
    fn ignorable_errors(&self) -> &'static [&'static str] {
        &[]
    }

    fn requires_catalog_qualified_table_names(&self, context: &SqlGenerationContext) -> bool {
        self.supports_catalogs() && context.catalog_name.is_some()
    }

    fn requires_schema_qualified_table_names(&self, context: &SqlGenerationContext) -> bool {
        self.supports_schemas() && context.schema_name.is_some()
    }

    fn apply_quote(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    fn omits_parentheses(&self, function: ScalarFunction) -> bool {
        PARENTHESIS_FREE_FUNCTIONS.contains(&function)
    }

    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn date_literal(&self, value: &str) -> String {
        format!("DATE {}", self.string_literal(value))
    }

    fn timestamp_literal(&self, value: &str) -> String {
        format!("TIMESTAMP {}", self.string_literal(value))
    }

    fn interval_literal(&self, value: &str, kind: IntervalKind, precision: u32, fraction: u32) -> String {
        match kind {
            IntervalKind::YearToMonth => format!(
                "INTERVAL {} YEAR ({}) TO MONTH",
                self.string_literal(value),
                precision
            ),
            IntervalKind::DayToSecond => format!(
                "INTERVAL {} DAY ({}) TO SECOND ({})",
                self.string_literal(value),
                precision,
                fraction
            ),
        }
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    /// Select list used when the host only needs to know whether rows exist.
    fn any_value_token(&self) -> &'static str {
        "true"
    }

    fn limit_position(&self) -> LimitPosition {
        LimitPosition::Trailing
    }

    fn limit_clause(&self, limit: &Limit) -> String {
        if limit.offset == 0 {
            format!("LIMIT {}", limit.limit)
        } else {
            format!("LIMIT {} OFFSET {}", limit.limit, limit.offset)
        }
    }

    /// One ORDER BY key. `nulls_last` is only set when the requested NULL
    /// placement differs from where the remote puts NULLs on its own.
    fn sort_key(&self, expression: &str, ascending: bool, nulls_last: Option<bool>) -> String {
        let direction = if ascending { "" } else { " DESC" };
        match nulls_last {
            None => format!("{}{}", expression, direction),
            Some(true) => format!("{}{} NULLS LAST", expression, direction),
            Some(false) => format!("{}{} NULLS FIRST", expression, direction),
        }
    }

    fn connection_definition_style(&self) -> ConnectionDefinitionStyle {
        ConnectionDefinitionStyle::Named
    }

    /// Remote table types read into the virtual schema.
    fn table_types(&self) -> Vec<&'static str> {
        vec!["TABLE", "VIEW"]
    }

    /// How remote identifiers are presented to the host.
    fn identifier_case(&self) -> IdentifierCase {
        IdentifierCase::Preserve
    }

    fn create_type_mapper(&self, context: &MappingContext) -> Box<dyn TypeMapper> {
        Box::new(BaseTypeMapper::new(context))
    }

    fn create_metadata_reader(
        &self,
        properties: &AdapterProperties,
        context: &MappingContext,
    ) -> RemoteMetadataReader {
        let _ = properties;
        RemoteMetadataReader::new(
            self.name(),
            self.create_type_mapper(context),
            self.table_types(),
            self.identifier_case(),
        )
    }

    fn create_query_rewriter(&self) -> QueryRewriter {
        QueryRewriter::new(self.import_strategy(), self.connection_definition_style())
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
        parse_excluded_capabilities(&properties.excluded_capabilities())?;
        Ok(())
    }
}

/// Sort key for engines without `NULLS FIRST` / `NULLS LAST`: a leading
/// null indicator key puts NULLs where requested.
pub(crate) fn emulated_sort_key(
    expression: &str,
    ascending: bool,
    nulls_last: Option<bool>,
) -> String {
    let direction = if ascending { "" } else { " DESC" };
    match nulls_last {
        None => format!("{}{}", expression, direction),
        Some(last) => format!(
            "CASE WHEN {} IS NULL THEN 1 ELSE 0 END{}, {}{}",
            expression,
            if last { "" } else { " DESC" },
            expression,
            direction
        ),
    }
}

/// Capabilities most dialects start from.
pub(crate) fn standard_capabilities() -> Capabilities {
    use crate::capabilities::{
        AggregateFunctionCapability as A, LiteralCapability as L, MainCapability as M,
        PredicateCapability as P,
    };

    Capabilities::new()
        .with_main(&[
            M::SelectlistProjection,
            M::SelectlistExpressions,
            M::FilterExpressions,
            M::AggregateSingleGroup,
            M::AggregateGroupByColumn,
            M::AggregateGroupByExpression,
            M::AggregateGroupByTuple,
            M::AggregateHaving,
            M::OrderByColumn,
            M::OrderByExpression,
            M::Limit,
            M::LimitWithOffset,
            M::Join,
            M::JoinTypeInner,
            M::JoinTypeLeftOuter,
            M::JoinTypeRightOuter,
            M::JoinTypeFullOuter,
            M::JoinConditionEqui,
        ])
        .with_literals(&[
            L::Bool,
            L::Null,
            L::Date,
            L::Timestamp,
            L::TimestampUtc,
            L::Double,
            L::ExactNumeric,
            L::String,
        ])
        .with_predicates(&[
            P::And,
            P::Or,
            P::Not,
            P::Equal,
            P::NotEqual,
            P::Less,
            P::LessEqual,
            P::Like,
            P::LikeEscape,
            P::Between,
            P::InConstList,
            P::IsNull,
            P::IsNotNull,
        ])
        .with_scalar_functions(&[
            ScalarFunction::Add,
            ScalarFunction::Sub,
            ScalarFunction::Mult,
            ScalarFunction::FloatDiv,
            ScalarFunction::Neg,
            ScalarFunction::Abs,
            ScalarFunction::Ceil,
            ScalarFunction::Floor,
            ScalarFunction::Round,
            ScalarFunction::Sign,
            ScalarFunction::Sqrt,
            ScalarFunction::Lower,
            ScalarFunction::Upper,
            ScalarFunction::Length,
            ScalarFunction::Ltrim,
            ScalarFunction::Rtrim,
            ScalarFunction::Trim,
            ScalarFunction::Replace,
            ScalarFunction::Substr,
            ScalarFunction::Concat,
            ScalarFunction::CurrentDate,
            ScalarFunction::CurrentTimestamp,
            ScalarFunction::Extract,
            ScalarFunction::Cast,
            ScalarFunction::Case,
        ])
        .with_aggregate_functions(&[
            A::Count,
            A::CountStar,
            A::CountDistinct,
            A::Sum,
            A::SumDistinct,
            A::Min,
            A::Max,
            A::Avg,
            A::AvgDistinct,
        ])
}
