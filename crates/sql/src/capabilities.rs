//! Pushdown capabilities and EXCLUDED_CAPABILITIES negotiation.

use crate::ast::ScalarFunction;
use crate::macros::named_enum;
use ferry_common::ConfigurationError;
use serde::Serialize;
use std::collections::BTreeSet;

named_enum! {
    pub enum MainCapability {
        SelectlistProjection => "SELECTLIST_PROJECTION",
        SelectlistExpressions => "SELECTLIST_EXPRESSIONS",
        FilterExpressions => "FILTER_EXPRESSIONS",
        AggregateSingleGroup => "AGGREGATE_SINGLE_GROUP",
        AggregateGroupByColumn => "AGGREGATE_GROUP_BY_COLUMN",
        AggregateGroupByExpression => "AGGREGATE_GROUP_BY_EXPRESSION",
        AggregateGroupByTuple => "AGGREGATE_GROUP_BY_TUPLE",
        AggregateHaving => "AGGREGATE_HAVING",
        OrderByColumn => "ORDER_BY_COLUMN",
        OrderByExpression => "ORDER_BY_EXPRESSION",
        Limit => "LIMIT",
        LimitWithOffset => "LIMIT_WITH_OFFSET",
        Join => "JOIN",
        JoinTypeInner => "JOIN_TYPE_INNER",
        JoinTypeLeftOuter => "JOIN_TYPE_LEFT_OUTER",
        JoinTypeRightOuter => "JOIN_TYPE_RIGHT_OUTER",
        JoinTypeFullOuter => "JOIN_TYPE_FULL_OUTER",
        JoinConditionEqui => "JOIN_CONDITION_EQUI",
        JoinConditionAll => "JOIN_CONDITION_ALL",
    }
}

named_enum! {
    pub enum LiteralCapability {
        Bool => "BOOL",
        Null => "NULL",
        Date => "DATE",
        Timestamp => "TIMESTAMP",
        TimestampUtc => "TIMESTAMP_UTC",
        Double => "DOUBLE",
        ExactNumeric => "EXACTNUMERIC",
        String => "STRING",
        Interval => "INTERVAL",
    }
}

named_enum! {
    pub enum PredicateCapability {
        And => "AND",
        Or => "OR",
        Not => "NOT",
        Equal => "EQUAL",
        NotEqual => "NOTEQUAL",
        Less => "LESS",
        LessEqual => "LESSEQUAL",
        Like => "LIKE",
        LikeEscape => "LIKE_ESCAPE",
        RegexpLike => "REGEXP_LIKE",
        Between => "BETWEEN",
        InConstList => "IN_CONSTLIST",
        IsNull => "IS_NULL",
        IsNotNull => "IS_NOT_NULL",
        IsJson => "IS_JSON",
        IsNotJson => "IS_NOT_JSON",
    }
}

named_enum! {
    pub enum AggregateFunctionCapability {
        Count => "COUNT",
        CountStar => "COUNT_STAR",
        CountDistinct => "COUNT_DISTINCT",
        CountTuple => "COUNT_TUPLE",
        Sum => "SUM",
        SumDistinct => "SUM_DISTINCT",
        Min => "MIN",
        Max => "MAX",
        Avg => "AVG",
        AvgDistinct => "AVG_DISTINCT",
        Median => "MEDIAN",
        FirstValue => "FIRST_VALUE",
        LastValue => "LAST_VALUE",
        Stddev => "STDDEV",
        StddevDistinct => "STDDEV_DISTINCT",
        StddevPop => "STDDEV_POP",
        StddevPopDistinct => "STDDEV_POP_DISTINCT",
        StddevSamp => "STDDEV_SAMP",
        StddevSampDistinct => "STDDEV_SAMP_DISTINCT",
        Variance => "VARIANCE",
        VarianceDistinct => "VARIANCE_DISTINCT",
        VarPop => "VAR_POP",
        VarPopDistinct => "VAR_POP_DISTINCT",
        VarSamp => "VAR_SAMP",
        VarSampDistinct => "VAR_SAMP_DISTINCT",
        Mul => "MUL",
        MulDistinct => "MUL_DISTINCT",
        Every => "EVERY",
        Some => "SOME",
        ApproximateCountDistinct => "APPROXIMATE_COUNT_DISTINCT",
        GroupConcat => "GROUP_CONCAT",
        GroupConcatDistinct => "GROUP_CONCAT_DISTINCT",
        GroupConcatSeparator => "GROUP_CONCAT_SEPARATOR",
        GroupConcatOrderBy => "GROUP_CONCAT_ORDER_BY",
        Listagg => "LISTAGG",
        ListaggDistinct => "LISTAGG_DISTINCT",
        ListaggSeparator => "LISTAGG_SEPARATOR",
        ListaggOnOverflowError => "LISTAGG_ON_OVERFLOW_ERROR",
        ListaggOnOverflowTruncate => "LISTAGG_ON_OVERFLOW_TRUNCATE",
        ListaggOrderBy => "LISTAGG_ORDER_BY",
    }
}

/// Scalar function capabilities share the scalar function names.
pub type ScalarFunctionCapability = ScalarFunction;

pub const LITERAL_PREFIX: &str = "LITERAL_";
pub const AGGREGATE_FUNCTION_PREFIX: &str = "FN_AGG_";
pub const PREDICATE_PREFIX: &str = "FN_PRED_";
pub const SCALAR_FUNCTION_PREFIX: &str = "FN_";

/// The constructs a dialect lets the host planner push down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub main: BTreeSet<MainCapability>,
    pub literals: BTreeSet<LiteralCapability>,
    pub predicates: BTreeSet<PredicateCapability>,
    pub scalar_functions: BTreeSet<ScalarFunctionCapability>,
    pub aggregate_functions: BTreeSet<AggregateFunctionCapability>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every known capability.
    pub fn all() -> Self {
        Self::new()
            .with_main(MainCapability::ALL)
            .with_literals(LiteralCapability::ALL)
            .with_predicates(PredicateCapability::ALL)
            .with_scalar_functions(ScalarFunction::ALL)
            .with_aggregate_functions(AggregateFunctionCapability::ALL)
    }

    pub fn with_main(mut self, caps: &[MainCapability]) -> Self {
        self.main.extend(caps.iter().copied());
        self
    }

    pub fn with_literals(mut self, caps: &[LiteralCapability]) -> Self {
        self.literals.extend(caps.iter().copied());
        self
    }

    pub fn with_predicates(mut self, caps: &[PredicateCapability]) -> Self {
        self.predicates.extend(caps.iter().copied());
        self
    }

    pub fn with_scalar_functions(mut self, caps: &[ScalarFunctionCapability]) -> Self {
        self.scalar_functions.extend(caps.iter().copied());
        self
    }

    pub fn with_aggregate_functions(mut self, caps: &[AggregateFunctionCapability]) -> Self {
        self.aggregate_functions.extend(caps.iter().copied());
        self
    }

    pub fn without_scalar_functions(mut self, caps: &[ScalarFunctionCapability]) -> Self {
        for cap in caps {
            self.scalar_functions.remove(cap);
        }
        self
    }

    pub fn without_aggregate_functions(mut self, caps: &[AggregateFunctionCapability]) -> Self {
        for cap in caps {
            self.aggregate_functions.remove(cap);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty()
            && self.literals.is_empty()
            && self.predicates.is_empty()
            && self.scalar_functions.is_empty()
            && self.aggregate_functions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.main.len()
            + self.literals.len()
            + self.predicates.len()
            + self.scalar_functions.len()
            + self.aggregate_functions.len()
    }

    /// `self` without everything in `excluded`.
    pub fn subtract(&self, excluded: &Capabilities) -> Capabilities {
        Capabilities {
            main: self.main.difference(&excluded.main).copied().collect(),
            literals: self.literals.difference(&excluded.literals).copied().collect(),
            predicates: self.predicates.difference(&excluded.predicates).copied().collect(),
            scalar_functions: self
                .scalar_functions
                .difference(&excluded.scalar_functions)
                .copied()
                .collect(),
            aggregate_functions: self
                .aggregate_functions
                .difference(&excluded.aggregate_functions)
                .copied()
                .collect(),
        }
    }

    /// Prefixed names in the form used by EXCLUDED_CAPABILITIES.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.main.iter().map(|c| c.to_string()).collect();
        names.extend(self.literals.iter().map(|c| format!("{}{}", LITERAL_PREFIX, c)));
        names.extend(self.predicates.iter().map(|c| format!("{}{}", PREDICATE_PREFIX, c)));
        names.extend(
            self.scalar_functions
                .iter()
                .map(|c| format!("{}{}", SCALAR_FUNCTION_PREFIX, c)),
        );
        names.extend(
            self.aggregate_functions
                .iter()
                .map(|c| format!("{}{}", AGGREGATE_FUNCTION_PREFIX, c)),
        );
        names
    }
}

/// Parses EXCLUDED_CAPABILITIES entries. Prefixes are checked from the most
/// specific to the least: `LITERAL_`, `FN_AGG_`, `FN_PRED_`, `FN_`; anything
/// else names a main capability.
pub fn parse_excluded_capabilities<S: AsRef<str>>(
    entries: &[S],
) -> Result<Capabilities, ConfigurationError> {
    let mut excluded = Capabilities::new();
    for entry in entries {
        let entry = entry.as_ref().trim();
        let parsed = if let Some(name) = entry.strip_prefix(LITERAL_PREFIX) {
            name.parse::<LiteralCapability>().map(|c| {
                excluded.literals.insert(c);
            })
        } else if let Some(name) = entry.strip_prefix(AGGREGATE_FUNCTION_PREFIX) {
            name.parse::<AggregateFunctionCapability>().map(|c| {
                excluded.aggregate_functions.insert(c);
            })
        } else if let Some(name) = entry.strip_prefix(PREDICATE_PREFIX) {
            name.parse::<PredicateCapability>().map(|c| {
                excluded.predicates.insert(c);
            })
        } else if let Some(name) = entry.strip_prefix(SCALAR_FUNCTION_PREFIX) {
            name.parse::<ScalarFunctionCapability>().map(|c| {
                excluded.scalar_functions.insert(c);
            })
        } else {
            entry.parse::<MainCapability>().map(|c| {
                excluded.main.insert(c);
            })
        };

        if parsed.is_err() {
            return Err(ConfigurationError::UnknownCapability {
                name: entry.to_string(),
                suggestion: ferry_error::find_closest_match(entry, &Capabilities::all().names()),
            });
        }
    }
    Ok(excluded)
}
