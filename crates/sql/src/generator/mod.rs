//! Tree → dialect SQL text.
//!
//! `SqlGenerator::render` is a recursive descent over `SqlNode`, one call per
//! node. Parenthesization is deliberately liberal (`NOT (x)`, `(a AND b)`,
//! `(a + b)`) and is never simplified.

pub mod error;
mod expr;
mod select;

pub use self::error::GenerationError;

use crate::ast::SqlNode;
use crate::dialect::{NullSorting, NullSortingPolicy, SqlDialect, SqlGenerationContext};
use ferry_error::FerryError;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 256;

pub struct SqlGenerator<'a> {
    pub(crate) dialect: &'a dyn SqlDialect,
    pub(crate) context: &'a SqlGenerationContext,
    pub(crate) null_sorting: NullSorting,
    max_depth: usize,
    recursion_level: AtomicUsize,
}

impl<'a> SqlGenerator<'a> {
    /// Fails when the dialect aliases a function that has its own node type.
    pub fn new(
        dialect: &'a dyn SqlDialect,
        context: &'a SqlGenerationContext,
    ) -> Result<Self, GenerationError> {
        dialect.function_aliases().validate()?;

        let null_sorting = match dialect.default_null_sorting() {
            NullSortingPolicy::Fixed(sorting) => sorting,
            NullSortingPolicy::FromRemote => context
                .adapter_notes
                .as_ref()
                .map(|notes| notes.null_sorting())
                .unwrap_or(NullSorting::AtEnd),
        };

        Ok(Self {
            dialect,
            context,
            null_sorting,
            max_depth: DEFAULT_MAX_RECURSION_DEPTH,
            recursion_level: AtomicUsize::new(0),
        })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn null_sorting(&self) -> NullSorting {
        self.null_sorting
    }

    /// Renders a whole statement, logging the result.
    pub fn generate(&self, node: &SqlNode) -> Result<String, FerryError> {
        tracing::debug!(target: "sql_generator", dialect = %self.dialect.name(), "Generating SQL");
        self.render(node)
            .map(|sql| {
                tracing::debug!(target: "sql_generator", sql = %sql, "Generated SQL");
                sql
            })
            .map_err(|e| e.to_ferry_error(self.dialect.name()))
    }

    pub fn render(&self, node: &SqlNode) -> Result<String, GenerationError> {
        let _guard = RecursionGuard::new(&self.recursion_level, self.max_depth)?;

        match node {
            SqlNode::Select(select) => self.render_select(select),
            SqlNode::SelectList(list) => self.render_select_list(list),
            SqlNode::Column(column) => Ok(self.render_column(column)),
            SqlNode::Table(table) => Ok(self.render_table(table)),
            SqlNode::Join(join) => self.render_join(join),

            SqlNode::And(operands) => self.render_junction("AND", operands),
            SqlNode::Or(operands) => self.render_junction("OR", operands),
            SqlNode::Not(inner) => Ok(format!("NOT ({})", self.render(inner)?)),
            SqlNode::Comparison(cmp) => Ok(format!(
                "{} {} {}",
                self.render(&cmp.left)?,
                cmp.operator.symbol(),
                self.render(&cmp.right)?
            )),
            SqlNode::Between(between) => Ok(format!(
                "{} BETWEEN {} AND {}",
                self.render(&between.expression)?,
                self.render(&between.lower)?,
                self.render(&between.upper)?
            )),
            SqlNode::Like(like) => self.render_like(like),
            SqlNode::LikeRegexp(like) => Ok(format!(
                "{} REGEXP_LIKE {}",
                self.render(&like.left)?,
                self.render(&like.pattern)?
            )),
            SqlNode::InList(in_list) => self.render_in_list(in_list),
            SqlNode::IsNull(inner) => Ok(format!("{} IS NULL", self.render(inner)?)),
            SqlNode::IsNotNull(inner) => Ok(format!("{} IS NOT NULL", self.render(inner)?)),
            SqlNode::IsJson(is_json) => self.render_is_json(is_json, false),
            SqlNode::IsNotJson(is_json) => self.render_is_json(is_json, true),

            SqlNode::ScalarFunction(call) => self.render_scalar_function(call),
            SqlNode::Cast(cast) => self.render_cast(cast),
            SqlNode::Extract(extract) => Ok(format!(
                "EXTRACT({} FROM {})",
                extract.field,
                self.render(&extract.expression)?
            )),
            SqlNode::Case(case) => self.render_case(case),
            SqlNode::JsonValue(json) => self.render_json_value(json),

            SqlNode::AggregateFunction(call) => self.render_aggregate_function(call),
            SqlNode::Listagg(listagg) => self.render_listagg(listagg),
            SqlNode::GroupConcat(group_concat) => self.render_group_concat(group_concat),

            SqlNode::Literal(literal) => self.render_literal(literal),

            SqlNode::OrderBy(order_by) => self.render_order_by(order_by),
            SqlNode::GroupBy(group_by) => self.render_group_by(group_by),
            SqlNode::Limit(limit) => Ok(self.dialect.limit_clause(limit)),
        }
    }

    pub(crate) fn render_all(&self, nodes: &[SqlNode]) -> Result<Vec<String>, GenerationError> {
        nodes.iter().map(|n| self.render(n)).collect()
    }
}

struct RecursionGuard<'g> {
    level: &'g AtomicUsize,
}

impl<'g> RecursionGuard<'g> {
    fn new(level: &'g AtomicUsize, max_depth: usize) -> Result<Self, GenerationError> {
        let current = level.fetch_add(1, Ordering::SeqCst);
        if current >= max_depth {
            level.fetch_sub(1, Ordering::SeqCst);
            return Err(GenerationError::MaxRecursion(max_depth));
        }
        Ok(Self { level })
    }
}

impl Drop for RecursionGuard<'_> {
    fn drop(&mut self) {
        self.level.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ComparisonOperator, Literal};
    use crate::dialect::{FunctionAliases, GenericDialect};
    use crate::metadata::SchemaAdapterNotes;

    #[test]
    fn test_recursion_limit() {
        let dialect = GenericDialect::new();
        let ctx = SqlGenerationContext::default();
        let generator = SqlGenerator::new(&dialect, &ctx).unwrap().with_max_depth(3);

        let shallow = SqlNode::not(SqlNode::not(SqlNode::bool(true)));
        assert_eq!(generator.render(&shallow).unwrap(), "NOT (NOT (true))");

        let deep = SqlNode::not(shallow);
        assert_eq!(
            generator.render(&deep),
            Err(GenerationError::MaxRecursion(3))
        );
        // The counter is restored after a failure.
        assert!(generator.render(&SqlNode::bool(false)).is_ok());
    }

    #[test]
    fn test_default_depth_handles_deep_trees() {
        let dialect = GenericDialect::new();
        let ctx = SqlGenerationContext::default();
        let generator = SqlGenerator::new(&dialect, &ctx).unwrap();

        let mut node = SqlNode::bool(true);
        for _ in 0..DEFAULT_MAX_RECURSION_DEPTH + 10 {
            node = SqlNode::not(node);
        }
        assert_eq!(
            generator.render(&node),
            Err(GenerationError::MaxRecursion(DEFAULT_MAX_RECURSION_DEPTH))
        );
    }

    #[test]
    fn test_null_sorting_from_adapter_notes() {
        let dialect = GenericDialect::new();
        let ctx = SqlGenerationContext {
            adapter_notes: Some(SchemaAdapterNotes {
                nulls_sorted_low: true,
                ..SchemaAdapterNotes::default()
            }),
            ..SqlGenerationContext::default()
        };
        let generator = SqlGenerator::new(&dialect, &ctx).unwrap();
        assert_eq!(generator.null_sorting(), NullSorting::Low);

        let without_notes = SqlGenerationContext::default();
        let generator = SqlGenerator::new(&dialect, &without_notes).unwrap();
        assert_eq!(generator.null_sorting(), NullSorting::AtEnd);
    }

    struct BrokenDialect {
        aliases: FunctionAliases,
    }

    impl SqlDialect for BrokenDialect {
        fn name(&self) -> &str {
            "BROKEN"
        }
        fn capabilities(&self) -> crate::capabilities::Capabilities {
            crate::capabilities::Capabilities::new()
        }
        fn supports_catalogs(&self) -> bool {
            false
        }
        fn supports_schemas(&self) -> bool {
            false
        }
        fn default_null_sorting(&self) -> NullSortingPolicy {
            NullSortingPolicy::Fixed(NullSorting::AtEnd)
        }
        fn function_aliases(&self) -> &FunctionAliases {
            &self.aliases
        }
        fn import_strategy(&self) -> crate::rewriter::ImportStrategy {
            crate::rewriter::ImportStrategy::Direct
        }
    }

    #[test]
    fn test_non_simple_alias_fails_at_construction() {
        let dialect = BrokenDialect {
            aliases: FunctionAliases::new()
                .scalar(crate::ast::ScalarFunction::Extract, "DATE_PART"),
        };
        let ctx = SqlGenerationContext::default();
        assert!(matches!(
            SqlGenerator::new(&dialect, &ctx),
            Err(GenerationError::NonSimpleAlias { .. })
        ));
    }

    #[test]
    fn test_generate_maps_errors() {
        let dialect = GenericDialect::new();
        let ctx = SqlGenerationContext::default();
        let generator = SqlGenerator::new(&dialect, &ctx).unwrap();

        let node = SqlNode::compare(
            ComparisonOperator::Equal,
            SqlNode::column("T", "A"),
            SqlNode::Literal(Literal::Double(f64::NAN)),
        );
        let err = generator.generate(&node).unwrap_err();
        assert_eq!(err.code, ferry_error::ErrorCode::InvalidLiteral);
    }
}
