//! Expression rendering: predicates, functions and literals.

use super::{GenerationError, SqlGenerator};
use crate::ast::{
    AggregateFunction, AggregateFunctionCall, Case, Cast, GroupConcat, InList, IsJson,
    JsonBehavior, JsonValue, Like, Listagg, ListaggOverflow, Literal, ScalarFunctionCall, SqlNode,
};
use crate::types::DataType;

impl<'a> SqlGenerator<'a> {
    pub(crate) fn render_junction(
        &self,
        keyword: &str,
        operands: &[SqlNode],
    ) -> Result<String, GenerationError> {
        if operands.is_empty() {
            return Err(GenerationError::InvalidNode(format!("{} without operands", keyword)));
        }
        let separator = format!(" {} ", keyword);
        Ok(format!("({})", self.render_all(operands)?.join(&separator)))
    }

    pub(crate) fn render_like(&self, like: &Like) -> Result<String, GenerationError> {
        let mut sql = format!(
            "{} LIKE {}",
            self.render(&like.left)?,
            self.render(&like.pattern)?
        );
        if let Some(escape) = &like.escape {
            sql.push_str(" ESCAPE ");
            sql.push_str(&self.render(escape)?);
        }
        Ok(sql)
    }

    pub(crate) fn render_in_list(&self, in_list: &InList) -> Result<String, GenerationError> {
        if in_list.arguments.is_empty() {
            return Err(GenerationError::InvalidNode("IN with an empty list".to_string()));
        }
        Ok(format!(
            "{} IN ({})",
            self.render(&in_list.expression)?,
            self.render_all(&in_list.arguments)?.join(", ")
        ))
    }

    pub(crate) fn render_is_json(&self, is_json: &IsJson, negated: bool) -> Result<String, GenerationError> {
        let uniqueness = is_json.key_uniqueness.as_str().replacen(" KEYS", "", 1);
        Ok(format!(
            "{} IS {}JSON {} {}",
            self.render(&is_json.expression)?,
            if negated { "NOT " } else { "" },
            is_json.type_constraint,
            uniqueness
        ))
    }

    pub(crate) fn render_scalar_function(
        &self,
        call: &ScalarFunctionCall,
    ) -> Result<String, GenerationError> {
        let function = call.function;
        if !function.is_simple() {
            return Err(GenerationError::InvalidNode(format!(
                "{} must be expressed by its own node",
                function
            )));
        }

        let aliases = self.dialect.function_aliases();
        let arguments = self.render_all(&call.arguments)?;

        if let Some(alias) = aliases.scalar_alias(function) {
            return Ok(format!("{}({})", alias, arguments.join(", ")));
        }
        if let Some(operator) = aliases.binary_infix_operator(function) {
            return match arguments.as_slice() {
                [left, right] => Ok(format!("({} {} {})", left, operator, right)),
                _ => Err(GenerationError::FunctionArity {
                    function: function.to_string(),
                    expected: 2,
                    actual: arguments.len(),
                }),
            };
        }
        if let Some(operator) = aliases.prefix_operator(function) {
            return match arguments.as_slice() {
                [operand] => Ok(format!("({}{})", operator, operand)),
                _ => Err(GenerationError::FunctionArity {
                    function: function.to_string(),
                    expected: 1,
                    actual: arguments.len(),
                }),
            };
        }
        if arguments.is_empty() && self.dialect.omits_parentheses(function) {
            return Ok(function.to_string());
        }
        Ok(format!("{}({})", function, arguments.join(", ")))
    }

    pub(crate) fn render_cast(&self, cast: &Cast) -> Result<String, GenerationError> {
        Ok(format!(
            "CAST({} AS {})",
            self.render(&cast.expression)?,
            self.render_data_type(&cast.data_type)?
        ))
    }

    fn render_data_type(&self, data_type: &DataType) -> Result<String, GenerationError> {
        if !data_type.is_supported() {
            return Err(GenerationError::InvalidNode(
                "conversion to an unsupported data type".to_string(),
            ));
        }
        Ok(data_type.to_string())
    }

    pub(crate) fn render_case(&self, case: &Case) -> Result<String, GenerationError> {
        let has_else = match case.results.len().checked_sub(case.arguments.len()) {
            Some(0) => false,
            Some(1) => true,
            _ => {
                return Err(GenerationError::InvalidNode(format!(
                    "CASE with {} condition(s) and {} result(s)",
                    case.arguments.len(),
                    case.results.len()
                )))
            }
        };
        if case.arguments.is_empty() {
            return Err(GenerationError::InvalidNode("CASE without WHEN branches".to_string()));
        }

        let mut sql = String::from("CASE");
        if let Some(basis) = &case.basis {
            sql.push(' ');
            sql.push_str(&self.render(basis)?);
        }
        for (condition, result) in case.arguments.iter().zip(&case.results) {
            sql.push_str(" WHEN ");
            sql.push_str(&self.render(condition)?);
            sql.push_str(" THEN ");
            sql.push_str(&self.render(result)?);
        }
        if has_else {
            if let Some(otherwise) = case.results.last() {
                sql.push_str(" ELSE ");
                sql.push_str(&self.render(otherwise)?);
            }
        }
        sql.push_str(" END");
        Ok(sql)
    }

    pub(crate) fn render_json_value(&self, json: &JsonValue) -> Result<String, GenerationError> {
        let [document, path] = json.arguments.as_slice() else {
            return Err(GenerationError::FunctionArity {
                function: "JSON_VALUE".to_string(),
                expected: 2,
                actual: json.arguments.len(),
            });
        };
        Ok(format!(
            "JSON_VALUE({}, {} RETURNING {} {} ON EMPTY {} ON ERROR)",
            self.render(document)?,
            self.render(path)?,
            self.render_data_type(&json.returning)?,
            self.render_json_behavior(&json.empty_behavior)?,
            self.render_json_behavior(&json.error_behavior)?
        ))
    }

    fn render_json_behavior(&self, behavior: &JsonBehavior) -> Result<String, GenerationError> {
        match behavior {
            JsonBehavior::Null => Ok("NULL".to_string()),
            JsonBehavior::Error => Ok("ERROR".to_string()),
            JsonBehavior::Default(expression) => Ok(format!("DEFAULT {}", self.render(expression)?)),
        }
    }

    pub(crate) fn render_aggregate_function(
        &self,
        call: &AggregateFunctionCall,
    ) -> Result<String, GenerationError> {
        let function = call.function;
        if !function.is_simple() {
            return Err(GenerationError::InvalidNode(format!(
                "{} must be expressed by its own node",
                function
            )));
        }

        let name = self
            .dialect
            .function_aliases()
            .aggregate_alias(function)
            .map(str::to_string)
            .unwrap_or_else(|| function.to_string());
        let distinct = if call.distinct { "DISTINCT " } else { "" };
        let arguments = self.render_all(&call.arguments)?;

        let body = match (function, arguments.len()) {
            (AggregateFunction::Count, 0) => "*".to_string(),
            (AggregateFunction::Count, n) if n > 1 && !call.distinct => {
                format!("({})", arguments.join(", "))
            }
            _ => arguments.join(", "),
        };
        Ok(format!("{}({}{})", name, distinct, body))
    }

    pub(crate) fn render_listagg(&self, listagg: &Listagg) -> Result<String, GenerationError> {
        let mut sql = String::from("LISTAGG(");
        if listagg.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.render(&listagg.argument)?);
        if let Some(separator) = &listagg.separator {
            sql.push_str(", ");
            sql.push_str(&self.dialect.string_literal(separator));
        }
        sql.push_str(" ON OVERFLOW ");
        match &listagg.overflow {
            ListaggOverflow::Error => sql.push_str("ERROR"),
            ListaggOverflow::Truncate { filler, with_count } => {
                sql.push_str("TRUNCATE");
                if let Some(filler) = filler {
                    sql.push(' ');
                    sql.push_str(&self.dialect.string_literal(filler));
                }
                sql.push_str(if *with_count { " WITH COUNT" } else { " WITHOUT COUNT" });
            }
        }
        sql.push(')');
        if let Some(order_by) = &listagg.order_by {
            sql.push_str(" WITHIN GROUP (ORDER BY ");
            sql.push_str(&self.render_order_items(order_by)?);
            sql.push(')');
        }
        Ok(sql)
    }

    pub(crate) fn render_group_concat(&self, group_concat: &GroupConcat) -> Result<String, GenerationError> {
        let mut sql = String::from("GROUP_CONCAT(");
        if group_concat.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.render(&group_concat.argument)?);
        if let Some(order_by) = &group_concat.order_by {
            sql.push(' ');
            sql.push_str(&self.render_order_by(order_by)?);
        }
        if let Some(separator) = &group_concat.separator {
            sql.push_str(" SEPARATOR ");
            sql.push_str(&self.dialect.string_literal(separator));
        }
        sql.push(')');
        Ok(sql)
    }

    pub(crate) fn render_literal(&self, literal: &Literal) -> Result<String, GenerationError> {
        match literal {
            Literal::Null => Ok("NULL".to_string()),
            Literal::Bool(value) => Ok(self.dialect.boolean_literal(*value).to_string()),
            Literal::String(value) => Ok(self.dialect.string_literal(value)),
            Literal::Double(value) => format_double(*value),
            Literal::ExactNumeric(value) => Ok(value.to_plain_string()),
            Literal::Date(value) => Ok(self.dialect.date_literal(value)),
            Literal::Timestamp(value) | Literal::TimestampUtc(value) => {
                Ok(self.dialect.timestamp_literal(value))
            }
            Literal::Interval { value, data_type } => match data_type {
                DataType::Interval {
                    kind,
                    precision,
                    fraction,
                } => Ok(self
                    .dialect
                    .interval_literal(value, *kind, *precision, *fraction)),
                other => Err(GenerationError::InvalidLiteral(format!(
                    "interval literal '{}' typed as {}",
                    value, other
                ))),
            },
        }
    }
}

/// Scientific notation with the shortest digits that round-trip, e.g. `1.5E0`.
pub(crate) fn format_double(value: f64) -> Result<String, GenerationError> {
    if !value.is_finite() {
        return Err(GenerationError::InvalidLiteral(format!(
            "{} has no SQL representation",
            value
        )));
    }
    Ok(format!("{:E}", value))
}

#[cfg(test)]
mod tests {
    use super::format_double;
    use crate::ast::*;
    use crate::dialect::{GenericDialect, MySqlDialect, SqlDialect, SqlGenerationContext, SqlServerDialect};
    use crate::generator::{GenerationError, SqlGenerator};
    use crate::types::{Charset, DataType};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn try_render_with(dialect: &dyn SqlDialect, node: &SqlNode) -> Result<String, GenerationError> {
        let ctx = SqlGenerationContext::default();
        SqlGenerator::new(dialect, &ctx).unwrap().render(node)
    }

    fn try_render(node: &SqlNode) -> Result<String, GenerationError> {
        try_render_with(&GenericDialect::new(), node)
    }

    fn render(node: &SqlNode) -> String {
        try_render(node).unwrap()
    }

    fn col(name: &str) -> SqlNode {
        SqlNode::column("T", name)
    }

    #[test]
    fn test_junctions_and_not() {
        let node = SqlNode::And(vec![
            SqlNode::bool(true),
            SqlNode::Or(vec![SqlNode::bool(false), SqlNode::not(SqlNode::bool(true))]),
            SqlNode::IsNull(Box::new(col("A"))),
        ]);
        assert_eq!(
            render(&node),
            "(true AND (false OR NOT (true)) AND \"T\".\"A\" IS NULL)"
        );
        assert_eq!(render(&SqlNode::not(SqlNode::not(SqlNode::bool(true)))), "NOT (NOT (true))");
        assert!(matches!(try_render(&SqlNode::Or(vec![])), Err(GenerationError::InvalidNode(_))));
    }

    #[test]
    fn test_predicates() {
        let like = SqlNode::Like(Box::new(Like {
            left: col("A"),
            pattern: SqlNode::string("a\\_%"),
            escape: Some(SqlNode::string("\\")),
        }));
        assert_eq!(render(&like), "\"T\".\"A\" LIKE 'a\\_%' ESCAPE '\\'");

        let regexp = SqlNode::LikeRegexp(Box::new(LikeRegexp {
            left: col("A"),
            pattern: SqlNode::string("^x"),
        }));
        assert_eq!(render(&regexp), "\"T\".\"A\" REGEXP_LIKE '^x'");

        let between = SqlNode::Between(Box::new(Between {
            expression: col("A"),
            lower: SqlNode::exact(BigDecimal::from(1)),
            upper: SqlNode::exact(BigDecimal::from(9)),
        }));
        assert_eq!(render(&between), "\"T\".\"A\" BETWEEN 1 AND 9");

        let in_list = SqlNode::InList(Box::new(InList {
            expression: col("A"),
            arguments: vec![SqlNode::string("x"), SqlNode::string("y")],
        }));
        assert_eq!(render(&in_list), "\"T\".\"A\" IN ('x', 'y')");

        let not_equal = SqlNode::compare(ComparisonOperator::NotEqual, col("A"), col("B"));
        assert_eq!(render(&not_equal), "\"T\".\"A\" <> \"T\".\"B\"");
    }

    #[test]
    fn test_is_json() {
        let node = SqlNode::IsNotJson(Box::new(IsJson {
            expression: col("DOC"),
            type_constraint: JsonTypeConstraint::Object,
            key_uniqueness: KeyUniqueness::WithUniqueKeys,
        }));
        assert_eq!(render(&node), "\"T\".\"DOC\" IS NOT JSON OBJECT WITH UNIQUE");

        let node = SqlNode::IsJson(Box::new(IsJson {
            expression: col("DOC"),
            type_constraint: JsonTypeConstraint::Value,
            key_uniqueness: KeyUniqueness::WithoutUniqueKeys,
        }));
        assert_eq!(render(&node), "\"T\".\"DOC\" IS JSON VALUE WITHOUT UNIQUE");
    }

    #[test]
    fn test_scalar_function_resolution() {
        let add = SqlNode::scalar(ScalarFunction::Add, vec![col("A"), col("B")]);
        assert_eq!(render(&add), "(\"T\".\"A\" + \"T\".\"B\")");

        let neg = SqlNode::scalar(ScalarFunction::Neg, vec![col("A")]);
        assert_eq!(render(&neg), "(-\"T\".\"A\")");

        let upper = SqlNode::scalar(ScalarFunction::Upper, vec![col("A")]);
        assert_eq!(render(&upper), "UPPER(\"T\".\"A\")");

        let today = SqlNode::scalar(ScalarFunction::CurrentDate, vec![]);
        assert_eq!(render(&today), "CURRENT_DATE");

        let guid = SqlNode::scalar(ScalarFunction::SysGuid, vec![]);
        assert_eq!(render(&guid), "SYS_GUID()");

        let md5 = SqlNode::scalar(ScalarFunction::HashMd5, vec![col("A")]);
        assert_eq!(
            try_render_with(&MySqlDialect::new(), &md5).unwrap(),
            "MD5(`T`.`A`)"
        );
    }

    #[test]
    fn test_operator_arity() {
        let add = SqlNode::scalar(ScalarFunction::Add, vec![col("A"), col("B"), col("C")]);
        assert_eq!(
            try_render(&add),
            Err(GenerationError::FunctionArity {
                function: "ADD".to_string(),
                expected: 2,
                actual: 3,
            })
        );
        let neg = SqlNode::scalar(ScalarFunction::Neg, vec![]);
        assert!(matches!(try_render(&neg), Err(GenerationError::FunctionArity { expected: 1, .. })));
    }

    #[test]
    fn test_non_simple_function_in_generic_node() {
        let cast = SqlNode::scalar(ScalarFunction::Cast, vec![col("A")]);
        assert!(matches!(try_render(&cast), Err(GenerationError::InvalidNode(_))));
        let listagg = SqlNode::aggregate(AggregateFunction::Listagg, vec![col("A")], false);
        assert!(matches!(try_render(&listagg), Err(GenerationError::InvalidNode(_))));
    }

    #[test]
    fn test_cast_extract() {
        let cast = SqlNode::Cast(Box::new(Cast {
            expression: col("A"),
            data_type: DataType::varchar(10, Charset::Utf8),
        }));
        assert_eq!(render(&cast), "CAST(\"T\".\"A\" AS VARCHAR(10) UTF8)");

        let unsupported = SqlNode::Cast(Box::new(Cast {
            expression: col("A"),
            data_type: DataType::Unsupported,
        }));
        assert!(try_render(&unsupported).is_err());

        let extract = SqlNode::Extract(Box::new(Extract {
            field: ExtractField::Month,
            expression: col("D"),
        }));
        assert_eq!(render(&extract), "EXTRACT(MONTH FROM \"T\".\"D\")");
    }

    #[test]
    fn test_case() {
        let with_else = SqlNode::Case(Box::new(Case {
            basis: Some(col("A")),
            arguments: vec![SqlNode::exact(BigDecimal::from(1)), SqlNode::exact(BigDecimal::from(2))],
            results: vec![SqlNode::string("a"), SqlNode::string("b"), SqlNode::string("c")],
        }));
        assert_eq!(
            render(&with_else),
            "CASE \"T\".\"A\" WHEN 1 THEN 'a' WHEN 2 THEN 'b' ELSE 'c' END"
        );

        let searched = SqlNode::Case(Box::new(Case {
            basis: None,
            arguments: vec![SqlNode::IsNull(Box::new(col("A")))],
            results: vec![SqlNode::string("none")],
        }));
        assert_eq!(render(&searched), "CASE WHEN \"T\".\"A\" IS NULL THEN 'none' END");

        let searched_with_else = SqlNode::Case(Box::new(Case {
            basis: None,
            arguments: vec![col("A")],
            results: vec![col("B"), col("C")],
        }));
        assert_eq!(
            render(&searched_with_else),
            "CASE WHEN \"T\".\"A\" THEN \"T\".\"B\" ELSE \"T\".\"C\" END"
        );

        let mismatched = SqlNode::Case(Box::new(Case {
            basis: None,
            arguments: vec![SqlNode::bool(true), SqlNode::bool(false)],
            results: vec![SqlNode::string("x")],
        }));
        assert!(matches!(try_render(&mismatched), Err(GenerationError::InvalidNode(_))));
    }

    #[test]
    fn test_json_value() {
        let node = SqlNode::JsonValue(Box::new(JsonValue {
            arguments: vec![col("DOC"), SqlNode::string("$.a")],
            returning: DataType::varchar(100, Charset::Utf8),
            empty_behavior: JsonBehavior::Default(SqlNode::string("none")),
            error_behavior: JsonBehavior::Null,
        }));
        assert_eq!(
            render(&node),
            "JSON_VALUE(\"T\".\"DOC\", '$.a' RETURNING VARCHAR(100) UTF8 DEFAULT 'none' ON EMPTY NULL ON ERROR)"
        );

        let missing_path = SqlNode::JsonValue(Box::new(JsonValue {
            arguments: vec![col("DOC")],
            returning: DataType::Double,
            empty_behavior: JsonBehavior::Error,
            error_behavior: JsonBehavior::Error,
        }));
        assert!(matches!(
            try_render(&missing_path),
            Err(GenerationError::FunctionArity { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_aggregates() {
        let count_star = SqlNode::aggregate(AggregateFunction::Count, vec![], false);
        assert_eq!(render(&count_star), "COUNT(*)");

        let count_tuple = SqlNode::aggregate(AggregateFunction::Count, vec![col("A"), col("B")], false);
        assert_eq!(render(&count_tuple), "COUNT((\"T\".\"A\", \"T\".\"B\"))");

        let count_distinct = SqlNode::aggregate(AggregateFunction::Count, vec![col("A"), col("B")], true);
        assert_eq!(render(&count_distinct), "COUNT(DISTINCT \"T\".\"A\", \"T\".\"B\")");

        let sum = SqlNode::aggregate(AggregateFunction::Sum, vec![col("A")], true);
        assert_eq!(render(&sum), "SUM(DISTINCT \"T\".\"A\")");

        let stdev = SqlNode::aggregate(AggregateFunction::StddevPop, vec![col("A")], false);
        assert_eq!(
            try_render_with(&SqlServerDialect::new(), &stdev).unwrap(),
            "STDEVP([T].[A])"
        );
    }

    #[test]
    fn test_listagg() {
        let node = SqlNode::Listagg(Box::new(Listagg {
            argument: col("A"),
            distinct: true,
            separator: Some(", ".to_string()),
            overflow: ListaggOverflow::Truncate {
                filler: Some("...".to_string()),
                with_count: false,
            },
            order_by: Some(OrderBy {
                items: vec![OrderByItem {
                    expression: col("A"),
                    ascending: false,
                    nulls_last: false,
                }],
            }),
        }));
        assert_eq!(
            render(&node),
            "LISTAGG(DISTINCT \"T\".\"A\", ', ' ON OVERFLOW TRUNCATE '...' WITHOUT COUNT) \
             WITHIN GROUP (ORDER BY \"T\".\"A\" DESC NULLS FIRST)"
        );

        let plain = SqlNode::Listagg(Box::new(Listagg {
            argument: col("A"),
            distinct: false,
            separator: None,
            overflow: ListaggOverflow::Error,
            order_by: None,
        }));
        assert_eq!(render(&plain), "LISTAGG(\"T\".\"A\" ON OVERFLOW ERROR)");
    }

    #[test]
    fn test_group_concat() {
        let node = SqlNode::GroupConcat(Box::new(GroupConcat {
            argument: col("A"),
            distinct: true,
            order_by: Some(OrderBy {
                items: vec![OrderByItem {
                    expression: col("A"),
                    ascending: true,
                    nulls_last: true,
                }],
            }),
            separator: Some(";".to_string()),
        }));
        assert_eq!(
            try_render_with(&MySqlDialect::new(), &node).unwrap(),
            "GROUP_CONCAT(DISTINCT `T`.`A` ORDER BY \
             CASE WHEN `T`.`A` IS NULL THEN 1 ELSE 0 END, `T`.`A` SEPARATOR ';')"
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(render(&SqlNode::Literal(Literal::Null)), "NULL");
        assert_eq!(render(&SqlNode::string("it's")), "'it''s'");
        assert_eq!(render(&SqlNode::double(1.5)), "1.5E0");
        assert_eq!(render(&SqlNode::double(0.1)), "1E-1");
        assert_eq!(
            render(&SqlNode::exact(BigDecimal::from_str("1E+3").unwrap())),
            "1000"
        );
        assert_eq!(
            render(&SqlNode::exact(BigDecimal::from_str("-0.000012").unwrap())),
            "-0.000012"
        );
        assert_eq!(render(&SqlNode::Literal(Literal::Date("2024-01-31".into()))), "DATE '2024-01-31'");
        assert_eq!(
            render(&SqlNode::Literal(Literal::TimestampUtc("2024-01-31 10:00:00".into()))),
            "TIMESTAMP '2024-01-31 10:00:00'"
        );
        assert_eq!(
            try_render_with(
                &SqlServerDialect::new(),
                &SqlNode::Literal(Literal::Date("2024-01-31".into()))
            )
            .unwrap(),
            "CAST('2024-01-31' AS DATE)"
        );
    }

    #[test]
    fn test_interval_literals() {
        let ym = SqlNode::Literal(Literal::Interval {
            value: "5-3".to_string(),
            data_type: DataType::interval_year_to_month(3),
        });
        assert_eq!(render(&ym), "INTERVAL '5-3' YEAR (3) TO MONTH");

        let ds = SqlNode::Literal(Literal::Interval {
            value: "2 12:50:10.123".to_string(),
            data_type: DataType::interval_day_to_second(4, 3),
        });
        assert_eq!(render(&ds), "INTERVAL '2 12:50:10.123' DAY (4) TO SECOND (3)");

        let untyped = SqlNode::Literal(Literal::Interval {
            value: "1".to_string(),
            data_type: DataType::Double,
        });
        assert!(matches!(try_render(&untyped), Err(GenerationError::InvalidLiteral(_))));
    }

    #[test]
    fn test_non_finite_doubles() {
        assert!(format_double(f64::INFINITY).is_err());
        assert!(format_double(f64::NAN).is_err());
        assert_eq!(format_double(-2.0).unwrap(), "-2E0");
    }
}
