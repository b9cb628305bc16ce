//! Statement-level rendering: SELECT, FROM, joins, ordering, grouping.

use super::{GenerationError, SqlGenerator};
use crate::ast::{Column, GroupBy, Join, OrderBy, SelectList, SelectStatement, Table};
use crate::dialect::LimitPosition;

impl<'a> SqlGenerator<'a> {
    pub(crate) fn render_select(&self, select: &SelectStatement) -> Result<String, GenerationError> {
        let mut sql = String::from("SELECT ");

        let limit_position = self.dialect.limit_position();
        if let (LimitPosition::AfterSelect, Some(limit)) = (limit_position, &select.limit) {
            if limit.offset != 0 {
                return Err(GenerationError::InvalidNode(format!(
                    "{} cannot express a row offset",
                    self.dialect.name()
                )));
            }
            sql.push_str(&self.dialect.limit_clause(limit));
            sql.push(' ');
        }

        sql.push_str(&self.render_select_list(&select.select_list)?);
        sql.push_str(" FROM ");
        sql.push_str(&self.render(&select.from)?);

        if let Some(filter) = &select.filter {
            sql.push_str(" WHERE ");
            sql.push_str(&self.render(filter)?);
        }
        if let Some(group_by) = &select.group_by {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.render_group_by(group_by)?);
        }
        if let Some(having) = &select.having {
            sql.push_str(" HAVING ");
            sql.push_str(&self.render(having)?);
        }
        if let Some(order_by) = &select.order_by {
            sql.push(' ');
            sql.push_str(&self.render_order_by(order_by)?);
        }
        if let (LimitPosition::Trailing, Some(limit)) = (limit_position, &select.limit) {
            sql.push(' ');
            sql.push_str(&self.dialect.limit_clause(limit));
        }

        Ok(sql)
    }

    pub(crate) fn render_select_list(&self, list: &SelectList) -> Result<String, GenerationError> {
        match list {
            SelectList::Star => Ok("*".to_string()),
            SelectList::AnyValue => Ok(self.dialect.any_value_token().to_string()),
            SelectList::Expressions(expressions) if expressions.is_empty() => {
                Ok(self.dialect.any_value_token().to_string())
            }
            SelectList::Expressions(expressions) => Ok(self.render_all(expressions)?.join(", ")),
        }
    }

    pub(crate) fn render_column(&self, column: &Column) -> String {
        let qualifier = column.table_alias.as_deref().or(column.table_name.as_deref());
        match qualifier {
            Some(q) => format!(
                "{}.{}",
                self.dialect.apply_quote(q),
                self.dialect.apply_quote(&column.name)
            ),
            None => self.dialect.apply_quote(&column.name),
        }
    }

    pub(crate) fn render_table(&self, table: &Table) -> String {
        let mut sql = String::new();
        if self.dialect.requires_catalog_qualified_table_names(self.context) {
            if let Some(catalog) = &self.context.catalog_name {
                sql.push_str(&self.dialect.apply_quote(catalog));
                sql.push('.');
            }
        }
        if self.dialect.requires_schema_qualified_table_names(self.context) {
            if let Some(schema) = &self.context.schema_name {
                sql.push_str(&self.dialect.apply_quote(schema));
                sql.push('.');
            }
        }
        sql.push_str(&self.dialect.apply_quote(&table.name));
        if let Some(alias) = table.effective_alias() {
            sql.push(' ');
            sql.push_str(&self.dialect.apply_quote(alias));
        }
        sql
    }

    pub(crate) fn render_join(&self, join: &Join) -> Result<String, GenerationError> {
        Ok(format!(
            "{} {} JOIN {} ON {}",
            self.render(&join.left)?,
            join.join_type.as_str().replace('_', " "),
            self.render(&join.right)?,
            self.render(&join.condition)?
        ))
    }

    pub(crate) fn render_order_by(&self, order_by: &OrderBy) -> Result<String, GenerationError> {
        Ok(format!("ORDER BY {}", self.render_order_items(order_by)?))
    }

    /// Items only, shared with `WITHIN GROUP (ORDER BY ...)` and GROUP_CONCAT.
    pub(crate) fn render_order_items(&self, order_by: &OrderBy) -> Result<String, GenerationError> {
        if order_by.items.is_empty() {
            return Err(GenerationError::InvalidNode(
                "ORDER BY without sort keys".to_string(),
            ));
        }

        let mut items = Vec::with_capacity(order_by.items.len());
        for item in &order_by.items {
            let expression = self.render(&item.expression)?;
            let explicit = (item.nulls_last
                != self.null_sorting.nulls_last_by_default(item.ascending))
            .then_some(item.nulls_last);
            items.push(self.dialect.sort_key(&expression, item.ascending, explicit));
        }
        Ok(items.join(", "))
    }

    pub(crate) fn render_group_by(&self, group_by: &GroupBy) -> Result<String, GenerationError> {
        if group_by.expressions.is_empty() {
            return Err(GenerationError::InvalidNode(
                "GROUP BY without grouping expressions".to_string(),
            ));
        }
        Ok(self.render_all(&group_by.expressions)?.join(", "))
    }
}
