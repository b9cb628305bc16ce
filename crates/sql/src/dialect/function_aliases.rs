//! Function aliases
//!
//! Declarative per-dialect renames of scalar and aggregate functions, plus
//! the operator forms used for arithmetic.

use crate::ast::{AggregateFunction, ScalarFunction};
use crate::generator::GenerationError;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct FunctionAliases {
    scalar: HashMap<ScalarFunction, &'static str>,
    aggregate: HashMap<AggregateFunction, &'static str>,
    binary_infix: HashMap<ScalarFunction, &'static str>,
    prefix: HashMap<ScalarFunction, &'static str>,
}

impl Default for FunctionAliases {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionAliases {
    /// Arithmetic rendered as operators: `+ - * /` and unary `-`.
    pub fn new() -> Self {
        Self::empty()
            .binary_infix(ScalarFunction::Add, "+")
            .binary_infix(ScalarFunction::Sub, "-")
            .binary_infix(ScalarFunction::Mult, "*")
            .binary_infix(ScalarFunction::FloatDiv, "/")
            .prefix(ScalarFunction::Neg, "-")
    }

    pub fn empty() -> Self {
        Self {
            scalar: HashMap::new(),
            aggregate: HashMap::new(),
            binary_infix: HashMap::new(),
            prefix: HashMap::new(),
        }
    }

    /// Render `function` as `alias(args)`.
    pub fn scalar(mut self, function: ScalarFunction, alias: &'static str) -> Self {
        self.scalar.insert(function, alias);
        self
    }

    pub fn aggregate(mut self, function: AggregateFunction, alias: &'static str) -> Self {
        self.aggregate.insert(function, alias);
        self
    }

    /// Render `function` as `(a op b)`.
    pub fn binary_infix(mut self, function: ScalarFunction, operator: &'static str) -> Self {
        self.binary_infix.insert(function, operator);
        self
    }

    /// Render `function` as `(op a)`.
    pub fn prefix(mut self, function: ScalarFunction, operator: &'static str) -> Self {
        self.prefix.insert(function, operator);
        self
    }

    pub fn scalar_alias(&self, function: ScalarFunction) -> Option<&'static str> {
        self.scalar.get(&function).copied()
    }

    pub fn aggregate_alias(&self, function: AggregateFunction) -> Option<&'static str> {
        self.aggregate.get(&function).copied()
    }

    pub fn binary_infix_operator(&self, function: ScalarFunction) -> Option<&'static str> {
        self.binary_infix.get(&function).copied()
    }

    pub fn prefix_operator(&self, function: ScalarFunction) -> Option<&'static str> {
        self.prefix.get(&function).copied()
    }

    /// Functions with dedicated nodes cannot be aliased.
    pub fn validate(&self) -> Result<(), GenerationError> {
        let scalar_keys = self
            .scalar
            .keys()
            .chain(self.binary_infix.keys())
            .chain(self.prefix.keys());
        if let Some(function) = scalar_keys.filter(|f| !f.is_simple()).min() {
            return Err(GenerationError::NonSimpleAlias {
                function: function.to_string(),
            });
        }
        if let Some(function) = self.aggregate.keys().filter(|f| !f.is_simple()).min() {
            return Err(GenerationError::NonSimpleAlias {
                function: function.to_string(),
            });
        }
        Ok(())
    }
}
