use ferry_error::{ErrorCode, ErrorContext, FerryError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Function {function} expects {expected} argument(s) but got {actual}")]
    FunctionArity {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("Function {function} cannot be aliased: it is rendered by a dedicated node")]
    NonSimpleAlias { function: String },

    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    #[error("Invalid node: {0}")]
    InvalidNode(String),

    #[error("Maximum recursion depth ({0}) exceeded")]
    MaxRecursion(usize),
}

impl GenerationError {
    pub fn to_ferry_error(self, dialect_name: &str) -> FerryError {
        match self {
            GenerationError::FunctionArity {
                function,
                expected,
                actual,
            } => FerryError::new(
                ErrorCode::FunctionArity,
                format!(
                    "Function {} expects {} argument(s) but got {}",
                    function, expected, actual
                ),
            )
            .with_context(ErrorContext::Function {
                function,
                dialect: dialect_name.to_string(),
                expected_args: Some(expected),
                actual_args: Some(actual),
            })
            .with_hint("The function is rendered as an operator for this dialect; check the pushed-down expression"),
            GenerationError::NonSimpleAlias { function } => FerryError::new(
                ErrorCode::NonSimpleFunctionAlias,
                format!(
                    "The dialect {} declares an alias for {}, which cannot be aliased",
                    dialect_name, function
                ),
            )
            .with_context(ErrorContext::Function {
                function,
                dialect: dialect_name.to_string(),
                expected_args: None,
                actual_args: None,
            })
            .with_hint("Remove the alias from the dialect; CAST, EXTRACT, CASE, JSON_VALUE, GROUP_CONCAT and LISTAGG have their own rendering"),
            GenerationError::InvalidLiteral(e) => {
                FerryError::new(ErrorCode::InvalidLiteral, format!("Invalid literal: {}", e))
                    .with_hint("The literal has no SQL representation in the target dialect")
            }
            GenerationError::InvalidNode(e) => {
                let mut data = std::collections::HashMap::new();
                data.insert(
                    "dialect".to_string(),
                    serde_json::Value::String(dialect_name.to_string()),
                );
                FerryError::new(ErrorCode::InvalidNode, format!("Invalid node: {}", e))
                    .with_context(ErrorContext::Generic { data })
                    .with_hint("The pushed-down tree is malformed or uses a construct the dialect does not declare")
            }
            GenerationError::MaxRecursion(depth) => FerryError::new(
                ErrorCode::MaxRecursion,
                format!("Maximum recursion depth ({}) exceeded", depth),
            )
            .with_hint("The pushed-down expression is nested too deeply; exclude the capability that produces it"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_context() {
        let err = GenerationError::FunctionArity {
            function: "ADD".to_string(),
            expected: 2,
            actual: 3,
        }
        .to_ferry_error("GENERIC");
        assert_eq!(err.code, ErrorCode::FunctionArity);
        match err.context {
            Some(ErrorContext::Function {
                expected_args,
                actual_args,
                ..
            }) => {
                assert_eq!(expected_args, Some(2));
                assert_eq!(actual_args, Some(3));
            }
            other => panic!("unexpected context {:?}", other),
        }
    }
}
