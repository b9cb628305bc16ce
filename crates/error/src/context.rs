//! # Error Contexts
//!
//! Structured metadata attached to errors for programmatic analysis.

use serde::{Deserialize, Serialize};

/// Structured context for errors.
///
/// Each variant provides the fields relevant to one family of error codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorContext {
    /// Context for FERRY-3001..3005 (property errors)
    Property {
        key: String,
        value: Option<String>,
        dialect: Option<String>,
    },

    /// Context for FERRY-3006 (UnknownDialect)
    Dialect {
        requested: String,
        available: Vec<String>,
    },

    /// Context for FERRY-2001/2002 (function errors)
    Function {
        function: String,
        dialect: String,
        expected_args: Option<usize>,
        actual_args: Option<usize>,
    },

    /// Context for FERRY-2007 (TableCountExceeded)
    TableCount { limit: usize, accepted: usize },

    /// Context for FERRY-2006 (UnsupportedResultType)
    ResultColumn {
        position: usize,
        remote_type: String,
    },

    /// Context for FERRY-1xxx (connectivity errors)
    Remote {
        connection_name: Option<String>,
        operation: String,
    },

    /// Generic key-value context for extensibility
    Generic {
        #[serde(flatten)]
        data: std::collections::HashMap<String, serde_json::Value>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_count_context_serde_roundtrip() {
        let ctx = ErrorContext::TableCount {
            limit: 10,
            accepted: 11,
        };

        let json = serde_json::to_string(&ctx).unwrap();
        assert!(json.contains("\"type\":\"table_count\""));
        let de: ErrorContext = serde_json::from_str(&json).unwrap();

        match de {
            ErrorContext::TableCount { limit, accepted } => {
                assert_eq!(limit, 10);
                assert_eq!(accepted, 11);
            }
            _ => panic!("Wrong variant"),
        }
    }
}
