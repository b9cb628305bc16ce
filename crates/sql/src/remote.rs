//! Connectivity seams to the remote source.
//!
//! The adapter never talks to a driver directly. Credential lookup, opening
//! a connection and the describe/metadata calls are capabilities injected by
//! the embedding process.

use crate::types::RemoteTypeDescriptor;
use async_trait::async_trait;
use ferry_error::{ErrorCode, ErrorContext, FerryError};
use secrecy::SecretString;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Address and credentials of a named host connection object.
#[derive(Debug, Clone)]
pub struct ConnectionInformation {
    pub address: String,
    pub user: String,
    pub password: SecretString,
}

impl ConnectionInformation {
    pub fn new(address: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            user: user.into(),
            password: SecretString::from(password.into()),
        }
    }
}

pub const DESCRIBE_OPERATION: &str = "describe";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectivityError {
    #[error("Connection '{0}' is not defined")]
    UnknownConnection(String),

    #[error("Access to connection '{0}' was denied")]
    AccessDenied(String),

    #[error("Could not connect to the remote source: {0}")]
    ConnectFailed(String),

    #[error("Remote {operation} failed: {message}")]
    Remote { operation: String, message: String },
}

impl ConnectivityError {
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        ConnectivityError::Remote {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn to_ferry_error(self, connection_name: Option<&str>) -> FerryError {
        let (code, operation, hint) = match &self {
            ConnectivityError::UnknownConnection(_) => (
                ErrorCode::ConnectionNotFound,
                "resolve",
                "Create the connection object or fix CONNECTION_NAME",
            ),
            ConnectivityError::AccessDenied(_) => (
                ErrorCode::ConnectionNotFound,
                "resolve",
                "Grant ACCESS on the connection to the adapter's owner",
            ),
            ConnectivityError::ConnectFailed(_) => (
                ErrorCode::ConnectionFailed,
                "connect",
                "Check the connection address and that the remote source is reachable",
            ),
            ConnectivityError::Remote { operation, .. } if operation == DESCRIBE_OPERATION => (
                ErrorCode::DescribeFailed,
                DESCRIBE_OPERATION,
                "The remote source could not prepare the pushed-down statement",
            ),
            ConnectivityError::Remote { .. } => (
                ErrorCode::MetadataReadFailed,
                "metadata",
                "The remote source rejected the request; see the message for details",
            ),
        };
        let operation = match &self {
            ConnectivityError::Remote { operation, .. } => operation.clone(),
            _ => operation.to_string(),
        };
        FerryError::new(code, self.to_string())
            .with_context(ErrorContext::Remote {
                connection_name: connection_name.map(str::to_string),
                operation,
            })
            .with_hint(hint)
    }
}

/// Resolves a host connection object name into address and credentials.
#[async_trait]
pub trait ConnectionResolver: Send + Sync {
    async fn resolve(&self, connection_name: &str) -> Result<ConnectionInformation, ConnectivityError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemoteTable {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: String,
    pub table_type: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteColumn {
    pub name: String,
    pub descriptor: RemoteTypeDescriptor,
    pub nullable: bool,
    pub identity: bool,
    pub default_value: Option<String>,
    pub comment: Option<String>,
}

impl RemoteColumn {
    pub fn new(name: impl Into<String>, descriptor: RemoteTypeDescriptor) -> Self {
        Self {
            name: name.into(),
            descriptor,
            nullable: true,
            identity: false,
            default_value: None,
            comment: None,
        }
    }
}

/// Database-wide facts captured once when the virtual schema is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDatabaseMetadata {
    pub catalog_separator: String,
    pub identifier_quote_string: String,
    pub stores_lower_case_identifiers: bool,
    pub stores_upper_case_identifiers: bool,
    pub stores_mixed_case_identifiers: bool,
    pub supports_mixed_case_identifiers: bool,
    pub stores_lower_case_quoted_identifiers: bool,
    pub stores_upper_case_quoted_identifiers: bool,
    pub stores_mixed_case_quoted_identifiers: bool,
    pub supports_mixed_case_quoted_identifiers: bool,
    pub nulls_sorted_at_end: bool,
    pub nulls_sorted_at_start: bool,
    pub nulls_sorted_high: bool,
    pub nulls_sorted_low: bool,
}

impl Default for RemoteDatabaseMetadata {
    fn default() -> Self {
        Self {
            catalog_separator: ".".to_string(),
            identifier_quote_string: "\"".to_string(),
            stores_lower_case_identifiers: false,
            stores_upper_case_identifiers: true,
            stores_mixed_case_identifiers: false,
            supports_mixed_case_identifiers: false,
            stores_lower_case_quoted_identifiers: false,
            stores_upper_case_quoted_identifiers: false,
            stores_mixed_case_quoted_identifiers: true,
            supports_mixed_case_quoted_identifiers: true,
            nulls_sorted_at_end: false,
            nulls_sorted_at_start: false,
            nulls_sorted_high: true,
            nulls_sorted_low: false,
        }
    }
}

/// An open connection to the remote source.
#[async_trait]
pub trait RemoteConnection: Send + Sync {
    /// Prepares `sql` without executing it and describes its result columns.
    async fn prepare(&self, sql: &str) -> Result<Vec<RemoteTypeDescriptor>, ConnectivityError>;

    async fn metadata(&self) -> Result<RemoteDatabaseMetadata, ConnectivityError>;

    /// `name_pattern` uses SQL LIKE wildcards.
    async fn tables(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
        name_pattern: &str,
        table_types: &[&str],
    ) -> Result<Vec<RemoteTable>, ConnectivityError>;

    async fn columns(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
        column_pattern: &str,
    ) -> Result<Vec<RemoteColumn>, ConnectivityError>;
}

#[async_trait]
pub trait RemoteConnectionFactory: Send + Sync {
    async fn connect(
        &self,
        info: &ConnectionInformation,
    ) -> Result<Arc<dyn RemoteConnection>, ConnectivityError>;
}

/// Hands out the (possibly cached) connection for the current request.
#[async_trait]
pub trait RemoteConnectionSource: Send + Sync {
    async fn connection(&self) -> Result<Arc<dyn RemoteConnection>, ConnectivityError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_connection_information_hides_password() {
        let info = ConnectionInformation::new("jdbc:x://h", "u", "p4ss");
        assert_eq!(info.password.expose_secret(), "p4ss");
        assert!(!format!("{:?}", info).contains("p4ss"));
    }

    #[test]
    fn test_connectivity_error_context() {
        let err = ConnectivityError::remote("describe", "syntax error").to_ferry_error(Some("C"));
        assert_eq!(err.code, ErrorCode::DescribeFailed);
        match err.context {
            Some(ErrorContext::Remote {
                connection_name,
                operation,
            }) => {
                assert_eq!(connection_name.as_deref(), Some("C"));
                assert_eq!(operation, "describe");
            }
            other => panic!("unexpected context {:?}", other),
        }

        let err = ConnectivityError::remote("columns", "timeout").to_ferry_error(None);
        assert_eq!(err.code, ErrorCode::MetadataReadFailed);
    }
}
