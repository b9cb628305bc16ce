//! In-memory remote source shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use ferry_sql::remote::{
    ConnectionInformation, ConnectionResolver, ConnectivityError, RemoteColumn, RemoteConnection,
    RemoteConnectionSource, RemoteDatabaseMetadata, RemoteTable,
};
use ferry_sql::types::RemoteTypeDescriptor;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct FakeConnection {
    pub result_columns: Vec<RemoteTypeDescriptor>,
    pub metadata: RemoteDatabaseMetadata,
    pub tables: Vec<RemoteTable>,
    pub columns: HashMap<String, Vec<RemoteColumn>>,
    pub prepared: Mutex<Vec<String>>,
}

impl FakeConnection {
    pub fn describing(result_columns: Vec<RemoteTypeDescriptor>) -> Self {
        Self {
            result_columns,
            ..Self::default()
        }
    }

    pub fn with_table(mut self, name: &str, columns: Vec<RemoteColumn>) -> Self {
        self.tables.push(RemoteTable {
            name: name.to_string(),
            table_type: "TABLE".to_string(),
            ..RemoteTable::default()
        });
        self.columns.insert(name.to_string(), columns);
        self
    }

    pub fn prepared_statements(&self) -> Vec<String> {
        self.prepared.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteConnection for FakeConnection {
    async fn prepare(&self, sql: &str) -> Result<Vec<RemoteTypeDescriptor>, ConnectivityError> {
        self.prepared.lock().unwrap().push(sql.to_string());
        Ok(self.result_columns.clone())
    }

    async fn metadata(&self) -> Result<RemoteDatabaseMetadata, ConnectivityError> {
        Ok(self.metadata.clone())
    }

    async fn tables(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        _name_pattern: &str,
        _table_types: &[&str],
    ) -> Result<Vec<RemoteTable>, ConnectivityError> {
        Ok(self.tables.clone())
    }

    async fn columns(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        table: &str,
        _column_pattern: &str,
    ) -> Result<Vec<RemoteColumn>, ConnectivityError> {
        Ok(self.columns.get(table).cloned().unwrap_or_default())
    }
}

/// Hands out the same connection for every request.
pub struct FixedSource(pub Arc<FakeConnection>);

#[async_trait]
impl RemoteConnectionSource for FixedSource {
    async fn connection(&self) -> Result<Arc<dyn RemoteConnection>, ConnectivityError> {
        Ok(self.0.clone())
    }
}

/// Knows a single connection object named `C`.
pub struct FakeResolver;

#[async_trait]
impl ConnectionResolver for FakeResolver {
    async fn resolve(&self, connection_name: &str) -> Result<ConnectionInformation, ConnectivityError> {
        if connection_name == "C" {
            Ok(ConnectionInformation::new("jdbc:fake://remote:1234/db", "scott", "tiger"))
        } else {
            Err(ConnectivityError::UnknownConnection(connection_name.to_string()))
        }
    }
}
