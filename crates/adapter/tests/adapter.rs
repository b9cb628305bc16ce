use async_trait::async_trait;
use ferry_adapter::{AdapterOptions, PushdownRequest, VirtualSchemaAdapter};
use ferry_common::properties::{
    CONNECTION_NAME, EXCLUDED_CAPABILITIES, IMPORT_DATA_TYPES, LOG_LEVEL, TABLE_FILTER,
};
use ferry_common::AdapterProperties;
use ferry_error::ErrorCode;
use ferry_sql::ast::{SelectList, SelectStatement, SqlNode};
use ferry_sql::metadata::SchemaAdapterNotes;
use ferry_sql::remote::{
    ConnectionInformation, ConnectionResolver, ConnectivityError, RemoteColumn, RemoteConnection,
    RemoteConnectionFactory, RemoteDatabaseMetadata, RemoteTable,
};
use ferry_sql::types::{JdbcType, RemoteTypeDescriptor};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Warehouse;

#[async_trait]
impl RemoteConnection for Warehouse {
    async fn prepare(&self, _sql: &str) -> Result<Vec<RemoteTypeDescriptor>, ConnectivityError> {
        Ok(vec![RemoteTypeDescriptor::new(JdbcType::Integer, 0, 0)])
    }

    async fn metadata(&self) -> Result<RemoteDatabaseMetadata, ConnectivityError> {
        Ok(RemoteDatabaseMetadata {
            nulls_sorted_high: false,
            nulls_sorted_at_end: true,
            ..RemoteDatabaseMetadata::default()
        })
    }

    async fn tables(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        _name_pattern: &str,
        _table_types: &[&str],
    ) -> Result<Vec<RemoteTable>, ConnectivityError> {
        Ok(["ORDERS", "CUSTOMERS"]
            .into_iter()
            .map(|name| RemoteTable {
                name: name.to_string(),
                table_type: "TABLE".to_string(),
                ..RemoteTable::default()
            })
            .collect())
    }

    async fn columns(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        _table: &str,
        _column_pattern: &str,
    ) -> Result<Vec<RemoteColumn>, ConnectivityError> {
        Ok(vec![RemoteColumn::new(
            "ID",
            RemoteTypeDescriptor::new(JdbcType::BigInt, 19, 0),
        )])
    }
}

struct Resolver;

#[async_trait]
impl ConnectionResolver for Resolver {
    async fn resolve(&self, connection_name: &str) -> Result<ConnectionInformation, ConnectivityError> {
        match connection_name {
            "WAREHOUSE" | "OTHER" => Ok(ConnectionInformation::new(
                "jdbc:fake://warehouse/db",
                "loader",
                "secret",
            )),
            other => Err(ConnectivityError::UnknownConnection(other.to_string())),
        }
    }
}

#[derive(Default)]
struct CountingFactory {
    connects: AtomicUsize,
}

#[async_trait]
impl RemoteConnectionFactory for CountingFactory {
    async fn connect(
        &self,
        _info: &ConnectionInformation,
    ) -> Result<Arc<dyn RemoteConnection>, ConnectivityError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(Warehouse))
    }
}

fn adapter(dialect: &str) -> (VirtualSchemaAdapter, Arc<CountingFactory>) {
    let factory = Arc::new(CountingFactory::default());
    let adapter =
        VirtualSchemaAdapter::new(AdapterOptions::new(dialect, Arc::new(Resolver), factory.clone()))
            .unwrap();
    (adapter, factory)
}

fn props(pairs: &[(&str, &str)]) -> AdapterProperties {
    std::iter::once((CONNECTION_NAME, "WAREHOUSE"))
        .chain(pairs.iter().copied())
        .collect()
}

#[tokio::test]
async fn test_create_and_refresh_reuse_the_connection() {
    let (adapter, factory) = adapter("oracle");
    assert_eq!(adapter.dialect_name(), "ORACLE");

    let schema = adapter.create_virtual_schema(&props(&[])).await.unwrap();
    let names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["ORDERS", "CUSTOMERS"]);
    assert!(schema.notes().unwrap().nulls_sorted_at_end);

    adapter.refresh(&props(&[])).await.unwrap();
    assert_eq!(factory.connects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_drop_clears_the_cached_connection() {
    let (adapter, factory) = adapter("GENERIC");
    adapter.create_virtual_schema(&props(&[])).await.unwrap();
    assert!(adapter.connections().is_connected().await);

    adapter.drop_virtual_schema().await;
    assert!(!adapter.connections().is_connected().await);

    adapter.refresh(&props(&[])).await.unwrap();
    assert_eq!(factory.connects.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_set_properties_merges_and_rereads() {
    let (adapter, factory) = adapter("GENERIC");
    let current = props(&[(TABLE_FILTER, "ORDERS")]);
    let schema = adapter.create_virtual_schema(&current).await.unwrap();
    assert_eq!(schema.tables.len(), 1);

    let changes: BTreeMap<String, Option<String>> = [
        (TABLE_FILTER.to_string(), None),
        (CONNECTION_NAME.to_string(), Some("OTHER".to_string())),
    ]
    .into_iter()
    .collect();
    let (merged, schema) = adapter.set_properties(&current, &changes).await.unwrap();

    assert!(!merged.has(TABLE_FILTER));
    assert_eq!(merged.connection_name(), Some("OTHER"));
    assert_eq!(schema.tables.len(), 2);
    assert_eq!(factory.connects.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_log_level_follows_set_properties() {
    let (adapter, _) = adapter("GENERIC");
    let current = props(&[(LOG_LEVEL, "FINE")]);
    adapter.create_virtual_schema(&current).await.unwrap();
    assert!(tracing::enabled!(tracing::Level::DEBUG));

    let changes: BTreeMap<String, Option<String>> =
        [(LOG_LEVEL.to_string(), Some("WARNING".to_string()))]
            .into_iter()
            .collect();
    adapter.set_properties(&current, &changes).await.unwrap();
    assert!(!tracing::enabled!(tracing::Level::INFO));
    assert!(tracing::enabled!(tracing::Level::WARN));
}

#[tokio::test]
async fn test_validation_runs_before_remote_access() {
    let (adapter, factory) = adapter("GENERIC");

    let err = adapter
        .create_virtual_schema(&AdapterProperties::empty())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingProperty);
    assert!(err.hint.is_some());

    let err = adapter
        .create_virtual_schema(&props(&[(IMPORT_DATA_TYPES, "FROM_RESULT_SET")]))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::LegacyPropertyValue);

    assert_eq!(factory.connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_connection_is_reported() {
    let (adapter, _) = adapter("GENERIC");
    let mut properties: BTreeMap<String, String> = BTreeMap::new();
    properties.insert(CONNECTION_NAME.to_string(), "NOWHERE".to_string());

    let err = adapter
        .create_virtual_schema(&AdapterProperties::new(properties))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ConnectionNotFound);
}

#[test]
fn test_capabilities_exclude_configured_names() {
    let (adapter, _) = adapter("GENERIC");

    let all = adapter.get_capabilities(&props(&[])).unwrap().names();
    assert!(all.contains(&"LIMIT".to_string()));
    assert!(all.contains(&"FN_PRED_LIKE".to_string()));

    let reduced = adapter
        .get_capabilities(&props(&[(EXCLUDED_CAPABILITIES, "LIMIT, FN_PRED_LIKE")]))
        .unwrap()
        .names();
    assert!(!reduced.contains(&"LIMIT".to_string()));
    assert!(!reduced.contains(&"FN_PRED_LIKE".to_string()));
    assert_eq!(reduced.len(), all.len() - 2);

    let err = adapter
        .get_capabilities(&props(&[(EXCLUDED_CAPABILITIES, "TELEPORT")]))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnknownCapability);
}

#[test]
fn test_unknown_dialect_is_rejected() {
    let factory = Arc::new(CountingFactory::default());
    let err = VirtualSchemaAdapter::new(AdapterOptions::new("COBOL", Arc::new(Resolver), factory))
        .err()
        .unwrap();
    assert_eq!(err.code, ErrorCode::UnknownDialect);
}

fn select_id_from_orders() -> SqlNode {
    SqlNode::select(SelectStatement::new(
        SelectList::Expressions(vec![SqlNode::column("ORDERS", "ID")]),
        SqlNode::table("ORDERS"),
    ))
}

#[tokio::test]
async fn test_pushdown_describes_result_columns() {
    let (adapter, factory) = adapter("ORACLE");
    let request = PushdownRequest::new(select_id_from_orders(), props(&[]));

    let sql = adapter.pushdown(&request).await.unwrap();
    assert_eq!(
        sql,
        "IMPORT INTO (c1 DECIMAL(18, 0)) FROM JDBC AT WAREHOUSE \
         STATEMENT 'SELECT \"ORDERS\".\"ID\" FROM \"ORDERS\"'"
    );
    assert_eq!(factory.connects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_pushdown_with_adapter_notes() {
    let (adapter, _) = adapter("GENERIC");
    let notes = SchemaAdapterNotes {
        nulls_sorted_at_end: true,
        ..SchemaAdapterNotes::default()
    };
    let request = PushdownRequest::new(select_id_from_orders(), props(&[]))
        .with_adapter_notes(notes.to_json().unwrap())
        .with_select_list_data_types(vec![ferry_sql::DataType::Double]);

    let sql = adapter.pushdown(&request).await.unwrap();
    assert!(sql.starts_with("IMPORT INTO (c1 DOUBLE) FROM JDBC AT WAREHOUSE"), "{}", sql);

    let broken = PushdownRequest::new(select_id_from_orders(), props(&[]))
        .with_adapter_notes("{not json");
    let err = adapter.pushdown(&broken).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::SerializationFailed);
}
