//! Lazily opened, cached remote connection.

use async_trait::async_trait;
use ferry_sql::remote::{
    ConnectionResolver, ConnectivityError, RemoteConnection, RemoteConnectionFactory,
    RemoteConnectionSource,
};
use std::sync::Arc;
use tokio::sync::Mutex;

struct CachedConnection {
    connection_name: String,
    connection: Arc<dyn RemoteConnection>,
}

/// Holds at most one open connection per adapter instance.
///
/// The connection is opened on first use and reused until the adapter is
/// dropped, [`ConnectionCache::clear`] is called, or a different connection
/// name is requested.
pub struct ConnectionCache {
    resolver: Arc<dyn ConnectionResolver>,
    factory: Arc<dyn RemoteConnectionFactory>,
    cached: Mutex<Option<CachedConnection>>,
}

impl ConnectionCache {
    pub fn new(
        resolver: Arc<dyn ConnectionResolver>,
        factory: Arc<dyn RemoteConnectionFactory>,
    ) -> Self {
        Self {
            resolver,
            factory,
            cached: Mutex::new(None),
        }
    }

    pub fn resolver(&self) -> &dyn ConnectionResolver {
        self.resolver.as_ref()
    }

    pub async fn get(
        &self,
        connection_name: &str,
    ) -> Result<Arc<dyn RemoteConnection>, ConnectivityError> {
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if entry.connection_name == connection_name {
                return Ok(entry.connection.clone());
            }
            tracing::debug!(
                target: "connection_cache",
                previous = %entry.connection_name,
                requested = %connection_name,
                "Connection name changed, reconnecting"
            );
        }

        let info = self.resolver.resolve(connection_name).await?;
        let connection = self.factory.connect(&info).await?;
        tracing::info!(
            target: "connection_cache",
            connection = %connection_name,
            address = %info.address,
            "Opened remote connection"
        );
        *cached = Some(CachedConnection {
            connection_name: connection_name.to_string(),
            connection: connection.clone(),
        });
        Ok(connection)
    }

    /// Drops the cached connection, if any.
    pub async fn clear(&self) {
        if self.cached.lock().await.take().is_some() {
            tracing::debug!(target: "connection_cache", "Closed cached remote connection");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.cached.lock().await.is_some()
    }

    /// A [`RemoteConnectionSource`] that opens `connection_name` through
    /// this cache only when asked.
    pub fn source<'a>(&'a self, connection_name: &'a str) -> CachedSource<'a> {
        CachedSource {
            cache: self,
            connection_name,
        }
    }
}

pub struct CachedSource<'a> {
    cache: &'a ConnectionCache,
    connection_name: &'a str,
}

#[async_trait]
impl RemoteConnectionSource for CachedSource<'_> {
    async fn connection(&self) -> Result<Arc<dyn RemoteConnection>, ConnectivityError> {
        self.cache.get(self.connection_name).await
    }
}
