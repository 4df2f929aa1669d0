//! Redis-backed cache backend
//!
//! Each cache key maps to one Redis string holding the serialized entry. The
//! multiplexed connection is shared by all callers and re-established after
//! the server drops it.

use super::{CacheBackend, CacheError};
use crate::config::RedisConfig;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, ConnectionInfo, IntoConnectionInfo, RedisError};
use std::time::Duration;
use tokio::sync::Mutex;

/// Cache backend on a Redis server
pub struct RedisBackend {
    client: Client,
    connection: Mutex<Option<MultiplexedConnection>>,
    timeout: Duration,
}

impl RedisBackend {
    /// Connect to the configured server
    ///
    /// Fails with [`CacheError::StorageUnavailable`] when neither `url` nor
    /// `host` is set or the server cannot be reached within the timeout.
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let backend = Self {
            client: Client::open(connection_info(config)?)?,
            connection: Mutex::new(None),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        };
        backend.connection().await?;

        tracing::info!(addr = %backend.client.get_connection_info().addr, "Connected to Redis");
        Ok(backend)
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = tokio::time::timeout(self.timeout, self.client.get_multiplexed_async_connection())
            .await
            .map_err(|_| {
                CacheError::StorageUnavailable(format!(
                    "Redis connect timed out after {}s",
                    self.timeout.as_secs()
                ))
            })??;

        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Drop the shared connection if `err` means it is gone
    async fn discard_if_broken(&self, err: &RedisError) {
        if err.is_connection_dropped() || err.is_io_error() || err.is_timeout() {
            tracing::warn!(error = %err, "Redis connection lost, reconnecting on next use");
            *self.connection.lock().await = None;
        }
    }
}

/// Build connection info from `url`, or from `host`/`port` plus credentials
pub fn connection_info(config: &RedisConfig) -> Result<ConnectionInfo, CacheError> {
    if let Some(ref url) = config.url {
        return Ok(url.as_str().into_connection_info()?);
    }

    let Some(ref host) = config.host else {
        return Err(CacheError::StorageUnavailable(
            "Redis backend needs a url or host".to_string(),
        ));
    };

    let mut info = (host.as_str(), config.port).into_connection_info()?;
    info.redis.username = config.username.clone();
    info.redis.password = config.password.clone();
    Ok(info)
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => Ok(value),
            Err(e) => {
                self.discard_if_broken(&e).await;
                Err(e.into())
            }
        }
    }

    async fn write(&self, key: &str, value: String) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        match conn.set::<_, _, ()>(key, value).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.discard_if_broken(&e).await;
                Err(e.into())
            }
        }
    }
}
