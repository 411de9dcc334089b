use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::warn;

use crate::auth::SessionUser;
use crate::db::{ConnectionCache, Connector};
use crate::errors::AppError;

/// Looks up the identity behind a session token.
///
/// Carried in `AppState` as `Arc<dyn SessionStore>`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Option<SessionUser>, AppError>;
}

pub struct RedisConnector {
    client: redis::Client,
}

impl RedisConnector {
    pub fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("REDIS_URL is not a valid Redis URL")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Connector for RedisConnector {
    type Handle = MultiplexedConnection;

    fn backend(&self) -> &'static str {
        "Redis"
    }

    async fn connect(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .context("failed to connect to Redis")
    }
}

/// Session records written by the login provider: `{prefix}{token}` -> JSON `SessionUser`.
/// Expiry is the provider's concern (key TTL).
pub struct RedisSessionStore {
    connections: ConnectionCache<RedisConnector>,
    key_prefix: String,
}

impl RedisSessionStore {
    pub fn new(connections: ConnectionCache<RedisConnector>, key_prefix: impl Into<String>) -> Self {
        Self {
            connections,
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens the connection eagerly so a bad REDIS_URL fails at startup.
    pub async fn connect(&self) -> Result<()> {
        self.connections.get().await.map(|_| ())
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn resolve(&self, token: &str) -> Result<Option<SessionUser>, AppError> {
        let mut conn = self.connections.get().await?;
        let raw: Option<String> = conn.get(format!("{}{}", self.key_prefix, token)).await?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str::<SessionUser>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!("Ignoring malformed session record: {e}");
                Ok(None)
            }
        }
    }
}
