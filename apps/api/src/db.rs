use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::Config;

/// Something that can open a shareable connection handle.
#[async_trait]
pub trait Connector: Send + Sync {
    type Handle: Clone + Send + Sync + 'static;

    /// Short backend name used in log lines.
    fn backend(&self) -> &'static str;

    async fn connect(&self) -> Result<Self::Handle>;
}

type Attempt<H> = Shared<BoxFuture<'static, Result<H, Arc<anyhow::Error>>>>;

/// Lazily opened, shared connection handle.
///
/// The first caller starts a connection attempt; callers arriving while it is
/// in flight await that same attempt and receive its handle or its error. A
/// failed attempt is dropped from the cache, so the next call connects again.
/// Errors are returned to the callers, never retried here.
pub struct ConnectionCache<C: Connector> {
    connector: Arc<C>,
    handle: OnceLock<C::Handle>,
    in_flight: Mutex<Option<Attempt<C::Handle>>>,
}

impl<C: Connector + 'static> ConnectionCache<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector: Arc::new(connector),
            handle: OnceLock::new(),
            in_flight: Mutex::new(None),
        }
    }

    pub async fn get(&self) -> Result<C::Handle> {
        if let Some(handle) = self.handle.get() {
            return Ok(handle.clone());
        }

        let attempt = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.as_ref() {
                Some(attempt) => attempt.clone(),
                None => {
                    let attempt = self.start_attempt();
                    *in_flight = Some(attempt.clone());
                    attempt
                }
            }
        };

        match attempt.clone().await {
            Ok(handle) => {
                let _ = self.handle.set(handle.clone());
                self.in_flight.lock().await.take();
                Ok(handle)
            }
            Err(e) => {
                let mut in_flight = self.in_flight.lock().await;
                if in_flight.as_ref().is_some_and(|cur| cur.ptr_eq(&attempt)) {
                    *in_flight = None;
                }
                Err(anyhow!("{e:#}"))
            }
        }
    }

    fn start_attempt(&self) -> Attempt<C::Handle> {
        let connector = Arc::clone(&self.connector);
        async move {
            connector.connect().await.map_err(|e| {
                warn!("{} connection attempt failed: {e:#}", connector.backend());
                Arc::new(e)
            })
        }
        .boxed()
        .shared()
    }

    /// The handle, if a connection has already been established.
    pub fn current(&self) -> Option<&C::Handle> {
        self.handle.get()
    }
}

/// Opens the PostgreSQL pool and applies embedded migrations.
pub struct PgConnector {
    options: PgConnectOptions,
    max_connections: u32,
}

impl PgConnector {
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut options = PgConnectOptions::from_str(&config.database_url)
            .context("DATABASE_URL is not a valid PostgreSQL connection string")?;
        if let Some(name) = &config.database_name {
            options = options.database(name);
        }
        Ok(Self {
            options,
            max_connections: config.db_max_connections,
        })
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Handle = PgPool;

    fn backend(&self) -> &'static str {
        "PostgreSQL"
    }

    async fn connect(&self) -> Result<PgPool> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(self.options.clone())
            .await
            .context("failed to connect to PostgreSQL")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to apply database migrations")?;

        info!("PostgreSQL connection pool established");
        Ok(pool)
    }
}
