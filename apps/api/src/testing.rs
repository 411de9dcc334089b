//! In-memory backends for handler and service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::auth::session::SessionStore;
use crate::auth::SessionUser;
use crate::config::Config;
use crate::errors::AppError;
use crate::images::store::{ImageStore, StoredImage};
use crate::models::account::Account;
use crate::models::portfolio::Portfolio;
use crate::portfolio::store::AccountStore;
use crate::state::AppState;

pub const ADA_TOKEN: &str = "ada-session";
pub const EVE_TOKEN: &str = "eve-session";

pub fn session_user(email: &str) -> SessionUser {
    SessionUser {
        email: email.to_string(),
        name: Some("Test User".to_string()),
        image: None,
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/folio_test".to_string(),
        database_name: None,
        db_max_connections: 1,
        redis_url: "redis://localhost".to_string(),
        session_cookie: "session_token".to_string(),
        session_key_prefix: "session:".to_string(),
        s3_bucket: "folio-test".to_string(),
        s3_endpoint: "http://localhost:9000".to_string(),
        aws_access_key_id: "test".to_string(),
        aws_secret_access_key: "test".to_string(),
        max_upload_bytes: 1024 * 1024,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

/// State with two signed-in users: `ADA_TOKEN` and `EVE_TOKEN`.
pub fn test_state() -> AppState {
    let sessions = MemorySessionStore::default();
    sessions.insert(ADA_TOKEN, session_user("ada@example.com"));
    sessions.insert(EVE_TOKEN, session_user("eve@example.com"));

    AppState {
        accounts: Arc::new(MemoryAccountStore::default()),
        images: Arc::new(MemoryImageStore::default()),
        sessions: Arc::new(sessions),
        config: test_config(),
    }
}

/// Mirrors the Postgres store: one account per email, at most one owner per slug,
/// the check and the write under one lock.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<String, Account>>,
}

impl MemoryAccountStore {
    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    pub fn account(&self, email: &str) -> Option<Account> {
        self.accounts.lock().unwrap().get(email).cloned()
    }
}

fn new_account(user: &SessionUser) -> Account {
    let now = Utc::now();
    Account {
        id: Uuid::new_v4(),
        email: user.email.clone(),
        name: user.name.clone().unwrap_or_default(),
        image: user.image.clone(),
        portfolio: None,
        created_at: now,
        updated_at: now,
    }
}

fn owns_slug(account: &Account, slug: &str) -> bool {
    account.portfolio().is_some_and(|p| p.slug == slug)
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn ensure_account(&self, user: &SessionUser) -> Result<Account, AppError> {
        let mut accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .entry(user.email.clone())
            .or_insert_with(|| new_account(user))
            .clone())
    }

    async fn slug_owned_by_other(&self, slug: &str, email: &str) -> Result<bool, AppError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .values()
            .any(|a| a.email != email && owns_slug(a, slug)))
    }

    async fn upsert_portfolio(
        &self,
        user: &SessionUser,
        portfolio: &Portfolio,
    ) -> Result<Account, AppError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts
            .values()
            .any(|a| a.email != user.email && owns_slug(a, &portfolio.slug))
        {
            return Err(AppError::SlugTaken);
        }

        let account = accounts
            .entry(user.email.clone())
            .or_insert_with(|| new_account(user));
        account.name = user.name.clone().unwrap_or_default();
        account.image = user.image.clone();
        account.portfolio = Some(Json(portfolio.clone()));
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Portfolio>, AppError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .values()
            .find(|a| owns_slug(a, slug))
            .and_then(|a| a.portfolio().cloned()))
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, SessionUser>>,
}

impl MemorySessionStore {
    pub fn insert(&self, token: &str, user: SessionUser) {
        self.sessions.lock().unwrap().insert(token.to_string(), user);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn resolve(&self, token: &str) -> Result<Option<SessionUser>, AppError> {
        Ok(self.sessions.lock().unwrap().get(token).cloned())
    }
}

#[derive(Default)]
pub struct MemoryImageStore {
    images: Mutex<HashMap<Uuid, StoredImage>>,
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn put(
        &self,
        _owner: &str,
        _filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        self.images.lock().unwrap().insert(
            id,
            StoredImage {
                content_type: content_type.to_string(),
                data,
            },
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredImage>, AppError> {
        Ok(self.images.lock().unwrap().get(&id).cloned())
    }
}
