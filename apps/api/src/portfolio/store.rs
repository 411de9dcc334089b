use std::sync::Arc;

use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use crate::auth::SessionUser;
use crate::db::{ConnectionCache, PgConnector};
use crate::errors::AppError;
use crate::models::account::Account;
use crate::models::portfolio::Portfolio;

/// Name of the unique constraint guarding `accounts.slug`.
pub const SLUG_CONSTRAINT: &str = "accounts_slug_unique";

/// Persistence for accounts and their portfolio documents.
///
/// Carried in `AppState` as `Arc<dyn AccountStore>`. Implementations must reject
/// a write that would give two accounts the same slug with `AppError::SlugTaken`,
/// independent of any earlier `slug_owned_by_other` check.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Returns the caller's account, creating it if absent. Never overwrites.
    async fn ensure_account(&self, user: &SessionUser) -> Result<Account, AppError>;

    /// True if an account other than `email` already owns `slug`.
    async fn slug_owned_by_other(&self, slug: &str, email: &str) -> Result<bool, AppError>;

    /// Creates or updates the caller's account, replacing its portfolio wholesale.
    async fn upsert_portfolio(
        &self,
        user: &SessionUser,
        portfolio: &Portfolio,
    ) -> Result<Account, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Portfolio>, AppError>;
}

const ACCOUNT_COLUMNS: &str = "id, email, name, image, portfolio, created_at, updated_at";

pub struct PgAccountStore {
    pool: Arc<ConnectionCache<PgConnector>>,
}

impl PgAccountStore {
    pub fn new(pool: Arc<ConnectionCache<PgConnector>>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn ensure_account(&self, user: &SessionUser) -> Result<Account, AppError> {
        let pool = self.pool.get().await?;

        sqlx::query(
            r#"
            INSERT INTO accounts (id, email, name, image)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(user.name.as_deref().unwrap_or_default())
        .bind(user.image.as_deref())
        .execute(&pool)
        .await?;

        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(&user.email)
        .fetch_one(&pool)
        .await?;

        Ok(account)
    }

    async fn slug_owned_by_other(&self, slug: &str, email: &str) -> Result<bool, AppError> {
        let pool = self.pool.get().await?;

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM accounts WHERE slug = $1 AND email <> $2)",
        )
        .bind(slug)
        .bind(email)
        .fetch_one(&pool)
        .await?;

        Ok(taken)
    }

    async fn upsert_portfolio(
        &self,
        user: &SessionUser,
        portfolio: &Portfolio,
    ) -> Result<Account, AppError> {
        let pool = self.pool.get().await?;

        let result = sqlx::query_as::<_, Account>(&format!(
            r#"
            INSERT INTO accounts (id, email, name, image, portfolio, slug)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                image = EXCLUDED.image,
                portfolio = EXCLUDED.portfolio,
                slug = EXCLUDED.slug,
                updated_at = now()
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(user.name.as_deref().unwrap_or_default())
        .bind(user.image.as_deref())
        .bind(Json(portfolio))
        .bind(&portfolio.slug)
        .fetch_one(&pool)
        .await;

        result.map_err(map_slug_violation)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Portfolio>, AppError> {
        let pool = self.pool.get().await?;

        let row: Option<(Option<Json<Portfolio>>,)> =
            sqlx::query_as("SELECT portfolio FROM accounts WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&pool)
                .await?;

        Ok(row.and_then(|(doc,)| doc).map(|doc| doc.0))
    }
}

/// The store, not the pre-check, is the authority on slug ownership.
fn map_slug_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.constraint() == Some(SLUG_CONSTRAINT) {
            return AppError::SlugTaken;
        }
    }
    AppError::Database(err)
}
