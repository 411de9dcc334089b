use tracing::info;

use crate::auth::SessionUser;
use crate::errors::AppError;
use crate::models::portfolio::Portfolio;
use crate::portfolio::store::AccountStore;
use crate::portfolio::validation::{normalize, validate};

/// Normalizes, validates and writes the caller's portfolio.
///
/// The slug pre-check gives the common case a clean error; a concurrent claim
/// that slips past it is still rejected by the store's unique constraint.
pub async fn save_portfolio(
    store: &dyn AccountStore,
    user: &SessionUser,
    submission: Portfolio,
) -> Result<Portfolio, AppError> {
    let portfolio = normalize(submission);
    validate(&portfolio)?;

    if store
        .slug_owned_by_other(&portfolio.slug, &user.email)
        .await?
    {
        info!("Slug '{}' already claimed by another account", portfolio.slug);
        return Err(AppError::SlugTaken);
    }

    let account = store.upsert_portfolio(user, &portfolio).await?;
    info!("Saved portfolio '{}' for account {}", portfolio.slug, account.id);

    Ok(account.portfolio().cloned().unwrap_or(portfolio))
}

/// The caller's portfolio; the account is created on first access.
pub async fn own_portfolio(
    store: &dyn AccountStore,
    user: &SessionUser,
) -> Result<Portfolio, AppError> {
    let account = store.ensure_account(user).await?;
    Ok(account.portfolio().cloned().unwrap_or_default())
}

pub async fn public_portfolio(store: &dyn AccountStore, slug: &str) -> Result<Portfolio, AppError> {
    store
        .find_by_slug(slug.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Portfolio not found".to_string()))
}
