//! Axum route handlers for the Portfolio API.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::portfolio::Portfolio;
use crate::portfolio::service::{own_portfolio, public_portfolio, save_portfolio};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PublicPortfolioResponse {
    pub portfolio: Portfolio,
    /// Resolved CSS `background` value for the page renderer.
    pub background: String,
}

/// GET /api/portfolio
pub async fn handle_get_own(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Portfolio>, AppError> {
    let portfolio = own_portfolio(state.accounts.as_ref(), &user).await?;
    Ok(Json(portfolio))
}

/// POST /api/portfolio
///
/// Replaces the caller's portfolio wholesale with the submitted document.
pub async fn handle_save(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<Portfolio>, JsonRejection>,
) -> Result<Json<Portfolio>, AppError> {
    let Json(submission) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let saved = save_portfolio(state.accounts.as_ref(), &user, submission).await?;
    Ok(Json(saved))
}

/// GET /api/portfolio/:slug
pub async fn handle_get_public(
    State(state): State<AppState>,
    slug: Result<Path<String>, PathRejection>,
) -> Result<Json<PublicPortfolioResponse>, AppError> {
    let Path(slug) = slug.map_err(|e| AppError::Validation(e.body_text()))?;
    let portfolio = public_portfolio(state.accounts.as_ref(), &slug).await?;
    let background = portfolio.background_css();
    Ok(Json(PublicPortfolioResponse {
        portfolio,
        background,
    }))
}
