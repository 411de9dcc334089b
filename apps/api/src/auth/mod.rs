//! Auth gate: resolves the caller from a session token issued by the login provider.

pub mod session;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

/// Identity carried by a session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Extractor for routes that require a signed-in caller. Rejects with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, &state.config.session_cookie)
            .ok_or(AppError::Unauthorized)?;

        let user = state
            .sessions
            .resolve(&token)
            .await?
            .filter(|user| !user.email.trim().is_empty())
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser(user))
    }
}

/// Bearer token first, then the session cookie.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, token)| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
