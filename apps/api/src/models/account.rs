#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::portfolio::Portfolio;

/// One authenticated identity and its (optional) portfolio document.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub portfolio: Option<Json<Portfolio>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn portfolio(&self) -> Option<&Portfolio> {
        self.portfolio.as_ref().map(|doc| &doc.0)
    }
}
