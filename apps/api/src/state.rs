use std::sync::Arc;

use crate::auth::session::SessionStore;
use crate::config::Config;
use crate::images::store::ImageStore;
use crate::portfolio::store::AccountStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Built once in `main`; every backend sits behind a trait object so handlers
/// never see connection details.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub images: Arc<dyn ImageStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub config: Config,
}
