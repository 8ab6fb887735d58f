//! Application state shared across request handlers

use std::sync::Arc;

use tfbridge_core::StateCoordinator;

use super::config::Configuration;

/// State injected into every handler via `web::Data`.
pub struct AppState {
    pub configuration: Configuration,
    pub coordinator: Arc<StateCoordinator>,
}
