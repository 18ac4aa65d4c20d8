use std::sync::Arc;

use crate::board::service::BoardService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Board store, mutation engine and loader behind one handle.
    pub board: Arc<BoardService>,
}
