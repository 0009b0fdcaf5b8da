//! Application state for the web server.

use std::sync::Arc;
use tokio::sync::RwLock;

use ledgerlens::Session;

/// Shared application state.
///
/// One session per server; the lock admits one writer at a time.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<Session>>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }
}
