//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use happy_thoughts_core::ports::{AuthProvider, ThoughtRepository};
use happy_thoughts_core::service::ThoughtService;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub thoughts: ThoughtService,
    pub auth: Arc<dyn AuthProvider>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn ThoughtRepository>,
        auth: Arc<dyn AuthProvider>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            thoughts: ThoughtService::new(repo),
            auth,
            config,
        }
    }
}
