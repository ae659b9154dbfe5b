//! Shared state injected into every handler.

use std::sync::Arc;

use crate::agent::MusicAgent;
use crate::config::ServerConfig;

pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub agent: Arc<MusicAgent>,
}
