pub mod auth;
pub mod config;
pub mod rest;
pub mod storage;
pub mod tasks;

use std::sync::Arc;

use auth::token::TokenKeys;
use auth::AuthService;
use config::ServerConfig;
use storage::Storage;
use tasks::TaskService;

/// Shared application state passed to every REST handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub storage: Arc<Storage>,
    /// Bearer token signing/verification keys, backed by an on-disk secret.
    pub tokens: Arc<TokenKeys>,
    pub auth: AuthService,
    pub tasks: TaskService,
    pub started_at: std::time::Instant,
}
