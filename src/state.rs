use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, TodoRepository};
use crate::services::{AuthError, AuthService};

/// Shared, immutable router state. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub todos: Arc<dyn TodoRepository>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, db: &DatabaseManager) -> Result<Self, AuthError> {
        let auth = AuthService::from_config(db.users(), &config.security)?;
        Ok(Self {
            config: Arc::new(config),
            auth,
            todos: db.todos(),
            started_at: Instant::now(),
        })
    }
}
