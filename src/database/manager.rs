use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::database::memory::{MemoryTodoRepository, MemoryUserRepository};
use crate::database::postgres::{self, PgTodoRepository, PgUserRepository};
use crate::database::repository::{TodoRepository, UserRepository};

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated in {0}")]
    Conflict(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Owns the persistence handles for the lifetime of the process.
///
/// Built once in `main` and handed to the router state; there is no global
/// pool registry.
#[derive(Clone)]
pub struct DatabaseManager {
    pool: Option<PgPool>,
    users: Arc<dyn UserRepository>,
    todos: Arc<dyn TodoRepository>,
}

impl DatabaseManager {
    /// Connect to PostgreSQL when a URL is configured, otherwise fall back to
    /// the in-process store.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let Some(url) = config.url.as_deref() else {
            warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            return Ok(Self::in_memory());
        };

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        postgres::ensure_schema(&pool).await?;
        info!("Connected to PostgreSQL (max {} connections)", config.max_connections);

        Ok(Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            todos: Arc::new(PgTodoRepository::new(pool.clone())),
            pool: Some(pool),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            pool: None,
            users: Arc::new(MemoryUserRepository::new()),
            todos: Arc::new(MemoryTodoRepository::new()),
        }
    }

    pub fn users(&self) -> Arc<dyn UserRepository> {
        Arc::clone(&self.users)
    }

    pub fn todos(&self) -> Arc<dyn TodoRepository> {
        Arc::clone(&self.todos)
    }

    pub fn backend(&self) -> &'static str {
        if self.pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn connects_in_memory_without_url() {
        let config = AppConfig::development();
        let db = DatabaseManager::connect(&config.database).await.unwrap();
        assert_eq!(db.backend(), "memory");
        db.close().await;
    }
}
