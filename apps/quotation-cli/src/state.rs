//! # Application State
//!
//! What every command needs: the database and the loaded configuration.
//!
//! ## Thread Safety
//! `Database` wraps a `SqlitePool`, which is `Send + Sync` and cheap to
//! clone. Configuration is read-only after startup, so no mutex is needed.
//! Clones of an `AppState` can run commands concurrently.

use std::sync::Arc;
use tracing::info;

use furnisure_db::{Database, DbConfig, DbResult};

use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct AppState {
    db: Database,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }

    /// Opens the configured database (running migrations) and wraps it.
    pub async fn open(config: AppConfig) -> DbResult<Self> {
        if let Some(parent) = config.database.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    furnisure_db::DbError::Unavailable(format!(
                        "cannot create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let db_config = DbConfig::new(&config.database.path)
            .max_connections(config.database.max_connections);
        let db = Database::new(db_config).await?;

        info!(
            path = %config.database.path.display(),
            rates = ?config.tax.rates(),
            "Quotation store ready"
        );

        Ok(AppState::new(db, config))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
