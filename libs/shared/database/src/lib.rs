use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::{info, warn};

use shared_config::AppConfig;

/// Shared MySQL connection pool handed to every cell service.
///
/// Cloning is cheap; the pool itself is reference-counted.
#[derive(Clone)]
pub struct Database {
    pool: MySqlPool,
}

/// Per-process state shared across cell routers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
}

impl AppState {
    pub fn new(config: AppConfig, db: Database) -> Self {
        Self { config, db }
    }
}

impl Database {
    /// Connect eagerly, verifying the server is reachable.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(&config.database_url)
            .await
            .context("failed to connect to database")?;

        info!("Database connection pool created");
        Ok(Self { pool })
    }

    /// Create the pool without touching the server. Connections are opened
    /// on first use; startup does not require the database to be up.
    pub fn connect_lazy(config: &AppConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(Duration::from_secs(30))
            .connect_lazy(&config.database_url)
            .context("invalid database URL")?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub async fn is_healthy(&self) -> bool {
        match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Database health check failed: {}", e);
                false
            }
        }
    }
}
