//! Database layer for Foncier
//!
//! Provides:
//! - SeaORM entity models
//! - Repository pattern for data access
//! - Connection pool management
//! - Schema bootstrap

pub mod models;
pub mod query;
mod repository;

pub use repository::Repository;

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// Schema bootstrap statements, applied in order at startup.
const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS terrains (
        id VARCHAR(10) PRIMARY KEY,
        ville VARCHAR(100) NOT NULL,
        commune VARCHAR(100) NOT NULL,
        quartier VARCHAR(100) NOT NULL,
        superficie INTEGER NOT NULL,
        prix_achat BIGINT NOT NULL,
        date_achat DATE NOT NULL,
        vendeur_initial VARCHAR(200) NOT NULL,
        statut VARCHAR(20) CHECK (statut IN ('Disponible', 'Vendu')) DEFAULT 'Disponible',
        prix_vente BIGINT,
        date_vente DATE,
        acheteur_final VARCHAR(200),
        created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS terrain_photos (
        id SERIAL PRIMARY KEY,
        terrain_id VARCHAR(10) REFERENCES terrains(id) ON DELETE CASCADE,
        photo_url TEXT NOT NULL,
        photo_name VARCHAR(255) NOT NULL,
        description TEXT,
        is_primary BOOLEAN DEFAULT FALSE,
        created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_terrain_photos_terrain_id ON terrain_photos(terrain_id)",
    r#"
    CREATE OR REPLACE FUNCTION update_updated_at_column()
    RETURNS TRIGGER AS $$
    BEGIN
        NEW.updated_at = CURRENT_TIMESTAMP;
        RETURN NEW;
    END;
    $$ language 'plpgsql'
    "#,
    "DROP TRIGGER IF EXISTS update_terrains_updated_at ON terrains",
    r#"
    CREATE TRIGGER update_terrains_updated_at
        BEFORE UPDATE ON terrains
        FOR EACH ROW
        EXECUTE FUNCTION update_updated_at_column()
    "#,
];

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    /// Primary connection (for writes)
    pub primary: DatabaseConnection,

    /// Read replica connection (optional)
    pub replica: Option<DatabaseConnection>,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to primary database...");

        let primary = Self::connect(&config.url, config).await?;

        let replica = if let Some(ref read_url) = config.read_url {
            info!("Connecting to read replica...");
            Some(Self::connect(read_url, config).await?)
        } else {
            None
        };

        info!("Database connections established");

        Ok(Self { primary, replica })
    }

    async fn connect(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opts = ConnectOptions::new(url);
        opts.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(true);

        Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect: {}", e),
            })
    }

    /// Get the connection for reads (replica if available, otherwise primary)
    pub fn read(&self) -> &DatabaseConnection {
        self.replica.as_ref().unwrap_or(&self.primary)
    }

    /// Get the connection for writes (always primary)
    pub fn write(&self) -> &DatabaseConnection {
        &self.primary
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.primary
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Primary ping failed: {}", e),
            })?;

        if let Some(ref replica) = self.replica {
            replica
                .execute_unprepared("SELECT 1")
                .await
                .map_err(|e| AppError::DatabaseConnection {
                    message: format!("Replica ping failed: {}", e),
                })?;
        }

        Ok(())
    }

    /// Create tables, indexes, and the updated_at trigger if they do not
    /// already exist. Every statement is idempotent.
    pub async fn init_schema(&self) -> Result<()> {
        for stmt in SCHEMA_STATEMENTS {
            self.primary.execute_unprepared(stmt).await?;
        }

        info!("Database schema initialized");
        Ok(())
    }
}
