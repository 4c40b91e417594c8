//! Database operations for the `development_applications` table.

use anyhow::{Context, Result};
use sqlx::ConnectOptions;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::portal::DevelopmentApplication;

/// A stored application row, dates already rendered as text.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct StoredApplication {
    pub council_reference: String,
    pub address: String,
    pub description: String,
    pub info_url: String,
    pub date_scraped: String,
    pub date_received: String,
}

/// Upsert sink for development applications, keyed by council reference.
#[derive(Debug, Clone)]
pub struct ApplicationStore {
    pool: SqlitePool,
}

impl ApplicationStore {
    /// Open (creating if needed) the SQLite database at `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context("Failed to parse database URL")?
            .create_if_missing(true)
            .log_statements(tracing::log::LevelFilter::Debug)
            .log_slow_statements(tracing::log::LevelFilter::Warn, Duration::from_secs(1));

        // Writes are strictly sequential; one connection is all the job needs.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(4))
            .connect_with(options)
            .await
            .context("Failed to open database")?;

        info!(database_url, "database opened");
        Ok(Self { pool })
    }

    /// A private in-memory database, gone once the store is dropped.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the table if it doesn't exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")
    }

    /// Insert an application, replacing every column of an existing row with
    /// the same council reference.
    pub async fn upsert(&self, da: &DevelopmentApplication) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO development_applications (
                council_reference, address, description, info_url, date_scraped, date_received
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (council_reference)
            DO UPDATE SET
                address = excluded.address,
                description = excluded.description,
                info_url = excluded.info_url,
                date_scraped = excluded.date_scraped,
                date_received = excluded.date_received
            "#,
        )
        .bind(&da.application_number)
        .bind(&da.address)
        .bind(&da.reason)
        .bind(&da.info_url)
        .bind(da.scrape_date_str())
        .bind(da.received_date_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Look up a stored application by council reference.
    pub async fn find(&self, council_reference: &str) -> Result<Option<StoredApplication>, sqlx::Error> {
        sqlx::query_as::<_, StoredApplication>(
            r#"
            SELECT council_reference, address, description, info_url, date_scraped, date_received
            FROM development_applications
            WHERE council_reference = ?1
            "#,
        )
        .bind(council_reference)
        .fetch_optional(&self.pool)
        .await
    }

    /// Number of stored applications.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM development_applications")
            .fetch_one(&self.pool)
            .await
    }
}
