use crate::error::DBError;
use crate::models::{
    self,
    configuration::{self as configuration_model},
    reading::{self as reading_model, SensorReadingDao},
};
use chrono::Utc;
use irrigation_core::{ConfigUpdate, Configuration, ReadingMessage};
use sqlx::SqlitePool;
use std::fmt::Debug;
use tracing::{debug, info};

/// Durable CRUD over readings and the singleton configuration
///
/// Cloning is cheap, all clones share the same pool.
#[derive(Clone)]
pub struct Store {
    db_conn: SqlitePool,
}

impl Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish()
    }
}

impl Store {
    pub fn new(db_conn: SqlitePool) -> Self {
        Store { db_conn }
    }

    pub async fn connect(database_url: &str) -> Result<Self, DBError> {
        let db_conn = models::establish_db_connection(database_url).await?;
        Ok(Store::new(db_conn))
    }

    /// Creates the schema and the default configuration exactly once
    ///
    /// Returns `true` if this call created them, safe to call on every start.
    #[tracing::instrument]
    pub async fn ensure_initialized(&self) -> Result<bool, DBError> {
        let mut tx = self.db_conn.begin().await?;
        if models::has_table(&mut tx, models::CONFIGURATION_TABLE).await? {
            info!("Tables already exist");
            return Ok(false);
        }

        models::create_schema(&mut tx).await?;
        tx.commit().await?;
        info!("Created tables and inserted the default configuration");
        Ok(true)
    }

    /// The reading time is stored as naive UTC
    #[tracing::instrument]
    pub async fn insert_reading(&self, msg: ReadingMessage) -> Result<SensorReadingDao, DBError> {
        let timestamp = msg.timestamp.unwrap_or_else(Utc::now).naive_utc();

        let mut tx = self.db_conn.begin().await?;
        let reading = reading_model::insert(
            &mut tx,
            timestamp,
            msg.soil_moisture,
            msg.luminosity,
            msg.pump_state,
        )
        .await?;
        tx.commit().await?;

        debug!(reading_id = reading.id(), "Persisted reading");
        Ok(reading)
    }

    /// Up to `limit` readings, newest first
    pub async fn recent_readings(&self, limit: i64) -> Result<Vec<SensorReadingDao>, DBError> {
        let mut conn = self.db_conn.acquire().await?;
        reading_model::get_recent(&mut conn, limit).await
    }

    pub async fn reading_count(&self) -> Result<i64, DBError> {
        let mut conn = self.db_conn.acquire().await?;
        reading_model::count(&mut conn).await
    }

    /// The singleton configuration, `None` if the row is missing
    pub async fn configuration(&self) -> Result<Option<Configuration>, DBError> {
        let mut conn = self.db_conn.acquire().await?;
        configuration_model::get(&mut conn).await
    }

    /// Applies one change atomically and returns the resulting configuration
    #[tracing::instrument]
    pub async fn update_configuration(
        &self,
        update: &ConfigUpdate,
    ) -> Result<Configuration, DBError> {
        let mut conn = self.db_conn.acquire().await?;
        let config = configuration_model::update(&mut conn, update).await?;

        info!(key = update.key(), value = %update, "Updated configuration");
        Ok(config)
    }

    #[cfg(test)]
    pub(crate) fn db_conn(&self) -> &SqlitePool {
        &self.db_conn
    }

    pub async fn check_db(&self) -> Result<(), DBError> {
        let mut conn = self.db_conn.acquire().await?;
        models::check_schema(&mut conn).await
    }
}
