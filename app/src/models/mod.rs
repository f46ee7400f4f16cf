use crate::error::DBError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

macro_rules! sql_stmnt {
    ($ret:ident, $stmt:expr) => {
        sqlx::query_as::<_ ,$ret>($stmt)
    };
    ($stmt:expr) => {
        sqlx::query($stmt)
    };
    ($ret:ident, $stmt:expr, $($bind:expr),*) => {
        sqlx::query_as::<_ ,$ret>($stmt)$(.bind($bind))*
    };
    ($stmt:expr, $($bind:expr),*) => {
        sqlx::query($stmt)$(.bind($bind))*
    };
}

pub mod configuration;
pub mod reading;

pub const CONFIGURATION_TABLE: &str = "configuracao";

/// How long a writer waits for the lock held by another connection
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the SQLite file, creating it and its directory on first run
pub async fn establish_db_connection(database_url: &str) -> Result<SqlitePool, DBError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);
    if let Some(dir) = database_dir(database_url) {
        tokio::fs::create_dir_all(dir).await?;
    }
    Ok(SqlitePoolOptions::new().connect_with(options).await?)
}

fn database_dir(database_url: &str) -> Option<&Path> {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()?;
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

pub async fn check_schema(conn: &mut SqliteConnection) -> Result<(), DBError> {
    sql_stmnt!("SELECT count(*) AS count FROM leituras_sensores")
        .fetch_one(&mut *conn)
        .await?;
    Ok(())
}

pub async fn has_table(conn: &mut SqliteConnection, name: &str) -> Result<bool, DBError> {
    let record = sql_stmnt!(
        CountRecord,
        "SELECT count(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?",
        name
    )
    .fetch_one(&mut *conn)
    .await?;
    Ok(record.count() > 0)
}

/// Creates both tables and seeds the default configuration row
pub async fn create_schema(conn: &mut SqliteConnection) -> Result<(), DBError> {
    sql_stmnt!(
        r#"CREATE TABLE IF NOT EXISTS leituras_sensores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            data_hora TIMESTAMP NOT NULL,
            umidade_solo REAL NOT NULL,
            luminosidade REAL NOT NULL,
            estado_bomba BOOLEAN NOT NULL
        )"#
    )
    .execute(&mut *conn)
    .await?;
    sql_stmnt!("CREATE INDEX IF NOT EXISTS idx_leituras_data_hora ON leituras_sensores (data_hora)")
        .execute(&mut *conn)
        .await?;
    sql_stmnt!(
        r#"CREATE TABLE IF NOT EXISTS configuracao (
            id INTEGER PRIMARY KEY,
            modo VARCHAR(10) NOT NULL DEFAULT 'AUTOMATICO',
            setpoint_umidade REAL NOT NULL DEFAULT 60.0,
            comando_manual_bomba BOOLEAN NOT NULL DEFAULT 0
        )"#
    )
    .execute(&mut *conn)
    .await?;
    configuration::insert_default(conn).await
}

#[derive(sqlx::FromRow)]
pub(crate) struct CountRecord {
    pub count: Option<i64>,
}

impl CountRecord {
    pub fn count(self) -> i64 {
        self.count.unwrap_or(0)
    }
}

/// Single connection in-memory pool, every test gets its own database
#[cfg(test)]
pub(crate) async fn establish_test_connection() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

#[cfg(test)]
mod test;
