use crate::error::DBError;
use irrigation_core::{ConfigUpdate, Configuration, ControlMode};
use sqlx::SqliteConnection;

/// The configuration row always lives at this identity
pub const CONFIGURATION_ID: i64 = 1;

#[derive(sqlx::FromRow, Debug)]
#[allow(dead_code)]
pub struct ConfigurationDao {
    pub(crate) id: i64,
    #[sqlx(rename = "modo")]
    pub(crate) mode: String,
    #[sqlx(rename = "setpoint_umidade")]
    pub(crate) moisture_setpoint: f64,
    #[sqlx(rename = "comando_manual_bomba")]
    pub(crate) manual_pump_command: bool,
}

impl TryFrom<ConfigurationDao> for Configuration {
    type Error = DBError;

    fn try_from(val: ConfigurationDao) -> Result<Self, Self::Error> {
        let mode: ControlMode = val
            .mode
            .parse()
            .map_err(|_| DBError::Corrupt(format!("modo = {}", val.mode)))?;
        Ok(Configuration {
            mode,
            moisture_setpoint: val.moisture_setpoint,
            manual_pump_command: val.manual_pump_command,
        })
    }
}

pub async fn insert_default(conn: &mut SqliteConnection) -> Result<(), DBError> {
    let config = Configuration::default();
    sql_stmnt!(
        r#"INSERT OR IGNORE INTO configuracao (id, modo, setpoint_umidade, comando_manual_bomba)
            VALUES (?, ?, ?, ?)"#,
        CONFIGURATION_ID,
        config.mode.as_str(),
        config.moisture_setpoint,
        config.manual_pump_command
    )
    .execute(&mut *conn)
    .await?;
    Ok(())
}

// READ configuracao
pub async fn get(conn: &mut SqliteConnection) -> Result<Option<Configuration>, DBError> {
    let dao = sql_stmnt!(
        ConfigurationDao,
        r#"SELECT id, modo, setpoint_umidade, comando_manual_bomba
            FROM configuracao WHERE id = ?"#,
        CONFIGURATION_ID
    )
    .fetch_optional(&mut *conn)
    .await?;
    dao.map(Configuration::try_from).transpose()
}

// UPDATE configuracao, one statement per field
//
// A deferred SELECT-then-UPDATE transaction fails with SQLITE_BUSY while an
// insert holds the write lock, a single write statement waits instead.
pub async fn update(
    conn: &mut SqliteConnection,
    update: &ConfigUpdate,
) -> Result<Configuration, DBError> {
    let query = match update {
        ConfigUpdate::Mode(mode) => sql_stmnt!(
            ConfigurationDao,
            r#"UPDATE configuracao SET modo = ? WHERE id = ?
                RETURNING id, modo, setpoint_umidade, comando_manual_bomba"#,
            mode.as_str(),
            CONFIGURATION_ID
        ),
        ConfigUpdate::Setpoint(setpoint) => sql_stmnt!(
            ConfigurationDao,
            r#"UPDATE configuracao SET setpoint_umidade = ? WHERE id = ?
                RETURNING id, modo, setpoint_umidade, comando_manual_bomba"#,
            *setpoint,
            CONFIGURATION_ID
        ),
        ConfigUpdate::ManualCommand(active) => sql_stmnt!(
            ConfigurationDao,
            r#"UPDATE configuracao SET comando_manual_bomba = ? WHERE id = ?
                RETURNING id, modo, setpoint_umidade, comando_manual_bomba"#,
            *active,
            CONFIGURATION_ID
        ),
    };

    match query.fetch_optional(&mut *conn).await? {
        Some(dao) => Configuration::try_from(dao),
        None => Err(DBError::ConfigurationNotFound),
    }
}
