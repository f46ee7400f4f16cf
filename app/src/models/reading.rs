use super::CountRecord;
use crate::error::DBError;
use chrono::NaiveDateTime;
use sqlx::SqliteConnection;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct SensorReadingDao {
    pub(crate) id: i64,
    #[sqlx(rename = "data_hora")]
    pub(crate) timestamp: NaiveDateTime,
    #[sqlx(rename = "umidade_solo")]
    pub(crate) soil_moisture: f64,
    #[sqlx(rename = "luminosidade")]
    pub(crate) luminosity: f64,
    #[sqlx(rename = "estado_bomba")]
    pub(crate) pump_state: bool,
}

impl SensorReadingDao {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn time<T>(&self, tz: &T) -> chrono::DateTime<T>
    where
        T: chrono::TimeZone,
    {
        tz.from_utc_datetime(&self.timestamp)
    }

    pub fn soil_moisture(&self) -> f64 {
        self.soil_moisture
    }

    pub fn luminosity(&self) -> f64 {
        self.luminosity
    }

    pub fn pump_state(&self) -> bool {
        self.pump_state
    }
}

pub async fn insert(
    conn: &mut SqliteConnection,
    timestamp: NaiveDateTime,
    soil_moisture: f64,
    luminosity: f64,
    pump_state: bool,
) -> Result<SensorReadingDao, DBError> {
    Ok(sql_stmnt!(
        SensorReadingDao,
        r#"INSERT INTO leituras_sensores (data_hora, umidade_solo, luminosidade, estado_bomba)
            VALUES (?, ?, ?, ?) RETURNING *"#,
        timestamp,
        soil_moisture,
        luminosity,
        pump_state
    )
    .fetch_one(&mut *conn)
    .await?)
}

/// READ the newest readings first
pub async fn get_recent(
    conn: &mut SqliteConnection,
    limit: i64,
) -> Result<Vec<SensorReadingDao>, DBError> {
    Ok(sql_stmnt!(
        SensorReadingDao,
        r#"SELECT id, data_hora, umidade_solo, luminosidade, estado_bomba
            FROM leituras_sensores
            ORDER BY data_hora DESC, id DESC
            LIMIT ?"#,
        limit
    )
    .fetch_all(&mut *conn)
    .await?)
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64, DBError> {
    let record = sql_stmnt!(
        CountRecord,
        "SELECT count(*) AS count FROM leituras_sensores"
    )
    .fetch_one(&mut *conn)
    .await?;
    Ok(record.count())
}
