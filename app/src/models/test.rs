use chrono::{Duration, Utc};
use irrigation_core::{ConfigUpdate, Configuration, ControlMode};

use super::configuration;
use super::reading;
use super::*;

async fn prepared_connection() -> SqlitePool {
    let pool = establish_test_connection().await;
    let mut conn = pool.acquire().await.unwrap();
    create_schema(&mut conn).await.unwrap();
    drop(conn);
    pool
}

#[tokio::test]
async fn test_schema() {
    let pool = establish_test_connection().await;
    let mut conn = pool.acquire().await.unwrap();

    assert!(!has_table(&mut conn, CONFIGURATION_TABLE).await.unwrap());
    assert!(check_schema(&mut conn).await.is_err());

    create_schema(&mut conn).await.unwrap();

    assert!(has_table(&mut conn, CONFIGURATION_TABLE).await.unwrap());
    check_schema(&mut conn).await.unwrap();
}

#[test]
fn test_database_dir() {
    assert_eq!(
        Some(Path::new("db")),
        database_dir("sqlite://db/irrigacao_local.db")
    );
    assert_eq!(
        Some(Path::new("/var/lib/irrigation")),
        database_dir("sqlite:///var/lib/irrigation/local.db?mode=rwc")
    );
    assert_eq!(None, database_dir("sqlite::memory:"));
    assert_eq!(None, database_dir("sqlite://local.db"));
}

#[tokio::test]
async fn crud_readings() {
    let pool = prepared_connection().await;
    let mut conn = pool.acquire().await.unwrap();
    let now = Utc::now().naive_utc();

    // create
    let older = reading::insert(&mut conn, now - Duration::minutes(5), 30.0, 120.0, false)
        .await
        .unwrap();
    let newer = reading::insert(&mut conn, now, 42.5, 300.0, true)
        .await
        .unwrap();
    assert_ne!(older.id(), newer.id());
    assert_eq!(42.5, newer.soil_moisture());
    assert_eq!(300.0, newer.luminosity());
    assert!(newer.pump_state());

    // read
    let recent = reading::get_recent(&mut conn, 10).await.unwrap();
    assert_eq!(vec![newer.clone(), older], recent);
    assert_eq!(2, reading::count(&mut conn).await.unwrap());

    let limited = reading::get_recent(&mut conn, 1).await.unwrap();
    assert_eq!(vec![newer], limited);
}

#[tokio::test]
async fn crud_configuration() {
    let pool = prepared_connection().await;
    let mut conn = pool.acquire().await.unwrap();

    // read
    let config = configuration::get(&mut conn).await.unwrap().unwrap();
    assert_eq!(Configuration::default(), config);

    // update
    configuration::update(&mut conn, &ConfigUpdate::Mode(ControlMode::Manual))
        .await
        .unwrap();
    configuration::update(&mut conn, &ConfigUpdate::Setpoint(25.0))
        .await
        .unwrap();
    let updated = configuration::update(&mut conn, &ConfigUpdate::ManualCommand(true))
        .await
        .unwrap();
    let expected = Configuration {
        mode: ControlMode::Manual,
        moisture_setpoint: 25.0,
        manual_pump_command: true,
    };
    assert_eq!(expected, updated);
    assert_eq!(
        expected,
        configuration::get(&mut conn).await.unwrap().unwrap()
    );

    // a second seed keeps the current row
    configuration::insert_default(&mut conn).await.unwrap();
    assert_eq!(
        expected,
        configuration::get(&mut conn).await.unwrap().unwrap()
    );

    // absent
    sqlx::query("DELETE FROM configuracao")
        .execute(&mut *conn)
        .await
        .unwrap();
    assert!(configuration::get(&mut conn).await.unwrap().is_none());
    assert!(matches!(
        configuration::update(&mut conn, &ConfigUpdate::Setpoint(10.0)).await,
        Err(DBError::ConfigurationNotFound)
    ));
}

#[tokio::test]
async fn test_corrupt_mode() {
    let pool = prepared_connection().await;
    let mut conn = pool.acquire().await.unwrap();
    sqlx::query("UPDATE configuracao SET modo = 'TURBO'")
        .execute(&mut *conn)
        .await
        .unwrap();

    assert!(matches!(
        configuration::get(&mut conn).await,
        Err(DBError::Corrupt(_))
    ));
}
