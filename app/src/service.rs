use crate::config::Config;
use crate::error::{DBError, ServiceError};
use crate::models::reading::SensorReadingDao;
use crate::store::Store;
use chrono_tz::Tz;
use irrigation_core::{ConfigUpdate, Configuration, ControlMessage, ReadingMessage};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything the dashboard shows, readings newest first
pub struct Dashboard {
    pub readings: Vec<SensorReadingDao>,
    pub configuration: Configuration,
    pub timezone: Tz,
}

impl Dashboard {
    /// Moisture series in chronological order
    pub fn moisture_series(&self) -> Vec<f64> {
        self.readings
            .iter()
            .rev()
            .map(SensorReadingDao::soil_moisture)
            .collect()
    }

    /// Luminosity series in chronological order
    pub fn luminosity_series(&self) -> Vec<f64> {
        self.readings
            .iter()
            .rev()
            .map(SensorReadingDao::luminosity)
            .collect()
    }

    pub fn latest(&self) -> Option<&SensorReadingDao> {
        self.readings.first()
    }
}

/// `reading_count` is `None` when the database could not be read
pub struct Health {
    pub healthy: bool,
    pub database_state: String,
    pub reading_count: Option<i64>,
}

pub struct IrrigationService {
    store: Store,
    readings_limit: i64,
    timezone: Tz,
    template_dir: PathBuf,
}

impl Debug for IrrigationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IrrigationService").finish()
    }
}

impl IrrigationService {
    pub fn new(store: Store, config: &Config) -> Arc<Self> {
        Arc::new(IrrigationService {
            store,
            readings_limit: config.readings_limit(),
            timezone: config.timezone(),
            template_dir: config.template_dir().to_owned(),
        })
    }

    #[cfg(test)]
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Latest readings plus the configuration
    ///
    /// A missing configuration row is replaced by the defaults for display,
    /// nothing gets written.
    #[tracing::instrument]
    pub async fn dashboard(&self) -> Result<Dashboard, ServiceError> {
        let readings = self.store.recent_readings(self.readings_limit).await?;
        let configuration = match self.store.configuration().await? {
            Some(config) => config,
            None => {
                warn!("Configuration row missing, showing defaults");
                Configuration::default()
            }
        };

        debug!(readings = readings.len(), "Fetched dashboard");
        Ok(Dashboard {
            readings,
            configuration,
            timezone: self.timezone,
        })
    }

    /// Persists the reading and answers with the configuration to follow
    #[tracing::instrument]
    pub async fn ingest(&self, msg: ReadingMessage) -> Result<ControlMessage, ServiceError> {
        self.store.insert_reading(msg).await?;
        let config = self
            .store
            .configuration()
            .await?
            .ok_or(DBError::ConfigurationNotFound)?;
        Ok(config.control_message())
    }

    #[tracing::instrument]
    pub async fn update_configuration(
        &self,
        update: ConfigUpdate,
    ) -> Result<Configuration, ServiceError> {
        Ok(self.store.update_configuration(&update).await?)
    }

    pub async fn health(&self) -> Health {
        let checked = match self.store.check_db().await {
            Ok(()) => self.store.reading_count().await,
            Err(e) => Err(e),
        };

        match checked {
            Ok(reading_count) => Health {
                healthy: true,
                database_state: "ok".to_owned(),
                reading_count: Some(reading_count),
            },
            Err(e) => {
                warn!("Health check failed: {}", e);
                Health {
                    healthy: false,
                    database_state: e.to_string(),
                    reading_count: None,
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::models::establish_test_connection;
    use irrigation_core::ControlMode;

    pub(crate) async fn build_mocked_service(config: &Config) -> Arc<IrrigationService> {
        let store = Store::new(establish_test_connection().await);
        store.ensure_initialized().await.unwrap();
        IrrigationService::new(store, config)
    }

    pub(crate) async fn remove_configuration(service: &IrrigationService) {
        sqlx::query("DELETE FROM configuracao")
            .execute(service.store().db_conn())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dashboard_series_are_chronological() {
        // prepare
        let service = build_mocked_service(&Config::default()).await;
        for i in 1..=3 {
            service
                .ingest(ReadingMessage::new(i as f64 * 10.0, i as f64, false))
                .await
                .unwrap();
        }

        // execute
        let dashboard = service.dashboard().await.unwrap();

        // validate
        assert_eq!(vec![10.0, 20.0, 30.0], dashboard.moisture_series());
        assert_eq!(vec![1.0, 2.0, 3.0], dashboard.luminosity_series());
        assert_eq!(30.0, dashboard.latest().unwrap().soil_moisture());
    }

    #[tokio::test]
    async fn test_dashboard_limit() {
        // prepare
        let service = build_mocked_service(&Config::default().with_readings_limit(2)).await;
        for i in 0..4 {
            service
                .ingest(ReadingMessage::new(i as f64, 0.0, false))
                .await
                .unwrap();
        }

        // execute
        let dashboard = service.dashboard().await.unwrap();

        // validate
        assert_eq!(vec![2.0, 3.0], dashboard.moisture_series());
    }

    #[tokio::test]
    async fn test_dashboard_defaults_without_configuration() {
        // prepare
        let service = build_mocked_service(&Config::default()).await;
        remove_configuration(&service).await;

        // execute
        let dashboard = service.dashboard().await.unwrap();

        // validate
        assert_eq!(Configuration::default(), dashboard.configuration);
        assert!(service.store().configuration().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ingest_returns_configuration() {
        // prepare
        let service = build_mocked_service(&Config::default()).await;
        service
            .update_configuration(ConfigUpdate::Mode(ControlMode::Manual))
            .await
            .unwrap();
        service
            .update_configuration(ConfigUpdate::ManualCommand(true))
            .await
            .unwrap();

        // execute
        let msg = service
            .ingest(ReadingMessage::new(42.5, 300.0, true))
            .await
            .unwrap();

        // validate
        assert_eq!(ControlMode::Manual, msg.mode);
        assert_eq!(60.0, msg.setpoint);
        assert_eq!(1, msg.manual_command);
    }

    #[tokio::test]
    async fn test_ingest_without_configuration() {
        // prepare
        let service = build_mocked_service(&Config::default()).await;
        remove_configuration(&service).await;

        // execute
        let res = service.ingest(ReadingMessage::new(1.0, 1.0, false)).await;

        // validate
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_health() {
        // prepare
        let service = build_mocked_service(&Config::default()).await;
        service
            .ingest(ReadingMessage::new(1.0, 1.0, false))
            .await
            .unwrap();

        // execute
        let health = service.health().await;

        // validate
        assert!(health.healthy);
        assert_eq!("ok", health.database_state);
        assert_eq!(Some(1), health.reading_count);
    }

    #[tokio::test]
    async fn test_health_with_broken_database() {
        // prepare
        let service = build_mocked_service(&Config::default()).await;
        sqlx::query("DROP TABLE leituras_sensores")
            .execute(service.store().db_conn())
            .await
            .unwrap();

        // execute
        let health = service.health().await;

        // validate
        assert!(!health.healthy);
        assert_ne!("ok", health.database_state);
        assert_eq!(None, health.reading_count);
    }
}
