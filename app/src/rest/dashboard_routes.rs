use super::build_response;
use crate::service::IrrigationService;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    service: &Arc<IrrigationService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    dashboard_data(service.clone())
}

/// GET /api/dashboard-data
///
/// Polled by the dashboard page
///
/// Returns a `DashboardDataDto` with the chart series in chronological
/// order, the newest reading for the status cards and the configuration
#[utoipa::path(
    get,
    path = "/api/dashboard-data",
    tag = "dashboard",
    responses(
        (status = 200, description = "Dashboard snapshot", body = DashboardDataDto),
        (status = 500, description = "Storage failure", body = crate::rest::dto::StatusDto)
    )
)]
fn dashboard_data(
    service: Arc<IrrigationService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::path!("api" / "dashboard-data"))
        .and(warp::get())
        .and_then(|service: Arc<IrrigationService>| async move {
            let resp = service
                .dashboard()
                .await
                .map(|dashboard| dto::DashboardDataDto::from(&dashboard));
            build_response(resp)
        })
        .boxed()
}

pub use dto::DashboardDataDto;

///
/// DTO
///
pub mod dto {
    use crate::models::reading::SensorReadingDao;
    use crate::rest::dto::STATUS_OK;
    use crate::service::Dashboard;
    use irrigation_core::{Configuration, ControlMode};
    use serde::{Deserialize, Serialize};
    use utoipa::ToSchema;

    const TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct DashboardDataDto {
        pub status: String,
        pub grafico_umidade: Vec<f64>,
        pub grafico_luz: Vec<f64>,
        pub status_recente: RecentStatusDto,
        pub configuracao: ConfigurationDto,
    }

    /// Empty object while no reading exists
    #[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
    pub struct RecentStatusDto {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub umidade_solo: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub luminosidade: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub data_hora: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
    pub struct ConfigurationDto {
        pub modo: ControlMode,
        pub setpoint_umidade: f64,
        pub comando_manual_bomba: bool,
    }

    impl From<&Configuration> for ConfigurationDto {
        fn from(config: &Configuration) -> Self {
            ConfigurationDto {
                modo: config.mode,
                setpoint_umidade: config.moisture_setpoint,
                comando_manual_bomba: config.manual_pump_command,
            }
        }
    }

    /// Reading time in the display timezone
    pub fn format_time(dashboard: &Dashboard, reading: &SensorReadingDao) -> String {
        reading
            .time(&dashboard.timezone)
            .format(TIME_FORMAT)
            .to_string()
    }

    impl From<&Dashboard> for DashboardDataDto {
        fn from(dashboard: &Dashboard) -> Self {
            let status_recente = match dashboard.latest() {
                Some(reading) => RecentStatusDto {
                    umidade_solo: Some(format!("{:.1}", reading.soil_moisture())),
                    luminosidade: Some(format!("{:.0}", reading.luminosity())),
                    data_hora: Some(format_time(dashboard, reading)),
                },
                None => RecentStatusDto::default(),
            };

            DashboardDataDto {
                status: STATUS_OK.to_owned(),
                grafico_umidade: dashboard.moisture_series(),
                grafico_luz: dashboard.luminosity_series(),
                status_recente,
                configuracao: ConfigurationDto::from(&dashboard.configuration),
            }
        }
    }
}
