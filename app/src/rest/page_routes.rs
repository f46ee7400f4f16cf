use super::dashboard_routes::dto::{format_time, ConfigurationDto};
use crate::error::ServiceError;
use crate::service::{Dashboard, IrrigationService};
use askama::Template;
use std::sync::Arc;
use tracing::error;
use warp::http::StatusCode;
use warp::{Filter, Reply};

const GROUP_PAGE: &str = "grupo.html";

pub fn routes(
    service: &Arc<IrrigationService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    dashboard_page(service.clone()).or(group_page(service))
}

/// GET /
///
/// Renders the dashboard page with the latest readings
fn dashboard_page(
    service: Arc<IrrigationService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::path::end())
        .and(warp::get())
        .and_then(|service: Arc<IrrigationService>| async move {
            let reply = match render_dashboard(&service).await {
                Ok(html) => warp::reply::html(html).into_response(),
                Err(e) => {
                    error!("Failed rendering dashboard: {}", e);
                    warp::reply::with_status(
                        format!("Ocorreu um erro ao carregar o dashboard: {}", e),
                        StatusCode::INTERNAL_SERVER_ERROR,
                    )
                    .into_response()
                }
            };
            Ok::<_, warp::Rejection>(reply)
        })
        .boxed()
}

/// GET /grupo/
///
/// Static page, served from the template directory
fn group_page(
    service: &Arc<IrrigationService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path("grupo")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::fs::file(service.template_dir().join(GROUP_PAGE)))
        .boxed()
}

async fn render_dashboard(service: &IrrigationService) -> Result<String, ServiceError> {
    let dashboard = service.dashboard().await?;
    dto::DashboardPageDto::from(&dashboard)
        .render()
        .map_err(|e| ServiceError::Internal(Box::from(e)))
}

///
/// DTO
///
mod dto {
    use super::*;

    pub struct ReadingDto {
        pub id: i64,
        pub umidade_solo: f64,
        pub luminosidade: f64,
        pub estado_bomba: bool,
        pub data_hora: String,
    }

    #[derive(Template)]
    #[template(path = "index.html")]
    pub struct DashboardPageDto {
        pub resultados: Vec<ReadingDto>,
        pub config: ConfigurationDto,
        pub vl_umid_solo: Vec<f64>,
        pub vl_luz: Vec<f64>,
    }

    impl From<&Dashboard> for DashboardPageDto {
        fn from(dashboard: &Dashboard) -> Self {
            let resultados = dashboard
                .readings
                .iter()
                .map(|reading| ReadingDto {
                    id: reading.id(),
                    umidade_solo: reading.soil_moisture(),
                    luminosidade: reading.luminosity(),
                    estado_bomba: reading.pump_state(),
                    data_hora: format_time(dashboard, reading),
                })
                .collect();

            DashboardPageDto {
                resultados,
                config: ConfigurationDto::from(&dashboard.configuration),
                vl_umid_solo: dashboard.moisture_series(),
                vl_luz: dashboard.luminosity_series(),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::rest::handle_rejection;
    use crate::service::test::{build_mocked_service, remove_configuration};
    use irrigation_core::ReadingMessage;

    #[tokio::test]
    async fn test_dashboard_page() {
        // Prepare
        let service = build_mocked_service(&Config::default()).await;
        for (moisture, light, pump) in [(30.0, 100.0, false), (40.0, 200.0, true)] {
            service
                .ingest(ReadingMessage::new(moisture, light, pump))
                .await
                .unwrap();
        }
        remove_configuration(&service).await;
        let routes = routes(&service).recover(handle_rejection);

        // Execute
        let res = warp::test::request().path("/").reply(&routes).await;

        // Validate
        assert_eq!(200, res.status());
        let body = std::str::from_utf8(res.body()).unwrap();
        assert!(body.contains("var vlUmidSolo = [30,40];"));
        assert!(body.contains("var vlLuz = [100,200];"));
        assert!(body.contains(r#"modo: "AUTOMATICO""#));
        assert!(body.contains("setpoint_umidade: 60,"));

        // table rows newest first
        let newest = body.find("<td>40.0</td>").unwrap();
        let oldest = body.find("<td>30.0</td>").unwrap();
        assert!(newest < oldest);
        assert!(body.contains("<td>Ligada</td>"));
        assert!(body.contains("<td>Desligada</td>"));
        assert!(service.store().configuration().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dashboard_page_storage_failure() {
        // Prepare
        let service = build_mocked_service(&Config::default()).await;
        sqlx::query("DROP TABLE leituras_sensores")
            .execute(service.store().db_conn())
            .await
            .unwrap();
        let routes = routes(&service).recover(handle_rejection);

        // Execute
        let res = warp::test::request().path("/").reply(&routes).await;

        // Validate
        assert_eq!(500, res.status());
        let body = std::str::from_utf8(res.body()).unwrap();
        assert!(body.starts_with("Ocorreu um erro ao carregar o dashboard"));
    }

    #[tokio::test]
    async fn test_group_page() {
        // Prepare
        let dir = std::env::temp_dir().join(format!(
            "irrigation-templates-group-{}",
            std::process::id()
        ));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join(GROUP_PAGE), "<h1>Grupo</h1>")
            .await
            .unwrap();
        let service = build_mocked_service(&Config::default().with_template_dir(dir)).await;
        let routes = routes(&service).recover(handle_rejection);

        // Execute
        let res = warp::test::request().path("/grupo/").reply(&routes).await;

        // Validate
        assert_eq!(200, res.status());
        assert_eq!("<h1>Grupo</h1>", std::str::from_utf8(res.body()).unwrap());
    }
}
