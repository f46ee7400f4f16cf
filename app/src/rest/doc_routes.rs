use super::dashboard_routes::dto::{ConfigurationDto, DashboardDataDto, RecentStatusDto};
use super::dto::StatusDto;
use super::metric_routes::HealthyDto;
use super::{config_routes, dashboard_routes, device_routes, metric_routes};
use irrigation_core::{ConfigUpdateMessage, ControlMessage, ControlMode, ReadingMessage};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::Config;
use warp::Filter;
use warp::{
    http::Uri,
    hyper::{Response, StatusCode},
    path::{FullPath, Tail},
    Rejection, Reply,
};

const API_JSON_URL: &str = "/api/doc/api.json";

#[derive(OpenApi)]
#[openapi(
    paths(
        device_routes::ingest,
        config_routes::update_config,
        dashboard_routes::dashboard_data,
        metric_routes::health
    ),
    components(schemas(
        ReadingMessage,
        ControlMessage,
        ControlMode,
        ConfigUpdateMessage,
        StatusDto,
        DashboardDataDto,
        RecentStatusDto,
        ConfigurationDto,
        HealthyDto
    )),
    tags(
        (name = "device", description = "Reports from the field controller"),
        (name = "operator", description = "Configuration changes"),
        (name = "dashboard", description = "Data polled by the dashboard page"),
        (name = "metric", description = "Service state")
    )
)]
pub struct ApiDoc;

/// GET /api/doc/api.json and the swagger ui below /api/doc/
pub fn routes() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let config = Arc::new(Config::from(API_JSON_URL));

    warp::path!("api" / "doc" / "api.json")
        .and(warp::get())
        .map(|| warp::reply::json(&ApiDoc::openapi()))
        .or(warp::path("api")
            .and(warp::path("doc"))
            .and(warp::get())
            .and(warp::path::full())
            .and(warp::path::tail())
            .and(warp::any().map(move || config.clone()))
            .and_then(serve_swagger))
}

async fn serve_swagger(
    full_path: FullPath,
    tail: Tail,
    config: Arc<Config<'static>>,
) -> Result<Box<dyn Reply + 'static>, Rejection> {
    if full_path.as_str() == "/api/doc" {
        return Ok(Box::new(warp::redirect::found(Uri::from_static(
            "/api/doc/",
        ))));
    }

    let path = tail.as_str();
    match utoipa_swagger_ui::serve(path, config) {
        Ok(Some(file)) => Ok(Box::new(
            Response::builder()
                .header("Content-Type", file.content_type)
                .body(file.bytes),
        )),
        Ok(None) => Err(warp::reject::not_found()),
        Err(error) => Ok(Box::new(
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(error.to_string()),
        )),
    }
}
