use crate::error::ServiceError;
use crate::service::IrrigationService;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

mod config_routes;
mod dashboard_routes;
mod device_routes;
mod doc_routes;
mod metric_routes;
mod page_routes;

/// Device reports and operator changes are tiny
const MAX_BODY_BYTES: u64 = 4096;

pub fn routes(
    service: &Arc<IrrigationService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    page_routes::routes(service)
        .or(dashboard_routes::routes(service))
        .or(device_routes::routes(service))
        .or(config_routes::routes(service))
        .or(metric_routes::routes(service))
        .or(doc_routes::routes())
}

/// Serves until SIGINT, then drains the open requests
pub async fn dispatch_server(
    service: Arc<IrrigationService>,
    bind_addr: SocketAddr,
) -> Result<(), warp::Error> {
    let api = routes(&service)
        .recover(handle_rejection)
        .with(warp::trace::request());

    let (addr, server) =
        warp::serve(api).try_bind_with_graceful_shutdown(bind_addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed listening for shutdown signal: {}", e);
            }
            info!("Shutting down webserver");
        })?;

    info!("Starting webserver at: {}", addr);
    server.await;
    Ok(())
}

fn build_response<T: serde::Serialize>(
    resp: Result<T, ServiceError>,
) -> Result<warp::reply::Response, Rejection> {
    match resp {
        Ok(data) => Ok(warp::reply::json(&data).into_response()),
        Err(err) => Ok(error_response(&err)),
    }
}

fn error_response(err: &ServiceError) -> warp::reply::Response {
    let status = match err {
        ServiceError::User(err) => {
            warn!("{}", err);
            StatusCode::BAD_REQUEST
        }
        ServiceError::NotFound(err) => {
            warn!("{}", err);
            StatusCode::NOT_FOUND
        }
        ServiceError::Internal(err) => {
            error!("{}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    status_reply(status, err.to_string())
}

fn status_reply(status: StatusCode, message: String) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(&dto::StatusDto::error(message)), status)
        .into_response()
}

/// Turns warp's own rejections into the common error body
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(e) =
        err.find::<warp::filters::body::BodyDeserializeError>()
    {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large".to_owned())
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length required".to_owned())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected application/json".to_owned(),
        )
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_owned())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_owned())
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unhandled rejection".to_owned(),
        )
    };

    if status.is_client_error() {
        warn!("{}", message);
    }
    Ok(status_reply(status, message))
}

///
/// DTO
///
pub mod dto {
    use serde::{Deserialize, Serialize};
    use utoipa::ToSchema;

    pub const STATUS_OK: &str = "ok";
    pub const STATUS_ERROR: &str = "erro";

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct StatusDto {
        pub status: String,
        pub mensagem: String,
    }

    impl StatusDto {
        pub fn ok(mensagem: String) -> Self {
            StatusDto {
                status: STATUS_OK.to_owned(),
                mensagem,
            }
        }

        pub fn error(mensagem: String) -> Self {
            StatusDto {
                status: STATUS_ERROR.to_owned(),
                mensagem,
            }
        }
    }
}
