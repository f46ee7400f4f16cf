use super::{build_response, MAX_BODY_BYTES};
use crate::service::IrrigationService;
use irrigation_core::ReadingMessage;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    service: &Arc<IrrigationService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    ingest(service.clone())
}

/// POST /api/dados
///
/// The controller reports a reading
///
/// Returns the current configuration as `ControlMessage`, which the
/// controller applies until its next report
#[utoipa::path(
    post,
    path = "/api/dados",
    tag = "device",
    request_body = ReadingMessage,
    responses(
        (status = 200, description = "Configuration to follow", body = irrigation_core::ControlMessage),
        (status = 400, description = "Malformed reading", body = crate::rest::dto::StatusDto),
        (status = 404, description = "Configuration row missing", body = crate::rest::dto::StatusDto),
        (status = 500, description = "Storage failure", body = crate::rest::dto::StatusDto)
    )
)]
fn ingest(
    service: Arc<IrrigationService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::path!("api" / "dados"))
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and_then(
            |service: Arc<IrrigationService>, body: ReadingMessage| async move {
                let resp = service.ingest(body).await;
                build_response(resp)
            },
        )
        .boxed()
}
