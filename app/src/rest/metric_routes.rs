use super::build_response;
use crate::service::IrrigationService;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    service: &Arc<IrrigationService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    health(service.clone())
}

/// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "metric",
    responses((status = 200, description = "Service state", body = HealthyDto))
)]
fn health(
    service: Arc<IrrigationService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::path!("api" / "health"))
        .and(warp::get())
        .and_then(|service: Arc<IrrigationService>| async move {
            let health = service.health().await;
            let ret = dto::HealthyDto {
                healthy: health.healthy,
                database_state: health.database_state,
                reading_count: health.reading_count,
            };
            build_response(Ok(ret))
        })
        .boxed()
}

pub use dto::HealthyDto;

pub mod dto {
    use serde::{Deserialize, Serialize};
    use utoipa::ToSchema;

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct HealthyDto {
        pub healthy: bool,
        pub database_state: String,
        pub reading_count: Option<i64>,
    }
}
