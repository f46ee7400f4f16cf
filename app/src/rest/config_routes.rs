use super::dto::StatusDto;
use super::{build_response, MAX_BODY_BYTES};
use crate::service::IrrigationService;
use irrigation_core::{ConfigUpdate, ConfigUpdateMessage};
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    service: &Arc<IrrigationService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    update_config(service.clone())
}

/// POST /api/config
///
/// The operator changes one configuration field
///
/// `chave` selects the field (`modo`, `setpoint` or `comando_manual`),
/// an unknown key or an unusable `valor` is answered with 400
#[utoipa::path(
    post,
    path = "/api/config",
    tag = "operator",
    request_body = ConfigUpdateMessage,
    responses(
        (status = 200, description = "Field updated", body = StatusDto),
        (status = 400, description = "Invalid key or value", body = StatusDto),
        (status = 404, description = "Configuration row missing", body = StatusDto),
        (status = 500, description = "Storage failure", body = StatusDto)
    )
)]
fn update_config(
    service: Arc<IrrigationService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::path!("api" / "config"))
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and_then(
            |service: Arc<IrrigationService>, body: ConfigUpdateMessage| async move {
                let resp = match ConfigUpdate::try_from(body) {
                    Ok(update) => {
                        let mensagem = format!("{} atualizado para {}", update.key(), update);
                        service
                            .update_configuration(update)
                            .await
                            .map(|_| StatusDto::ok(mensagem))
                    }
                    Err(e) => Err(e.into()),
                };
                build_response(resp)
            },
        )
        .boxed()
}
