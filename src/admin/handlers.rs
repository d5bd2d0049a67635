use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::admin::error::AdminError;
use crate::http::server::AppState;
use crate::store::{EndpointDefinition, EndpointInput};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub endpoints: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        endpoints: state.store.len(),
    })
}

pub async fn list_endpoints(State(state): State<AppState>) -> Json<Vec<EndpointDefinition>> {
    Json(state.store.list())
}

pub async fn get_endpoint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EndpointDefinition>, AdminError> {
    state.store.get(&id).map(Json).ok_or(AdminError::NotFound)
}

pub async fn create_endpoint(
    State(state): State<AppState>,
    payload: Result<Json<EndpointInput>, JsonRejection>,
) -> Result<(StatusCode, Json<EndpointDefinition>), AdminError> {
    let input = checked_input(payload)?;
    let created = state.store.create(input);

    tracing::info!(
        endpoint_id = %created.id,
        method = %created.method,
        path = %created.path_template,
        "Endpoint created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_endpoint(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EndpointInput>, JsonRejection>,
) -> Result<Json<EndpointDefinition>, AdminError> {
    let input = checked_input(payload)?;
    let updated = state.store.update(&id, input)?;

    tracing::info!(endpoint_id = %id, "Endpoint updated");
    Ok(Json(updated))
}

pub async fn delete_endpoint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AdminError> {
    state.store.delete(&id)?;

    tracing::info!(endpoint_id = %id, "Endpoint deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn checked_input(payload: Result<Json<EndpointInput>, JsonRejection>) -> Result<EndpointInput, AdminError> {
    let Json(input) = payload.map_err(|e| AdminError::BadRequest(e.body_text()))?;
    input.check().map_err(AdminError::Invalid)?;
    Ok(input)
}
