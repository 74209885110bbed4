use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::AppState;
use crate::{
    db::models::{Medicin, MedicinPayload},
    error::ServiceError,
    services::MedicinService,
};

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct OwnerFilter {
    pub user_id: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/medicins", get(list_medicins).post(create_medicin))
        .route("/medicins/low-stock", get(low_stock_medicins))
        .route(
            "/medicins/:id",
            get(get_medicin).put(update_medicin).delete(delete_medicin),
        )
}

async fn create_medicin(
    State(service): State<MedicinService>,
    Json(payload): Json<MedicinPayload>,
) -> Result<Json<Medicin>, ServiceError> {
    let medicin = service.create(payload).await?;
    log::info!("Created medicin {} for user {:?}", medicin.id, medicin.user_id);
    Ok(Json(medicin))
}

async fn update_medicin(
    State(service): State<MedicinService>,
    Path(id): Path<i64>,
    Json(payload): Json<MedicinPayload>,
) -> Result<Json<Medicin>, ServiceError> {
    let medicin = service.update(id, payload).await?;
    log::info!("Updated medicin {}", id);
    Ok(Json(medicin))
}

async fn delete_medicin(
    State(service): State<MedicinService>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    service.delete(id).await?;
    log::info!("Delete requested for medicin {}", id);
    Ok(StatusCode::OK)
}

async fn list_medicins(
    State(service): State<MedicinService>,
    Query(filter): Query<OwnerFilter>,
) -> Result<Json<Vec<Medicin>>, ServiceError> {
    log::info!("Listing medicins (user {:?})", filter.user_id);
    Ok(Json(service.list(filter.user_id.as_deref()).await?))
}

/// Unknown ids answer `200` with an empty body rather than an error.
async fn get_medicin(
    State(service): State<MedicinService>,
    Path(id): Path<i64>,
) -> Result<Response, ServiceError> {
    let response = match service.get(id).await? {
        Some(medicin) => Json(medicin).into_response(),
        None => StatusCode::OK.into_response(),
    };
    Ok(response)
}

async fn low_stock_medicins(
    State(service): State<MedicinService>,
    Query(filter): Query<OwnerFilter>,
) -> Result<Json<Vec<Medicin>>, ServiceError> {
    log::info!("Listing low-stock medicins (user {:?})", filter.user_id);
    Ok(Json(service.low_stock(filter.user_id.as_deref()).await?))
}
