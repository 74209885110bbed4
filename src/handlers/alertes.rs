use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::{medicins::OwnerFilter, AppState};
use crate::{
    db::models::{Alerte, AlertePayload},
    error::ServiceError,
    services::StockService,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/alertes", get(list_alertes).post(create_alerte))
        .route(
            "/alertes/:id",
            get(get_alerte).put(update_alerte).delete(delete_alerte),
        )
}

async fn create_alerte(
    State(stock): State<StockService>,
    Json(payload): Json<AlertePayload>,
) -> Result<Json<Alerte>, ServiceError> {
    Ok(Json(stock.create_alerte(payload).await?))
}

/// With `userId`, only alerts on that user's lots.
async fn list_alertes(
    State(stock): State<StockService>,
    Query(filter): Query<OwnerFilter>,
) -> Result<Json<Vec<Alerte>>, ServiceError> {
    log::info!("Listing alertes (user {:?})", filter.user_id);
    Ok(Json(stock.list_alertes(filter.user_id.as_deref()).await?))
}

async fn get_alerte(
    State(stock): State<StockService>,
    Path(id): Path<i64>,
) -> Result<Json<Alerte>, ServiceError> {
    Ok(Json(stock.get_alerte(id).await?))
}

async fn update_alerte(
    State(stock): State<StockService>,
    Path(id): Path<i64>,
    Json(payload): Json<AlertePayload>,
) -> Result<Json<Alerte>, ServiceError> {
    let alerte = stock.update_alerte(id, payload).await?;
    log::info!("Updated alerte {} (résolue: {})", id, alerte.est_resolue);
    Ok(Json(alerte))
}

async fn delete_alerte(
    State(stock): State<StockService>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    stock.delete_alerte(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::handlers::tests::{app, json, send, with_body, without_body};

    #[tokio::test]
    async fn alert_lifecycle_scoped_to_lot_owner() {
        let app = app().await;
        send(&app, with_body("POST", "/medicins", json!({"name": "Advil"}))).await;
        send(
            &app,
            with_body(
                "POST",
                "/api/lots",
                json!({"numeroLot": "A1", "dateExpiration": "2026-01-01", "quantite": 3, "medicinId": 1, "userId": "u1"}),
            ),
        )
        .await;

        let (status, body) = send(
            &app,
            with_body(
                "POST",
                "/alertes",
                json!({"type": "STOCK", "message": "Stock bas sur A1", "lotId": 1}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let created = json(&body);
        assert_eq!(created["estResolue"], false);
        assert!(created["dateAlerte"].is_string());

        let (_, body) = send(&app, without_body("GET", "/alertes?userId=u1")).await;
        assert_eq!(json(&body).as_array().unwrap().len(), 1);
        let (_, body) = send(&app, without_body("GET", "/alertes?userId=u2")).await;
        assert_eq!(json(&body), json!([]));

        let (status, body) = send(
            &app,
            with_body(
                "PUT",
                "/alertes/1",
                json!({"type": "STOCK", "message": "Stock bas sur A1", "estResolue": true, "lotId": 1}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["estResolue"], true);
        assert_eq!(json(&body)["dateAlerte"], created["dateAlerte"]);

        let (status, _) = send(&app, without_body("DELETE", "/alertes/1")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, without_body("DELETE", "/alertes/1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
