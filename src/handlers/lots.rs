use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use super::{medicins::OwnerFilter, AppState};
use crate::{
    db::models::{LotPayload, LotView},
    error::ServiceError,
    services::StockService,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/lots", get(list_lots).post(create_lot))
        .route("/api/lots/:id", get(get_lot))
}

async fn create_lot(
    State(stock): State<StockService>,
    Json(payload): Json<LotPayload>,
) -> Result<Json<LotView>, ServiceError> {
    let view = stock.create_lot(payload).await?;
    log::info!("Created lot {} for user {:?}", view.lot.id, view.lot.user_id);
    Ok(Json(view))
}

async fn list_lots(
    State(stock): State<StockService>,
    Query(filter): Query<OwnerFilter>,
) -> Result<Json<Vec<LotView>>, ServiceError> {
    log::info!("Listing lots (user {:?})", filter.user_id);
    Ok(Json(stock.list_lots(filter.user_id.as_deref()).await?))
}

async fn get_lot(
    State(stock): State<StockService>,
    Path(id): Path<i64>,
) -> Result<Json<LotView>, ServiceError> {
    Ok(Json(stock.get_lot(id).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::handlers::tests::{app, json, send, with_body, without_body};

    #[tokio::test]
    async fn create_accepts_form_strings_and_lists_by_owner() {
        let app = app().await;
        send(
            &app,
            with_body("POST", "/medicins", json!({"name": "Doliprane", "userId": "u1"})),
        )
        .await;

        let (status, body) = send(
            &app,
            with_body(
                "POST",
                "/api/lots",
                json!({
                    "numeroLot": "L-2025-01",
                    "dateExpiration": "2026-03-31",
                    "quantite": "40",
                    "medicinId": "1",
                    "userId": "u1"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let created = json(&body);
        assert_eq!(created["id"], 1);
        assert_eq!(created["quantite"], 40);
        assert_eq!(created["medicin"]["name"], "Doliprane");
        assert!(created["dateEntree"].is_string());

        let (_, body) = send(&app, without_body("GET", "/api/lots?userId=u1")).await;
        assert_eq!(json(&body).as_array().unwrap().len(), 1);
        let (_, body) = send(&app, without_body("GET", "/api/lots?userId=u2")).await;
        assert_eq!(json(&body), json!([]));
    }

    #[tokio::test]
    async fn unknown_medicine_or_lot_is_404() {
        let app = app().await;

        let (status, body) = send(
            &app,
            with_body(
                "POST",
                "/api/lots",
                json!({"numeroLot": "X", "dateExpiration": "2026-01-01", "quantite": 1, "medicinId": 9}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["message"], "Médicament non trouvé avec l'id 9");

        let (status, _) = send(&app, without_body("GET", "/api/lots/3")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
