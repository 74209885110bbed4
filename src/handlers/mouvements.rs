use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::AppState;
use crate::{
    db::models::{MouvementPayload, MouvementStock},
    error::ServiceError,
    services::StockService,
};

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct LotFilter {
    pub lot_id: Option<i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/mouvements", get(list_mouvements).post(create_mouvement))
        .route(
            "/mouvements/:id",
            get(get_mouvement)
                .put(update_mouvement)
                .delete(delete_mouvement),
        )
}

async fn create_mouvement(
    State(stock): State<StockService>,
    Json(payload): Json<MouvementPayload>,
) -> Result<Json<MouvementStock>, ServiceError> {
    Ok(Json(stock.create_mouvement(payload).await?))
}

async fn list_mouvements(
    State(stock): State<StockService>,
    Query(filter): Query<LotFilter>,
) -> Result<Json<Vec<MouvementStock>>, ServiceError> {
    log::info!("Listing mouvements (lot {:?})", filter.lot_id);
    Ok(Json(stock.list_mouvements(filter.lot_id).await?))
}

async fn get_mouvement(
    State(stock): State<StockService>,
    Path(id): Path<i64>,
) -> Result<Json<MouvementStock>, ServiceError> {
    Ok(Json(stock.get_mouvement(id).await?))
}

async fn update_mouvement(
    State(stock): State<StockService>,
    Path(id): Path<i64>,
    Json(payload): Json<MouvementPayload>,
) -> Result<Json<MouvementStock>, ServiceError> {
    let mouvement = stock.update_mouvement(id, payload).await?;
    log::info!("Updated mouvement {}", id);
    Ok(Json(mouvement))
}

async fn delete_mouvement(
    State(stock): State<StockService>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    stock.delete_mouvement(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::handlers::tests::{app, json, send, with_body, without_body};

    #[tokio::test]
    async fn movement_crud_on_a_lot() {
        let app = app().await;
        send(&app, with_body("POST", "/medicins", json!({"name": "Smecta"}))).await;
        send(
            &app,
            with_body(
                "POST",
                "/api/lots",
                json!({"numeroLot": "S1", "dateExpiration": "2026-01-01", "quantite": 10, "medicinId": 1}),
            ),
        )
        .await;

        let (status, body) = send(
            &app,
            with_body(
                "POST",
                "/mouvements",
                json!({
                    "motif": "vente comptoir",
                    "type": "SORTIE",
                    "lotId": 1,
                    "utilisateurId": 7,
                    "quantite": 2,
                    "dateMouvement": "2025-04-02T09:15:00"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let created = json(&body);
        assert_eq!(created["type"], "SORTIE");
        assert_eq!(created["dateMouvement"], "2025-04-02T09:15:00");

        let (status, body) = send(
            &app,
            with_body(
                "PUT",
                "/mouvements/1",
                json!({"motif": "retour", "type": "ENTREE", "lotId": 1, "utilisateurId": 7, "quantite": 2}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["type"], "ENTREE");
        assert_eq!(json(&body)["dateMouvement"], "2025-04-02T09:15:00");

        let (_, body) = send(&app, without_body("GET", "/mouvements?lotId=1")).await;
        assert_eq!(json(&body).as_array().unwrap().len(), 1);

        let (status, _) = send(&app, without_body("DELETE", "/mouvements/1")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, without_body("GET", "/mouvements/1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn movement_on_unknown_lot_is_404() {
        let app = app().await;

        let (status, body) = send(
            &app,
            with_body(
                "POST",
                "/mouvements",
                json!({"motif": "vente", "type": "SORTIE", "lotId": 4, "utilisateurId": 1, "quantite": 1}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["message"], "Lot non trouvé avec l'id 4");
    }

    #[tokio::test]
    async fn unknown_movement_type_is_rejected() {
        let app = app().await;

        let (status, _) = send(
            &app,
            with_body(
                "POST",
                "/mouvements",
                json!({"motif": "vente", "type": "VOL", "lotId": 1, "utilisateurId": 1, "quantite": 1}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
