use axum::{extract::State, routing::get, Json, Router};

use super::AppState;
use crate::{db::models::HistoriqueMedicin, error::ServiceError, services::MedicinService};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/historique", get(list_historique))
}

async fn list_historique(
    State(service): State<MedicinService>,
) -> Result<Json<Vec<HistoriqueMedicin>>, ServiceError> {
    log::info!("Listing historique");
    Ok(Json(service.historique().await?))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::json;

    use crate::handlers::tests::{app, json, send};

    #[tokio::test]
    async fn lists_entries_for_deleted_medicines() {
        let app = app().await;
        send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/medicins")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"name": "Smecta", "userId": "u3"}).to_string()))
                .unwrap(),
        )
        .await;
        send(
            &app,
            Request::builder()
                .method("DELETE")
                .uri("/medicins/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        let (status, body) = send(
            &app,
            Request::builder()
                .uri("/api/historique")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let entries = json(&body);
        let entries = entries.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["action"], "Ajout");
        assert_eq!(entries[1]["action"], "Suppression");
        assert_eq!(entries[1]["medicinName"], "Smecta");
        assert_eq!(entries[1]["userId"], "u3");
        assert!(entries[1]["dateAction"].is_string());
    }
}
