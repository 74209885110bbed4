use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Médicament non trouvé avec l'id {0}")]
    MedicinNotFound(i64),
    #[error("{entity} non trouvé avec l'id {id}")]
    NotFound { entity: &'static str, id: i64 },
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    fn status(&self) -> StatusCode {
        match self {
            // Medicine updates have always answered 500 for unknown ids.
            ServiceError::MedicinNotFound(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::warn!("Request rejected: {}", self);
        }

        let body = json!({
            "status": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}
