//! HTTP surface.
//!
//! - `POST /medicins`, `GET /medicins?userId=`
//! - `GET|PUT|DELETE /medicins/:id`
//! - `GET /medicins/low-stock?userId=`
//! - `POST /api/lots`, `GET /api/lots?userId=`, `GET /api/lots/:id`
//! - `POST /mouvements`, `GET /mouvements?lotId=`, `GET|PUT|DELETE /mouvements/:id`
//! - `POST /alertes`, `GET /alertes?userId=`, `GET|PUT|DELETE /alertes/:id`
//! - `GET /api/historique`
//!
//! Stock routes accept a single configured origin; the audit log accepts any
//! origin.

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::services::{MedicinService, StockService};

pub mod alertes;
pub mod historique;
pub mod lots;
pub mod medicins;
pub mod mouvements;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub medicins: MedicinService,
    pub stock: StockService,
}

pub fn router(state: AppState, allowed_origin: HeaderValue) -> Router {
    let stock_routes = Router::new()
        .merge(medicins::routes())
        .merge(lots::routes())
        .merge(mouvements::routes())
        .merge(alertes::routes())
        .layer(stock_cors(allowed_origin));

    Router::new()
        .merge(stock_routes)
        .merge(historique::routes().layer(historique_cors()))
        .with_state(state)
}

fn stock_cors(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin([origin])
}

fn historique_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any)
        .allow_origin(Any)
}
