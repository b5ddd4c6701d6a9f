//! Health check endpoint.

use actix_web::{HttpResponse, web};
use memoir_core::Backend;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub backend: Backend,
    pub version: &'static str,
    pub timestamp: String,
}

/// Health check endpoint - returns server status and the backend serving posts.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "OK",
        message: "El-Memoir API is running",
        backend: state.posts.active_backend().await,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    HttpResponse::Ok().json(response)
}
