use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::configuration::ApplicationSettings;

/// GET /
pub async fn root(app: web::Data<ApplicationSettings>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": format!("Welcome to {}", app.name),
        "version": app.version,
    }))
}

/// GET /health
pub async fn health_check(app: web::Data<ApplicationSettings>) -> HttpResponse {
    tracing::debug!("Health check endpoint called");
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": app.version,
    }))
}
