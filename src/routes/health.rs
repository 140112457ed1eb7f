use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

#[get("/api/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Server is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
