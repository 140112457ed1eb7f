use actix_web::HttpResponse;

use crate::models::ApiResponse;

pub mod health;
pub mod interactions;
pub mod video;

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::message(false, "Route not found"))
}
