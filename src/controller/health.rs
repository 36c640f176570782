use actix_web::{get, HttpResponse};
use serde_json::json;

#[get("/health")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
