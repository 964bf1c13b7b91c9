use actix_web::{HttpResponse, Responder, get, web};
use serde_json::json;

use super::models::AppState;

#[get("/")]
pub async fn root(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": "BabyBTC",
        "status": "running",
        "difficulty": state.config.difficulty,
        "block_reward": state.config.block_reward,
        "warning": "Toy blockchain for learning. Tokens have no value.",
    }))
}

/// 503 once the ledger has halted on an invariant violation.
#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    if state.ledger().is_halted() {
        return HttpResponse::ServiceUnavailable().json(json!({ "status": "halted" }));
    }
    HttpResponse::Ok().json(json!({ "status": "healthy" }))
}
