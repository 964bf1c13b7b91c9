use actix_web::{HttpResponse, get, web};
use log::debug;

use super::models::{AppState, ValidateResponse};

/// Validate the whole chain.
#[get("/chain/validate")]
pub async fn validate_chain(state: web::Data<AppState>) -> HttpResponse {
    let ledger = state.ledger();
    HttpResponse::Ok().json(ValidateResponse {
        valid: ledger.is_valid_chain(),
        height: ledger.height(),
        difficulty: ledger.difficulty(),
    })
}

/// Dump every block, player and pending transfer.
#[get("/admin/chain_snapshot")]
pub async fn chain_snapshot(state: web::Data<AppState>) -> HttpResponse {
    let mut ledger = state.ledger();
    let dump = ledger.chain_dump();
    ledger.record_chain_snapshot();
    debug!(
        "ADMIN - chain snapshot: {} blocks, {} players",
        dump.blocks.len(),
        dump.players.len()
    );
    HttpResponse::Ok().json(dump)
}
