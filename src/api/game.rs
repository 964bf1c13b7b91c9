use actix_web::{HttpResponse, get, post, web};
use log::debug;

use super::models::{AppState, MineRequest, RegisterRequest, RegisterResponse};
use crate::blockchain::LedgerError;

/// Create a player and hand back its one-time credentials.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    body: Option<web::Json<RegisterRequest>>,
) -> Result<HttpResponse, LedgerError> {
    let req = body.map(web::Json::into_inner).unwrap_or_default();
    let mut ledger = state.ledger();
    let player = match req.player_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => ledger.register_with_id(id.trim(), req.name)?,
        None => ledger.register(req.name)?,
    };
    let snapshot = ledger.snapshot(Some(&player.id));
    Ok(HttpResponse::Ok().json(RegisterResponse {
        player_id: player.id,
        address: player.address,
        public_key: player.public_key,
        mnemonic: player.mnemonic,
        state: snapshot,
    }))
}

/// One mining attempt. Losing is a normal 200 response with `success: false`.
#[post("/mine")]
pub async fn mine(
    state: web::Data<AppState>,
    req: web::Json<MineRequest>,
) -> Result<HttpResponse, LedgerError> {
    let outcome = state.ledger().attempt_mine(&req.player_id, req.nonce)?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Accepts a player id or a `BABY...` address.
#[get("/state/{player_id}")]
pub async fn player_state(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, LedgerError> {
    let key = path.into_inner();
    let ledger = state.ledger();
    let players = ledger.players();
    let player_id = players
        .get(&key)
        .or_else(|e| players.get_by_address(&key).ok_or(e))?
        .id
        .clone();
    debug!("STATE - snapshot for {player_id}");
    Ok(HttpResponse::Ok().json(ledger.snapshot(Some(&player_id))))
}

#[get("/state")]
pub async fn chain_state(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.ledger().snapshot(None))
}
