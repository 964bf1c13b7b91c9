use actix_web::{HttpResponse, get, post, web};

use super::models::{AppState, PendingResponse, PendingTx, TransferRequest, TransferResponse};
use crate::blockchain::LedgerError;
use crate::transaction::parse_amount;

/// Queue a transfer. It settles when someone mines the next block.
/// `signature` is stored as given; nothing verifies it.
#[post("/tx/transfer")]
pub async fn transfer(
    state: web::Data<AppState>,
    req: web::Json<TransferRequest>,
) -> Result<HttpResponse, LedgerError> {
    let req = req.into_inner();
    let amount = parse_amount(&req.amount)?;
    let tx = state.ledger().submit_transfer(
        &req.from_player_id,
        &req.to_player_id,
        amount,
        req.signature,
    )?;
    Ok(HttpResponse::Ok().json(TransferResponse::from(tx)))
}

#[get("/tx/pending")]
pub async fn pending(state: web::Data<AppState>) -> HttpResponse {
    let ledger = state.ledger();
    let transactions: Vec<PendingTx> = ledger
        .pool()
        .iter()
        .map(|t| PendingTx {
            id: t.id.clone(),
            from_player_id: t.from_player_id.clone(),
            to_player_id: t.to_player_id.clone(),
            amount: t.amount,
            status: t.status,
        })
        .collect();
    HttpResponse::Ok().json(PendingResponse {
        size: transactions.len(),
        transactions,
    })
}
