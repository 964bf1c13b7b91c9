//! Read-only feeds for the AI explainer.

use actix_web::{HttpResponse, get, web};

use super::models::{AppState, EventsQuery, RecentEventsResponse};
use crate::blockchain::LedgerError;

#[get("/ai/recent_events")]
pub async fn recent_events(
    state: web::Data<AppState>,
    query: web::Query<EventsQuery>,
) -> HttpResponse {
    let ledger = state.ledger();
    HttpResponse::Ok().json(RecentEventsResponse {
        events: ledger.events().recent(query.limit),
        total_events: ledger.events().total(),
        chain_height: ledger.height(),
    })
}

#[get("/ai/player_stats/{player_id}")]
pub async fn player_stats(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, LedgerError> {
    let report = state.ledger().player_report(&path)?;
    Ok(HttpResponse::Ok().json(report))
}

#[get("/ai/chain_summary")]
pub async fn chain_summary(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.ledger().chain_summary())
}
