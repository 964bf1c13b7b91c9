mod ai;
mod chain;
mod error;
mod game;
mod health;
pub mod models;
mod tx;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .service(health::root)
        .service(health::health_check)
        .service(
            web::scope("/api")
                .service(game::register)
                .service(game::mine)
                .service(game::player_state)
                .service(game::chain_state)
                .service(tx::transfer)
                .service(tx::pending)
                .service(chain::validate_chain)
                .service(chain::chain_snapshot)
                .service(ai::recent_events)
                .service(ai::player_stats)
                .service(ai::chain_summary),
        );
}
