use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

use crate::blockchain::Ledger;
use crate::blockchain::snapshot::ChainSnapshot;
use crate::config::Config;
use crate::events::EventSummary;
use crate::transaction::{Transaction, TxStatus};

/// Shared application state: one ledger behind one lock.
pub struct AppState {
    pub ledger: Mutex<Ledger>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            ledger: Mutex::new(Ledger::from_config(&config)),
            config,
        }
    }

    pub fn with_ledger(config: Config, ledger: Ledger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            config,
        }
    }

    pub fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().expect("mutex poisoned")
    }
}

/* ---------- Game API Models ---------- */

#[derive(Deserialize, Default)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// Register under this id instead of a random one; 409 if taken.
    #[serde(default)]
    pub player_id: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub player_id: String,
    pub address: String,
    pub public_key: String,
    pub mnemonic: String,
    pub state: ChainSnapshot,
}

#[derive(Deserialize)]
pub struct MineRequest {
    pub player_id: String,
    /// Any signed 64-bit integer. JSON numbers outside `i64` (or fractional
    /// ones) fail to deserialize and get a 400.
    pub nonce: i64,
}

/* ---------- TX API Models ---------- */

#[derive(Deserialize)]
pub struct TransferRequest {
    pub from_player_id: String,
    pub to_player_id: String,
    /// Kept raw so non-integer amounts surface as a domain error.
    pub amount: serde_json::Value,
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Serialize)]
pub struct TransferResponse {
    pub tx_id: String,
    pub from_address: String,
    pub to_address: String,
    pub amount: u64,
    pub status: TxStatus,
}

impl From<Transaction> for TransferResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            tx_id: tx.id,
            from_address: tx.from_address,
            to_address: tx.to_address,
            amount: tx.amount,
            status: tx.status,
        }
    }
}

#[derive(Serialize)]
pub struct PendingTx {
    pub id: String,
    pub from_player_id: String,
    pub to_player_id: String,
    pub amount: u64,
    pub status: TxStatus,
}

#[derive(Serialize)]
pub struct PendingResponse {
    pub size: usize,
    pub transactions: Vec<PendingTx>,
}

/* ---------- Chain / AI API Models ---------- */

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub height: u64,
    pub difficulty: u64,
}

fn default_event_limit() -> usize {
    20
}

#[derive(Deserialize)]
pub struct EventsQuery {
    #[serde(default = "default_event_limit")]
    pub limit: usize,
}

#[derive(Serialize)]
pub struct RecentEventsResponse {
    pub events: Vec<EventSummary>,
    pub total_events: u64,
    pub chain_height: u64,
}
