pub mod block;
pub mod error;
pub mod mining;
pub mod model;
pub mod snapshot;

pub use block::Block;
pub use error::LedgerError;
pub use model::Ledger;

/// Puzzle scores are normalized into `0..HASH_MODULO`.
pub const HASH_MODULO: u64 = 1_000_000;

/// Default threshold a score must fall below (~40% of nonces win).
pub const DEFAULT_DIFFICULTY: u64 = 400_000;

/// BABY tokens credited to the miner of each block.
pub const BASE_REWARD: u64 = 10;

/// Largest accepted block reward.
pub const MAX_BLOCK_REWARD: u64 = 1_000_000_000;

/// `prev_hash` of the genesis block.
pub const GENESIS_PREV_HASH: &str = "0";

/// Merkle root of a block with no transactions.
pub const EMPTY_MERKLE_ROOT: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Miner id recorded on the genesis block.
pub const SYSTEM_MINER_ID: &str = "system";

/// Render timestamps the same way everywhere they are hashed or displayed.
pub fn format_timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
