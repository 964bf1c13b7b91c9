use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub blocks_mined: u64,
    pub mining_attempts: u64,
    pub last_active_at: Option<DateTime<Utc>>,
}

/// A registered participant. Balance and stats change only through the ledger.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: String,
    pub name: Option<String>,
    pub address: String,
    pub public_key: String,
    /// Shown once at registration.
    pub mnemonic: String,
    pub balance: u64,
    pub stats: PlayerStats,
}

impl Player {
    /// Name for human-facing text, falling back to a short id.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Player {}", self.id.chars().take(8).collect::<String>()),
        }
    }
}
