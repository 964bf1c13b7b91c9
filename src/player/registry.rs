use chrono::{DateTime, Utc};
use log::debug;
use rand::RngCore;
use std::collections::HashMap;

use super::model::{Player, PlayerStats};
use crate::blockchain::LedgerError;
use crate::blockchain::error::Result;
use crate::wallet::create_credentials;

/// In-memory player directory, keyed by id with an address index.
/// The random source is injected so tests can seed it.
pub struct PlayerRegistry {
    players: HashMap<String, Player>,
    by_address: HashMap<String, String>,
    /// Registration order, for stable listings.
    order: Vec<String>,
    rng: Box<dyn RngCore + Send>,
}

impl PlayerRegistry {
    pub fn new(rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            players: HashMap::new(),
            by_address: HashMap::new(),
            order: Vec::new(),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Players in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.order.iter().filter_map(|id| self.players.get(id))
    }

    /// Register with a fresh random id.
    pub fn register(&mut self, name: Option<String>) -> Player {
        let id = loop {
            let candidate = format!("{:08x}", self.rng.next_u32());
            if !self.contains(&candidate) {
                break candidate;
            }
        };
        self.insert(id, name)
    }

    /// Register under a caller-chosen id.
    pub fn register_with_id(&mut self, id: &str, name: Option<String>) -> Result<Player> {
        if self.contains(id) {
            return Err(LedgerError::DuplicateRegistration(id.to_string()));
        }
        Ok(self.insert(id.to_string(), name))
    }

    fn insert(&mut self, id: String, name: Option<String>) -> Player {
        let creds = loop {
            let creds = create_credentials(self.rng.as_mut());
            if !self.by_address.contains_key(&creds.address) {
                break creds;
            }
        };

        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("miner-{}", id.chars().take(4).collect::<String>()));

        let player = Player {
            id: id.clone(),
            name: Some(name),
            address: creds.address,
            public_key: creds.public_key,
            mnemonic: creds.mnemonic,
            balance: 0,
            stats: PlayerStats::default(),
        };

        self.by_address.insert(player.address.clone(), id.clone());
        self.order.push(id.clone());
        self.players.insert(id, player.clone());
        debug!(
            "REGISTRY - added {} ({}), size={}",
            player.id,
            player.address,
            self.players.len()
        );
        player
    }

    pub fn get(&self, id: &str) -> Result<&Player> {
        self.players
            .get(id)
            .ok_or_else(|| LedgerError::UnknownPlayer(id.to_string()))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Player> {
        self.players
            .get_mut(id)
            .ok_or_else(|| LedgerError::UnknownPlayer(id.to_string()))
    }

    pub fn get_by_address(&self, address: &str) -> Option<&Player> {
        self.by_address
            .get(address)
            .and_then(|id| self.players.get(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.players.contains_key(id)
    }

    pub fn balance(&self, id: &str) -> Result<u64> {
        Ok(self.get(id)?.balance)
    }

    /* ---- mutations below are driven by the ledger only ---- */

    pub(crate) fn record_attempt(&mut self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let player = self.get_mut(id)?;
        player.stats.mining_attempts += 1;
        player.stats.last_active_at = Some(at);
        Ok(())
    }

    pub(crate) fn record_block_mined(&mut self, id: &str) -> Result<()> {
        self.get_mut(id)?.stats.blocks_mined += 1;
        Ok(())
    }

    pub(crate) fn credit(&mut self, id: &str, amount: u64) -> Result<()> {
        let player = self.get_mut(id)?;
        player.balance = player.balance.checked_add(amount).ok_or_else(|| {
            LedgerError::InternalInvariantViolation(format!("balance overflow for {id}"))
        })?;
        Ok(())
    }

    /// Move `amount` from one player to another. Nothing changes unless both
    /// players exist and the sender can cover it.
    pub(crate) fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<()> {
        let available = self.balance(from)?;
        let to_balance = self.balance(to)?;
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                available,
                requested: amount,
            });
        }
        if to_balance.checked_add(amount).is_none() {
            return Err(LedgerError::InternalInvariantViolation(format!(
                "balance overflow for {to}"
            )));
        }
        self.get_mut(from)?.balance -= amount;
        self.get_mut(to)?.balance += amount;
        Ok(())
    }
}
