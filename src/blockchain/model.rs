use chrono::Utc;
use log::{debug, error, info, warn};
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};

use super::error::Result;
use super::mining::{self, MiningDetails};
use super::{Block, GENESIS_PREV_HASH, HASH_MODULO, LedgerError, MAX_BLOCK_REWARD};
use crate::config::Config;
use crate::events::{EventKind, EventLog};
use crate::player::{Player, PlayerRegistry};
use crate::transaction::{Transaction, TransactionPool};

/// Result of one `attempt_mine` call. A miss is a normal outcome.
#[derive(Debug, Clone, Serialize)]
pub struct MineOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<u64>,
    pub message: String,
    pub details: MiningDetails,
}

/// The single authority over chain, balances and pending pool.
/// Callers serialize access (one `Mutex<Ledger>` per chain), which makes each
/// `&mut self` method one critical section.
pub struct Ledger {
    chain: Vec<Block>,
    difficulty: u64,
    reward: u64,
    recent_window: usize,
    players: PlayerRegistry,
    pool: TransactionPool,
    events: EventLog,
    minted: u64,
    halted: bool,
}

impl Ledger {
    /// Fresh chain holding only genesis.
    pub fn new(config: &Config, rng: Box<dyn RngCore + Send>) -> Self {
        let difficulty = config.difficulty.min(HASH_MODULO);
        Self {
            chain: vec![Block::genesis(difficulty)],
            difficulty,
            reward: config.block_reward.min(MAX_BLOCK_REWARD),
            recent_window: config.recent_blocks,
            players: PlayerRegistry::new(rng),
            pool: TransactionPool::new(),
            events: EventLog::new(config.event_capacity),
            minted: 0,
            halted: false,
        }
    }

    /// Ledger seeded from OS entropy.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config, Box::new(StdRng::from_entropy()))
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn tip(&self) -> &Block {
        self.chain
            .last()
            .expect("Ledger should always have at least the genesis block")
    }

    /// Index of the tip; 0 while only genesis exists.
    pub fn height(&self) -> u64 {
        self.tip().index
    }

    pub fn difficulty(&self) -> u64 {
        self.difficulty
    }

    pub fn reward(&self) -> u64 {
        self.reward
    }

    pub fn recent_window(&self) -> usize {
        self.recent_window
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    pub fn pool(&self) -> &TransactionPool {
        &self.pool
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn total_minted(&self) -> u64 {
        self.minted
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    fn ensure_live(&self) -> Result<()> {
        if self.halted {
            return Err(LedgerError::LedgerHalted);
        }
        Ok(())
    }

    fn halt(&mut self, reason: String) -> LedgerError {
        error!("LEDGER - {reason}; refusing further mutations");
        self.halted = true;
        LedgerError::InternalInvariantViolation(reason)
    }

    /* -------------------- Registration -------------------- */

    pub fn register(&mut self, name: Option<String>) -> Result<Player> {
        self.ensure_live()?;
        let player = self.players.register(name);
        self.on_registered(&player);
        Ok(player)
    }

    pub fn register_with_id(&mut self, id: &str, name: Option<String>) -> Result<Player> {
        self.ensure_live()?;
        let player = self.players.register_with_id(id, name)?;
        self.on_registered(&player);
        Ok(player)
    }

    fn on_registered(&mut self, player: &Player) {
        info!("REGISTER - {} as {}", player.id, player.address);
        self.events.record(
            EventKind::PlayerRegistered,
            Some(&player.id),
            json!({ "name": player.display_name(), "address": player.address }),
        );
    }

    /* -------------------- Transfers -------------------- */

    pub fn submit_transfer(
        &mut self,
        from_id: &str,
        to_id: &str,
        amount: u64,
        signature: Option<String>,
    ) -> Result<Transaction> {
        self.ensure_live()?;
        let tx = self
            .pool
            .submit(&self.players, from_id, to_id, amount, signature)?;

        let from_name = self.players.get(from_id)?.display_name();
        let to_name = self.players.get(to_id)?.display_name();
        info!(
            "TX - {} queued: {} -> {} amount={} (pool={})",
            tx.id,
            from_id,
            to_id,
            amount,
            self.pool.len()
        );
        self.events.record(
            EventKind::TxCreated,
            Some(from_id),
            json!({
                "tx_id": tx.id,
                "from_address": tx.from_address,
                "from_name": from_name,
                "to_address": tx.to_address,
                "to_name": to_name,
                "amount": tx.amount,
            }),
        );
        Ok(tx)
    }

    /* -------------------- Mining -------------------- */

    /// Evaluate `nonce` against the current tip and, if it wins, seal and
    /// settle the next block. The header is always built from the tip as it
    /// stands now, so an attempt that raced a winner is simply scored
    /// against the new tip.
    pub fn attempt_mine(&mut self, player_id: &str, nonce: i64) -> Result<MineOutcome> {
        self.ensure_live()?;
        let now = Utc::now();
        self.players.record_attempt(player_id, now)?;

        let (included, skipped) = self.select_settleable();
        let header = mining::build_header(self.tip(), &included, now, nonce);
        let eval = mining::evaluate(&header, self.difficulty);

        if !eval.solved {
            debug!(
                "MINER - {} missed #{} with nonce={} ({} >= {})",
                player_id, header.index, nonce, eval.score, eval.difficulty
            );
            return Ok(MineOutcome {
                success: false,
                block_index: None,
                reward: None,
                message: "Mining attempt failed. Try again with a different nonce.".to_string(),
                details: eval.details(),
            });
        }

        let mut block = Block::sealed(&eval, player_id.to_string(), self.reward, included);
        self.check_link(&block)?;

        // Every balance is bounded by the minted supply, so once this fits
        // no credit below can overflow.
        let Some(minted) = self.minted.checked_add(self.reward) else {
            return Err(self.halt(format!(
                "minting {} on top of {} overflows the supply",
                self.reward, self.minted
            )));
        };

        // Apply transfers in pool order, then the reward.
        for tx in block.transactions.iter_mut() {
            if let Err(e) =
                self.players
                    .transfer(&tx.from_player_id, &tx.to_player_id, tx.amount)
            {
                return Err(self.halt(format!("settling tx {} failed: {e}", tx.id)));
            }
            tx.confirm();
        }
        if let Err(e) = self.players.credit(player_id, self.reward) {
            return Err(self.halt(format!("crediting reward failed: {e}")));
        }
        self.minted = minted;
        self.players.record_block_mined(player_id)?;

        let confirmed: HashSet<String> = block.transactions.iter().map(|t| t.id.clone()).collect();
        self.pool.drain(&confirmed);

        for tx in &skipped {
            warn!(
                "MINER - tx {} left pending at #{}: sender {} can no longer cover {}",
                tx.id, block.index, tx.from_player_id, tx.amount
            );
            self.events.record(
                EventKind::TxSkipped,
                Some(&tx.from_player_id),
                json!({ "tx_id": tx.id, "block_index": block.index, "amount": tx.amount }),
            );
        }

        let index = block.index;
        let tx_count = block.transactions.len();
        let block_hash = block.hash.clone();
        self.chain.push(block);

        let miner = self.players.get(player_id)?;
        self.events.record(
            EventKind::BlockMined,
            Some(player_id),
            json!({
                "block_index": index,
                "block_hash": block_hash,
                "miner_name": miner.display_name(),
                "miner_address": miner.address,
                "reward": self.reward,
                "difficulty": self.difficulty,
                "nonce": nonce,
                "tx_count": tx_count,
            }),
        );
        info!(
            "MINER - sealed block #{} by {} (hash={}, nonce={}, txs={}, skipped={})",
            index,
            player_id,
            block_hash,
            nonce,
            tx_count,
            skipped.len()
        );

        Ok(MineOutcome {
            success: true,
            block_index: Some(index),
            reward: Some(self.reward),
            message: format!(
                "Block #{} mined successfully! Earned {} BABY tokens.",
                index, self.reward
            ),
            details: eval.details(),
        })
    }

    /// Split the pool into transfers that settle against confirmed balances
    /// (applied in pool order) and ones that would now overdraw.
    fn select_settleable(&self) -> (Vec<Transaction>, Vec<Transaction>) {
        let mut running: HashMap<&str, u64> = HashMap::new();
        let mut included = Vec::new();
        let mut skipped = Vec::new();
        if self.pool.is_empty() {
            return (included, skipped);
        }

        for tx in self.pool.iter() {
            let from = tx.from_player_id.as_str();
            let to = tx.to_player_id.as_str();
            let from_balance = running
                .get(from)
                .copied()
                .or_else(|| self.players.balance(from).ok());
            let to_balance = running
                .get(to)
                .copied()
                .or_else(|| self.players.balance(to).ok());

            match (from_balance, to_balance) {
                (Some(fb), Some(tb)) if fb >= tx.amount => {
                    running.insert(from, fb - tx.amount);
                    running.insert(to, tb.saturating_add(tx.amount));
                    included.push(tx.clone());
                }
                _ => skipped.push(tx.clone()),
            }
        }
        (included, skipped)
    }

    /// The tip must sit at its own position with an intact hash, and the
    /// new block must extend exactly that tip.
    fn check_link(&mut self, block: &Block) -> Result<()> {
        let tip = self.tip();
        let tip_position = (self.chain.len() - 1) as u64;
        if tip.index != tip_position || !tip.is_intact() {
            let reason = format!("tip #{} at position {} is corrupted", tip.index, tip_position);
            return Err(self.halt(reason));
        }
        if block.index != tip.index + 1 || block.prev_hash != tip.hash {
            let reason = format!(
                "block #{} (prev={}) does not extend tip #{} ({})",
                block.index, block.prev_hash, tip.index, tip.hash
            );
            return Err(self.halt(reason));
        }
        Ok(())
    }

    /* -------------------- Validation -------------------- */

    /// Re-check the whole chain: linkage, hashes, merkle roots and puzzle scores.
    pub fn is_valid_chain(&self) -> bool {
        let Some(genesis) = self.chain.first() else {
            return false;
        };
        if genesis.index != 0 || genesis.prev_hash != GENESIS_PREV_HASH || !genesis.is_intact() {
            return false;
        }

        for i in 1..self.chain.len() {
            let current = &self.chain[i];
            let prev = &self.chain[i - 1];

            // Check linkage
            if current.index != prev.index + 1 || current.prev_hash != prev.hash {
                return false;
            }

            // Check hash integrity + recorded puzzle result
            if !current.is_intact() {
                return false;
            }
            let eval = mining::evaluate(&current.header(), current.difficulty);
            if !eval.solved || eval.score != current.score {
                return false;
            }
        }

        true
    }

    /// Note that someone dumped the full chain.
    pub fn record_chain_snapshot(&mut self) {
        self.events.record(
            EventKind::ChainSnapshotPrinted,
            None,
            json!({ "chain_height": self.height(), "purpose": "debug" }),
        );
    }

    #[cfg(test)]
    pub(crate) fn pool_mut(&mut self) -> &mut TransactionPool {
        &mut self.pool
    }

    #[cfg(test)]
    pub(crate) fn chain_mut(&mut self) -> &mut Vec<Block> {
        &mut self.chain
    }

    #[cfg(test)]
    pub(crate) fn set_minted(&mut self, minted: u64) {
        self.minted = minted;
    }
}
