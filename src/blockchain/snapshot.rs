//! Read-only views over the ledger, shaped for API clients.

use serde::Serialize;
use std::collections::HashMap;

use super::error::Result;
use super::{Block, Ledger, format_timestamp};
use crate::player::Player;
use crate::transaction::Transaction;

#[derive(Debug, Clone, Serialize)]
pub struct BlockSummary {
    pub index: u64,
    pub miner_id: String,
    pub miner_name: Option<String>,
    pub timestamp: String,
    pub tx_count: usize,
    pub reward: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerStatsView {
    pub blocks_mined: u64,
    pub mining_attempts: u64,
    pub last_active_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub id: String,
    pub name: Option<String>,
    pub address: String,
    pub balance_baby: u64,
    pub stats: PlayerStatsView,
}

impl From<&Player> for PlayerView {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            address: p.address.clone(),
            balance_baby: p.balance,
            stats: PlayerStatsView {
                blocks_mined: p.stats.blocks_mined,
                mining_attempts: p.stats.mining_attempts,
                last_active_at: p.stats.last_active_at.as_ref().map(format_timestamp),
            },
        }
    }
}

/// What the UI polls: chain progress plus one player's view.
#[derive(Debug, Clone, Serialize)]
pub struct ChainSnapshot {
    pub chain_height: u64,
    pub current_difficulty: u64,
    pub recent_blocks: Vec<BlockSummary>,
    pub player: Option<PlayerView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerReport {
    pub player_id: String,
    pub name: Option<String>,
    pub address: String,
    pub balance: u64,
    pub blocks_mined: u64,
    pub mining_attempts: u64,
    /// Percent of attempts that sealed a block.
    pub mining_success_rate: f64,
    pub rank_by_balance: usize,
    pub total_players: usize,
    pub last_active: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MinerCount {
    pub name: String,
    pub blocks_mined: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RichPlayer {
    pub name: String,
    pub balance: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainSummary {
    pub chain_height: u64,
    pub total_players: usize,
    pub current_difficulty: u64,
    pub pending_tx_count: usize,
    pub total_tx_count: usize,
    pub total_tx_volume: u64,
    pub avg_tx_amount: f64,
    pub top_miners: Vec<MinerCount>,
    pub richest_players: Vec<RichPlayer>,
    pub total_money_supply: u64,
    pub total_rewards_minted: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerRecord {
    pub id: String,
    pub name: Option<String>,
    pub address: String,
    pub balance: u64,
    pub blocks_mined: u64,
    pub mining_attempts: u64,
}

/// Everything, for debugging.
#[derive(Debug, Clone, Serialize)]
pub struct ChainDump {
    pub chain_height: u64,
    pub current_difficulty: u64,
    pub reward_per_block: u64,
    pub blocks: Vec<Block>,
    pub players: Vec<PlayerRecord>,
    pub pending_transactions: Vec<Transaction>,
    pub total_events: u64,
}

const LEADERBOARD_LEN: usize = 5;

impl Ledger {
    fn summarize(&self, block: &Block) -> BlockSummary {
        BlockSummary {
            index: block.index,
            miner_id: block.miner_id.clone(),
            miner_name: self
                .players()
                .get(&block.miner_id)
                .ok()
                .and_then(|p| p.name.clone()),
            timestamp: format_timestamp(&block.timestamp),
            tx_count: block.transactions.len(),
            reward: block.reward,
        }
    }

    /// Height, difficulty, newest blocks first, and `player_id`'s state
    /// (`None` when absent or unknown).
    pub fn snapshot(&self, player_id: Option<&str>) -> ChainSnapshot {
        let recent_blocks = self
            .chain()
            .iter()
            .rev()
            .take(self.recent_window())
            .map(|b| self.summarize(b))
            .collect();

        let player = player_id
            .and_then(|id| self.players().get(id).ok())
            .map(PlayerView::from);

        ChainSnapshot {
            chain_height: self.height(),
            current_difficulty: self.difficulty(),
            recent_blocks,
            player,
        }
    }

    pub fn player_report(&self, player_id: &str) -> Result<PlayerReport> {
        let p = self.players().get(player_id)?;
        let richer = self
            .players()
            .iter()
            .filter(|other| other.balance > p.balance)
            .count();
        let success_rate = if p.stats.mining_attempts > 0 {
            p.stats.blocks_mined as f64 / p.stats.mining_attempts as f64 * 100.0
        } else {
            0.0
        };

        Ok(PlayerReport {
            player_id: p.id.clone(),
            name: p.name.clone(),
            address: p.address.clone(),
            balance: p.balance,
            blocks_mined: p.stats.blocks_mined,
            mining_attempts: p.stats.mining_attempts,
            mining_success_rate: success_rate,
            rank_by_balance: richer + 1,
            total_players: self.players().len(),
            last_active: p.stats.last_active_at.as_ref().map(format_timestamp),
        })
    }

    pub fn chain_summary(&self) -> ChainSummary {
        let mut by_miner: HashMap<String, u64> = HashMap::new();
        for block in self.chain().iter().skip(1) {
            let name = self
                .players()
                .get(&block.miner_id)
                .map(Player::display_name)
                .unwrap_or_else(|_| "Unknown".to_string());
            *by_miner.entry(name).or_default() += 1;
        }
        let mut top_miners: Vec<MinerCount> = by_miner
            .into_iter()
            .map(|(name, blocks_mined)| MinerCount { name, blocks_mined })
            .collect();
        top_miners.sort_by(|a, b| {
            b.blocks_mined
                .cmp(&a.blocks_mined)
                .then_with(|| a.name.cmp(&b.name))
        });
        top_miners.truncate(LEADERBOARD_LEN);

        let (total_tx_count, total_tx_volume) = self
            .chain()
            .iter()
            .flat_map(|b| b.transactions.iter())
            .fold((0usize, 0u64), |(n, v), t| (n + 1, v + t.amount));
        let avg_tx_amount = if total_tx_count > 0 {
            total_tx_volume as f64 / total_tx_count as f64
        } else {
            0.0
        };

        let mut players: Vec<&Player> = self.players().iter().collect();
        players.sort_by(|a, b| b.balance.cmp(&a.balance));
        let richest_players = players
            .iter()
            .take(LEADERBOARD_LEN)
            .map(|p| RichPlayer {
                name: p.display_name(),
                balance: p.balance,
            })
            .collect();

        ChainSummary {
            chain_height: self.height(),
            total_players: self.players().len(),
            current_difficulty: self.difficulty(),
            pending_tx_count: self.pool().len(),
            total_tx_count,
            total_tx_volume,
            avg_tx_amount,
            top_miners,
            richest_players,
            total_money_supply: self.players().iter().map(|p| p.balance).sum(),
            total_rewards_minted: self.total_minted(),
        }
    }

    pub fn chain_dump(&self) -> ChainDump {
        ChainDump {
            chain_height: self.height(),
            current_difficulty: self.difficulty(),
            reward_per_block: self.reward(),
            blocks: self.chain().to_vec(),
            players: self
                .players()
                .iter()
                .map(|p| PlayerRecord {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    address: p.address.clone(),
                    balance: p.balance,
                    blocks_mined: p.stats.blocks_mined,
                    mining_attempts: p.stats.mining_attempts,
                })
                .collect(),
            pending_transactions: self.pool().pending_snapshot(),
            total_events: self.events().total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::blockchain::{HASH_MODULO, Ledger};
    use crate::config::Config;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ledger() -> Ledger {
        let cfg = Config {
            difficulty: HASH_MODULO,
            recent_blocks: 3,
            ..Config::default()
        };
        Ledger::new(&cfg, Box::new(StdRng::seed_from_u64(5)))
    }

    #[test]
    fn snapshot_window_newest_first() {
        let mut l = ledger();
        let a = l.register(Some("alice".into())).unwrap().id;
        for n in 0..4 {
            l.attempt_mine(&a, n).unwrap();
        }
        let snap = l.snapshot(Some(&a));
        assert_eq!(snap.chain_height, 4);
        assert_eq!(snap.current_difficulty, HASH_MODULO);
        let idx: Vec<u64> = snap.recent_blocks.iter().map(|b| b.index).collect();
        assert_eq!(idx, vec![4, 3, 2]);
        assert_eq!(snap.recent_blocks[0].miner_name.as_deref(), Some("alice"));
        assert_eq!(snap.recent_blocks[0].reward, l.reward());

        let me = snap.player.unwrap();
        assert_eq!(me.balance_baby, 4 * l.reward());
        assert_eq!(me.stats.blocks_mined, 4);
        assert_eq!(me.stats.mining_attempts, 4);
        assert!(me.stats.last_active_at.is_some());
    }

    #[test]
    fn snapshot_without_player() {
        let l = ledger();
        let snap = l.snapshot(None);
        assert!(snap.player.is_none());
        assert_eq!(snap.chain_height, 0);
        assert_eq!(snap.recent_blocks.len(), 1);
        assert_eq!(snap.recent_blocks[0].miner_id, "system");
        assert!(snap.recent_blocks[0].miner_name.is_none());
        assert!(l.snapshot(Some("ghost")).player.is_none());
    }

    #[test]
    fn snapshot_json_field_names() {
        let mut l = ledger();
        let a = l.register(None).unwrap().id;
        let v = serde_json::to_value(l.snapshot(Some(&a))).unwrap();
        for key in ["chain_height", "current_difficulty", "recent_blocks", "player"] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
        assert!(v["player"]["balance_baby"].is_number());
        assert!(v["player"]["stats"]["last_active_at"].is_null());
        assert!(v["recent_blocks"][0]["tx_count"].is_number());
    }

    #[test]
    fn reports_and_summary() {
        let mut l = ledger();
        let a = l.register(Some("alice".into())).unwrap().id;
        let b = l.register(Some("bob".into())).unwrap().id;
        l.attempt_mine(&a, 0).unwrap();
        l.attempt_mine(&a, 1).unwrap();
        l.submit_transfer(&a, &b, 5, None).unwrap();
        l.attempt_mine(&b, 2).unwrap();

        let ra = l.player_report(&a).unwrap();
        assert_eq!(ra.rank_by_balance, 1);
        assert_eq!(ra.mining_success_rate, 100.0);
        assert_eq!(ra.total_players, 2);
        let rb = l.player_report(&b).unwrap();
        assert_eq!(rb.balance, 15);
        assert_eq!(rb.rank_by_balance, 1);
        assert!(l.player_report("ghost").is_err());

        let s = l.chain_summary();
        assert_eq!(s.chain_height, 3);
        assert_eq!(s.total_tx_count, 1);
        assert_eq!(s.total_tx_volume, 5);
        assert_eq!(s.avg_tx_amount, 5.0);
        assert_eq!(s.top_miners[0].name, "alice");
        assert_eq!(s.top_miners[0].blocks_mined, 2);
        assert_eq!(s.total_money_supply, s.total_rewards_minted);
        assert_eq!(s.total_money_supply, 30);
    }

    #[test]
    fn dump_is_complete() {
        let mut l = ledger();
        let a = l.register(None).unwrap().id;
        let b = l.register(None).unwrap().id;
        l.attempt_mine(&a, 0).unwrap();
        l.submit_transfer(&a, &b, 1, None).unwrap();

        let d = l.chain_dump();
        assert_eq!(d.blocks.len(), 2);
        assert_eq!(d.players.len(), 2);
        assert_eq!(d.pending_transactions.len(), 1);
        assert_eq!(d.total_events, 4);
    }
}
