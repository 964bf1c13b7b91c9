use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::mining::{Evaluation, HeaderMaterial, merkle_root};
use super::{EMPTY_MERKLE_ROOT, GENESIS_PREV_HASH, SYSTEM_MINER_ID, format_timestamp};
use crate::transaction::Transaction;

/// 2024-01-01T00:00:00Z
const GENESIS_UNIX_SECS: i64 = 1_704_067_200;

/// A sealed block: the winning header plus the transfers it settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: DateTime<Utc>,
    pub prev_hash: String,
    pub merkle_root: String,
    pub nonce: i64,
    pub miner_id: String,
    pub reward: u64,
    /// Puzzle score of the winning header.
    pub score: u64,
    /// Threshold in force when this block was sealed.
    pub difficulty: u64,
    pub transactions: Vec<Transaction>,
    pub hash: String, // Cached hash of the block
}

impl Block {
    /// The fixed first block; identical on every start.
    pub fn genesis(difficulty: u64) -> Self {
        let mut block = Self {
            index: 0,
            timestamp: DateTime::from_timestamp(GENESIS_UNIX_SECS, 0).unwrap_or_default(),
            prev_hash: String::from(GENESIS_PREV_HASH),
            merkle_root: String::from(EMPTY_MERKLE_ROOT),
            nonce: 0,
            miner_id: String::from(SYSTEM_MINER_ID),
            reward: 0,
            score: 0,
            difficulty,
            transactions: Vec::new(),
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Seal a block from a solved evaluation. `transactions` must be the
    /// exact set the header's merkle root was computed over.
    pub fn sealed(
        eval: &Evaluation,
        miner_id: String,
        reward: u64,
        transactions: Vec<Transaction>,
    ) -> Self {
        let header = &eval.material;
        let mut block = Self {
            index: header.index,
            timestamp: header.timestamp,
            prev_hash: header.prev_hash.clone(),
            merkle_root: header.merkle_root.clone(),
            nonce: header.nonce,
            miner_id,
            reward,
            score: eval.score,
            difficulty: eval.difficulty,
            transactions,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// SHA-256 over the header fields plus miner and reward. Transactions
    /// are covered through the merkle root.
    pub fn compute_hash(&self) -> String {
        let preimage = format!(
            "{}:{}:{}:{}:{}:{}:{}",
            self.index,
            self.prev_hash,
            self.merkle_root,
            format_timestamp(&self.timestamp),
            self.nonce,
            self.miner_id,
            self.reward
        );
        let mut hasher = Sha256::new();
        hasher.update(preimage.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// The puzzle header this block was sealed with.
    pub fn header(&self) -> HeaderMaterial {
        HeaderMaterial {
            index: self.index,
            prev_hash: self.prev_hash.clone(),
            merkle_root: self.merkle_root.clone(),
            timestamp: self.timestamp,
            nonce: self.nonce,
        }
    }

    /// Cached hash and merkle root still match the contents.
    /// (Does NOT validate chain linkage or the puzzle.)
    pub fn is_intact(&self) -> bool {
        self.hash == self.compute_hash() && self.merkle_root == merkle_root(&self.transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::Block;
    use crate::blockchain::mining::{build_header, evaluate};
    use crate::blockchain::{EMPTY_MERKLE_ROOT, GENESIS_PREV_HASH};
    use crate::transaction::Transaction;
    use chrono::Utc;

    fn transfer(amount: u64) -> Transaction {
        Transaction::new(
            "a".into(),
            "b".into(),
            "BABYA".into(),
            "BABYB".into(),
            amount,
            None,
        )
    }

    #[test]
    fn genesis_is_fixed() {
        let a = Block::genesis(400_000);
        let b = Block::genesis(400_000);
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.hash, a.compute_hash());
        assert_eq!(a.prev_hash, GENESIS_PREV_HASH);
        assert_eq!(a.merkle_root, EMPTY_MERKLE_ROOT);
        assert!(a.is_intact());
    }

    #[test]
    fn sealed_block_links_to_tip() {
        let genesis = Block::genesis(1_000_000);
        let txs = vec![transfer(2)];
        let header = build_header(&genesis, &txs, Utc::now(), 42);
        let eval = evaluate(&header, 1_000_000);
        let block = Block::sealed(&eval, "miner".into(), 10, txs);

        assert_eq!(block.index, 1);
        assert_eq!(block.prev_hash, genesis.hash);
        assert_eq!(block.nonce, 42);
        assert_eq!(block.header(), header);
        assert!(block.is_intact());
    }

    #[test]
    fn tampering_breaks_integrity() {
        let genesis = Block::genesis(1_000_000);
        let txs = vec![transfer(2)];
        let header = build_header(&genesis, &txs, Utc::now(), 7);
        let eval = evaluate(&header, 1_000_000);
        let mut block = Block::sealed(&eval, "miner".into(), 10, txs);

        block.transactions[0].amount = 2_000;
        assert!(!block.is_intact());

        block.transactions[0].amount = 2;
        assert!(block.is_intact());
        block.reward = 1_000;
        assert!(!block.is_intact());
    }
}
