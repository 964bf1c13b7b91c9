//! The toy proof-of-work puzzle.
//!
//! A header is `index:prev_hash:merkle_root:timestamp:nonce`. Its score is the
//! first four bytes of SHA-256(header), read big-endian, modulo
//! [`HASH_MODULO`]. A header solves the puzzle when `score < difficulty`.
//! The puzzle is cheap enough that every step can be shown to a
//! player; a losing nonce is an ordinary result, not an error.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::{Block, EMPTY_MERKLE_ROOT, HASH_MODULO, format_timestamp};
use crate::transaction::Transaction;

pub const FORMULA: &str = "SHA256(BlockHeader) % 1000000";

/// Everything that goes into a candidate header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMaterial {
    pub index: u64,
    pub prev_hash: String,
    pub merkle_root: String,
    pub timestamp: DateTime<Utc>,
    pub nonce: i64,
}

impl HeaderMaterial {
    /// Canonical string that gets hashed.
    pub fn serialize(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.index,
            self.prev_hash,
            self.merkle_root,
            format_timestamp(&self.timestamp),
            self.nonce
        )
    }
}

/// Outcome of scoring one header against one difficulty.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub material: HeaderMaterial,
    pub header: String,
    pub score: u64,
    pub difficulty: u64,
    pub solved: bool,
}

/// Display copy of the header fields (hashes shortened).
#[derive(Debug, Clone, Serialize)]
pub struct HeaderComponents {
    pub index: u64,
    pub prev_hash: String,
    pub merkle_root: String,
    pub timestamp: String,
    pub nonce: i64,
}

/// The arithmetic of one attempt, rendered verbatim by clients.
#[derive(Debug, Clone, Serialize)]
pub struct MiningDetails {
    pub formula: String,
    pub block_header: String,
    pub components: HeaderComponents,
    pub hash_value: u64,
    pub difficulty: u64,
    pub equation: String,
    pub solved: bool,
}

impl Evaluation {
    pub fn details(&self) -> MiningDetails {
        let m = &self.material;
        MiningDetails {
            formula: FORMULA.to_string(),
            block_header: self.header.clone(),
            components: HeaderComponents {
                index: m.index,
                prev_hash: shorten(&m.prev_hash),
                merkle_root: shorten(&m.merkle_root),
                timestamp: format_timestamp(&m.timestamp),
                nonce: m.nonce,
            },
            hash_value: self.score,
            difficulty: self.difficulty,
            equation: format!("{} < {}", self.score, self.difficulty),
            solved: self.solved,
        }
    }
}

fn shorten(hash: &str) -> String {
    let head: String = hash.chars().take(8).collect();
    format!("{head}...")
}

fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Binary merkle tree over transaction leaves; an odd node is paired with
/// itself. The empty set maps to [`EMPTY_MERKLE_ROOT`].
pub fn merkle_root(txs: &[Transaction]) -> String {
    if txs.is_empty() {
        return EMPTY_MERKLE_ROOT.to_string();
    }

    let mut level: Vec<[u8; 32]> = txs.iter().map(Transaction::leaf_hash).collect();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let right = pair.get(1).unwrap_or(&pair[0]);
                let mut buf = [0u8; 64];
                buf[..32].copy_from_slice(&pair[0]);
                buf[32..].copy_from_slice(right);
                sha256(&buf)
            })
            .collect();
    }
    hex::encode(level[0])
}

/// Candidate header extending `tip` with `pending`.
pub fn build_header(
    tip: &Block,
    pending: &[Transaction],
    timestamp: DateTime<Utc>,
    nonce: i64,
) -> HeaderMaterial {
    HeaderMaterial {
        index: tip.index + 1,
        prev_hash: tip.hash.clone(),
        merkle_root: merkle_root(pending),
        timestamp,
        nonce,
    }
}

/// Puzzle score of a serialized header, in `0..HASH_MODULO`.
pub fn score(header: &str) -> u64 {
    let digest = sha256(header.as_bytes());
    let word = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    u64::from(word) % HASH_MODULO
}

pub fn evaluate(material: &HeaderMaterial, difficulty: u64) -> Evaluation {
    let header = material.serialize();
    let score = score(&header);
    Evaluation {
        material: material.clone(),
        header,
        score,
        difficulty,
        solved: score < difficulty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, amount: u64) -> Transaction {
        let mut t = Transaction::new(
            "a".into(),
            "b".into(),
            "BABYA".into(),
            "BABYB".into(),
            amount,
            None,
        );
        t.id = id.to_string();
        t
    }

    fn material(nonce: i64) -> HeaderMaterial {
        HeaderMaterial {
            index: 3,
            prev_hash: "ab".repeat(32),
            merkle_root: EMPTY_MERKLE_ROOT.to_string(),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            nonce,
        }
    }

    #[test]
    fn header_layout() {
        let m = material(17);
        assert_eq!(
            m.serialize(),
            format!(
                "3:{}:{}:2023-11-14T22:13:20.000Z:17",
                "ab".repeat(32),
                EMPTY_MERKLE_ROOT
            )
        );
    }

    #[test]
    fn evaluation_is_deterministic() {
        for nonce in [-5, 0, 1, 9_999, i64::MAX] {
            let a = evaluate(&material(nonce), 400_000);
            let b = evaluate(&material(nonce), 400_000);
            assert_eq!(a.header, b.header);
            assert_eq!(a.score, b.score);
            assert_eq!(a.solved, b.solved);
        }
    }

    #[test]
    fn solved_iff_score_below_difficulty() {
        for nonce in 0..200 {
            let m = material(nonce);
            let s = score(&m.serialize());
            assert!(s < HASH_MODULO);
            for difficulty in [0, s, s + 1, 400_000, HASH_MODULO] {
                assert_eq!(evaluate(&m, difficulty).solved, s < difficulty);
            }
        }
    }

    #[test]
    fn extreme_difficulties() {
        let m = material(1);
        assert!(!evaluate(&m, 0).solved);
        assert!(evaluate(&m, HASH_MODULO).solved);
    }

    #[test]
    fn details_always_populated() {
        let eval = evaluate(&material(42), 0);
        let d = eval.details();
        assert_eq!(d.formula, FORMULA);
        assert_eq!(d.block_header, eval.header);
        assert_eq!(d.components.nonce, 42);
        assert_eq!(d.components.prev_hash, "abababab...");
        assert_eq!(d.components.merkle_root, "00000000...");
        assert_eq!(d.equation, format!("{} < 0", d.hash_value));
        assert!(!d.solved);
    }

    #[test]
    fn merkle_root_shape() {
        assert_eq!(merkle_root(&[]), EMPTY_MERKLE_ROOT);

        let one = merkle_root(&[tx("t1", 1)]);
        assert_eq!(one, hex::encode(tx("t1", 1).leaf_hash()));

        let two = merkle_root(&[tx("t1", 1), tx("t2", 2)]);
        let swapped = merkle_root(&[tx("t2", 2), tx("t1", 1)]);
        assert_ne!(two, swapped);

        // odd count duplicates the last leaf
        let three = merkle_root(&[tx("t1", 1), tx("t2", 2), tx("t3", 3)]);
        let four = merkle_root(&[tx("t1", 1), tx("t2", 2), tx("t3", 3), tx("t3", 3)]);
        assert_eq!(three, four);
    }

    #[test]
    fn header_extends_tip() {
        let genesis = Block::genesis(400_000);
        let h = build_header(&genesis, &[], Utc::now(), 5);
        assert_eq!(h.index, 1);
        assert_eq!(h.prev_hash, genesis.hash);
        assert_eq!(h.merkle_root, EMPTY_MERKLE_ROOT);
    }
}
