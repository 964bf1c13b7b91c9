use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::blockchain::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Confirmed,
}

/// A BABY transfer between two registered players.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub from_player_id: String,
    pub to_player_id: String,
    pub from_address: String,
    pub to_address: String,
    pub amount: u64,
    /// Carried along for display; never verified.
    pub signature: Option<String>,
    pub status: TxStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        from_player_id: String,
        to_player_id: String,
        from_address: String,
        to_address: String,
        amount: u64,
        signature: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from_player_id,
            to_player_id,
            from_address,
            to_address,
            amount,
            signature,
            status: TxStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Merkle leaf: SHA-256 over the fields that move value.
    pub fn leaf_hash(&self) -> [u8; 32] {
        let preimage = format!(
            "{}:{}:{}:{}",
            self.id, self.from_player_id, self.to_player_id, self.amount
        );
        let mut hasher = Sha256::new();
        hasher.update(preimage.as_bytes());
        hasher.finalize().into()
    }

    pub fn confirm(&mut self) {
        self.status = TxStatus::Confirmed;
    }
}

/// Parse a client-supplied amount into whole BABY tokens.
/// Rejects non-numbers, non-positive, fractional and out-of-range values.
pub fn parse_amount(raw: &serde_json::Value) -> Result<u64, LedgerError> {
    if let Some(v) = raw.as_u64() {
        return if v == 0 {
            Err(LedgerError::InvalidAmount("amount must be positive".into()))
        } else {
            Ok(v)
        };
    }

    let v = raw
        .as_f64()
        .ok_or_else(|| LedgerError::InvalidAmount(format!("not a number: {raw}")))?;
    if !v.is_finite() || v <= 0.0 {
        return Err(LedgerError::InvalidAmount("amount must be positive".into()));
    }
    if v.fract() != 0.0 {
        return Err(LedgerError::InvalidAmount(
            "amount must be a whole number of BABY".into(),
        ));
    }
    if v >= u64::MAX as f64 {
        return Err(LedgerError::InvalidAmount("amount too large".into()));
    }
    Ok(v as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_amount_accepts_whole_positive_numbers() {
        assert_eq!(parse_amount(&json!(5)), Ok(5));
        assert_eq!(parse_amount(&json!(7.0)), Ok(7));
    }

    #[test]
    fn parse_amount_rejects_bad_input() {
        for raw in [json!(0), json!(-3), json!(2.5), json!("10"), json!(null)] {
            assert!(
                matches!(parse_amount(&raw), Err(LedgerError::InvalidAmount(_))),
                "accepted {raw}"
            );
        }
    }

    #[test]
    fn leaf_hash_depends_on_amount() {
        let a = Transaction::new(
            "a".into(),
            "b".into(),
            "BABYA".into(),
            "BABYB".into(),
            3,
            None,
        );
        let mut b = a.clone();
        b.amount = 4;
        assert_ne!(a.leaf_hash(), b.leaf_hash());
        assert_eq!(a.leaf_hash(), a.clone().leaf_hash());
    }
}
