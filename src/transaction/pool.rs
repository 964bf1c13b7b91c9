use log::{debug, warn};
use std::collections::HashSet;

use super::model::Transaction;
use crate::blockchain::LedgerError;
use crate::blockchain::error::Result;
use crate::player::PlayerRegistry;

/// Unconfirmed transfers in submission order.
#[derive(Debug, Default)]
pub struct TransactionPool {
    pending: Vec<Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.pending.iter()
    }

    /// Sum of `sender`'s transfers still waiting for a block.
    pub fn pending_outflow(&self, sender: &str) -> u64 {
        self.pending
            .iter()
            .filter(|t| t.from_player_id == sender)
            .map(|t| t.amount)
            .sum()
    }

    /// Validate and enqueue a transfer. The sender must cover `amount` from
    /// confirmed balance minus what is already pending from them.
    pub fn submit(
        &mut self,
        players: &PlayerRegistry,
        from_id: &str,
        to_id: &str,
        amount: u64,
        signature: Option<String>,
    ) -> Result<Transaction> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount("amount must be positive".into()));
        }
        if from_id == to_id {
            return Err(LedgerError::SelfTransfer);
        }
        let from = players.get(from_id)?;
        let to = players.get(to_id)?;

        let available = from.balance.saturating_sub(self.pending_outflow(from_id));
        if available < amount {
            warn!(
                "POOL - rejected {} -> {} amount={}: available={}",
                from_id, to_id, amount, available
            );
            return Err(LedgerError::InsufficientFunds {
                available,
                requested: amount,
            });
        }

        let tx = Transaction::new(
            from.id.clone(),
            to.id.clone(),
            from.address.clone(),
            to.address.clone(),
            amount,
            signature,
        );
        self.pending.push(tx.clone());
        debug!("POOL - queued txid={} (size={})", tx.id, self.pending.len());
        Ok(tx)
    }

    /// Copy of the pending set, in submission order.
    pub fn pending_snapshot(&self) -> Vec<Transaction> {
        self.pending.clone()
    }

    /// Remove transactions that were just confirmed in a block.
    pub fn drain(&mut self, confirmed_ids: &HashSet<String>) -> usize {
        let before = self.pending.len();
        self.pending.retain(|t| !confirmed_ids.contains(&t.id));
        let removed = before - self.pending.len();
        debug!(
            "POOL - drained: {} -> {} (removed {})",
            before,
            self.pending.len(),
            removed
        );
        removed
    }

    /// Enqueue without any checks, to stage states the public path can't reach.
    #[cfg(test)]
    pub(crate) fn enqueue_unchecked(&mut self, tx: Transaction) {
        self.pending.push(tx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TxStatus;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn setup() -> (PlayerRegistry, String, String) {
        let mut reg = PlayerRegistry::new(Box::new(StdRng::seed_from_u64(21)));
        let a = reg.register(Some("a".into())).id;
        let b = reg.register(Some("b".into())).id;
        reg.credit(&a, 10).unwrap();
        (reg, a, b)
    }

    #[test]
    fn submit_queues_pending() {
        let (reg, a, b) = setup();
        let mut pool = TransactionPool::new();
        let tx = pool.submit(&reg, &a, &b, 4, Some("sig".into())).unwrap();
        assert_eq!(tx.status, TxStatus::Pending);
        assert_eq!(tx.from_address, reg.get(&a).unwrap().address);
        assert_eq!(tx.to_address, reg.get(&b).unwrap().address);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.pending_outflow(&a), 4);
    }

    #[test]
    fn validation_errors() {
        let (reg, a, b) = setup();
        let mut pool = TransactionPool::new();
        assert!(matches!(
            pool.submit(&reg, &a, &b, 0, None),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert_eq!(
            pool.submit(&reg, &a, &a, 1, None).unwrap_err(),
            LedgerError::SelfTransfer
        );
        assert_eq!(
            pool.submit(&reg, "ghost", &b, 1, None).unwrap_err(),
            LedgerError::UnknownPlayer("ghost".into())
        );
        assert_eq!(
            pool.submit(&reg, &a, "ghost", 1, None).unwrap_err(),
            LedgerError::UnknownPlayer("ghost".into())
        );
        assert!(pool.is_empty());
    }

    #[test]
    fn pending_transfers_count_against_balance() {
        let (reg, a, b) = setup();
        let mut pool = TransactionPool::new();
        pool.submit(&reg, &a, &b, 7, None).unwrap();
        assert_eq!(
            pool.submit(&reg, &a, &b, 4, None).unwrap_err(),
            LedgerError::InsufficientFunds {
                available: 3,
                requested: 4
            }
        );
        pool.submit(&reg, &a, &b, 3, None).unwrap();
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn snapshot_keeps_order_and_drain_removes() {
        let (reg, a, b) = setup();
        let mut pool = TransactionPool::new();
        let t1 = pool.submit(&reg, &a, &b, 1, None).unwrap();
        let t2 = pool.submit(&reg, &a, &b, 2, None).unwrap();
        let t3 = pool.submit(&reg, &a, &b, 3, None).unwrap();

        let ids: Vec<_> = pool.pending_snapshot().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![t1.id.clone(), t2.id.clone(), t3.id.clone()]);

        let confirmed: HashSet<String> = [t1.id, t3.id].into_iter().collect();
        assert_eq!(pool.drain(&confirmed), 2);
        let left: Vec<_> = pool.iter().map(|t| t.id.clone()).collect();
        assert_eq!(left, vec![t2.id]);
    }
}
