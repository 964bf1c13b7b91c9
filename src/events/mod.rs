//! Recent-activity feed consumed by the AI explainer. Purely informational:
//! nothing in the ledger reads it back.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use uuid::Uuid;

use crate::blockchain::format_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PlayerRegistered,
    TxCreated,
    BlockMined,
    TxSkipped,
    ChainSnapshotPrinted,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    pub player_id: Option<String>,
    pub data: Value,
}

/// Wire form of an [`Event`] with a human-readable description.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub player_id: Option<String>,
    pub description: String,
    pub data: Value,
}

fn text(data: &Value, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "Unknown".to_string(),
        Some(other) => other.to_string(),
    }
}

impl Event {
    pub fn describe(&self) -> String {
        let d = &self.data;
        match self.kind {
            EventKind::PlayerRegistered => format!("{} joined the chain", text(d, "name")),
            EventKind::TxCreated => format!(
                "{} sent {} BABY to {}",
                text(d, "from_name"),
                text(d, "amount"),
                text(d, "to_name")
            ),
            EventKind::BlockMined => format!(
                "{} mined block #{} and earned {} BABY tokens",
                text(d, "miner_name"),
                text(d, "block_index"),
                text(d, "reward")
            ),
            EventKind::TxSkipped => format!(
                "Transfer {} left out of block #{}: sender balance too low",
                text(d, "tx_id"),
                text(d, "block_index")
            ),
            EventKind::ChainSnapshotPrinted => "Chain snapshot printed".to_string(),
        }
    }

    pub fn summary(&self) -> EventSummary {
        EventSummary {
            id: self.id.clone(),
            timestamp: format_timestamp(&self.timestamp),
            kind: self.kind,
            player_id: self.player_id.clone(),
            description: self.describe(),
            data: self.data.clone(),
        }
    }
}

/// Bounded log; the oldest events fall off once `capacity` is reached.
#[derive(Debug)]
pub struct EventLog {
    events: VecDeque<Event>,
    capacity: usize,
    total: u64,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            total: 0,
        }
    }

    pub fn record(&mut self, kind: EventKind, player_id: Option<&str>, data: Value) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(Event {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind,
            player_id: player_id.map(str::to_string),
            data,
        });
        self.total += 1;
    }

    /// Most recent first.
    pub fn recent(&self, limit: usize) -> Vec<EventSummary> {
        self.events
            .iter()
            .rev()
            .take(limit)
            .map(Event::summary)
            .collect()
    }

    /// Events ever recorded, including ones that fell off.
    pub fn total(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recent_is_newest_first_and_bounded() {
        let mut log = EventLog::new(3);
        for i in 0..5 {
            log.record(
                EventKind::PlayerRegistered,
                Some(format!("p{i}").as_str()),
                json!({ "name": format!("p{i}") }),
            );
        }
        assert_eq!(log.total(), 5);

        let recent = log.recent(10);
        assert_eq!(recent.len(), 3);
        let names: Vec<_> = recent.iter().map(|e| e.player_id.clone().unwrap()).collect();
        assert_eq!(names, vec!["p4", "p3", "p2"]);
        assert_eq!(log.recent(1).len(), 1);
    }

    #[test]
    fn descriptions() {
        let mut log = EventLog::new(10);
        log.record(
            EventKind::BlockMined,
            Some("a"),
            json!({ "miner_name": "alice", "block_index": 3, "reward": 10 }),
        );
        log.record(
            EventKind::TxCreated,
            Some("a"),
            json!({ "from_name": "alice", "to_name": "bob", "amount": 5 }),
        );
        let recent = log.recent(2);
        assert_eq!(recent[0].description, "alice sent 5 BABY to bob");
        assert_eq!(
            recent[1].description,
            "alice mined block #3 and earned 10 BABY tokens"
        );
    }

    #[test]
    fn summary_serializes_type_field() {
        let mut log = EventLog::new(2);
        log.record(EventKind::ChainSnapshotPrinted, None, json!({}));
        let v = serde_json::to_value(&log.recent(1)[0]).unwrap();
        assert_eq!(v["type"], "chain_snapshot_printed");
        assert!(v["player_id"].is_null());
        assert_eq!(v["description"], "Chain snapshot printed");
    }
}
