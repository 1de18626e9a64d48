// Charting history: per display name, newest-first (timestamp, Mbps) pairs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `[epoch_seconds, value]` on the wire.
pub type HistoryPoint = (i64, f64);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    #[serde(rename = "in", default)]
    pub inbound: Vec<HistoryPoint>,
    #[serde(rename = "out", default)]
    pub outbound: Vec<HistoryPoint>,
}

impl HistorySeries {
    /// Newest point of each direction, if any.
    pub fn latest(&self) -> (Option<HistoryPoint>, Option<HistoryPoint>) {
        (self.inbound.first().copied(), self.outbound.first().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.inbound.is_empty() && self.outbound.is_empty()
    }
}

/// Persisted history file: `{timestamp, interval, interfaces: {name: {in, out}}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub timestamp: i64,
    pub interval: u64,
    #[serde(default)]
    pub interfaces: BTreeMap<String, HistorySeries>,
}

impl HistorySnapshot {
    pub fn empty(now: i64, interval: u64) -> Self {
        Self {
            timestamp: now,
            interval,
            interfaces: BTreeMap::new(),
        }
    }

    pub fn series(&self, display_name: &str) -> Option<&HistorySeries> {
        self.interfaces.get(display_name)
    }
}
