// Raw interface counter snapshots, as served by the appliance's ifstats endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One poll's counters for a target: interface id -> per-direction samples (0 = in, 1 = out).
pub type CounterSnapshot = BTreeMap<String, Vec<DirectionSample>>;

/// One direction of one interface: `values` is the `[timestamp, counter]` pair.
///
/// Values are kept as raw JSON so a malformed sample only taints its own interface
/// instead of failing the whole snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionSample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl DirectionSample {
    pub fn new(timestamp: i64, counter: Option<u64>) -> Self {
        Self {
            key: None,
            values: vec![Value::from(timestamp), counter.map_or(Value::Null, Value::from)],
        }
    }

    /// True when the sample carries at least a timestamp and a counter slot.
    pub fn has_pair(&self) -> bool {
        self.values.len() >= 2
    }

    /// Timestamp in whole seconds. Float timestamps are truncated.
    pub fn timestamp(&self) -> Option<i64> {
        let v = self.values.first()?;
        v.as_i64().or_else(|| {
            v.as_f64()
                .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        })
    }

    /// The counter slot: `None` when absent or null.
    pub fn counter_value(&self) -> Option<&Value> {
        self.values.get(1).filter(|v| !v.is_null())
    }
}

/// Interpret a non-null counter value as an unsigned 64-bit byte count.
pub fn counter_as_u64(v: &Value) -> Option<u64> {
    v.as_u64().or_else(|| {
        v.as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
            .map(|f| f as u64)
    })
}
