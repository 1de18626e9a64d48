// Monitor data store: everything besides history that must survive a restart

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::CounterSnapshot;

/// Key under `interface_names_updated` shared by all targets.
pub const NAMES_REFRESH_KEY: &str = "any";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorData {
    /// Previous raw snapshot per target (the rate calculator's baseline).
    #[serde(default, alias = "raw_bandwidth_data")]
    pub raw_counters: BTreeMap<String, CounterSnapshot>,
    #[serde(default)]
    pub interface_names: BTreeMap<String, String>,
    #[serde(default)]
    pub interface_names_updated: BTreeMap<String, f64>,
    #[serde(default)]
    pub real_interfaces: BTreeMap<String, String>,
    /// Dynamic ceilings keyed `"<display>-in"` / `"<display>-out"`.
    #[serde(default)]
    pub max_bandwidth: BTreeMap<String, f64>,
    #[serde(default)]
    pub polling_times: BTreeMap<String, f64>,
    #[serde(default)]
    pub timestamp: i64,
}
