// Chart-scaling ceilings per interface direction.
// Manual overrides are keyed by raw interface id and freeze the dynamic value;
// dynamic ceilings are keyed "<display>-in"/"<display>-out", start at the floor and only rise.

use std::collections::{BTreeMap, HashMap};
use tracing::info;

pub const DEFAULT_CEILING_FLOOR_MBPS: f64 = 1000.0;

#[derive(Debug, Clone)]
pub struct CeilingTracker {
    floor: f64,
    manual: HashMap<String, f64>,
    dynamic: BTreeMap<String, f64>,
}

pub fn in_key(display_name: &str) -> String {
    format!("{display_name}-in")
}

pub fn out_key(display_name: &str) -> String {
    format!("{display_name}-out")
}

impl CeilingTracker {
    /// `dynamic` is the persisted table; entries below the floor are raised on their next update.
    pub fn new(floor: f64, manual: HashMap<String, f64>, dynamic: BTreeMap<String, f64>) -> Self {
        Self {
            floor,
            manual,
            dynamic,
        }
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    pub fn manual(&self, interface_id: &str) -> Option<f64> {
        self.manual.get(interface_id).copied()
    }

    /// Raise the dynamic ceilings with an observed rate; returns the effective (in, out) ceilings.
    pub fn update(
        &mut self,
        interface_id: &str,
        display_name: &str,
        in_rate: f64,
        out_rate: f64,
    ) -> (f64, f64) {
        if let Some(fixed) = self.manual(interface_id) {
            return (fixed, fixed);
        }
        let in_ceiling = self.raise(in_key(display_name), in_rate);
        let out_ceiling = self.raise(out_key(display_name), out_rate);
        (in_ceiling, out_ceiling)
    }

    /// Effective (in, out) ceilings without observing anything.
    pub fn effective(&self, interface_id: &str, display_name: &str) -> (f64, f64) {
        if let Some(fixed) = self.manual(interface_id) {
            return (fixed, fixed);
        }
        let get = |key: String| self.dynamic.get(&key).copied().unwrap_or(self.floor).max(self.floor);
        (get(in_key(display_name)), get(out_key(display_name)))
    }

    fn raise(&mut self, key: String, observed: f64) -> f64 {
        let floor = self.floor;
        let entry = self.dynamic.entry(key.clone()).or_insert(floor);
        if *entry < floor {
            *entry = floor;
        }
        // NaN observations are ignored.
        if observed > *entry {
            *entry = observed;
            info!(key = %key, mbps = observed, "new peak bandwidth");
        }
        *entry
    }

    /// Dynamic table for persistence (`max_bandwidth`).
    pub fn dynamic(&self) -> &BTreeMap<String, f64> {
        &self.dynamic
    }
}

impl Default for CeilingTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CEILING_FLOOR_MBPS, HashMap::new(), BTreeMap::new())
    }
}
