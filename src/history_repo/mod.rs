// Bandwidth history file: one JSON document, rewritten whole after every cycle.
// Loads never fail: a missing or blank file yields a fresh structure, a corrupt one is
// backed up to <file>.bak first.

pub mod retention;

use crate::error::{PersistenceError, Recovered};
use crate::models::{HistorySnapshot, RateCycle};
use crate::persist;
use retention::RetentionPolicy;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

pub struct HistoryRepo {
    path: PathBuf,
    policy: RetentionPolicy,
    interval_secs: u64,
}

impl HistoryRepo {
    /// `interval_secs` is the poll interval recorded in fresh files (for chart spacing).
    pub fn new(path: impl Into<PathBuf>, policy: RetentionPolicy, interval_secs: u64) -> Self {
        Self {
            path: path.into(),
            policy,
            interval_secs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    pub fn empty(&self, now: i64) -> HistorySnapshot {
        HistorySnapshot::empty(now, self.interval_secs)
    }

    #[instrument(skip(self), fields(repo = "history", operation = "load"))]
    pub fn load(&self, now: i64) -> Recovered<HistorySnapshot> {
        match persist::read_json::<HistorySnapshot>(&self.path) {
            Ok(Some(mut snapshot)) => {
                retention::prune(&mut snapshot, now, self.policy);
                debug!(interfaces = snapshot.interfaces.len(), "history loaded");
                Recovered::clean(snapshot)
            }
            Ok(None) => {
                info!(path = %self.path.display(), "no history file; starting fresh");
                Recovered::clean(self.empty(now))
            }
            Err(e @ PersistenceError::Decode { .. }) => {
                warn!(error = %e, "history file corrupt; recreating");
                persist::backup_corrupt(&self.path);
                Recovered::fallback(self.empty(now), e)
            }
            Err(e) => Recovered::fallback(self.empty(now), e),
        }
    }

    /// Stamp and write the snapshot. A failed write is logged; the next cycle tries again.
    #[instrument(skip(self, snapshot), fields(repo = "history", operation = "persist"))]
    pub fn persist(&self, snapshot: &mut HistorySnapshot, now: i64) -> bool {
        snapshot.timestamp = now;
        match persist::write_json(&self.path, snapshot, false) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to save bandwidth history");
                false
            }
        }
    }

    pub fn append(
        &self,
        snapshot: &mut HistorySnapshot,
        display_name: &str,
        timestamp: i64,
        in_value: f64,
        out_value: f64,
    ) {
        retention::append(
            snapshot,
            display_name,
            timestamp,
            in_value,
            out_value,
            self.policy,
        );
    }

    /// Update history from one cycle's results (active target only) and prune every series.
    pub fn record_cycle(
        &self,
        snapshot: &mut HistorySnapshot,
        cycles: &[(String, RateCycle)],
        now: i64,
    ) -> Option<String> {
        let active = retention::record_cycle(snapshot, cycles, now, self.policy).map(str::to_string);
        retention::prune(snapshot, now, self.policy);
        match active {
            Some(ref t) => debug!(
                active_target = %t,
                interfaces = snapshot.interfaces.len(),
                "updated bandwidth history"
            ),
            None => info!("no target reported data; history unchanged"),
        }
        active
    }
}
