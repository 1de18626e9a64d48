// Monitor data store: previous raw counters, interface names, dynamic ceilings, poll times.

use crate::error::{PersistenceError, Recovered};
use crate::models::MonitorData;
use crate::persist;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

pub struct MonitorStore {
    path: PathBuf,
}

impl MonitorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file: empty state. Unreadable or malformed: empty state plus a warning.
    #[instrument(skip(self), fields(repo = "monitor", operation = "load"))]
    pub fn load(&self) -> Recovered<MonitorData> {
        match persist::read_json::<MonitorData>(&self.path) {
            Ok(Some(data)) => {
                debug!(
                    targets = data.raw_counters.len(),
                    names = data.interface_names.len(),
                    ceilings = data.max_bandwidth.len(),
                    "monitor data loaded"
                );
                Recovered::clean(data)
            }
            Ok(None) => {
                info!(path = %self.path.display(), "no monitor data file");
                Recovered::clean(MonitorData::default())
            }
            Err(e) => Recovered::fallback(MonitorData::default(), e),
        }
    }

    #[instrument(skip(self, data), fields(repo = "monitor", operation = "save"))]
    pub fn save(&self, data: &MonitorData) -> Result<(), PersistenceError> {
        persist::write_json(&self.path, data, true)
    }
}
