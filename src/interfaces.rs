// Interface id -> display name / underlying device name, with a shared refresh clock.

use crate::models::NAMES_REFRESH_KEY;
use std::collections::BTreeMap;

/// Names learned from a target in one refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceNameMap {
    pub display: BTreeMap<String, String>,
    pub real: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct InterfaceDirectory {
    names: BTreeMap<String, String>,
    real: BTreeMap<String, String>,
    updated: BTreeMap<String, f64>,
    refresh_secs: u64,
}

impl InterfaceDirectory {
    pub fn new(
        names: BTreeMap<String, String>,
        real: BTreeMap<String, String>,
        updated: BTreeMap<String, f64>,
        refresh_secs: u64,
    ) -> Self {
        Self {
            names,
            real,
            updated,
            refresh_secs,
        }
    }

    /// Display name for `id`, falling back to the id itself.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.names.get(id).map_or(id, String::as_str)
    }

    pub fn real_name(&self, id: &str) -> Option<&str> {
        self.real.get(id).map(String::as_str)
    }

    /// Names are stale when never fetched, empty, or older than the refresh interval.
    pub fn needs_refresh(&self, now: f64) -> bool {
        if self.names.is_empty() {
            return true;
        }
        match self.updated.get(NAMES_REFRESH_KEY) {
            None => true,
            Some(&last) => now - last > self.refresh_secs as f64,
        }
    }

    /// Merge freshly fetched names (never clears existing ones). Returns false if nothing came back.
    pub fn merge(&mut self, fetched: InterfaceNameMap, now: f64) -> bool {
        if fetched.display.is_empty() {
            return false;
        }
        self.names.extend(fetched.display);
        self.real.extend(fetched.real);
        self.updated.insert(NAMES_REFRESH_KEY.to_string(), now);
        true
    }

    /// Seed names from configuration without touching the refresh clock.
    pub fn seed(&mut self, names: &BTreeMap<String, String>) {
        for (id, name) in names {
            self.names.entry(id.clone()).or_insert_with(|| name.clone());
        }
    }

    /// Real device names for the configured ids; falls back to the ids when none are known.
    pub fn real_names_for(&self, ids: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            match self.real_name(id) {
                Some(r) => out.push(r.to_string()),
                None => tracing::debug!(interface = %id, "no real interface mapping"),
            }
        }
        if out.is_empty() { ids.to_vec() } else { out }
    }

    pub fn names(&self) -> &BTreeMap<String, String> {
        &self.names
    }

    pub fn real(&self) -> &BTreeMap<String, String> {
        &self.real
    }

    pub fn updated(&self) -> &BTreeMap<String, f64> {
        &self.updated
    }
}
