// Session cookie cache, one entry per target, persisted as JSON with ISO-8601 expiries.
// Expired entries stay on disk until the next successful login overwrites them.

use crate::error::{PersistenceError, Recovered};
use crate::models::{CachedCredential, Cookies};
use crate::persist;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

pub struct CredentialCache {
    path: PathBuf,
    entries: BTreeMap<String, CachedCredential>,
}

impl CredentialCache {
    /// Open the cache file. Unreadable or malformed content yields an empty cache plus a warning;
    /// a single unreadable entry is dropped and the rest are kept.
    #[instrument(skip_all, fields(repo = "credentials", operation = "open"))]
    pub fn open(path: impl Into<PathBuf>) -> Recovered<Self> {
        let path = path.into();
        match persist::read_json::<BTreeMap<String, serde_json::Value>>(&path) {
            Ok(raw) => {
                let mut entries = BTreeMap::new();
                let mut warning = None;
                for (target, value) in raw.unwrap_or_default() {
                    match serde_json::from_value::<CachedCredential>(value) {
                        Ok(credential) => {
                            entries.insert(target, credential);
                        }
                        Err(source) => {
                            warn!(firewall = %target, error = %source, "dropping unreadable cached credential");
                            warning = Some(PersistenceError::Decode {
                                path: path.clone(),
                                source,
                            });
                        }
                    }
                }
                debug!(targets = entries.len(), "credential cache loaded");
                Recovered {
                    value: Self { path, entries },
                    warning,
                }
            }
            Err(e) => Recovered::fallback(
                Self {
                    path,
                    entries: BTreeMap::new(),
                },
                e,
            ),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached credential for `target` if it has not expired yet.
    pub fn lookup(&self, target: &str) -> Option<&CachedCredential> {
        self.lookup_at(target, Utc::now())
    }

    pub fn lookup_at(&self, target: &str, now: DateTime<Utc>) -> Option<&CachedCredential> {
        self.entries.get(target).filter(|c| c.is_valid_at(now))
    }

    /// Replace the entry for `target` (expiry = now + ttl) and persist the whole cache.
    pub fn store(&mut self, target: &str, cookies: Cookies, ttl_hours: u32) -> Result<(), PersistenceError> {
        self.store_at(target, cookies, ttl_hours, Utc::now())
    }

    pub fn store_at(
        &mut self,
        target: &str,
        cookies: Cookies,
        ttl_hours: u32,
        now: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        let expiry = TimeDelta::try_hours(i64::from(ttl_hours))
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(PersistenceError::ExpiryOutOfRange { ttl_hours })?;
        self.entries
            .insert(target.to_string(), CachedCredential { cookies, expiry });
        debug!(firewall = %target, %expiry, "credential stored");
        persist::write_json(&self.path, &self.entries, true)
    }

    /// All entries, expired ones included.
    pub fn entries(&self) -> &BTreeMap<String, CachedCredential> {
        &self.entries
    }
}
