use crate::ceiling::DEFAULT_CEILING_FLOOR_MBPS;
use crate::history_repo::retention::{DEFAULT_MAX_ENTRIES, DEFAULT_RETENTION_SECS, RetentionPolicy};
use crate::rate_calc::DEFAULT_IMPLAUSIBLE_MBPS;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub session: SessionConfig,
    pub bandwidth: BandwidthConfig,
    pub targets: Vec<TargetConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    pub poll_interval_secs: u64,
    /// Directory for the monitor data and history files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Where the per-cycle status document is written for the renderer.
    pub status_output: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// One year.
pub const MAX_EXPIRY_HOURS: u32 = 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub auth_file: PathBuf,
    pub expiry_hours: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BandwidthConfig {
    /// Raw interface ids to request, in display order (e.g. "wan", "lan", "opt1").
    pub interfaces: Vec<String>,
    #[serde(default = "default_ceiling_floor")]
    pub ceiling_floor_mbps: f64,
    #[serde(default = "default_implausible")]
    pub implausible_mbps: f64,
    #[serde(default = "default_retention_secs")]
    pub history_retention_secs: i64,
    #[serde(default = "default_max_entries")]
    pub history_max_entries: usize,
    #[serde(default = "default_refresh_secs")]
    pub interface_refresh_secs: u64,
    /// Fixed chart ceilings by raw interface id; these interfaces never track peaks.
    #[serde(default)]
    pub manual_ceilings: HashMap<String, f64>,
    /// Display names by raw interface id, used until a target reports its own.
    #[serde(default)]
    pub interface_names: BTreeMap<String, String>,
}

fn default_ceiling_floor() -> f64 {
    DEFAULT_CEILING_FLOOR_MBPS
}

fn default_implausible() -> f64 {
    DEFAULT_IMPLAUSIBLE_MBPS
}

fn default_retention_secs() -> i64 {
    DEFAULT_RETENTION_SECS
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_refresh_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl BandwidthConfig {
    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy {
            window_secs: self.history_retention_secs,
            max_entries: self.history_max_entries,
        }
    }
}

impl GeneralConfig {
    pub fn monitor_file(&self) -> PathBuf {
        self.data_dir.join("pfsense_monitor_data.json")
    }

    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join("bandwidth_history.json")
    }
}

impl AppConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path.display(), e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.general.poll_interval_secs > 0,
            "general.poll_interval_secs must be > 0, got {}",
            self.general.poll_interval_secs
        );
        anyhow::ensure!(
            !self.general.status_output.as_os_str().is_empty(),
            "general.status_output must be non-empty"
        );
        anyhow::ensure!(
            !self.session.auth_file.as_os_str().is_empty(),
            "session.auth_file must be non-empty"
        );
        anyhow::ensure!(
            (1..=MAX_EXPIRY_HOURS).contains(&self.session.expiry_hours),
            "session.expiry_hours must be between 1 and {}, got {}",
            MAX_EXPIRY_HOURS,
            self.session.expiry_hours
        );
        anyhow::ensure!(
            !self.bandwidth.interfaces.is_empty(),
            "bandwidth.interfaces must list at least one interface"
        );
        anyhow::ensure!(
            self.bandwidth.ceiling_floor_mbps >= 0.0,
            "bandwidth.ceiling_floor_mbps must be >= 0, got {}",
            self.bandwidth.ceiling_floor_mbps
        );
        anyhow::ensure!(
            self.bandwidth.implausible_mbps > 0.0,
            "bandwidth.implausible_mbps must be > 0, got {}",
            self.bandwidth.implausible_mbps
        );
        anyhow::ensure!(
            self.bandwidth.history_retention_secs > 0,
            "bandwidth.history_retention_secs must be > 0, got {}",
            self.bandwidth.history_retention_secs
        );
        anyhow::ensure!(
            self.bandwidth.history_max_entries > 0,
            "bandwidth.history_max_entries must be > 0, got {}",
            self.bandwidth.history_max_entries
        );
        for (id, value) in &self.bandwidth.manual_ceilings {
            anyhow::ensure!(
                *value > 0.0,
                "bandwidth.manual_ceilings.{} must be > 0, got {}",
                id,
                value
            );
        }
        anyhow::ensure!(!self.targets.is_empty(), "targets must list at least one target");
        let mut seen = HashSet::new();
        for t in &self.targets {
            anyhow::ensure!(!t.name.is_empty(), "targets.name must be non-empty");
            anyhow::ensure!(
                seen.insert(t.name.as_str()),
                "targets.name must be unique, '{}' appears twice",
                t.name
            );
            anyhow::ensure!(!t.url.is_empty(), "targets.url must be non-empty for '{}'", t.name);
            anyhow::ensure!(
                t.timeout_secs > 0,
                "targets.timeout_secs must be > 0 for '{}'",
                t.name
            );
        }
        Ok(())
    }
}
