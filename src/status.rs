// Per-cycle status document for the dashboard renderer

use crate::engine::InterfaceReport;
use crate::error::{PersistenceError, PollError};
use crate::models::{GatewayStatus, HistorySnapshot};
use crate::persist;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    Ok,
    /// First poll (or first since the baseline was lost); rates arrive next cycle.
    Baseline,
    AuthFailure,
    TransportFailure,
    ParseFailure,
}

impl From<&PollError> for TargetState {
    fn from(e: &PollError) -> Self {
        match e {
            PollError::Auth { .. } => Self::AuthFailure,
            PollError::Transport { .. } => Self::TransportFailure,
            PollError::Parse { .. } => Self::ParseFailure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetReport {
    pub name: String,
    pub status: TargetState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub interfaces: BTreeMap<String, InterfaceReport>,
}

impl TargetReport {
    pub fn polled(
        name: &str,
        baseline: bool,
        poll_seconds: f64,
        interfaces: BTreeMap<String, InterfaceReport>,
    ) -> Self {
        Self {
            name: name.to_string(),
            status: if baseline { TargetState::Baseline } else { TargetState::Ok },
            poll_seconds: Some(poll_seconds),
            message: None,
            interfaces,
        }
    }

    pub fn failed(name: &str, error: &PollError) -> Self {
        Self {
            name: name.to_string(),
            status: TargetState::from(error),
            poll_seconds: None,
            message: Some(error.to_string()),
            interfaces: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub generated_at: DateTime<Utc>,
    pub poll_interval_secs: u64,
    /// Configured interface ids in display order.
    pub interface_order: Vec<String>,
    /// Targets in configuration order.
    pub targets: Vec<TargetReport>,
    pub active_target: Option<String>,
    pub gateways: Vec<GatewayStatus>,
    pub history: HistorySnapshot,
}

impl CycleReport {
    pub fn target(&self, name: &str) -> Option<&TargetReport> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn failed_targets(&self) -> impl Iterator<Item = &TargetReport> {
        self.targets.iter().filter(|t| {
            matches!(
                t.status,
                TargetState::AuthFailure | TargetState::TransportFailure | TargetState::ParseFailure
            )
        })
    }
}

pub struct StatusWriter {
    path: PathBuf,
}

impl StatusWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, report: &CycleReport) -> Result<(), PersistenceError> {
        persist::write_json(&self.path, report, true)
    }
}
