// Computed per-interface rates

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome tag for one interface in one poll; serializes to snake_case (e.g. "invalid_time").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateStatus {
    Ok,
    NewInterface,
    IncompleteData,
    InvalidFormat,
    InvalidTime,
    MissingValues,
    Error,
}

impl RateStatus {
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NewInterface => "new_interface",
            Self::IncompleteData => "incomplete_data",
            Self::InvalidFormat => "invalid_format",
            Self::InvalidTime => "invalid_time",
            Self::MissingValues => "missing_values",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for RateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rates in megabits per second. Non-OK results always carry zero rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateResult {
    pub in_rate: f64,
    pub out_rate: f64,
    pub sample_timestamp: i64,
    pub display_name: String,
    pub status: RateStatus,
    /// Either direction exceeded the implausibility ceiling (value kept as computed).
    #[serde(default)]
    pub implausible: bool,
}

impl RateResult {
    pub fn zero(display_name: impl Into<String>, status: RateStatus, sample_timestamp: i64) -> Self {
        Self {
            in_rate: 0.0,
            out_rate: 0.0,
            sample_timestamp,
            display_name: display_name.into(),
            status,
            implausible: false,
        }
    }

    /// in + out, the figure used to pick the active target of a failover pair.
    pub fn total(&self) -> f64 {
        self.in_rate + self.out_rate
    }
}

/// What one poll of one target produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RateCycle {
    /// No earlier snapshot for the target; the current one became the baseline.
    NoPriorData,
    /// Per-interface results keyed by raw interface id.
    Computed(BTreeMap<String, RateResult>),
}

impl RateCycle {
    pub fn results(&self) -> Option<&BTreeMap<String, RateResult>> {
        match self {
            Self::NoPriorData => None,
            Self::Computed(r) => Some(r),
        }
    }

    /// Sum of in+out over every OK interface.
    pub fn aggregate(&self) -> f64 {
        self.results()
            .map(|r| r.values().filter(|x| x.status.is_ok()).map(RateResult::total).sum())
            .unwrap_or(0.0)
    }
}
