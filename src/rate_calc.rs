// Counter-to-rate conversion: previous vs current raw snapshot per target -> Mbps per interface.
// Every interface is classified independently; one bad interface never blocks the others,
// and the current snapshot always becomes the next baseline.

use crate::interfaces::InterfaceDirectory;
use crate::models::{
    CounterSnapshot, DirectionSample, RateCycle, RateResult, RateStatus, counter_as_u64,
};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Rates above this are reported with a warning (not clamped).
pub const DEFAULT_IMPLAUSIBLE_MBPS: f64 = 20_000.0;

const DIRECTIONS: [&str; 2] = ["in", "out"];

/// Why an interface produced no rate this poll.
#[derive(Debug, Error, PartialEq)]
pub enum RateError {
    #[error("interface not present in previous snapshot")]
    NewInterface,
    #[error("incomplete data: {current} current / {previous} previous direction samples")]
    IncompleteData { current: usize, previous: usize },
    #[error("invalid {which} sample format")]
    InvalidFormat { which: &'static str },
    #[error("non-positive time difference: {delta}s")]
    InvalidTime { delta: i64 },
    #[error("missing {direction} counter value")]
    MissingValues { direction: &'static str },
    #[error("{direction} counter is not an unsigned 64-bit value")]
    BadCounter { direction: &'static str },
}

impl RateError {
    pub fn status(&self) -> RateStatus {
        match self {
            Self::NewInterface => RateStatus::NewInterface,
            Self::IncompleteData { .. } => RateStatus::IncompleteData,
            Self::InvalidFormat { .. } => RateStatus::InvalidFormat,
            Self::InvalidTime { .. } => RateStatus::InvalidTime,
            Self::MissingValues { .. } => RateStatus::MissingValues,
            Self::BadCounter { .. } => RateStatus::Error,
        }
    }
}

/// Bytes moved between two readings of a 64-bit counter, treating a decrease as one rollover.
pub fn byte_delta(previous: u64, current: u64) -> u64 {
    // (2^64 - previous) + current when current < previous
    current.wrapping_sub(previous)
}

pub fn megabits_per_second(bytes: u64, seconds: i64) -> f64 {
    (bytes as f64 * 8.0) / (seconds as f64 * 1_000_000.0)
}

/// Both directions of one interface, in Mbps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterfaceRates {
    pub in_mbps: f64,
    pub out_mbps: f64,
}

/// Rates for one interface from its current and previous samples.
pub fn evaluate_interface(
    current: &[DirectionSample],
    previous: Option<&[DirectionSample]>,
) -> Result<InterfaceRates, RateError> {
    let previous = previous.ok_or(RateError::NewInterface)?;
    if current.len() < 2 || previous.len() < 2 {
        return Err(RateError::IncompleteData {
            current: current.len(),
            previous: previous.len(),
        });
    }
    if !current[..2].iter().all(DirectionSample::has_pair) {
        return Err(RateError::InvalidFormat { which: "current" });
    }
    if !previous[..2].iter().all(DirectionSample::has_pair) {
        return Err(RateError::InvalidFormat { which: "previous" });
    }
    let current_ts = current[0]
        .timestamp()
        .ok_or(RateError::InvalidFormat { which: "current" })?;
    let previous_ts = previous[0]
        .timestamp()
        .ok_or(RateError::InvalidFormat { which: "previous" })?;

    let delta = current_ts.saturating_sub(previous_ts);
    if delta <= 0 {
        return Err(RateError::InvalidTime { delta });
    }

    let mut pairs = Vec::with_capacity(DIRECTIONS.len());
    for (i, &direction) in DIRECTIONS.iter().enumerate() {
        match (current[i].counter_value(), previous[i].counter_value()) {
            (Some(c), Some(p)) => pairs.push((direction, c, p)),
            _ => return Err(RateError::MissingValues { direction }),
        }
    }

    let mut mbps = [0.0_f64; 2];
    for (i, (direction, c, p)) in pairs.into_iter().enumerate() {
        let (Some(c), Some(p)) = (counter_as_u64(c), counter_as_u64(p)) else {
            return Err(RateError::BadCounter { direction });
        };
        if c < p {
            debug!(direction, previous = p, current = c, "counter rollover");
        }
        mbps[i] = megabits_per_second(byte_delta(p, c), delta);
    }

    Ok(InterfaceRates {
        in_mbps: mbps[0],
        out_mbps: mbps[1],
    })
}

/// Holds the previous snapshot of every target.
#[derive(Debug, Clone)]
pub struct RateCalculator {
    previous: BTreeMap<String, CounterSnapshot>,
    implausible_mbps: f64,
}

impl Default for RateCalculator {
    fn default() -> Self {
        Self::new(BTreeMap::new(), DEFAULT_IMPLAUSIBLE_MBPS)
    }
}

impl RateCalculator {
    pub fn new(previous: BTreeMap<String, CounterSnapshot>, implausible_mbps: f64) -> Self {
        Self {
            previous,
            implausible_mbps,
        }
    }

    pub fn previous(&self) -> &BTreeMap<String, CounterSnapshot> {
        &self.previous
    }

    /// Compare `current` against the stored snapshot for `target`, then store `current`.
    #[instrument(skip(self, current, names), fields(firewall = %target, interfaces = current.len()))]
    pub fn calculate(
        &mut self,
        target: &str,
        current: CounterSnapshot,
        names: &InterfaceDirectory,
    ) -> RateCycle {
        let Some(previous) = self.previous.get(target) else {
            info!("no prior data; storing baseline snapshot");
            self.previous.insert(target.to_string(), current);
            return RateCycle::NoPriorData;
        };

        let mut results = BTreeMap::new();
        for (id, samples) in &current {
            let display_name = names.display_name(id).to_string();
            let sample_timestamp = samples.first().and_then(DirectionSample::timestamp).unwrap_or(0);

            let result = match evaluate_interface(samples, previous.get(id).map(Vec::as_slice)) {
                Ok(rates) => {
                    let implausible = rates.in_mbps > self.implausible_mbps
                        || rates.out_mbps > self.implausible_mbps;
                    if implausible {
                        warn!(
                            interface = %id,
                            display_name = %display_name,
                            in_mbps = rates.in_mbps,
                            out_mbps = rates.out_mbps,
                            limit_mbps = self.implausible_mbps,
                            "implausibly high bandwidth"
                        );
                    }
                    debug!(
                        interface = %id,
                        display_name = %display_name,
                        in_mbps = rates.in_mbps,
                        out_mbps = rates.out_mbps,
                        "calculated bandwidth"
                    );
                    RateResult {
                        in_rate: rates.in_mbps,
                        out_rate: rates.out_mbps,
                        sample_timestamp,
                        display_name,
                        status: RateStatus::Ok,
                        implausible,
                    }
                }
                Err(e) => {
                    if e == RateError::NewInterface {
                        info!(interface = %id, display_name = %display_name, "new interface; rate available next poll");
                    } else {
                        debug!(interface = %id, reason = %e, "skipping rate calculation");
                    }
                    RateResult::zero(display_name, e.status(), sample_timestamp)
                }
            };
            results.insert(id.clone(), result);
        }

        self.previous.insert(target.to_string(), current);
        RateCycle::Computed(results)
    }
}
