// Per-process telemetry state: rate baselines, ceilings, interface names and poll timings.
// Built from the monitor data file at startup and flattened back into it after every cycle.

use crate::ceiling::CeilingTracker;
use crate::config::BandwidthConfig;
use crate::interfaces::InterfaceDirectory;
use crate::models::{CounterSnapshot, MonitorData, RateCycle, RateStatus};
use crate::rate_calc::RateCalculator;
use serde::Serialize;
use std::collections::BTreeMap;

/// One interface as shown on the dashboard: rates plus the ceilings to scale its chart by.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceReport {
    pub display_name: String,
    pub in_rate: f64,
    pub out_rate: f64,
    pub status: RateStatus,
    pub implausible: bool,
    pub in_ceiling: f64,
    pub out_ceiling: f64,
    pub sample_timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct Engine {
    rates: RateCalculator,
    ceilings: CeilingTracker,
    interfaces: InterfaceDirectory,
    polling_times: BTreeMap<String, f64>,
}

impl Engine {
    pub fn new(rates: RateCalculator, ceilings: CeilingTracker, interfaces: InterfaceDirectory) -> Self {
        Self {
            rates,
            ceilings,
            interfaces,
            polling_times: BTreeMap::new(),
        }
    }

    /// Restore from persisted monitor data. Configured names fill gaps the file does not cover.
    pub fn from_state(data: MonitorData, config: &BandwidthConfig) -> Self {
        let MonitorData {
            raw_counters,
            interface_names,
            interface_names_updated,
            real_interfaces,
            max_bandwidth,
            polling_times,
            timestamp: _,
        } = data;
        let mut interfaces = InterfaceDirectory::new(
            interface_names,
            real_interfaces,
            interface_names_updated,
            config.interface_refresh_secs,
        );
        interfaces.seed(&config.interface_names);
        let mut engine = Self::new(
            RateCalculator::new(raw_counters, config.implausible_mbps),
            CeilingTracker::new(
                config.ceiling_floor_mbps,
                config.manual_ceilings.clone(),
                max_bandwidth,
            ),
            interfaces,
        );
        engine.polling_times = polling_times;
        engine
    }

    /// Rates for one target's snapshot; OK results feed the ceiling tracker.
    pub fn process(&mut self, target: &str, snapshot: CounterSnapshot) -> RateCycle {
        let cycle = self.rates.calculate(target, snapshot, &self.interfaces);
        if let Some(results) = cycle.results() {
            for (id, r) in results.iter().filter(|(_, r)| r.status.is_ok()) {
                self.ceilings.update(id, &r.display_name, r.in_rate, r.out_rate);
            }
        }
        cycle
    }

    /// Dashboard rows for a processed cycle, keyed by raw interface id.
    pub fn report(&self, cycle: &RateCycle) -> BTreeMap<String, InterfaceReport> {
        let Some(results) = cycle.results() else {
            return BTreeMap::new();
        };
        results
            .iter()
            .map(|(id, r)| {
                let (in_ceiling, out_ceiling) = self.ceilings.effective(id, &r.display_name);
                let row = InterfaceReport {
                    display_name: r.display_name.clone(),
                    in_rate: r.in_rate,
                    out_rate: r.out_rate,
                    status: r.status,
                    implausible: r.implausible,
                    in_ceiling,
                    out_ceiling,
                    sample_timestamp: r.sample_timestamp,
                };
                (id.clone(), row)
            })
            .collect()
    }

    pub fn record_poll_time(&mut self, target: &str, seconds: f64) {
        self.polling_times.insert(target.to_string(), seconds);
    }

    pub fn polling_times(&self) -> &BTreeMap<String, f64> {
        &self.polling_times
    }

    pub fn interfaces(&self) -> &InterfaceDirectory {
        &self.interfaces
    }

    pub fn interfaces_mut(&mut self) -> &mut InterfaceDirectory {
        &mut self.interfaces
    }

    pub fn ceilings(&self) -> &CeilingTracker {
        &self.ceilings
    }

    pub fn rates(&self) -> &RateCalculator {
        &self.rates
    }

    pub fn to_state(&self, now: i64) -> MonitorData {
        MonitorData {
            raw_counters: self.rates.previous().clone(),
            interface_names: self.interfaces.names().clone(),
            interface_names_updated: self.interfaces.updated().clone(),
            real_interfaces: self.interfaces.real().clone(),
            max_bandwidth: self.ceilings.dynamic().clone(),
            polling_times: self.polling_times.clone(),
            timestamp: now,
        }
    }
}
