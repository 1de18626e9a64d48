// What the poll worker needs from an appliance. Markup scraping lives behind this seam;
// methods with default bodies are optional capabilities.

use crate::config::TargetConfig;
use crate::error::PollError;
use crate::interfaces::InterfaceNameMap;
use crate::models::{Cookies, CounterSnapshot, GatewayReading};

/// Interfaces to request counters for.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterRequest {
    /// Configured raw ids (e.g. "wan", "opt1").
    pub interfaces: Vec<String>,
    /// Underlying device names (e.g. "igb0"), or the ids when none are known.
    pub real_interfaces: Vec<String>,
}

#[allow(async_fn_in_trait)]
pub trait TargetSource {
    type Session;

    /// Rebuild a session from cached cookies without a login round trip.
    async fn resume(&self, target: &TargetConfig, cookies: &Cookies) -> Result<Self::Session, PollError>;

    /// Authenticate and return the session plus its cookies for caching.
    async fn login(&self, target: &TargetConfig) -> Result<(Self::Session, Cookies), PollError>;

    async fn counters(
        &self,
        session: &Self::Session,
        target: &TargetConfig,
        request: &CounterRequest,
    ) -> Result<CounterSnapshot, PollError>;

    /// Interface display names and device names. `None` when the source cannot provide them.
    async fn interface_names(
        &self,
        _session: &Self::Session,
        _target: &TargetConfig,
    ) -> Result<Option<InterfaceNameMap>, PollError> {
        Ok(None)
    }

    async fn gateways(
        &self,
        _session: &Self::Session,
        _target: &TargetConfig,
    ) -> Result<Vec<GatewayReading>, PollError> {
        Ok(Vec::new())
    }
}
