// Domain models: counters, rates, history, credentials, persisted monitor state

mod counters;
mod credential;
mod gateway;
mod history;
mod rate;
mod store;

pub use counters::{CounterSnapshot, DirectionSample, counter_as_u64};
pub use credential::{CachedCredential, Cookies};
pub use gateway::{GatewayHealth, GatewayReading, GatewayStatus, sort_gateways};
pub use history::{HistoryPoint, HistorySeries, HistorySnapshot};
pub use rate::{RateCycle, RateResult, RateStatus};
pub use store::{MonitorData, NAMES_REFRESH_KEY};
