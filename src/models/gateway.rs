// Gateway health rows (parsed by a collaborator) and their classification

use serde::{Deserialize, Serialize};

/// One gateway row as reported by the appliance. The gateway address is deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayReading {
    pub name: String,
    pub delay: String,
    pub stddev: String,
    pub loss: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayHealth {
    Online,
    Degraded,
    Down,
}

impl GatewayHealth {
    /// "offline" anywhere in the status wins; packet loss (flagged or measured) degrades.
    pub fn classify(status: &str, loss: &str) -> Self {
        let status = status.to_lowercase();
        if status.contains("offline") {
            Self::Down
        } else if status.contains("packetloss") || loss.trim() != "0.0%" {
            Self::Degraded
        } else {
            Self::Online
        }
    }
}

/// A classified gateway, tagged with the target it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayStatus {
    pub target: String,
    pub id: String,
    pub health: GatewayHealth,
    #[serde(flatten)]
    pub reading: GatewayReading,
}

impl GatewayStatus {
    pub fn new(target: &str, reading: GatewayReading) -> Self {
        Self {
            target: target.to_string(),
            id: format!("{}_{}", target, reading.name),
            health: GatewayHealth::classify(&reading.status, &reading.loss),
            reading,
        }
    }
}

/// Unhealthy gateways first, then by target and name.
pub fn sort_gateways(gateways: &mut [GatewayStatus]) {
    gateways.sort_by(|a, b| {
        (a.health == GatewayHealth::Online, &a.target, &a.reading.name).cmp(&(
            b.health == GatewayHealth::Online,
            &b.target,
            &b.reading.name,
        ))
    });
}
