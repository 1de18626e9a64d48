// Cached appliance session credentials

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::collections::BTreeMap;

/// Opaque cookie bundle (cookie name -> value).
pub type Cookies = BTreeMap<String, String>;

/// One target's session: cookies plus an absolute expiry (ISO-8601 on disk).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedCredential {
    #[serde(default)]
    pub cookies: Cookies,
    #[serde(deserialize_with = "deserialize_expiry")]
    pub expiry: DateTime<Utc>,
}

impl CachedCredential {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expiry
    }
}

/// RFC 3339, or an offset-less `YYYY-MM-DDTHH:MM:SS[.ffffff]` taken as local time.
fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = raw.parse::<NaiveDateTime>().ok()?;
    // Nonexistent local times (DST gap) fall back to UTC.
    Some(match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => naive.and_utc(),
    })
}

fn deserialize_expiry<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_expiry(&raw).ok_or_else(|| de::Error::custom(format!("invalid expiry timestamp '{raw}'")))
}
