// Pure history logic: newest-first insert, age + count pruning, active-target selection.
// File access (load, persist, corrupt-file backup) stays in history_repo::mod.

use crate::models::{HistoryPoint, HistorySnapshot, RateCycle};

pub const DEFAULT_RETENTION_SECS: i64 = 300;
pub const DEFAULT_MAX_ENTRIES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub window_secs: i64,
    pub max_entries: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_RETENTION_SECS,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Display precision of stored values.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Drop points older than `now - window`, then cap the length. Order matters: age first.
pub fn prune_points(points: &mut Vec<HistoryPoint>, now: i64, policy: RetentionPolicy) {
    let cutoff = now.saturating_sub(policy.window_secs);
    points.retain(|&(ts, _)| ts >= cutoff);
    points.truncate(policy.max_entries);
}

/// Insert one point per direction at the front of `display_name`'s series and prune it.
pub fn append(
    snapshot: &mut HistorySnapshot,
    display_name: &str,
    timestamp: i64,
    in_value: f64,
    out_value: f64,
    policy: RetentionPolicy,
) {
    let series = snapshot
        .interfaces
        .entry(display_name.to_string())
        .or_default();
    series.inbound.insert(0, (timestamp, round2(in_value)));
    series.outbound.insert(0, (timestamp, round2(out_value)));
    prune_points(&mut series.inbound, timestamp, policy);
    prune_points(&mut series.outbound, timestamp, policy);
}

/// Prune every series against `now`.
pub fn prune(snapshot: &mut HistorySnapshot, now: i64, policy: RetentionPolicy) {
    for series in snapshot.interfaces.values_mut() {
        prune_points(&mut series.inbound, now, policy);
        prune_points(&mut series.outbound, now, policy);
    }
}

/// Pick the target whose OK interfaces carry the most traffic (active member of a failover pair).
/// Ties keep the earlier target; when nobody carries traffic the first reporting target wins.
pub fn select_active<'a, I>(cycles: I) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a str, &'a RateCycle)>,
{
    let mut first = None;
    let mut best: Option<(&str, f64)> = None;
    for (target, cycle) in cycles {
        first.get_or_insert(target);
        let total = cycle.aggregate();
        if total > best.map_or(0.0, |(_, t)| t) {
            best = Some((target, total));
        }
    }
    best.map(|(t, _)| t).or(first)
}

/// Append the active target's OK interfaces at `now`. Returns the chosen target.
pub fn record_cycle<'a>(
    snapshot: &mut HistorySnapshot,
    cycles: &'a [(String, RateCycle)],
    now: i64,
    policy: RetentionPolicy,
) -> Option<&'a str> {
    let active = select_active(cycles.iter().map(|(t, c)| (t.as_str(), c)))?;
    let Some(results) = cycles
        .iter()
        .find(|(t, _)| t == active)
        .and_then(|(_, c)| c.results())
    else {
        return Some(active);
    };
    for result in results.values().filter(|r| r.status.is_ok()) {
        append(
            snapshot,
            &result.display_name,
            now,
            result.in_rate,
            result.out_rate,
            policy,
        );
    }
    Some(active)
}
