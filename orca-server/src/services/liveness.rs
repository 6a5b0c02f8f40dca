use orca_api::SensorLiveness;
use time::{Duration, OffsetDateTime};

/// A device or sensor counts as online when its newest timestamp is at
/// most this old.
pub const ONLINE_WINDOW: Duration = Duration::minutes(60);

/// Readings older than the online window but within this one are stale
/// rather than dead.
pub const STALE_WINDOW: Duration = Duration::minutes(1440);

/// Derived at query time from the stored timestamp and the caller's
/// clock; liveness is never persisted.
pub fn is_online(last_seen_at: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
    match last_seen_at {
        Some(last_seen_at) => now - last_seen_at <= ONLINE_WINDOW,
        None => false,
    }
}

pub fn seconds_ago(last_seen_at: Option<OffsetDateTime>, now: OffsetDateTime) -> Option<i64> {
    last_seen_at.map(|at| (now - at).whole_seconds())
}

/// Finer tiering for aggregated views, where "recently updated but past
/// the strict online window" must read differently from "truly dead".
pub fn sensor_liveness(logged_at: Option<OffsetDateTime>, now: OffsetDateTime) -> SensorLiveness {
    match logged_at {
        Some(at) if now - at <= ONLINE_WINDOW => SensorLiveness::Live,
        Some(at) if now - at <= STALE_WINDOW => SensorLiveness::Stale,
        Some(_) => SensorLiveness::Offline,
        None => SensorLiveness::Unknown,
    }
}
