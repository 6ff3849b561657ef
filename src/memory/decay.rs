//! Confidence decay model.
//!
//! Stored confidence halves every `30 × stability` days since the belief's
//! last evidence-bearing update: 30-day half-life at the default stability of
//! 1.0, up to 150 days at the maximum of 5.0. Every read path that reports
//! confidence to a caller reports the effective value computed here.

use chrono::{DateTime, Utc};

/// Base half-life in days at stability 1.0.
pub const BASE_HALF_LIFE_DAYS: f64 = 30.0;

/// Effective confidence of a belief at `now`.
///
/// Pure and monotonically non-increasing in elapsed time; negative elapsed
/// time (clock skew) is clamped to zero so the result never exceeds the
/// stored value.
pub fn effective_confidence(
    stored: f64,
    updated_at: DateTime<Utc>,
    stability: f64,
    now: DateTime<Utc>,
) -> f64 {
    let days = days_between(updated_at, now).max(0.0);
    let half_life = BASE_HALF_LIFE_DAYS * stability.max(1.0);
    stored * 0.5_f64.powf(days / half_life)
}

/// Effective confidence from an RFC 3339 `updated_at` string as stored in the
/// database. An unparseable timestamp is logged and the stored value reported
/// unchanged, so one corrupt row degrades its own score rather than failing
/// the whole read.
pub fn effective_confidence_at(stored: f64, updated_at: &str, stability: f64) -> f64 {
    match parse_timestamp(updated_at) {
        Some(ts) => effective_confidence(stored, ts, stability, Utc::now()),
        None => {
            tracing::warn!(updated_at, "unparseable updated_at; reporting stored confidence undecayed");
            stored
        }
    }
}

/// Fractional days between two instants.
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 86_400_000.0
}

/// Fractional days since an RFC 3339 timestamp string, or `None` if it does
/// not parse.
pub fn days_since(timestamp: &str) -> Option<f64> {
    parse_timestamp(timestamp).map(|ts| days_between(ts, Utc::now()).max(0.0))
}

fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
