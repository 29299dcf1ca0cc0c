// Time helpers shared by the rings and estimators
use chrono::{DateTime, Utc};

/// Signed number of seconds from `earlier` to `later`.
pub fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let delta = later - earlier;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

/// Render an elapsed duration the way the rig's text panel does: `H:MM:SS`,
/// fractional seconds dropped.
pub fn format_elapsed(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 { secs.trunc() as u64 } else { 0 };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}
