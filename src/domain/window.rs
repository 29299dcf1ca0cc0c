// Resolve a trailing lookback duration to a left-edge index in the time ring
use super::ring::TimeRing;
use super::time::seconds_between;
use chrono::{DateTime, Utc};

/// Index of the first timestamp no older than `lookback_secs` before the
/// newest one.
///
/// Falls back to `0` when the lookback reaches past the oldest entry and to
/// `len - 1` when nothing qualifies (zero/negative lookback against skewed
/// clocks). Never mutates the ring.
pub fn index_of(times: &TimeRing, lookback_secs: f64) -> usize {
    lower_bound(times.len(), |i| times.get(i).copied(), lookback_secs)
}

/// Same as [`index_of`] over a plain slice, e.g. the times of a snapshot.
pub fn index_of_times(times: &[DateTime<Utc>], lookback_secs: f64) -> usize {
    lower_bound(times.len(), |i| times.get(i).copied(), lookback_secs)
}

fn lower_bound<F>(len: usize, at: F, lookback_secs: f64) -> usize
where
    F: Fn(usize) -> Option<DateTime<Utc>>,
{
    let Some(newest) = len.checked_sub(1).and_then(&at) else {
        return 0;
    };

    // Timestamps are non-decreasing, so "older than the target" is a prefix.
    let is_before_target =
        |i: usize| at(i).is_some_and(|t| seconds_between(t, newest) > lookback_secs);

    let (mut lo, mut hi) = (0, len);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if is_before_target(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    lo.min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn ring_at_tenths(capacity: usize) -> (TimeRing, DateTime<Utc>) {
        let start = Utc::now();
        let ring = TimeRing::seeded(capacity, start, TimeDelta::milliseconds(100));
        (ring, start)
    }

    #[test]
    fn test_lookback_lower_bound() {
        let (ring, _) = ring_at_tenths(500);
        let times = ring.snapshot();
        let newest = *times.last().unwrap();

        for lookback in [0.05, 1.0, 2.5, 10.0, 49.9] {
            let i = index_of(&ring, lookback);
            assert!(seconds_between(times[i], newest) <= lookback + 1e-9);
            if i > 0 {
                assert!(seconds_between(times[i - 1], newest) > lookback);
            }
        }
    }

    #[test]
    fn test_exact_lookback_hits_entry() {
        let (ring, _) = ring_at_tenths(500);
        // 10 s back from the newest entry is exactly 100 entries earlier
        assert_eq!(index_of(&ring, 10.0), 399);
    }

    #[test]
    fn test_lookback_longer_than_span() {
        let (ring, _) = ring_at_tenths(300);
        assert_eq!(index_of(&ring, 3600.0), 0);
    }

    #[test]
    fn test_negative_lookback_shows_newest_point() {
        let (ring, _) = ring_at_tenths(300);
        assert_eq!(index_of(&ring, -1.0), 299);
        assert_eq!(index_of(&ring, 0.0), 299);
    }

    #[test]
    fn test_slice_matches_ring() {
        let (ring, _) = ring_at_tenths(120);
        let times = ring.snapshot();
        assert_eq!(index_of_times(&times, 4.0), index_of(&ring, 4.0));
        assert_eq!(index_of_times(&[], 4.0), 0);
    }
}
