// Fixed-capacity rolling buffers backing every plotted channel
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::VecDeque;

/// FIFO ring that always holds exactly `capacity` items.
///
/// Every push evicts the oldest entry, so the length never changes after
/// construction. This is what keeps the time ring and the channel buffers
/// index-aligned.
#[derive(Debug, Clone)]
pub struct Ring<T> {
    items: VecDeque<T>,
}

/// Arrival timestamps, one per tick.
pub type TimeRing = Ring<DateTime<Utc>>;

/// Scalar history of one channel, aligned with a [`TimeRing`].
pub type ChannelBuffer = Ring<f64>;

impl<T: Clone> Ring<T> {
    /// Ring of `capacity` copies of `value` (capacity is at least one).
    pub fn filled(capacity: usize, value: T) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: std::iter::repeat_n(value, capacity).collect(),
        }
    }

    pub fn push(&mut self, value: T) {
        self.items.pop_front();
        self.items.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn last(&self) -> &T {
        // never empty: built with at least one item and push keeps the length
        &self.items[self.items.len() - 1]
    }

    /// Ordered copy of the ring contents, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl Ring<DateTime<Utc>> {
    /// Time ring pre-seeded with `capacity` timestamps spaced `period` apart,
    /// the newest one `period` before `start`.
    pub fn seeded(capacity: usize, start: DateTime<Utc>, period: TimeDelta) -> Self {
        let capacity = capacity.max(1);
        let first = start - period * capacity as i32;
        Self {
            items: (0..capacity).map(|i| first + period * i as i32).collect(),
        }
    }
}

impl Ring<f64> {
    pub fn min(&self) -> f64 {
        self.items.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.items.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_length() {
        let mut ring = ChannelBuffer::filled(5, 0.0);
        for i in 0..12 {
            ring.push(i as f64);
            assert_eq!(ring.len(), 5);
        }
        assert_eq!(ring.snapshot(), vec![7.0, 8.0, 9.0, 10.0, 11.0]);
        assert_eq!(*ring.last(), 11.0);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut ring = ChannelBuffer::filled(0, 1.0);
        ring.push(2.0);
        assert_eq!(ring.snapshot(), vec![2.0]);
    }

    #[test]
    fn test_seeded_time_ring() {
        let start = Utc::now();
        let period = TimeDelta::milliseconds(100);
        let ring = TimeRing::seeded(500, start, period);

        assert_eq!(ring.len(), 500);
        assert_eq!(*ring.last(), start - period);
        assert_eq!(*ring.get(0).unwrap(), start - TimeDelta::seconds(50));
        let times = ring.snapshot();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_min_max() {
        let mut ring = ChannelBuffer::filled(3, 4.0);
        ring.push(-2.0);
        ring.push(9.5);
        assert_eq!(ring.min(), -2.0);
        assert_eq!(ring.max(), 9.5);
    }
}
