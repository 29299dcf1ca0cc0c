// Heart rate from peak counting on the optical (IR) waveform
use super::ring::{ChannelBuffer, TimeRing};
use super::time::seconds_between;
use serde::Deserialize;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveformSettings {
    /// Newest IR value must exceed this for a finger to count as present.
    pub presence_threshold: f64,
    /// Gated ticks between two peak scans.
    pub scan_every: u32,
    /// Positions examined per scan.
    pub scan_len: usize,
    /// Positions left unscanned at the newest end of the buffer.
    pub tail_margin: usize,
}

impl Default for WaveformSettings {
    fn default() -> Self {
        Self {
            presence_threshold: 80_000.0,
            scan_every: 50,
            scan_len: 40,
            tail_margin: 10,
        }
    }
}

impl WaveformSettings {
    /// Buffer positions scanned for peaks, anchored to the tail so the window
    /// follows any buffer capacity. The two neighbours needed on each side
    /// must exist, hence the `+ 2` slack at both ends.
    pub fn scan_range(&self, capacity: usize) -> Option<Range<usize>> {
        let end = capacity.checked_sub(self.tail_margin)?;
        let start = end.checked_sub(self.scan_len)?;
        if start < 2 || end + 2 > capacity || start >= end {
            return None;
        }
        Some(start..end)
    }
}

/// Count strict local maxima of `values` at the positions in `range`: a
/// point counts when it is greater than both of its two left and both of its
/// two right neighbours. Positions without two neighbours on each side are
/// skipped.
pub fn count_peaks_in(values: &[f64], range: Range<usize>) -> usize {
    range
        .filter(|&i| i >= 2 && i + 2 < values.len())
        .filter(|&i| {
            let v = values[i];
            v > values[i - 1] && v > values[i - 2] && v > values[i + 1] && v > values[i + 2]
        })
        .count()
}

/// Peaks over every interior point of a window.
pub fn count_peaks(window: &[f64]) -> usize {
    count_peaks_in(window, 2..window.len().saturating_sub(2))
}

#[derive(Debug, Clone)]
pub struct WaveformRateEstimator {
    settings: WaveformSettings,
    ticks_since_scan: u32,
    rate: f64,
}

impl WaveformRateEstimator {
    pub fn new(settings: WaveformSettings) -> Self {
        Self {
            settings,
            ticks_since_scan: 0,
            rate: 0.0,
        }
    }

    /// Advance one tick. `newest` is the incoming sample of the gated channel;
    /// `history` and `times` are the buffers as they stood before it arrives.
    pub fn update(&mut self, newest: f64, history: &ChannelBuffer, times: &TimeRing) -> f64 {
        if newest <= self.settings.presence_threshold {
            self.rate = 0.0;
            return self.rate;
        }

        self.ticks_since_scan += 1;
        if self.ticks_since_scan >= self.settings.scan_every {
            self.ticks_since_scan = 0;
            if let Some(rate) = self.scan(history, times) {
                self.rate = rate;
            }
        }

        self.rate
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    fn scan(&self, history: &ChannelBuffer, times: &TimeRing) -> Option<f64> {
        let range = self.settings.scan_range(history.len())?;
        let elapsed = seconds_between(*times.get(range.start)?, *times.get(range.end)?);

        let values = history.snapshot();
        let peaks = count_peaks_in(&values, range);

        let rate = if elapsed > 0.0 {
            60.0 / elapsed * peaks as f64
        } else {
            0.0
        };
        tracing::debug!(peaks, elapsed, rate, "heart rate scan");
        Some(rate)
    }
}
