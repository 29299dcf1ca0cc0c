// Read-only view of the engine state handed to renderers after each tick
use super::channel::{AxisBounds, Channel};
use super::sample::Readings;
use super::window::index_of_times;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ChannelView {
    pub channel: Channel,
    pub title: &'static str,
    pub unit: &'static str,
    /// Values aligned 1:1 with [`Snapshot::times`].
    pub values: Vec<f64>,
    pub bounds: AxisBounds,
    /// Left edge of the display window.
    pub window_start: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub distance: f64,
    pub speed: f64,
    pub heart_rate: f64,
    pub rotations: u64,
}

/// Text panel lines, formatted the way the rig display shows them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readouts {
    pub distance: String,
    pub speed: String,
    pub heart_rate: String,
    pub gas: String,
    pub pressure: String,
    pub temperature: String,
    pub saturation: String,
    pub waves: String,
    pub elapsed: String,
}

impl Readouts {
    pub fn new(metrics: &Metrics, latest: &Readings, elapsed: &str) -> Self {
        Self {
            distance: format!("Distance: {:.2}mi", metrics.distance),
            speed: format!("Speed: {:.2}mph", metrics.speed),
            heart_rate: format!("HR: {:.0}bpm", metrics.heart_rate),
            gas: format!("{:.1}gas", latest.gas),
            pressure: format!("{:.2}kpa", latest.pressure),
            temperature: format!("{:.2}°F", latest.temperature),
            saturation: format!("{:.2}%", latest.saturation),
            waves: format!("IR: {:.0}k Red: {:.0}k", latest.ir / 1000.0, latest.red / 1000.0),
            elapsed: format!("Elapsed: {}", elapsed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub started_at: DateTime<Utc>,
    pub times: Vec<DateTime<Utc>>,
    pub elapsed_secs: f64,
    pub elapsed: String,
    pub lookback_secs: f64,
    pub channels: Vec<ChannelView>,
    pub metrics: Metrics,
    /// Most recent raw values, for textual display.
    pub latest: Readings,
    pub readouts: Readouts,
}

impl Snapshot {
    pub fn channel(&self, channel: Channel) -> Option<&ChannelView> {
        self.channels.iter().find(|view| view.channel == channel)
    }

    /// Copy of this snapshot with every `window_start` recomputed for a
    /// different lookback.
    pub fn rewindowed(&self, lookback_secs: f64) -> Snapshot {
        let window_start = index_of_times(&self.times, lookback_secs);
        let mut snapshot = self.clone();
        snapshot.lookback_secs = lookback_secs;
        for view in &mut snapshot.channels {
            view.window_start = window_start;
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readouts_formatting() {
        let metrics = Metrics {
            distance: 0.0076,
            speed: 13.68,
            heart_rate: 71.6,
            rotations: 2,
        };
        let latest = Readings {
            gas: 412.0,
            pressure: 101.25,
            ir: 85_400.0,
            red: 27_100.0,
            saturation: 97.0,
            temperature: 98.6,
            ..Readings::default()
        };

        let readouts = Readouts::new(&metrics, &latest, "0:01:05");
        assert_eq!(readouts.distance, "Distance: 0.01mi");
        assert_eq!(readouts.speed, "Speed: 13.68mph");
        assert_eq!(readouts.heart_rate, "HR: 72bpm");
        assert_eq!(readouts.gas, "412.0gas");
        assert_eq!(readouts.waves, "IR: 85k Red: 27k");
        assert_eq!(readouts.elapsed, "Elapsed: 0:01:05");
    }
}
