// Wheel pulse train -> rotation events -> distance and speed
use super::time::seconds_between;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::VecDeque;

/// Rotation events kept for the speed estimate.
pub const HISTORY_CAPACITY: usize = 10;

/// Above this many events the smoothed estimator takes over.
const STEADY_STATE_DEPTH: usize = 8;

/// Events (before the newest) averaged by the smoothed estimator.
const STEADY_STATE_SPAN: usize = 6;

/// Time deltas below this are treated as duplicate timestamps.
const NOISE_FLOOR_SECS: f64 = 0.004;

const SECS_PER_HOUR: f64 = 3600.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PulseSettings {
    /// Minimum raw counter jump that counts as one rotation.
    pub threshold: f64,
    /// Distance covered per wheel rotation (miles on the stock rig).
    pub distance_per_rotation: f64,
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self {
            threshold: 200.0,
            distance_per_rotation: 0.0038,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationEvent {
    pub at: DateTime<Utc>,
    pub rotations: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseReading {
    pub distance: f64,
    pub speed: f64,
    pub rotated: bool,
}

#[derive(Debug, Clone)]
pub struct PulseRateEstimator {
    settings: PulseSettings,
    rotations: u64,
    previous: f64,
    history: VecDeque<RotationEvent>,
    speed: f64,
}

impl PulseRateEstimator {
    pub fn new(settings: PulseSettings, started_at: DateTime<Utc>) -> Self {
        let mut history = VecDeque::with_capacity(HISTORY_CAPACITY + 1);
        history.push_back(RotationEvent {
            at: started_at,
            rotations: 1,
        });

        Self {
            settings,
            rotations: 1,
            previous: 0.0,
            history,
            speed: 0.0,
        }
    }

    /// Feed one raw pulse reading taken at `now`.
    pub fn update(&mut self, raw: f64, now: DateTime<Utc>) -> PulseReading {
        let rotated = raw - self.previous > self.settings.threshold;
        if rotated {
            self.rotations += 1;
            self.history.push_back(RotationEvent {
                at: now,
                rotations: self.rotations,
            });
            if self.history.len() > HISTORY_CAPACITY {
                self.history.pop_front();
            }
            tracing::trace!(rotations = self.rotations, "rotation detected");
        }
        self.previous = raw;

        if let Some(speed) = speed_from_history(&self.history, self.settings.distance_per_rotation) {
            self.speed = speed;
        }

        PulseReading {
            distance: self.distance(),
            speed: self.speed,
            rotated,
        }
    }

    pub fn distance(&self) -> f64 {
        self.rotations as f64 * self.settings.distance_per_rotation
    }

    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    pub fn history(&self) -> &VecDeque<RotationEvent> {
        &self.history
    }
}

/// Speed in distance units per hour, or `None` while fewer than two events
/// are known.
///
/// Shallow histories use the two newest events directly. Deeper ones average
/// the elapsed time back to each of the six preceding events, each divided
/// by its rank.
pub fn speed_from_history(history: &VecDeque<RotationEvent>, distance_per_rotation: f64) -> Option<f64> {
    let len = history.len();
    if len < 2 {
        return None;
    }
    let newest = history[len - 1];

    if len > STEADY_STATE_DEPTH {
        let weighted: Vec<f64> = (1..=STEADY_STATE_SPAN)
            .map(|rank| seconds_between(history[len - 1 - rank].at, newest.at) / rank as f64)
            .collect();
        let avg = weighted.iter().sum::<f64>() / weighted.len() as f64;
        if avg < NOISE_FLOOR_SECS {
            return Some(0.0);
        }
        return Some(distance_per_rotation / (avg / SECS_PER_HOUR));
    }

    let previous = history[len - 2];
    let time_delta = seconds_between(previous.at, newest.at);
    if time_delta < NOISE_FLOOR_SECS {
        return Some(0.0);
    }
    let rotation_delta = newest.rotations.saturating_sub(previous.rotations) as f64;
    Some(rotation_delta * distance_per_rotation / time_delta * SECS_PER_HOUR)
}
