//! Simulated rig - Synthetic sensor lines for bench testing without hardware
//!
//! Produces a rider pedalling at a steady cadence with a finger resting on
//! the optical sensor: a pulse counter that swings high once per wheel
//! rotation, an IR/red photoplethysmogram around 72 bpm, and slowly drifting
//! gas, pressure, saturation and temperature.

use crate::application::sample_source::{SampleSource, SourceError};
use crate::domain::sample::FieldMap;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use std::time::Duration;

/// Ticks between wheel rotations at the nominal sample period.
const TICKS_PER_ROTATION: u64 = 7;

const HEART_RATE_BPM: f64 = 72.0;

pub struct SimulatedSampleSource {
    fields: FieldMap,
    period: Duration,
    rng: StdRng,
    tick: u64,
}

impl SimulatedSampleSource {
    pub fn new(fields: FieldMap, period: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            fields,
            period,
            rng,
            tick: 0,
        }
    }

    /// Build the raw vector for the current tick without waiting.
    fn generate(&mut self) -> Vec<f64> {
        let t = self.tick as f64 * self.period.as_secs_f64();
        self.tick += 1;

        let pulse: f64 = if self.tick % TICKS_PER_ROTATION == 0 {
            self.rng.gen_range(550.0..700.0)
        } else {
            self.rng.gen_range(0.0..40.0)
        };

        // sharp systolic peak once per beat
        let phase = (t * HEART_RATE_BPM / 60.0).fract();
        let beat = (TAU * phase).cos().max(0.0).powi(8);
        let ir = 88_000.0 + 2_500.0 * beat + self.rng.gen_range(-20.0..20.0);
        let red = 27_000.0 + 900.0 * beat + self.rng.gen_range(-20.0..20.0);

        let drift = (t / 120.0).sin();
        let gas = 400.0 + 25.0 * drift + self.rng.gen_range(-3.0..3.0);
        let pressure = 101.3 + 1.5 * drift;
        let saturation: f64 = 97.0 + self.rng.gen_range(-0.5..0.5);
        let temperature = 98.2 + 0.6 * drift;

        let mut values = vec![0.0; self.fields.required_len()];
        values[self.fields.pulse] = pulse.round();
        values[self.fields.gas] = gas.round();
        values[self.fields.pressure] = pressure;
        values[self.fields.ir] = ir.round();
        values[self.fields.red] = red.round();
        values[self.fields.saturation] = saturation.round();
        values[self.fields.temperature] = temperature;
        values
    }
}

#[async_trait]
impl SampleSource for SimulatedSampleSource {
    async fn next_sample(&mut self) -> Result<Vec<f64>, SourceError> {
        tokio::time::sleep(self.period).await;
        Ok(self.generate())
    }

    fn describe(&self) -> String {
        format!("simulated:{:?}", self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::Sample;

    #[test]
    fn test_layout_and_presence() {
        let fields = FieldMap::default();
        let mut source = SimulatedSampleSource::new(fields, Duration::from_millis(100), Some(42));

        for _ in 0..100 {
            let raw = source.generate();
            assert_eq!(raw.len(), 10);
            let readings = fields.read(&Sample::padded(raw));
            assert!(readings.ir > 80_000.0);
            assert!((96.0..=98.0).contains(&readings.saturation));
        }
    }

    #[test]
    fn test_one_rotation_per_cadence() {
        let fields = FieldMap::default();
        let mut source = SimulatedSampleSource::new(fields, Duration::from_millis(100), Some(1));

        let mut previous = 0.0;
        let mut rotations = 0;
        for _ in 0..(TICKS_PER_ROTATION * 10) {
            let pulse = source.generate()[fields.pulse];
            if pulse - previous > 200.0 {
                rotations += 1;
            }
            previous = pulse;
        }
        assert_eq!(rotations, 10);
    }

    #[test]
    fn test_seeded_sources_repeat() {
        let fields = FieldMap {
            saturation: 3,
            temperature: 6,
            ..FieldMap::default()
        };
        let mut a = SimulatedSampleSource::new(fields, Duration::from_millis(100), Some(9));
        let mut b = SimulatedSampleSource::new(fields, Duration::from_millis(100), Some(9));
        for _ in 0..20 {
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_paced_by_period() {
        let mut source =
            SimulatedSampleSource::new(FieldMap::default(), Duration::from_millis(100), Some(3));
        let start = tokio::time::Instant::now();
        source.next_sample().await.unwrap();
        source.next_sample().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }
}
