// Telemetry engine - One acquisition/compute/publish cycle per tick
use crate::application::sample_source::{SampleSource, SourceError};
use crate::domain::channel::Channel;
use crate::domain::pulse::{PulseRateEstimator, PulseSettings};
use crate::domain::ring::{ChannelBuffer, TimeRing};
use crate::domain::sample::{FieldMap, Readings, Sample};
use crate::domain::snapshot::{ChannelView, Metrics, Readouts, Snapshot};
use crate::domain::time::{format_elapsed, seconds_between};
use crate::domain::waveform::{WaveformRateEstimator, WaveformSettings};
use crate::domain::window::index_of;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub capacity: usize,
    pub sample_period: TimeDelta,
    pub lookback_secs: f64,
    pub fields: FieldMap,
    pub pulse: PulseSettings,
    pub heart_rate: WaveformSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            capacity: 500,
            sample_period: TimeDelta::milliseconds(100),
            lookback_secs: 30.0,
            fields: FieldMap::default(),
            pulse: PulseSettings::default(),
            heart_rate: WaveformSettings::default(),
        }
    }
}

#[derive(Debug)]
pub enum TickOutcome {
    Completed(Arc<Snapshot>),
    /// The source hiccuped; nothing was updated this tick.
    Skipped,
}

pub struct TelemetryEngine {
    source: Box<dyn SampleSource>,
    settings: EngineSettings,
    started_at: DateTime<Utc>,
    times: TimeRing,
    buffers: [ChannelBuffer; 9],
    pulse: PulseRateEstimator,
    heart_rate: WaveformRateEstimator,
    latest: Readings,
    ticks: u64,
}

impl TelemetryEngine {
    pub fn new(source: Box<dyn SampleSource>, settings: EngineSettings) -> Self {
        Self::starting_at(source, settings, Utc::now())
    }

    pub fn starting_at(
        source: Box<dyn SampleSource>,
        settings: EngineSettings,
        started_at: DateTime<Utc>,
    ) -> Self {
        let times = TimeRing::seeded(settings.capacity, started_at, settings.sample_period);
        let buffers = std::array::from_fn(|_| ChannelBuffer::filled(settings.capacity, 0.0));

        Self {
            source,
            pulse: PulseRateEstimator::new(settings.pulse, started_at),
            heart_rate: WaveformRateEstimator::new(settings.heart_rate),
            settings,
            started_at,
            times,
            buffers,
            latest: Readings::default(),
            ticks: 0,
        }
    }

    /// Pull one sample and fold it into the buffers and estimators.
    ///
    /// Transient source failures skip the tick and leave every buffer as it
    /// was; anything else is returned to the caller.
    pub async fn tick(&mut self) -> Result<TickOutcome, SourceError> {
        let raw = match self.source.next_sample().await {
            Ok(raw) => raw,
            Err(e) if e.is_transient() => {
                tracing::warn!("Skipping tick {}: {}", self.ticks + 1, e);
                return Ok(TickOutcome::Skipped);
            }
            Err(e) => return Err(e),
        };

        if raw.len() < self.settings.fields.required_len() {
            tracing::debug!("Short sample ({} fields), padding with zeros", raw.len());
        }

        Ok(TickOutcome::Completed(self.ingest(raw, Utc::now())))
    }

    /// Apply one raw sample that arrived at `now`.
    pub fn ingest(&mut self, raw: Vec<f64>, now: DateTime<Utc>) -> Arc<Snapshot> {
        let sample = Sample::padded(raw);
        let readings = self.settings.fields.read(&sample);

        let pulse = self.pulse.update(readings.pulse, now);
        let heart_rate =
            self.heart_rate
                .update(readings.ir, &self.buffers[Channel::Ir.index()], &self.times);

        self.times.push(now);
        for channel in Channel::ALL {
            let value = match channel {
                Channel::Distance => pulse.distance,
                Channel::Speed => pulse.speed,
                Channel::Gas => readings.gas,
                Channel::HeartRate => heart_rate,
                Channel::Ir => readings.ir,
                Channel::Pressure => readings.pressure,
                Channel::Temperature => readings.temperature,
                Channel::Saturation => readings.saturation,
                Channel::Red => readings.red,
            };
            self.buffers[channel.index()].push(value);
        }

        self.latest = readings;
        self.ticks += 1;

        Arc::new(self.snapshot(Metrics {
            distance: pulse.distance,
            speed: pulse.speed,
            heart_rate,
            rotations: self.pulse.rotations(),
        }))
    }

    fn snapshot(&self, metrics: Metrics) -> Snapshot {
        let window_start = index_of(&self.times, self.settings.lookback_secs);
        let channels = Channel::ALL
            .iter()
            .map(|&channel| {
                let buffer = self.buffer(channel);
                ChannelView {
                    channel,
                    title: channel.title(),
                    unit: channel.unit(),
                    values: buffer.snapshot(),
                    bounds: channel.bounds_policy().resolve(buffer),
                    window_start,
                }
            })
            .collect();

        let elapsed_secs = seconds_between(self.started_at, *self.times.last()).max(0.0);
        let elapsed = format_elapsed(elapsed_secs);

        Snapshot {
            tick: self.ticks,
            started_at: self.started_at,
            times: self.times.snapshot(),
            elapsed_secs,
            readouts: Readouts::new(&metrics, &self.latest, &elapsed),
            elapsed,
            lookback_secs: self.settings.lookback_secs,
            channels,
            metrics,
            latest: self.latest,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn buffer(&self, channel: Channel) -> &ChannelBuffer {
        &self.buffers[channel.index()]
    }

    pub fn times(&self) -> &TimeRing {
        &self.times
    }

    pub fn describe_source(&self) -> String {
        self.source.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sample_source::scripted::ScriptedSource;

    fn sample(pulse: f64, ir: f64) -> Vec<f64> {
        vec![pulse, 400.0, 101.0, 0.0, ir, 27_000.0, 0.0, 0.0, 97.0, 98.6]
    }

    fn engine_with(source: ScriptedSource, started_at: DateTime<Utc>) -> TelemetryEngine {
        TelemetryEngine::starting_at(Box::new(source), EngineSettings::default(), started_at)
    }

    #[test]
    fn test_rings_stay_aligned() {
        let start = Utc::now();
        let mut engine = engine_with(ScriptedSource::samples([]), start);
        let capacity = EngineSettings::default().capacity;

        for i in 0..(capacity + 25) {
            let now = start + TimeDelta::milliseconds(100 * i as i64);
            let snapshot = engine.ingest(sample(0.0, 50_000.0), now);
            assert_eq!(engine.times().len(), capacity);
            assert_eq!(snapshot.times.len(), capacity);
            for channel in Channel::ALL {
                assert_eq!(engine.buffer(channel).len(), capacity);
                assert_eq!(snapshot.channel(channel).unwrap().values.len(), capacity);
            }
        }
    }

    #[test]
    fn test_single_rotation_after_quiet_period() {
        let start = Utc::now();
        let mut engine = engine_with(ScriptedSource::samples([]), start);

        let mut now = start;
        for _ in 0..199 {
            now += TimeDelta::milliseconds(100);
            let snapshot = engine.ingest(sample(0.0, 0.0), now);
            assert_eq!(snapshot.metrics.rotations, 1);
        }

        now += TimeDelta::milliseconds(100);
        let snapshot = engine.ingest(sample(250.0, 0.0), now);
        assert_eq!(snapshot.metrics.rotations, 2);
        assert!((snapshot.metrics.distance - 2.0 * 0.0038).abs() < 1e-12);
        assert!((*engine.buffer(Channel::Distance).last() - 2.0 * 0.0038).abs() < 1e-12);

        // held high: no further rotation
        now += TimeDelta::milliseconds(100);
        let snapshot = engine.ingest(sample(250.0, 0.0), now);
        assert_eq!(snapshot.metrics.rotations, 2);
    }

    #[test]
    fn test_heart_rate_zero_without_finger() {
        let start = Utc::now();
        let mut engine = engine_with(ScriptedSource::samples([]), start);
        for i in 0..120 {
            let now = start + TimeDelta::milliseconds(100 * i);
            let snapshot = engine.ingest(sample(0.0, 79_000.0), now);
            assert_eq!(snapshot.metrics.heart_rate, 0.0);
        }
    }

    #[test]
    fn test_heart_rate_from_ir_waveform() {
        let start = Utc::now();
        let mut engine = engine_with(ScriptedSource::samples([]), start);

        // one sharp beat every 10 ticks (1 s) -> 60 bpm
        let mut rate = 0.0;
        for i in 0..600 {
            let now = start + TimeDelta::milliseconds(100 * i);
            let ir = if i % 10 == 0 { 92_000.0 } else { 90_000.0 };
            rate = engine.ingest(sample(0.0, ir), now).metrics.heart_rate;
        }
        assert!((rate - 60.0).abs() < 1e-6, "rate was {}", rate);
    }

    #[test]
    fn test_snapshot_bounds_and_labels() {
        let start = Utc::now();
        let mut engine = engine_with(ScriptedSource::samples([]), start);
        let mut snapshot = engine.ingest(sample(0.0, 85_000.0), start);
        for i in 1..600 {
            snapshot = engine.ingest(sample(0.0, 85_000.0), start + TimeDelta::milliseconds(100 * i));
        }

        let gas = snapshot.channel(Channel::Gas).unwrap();
        assert_eq!(gas.bounds.lower, 385.0);
        assert_eq!(gas.bounds.upper, 415.0);
        let speed = snapshot.channel(Channel::Speed).unwrap();
        assert_eq!((speed.bounds.lower, speed.bounds.upper), (0.0, 25.0));

        // 30 s lookback over 0.1 s spacing
        assert_eq!(gas.window_start, 499 - 300);
        assert_eq!(snapshot.elapsed, "0:00:59");
        assert_eq!(snapshot.latest.ir, 85_000.0);
    }

    #[tokio::test]
    async fn test_tick_pads_short_samples() {
        let source = ScriptedSource::samples([vec![0.0, 412.0]]);
        let mut engine = TelemetryEngine::new(Box::new(source), EngineSettings::default());

        let outcome = engine.tick().await.unwrap();
        let TickOutcome::Completed(snapshot) = outcome else {
            panic!("expected a completed tick");
        };
        assert_eq!(snapshot.latest.gas, 412.0);
        assert_eq!(snapshot.latest.temperature, 0.0);
        assert_eq!(engine.ticks(), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_skips_tick() {
        let source = ScriptedSource::new([
            Ok(sample(0.0, 0.0)),
            Err(SourceError::Transient("garbled line".to_string())),
            Ok(sample(0.0, 0.0)),
        ]);
        let mut engine = TelemetryEngine::new(Box::new(source), EngineSettings::default());

        assert!(matches!(engine.tick().await, Ok(TickOutcome::Completed(_))));
        let newest = *engine.times().last();
        assert!(matches!(engine.tick().await, Ok(TickOutcome::Skipped)));
        assert_eq!(*engine.times().last(), newest);
        assert_eq!(engine.ticks(), 1);
        assert!(matches!(engine.tick().await, Ok(TickOutcome::Completed(_))));

        // script exhausted
        assert!(matches!(engine.tick().await, Err(SourceError::Fatal(_))));
    }
}
