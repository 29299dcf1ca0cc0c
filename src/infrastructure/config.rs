use crate::application::engine::EngineSettings;
use crate::domain::pulse::PulseSettings;
use crate::domain::sample::FieldMap;
use crate::domain::waveform::WaveformSettings;
use chrono::TimeDelta;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("buffer.capacity must be at least {minimum} to hold the heart rate scan window, got {actual}")]
    CapacityTooSmall { minimum: usize, actual: usize },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("heart_rate.tail_margin must be at least 2, got {0}")]
    TailMarginTooSmall(usize),
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct RigConfig {
    pub server: ServerSettings,
    pub source: SourceSettings,
    pub buffer: BufferSettings,
    pub scheduler: SchedulerSettings,
    pub display: DisplaySettings,
    pub fields: FieldMap,
    pub pulse: PulseSettings,
    pub heart_rate: WaveformSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Serial,
    Simulated,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceSettings {
    pub kind: SourceKind,
    pub port: String,
    pub baud_rate: u32,
    /// Seed for the simulated rig; random when absent.
    pub seed: Option<u64>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::Serial,
            port: "COM3".to_string(),
            baud_rate: 19200,
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BufferSettings {
    pub capacity: usize,
    pub sample_period_ms: u64,
}

impl Default for BufferSettings {
    fn default() -> Self {
        Self {
            capacity: 500,
            sample_period_ms: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SchedulerSettings {
    pub rest_ms: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self { rest_ms: 1 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplaySettings {
    pub lookback_secs: f64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { lookback_secs: 30.0 }
    }
}

impl RigConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer.sample_period_ms == 0 {
            return Err(ConfigError::Zero("buffer.sample_period_ms"));
        }
        if self.heart_rate.scan_every == 0 {
            return Err(ConfigError::Zero("heart_rate.scan_every"));
        }
        if self.heart_rate.scan_len == 0 {
            return Err(ConfigError::Zero("heart_rate.scan_len"));
        }
        if self.heart_rate.tail_margin < 2 {
            return Err(ConfigError::TailMarginTooSmall(self.heart_rate.tail_margin));
        }

        let minimum = self.heart_rate.scan_len + self.heart_rate.tail_margin + 2;
        if self.buffer.capacity < minimum {
            return Err(ConfigError::CapacityTooSmall {
                minimum,
                actual: self.buffer.capacity,
            });
        }

        Ok(())
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.buffer.sample_period_ms)
    }

    pub fn rest(&self) -> Duration {
        Duration::from_millis(self.scheduler.rest_ms)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            capacity: self.buffer.capacity,
            sample_period: TimeDelta::milliseconds(self.buffer.sample_period_ms as i64),
            lookback_secs: self.display.lookback_secs,
            fields: self.fields,
            pulse: self.pulse,
            heart_rate: self.heart_rate,
        }
    }
}

/// Load `config/rig.*` (optional) overlaid with `RIG__SECTION__KEY`
/// environment variables.
pub fn load_rig_config() -> anyhow::Result<RigConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/rig").required(false))
        .add_source(
            config::Environment::with_prefix("RIG")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let rig: RigConfig = settings.try_deserialize()?;
    rig.validate()?;
    Ok(rig)
}
