// Raw sample vectors and the field layout used to read them
use serde::{Deserialize, Serialize};

/// Shortest vector the rig is expected to send; anything shorter is padded.
pub const MIN_SAMPLE_LEN: usize = 10;

/// One raw numeric vector as delivered by a sample source, zero-padded to at
/// least [`MIN_SAMPLE_LEN`] entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    values: Vec<f64>,
}

impl Sample {
    pub fn padded(mut values: Vec<f64>) -> Self {
        if values.len() < MIN_SAMPLE_LEN {
            values.resize(MIN_SAMPLE_LEN, 0.0);
        }
        Self { values }
    }

    /// Field at `index`, or 0 when the rig sent fewer fields than the layout
    /// expects.
    pub fn field(&self, index: usize) -> f64 {
        self.values.get(index).copied().unwrap_or(0.0)
    }
}

/// Position of each consumed field inside a raw sample.
///
/// Rig firmware revisions disagree on where saturation and temperature live
/// (8/9 on older sketches, 3/6 on newer ones), so the whole layout is
/// configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMap {
    pub pulse: usize,
    pub gas: usize,
    pub pressure: usize,
    pub ir: usize,
    pub red: usize,
    pub saturation: usize,
    pub temperature: usize,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            pulse: 0,
            gas: 1,
            pressure: 2,
            ir: 4,
            red: 5,
            saturation: 8,
            temperature: 9,
        }
    }
}

impl FieldMap {
    /// Fields a sample needs before nothing has to be padded.
    pub fn required_len(&self) -> usize {
        [
            self.pulse,
            self.gas,
            self.pressure,
            self.ir,
            self.red,
            self.saturation,
            self.temperature,
        ]
        .into_iter()
        .max()
        .map_or(MIN_SAMPLE_LEN, |highest| (highest + 1).max(MIN_SAMPLE_LEN))
    }

    pub fn read(&self, sample: &Sample) -> Readings {
        Readings {
            pulse: sample.field(self.pulse),
            gas: sample.field(self.gas),
            pressure: sample.field(self.pressure),
            ir: sample.field(self.ir),
            red: sample.field(self.red),
            saturation: sample.field(self.saturation),
            temperature: sample.field(self.temperature),
        }
    }
}

/// Named raw values pulled out of one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Readings {
    pub pulse: f64,
    pub gas: f64,
    pub pressure: f64,
    pub ir: f64,
    pub red: f64,
    pub saturation: f64,
    pub temperature: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sample_is_padded() {
        let sample = Sample::padded(vec![250.0, 301.0]);
        assert_eq!(sample.values.len(), MIN_SAMPLE_LEN);
        assert_eq!(sample.field(0), 250.0);
        assert_eq!(sample.field(9), 0.0);
        assert_eq!(sample.field(42), 0.0);
    }

    #[test]
    fn test_long_sample_is_kept() {
        let sample = Sample::padded((0..12).map(f64::from).collect());
        assert_eq!(sample.values.len(), 12);
        assert_eq!(sample.field(11), 11.0);
    }

    #[test]
    fn test_read_default_layout() {
        let sample = Sample::padded(vec![
            0.0, 400.0, 101.0, 3.0, 85000.0, 27000.0, 6.0, 7.0, 97.0, 98.6,
        ]);
        let readings = FieldMap::default().read(&sample);
        assert_eq!(readings.gas, 400.0);
        assert_eq!(readings.pressure, 101.0);
        assert_eq!(readings.ir, 85000.0);
        assert_eq!(readings.red, 27000.0);
        assert_eq!(readings.saturation, 97.0);
        assert_eq!(readings.temperature, 98.6);
    }

    #[test]
    fn test_read_alternate_layout() {
        let fields = FieldMap {
            saturation: 3,
            temperature: 6,
            ..FieldMap::default()
        };
        let sample = Sample::padded(vec![0.0, 0.0, 0.0, 96.0, 0.0, 0.0, 99.1]);
        let readings = fields.read(&sample);
        assert_eq!(readings.saturation, 96.0);
        assert_eq!(readings.temperature, 99.1);
    }

    #[test]
    fn test_required_len() {
        assert_eq!(FieldMap::default().required_len(), MIN_SAMPLE_LEN);
        let wide = FieldMap {
            temperature: 14,
            ..FieldMap::default()
        };
        assert_eq!(wide.required_len(), 15);
    }
}
