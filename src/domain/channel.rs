// The nine plotted channels and how each one's y-axis is scaled
use super::ring::ChannelBuffer;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Distance,
    Speed,
    Gas,
    HeartRate,
    Ir,
    Pressure,
    Temperature,
    Saturation,
    Red,
}

impl Channel {
    pub const ALL: [Channel; 9] = [
        Channel::Distance,
        Channel::Speed,
        Channel::Gas,
        Channel::HeartRate,
        Channel::Ir,
        Channel::Pressure,
        Channel::Temperature,
        Channel::Saturation,
        Channel::Red,
    ];

    pub fn index(self) -> usize {
        match self {
            Channel::Distance => 0,
            Channel::Speed => 1,
            Channel::Gas => 2,
            Channel::HeartRate => 3,
            Channel::Ir => 4,
            Channel::Pressure => 5,
            Channel::Temperature => 6,
            Channel::Saturation => 7,
            Channel::Red => 8,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Channel::Distance => "Distance",
            Channel::Speed => "Speed",
            Channel::Gas => "Gas",
            Channel::HeartRate => "Heart Rate",
            Channel::Ir => "IR Wave",
            Channel::Pressure => "Pressure",
            Channel::Temperature => "Temp",
            Channel::Saturation => "SpO2",
            Channel::Red => "Red Wave",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Channel::Distance => "mi",
            Channel::Speed => "mph",
            Channel::Gas => "gas",
            Channel::HeartRate => "bpm",
            Channel::Ir | Channel::Red => "AU",
            Channel::Pressure => "kPa",
            Channel::Temperature => "°F",
            Channel::Saturation => "%",
        }
    }

    pub fn bounds_policy(self) -> BoundsPolicy {
        match self {
            Channel::Distance => BoundsPolicy::Dynamic {
                below: 0.0,
                above: 0.1,
            },
            Channel::Speed => BoundsPolicy::Fixed {
                lower: 0.0,
                upper: 25.0,
            },
            Channel::Gas => BoundsPolicy::Dynamic {
                below: 15.0,
                above: 15.0,
            },
            Channel::HeartRate => BoundsPolicy::Fixed {
                lower: 0.0,
                upper: 200.0,
            },
            Channel::Ir | Channel::Red => BoundsPolicy::Dynamic {
                below: 1000.0,
                above: 1000.0,
            },
            Channel::Pressure => BoundsPolicy::Dynamic {
                below: 5.0,
                above: 5.0,
            },
            Channel::Temperature => BoundsPolicy::Fixed {
                lower: 70.0,
                upper: 105.0,
            },
            Channel::Saturation => BoundsPolicy::Fixed {
                lower: 80.0,
                upper: 105.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisBounds {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundsPolicy {
    /// Physiologically bounded range, independent of the data.
    Fixed { lower: f64, upper: f64 },
    /// Data min/max widened by a margin on each side.
    Dynamic { below: f64, above: f64 },
}

impl BoundsPolicy {
    pub fn resolve(&self, buffer: &ChannelBuffer) -> AxisBounds {
        match *self {
            BoundsPolicy::Fixed { lower, upper } => AxisBounds { lower, upper },
            BoundsPolicy::Dynamic { below, above } => AxisBounds {
                lower: buffer.min() - below,
                upper: buffer.max() + above,
            },
        }
    }
}
