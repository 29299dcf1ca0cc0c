// Serial-port sample source for the rig's microcontroller
//
// The firmware prints one line of numbers per sample, e.g.
// "512 301 101.3 0 85213 27122 0 0 97 98.6". Only the numeric tokens are
// kept; anything else on the line is ignored.
use crate::application::sample_source::{SampleSource, SourceError};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?\d*\.\d+|\d+").expect("numeric token pattern is valid")
});

/// Every numeric token on a line, in order.
pub fn parse_numbers(line: &str) -> Vec<f64> {
    NUMBER
        .find_iter(line)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

pub struct SerialSampleSource {
    port: String,
    reader: BufReader<SerialStream>,
    line: String,
}

impl SerialSampleSource {
    /// Open `port` and discard the first line, which is usually cut off
    /// mid-sample.
    pub async fn connect(port: &str, baud_rate: u32) -> Result<Self, SourceError> {
        tracing::info!("Connecting to rig on {} at {} baud", port, baud_rate);

        let stream = tokio_serial::new(port, baud_rate)
            .open_native_async()
            .map_err(|e| classify_open_error(port, e))?;

        let mut source = Self {
            port: port.to_string(),
            reader: BufReader::new(stream),
            line: String::new(),
        };
        source.read_line().await?;

        tracing::info!("Connected to rig on {}", port);
        Ok(source)
    }

    async fn read_line(&mut self) -> Result<&str, SourceError> {
        self.line.clear();
        match self.reader.read_line(&mut self.line).await {
            Ok(0) => Err(SourceError::Fatal(format!("{} closed", self.port))),
            Ok(_) => Ok(self.line.trim()),
            Err(e) => match e.kind() {
                std::io::ErrorKind::InvalidData
                | std::io::ErrorKind::TimedOut
                | std::io::ErrorKind::Interrupted => Err(SourceError::Transient(e.to_string())),
                _ => Err(SourceError::Fatal(format!("read from {} failed: {}", self.port, e))),
            },
        }
    }
}

fn classify_open_error(port: &str, e: tokio_serial::Error) -> SourceError {
    match e.kind() {
        tokio_serial::ErrorKind::NoDevice
        | tokio_serial::ErrorKind::Io(std::io::ErrorKind::NotFound) => {
            SourceError::PortNotFound(port.to_string())
        }
        _ => SourceError::Connect {
            port: port.to_string(),
            reason: e.to_string(),
        },
    }
}

#[async_trait]
impl SampleSource for SerialSampleSource {
    async fn next_sample(&mut self) -> Result<Vec<f64>, SourceError> {
        let line = self.read_line().await?;
        let values = parse_numbers(line);
        if values.is_empty() {
            tracing::debug!("No numbers in line {:?}", line);
        }
        Ok(values)
    }

    fn describe(&self) -> String {
        format!("serial:{}", self.port)
    }
}
