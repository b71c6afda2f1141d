//! ConsoleSink - formatted lines on the process stderr stream.

use std::io::Write;

use contracts::{CourierError, Level, LocalSink, LogRecord};

/// Sink writing formatted records to stderr.
pub struct ConsoleSink {
    name: String,
    min_level: Level,
}

impl ConsoleSink {
    /// Create a console sink with the given threshold.
    pub fn new(min_level: Level) -> Self {
        Self {
            name: "console".to_string(),
            min_level,
        }
    }

    /// Create with a custom name (when several console sinks coexist).
    pub fn named(name: impl Into<String>, min_level: Level) -> Self {
        Self {
            name: name.into(),
            min_level,
        }
    }
}

impl LocalSink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn write(&mut self, record: &LogRecord) -> Result<(), CourierError> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{}", record.format_line())
            .map_err(|e| CourierError::sink_write(&self.name, e.to_string()))
    }

    fn flush(&mut self) -> Result<(), CourierError> {
        std::io::stderr()
            .flush()
            .map_err(|e| CourierError::sink_write(&self.name, e.to_string()))
    }
}
