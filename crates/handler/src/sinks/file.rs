//! RotatingFileSink - append-only log file with size-based rotation.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use contracts::{CourierError, Level, LocalSink, LogRecord};
use tracing::debug;

const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_BACKUPS: usize = 1;

/// Configuration for RotatingFileSink
#[derive(Debug, Clone)]
pub struct RotatingFileConfig {
    /// Log file path
    pub path: PathBuf,
    /// Rotate once the file would exceed this size
    pub max_bytes: u64,
    /// Rotated generations kept (`path.1` .. `path.N`)
    pub backups: usize,
}

impl RotatingFileConfig {
    /// Create config from params map
    fn from_params(params: &HashMap<String, String>) -> Self {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("courier.log"));
        let max_bytes = params
            .get("max_bytes")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_BYTES);
        let backups = params
            .get("backups")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BACKUPS);

        Self {
            path,
            max_bytes,
            backups,
        }
    }
}

/// Sink appending formatted records to a file, rotating at a size limit.
pub struct RotatingFileSink {
    name: String,
    min_level: Level,
    config: RotatingFileConfig,
    file: File,
    written: u64,
}

impl RotatingFileSink {
    /// Create a new RotatingFileSink, opening (or resuming) the log file.
    pub fn new(
        name: impl Into<String>,
        min_level: Level,
        config: RotatingFileConfig,
    ) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            name: name.into(),
            min_level,
            config,
            file,
            written,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        min_level: Level,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, min_level, RotatingFileConfig::from_params(params))
    }

    fn backup_path(&self, generation: usize) -> PathBuf {
        let mut s = self.config.path.as_os_str().to_owned();
        s.push(format!(".{generation}"));
        PathBuf::from(s)
    }

    /// Shift backup generations and reopen a fresh file.
    fn rotate(&mut self) -> std::io::Result<()> {
        self.file.flush()?;

        if self.config.backups == 0 {
            // No generations kept; truncate in place.
            self.file = File::create(&self.config.path)?;
            self.written = 0;
            return Ok(());
        }

        let oldest = self.backup_path(self.config.backups);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for generation in (1..self.config.backups).rev() {
            let from = self.backup_path(generation);
            if from.exists() {
                fs::rename(&from, self.backup_path(generation + 1))?;
            }
        }
        fs::rename(&self.config.path, self.backup_path(1))?;

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.path)?;
        self.written = 0;
        debug!(sink = %self.name, path = %self.config.path.display(), "log file rotated");
        Ok(())
    }

    fn append_line(&mut self, line: &str) -> std::io::Result<()> {
        let bytes = line.len() as u64 + 1;
        if self.written + bytes > self.config.max_bytes && self.written > 0 {
            self.rotate()?;
        }
        writeln!(self.file, "{line}")?;
        self.written += bytes;
        Ok(())
    }

    /// The current log file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }
}

impl LocalSink for RotatingFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn write(&mut self, record: &LogRecord) -> Result<(), CourierError> {
        self.append_line(&record.format_line())
            .map_err(|e| CourierError::sink_write(&self.name, e.to_string()))
    }

    fn flush(&mut self) -> Result<(), CourierError> {
        self.file
            .flush()
            .map_err(|e| CourierError::sink_write(&self.name, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(msg: &str) -> LogRecord {
        LogRecord::new(Level::Info, "test", msg, Vec::new(), None, None)
    }

    fn sink_at(path: PathBuf, max_bytes: u64) -> RotatingFileSink {
        RotatingFileSink::new(
            "file",
            Level::Debug,
            RotatingFileConfig {
                path,
                max_bytes,
                backups: 1,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_write_appends_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("courier.log");
        let mut sink = sink_at(path.clone(), DEFAULT_MAX_BYTES);

        sink.write(&record("first")).unwrap();
        sink.write(&record("second")).unwrap();
        sink.flush().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("first"));
    }

    #[test]
    fn test_rotation_keeps_one_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("courier.log");
        // Tiny limit: every second line forces a rotation
        let mut sink = sink_at(path.clone(), 80);

        for i in 0..10 {
            sink.write(&record(&format!("line number {i}"))).unwrap();
        }
        sink.flush().unwrap();

        let backup = dir.path().join("courier.log.1");
        assert!(path.exists());
        assert!(backup.exists());
        // Only one backup generation, no `.2`
        assert!(!dir.path().join("courier.log.2").exists());
    }

    #[test]
    fn test_resume_counts_existing_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("courier.log");
        fs::write(&path, "existing content\n").unwrap();

        let sink = sink_at(path, DEFAULT_MAX_BYTES);
        assert_eq!(sink.written, 17);
    }

    #[test]
    fn test_from_params_defaults() {
        let dir = tempdir().unwrap();
        let mut params = HashMap::new();
        params.insert(
            "path".to_string(),
            dir.path().join("app.log").display().to_string(),
        );
        let sink = RotatingFileSink::from_params("file", Level::Debug, &params).unwrap();
        assert_eq!(sink.config.max_bytes, DEFAULT_MAX_BYTES);
        assert_eq!(sink.config.backups, 1);
    }
}
