//! LogRecord - one captured log entry, immutable once created.

use chrono::{DateTime, Utc};
use std::sync::OnceLock;

use crate::{ExceptionInfo, ExceptionReport, Level, OriginTag};

/// One captured log record.
///
/// Records are immutable after construction and shared as `Arc<LogRecord>`
/// between the store, the local fan-out, and the remote queues. The derived
/// exception report is built lazily by the classifier and cached here so
/// interactive "full trace" rendering reuses the same report object.
#[derive(Debug)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    /// Logger name, usually the submitting module path.
    pub logger: String,
    /// Raw message template; `{}` placeholders are filled from `args`.
    pub message: String,
    pub args: Vec<String>,
    pub exception: Option<ExceptionInfo>,
    pub origin: Option<OriginTag>,
    report: OnceLock<ExceptionReport>,
}

impl LogRecord {
    pub fn new(
        level: Level,
        logger: impl Into<String>,
        message: impl Into<String>,
        args: Vec<String>,
        exception: Option<ExceptionInfo>,
        origin: Option<OriginTag>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            logger: logger.into(),
            message: message.into(),
            args,
            exception,
            origin,
            report: OnceLock::new(),
        }
    }

    /// Render the message template, substituting `{}` placeholders from
    /// `args` left to right. Surplus placeholders are kept verbatim and
    /// surplus args are ignored; rendering never fails.
    pub fn rendered_message(&self) -> String {
        if self.args.is_empty() {
            return self.message.clone();
        }

        let mut out = String::with_capacity(self.message.len());
        let mut rest = self.message.as_str();
        let mut args = self.args.iter();
        while let Some(pos) = rest.find("{}") {
            let Some(arg) = args.next() else { break };
            out.push_str(&rest[..pos]);
            out.push_str(arg);
            rest = &rest[pos + 2..];
        }
        out.push_str(rest);
        out
    }

    /// Line format used by local sinks:
    /// `2026-01-02 03:04:05 [LEVEL] logger: message`.
    pub fn format_line(&self) -> String {
        format!(
            "{} [{}] {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.level,
            self.logger,
            self.rendered_message()
        )
    }

    /// Compact format used for remote text batches:
    /// `[LEVEL] logger: message\n` (no timestamp; chat clients add one).
    pub fn remote_line(&self) -> String {
        format!("[{}] {}: {}\n", self.level, self.logger, self.rendered_message())
    }

    /// The cached exception report, if one was built.
    pub fn report(&self) -> Option<&ExceptionReport> {
        self.report.get()
    }

    /// Cache the report built for this record, returning the stored value.
    /// The first caller wins; later calls return the existing report.
    pub fn cache_report(&self, report: ExceptionReport) -> &ExceptionReport {
        self.report.get_or_init(|| report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(message: &str, args: &[&str]) -> LogRecord {
        LogRecord::new(
            Level::Info,
            "core.test",
            message,
            args.iter().map(|s| s.to_string()).collect(),
            None,
            None,
        )
    }

    #[test]
    fn test_rendered_message_substitution() {
        let rec = record("loaded {} modules in {}ms", &["12", "340"]);
        assert_eq!(rec.rendered_message(), "loaded 12 modules in 340ms");
    }

    #[test]
    fn test_rendered_message_surplus_placeholder() {
        let rec = record("value: {} and {}", &["1"]);
        assert_eq!(rec.rendered_message(), "value: 1 and {}");
    }

    #[test]
    fn test_remote_line() {
        let rec = record("ready", &[]);
        assert_eq!(rec.remote_line(), "[INFO] core.test: ready\n");
    }

    #[test]
    fn test_report_cached_once() {
        use crate::{ExceptionCategory, ExceptionReport};

        let rec = record("boom", &[]);
        assert!(rec.report().is_none());
        rec.cache_report(ExceptionReport {
            category: ExceptionCategory::Unclassified,
            summary: "first".to_string(),
            full_stack: String::new(),
        });
        rec.cache_report(ExceptionReport {
            category: ExceptionCategory::Unclassified,
            summary: "second".to_string(),
            full_stack: String::new(),
        });
        assert_eq!(rec.report().unwrap().summary, "first");
    }
}
