//! Exception context captured at submission time and the report derived
//! from it.

use serde::{Deserialize, Serialize};

/// Raw exception context attached to a record by the submitter.
///
/// `traceback` is the already-formatted multi-line trace text; frame lines
/// follow the `File "<path>", line <n>, in <function>` convention so the
/// classifier can rewrite them into structured annotations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionInfo {
    /// Exception type name (e.g. `ConnectionError`).
    pub kind: String,
    /// Exception message text.
    pub message: String,
    /// Formatted multi-line traceback.
    pub traceback: String,
    /// Snapshot of the calling method, when the submitter could resolve it.
    #[serde(default)]
    pub caller: Option<CallerInfo>,
    /// Free-text comment supplied alongside the exception.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Calling method resolved from the submitter's stack snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerInfo {
    /// Method or function name.
    pub method: String,
    /// Owning type name, when the method was bound to one.
    #[serde(default)]
    pub type_name: Option<String>,
}

/// Well-known exception categories with a canned presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "category")]
pub enum ExceptionCategory {
    /// Network connectivity failure on the host.
    Connectivity,
    /// The upstream server reported an internal failure.
    UpstreamServer,
    /// The upstream asked to slow down; carries the wait duration.
    RateLimit { wait_secs: u64 },
    /// An optional dependency named in the message is not installed.
    MissingDependency { package: String },
    /// An internal task was observed in an invalid state.
    InvalidTaskState,
    /// Everything else.
    Unclassified,
}

/// Presentation-ready report derived from an [`ExceptionInfo`].
///
/// Built once per record and cached on it. All string fields are already
/// escaped for the target markup. Redaction is NOT applied here; the
/// dispatch path redacts immediately before transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionReport {
    pub category: ExceptionCategory,
    /// Short human-readable summary message.
    pub summary: String,
    /// Full rewritten stack trace.
    pub full_stack: String,
}

impl ExceptionReport {
    /// Package name extracted for missing-dependency reports.
    pub fn missing_package(&self) -> Option<&str> {
        match &self.category {
            ExceptionCategory::MissingDependency { package } => Some(package),
            _ => None,
        }
    }

    /// Wait duration extracted for rate-limit reports.
    pub fn wait_secs(&self) -> Option<u64> {
        match self.category {
            ExceptionCategory::RateLimit { wait_secs } => Some(wait_secs),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_accessors() {
        let report = ExceptionReport {
            category: ExceptionCategory::MissingDependency {
                package: "pillow".to_string(),
            },
            summary: String::new(),
            full_stack: String::new(),
        };
        assert_eq!(report.missing_package(), Some("pillow"));
        assert_eq!(report.wait_secs(), None);
    }
}
