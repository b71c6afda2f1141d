//! Category matching for well-known failure shapes.

use std::sync::LazyLock;

use contracts::{ExceptionCategory, ExceptionInfo};
use regex::Regex;

static WAIT_SECS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:second|sec)").expect("static regex"));

static QUOTED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^']+)'").expect("static regex"));

/// Report messages that are noise in practice; suppressed when the handler
/// opts in.
const COMMON_NOISE_NEEDLES: &[&str] = &[
    "does not have any entity type",
    "concepts/entities.html",
];

/// Match an exception context against the well-known categories.
///
/// Matching is by exception kind first, message shape second, so an
/// upstream library renaming its message text degrades to `Unclassified`
/// rather than a wrong category.
pub fn classify(info: &ExceptionInfo) -> ExceptionCategory {
    match info.kind.as_str() {
        "NetworkError" | "ConnectionError" | "ConnectionResetError" => {
            return ExceptionCategory::Connectivity;
        }
        "ServerError" | "InternalServerError" => {
            return ExceptionCategory::UpstreamServer;
        }
        "RetryAfter" | "FloodWaitError" | "RateLimitError" => {
            return ExceptionCategory::RateLimit {
                wait_secs: extract_wait_secs(&info.message).unwrap_or(0),
            };
        }
        "ModuleNotFoundError" | "ImportError" => {
            if let Some(package) = extract_missing_package(&info.message) {
                return ExceptionCategory::MissingDependency { package };
            }
        }
        "InvalidStateError" => return ExceptionCategory::InvalidTaskState,
        _ => {}
    }

    // Kind didn't match; fall back to message shape for the two categories
    // that commonly surface wrapped in generic error types.
    if info.message.contains("No module named") {
        if let Some(package) = extract_missing_package(&info.message) {
            return ExceptionCategory::MissingDependency { package };
        }
    }
    if let Some(wait_secs) = rate_limited_message(&info.message) {
        return ExceptionCategory::RateLimit { wait_secs };
    }

    ExceptionCategory::Unclassified
}

/// True when a report summary matches the fixed noisy-needle list.
pub fn is_common_noise(summary: &str) -> bool {
    COMMON_NOISE_NEEDLES
        .iter()
        .any(|needle| summary.contains(needle))
}

fn extract_wait_secs(message: &str) -> Option<u64> {
    WAIT_SECS
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn extract_missing_package(message: &str) -> Option<String> {
    QUOTED_NAME
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn rate_limited_message(message: &str) -> Option<u64> {
    if message.contains("retry in") || message.contains("Retry in") {
        extract_wait_secs(message)
    } else {
        None
    }
}
