//! Report building: summaries and full-stack rewriting.

use std::fmt::Write as _;
use std::sync::LazyLock;

use contracts::{ExceptionCategory, ExceptionInfo, ExceptionReport};
use regex::Regex;
use tracing::debug;

use crate::classify::classify;
use crate::escape::escape_html;

static FRAME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"  File "(.*?)", line ([0-9]+), in (.+)"#).expect("static regex")
});

const TRACEBACK_HEADER: &str = "Traceback (most recent call last):\n";

/// Innermost source location parsed from a formatted traceback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub function: String,
}

/// Build the presentation report for an exception context.
///
/// Never fails: unparseable tracebacks degrade to a summary without a
/// source location.
pub fn build_report(info: &ExceptionInfo) -> ExceptionReport {
    let category = classify(info);
    let summary = match canned_summary(&category) {
        Some(text) => text,
        None => generic_summary(info),
    };

    ExceptionReport {
        category,
        summary,
        full_stack: rewrite_stack(&info.traceback),
    }
}

/// Parse the innermost `File "...", line N, in f` frame of a traceback.
/// Returns `None` when no frame line matches.
pub fn innermost_frame(traceback: &str) -> Option<SourceLocation> {
    for line in traceback.lines().rev() {
        if let Some(caps) = FRAME_LINE.captures(line) {
            let line_no = match caps[2].parse() {
                Ok(n) => n,
                Err(_) => {
                    debug!(line = %&caps[2], "unparseable frame line number");
                    continue;
                }
            };
            return Some(SourceLocation {
                file: caps[1].to_string(),
                line: line_no,
                function: caps[3].trim().to_string(),
            });
        }
    }
    None
}

fn canned_summary(category: &ExceptionCategory) -> Option<String> {
    match category {
        ExceptionCategory::Connectivity => {
            Some("<b>Network connectivity problems on this host.</b>".to_string())
        }
        ExceptionCategory::UpstreamServer => {
            Some("<b>Upstream servers are currently experiencing issues. Try again later.</b>".to_string())
        }
        ExceptionCategory::RateLimit { wait_secs } => Some(format!(
            "<b>Rate limited by upstream; asked to wait {wait_secs} seconds.</b>"
        )),
        ExceptionCategory::MissingDependency { package } => Some(format!(
            "<b>Missing optional dependency:</b> <code>{}</code>",
            escape_html(package)
        )),
        ExceptionCategory::InvalidTaskState => {
            Some("<b>Internal task was in an invalid state.</b>".to_string())
        }
        ExceptionCategory::Unclassified => None,
    }
}

/// Generic summary: caller, innermost source location, error, comment.
fn generic_summary(info: &ExceptionInfo) -> String {
    let mut out = String::new();

    if let Some(caller) = &info.caller {
        match &caller.type_name {
            Some(type_name) => {
                let _ = write!(
                    out,
                    "<b>Cause:</b> method <code>{}</code> of <code>{}</code>\n\n",
                    escape_html(&caller.method),
                    escape_html(type_name)
                );
            }
            None => {
                let _ = write!(
                    out,
                    "<b>Cause:</b> <code>{}</code>\n\n",
                    escape_html(&caller.method)
                );
            }
        }
    }

    if let Some(frame) = innermost_frame(&info.traceback) {
        let _ = write!(
            out,
            "<b>Source:</b> <code>{}:{}</code> in <code>{}</code>\n",
            escape_html(&frame.file),
            frame.line,
            escape_html(&frame.function)
        );
    }

    let _ = write!(
        out,
        "<b>Error:</b> <code>{}: {}</code>",
        escape_html(&info.kind),
        escape_html(&info.message)
    );

    if let Some(comment) = &info.comment {
        let _ = write!(
            out,
            "\n<b>Message:</b> <code>{}</code>",
            escape_html(comment)
        );
    }

    out
}

/// Rewrite a traceback for markup rendering: frame lines become
/// `file:line in function` annotations, everything else is escaped into
/// `<code>` spans. The leading traceback header line is dropped.
fn rewrite_stack(traceback: &str) -> String {
    let body = traceback
        .strip_prefix(TRACEBACK_HEADER)
        .unwrap_or(traceback);

    body.lines()
        .map(|line| match FRAME_LINE.captures(line) {
            Some(caps) => format!(
                "→ <code>{}:{}</code> <b>in</b> <code>{}</code>",
                escape_html(&caps[1]),
                &caps[2],
                escape_html(caps[3].trim())
            ),
            None => format!("<code>{}</code>", escape_html(line)),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
