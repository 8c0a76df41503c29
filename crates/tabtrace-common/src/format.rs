//! Pure rendering of captured records into the line format written to the
//! session log files. No state, no I/O.

use crate::record::{BodyOutcome, RequestRecord, ResponseRecord, StackFrame, Timestamp};
use crate::stats::StatsSnapshot;
use serde_json::Value;

/// Terminator line framing each network block.
pub const BLOCK_DELIMITER: &str = "========================================";

/// Rendered when a console argument has neither a literal value nor a
/// description.
pub const OBJECT_PLACEHOLDER: &str = "[Object]";

/// Header block written at the top of each log file.
pub fn session_header(stream_title: &str, started_iso: &str, log_dir: &str) -> String {
    format!(
        "=== tabtrace Browser Session - {stream_title} ===\nStarted: {started_iso}\nLog Directory: {log_dir}\n---\n\n"
    )
}

/// Closing marker written to both streams at shutdown.
pub fn session_footer(ended_iso: &str) -> String {
    format!("\n---\n=== Session Ended: {ended_iso} ===\n")
}

/// Final statistics block, written to the network stream only.
pub fn network_stats_footer(stats: &StatsSnapshot) -> String {
    format!(
        "=== Network Statistics ===\nTotal Requests: {}\nLogged: {}\nFiltered: {}\n",
        stats.total, stats.logged, stats.filtered
    )
}

/// Marker noting that a new page/tab is being monitored, written to both
/// streams.
pub fn monitor_marker(page_url: &str) -> String {
    format!("\n[INFO] Monitoring new page/tab: {page_url}")
}

/// Best-effort text for one console argument: literal value, then
/// description, then a fixed placeholder.
pub fn console_arg_text(value: Option<&Value>, description: Option<&str>) -> String {
    if let Some(value) = value {
        return match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
    }
    if let Some(description) = description {
        return description.to_string();
    }
    OBJECT_PLACEHOLDER.to_string()
}

/// One console line, with an optional `Source:` continuation when the top
/// stack frame is known.
pub fn console_line(ts: &Timestamp, kind: &str, text: &str, source: Option<&str>) -> String {
    let mut line = format!("[{}] CONSOLE.{:<7} {}", ts.clock, kind, text);
    if let Some(source) = source {
        line.push_str(&format!("\n  Source: {source}"));
    }
    line
}

/// Uncaught-exception block: the error text plus one indented line per stack
/// frame, innermost first.
pub fn error_block(ts: &Timestamp, message: &str, frames: &[StackFrame]) -> String {
    let mut out = format!("[{}] JAVASCRIPT ERROR\n  {}\n", ts.clock, message);
    if !frames.is_empty() {
        out.push_str("  Stack Trace:\n");
        for frame in frames {
            let name = if frame.function_name.is_empty() {
                "(anonymous)"
            } else {
                &frame.function_name
            };
            out.push_str(&format!(
                "    at {} ({}:{}:{})\n",
                name, frame.url, frame.line, frame.column
            ));
        }
    }
    out
}

/// Opening block for a logged request: delimiter, request line, headers, and
/// body when present.
pub fn request_block(ts: &Timestamp, request: &RequestRecord) -> String {
    let mut out = format!("\n[{}] {}\n", ts.clock, BLOCK_DELIMITER);
    out.push_str(&format!("REQUEST: {} {}\n", request.method, request.url));
    push_headers(&mut out, &request.headers);
    if let Some(body) = &request.body {
        out.push_str(&format!("Body:\n  {body}\n"));
    }
    out
}

/// Response block, written as soon as the response arrives and never waiting
/// on body retrieval.
pub fn response_block(ts: &Timestamp, response: &ResponseRecord) -> String {
    let mut out = format!(
        "\n[{}] RESPONSE: {} {} ({}ms)\n",
        ts.clock, response.status, response.status_text, response.duration_ms
    );
    push_headers(&mut out, &response.headers);
    out
}

/// Body block appended after the asynchronous fetch resolves. Always closed
/// with its own terminator so interleaving across requests cannot corrupt a
/// block.
pub fn body_block(body: &BodyOutcome) -> String {
    match body {
        BodyOutcome::Text(content) => format!(
            "Body ({}):\n  {}\n{}\n",
            human_bytes(content.len() as u64),
            content,
            BLOCK_DELIMITER
        ),
        BodyOutcome::Base64 => format!("Body: [Base64 Encoded Data]\n{BLOCK_DELIMITER}\n"),
        BodyOutcome::Empty => format!("Body: [Empty]\n{BLOCK_DELIMITER}\n"),
        BodyOutcome::Unavailable => format!("Body: [Not Available]\n{BLOCK_DELIMITER}\n"),
    }
}

/// Degraded block for a request that was suppressed by the filter but whose
/// response came back with an error status. The matching request block was
/// never written, so this block is self-contained.
pub fn filtered_failure_block(
    ts: &Timestamp,
    method: &str,
    url: &str,
    status: i64,
    status_text: &str,
    duration_ms: i64,
) -> String {
    format!(
        "\n[{}] {}\nRESPONSE (filtered request): {} {} ({}ms)\n  {} {}\n{}\n",
        ts.clock, BLOCK_DELIMITER, status, status_text, duration_ms, method, url, BLOCK_DELIMITER
    )
}

/// Human byte-size rendering (`0 B`, `512 B`, `1.5 KB`, `2 MB`).
pub fn human_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    const UNITS: [&str; 2] = ["KB", "MB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0} {}", UNITS[unit - 1])
    } else {
        format!("{rounded:.1} {}", UNITS[unit - 1])
    }
}

fn push_headers(out: &mut String, headers: &[(String, String)]) {
    if headers.is_empty() {
        return;
    }
    out.push_str("Headers:\n");
    for (name, value) in headers {
        out.push_str(&format!("  {name}: {value}\n"));
    }
}
