//! Structured forms of everything the capture engine writes to disk.
//!
//! These types are protocol-agnostic: the engine translates CDP event
//! payloads into them before handing anything to the formatter.

/// Timestamp pair carried by every emitted record: wall-clock time plus
/// elapsed time since session start.
#[derive(Debug, Clone)]
pub struct Timestamp {
    /// ISO-8601 with millisecond precision, used in headers and footers.
    pub iso: String,
    /// Local wall-clock time (`HH:MM:SS`), used as the line prefix.
    pub clock: String,
    /// Elapsed time since session start, rendered `+N.NNNs`.
    pub elapsed: String,
}

/// One frame of a JavaScript call stack.
#[derive(Debug, Clone)]
pub struct StackFrame {
    /// Empty for anonymous functions.
    pub function_name: String,
    pub url: String,
    pub line: i64,
    pub column: i64,
}

/// An HTTP request as seen at `Network.requestWillBeSent` time.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response as seen at `Network.responseReceived` time. The body is
/// retrieved separately and written as its own [`BodyOutcome`] block.
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub status: i64,
    pub status_text: String,
    pub duration_ms: i64,
    pub headers: Vec<(String, String)>,
}

/// Result of the asynchronous response-body fetch.
#[derive(Debug, Clone)]
pub enum BodyOutcome {
    Text(String),
    /// Binary payload; a placeholder is written instead of decoding it.
    Base64,
    Empty,
    /// The protocol refused the body (204, opaque cross-origin response, or
    /// the target went away).
    Unavailable,
}
