//! Session time source: wall-clock stamps for framing, elapsed time for
//! per-line instrumentation.

use chrono::{Local, SecondsFormat};
use std::time::Instant;
use tabtrace_common::record::Timestamp;

#[derive(Debug)]
pub struct SessionClock {
    started_iso: String,
    origin: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self {
            started_iso: Local::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            origin: Instant::now(),
        }
    }

    /// The timestamp pair stamped onto every record.
    pub fn timestamp(&self) -> Timestamp {
        let now = Local::now();
        Timestamp {
            iso: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            clock: now.format("%H:%M:%S").to_string(),
            elapsed: format!("+{:.3}s", self.origin.elapsed().as_secs_f64()),
        }
    }

    pub fn started_iso(&self) -> &str {
        &self.started_iso
    }

    pub fn now_iso(&self) -> String {
        Local::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_monotonic_and_formatted() {
        let clock = SessionClock::start();
        let first = clock.timestamp();
        assert!(first.elapsed.starts_with('+'));
        assert!(first.elapsed.ends_with('s'));
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = clock.timestamp();
        let parse = |t: &str| t[1..t.len() - 1].parse::<f64>().unwrap();
        assert!(parse(&second.elapsed) > parse(&first.elapsed));
    }

    #[test]
    fn clock_field_is_wall_time() {
        let ts = SessionClock::start().timestamp();
        assert_eq!(ts.clock.len(), 8);
        assert_eq!(ts.clock.matches(':').count(), 2);
    }
}
