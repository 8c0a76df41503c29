//! Fully-resolved session configuration, injected by the caller. The engine
//! never reads ambient state itself.

use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory the two log files are written into; created if absent.
    pub log_dir: PathBuf,
    /// Explicit browser executable; skips discovery when set.
    pub browser_path: Option<PathBuf>,
    /// Echo every captured line to stdout in addition to the files.
    pub preview: bool,
    pub format: LogFormat,
}

/// Output format mode. `Json` is accepted as declared surface; rendering is
/// line-oriented until the structured schema is settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Default,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}' (expected 'default' or 'json')")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_known_modes() {
        assert_eq!("default".parse::<LogFormat>().unwrap(), LogFormat::Default);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("yaml".parse::<LogFormat>().is_err());
    }
}
