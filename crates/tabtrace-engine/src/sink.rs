//! Owner of the two append-only log streams. All writes funnel through here,
//! so each file has exactly one writer and blocks are never torn.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tabtrace_common::format;
use tabtrace_common::stats::StatsSnapshot;
use thiserror::Error;
use tracing::warn;

pub const CONSOLE_LOG_FILE: &str = "console.log";
pub const NETWORK_LOG_FILE: &str = "network.log";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to open log file {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("failed to write session framing to {path}: {source}")]
    Framing { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, Copy)]
enum Channel {
    Console,
    Network,
}

#[derive(Debug)]
struct Streams {
    console: Option<File>,
    network: Option<File>,
    closed: bool,
}

/// Two truncate-mode file streams plus an optional live preview echo.
/// Opened exactly once by [`LogSink::initialize`], closed exactly once by
/// [`LogSink::finalize`]; writes after finalize are silently dropped.
#[derive(Debug)]
pub struct LogSink {
    dir: PathBuf,
    preview: bool,
    inner: Mutex<Streams>,
}

impl LogSink {
    /// Creates the session directory, opens both streams, and writes the
    /// header blocks.
    pub fn initialize(dir: &Path, preview: bool, started_iso: &str) -> Result<Self, SinkError> {
        fs::create_dir_all(dir).map_err(|source| SinkError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let dir_display = dir.display().to_string();
        let console = open_stream(
            &dir.join(CONSOLE_LOG_FILE),
            &format::session_header("Console Output", started_iso, &dir_display),
        )?;
        let network = open_stream(
            &dir.join(NETWORK_LOG_FILE),
            &format::session_header("Network Activity", started_iso, &dir_display),
        )?;

        Ok(Self {
            dir: dir.to_path_buf(),
            preview,
            inner: Mutex::new(Streams {
                console: Some(console),
                network: Some(network),
                closed: false,
            }),
        })
    }

    pub fn write_console(&self, message: &str) {
        self.append(Channel::Console, message);
    }

    pub fn write_network(&self, message: &str) {
        self.append(Channel::Network, message);
    }

    /// Writes footers (the network footer carries the final statistics),
    /// flushes, and closes both streams. Idempotent; the second call is a
    /// no-op.
    pub fn finalize(&self, stats: &StatsSnapshot, ended_iso: &str) -> Result<(), SinkError> {
        let Ok(mut streams) = self.inner.lock() else {
            return Ok(());
        };
        if streams.closed {
            return Ok(());
        }
        streams.closed = true;

        let mut result = Ok(());
        if let Some(mut console) = streams.console.take() {
            let footer = format::session_footer(ended_iso);
            if let Err(source) = console
                .write_all(footer.as_bytes())
                .and_then(|()| console.flush())
            {
                result = Err(SinkError::Framing {
                    path: self.dir.join(CONSOLE_LOG_FILE),
                    source,
                });
            }
        }
        if let Some(mut network) = streams.network.take() {
            let footer = format!(
                "{}{}",
                format::session_footer(ended_iso),
                format::network_stats_footer(stats)
            );
            if let Err(source) = network
                .write_all(footer.as_bytes())
                .and_then(|()| network.flush())
            {
                result = Err(SinkError::Framing {
                    path: self.dir.join(NETWORK_LOG_FILE),
                    source,
                });
            }
        }
        result
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn append(&self, channel: Channel, message: &str) {
        let Ok(mut streams) = self.inner.lock() else {
            return;
        };
        if streams.closed {
            return;
        }
        let file = match channel {
            Channel::Console => streams.console.as_mut(),
            Channel::Network => streams.network.as_mut(),
        };
        if let Some(file) = file
            && let Err(e) = writeln!(file, "{message}")
        {
            warn!("failed to write to {:?} log: {}", channel, e);
        }
        if self.preview {
            println!("{message}");
        }
    }
}

fn open_stream(path: &Path, header: &str) -> Result<File, SinkError> {
    let mut file = File::create(path).map_err(|source| SinkError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(header.as_bytes())
        .map_err(|source| SinkError::Framing {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(file)
}
