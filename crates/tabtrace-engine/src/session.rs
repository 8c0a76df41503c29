//! Top-level session lifecycle: browser launch, page discovery, dynamic
//! attachment, and orderly shutdown.

use crate::attach::PageAttachment;
use crate::capture::CaptureContext;
use crate::clock::SessionClock;
use crate::config::{LogFormat, SessionConfig};
use crate::discover;
use crate::sink::{LogSink, SinkError};
use chromiumoxide::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::target::EventTargetCreated;
use futures::StreamExt;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tabtrace_common::stats::{NetworkStats, StatsSnapshot};
use thiserror::Error;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no Chromium-based browser found; install Chrome, Edge, or Brave, or pass an explicit executable path")]
    BrowserNotFound,
    #[error("failed to configure browser launch: {0}")]
    LaunchConfig(String),
    #[error("browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Registry of active attachments, keyed by the opaque target id. Entries
/// whose page has closed are inert (their tasks have ended) and are
/// reclaimed at shutdown.
type AttachmentMap = Arc<Mutex<HashMap<String, PageAttachment>>>;

/// Owns the browser process handle and the set of active page attachments
/// for one capture session.
pub struct SessionController {
    browser: Arc<Mutex<Browser>>,
    handler_task: JoinHandle<()>,
    target_task: JoinHandle<()>,
    attachments: AttachmentMap,
    ctx: CaptureContext,
    stopped: bool,
}

impl SessionController {
    /// Launches the browser, initializes the log sink, attaches to every
    /// open page, and starts watching for new tabs. The returned receiver
    /// fires when the browser disconnects on its own (user closed the
    /// window), which callers should treat as an implicit stop request.
    ///
    /// Failure to find or launch a browser is fatal; failure to attach to an
    /// individual page is not.
    pub async fn start(
        config: SessionConfig,
    ) -> Result<(Self, oneshot::Receiver<()>), SessionError> {
        let executable = resolve_executable(&config)?;
        debug!("using browser executable: {}", executable.display());

        let clock = SessionClock::start();
        let sink = Arc::new(LogSink::initialize(
            &config.log_dir,
            config.preview,
            clock.started_iso(),
        )?);
        let ctx = CaptureContext {
            sink,
            clock: Arc::new(clock),
            stats: Arc::new(NetworkStats::default()),
        };

        if config.format == LogFormat::Json {
            warn!("json format mode is declared but not implemented; using the line format");
        }

        let browser_config = BrowserConfig::builder()
            .with_head()
            .no_sandbox()
            .chrome_executable(executable)
            .window_size(1920, 1080)
            .args(vec!["--no-first-run", "--no-default-browser-check"])
            .build()
            .map_err(SessionError::LaunchConfig)?;

        let (browser, mut handler) = Browser::launch(browser_config).await?;
        info!("browser launched, devtools protocol connected");

        // The handler stream ends when the connection to the browser drops,
        // which is how we observe the user closing the window.
        let (disconnect_tx, disconnect_rx) = oneshot::channel();
        let handler_task = tokio::spawn(async move {
            while let Some(result) = handler.next().await {
                if let Err(e) = result {
                    debug!("browser handler error (ignoring): {}", e);
                }
            }
            info!("browser connection closed");
            let _ = disconnect_tx.send(());
        });

        let attachments: AttachmentMap = Arc::new(Mutex::new(HashMap::new()));
        for page in browser.pages().await? {
            match PageAttachment::attach(page, &ctx).await {
                Ok(attachment) => {
                    attachments
                        .lock()
                        .await
                        .insert(attachment.target_id().to_string(), attachment);
                }
                Err(e) => warn!("failed to attach to page: {}", e),
            }
        }

        let mut new_targets = browser.event_listener::<EventTargetCreated>().await?;
        let browser = Arc::new(Mutex::new(browser));
        let watcher_browser = browser.clone();
        let watcher_ctx = ctx.clone();
        let watcher_attachments = attachments.clone();
        let target_task = tokio::spawn(async move {
            while let Some(event) = new_targets.next().await {
                let info = &event.target_info;
                if info.r#type != "page" {
                    continue;
                }
                // Give the handler a moment to register the new target
                // before asking it for the page handle.
                tokio::time::sleep(Duration::from_millis(100)).await;
                let page = match watcher_browser
                    .lock()
                    .await
                    .get_page(info.target_id.clone())
                    .await
                {
                    Ok(page) => page,
                    Err(e) => {
                        warn!("failed to resolve new page target: {}", e);
                        continue;
                    }
                };
                match PageAttachment::attach(page, &watcher_ctx).await {
                    Ok(attachment) => {
                        watcher_attachments
                            .lock()
                            .await
                            .insert(attachment.target_id().to_string(), attachment);
                    }
                    Err(e) => warn!("failed to monitor new page: {}", e),
                }
            }
        });

        Ok((
            Self {
                browser,
                handler_task,
                target_task,
                attachments,
                ctx,
                stopped: false,
            },
            disconnect_rx,
        ))
    }

    /// Writes footers with the final statistics, closes both streams, and
    /// optionally terminates the browser. Idempotent; sink and browser
    /// cleanup are independent and both attempted.
    pub async fn stop(&mut self, close_browser: bool) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        self.target_task.abort();
        self.attachments.lock().await.clear();

        let snapshot = self.ctx.stats.snapshot();
        if let Err(e) = self
            .ctx
            .sink
            .finalize(&snapshot, &self.ctx.clock.now_iso())
        {
            warn!("failed to finalize log streams: {}", e);
        }

        if close_browser {
            if let Err(e) = self.browser.lock().await.close().await {
                warn!("failed to close browser: {}", e);
            }
            // The handler drains remaining protocol traffic, then ends when
            // the connection drops.
            let _ =
                tokio::time::timeout(Duration::from_secs(5), &mut self.handler_task).await;
        }

        info!("browser logging stopped");
    }

    /// Final counters, for callers that report a summary after stopping.
    pub fn stats(&self) -> StatsSnapshot {
        self.ctx.stats.snapshot()
    }

    /// Directory the two log files live in.
    pub fn log_dir(&self) -> PathBuf {
        self.ctx.sink.dir().to_path_buf()
    }
}

fn resolve_executable(config: &SessionConfig) -> Result<PathBuf, SessionError> {
    config
        .browser_path
        .clone()
        .or_else(|| std::env::var("CHROME_BIN").ok().map(PathBuf::from))
        .or_else(discover::find_browser)
        .ok_or(SessionError::BrowserNotFound)
}
