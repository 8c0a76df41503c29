//! Integration test against a real Chromium instance. Skips gracefully when
//! no browser is installed, so CI without Chromium still passes.

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;
use tabtrace_common::stats::NetworkStats;
use tabtrace_engine::attach::PageAttachment;
use tabtrace_engine::capture::CaptureContext;
use tabtrace_engine::clock::SessionClock;
use tabtrace_engine::sink::{CONSOLE_LOG_FILE, LogSink};

#[tokio::test]
#[serial]
async fn captures_console_output_from_a_live_page() {
    tracing_subscriber::fmt()
        .with_test_writer()
        .try_init()
        .ok();

    let config = match BrowserConfig::builder().no_sandbox().build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("could not build browser config: {e}");
            return;
        }
    };
    let (mut browser, mut handler) = match Browser::launch(config).await {
        Ok(launched) => launched,
        Err(e) => {
            eprintln!("failed to launch browser (is Chromium installed?): {e}");
            return;
        }
    };
    let handler_task = tokio::spawn(async move {
        while let Some(result) = handler.next().await {
            let _ = result;
        }
    });

    let dir = tempfile::tempdir().unwrap();
    let clock = SessionClock::start();
    let sink = Arc::new(LogSink::initialize(dir.path(), false, clock.started_iso()).unwrap());
    let ctx = CaptureContext {
        sink,
        clock: Arc::new(clock),
        stats: Arc::new(NetworkStats::default()),
    };

    let page = browser.new_page("about:blank").await.unwrap();
    let attachment = PageAttachment::attach(page.clone(), &ctx)
        .await
        .expect("attach failed");

    page.goto("data:text/html,<script>console.log('hello from tabtrace')</script>")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    let console = std::fs::read_to_string(dir.path().join(CONSOLE_LOG_FILE)).unwrap();
    assert!(console.contains("Monitoring new page/tab"));
    assert!(
        console.contains("hello from tabtrace"),
        "console message not captured:\n{console}"
    );

    attachment.detach();
    browser.close().await.ok();
    let _ = handler_task.await;
}
