//! Binding of one CDP session to one page/tab.

use crate::capture::{CaptureContext, console, network};
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::log as cdp_log;
use chromiumoxide::cdp::browser_protocol::network as cdp_network;
use chromiumoxide::cdp::js_protocol::runtime;
use chromiumoxide::error::CdpError;
use tabtrace_common::format;
use tokio::task::JoinHandle;

/// One monitored page: the three protocol domains enabled and the capture
/// tasks wired to the page's event streams. Holds no resources beyond the
/// subscriptions; when the tab closes the streams end and the tasks finish
/// on their own.
pub struct PageAttachment {
    target_id: String,
    tasks: Vec<JoinHandle<()>>,
}

impl PageAttachment {
    /// Enables the Network, Runtime, and Log domains, announces the page in
    /// both log streams, and spawns the capture tasks. Any failure here is
    /// recoverable at the session level: the caller logs it and skips the
    /// page.
    pub async fn attach(page: Page, ctx: &CaptureContext) -> Result<Self, CdpError> {
        page.execute(cdp_network::EnableParams::default()).await?;
        page.execute(runtime::EnableParams::default()).await?;
        page.execute(cdp_log::EnableParams::default()).await?;

        let url = page
            .url()
            .await?
            .unwrap_or_else(|| "about:blank".to_string());
        let marker = format::monitor_marker(&url);
        ctx.sink.write_console(&marker);
        ctx.sink.write_network(&marker);

        let mut tasks = console::spawn(&page, ctx).await?;
        tasks.extend(network::spawn(&page, ctx).await?);

        let target_id = page.target_id().inner().clone();
        Ok(Self { target_id, tasks })
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Tears the capture tasks down early. Normally unnecessary: they end
    /// when the page's session does.
    pub fn detach(self) {
        for task in self.tasks {
            task.abort();
        }
    }
}
