//! Console and exception capture for one attached page.
//!
//! Three event families feed the console stream: `Runtime.consoleAPICalled`,
//! `Log.entryAdded` (browser-originated entries such as network failures and
//! deprecation notices), and `Runtime.exceptionThrown`. Nothing is filtered;
//! every event that reaches this module is written.

use crate::capture::CaptureContext;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::log::{EventEntryAdded, LogEntryLevel};
use chromiumoxide::cdp::js_protocol::runtime::{
    ConsoleApiCalledType, EventConsoleApiCalled, EventExceptionThrown, ExceptionDetails,
    StackTrace,
};
use chromiumoxide::error::CdpError;
use futures::StreamExt;
use tabtrace_common::format;
use tabtrace_common::record::StackFrame;
use tokio::task::JoinHandle;

/// Subscribes to the three console-bearing event streams and spawns one
/// forwarding task per stream. Tasks end when the page's session ends.
pub(crate) async fn spawn(
    page: &Page,
    ctx: &CaptureContext,
) -> Result<Vec<JoinHandle<()>>, CdpError> {
    let mut console_events = page.event_listener::<EventConsoleApiCalled>().await?;
    let mut entry_events = page.event_listener::<EventEntryAdded>().await?;
    let mut exception_events = page.event_listener::<EventExceptionThrown>().await?;

    let mut tasks = Vec::with_capacity(3);

    let c = ctx.clone();
    tasks.push(tokio::spawn(async move {
        while let Some(event) = console_events.next().await {
            let text = event
                .args
                .iter()
                .map(|arg| format::console_arg_text(arg.value.as_ref(), arg.description.as_deref()))
                .collect::<Vec<_>>()
                .join(" ");
            let source = top_frame_location(event.stack_trace.as_ref());
            let kind = api_type_label(&event.r#type);
            let line =
                format::console_line(&c.clock.timestamp(), &kind, &text, source.as_deref());
            c.sink.write_console(&line);
        }
    }));

    let c = ctx.clone();
    tasks.push(tokio::spawn(async move {
        while let Some(event) = entry_events.next().await {
            let entry = &event.entry;
            let source = entry.url.as_ref().map(|url| match entry.line_number {
                Some(line) => format!("{url}:{line}"),
                None => url.clone(),
            });
            let line = format::console_line(
                &c.clock.timestamp(),
                entry_level_label(&entry.level),
                &entry.text,
                source.as_deref(),
            );
            c.sink.write_console(&line);
        }
    }));

    let c = ctx.clone();
    tasks.push(tokio::spawn(async move {
        while let Some(event) = exception_events.next().await {
            let details = &event.exception_details;
            let block = format::error_block(
                &c.clock.timestamp(),
                &exception_message(details),
                &stack_frames(details.stack_trace.as_ref()),
            );
            c.sink.write_console(&block);
        }
    }));

    Ok(tasks)
}

fn api_type_label(kind: &ConsoleApiCalledType) -> String {
    match kind {
        ConsoleApiCalledType::Log => "LOG".to_string(),
        ConsoleApiCalledType::Debug => "DEBUG".to_string(),
        ConsoleApiCalledType::Info => "INFO".to_string(),
        ConsoleApiCalledType::Error => "ERROR".to_string(),
        ConsoleApiCalledType::Warning => "WARN".to_string(),
        ConsoleApiCalledType::Trace => "TRACE".to_string(),
        other => format!("{other:?}").to_uppercase(),
    }
}

fn entry_level_label(level: &LogEntryLevel) -> &'static str {
    match level {
        LogEntryLevel::Verbose => "VERBOSE",
        LogEntryLevel::Info => "INFO",
        LogEntryLevel::Warning => "WARN",
        LogEntryLevel::Error => "ERROR",
    }
}

fn exception_message(details: &ExceptionDetails) -> String {
    if !details.text.is_empty() {
        return details.text.clone();
    }
    details
        .exception
        .as_ref()
        .and_then(|e| e.description.clone())
        .unwrap_or_else(|| "Unknown error".to_string())
}

fn top_frame_location(stack: Option<&StackTrace>) -> Option<String> {
    let frame = stack?.call_frames.first()?;
    Some(format!(
        "{}:{}:{}",
        frame.url, frame.line_number, frame.column_number
    ))
}

fn stack_frames(stack: Option<&StackTrace>) -> Vec<StackFrame> {
    stack
        .map(|st| {
            st.call_frames
                .iter()
                .map(|frame| StackFrame {
                    function_name: frame.function_name.clone(),
                    url: frame.url.clone(),
                    line: frame.line_number,
                    column: frame.column_number,
                })
                .collect()
        })
        .unwrap_or_default()
}
