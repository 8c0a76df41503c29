//! Network request/response correlation for one attached page.
//!
//! Owns the pending-request table keyed by the protocol-assigned request id.
//! The filtering decision is made once at request-start and never recomputed;
//! response bodies are fetched asynchronously so the response line is never
//! delayed by body retrieval.

use crate::capture::CaptureContext;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::network::{
    EventRequestWillBeSent, EventResponseReceived, GetResponseBodyParams, Headers,
};
use chromiumoxide::error::CdpError;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tabtrace_common::record::{BodyOutcome, RequestRecord, ResponseRecord, Timestamp};
use tabtrace_common::{filter, format};
use tokio::task::JoinHandle;

/// One in-flight request. If the response never arrives the entry leaks for
/// the attachment's lifetime, which is bounded by the page.
#[derive(Debug)]
struct PendingRequest {
    method: String,
    url: String,
    should_log: bool,
    /// CDP monotonic timestamp (seconds) at request start.
    started_at: f64,
}

/// Subscribes to the request/response lifecycle streams and spawns the two
/// correlation tasks.
pub(crate) async fn spawn(
    page: &Page,
    ctx: &CaptureContext,
) -> Result<Vec<JoinHandle<()>>, CdpError> {
    let mut request_events = page.event_listener::<EventRequestWillBeSent>().await?;
    let mut response_events = page.event_listener::<EventResponseReceived>().await?;

    let pending: Arc<Mutex<HashMap<String, PendingRequest>>> =
        Arc::new(Mutex::new(HashMap::new()));

    let table = pending.clone();
    let c = ctx.clone();
    let request_page = page.clone();
    let request_task = tokio::spawn(async move {
        while let Some(event) = request_events.next().await {
            let request = &event.request;
            let page_url = request_page.url().await.ok().flatten();
            let should_log =
                filter::should_log(&request.method, &request.url, None, page_url.as_deref());
            c.stats.count_request(should_log);

            if let Ok(mut table) = table.lock() {
                table.insert(
                    event.request_id.inner().clone(),
                    PendingRequest {
                        method: request.method.clone(),
                        url: request.url.clone(),
                        should_log,
                        started_at: *event.timestamp.inner(),
                    },
                );
            }

            if !should_log {
                continue;
            }

            let record = RequestRecord {
                method: request.method.clone(),
                url: request.url.clone(),
                headers: header_pairs(&request.headers),
                body: request.post_data.clone(),
            };
            c.sink
                .write_network(&format::request_block(&c.clock.timestamp(), &record));
        }
    });

    let table = pending.clone();
    let c = ctx.clone();
    let body_page = page.clone();
    let response_task = tokio::spawn(async move {
        while let Some(event) = response_events.next().await {
            let entry = match table.lock() {
                Ok(mut table) => table.remove(event.request_id.inner()),
                Err(_) => None,
            };
            // Response for an untracked request: not an error, just noise
            // from before we attached.
            let Some(entry) = entry else {
                continue;
            };

            let response = &event.response;
            let duration_ms =
                ((*event.timestamp.inner() - entry.started_at) * 1000.0).round() as i64;

            if let Some(block) = immediate_response_output(
                &c.clock.timestamp(),
                &entry,
                response.status,
                &response.status_text,
                duration_ms,
                &response.headers,
            ) {
                c.sink.write_network(&block);
            }
            if !entry.should_log {
                continue;
            }

            // Body retrieval must not hold up this handler; a body resolving
            // after shutdown is dropped by the closed sink.
            let page = body_page.clone();
            let body_ctx = c.clone();
            let request_id = event.request_id.clone();
            tokio::spawn(async move {
                let outcome = match page.execute(GetResponseBodyParams::new(request_id)).await {
                    Ok(response) => {
                        let returns = &response.result;
                        if returns.base64_encoded {
                            BodyOutcome::Base64
                        } else if returns.body.is_empty() {
                            BodyOutcome::Empty
                        } else {
                            BodyOutcome::Text(returns.body.clone())
                        }
                    }
                    Err(_) => BodyOutcome::Unavailable,
                };
                body_ctx.sink.write_network(&format::body_block(&outcome));
            });
        }
    });

    Ok(vec![request_task, response_task])
}

/// What, if anything, to write the moment a response arrives. Logged
/// requests get the full response block; suppressed requests stay silent
/// unless the status signals a failure, in which case a minimal,
/// self-contained error line keeps the failure from being invisible.
fn immediate_response_output(
    timestamp: &Timestamp,
    entry: &PendingRequest,
    status: i64,
    status_text: &str,
    duration_ms: i64,
    headers: &Headers,
) -> Option<String> {
    if entry.should_log {
        let record = ResponseRecord {
            status,
            status_text: status_text.to_string(),
            duration_ms,
            headers: header_pairs(headers),
        };
        return Some(format::response_block(timestamp, &record));
    }
    if status >= 400 {
        return Some(format::filtered_failure_block(
            timestamp,
            &entry.method,
            &entry.url,
            status,
            status_text,
            duration_ms,
        ));
    }
    None
}

/// Flattens a CDP header object into ordered name/value pairs.
fn header_pairs(headers: &Headers) -> Vec<(String, String)> {
    headers
        .inner()
        .as_object()
        .map(|map| {
            map.iter()
                .map(|(name, value)| {
                    let value = match value.as_str() {
                        Some(s) => s.to_string(),
                        None => value.to_string(),
                    };
                    (name.clone(), value)
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_pairs_flattens_object_values() {
        let headers = Headers::new(json!({
            "content-type": "application/json",
            "x-count": 3,
        }));
        let pairs = header_pairs(&headers);
        assert!(pairs.contains(&("content-type".to_string(), "application/json".to_string())));
        assert!(pairs.contains(&("x-count".to_string(), "3".to_string())));
    }

    #[test]
    fn header_pairs_tolerates_non_object_payloads() {
        assert!(header_pairs(&Headers::new(json!(null))).is_empty());
        assert!(header_pairs(&Headers::new(json!("bogus"))).is_empty());
    }

    fn timestamp() -> Timestamp {
        Timestamp {
            iso: "2025-11-23T14:30:45.123Z".to_string(),
            clock: "14:30:45".to_string(),
            elapsed: "+1.234s".to_string(),
        }
    }

    fn pending(should_log: bool) -> PendingRequest {
        PendingRequest {
            method: "GET".to_string(),
            url: "http://localhost:3000/assets/app.js".to_string(),
            should_log,
            started_at: 0.0,
        }
    }

    #[test]
    fn logged_response_gets_a_full_block() {
        let headers = Headers::new(json!({"content-type": "text/html"}));
        let block =
            immediate_response_output(&timestamp(), &pending(true), 200, "OK", 12, &headers);
        let block = block.expect("logged requests always produce output");
        assert!(block.contains("RESPONSE: 200 OK (12ms)"));
        assert!(block.contains("content-type: text/html"));
    }

    #[test]
    fn suppressed_failure_gets_a_degraded_block() {
        let headers = Headers::new(json!({}));
        let block = immediate_response_output(
            &timestamp(),
            &pending(false),
            404,
            "Not Found",
            8,
            &headers,
        );
        let block = block.expect("failed responses are never invisible");
        assert!(block.contains("RESPONSE (filtered request): 404 Not Found (8ms)"));
        assert!(block.contains("GET http://localhost:3000/assets/app.js"));
    }

    #[test]
    fn suppressed_success_writes_nothing() {
        let headers = Headers::new(json!({}));
        assert!(
            immediate_response_output(&timestamp(), &pending(false), 200, "OK", 5, &headers)
                .is_none()
        );
        assert!(
            immediate_response_output(&timestamp(), &pending(false), 304, "Not Modified", 2, &headers)
                .is_none()
        );
    }
}
