//! Per-page event capture: console/exception events and the network
//! request/response correlation engine.

pub mod console;
pub mod network;

use crate::clock::SessionClock;
use crate::sink::LogSink;
use std::sync::Arc;
use tabtrace_common::stats::NetworkStats;

/// Shared handles every capture task needs: the single-writer sink, the
/// session clock, and the process-wide counters.
#[derive(Debug, Clone)]
pub struct CaptureContext {
    pub sink: Arc<LogSink>,
    pub clock: Arc<SessionClock>,
    pub stats: Arc<NetworkStats>,
}
