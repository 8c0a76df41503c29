//! Session capture and correlation engine.
//!
//! Attaches to a Chromium browser over CDP, multiplexes console and network
//! events across every open tab, and persists two ordered log streams
//! (`console.log`, `network.log`) with end-of-session statistics.

pub mod attach;
pub mod capture;
pub mod clock;
pub mod config;
pub mod discover;
pub mod har;
pub mod session;
pub mod sink;
