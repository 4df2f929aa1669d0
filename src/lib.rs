//! gia-vang: gold price snapshot cache and change notifier
//!
//! This library provides the core components for:
//! - Vendor and price reading types for Vietnamese gold vendors
//! - A per-vendor snapshot cache that diffs new readings against the last one
//! - File and in-memory cache backends
//! - Pluggable price sources with a generic JSON-over-HTTP adapter
//! - Change notifications in thousands of VND
//! - Logging and metrics

pub mod cache;
pub mod cli;
pub mod config;
pub mod monitor;
pub mod notify;
pub mod price;
pub mod source;
pub mod telemetry;
