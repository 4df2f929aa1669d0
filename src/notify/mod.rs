//! Notification module
//!
//! Renders change reports as a human-readable price update

mod format;

pub use format::{format_delta, format_price, format_thousands, render};
