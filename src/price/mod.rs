//! Price domain module
//!
//! Vendors and the timestamped buy/sell readings they publish

mod types;
mod vendor;

pub use types::PriceReading;
pub use vendor::{ParseVendorError, Vendor};
