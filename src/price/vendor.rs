//! Gold vendors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A Vietnamese gold-price vendor
///
/// Variants are declared in display priority order, so sorting by `Vendor`
/// lists SJC first and Ngọc Thẩm last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    Sjc,
    Doji,
    Pnj,
    PhuQuy,
    NgocTham,
}

impl Vendor {
    /// Number of vendors
    pub const COUNT: usize = 5;

    /// Every vendor in priority order
    pub const ALL: [Vendor; Vendor::COUNT] = [
        Vendor::Sjc,
        Vendor::Doji,
        Vendor::Pnj,
        Vendor::PhuQuy,
        Vendor::NgocTham,
    ];

    /// Stable identifier used in cache keys, config files and the CLI
    pub fn id(&self) -> &'static str {
        match self {
            Vendor::Sjc => "sjc",
            Vendor::Doji => "doji",
            Vendor::Pnj => "pnj",
            Vendor::PhuQuy => "phu_quy",
            Vendor::NgocTham => "ngoc_tham",
        }
    }

    /// Human-readable vendor name
    pub fn display_name(&self) -> &'static str {
        match self {
            Vendor::Sjc => "SJC",
            Vendor::Doji => "Doji",
            Vendor::Pnj => "PNJ",
            Vendor::PhuQuy => "Phú Quý",
            Vendor::NgocTham => "Ngọc Thẩm",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Returned when a vendor identifier is not recognised
#[derive(Debug, Clone, Error)]
#[error("Unknown vendor: {0}")]
pub struct ParseVendorError(pub String);

impl FromStr for Vendor {
    type Err = ParseVendorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace(['-', ' '], "_");
        Vendor::ALL
            .into_iter()
            .find(|v| v.id() == needle || v.display_name().to_lowercase() == s.trim().to_lowercase())
            .ok_or_else(|| ParseVendorError(s.to_string()))
    }
}
