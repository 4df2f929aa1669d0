//! Price update formatting
//!
//! Prices are shown in thousands of VND with `.` as the thousands separator,
//! followed by the signed move since the cached reading:
//!
//! ```text
//! SJC      74.500 (+500)  76.000 (0)
//! ```

use crate::cache::ChangeReport;
use crate::price::Vendor;
use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

const UNIT: &str = "k VND/chỉ";
const VENDOR_HEADER: &str = "Nguồn";
const BUY_HEADER: &str = "Mua";
const SELL_HEADER: &str = "Bán";
const NO_DATA: &str = "Lỗi: Không thể lấy được dữ liệu giá vàng từ bất kỳ nguồn nào.";

/// Vietnam is UTC+7 all year
const VN_OFFSET_HOURS: i64 = 7;

/// Round to whole thousands, half to even
fn to_thousands(value: Decimal) -> Decimal {
    (value / dec!(1000)).round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}

/// Insert `.` between groups of three digits
fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

/// Format a VND amount in thousands, e.g. `74500000` → `74.500`
pub fn format_thousands(value: Decimal) -> String {
    let thousands = to_thousands(value);
    let digits = group_digits(&thousands.abs().trunc().to_string());
    if thousands.is_sign_negative() && !thousands.is_zero() {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// Format a VND move in thousands with an explicit sign, `0` when flat
pub fn format_delta(delta: Decimal) -> String {
    let thousands = to_thousands(delta);
    if thousands.is_zero() {
        return "0".to_string();
    }
    let sign = if thousands.is_sign_negative() { '-' } else { '+' };
    format!("{}{}", sign, group_digits(&thousands.abs().trunc().to_string()))
}

/// Format a price, with its move when a previous price is known
pub fn format_price(current: Decimal, previous: Option<Decimal>) -> String {
    match previous {
        Some(prev) => format!("{} ({})", format_thousands(current), format_delta(current - prev)),
        None => format_thousands(current),
    }
}

fn width(text: &str) -> usize {
    text.chars().count()
}

/// Render a price update notification
///
/// Reports are listed in vendor priority order; fetch or cache failures are
/// appended after the table.
pub fn render(
    reports: &[ChangeReport],
    failures: &[(Vendor, String)],
    generated_at: DateTime<Utc>,
) -> String {
    let local = generated_at + TimeDelta::hours(VN_OFFSET_HOURS);
    let header = format!(
        "Cập nhật giá vàng lúc {} GMT+7:",
        local.format("%d/%m/%Y %H:%M:%S")
    );

    let mut sections = vec![header];

    if reports.is_empty() {
        sections.push(NO_DATA.to_string());
    } else {
        sections.push(render_table(reports));
    }

    if !failures.is_empty() {
        let lines: Vec<String> = failures
            .iter()
            .map(|(vendor, error)| format!("- {}: {}", vendor, error))
            .collect();
        sections.push(format!("Lỗi khi cập nhật:\n{}", lines.join("\n")));
    }

    sections.join("\n\n")
}

fn render_table(reports: &[ChangeReport]) -> String {
    let mut sorted: Vec<&ChangeReport> = reports.iter().collect();
    sorted.sort_by_key(|r| r.vendor);

    let rows: Vec<(String, String, String)> = sorted
        .iter()
        .map(|r| {
            let previous = r.previous.as_ref();
            (
                r.vendor.display_name().to_string(),
                format_price(r.current.buy_price(), previous.map(|p| p.buy_price())),
                format_price(r.current.sell_price(), previous.map(|p| p.sell_price())),
            )
        })
        .collect();

    let vendor_w = rows.iter().map(|r| width(&r.0)).fold(width(VENDOR_HEADER), usize::max);
    let buy_w = rows.iter().map(|r| width(&r.1)).fold(width(BUY_HEADER), usize::max);
    let sell_w = rows.iter().map(|r| width(&r.2)).fold(width(SELL_HEADER), usize::max);

    let mut lines = vec![
        format!("Giá vàng ({})", UNIT),
        format!(
            "{:<vendor_w$}  {:>buy_w$}  {:>sell_w$}",
            VENDOR_HEADER, BUY_HEADER, SELL_HEADER
        ),
        format!(
            "{}  {}  {}",
            "-".repeat(vendor_w),
            "-".repeat(buy_w),
            "-".repeat(sell_w)
        ),
    ];

    for (vendor, buy, sell) in &rows {
        lines.push(format!("{:<vendor_w$}  {:>buy_w$}  {:>sell_w$}", vendor, buy, sell));
    }

    format!("```\n{}\n```", lines.join("\n"))
}
