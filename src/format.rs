//! Display formatting. One locale only: rupees with Indian digit grouping.

use chrono::NaiveDate;

pub const CURRENCY_SYMBOL: &str = "₹";
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// `1234567.5` becomes `₹12,34,567.50`.
///
/// Always two decimals, rounded half away from zero.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    format!(
        "{}{}{}.{:02}",
        sign,
        CURRENCY_SYMBOL,
        group_indian(cents / 100),
        cents % 100
    )
}

/// Last three digits, then pairs: 1,23,45,678.
fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Quantities print without trailing zeros: `2`, `1.5`.
pub fn format_quantity(quantity: f64) -> String {
    quantity.to_string()
}
