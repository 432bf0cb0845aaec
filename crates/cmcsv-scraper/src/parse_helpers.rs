//! Tolerant value readers for order-page row markup.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Parses a price in either `.` or `,` decimal notation.
///
/// Currency symbols and whitespace are ignored. When both separators occur,
/// the rightmost one is the decimal separator (`1.234,56` and `1,234.56` are
/// both 1234.56). Negative values are rejected.
pub(crate) fn parse_price(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, Some(_)) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    let value = Decimal::from_str(&normalized).ok()?;
    (value >= Decimal::ZERO).then_some(value)
}

/// Classifies a marker label (`title`, tooltip, aria label) as a finish.
///
/// Only whole labels count: card names and image tooltips such as
/// "Etched Champion" also appear in row labels.
pub(crate) fn finish_from_label(label: &str) -> Option<cmcsv_core::Finish> {
    match label.trim().to_ascii_lowercase().as_str() {
        "etched" | "etched foil" | "foil etched" => Some(cmcsv_core::Finish::Etched),
        "foil" | "foiled" => Some(cmcsv_core::Finish::Foil),
        _ => None,
    }
}

/// Reads a language from a marker label. Only full language names are
/// accepted here; short codes and numeric ids in tooltips are too easy to
/// confuse with unrelated markup.
pub(crate) fn language_from_label(label: &str) -> Option<String> {
    let trimmed = label.trim();
    if trimmed.len() <= 3 || !trimmed.chars().all(|c| c.is_alphabetic() || c == '-' || c == ' ') {
        return None;
    }
    cmcsv_core::normalize_language(trimmed)
}
