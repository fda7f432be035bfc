//! Fixed-width field rules of the carrier's request schema.
//!
//! The gateway rejects documents whose fields exceed these widths, so every
//! value passes through one of the helpers below before it is written.

use rust_decimal::{Decimal, RoundingStrategy};
use shipquote_models::shipment::{Item, Package};

pub const ACCOUNT_NUMBER_MAX_LEN: usize = 9;
pub const COMPANY_NAME_MAX_LEN: usize = 60;
pub const PERSON_NAME_MAX_LEN: usize = 34;
pub const PHONE_NUMBER_MAX_LEN: usize = 24;
pub const ADDRESS_LINE_MAX_LEN: usize = 45;
pub const ADDRESS_LINE_MAX_COUNT: usize = 3;
pub const PIECE_CONTENTS_MAX_LEN: usize = 34;
pub const SHIPMENT_CONTENTS_MAX_LEN: usize = 500;

/// Keep at most `max` characters. Counts chars, not bytes.
pub fn truncate(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Collapse whitespace runs, then cut the street into
/// [`ADDRESS_LINE_MAX_LEN`]-char lines, keeping the first
/// [`ADDRESS_LINE_MAX_COUNT`]. Words may be split across lines.
pub fn split_address(street: &str) -> Vec<String> {
    let collapsed = street.split_whitespace().collect::<Vec<_>>().join(" ");
    let chars: Vec<char> = collapsed.chars().collect();
    chars
        .chunks(ADDRESS_LINE_MAX_LEN)
        .take(ADDRESS_LINE_MAX_COUNT)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Weight with exactly three decimals.
pub fn format_weight(weight: f64) -> String {
    format!("{weight:.3}")
}

/// `(width, height, depth)` rounded to whole units, only when all three
/// dimensions are present and non-zero.
pub fn piece_dimensions(package: &Package) -> Option<(i64, i64, i64)> {
    match (package.width, package.height, package.length) {
        (Some(w), Some(h), Some(l)) if w != 0.0 && h != 0.0 && l != 0.0 => {
            Some((w.round() as i64, h.round() as i64, l.round() as i64))
        }
        _ => None,
    }
}

/// Item names joined with commas, cut to [`PIECE_CONTENTS_MAX_LEN`].
pub fn piece_contents(items: &[Item]) -> String {
    let joined = items
        .iter()
        .map(|item| item.name.as_str())
        .collect::<Vec<_>>()
        .join(",");
    truncate(&joined, PIECE_CONTENTS_MAX_LEN)
}

/// Per-piece contents joined with commas, cut to [`SHIPMENT_CONTENTS_MAX_LEN`].
pub fn shipment_contents(pieces: &[String]) -> String {
    truncate(&pieces.join(","), SHIPMENT_CONTENTS_MAX_LEN)
}

/// First letter of a unit name: `KG` → `K`, `CM` → `C`.
pub fn unit_code(unit: &str) -> String {
    truncate(unit.trim(), 1).to_uppercase()
}

/// Monetary value with exactly two decimals, half away from zero.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}
