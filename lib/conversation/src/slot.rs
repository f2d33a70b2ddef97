//! Slot parsing and pricing.

use regex::Regex;
use std::sync::LazyLock;

/// Price charged per adult.
pub const ADULT_UNIT_PRICE: u64 = 100;

/// Price charged per child.
pub const CHILD_UNIT_PRICE: u64 = 50;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit pattern compiles"));

/// Returns the first run of ASCII digits in `text` as a base-10 integer.
///
/// No range or plausibility checks beyond fitting in a `u32`; a run too
/// long to fit is treated as no match. Zero is accepted.
#[must_use]
pub fn extract_first_integer(text: &str) -> Option<u32> {
    DIGIT_RUN
        .find(text)
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// Total reservation price for the given party.
#[must_use]
pub fn total_price(adults: u32, children: u32) -> u64 {
    u64::from(adults) * ADULT_UNIT_PRICE + u64::from(children) * CHILD_UNIT_PRICE
}
