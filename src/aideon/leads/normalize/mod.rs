//! Pure, independent field normalisers used by the record cleaner.

pub mod phone;
pub mod salary;

use once_cell::sync::Lazy;
use regex::Regex;

pub use phone::{PhoneNormalizer, PhoneRule, PhoneShape, normalize_phone};
pub use salary::normalize_salary;

/// Oldest age accepted; anything above is treated as a data entry error.
pub const MAX_AGE: u32 = 150;

static LEADING_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+").expect("valid leading integer pattern"));

/// Trims free text; blank cells become `None`.
pub fn normalize_text(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Lowercases and trims an email address.
pub fn normalize_email(raw: Option<&str>) -> Option<String> {
    normalize_text(raw).map(|email| email.to_lowercase())
}

/// Reads the leading whole number of an age cell, so `"32"`, `"32.0"` and
/// `"32 years"` all yield 32. Values above [`MAX_AGE`] are absent.
pub fn normalize_age(raw: Option<&str>) -> Option<u32> {
    let trimmed = raw?.trim();
    LEADING_INTEGER
        .find(trimmed)?
        .as_str()
        .parse()
        .ok()
        .filter(|age| *age <= MAX_AGE)
}
