use once_cell::sync::Lazy;
use regex::Regex;

/// One lakh.
pub const LAKH: f64 = 100_000.0;
/// One crore.
pub const CRORE: f64 = 10_000_000.0;

// A bare fraction such as ".5" only counts at the start of the text or after
// whitespace, so the dot in "Rs.5" stays punctuation.
static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?|(?:^|\s)\.\d+").expect("valid number pattern"));

/// Parses a salary written as a plain number (`"1,50,000"`) or with an Indian
/// unit suffix (`"2.5 lakh"`, `"1 cr"`) into absolute currency units.
///
/// Returns `None` when no number can be found.
pub fn normalize_salary(raw: Option<&str>) -> Option<f64> {
    let text = raw?.replace(',', "");
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(value) = text.parse::<f64>() {
        if value.is_finite() {
            return Some(value);
        }
    }

    let number: f64 = NUMBER_PATTERN.find(text)?.as_str().trim().parse().ok()?;
    Some(number * unit_multiplier(&text.to_lowercase()))
}

fn unit_multiplier(lowered: &str) -> f64 {
    if lowered.contains("lac") || lowered.contains("lakh") {
        LAKH
    } else if lowered.contains("cr") {
        CRORE
    } else {
        1.0
    }
}
