use once_cell::sync::Lazy;

use crate::aideon::leads::model::PhoneNumber;

/// Digits in a national subscriber number.
pub const NATIONAL_DIGITS: usize = 10;

/// Country code stamped on every number the default rules accept.
pub const DEFAULT_COUNTRY_CODE: &str = "+91";

static DEFAULT_NORMALIZER: Lazy<PhoneNormalizer> = Lazy::new(PhoneNormalizer::india);

/// Shape a cleaned phone string must have for a rule to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneShape {
    /// The cleaned text starts with `prefix` and continues with exactly the
    /// national digits. The prefix is stripped.
    Prefixed(String),
    /// After dropping every `+`, only the national digits remain.
    Bare,
}

/// One entry of the ordered rule list: a shape and the country code assigned
/// when it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneRule {
    pub shape: PhoneShape,
    pub country_code: String,
}

impl PhoneRule {
    pub fn prefixed(prefix: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            shape: PhoneShape::Prefixed(prefix.into()),
            country_code: country_code.into(),
        }
    }

    pub fn bare(country_code: impl Into<String>) -> Self {
        Self {
            shape: PhoneShape::Bare,
            country_code: country_code.into(),
        }
    }

    fn apply(&self, cleaned: &str, national_digits: usize) -> Option<PhoneNumber> {
        let national = match &self.shape {
            PhoneShape::Prefixed(prefix) => {
                let rest = cleaned.strip_prefix(prefix.as_str())?;
                if rest.len() != national_digits || !rest.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                rest.to_string()
            }
            PhoneShape::Bare => {
                let digits: String = cleaned.chars().filter(char::is_ascii_digit).collect();
                if digits.len() != national_digits {
                    return None;
                }
                digits
            }
        };
        Some(PhoneNumber::new(national, self.country_code.clone()))
    }
}

/// Extracts a national number and country code from free-form phone text by
/// trying an ordered list of [`PhoneRule`]s. The first matching rule wins.
#[derive(Debug, Clone)]
pub struct PhoneNormalizer {
    rules: Vec<PhoneRule>,
    national_digits: usize,
}

impl PhoneNormalizer {
    pub fn new(rules: Vec<PhoneRule>) -> Self {
        Self {
            rules,
            national_digits: NATIONAL_DIGITS,
        }
    }

    /// Rules for Indian mobile numbers, in priority order:
    /// `+91XXXXXXXXXX`, `91XXXXXXXXXX`, `0XXXXXXXXXX`, then a bare
    /// ten-digit number.
    pub fn india() -> Self {
        Self::new(vec![
            PhoneRule::prefixed("+91", DEFAULT_COUNTRY_CODE),
            PhoneRule::prefixed("91", DEFAULT_COUNTRY_CODE),
            PhoneRule::prefixed("0", DEFAULT_COUNTRY_CODE),
            PhoneRule::bare(DEFAULT_COUNTRY_CODE),
        ])
    }

    pub fn rules(&self) -> &[PhoneRule] {
        &self.rules
    }

    /// Returns `None` when the input is absent or matches no rule.
    pub fn normalize(&self, raw: Option<&str>) -> Option<PhoneNumber> {
        let cleaned = clean_phone_text(raw?);
        if cleaned.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find_map(|rule| rule.apply(&cleaned, self.national_digits))
    }
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::india()
    }
}

/// Normalises `raw` with the default rule set.
pub fn normalize_phone(raw: Option<&str>) -> Option<PhoneNumber> {
    DEFAULT_NORMALIZER.normalize(raw)
}

/// Keeps only digits and `+`.
fn clean_phone_text(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '+')
        .collect()
}
