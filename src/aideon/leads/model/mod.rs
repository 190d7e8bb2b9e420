use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical attributes that can be sourced from an input column.
///
/// Country code, lead source, user type and category are never read from the
/// input; they are derived or stamped by the cleaner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    Name,
    Email,
    Phone,
    Age,
    City,
    Bio,
    ReferralCode,
    /// Only recognised by the extended field profile.
    Salary,
    /// Only recognised by the extended field profile. Used when the primary
    /// phone column holds nothing usable.
    AlternatePhone,
}

impl CanonicalField {
    /// Every field, in the order the resolver reports them.
    pub const ALL: [CanonicalField; 9] = [
        CanonicalField::Name,
        CanonicalField::Email,
        CanonicalField::Phone,
        CanonicalField::Age,
        CanonicalField::City,
        CanonicalField::Bio,
        CanonicalField::ReferralCode,
        CanonicalField::Salary,
        CanonicalField::AlternatePhone,
    ];

    /// Name used in alias files and log output.
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::Name => "name",
            CanonicalField::Email => "email",
            CanonicalField::Phone => "phone",
            CanonicalField::Age => "age",
            CanonicalField::City => "city",
            CanonicalField::Bio => "bio",
            CanonicalField::ReferralCode => "referralCode",
            CanonicalField::Salary => "salary",
            CanonicalField::AlternatePhone => "alternatePhone",
        }
    }
}

impl FromStr for CanonicalField {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        CanonicalField::ALL
            .into_iter()
            .find(|field| field.as_str() == name)
            .ok_or_else(|| name.to_string())
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input row. Cells are aligned with the header row of the batch the
/// record belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line (or worksheet row) the record was read from.
    pub line: u64,
    pub cells: Vec<String>,
}

impl RawRecord {
    pub fn new(line: u64, cells: Vec<String>) -> Self {
        Self { line, cells }
    }

    /// Returns the cell at `index`, or `None` when the row is shorter.
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }
}

/// A header row plus the rows read beneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBatch {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl RawBatch {
    pub fn new(headers: Vec<String>, rows: Vec<RawRecord>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A national phone number together with its country calling code. The two
/// are only ever produced together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber {
    #[serde(rename = "phone")]
    pub national: String,
    #[serde(rename = "countryCode")]
    pub country_code: String,
}

impl PhoneNumber {
    pub fn new(national: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            national: national.into(),
            country_code: country_code.into(),
        }
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.country_code, self.national)
    }
}

/// A cleaned contact ready to be loaded. Serialised field names match the
/// target table's column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub email: Option<String>,
    pub name: Option<String>,
    pub age: Option<u32>,
    pub city: Option<String>,
    #[serde(flatten)]
    pub phone: PhoneNumber,
    pub bio: Option<String>,
    #[serde(rename = "referralCode")]
    pub referral_code: Option<String>,
    #[serde(rename = "LeadSource")]
    pub lead_source: String,
    #[serde(rename = "type")]
    pub user_type: String,
    #[serde(rename = "categoryName")]
    pub category_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
}

impl CanonicalRecord {
    /// Key the target table deduplicates on.
    pub fn conflict_key(&self) -> (&str, &str) {
        (&self.phone.national, &self.phone.country_code)
    }
}
