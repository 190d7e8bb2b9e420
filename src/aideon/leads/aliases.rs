use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::aideon::leads::error::{IngestError, Result};
use crate::aideon::leads::model::CanonicalField;

/// Which optional canonical fields the importer recognises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldProfile {
    /// Contact fields only.
    #[default]
    Standard,
    /// Contact fields plus salary and an alternate phone column.
    Extended,
}

const NAME: &[&str] = &[
    "name",
    "full name",
    "customer name",
    "client name",
    "username",
];
const EMAIL: &[&str] = &["email", "email id", "email address", "mail"];
const PHONE: &[&str] = &[
    "phone",
    "phone number",
    "mobile",
    "mobile number",
    "contact",
    "contact number",
    "whatsapp",
    "whatsapp number",
];
const AGE: &[&str] = &["age", "years", "age (years)"];
const CITY: &[&str] = &["city", "location", "town"];
const BIO: &[&str] = &["bio", "about", "description"];
const REFERRAL_CODE: &[&str] = &["referral", "referral code", "ref code"];
const SALARY: &[&str] = &[
    "salary",
    "annual salary",
    "monthly salary",
    "ctc",
    "income",
    "package",
];
const ALTERNATE_PHONE: &[&str] = &[
    "alternate phone",
    "alternate number",
    "alternate mobile",
    "alt phone",
    "secondary phone",
    "other phone",
];

/// Recognised header spellings for each canonical field.
///
/// The table is an immutable value: it is built once at start-up and handed
/// to the [`ColumnResolver`](crate::aideon::leads::resolve::ColumnResolver).
/// Alias order matters, the first alias present in a file wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<CanonicalField, Vec<String>>,
}

impl AliasTable {
    /// Builds a table from explicit entries. A later entry for the same field
    /// replaces an earlier one.
    pub fn new<I, A>(entries: I) -> Self
    where
        I: IntoIterator<Item = (CanonicalField, A)>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(field, aliases)| (field, aliases.into_iter().map(Into::into).collect()))
            .collect();
        Self { entries }
    }

    /// Spellings observed across the contact exports seen so far.
    pub fn standard() -> Self {
        Self::new([
            (CanonicalField::Name, NAME),
            (CanonicalField::Email, EMAIL),
            (CanonicalField::Phone, PHONE),
            (CanonicalField::Age, AGE),
            (CanonicalField::City, CITY),
            (CanonicalField::Bio, BIO),
            (CanonicalField::ReferralCode, REFERRAL_CODE),
        ]
        .map(|(field, aliases)| (field, aliases.iter().copied())))
    }

    /// The standard table plus salary and alternate phone spellings.
    pub fn extended() -> Self {
        let mut table = Self::standard();
        table
            .entries
            .insert(CanonicalField::Salary, owned_aliases(SALARY));
        table
            .entries
            .insert(CanonicalField::AlternatePhone, owned_aliases(ALTERNATE_PHONE));
        table
    }

    pub fn for_profile(profile: FieldProfile) -> Self {
        match profile {
            FieldProfile::Standard => Self::standard(),
            FieldProfile::Extended => Self::extended(),
        }
    }

    /// Parses a JSON object of `field -> [alias, ...]`.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(source)
            .map_err(|err| IngestError::InvalidAliasTable(err.to_string()))?;

        let mut entries = BTreeMap::new();
        for (name, aliases) in raw {
            let field: CanonicalField = name.parse().map_err(|_| {
                IngestError::InvalidAliasTable(format!("unknown field '{name}'"))
            })?;
            if aliases.is_empty() {
                return Err(IngestError::InvalidAliasTable(format!(
                    "field '{field}' has no aliases"
                )));
            }
            if aliases.iter().any(|alias| alias.trim().is_empty()) {
                return Err(IngestError::InvalidAliasTable(format!(
                    "field '{field}' has a blank alias"
                )));
            }
            entries.insert(field, aliases);
        }

        Ok(Self { entries })
    }

    /// Reads an alias override file from disk.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(IngestError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    /// Replaces the spellings of every field named in `overrides`.
    pub fn with_overrides(mut self, overrides: AliasTable) -> Self {
        self.entries.extend(overrides.entries);
        self
    }

    /// Aliases for `field` in declaration order. Empty when the field is not
    /// recognised.
    pub fn aliases(&self, field: CanonicalField) -> &[String] {
        self.entries.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn recognises(&self, field: CanonicalField) -> bool {
        !self.aliases(field).is_empty()
    }

    /// Fields that have at least one alias.
    pub fn fields(&self) -> impl Iterator<Item = CanonicalField> + '_ {
        self.entries
            .iter()
            .filter(|(_, aliases)| !aliases.is_empty())
            .map(|(field, _)| *field)
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn owned_aliases(aliases: &[&str]) -> Vec<String> {
    aliases.iter().map(|alias| alias.to_string()).collect()
}
