use std::collections::HashSet;
use std::ops::AddAssign;
use std::path::Path;

use tracing::{debug, warn};

use crate::aideon::leads::model::{
    CanonicalField, CanonicalRecord, PhoneNumber, RawBatch, RawRecord,
};
use crate::aideon::leads::normalize::{
    PhoneNormalizer, normalize_age, normalize_email, normalize_salary, normalize_text,
};
use crate::aideon::leads::resolve::{ColumnMapping, ColumnResolver};

/// Lead source stamped on imported records unless configured otherwise.
pub const DEFAULT_LEAD_SOURCE: &str = "Manual Excel Import";
/// User type stamped on imported records.
pub const DEFAULT_USER_TYPE: &str = "1";
/// Category stamped on imported records.
pub const DEFAULT_CATEGORY_NAME: &str = "Finance";

/// How the lead source of a record is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadSourcePolicy {
    /// Every record gets the same label.
    Fixed(String),
    /// The label is the originating file's name without its extension.
    FileStem,
}

impl LeadSourcePolicy {
    /// Lead source for records read from `source`.
    pub fn lead_source_for(&self, source: &Path) -> String {
        match self {
            LeadSourcePolicy::Fixed(label) => label.clone(),
            LeadSourcePolicy::FileStem => source
                .file_stem()
                .map(|stem| stem.to_string_lossy().trim().to_string())
                .filter(|stem| !stem.is_empty())
                .unwrap_or_else(|| DEFAULT_LEAD_SOURCE.to_string()),
        }
    }
}

impl Default for LeadSourcePolicy {
    fn default() -> Self {
        LeadSourcePolicy::Fixed(DEFAULT_LEAD_SOURCE.to_string())
    }
}

/// Values stamped onto every cleaned record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPolicy {
    pub lead_source: LeadSourcePolicy,
    pub user_type: String,
    pub category_name: String,
}

impl Default for CleanPolicy {
    fn default() -> Self {
        Self {
            lead_source: LeadSourcePolicy::default(),
            user_type: DEFAULT_USER_TYPE.to_string(),
            category_name: DEFAULT_CATEGORY_NAME.to_string(),
        }
    }
}

/// Row counters for one or more cleaned batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub rows_read: usize,
    pub rows_without_phone: usize,
    pub duplicates_removed: usize,
    pub cleaned: usize,
}

impl AddAssign for CleanStats {
    fn add_assign(&mut self, other: Self) {
        self.rows_read += other.rows_read;
        self.rows_without_phone += other.rows_without_phone;
        self.duplicates_removed += other.duplicates_removed;
        self.cleaned += other.cleaned;
    }
}

/// Cleaned records in input order, plus what happened to the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedBatch {
    pub records: Vec<CanonicalRecord>,
    pub stats: CleanStats,
}

/// Turns raw rows into canonical records.
///
/// Columns are resolved once per batch; every row is then normalised
/// field by field. Rows without a usable phone number are dropped, exact
/// duplicates within the batch are dropped, and the policy values are
/// stamped on what remains.
#[derive(Debug, Clone)]
pub struct RecordCleaner {
    resolver: ColumnResolver,
    phones: PhoneNormalizer,
    policy: CleanPolicy,
}

impl RecordCleaner {
    pub fn new(resolver: ColumnResolver, policy: CleanPolicy) -> Self {
        Self {
            resolver,
            phones: PhoneNormalizer::default(),
            policy,
        }
    }

    /// Replaces the default phone rules.
    pub fn with_phone_normalizer(mut self, phones: PhoneNormalizer) -> Self {
        self.phones = phones;
        self
    }

    pub fn resolver(&self) -> &ColumnResolver {
        &self.resolver
    }

    pub fn policy(&self) -> &CleanPolicy {
        &self.policy
    }

    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> ColumnMapping {
        self.resolver.resolve(headers)
    }

    /// Resolves the batch's headers and cleans its rows.
    pub fn clean(&self, batch: &RawBatch, source: &Path) -> CleanedBatch {
        let mapping = self.resolve(&batch.headers);
        let lead_source = self.policy.lead_source.lead_source_for(source);
        self.clean_rows(&mapping, &batch.rows, &lead_source)
    }

    /// Cleans rows against an already resolved mapping.
    pub fn clean_rows(
        &self,
        mapping: &ColumnMapping,
        rows: &[RawRecord],
        lead_source: &str,
    ) -> CleanedBatch {
        let mut stats = CleanStats {
            rows_read: rows.len(),
            ..CleanStats::default()
        };

        if !mapping.has_phone() {
            warn!(rows = rows.len(), "no phone column resolved, batch yields no records");
            stats.rows_without_phone = rows.len();
            return CleanedBatch {
                records: Vec::new(),
                stats,
            };
        }

        let mut seen: HashSet<RecordIdentity> = HashSet::with_capacity(rows.len());
        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            let Some(record) = self.clean_row(mapping, row, lead_source) else {
                debug!(line = row.line, "dropped row without a valid phone number");
                stats.rows_without_phone += 1;
                continue;
            };

            if seen.insert(RecordIdentity::of(&record)) {
                records.push(record);
            } else {
                stats.duplicates_removed += 1;
            }
        }

        stats.cleaned = records.len();
        CleanedBatch { records, stats }
    }

    fn clean_row(
        &self,
        mapping: &ColumnMapping,
        row: &RawRecord,
        lead_source: &str,
    ) -> Option<CanonicalRecord> {
        let phone = self.phone_for(mapping, row)?;
        let value = |field| mapping.value(field, row);

        Some(CanonicalRecord {
            email: normalize_email(value(CanonicalField::Email)),
            name: normalize_text(value(CanonicalField::Name)),
            age: normalize_age(value(CanonicalField::Age)),
            city: normalize_text(value(CanonicalField::City)),
            phone,
            bio: normalize_text(value(CanonicalField::Bio)),
            referral_code: normalize_text(value(CanonicalField::ReferralCode)),
            lead_source: lead_source.to_string(),
            user_type: self.policy.user_type.clone(),
            category_name: self.policy.category_name.clone(),
            salary: normalize_salary(value(CanonicalField::Salary)),
        })
    }

    fn phone_for(&self, mapping: &ColumnMapping, row: &RawRecord) -> Option<PhoneNumber> {
        self.phones
            .normalize(mapping.value(CanonicalField::Phone, row))
            .or_else(|| {
                self.phones
                    .normalize(mapping.value(CanonicalField::AlternatePhone, row))
            })
    }
}

/// Hashable view of a record used for exact-duplicate detection.
#[derive(PartialEq, Eq, Hash)]
struct RecordIdentity {
    phone: PhoneNumber,
    text: [Option<String>; 5],
    age: Option<u32>,
    salary_bits: Option<u64>,
    stamps: [String; 3],
}

impl RecordIdentity {
    fn of(record: &CanonicalRecord) -> Self {
        Self {
            phone: record.phone.clone(),
            text: [
                record.email.clone(),
                record.name.clone(),
                record.city.clone(),
                record.bio.clone(),
                record.referral_code.clone(),
            ],
            age: record.age,
            salary_bits: record.salary.map(f64::to_bits),
            stamps: [
                record.lead_source.clone(),
                record.user_type.clone(),
                record.category_name.clone(),
            ],
        }
    }
}
