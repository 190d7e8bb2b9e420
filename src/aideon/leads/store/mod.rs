//! Destinations for cleaned records.
//!
//! Every sink applies the same rule: a record whose (phone, country code)
//! already exists is discarded without error, so the first loaded record for
//! a key wins permanently and reloading a batch inserts nothing.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::aideon::leads::error::{IngestError, Result};
use crate::aideon::leads::model::CanonicalRecord;

pub use memory::MemoryStore;
pub use postgres::PostgresLoader;

/// Table loaded when none is configured.
pub const DEFAULT_TABLE: &str = "users";

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern"));

/// Accepts batches of cleaned records.
#[async_trait]
pub trait RecordSink {
    /// Loads `records` and returns how many rows were actually inserted.
    /// An empty slice is a no-op.
    async fn load(&mut self, records: &[CanonicalRecord]) -> Result<u64>;
}

/// Permanent table the loader merges into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTable {
    schema: Option<String>,
    name: String,
    include_salary: bool,
}

impl TargetTable {
    /// Parses `table` or `schema.table`. Each part must be a plain SQL
    /// identifier.
    pub fn parse(qualified: &str) -> Result<Self> {
        let invalid = || IngestError::InvalidTableName(qualified.to_string());
        let mut parts = qualified.trim().split('.');
        let (schema, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), None, None) => (None, name),
            (Some(schema), Some(name), None) => (Some(schema), name),
            _ => return Err(invalid()),
        };

        if !IDENTIFIER.is_match(name) || schema.is_some_and(|schema| !IDENTIFIER.is_match(schema)) {
            return Err(invalid());
        }

        Ok(Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
            include_salary: false,
        })
    }

    /// Also load the `salary` column.
    pub fn with_salary(mut self, include_salary: bool) -> Self {
        self.include_salary = include_salary;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn includes_salary(&self) -> bool {
        self.include_salary
    }

    /// Quoted, optionally schema-qualified table name.
    pub fn quoted(&self) -> String {
        match &self.schema {
            Some(schema) => format!("\"{schema}\".\"{}\"", self.name),
            None => format!("\"{}\"", self.name),
        }
    }

    /// Quoted name of the session-local staging table.
    pub fn quoted_staging(&self) -> String {
        format!("\"{}_staging\"", self.name)
    }

    /// Staging table name qualified with the session's temporary schema.
    pub fn qualified_staging(&self) -> String {
        format!("pg_temp.{}", self.quoted_staging())
    }

    /// Target column names in load order.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec![
            "email",
            "name",
            "age",
            "city",
            "phone",
            "countryCode",
            "bio",
            "referralCode",
            "LeadSource",
            "type",
            "categoryName",
        ];
        if self.include_salary {
            columns.push("salary");
        }
        columns
    }

    /// Comma-separated quoted column list.
    pub fn column_list(&self) -> String {
        self.columns()
            .iter()
            .map(|column| format!("\"{column}\""))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for TargetTable {
    fn default() -> Self {
        Self {
            schema: None,
            name: DEFAULT_TABLE.to_string(),
            include_salary: false,
        }
    }
}
