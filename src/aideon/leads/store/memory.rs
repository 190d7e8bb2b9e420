use std::collections::HashSet;

use async_trait::async_trait;

use crate::aideon::leads::error::Result;
use crate::aideon::leads::model::CanonicalRecord;
use crate::aideon::leads::store::RecordSink;

/// In-process sink with the same first-write-wins rule as the database
/// table. Backs dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<CanonicalRecord>,
    keys: HashSet<(String, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert(&mut self, record: &CanonicalRecord) -> bool {
        let (phone, country_code) = record.conflict_key();
        if !self.keys.insert((phone.to_string(), country_code.to_string())) {
            return false;
        }
        self.records.push(record.clone());
        true
    }
}

#[async_trait]
impl RecordSink for MemoryStore {
    async fn load(&mut self, records: &[CanonicalRecord]) -> Result<u64> {
        let mut inserted = 0;
        for record in records {
            if self.insert(record) {
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}
