use std::fs;
use std::path::Path;

use crate::aideon::leads::error::Result;
use crate::aideon::leads::model::CanonicalRecord;

/// Writes cleaned records as a pretty-printed JSON array keyed by the target
/// table's column names.
pub fn write_records(path: &Path, records: &[CanonicalRecord]) -> Result<()> {
    let json_string = serde_json::to_string_pretty(records)?;
    fs::write(path, json_string)?;
    Ok(())
}

