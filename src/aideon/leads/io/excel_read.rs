use std::path::Path;

use calamine::{DataType, Range, Reader, open_workbook_auto};
use tracing::debug;

use crate::aideon::leads::error::{IngestError, Result};
use crate::aideon::leads::model::{RawBatch, RawRecord};

/// Reads the first worksheet of a workbook. The first row is the header row;
/// rows whose cells are all empty are ignored.
pub fn read_first_sheet(path: &Path) -> Result<RawBatch> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| {
            IngestError::InvalidWorkbook(format!("{} has no worksheets", path.display()))
        })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::InvalidWorkbook(format!("missing sheet '{sheet_name}'")))?
        .map_err(IngestError::from)?;

    let batch = range_to_batch(&range);
    debug!(
        path = %path.display(),
        sheet = %sheet_name,
        columns = batch.headers.len(),
        rows = batch.rows.len(),
        "read worksheet"
    );
    Ok(batch)
}

fn range_to_batch(range: &Range<DataType>) -> RawBatch {
    let first_row = range.start().map(|(row, _)| u64::from(row)).unwrap_or(0);
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell_to_string(Some(cell)))
            .collect(),
        None => return RawBatch::default(),
    };

    let records = rows
        .enumerate()
        .filter_map(|(offset, row)| {
            let cells: Vec<String> = row.iter().map(|cell| cell_to_string(Some(cell))).collect();
            if cells.iter().all(|cell| cell.trim().is_empty()) {
                return None;
            }
            // Header is worksheet row `first_row + 1`, 1-based.
            let line = first_row + offset as u64 + 2;
            Some(RawRecord::new(line, cells))
        })
        .collect();

    RawBatch::new(headers, records)
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
