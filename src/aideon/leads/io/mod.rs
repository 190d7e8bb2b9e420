//! Adapters that turn files on disk into [`RawBatch`]es and cleaned records
//! back into files.

pub mod csv_read;
pub mod discover;
pub mod excel_read;
pub mod json_write;

use std::path::Path;

use encoding_rs::{Encoding, UTF_8};

use crate::aideon::leads::error::{IngestError, Result};
use crate::aideon::leads::model::RawBatch;

/// What to do with a row that cannot be aligned with the header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BadRowPolicy {
    /// Drop the row silently.
    Skip,
    /// Drop the row and log a warning.
    #[default]
    Warn,
    /// Fail the whole file.
    Error,
}

/// Options shared by every source reader.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// Encoding assumed for CSV input when no byte order mark is present.
    pub encoding: &'static Encoding,
    pub bad_rows: BadRowPolicy,
}

impl ReadOptions {
    /// Builds options from a WHATWG encoding label such as `utf-8`,
    /// `windows-1252` or `utf-16le`.
    pub fn with_encoding_label(label: &str, bad_rows: BadRowPolicy) -> Result<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| IngestError::UnknownEncoding(label.to_string()))?;
        Ok(Self { encoding, bad_rows })
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            encoding: UTF_8,
            bad_rows: BadRowPolicy::default(),
        }
    }
}

/// Input file families the importer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    /// Infers the format from the file extension, case-insensitively.
    pub fn detect(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(SourceFormat::Spreadsheet),
            _ => None,
        }
    }
}

/// Reads a whole source file into a header row plus data rows.
pub fn read_source(path: &Path, options: &ReadOptions) -> Result<RawBatch> {
    if !path.exists() {
        return Err(IngestError::MissingInput(path.to_path_buf()));
    }
    match SourceFormat::detect(path) {
        Some(SourceFormat::Csv) => csv_read::read_csv(path, options),
        Some(SourceFormat::Spreadsheet) => excel_read::read_first_sheet(path),
        None => Err(IngestError::UnsupportedFormat(path.to_path_buf())),
    }
}
