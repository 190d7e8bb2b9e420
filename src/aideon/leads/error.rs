use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Error type covering the different failure cases that can occur when the
/// importer reads, cleans, or loads contact records.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Wrapper for IO failures such as reading source files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the CSV reader and writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the spreadsheet reader implementation.
    #[error("spreadsheet read error: {0}")]
    SpreadsheetRead(#[from] calamine::Error),

    /// Errors raised by the database client, including connectivity failures
    /// and constraint violations other than the deduplication key.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Raised when a workbook has no usable worksheet or header row.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the configured text encoding label is not recognised.
    #[error("unknown text encoding '{0}'")]
    UnknownEncoding(String),

    /// Raised for a malformed row when the bad-row policy is `error`.
    #[error("malformed row at line {line} in {path}: {reason}")]
    MalformedRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// Raised when a source file has no column that resolves to the phone
    /// field, which makes every row of the file unusable.
    #[error("no phone column found in {0}")]
    MissingPhoneColumn(PathBuf),

    /// Raised when an alias override file is structurally invalid.
    #[error("invalid alias table: {0}")]
    InvalidAliasTable(String),

    /// Raised when a required environment variable is absent.
    #[error("missing configuration value {0}")]
    MissingConfig(&'static str),

    /// Raised when an environment variable holds an unusable value.
    #[error("invalid configuration value '{value}' for {key}")]
    InvalidConfig { key: &'static str, value: String },

    /// Raised when a table name cannot be used as a SQL identifier.
    #[error("invalid table name '{0}'")]
    InvalidTableName(String),

    /// Raised when an input file has an extension the importer cannot read.
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Raised when the user provides a path that does not exist.
    #[error("input not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
