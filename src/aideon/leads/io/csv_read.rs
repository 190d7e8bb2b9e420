use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use encoding_rs::Encoding;
use tracing::{debug, warn};

use crate::aideon::leads::error::{IngestError, Result};
use crate::aideon::leads::io::{BadRowPolicy, ReadOptions};
use crate::aideon::leads::model::{RawBatch, RawRecord};

/// Reads a CSV file whose first record is the header row.
pub fn read_csv(path: &Path, options: &ReadOptions) -> Result<RawBatch> {
    let bytes = fs::read(path)?;
    let text = decode(&bytes, options.encoding, path);
    parse_csv(&text, path, options.bad_rows)
}

/// Decodes `bytes`, honouring a byte order mark over the configured
/// encoding. Undecodable sequences become U+FFFD.
pub fn decode(bytes: &[u8], encoding: &'static Encoding, path: &Path) -> String {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(
            path = %path.display(),
            encoding = used.name(),
            "input contains byte sequences invalid for the encoding"
        );
    }
    text.into_owned()
}

/// Parses CSV text. Rows shorter than the header are padded with empty
/// cells; longer or unreadable rows are handled per `bad_rows`.
pub fn parse_csv(text: &str, path: &Path, bad_rows: BadRowPolicy) -> Result<RawBatch> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    loop {
        let line = reader.position().line();
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let line = record.position().map(|pos| pos.line()).unwrap_or(line);
                if record.len() > width {
                    let reason = format!("expected {width} fields, found {}", record.len());
                    reject_row(path, line, reason, bad_rows)?;
                    continue;
                }
                let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
                cells.resize(width, String::new());
                rows.push(RawRecord::new(line, cells));
            }
            Err(err) => {
                let line = err
                    .position()
                    .map(|pos| pos.line())
                    .unwrap_or(line);
                reject_row(path, line, err.to_string(), bad_rows)?;
            }
        }
    }

    debug!(path = %path.display(), columns = width, rows = rows.len(), "parsed CSV source");
    Ok(RawBatch::new(headers, rows))
}

fn reject_row(path: &Path, line: u64, reason: String, policy: BadRowPolicy) -> Result<()> {
    match policy {
        BadRowPolicy::Skip => Ok(()),
        BadRowPolicy::Warn => {
            warn!(path = %path.display(), line, %reason, "skipping malformed row");
            Ok(())
        }
        BadRowPolicy::Error => Err(IngestError::MalformedRow {
            path: path.to_path_buf(),
            line,
            reason,
        }),
    }
}
