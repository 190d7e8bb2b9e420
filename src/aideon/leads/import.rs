use std::path::{Path, PathBuf};

use tracing::{error, info, instrument, warn};

use crate::aideon::leads::clean::{CleanStats, RecordCleaner};
use crate::aideon::leads::error::{IngestError, Result};
use crate::aideon::leads::io::discover::discover_sources;
use crate::aideon::leads::io::json_write::write_records;
use crate::aideon::leads::io::{ReadOptions, read_source};
use crate::aideon::leads::model::CanonicalRecord;
use crate::aideon::leads::store::RecordSink;

/// Rows cleaned and loaded per database round trip.
pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

/// Knobs for reading and chunking source files.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub read: ReadOptions,
    /// Rows per clean-and-load round trip. Each file is still read into
    /// memory whole before it is split.
    pub chunk_size: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            read: ReadOptions::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// How a single file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Every batch of the file went through the sink.
    Loaded,
    /// No header resolved to the phone field; nothing was loaded.
    MissingPhoneColumn,
    /// The file could not be read; the message says why.
    Failed(String),
}

/// Counters for one imported file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub path: PathBuf,
    pub outcome: FileOutcome,
    pub batches: usize,
    pub stats: CleanStats,
    pub inserted: u64,
}

impl FileSummary {
    fn new(path: &Path, outcome: FileOutcome) -> Self {
        Self {
            path: path.to_path_buf(),
            outcome,
            batches: 0,
            stats: CleanStats::default(),
            inserted: 0,
        }
    }
}

/// Counters for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub files: Vec<FileSummary>,
}

impl ImportSummary {
    pub fn stats(&self) -> CleanStats {
        let mut total = CleanStats::default();
        for file in &self.files {
            total += file.stats;
        }
        total
    }

    pub fn inserted(&self) -> u64 {
        self.files.iter().map(|file| file.inserted).sum()
    }

    pub fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|file| predicate(&file.outcome)).count()
    }
}

/// Imports every supported file directly inside `dir`, in file-name order.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub async fn import_directory<S>(
    dir: &Path,
    cleaner: &RecordCleaner,
    options: &ImportOptions,
    sink: &mut S,
) -> Result<ImportSummary>
where
    S: RecordSink + ?Sized,
{
    let sources = discover_sources(dir)?;
    info!(file_count = sources.len(), "discovered source files");
    import_sources(&sources, cleaner, options, sink).await
}

/// Imports `sources` one after the other.
///
/// A file that cannot be read or has no phone column is recorded in the
/// summary and the run moves on. Database errors abort the run.
pub async fn import_sources<S>(
    sources: &[PathBuf],
    cleaner: &RecordCleaner,
    options: &ImportOptions,
    sink: &mut S,
) -> Result<ImportSummary>
where
    S: RecordSink + ?Sized,
{
    let mut summary = ImportSummary::default();
    for path in sources {
        match import_file(path, cleaner, options, sink).await {
            Ok(file) => summary.files.push(file),
            Err(err @ IngestError::Database(_)) => return Err(err),
            Err(err) => {
                error!(path = %path.display(), error = %err, "skipping unreadable file");
                summary
                    .files
                    .push(FileSummary::new(path, FileOutcome::Failed(err.to_string())));
            }
        }
    }
    Ok(summary)
}

/// Reads, cleans and loads one file in chunks of `options.chunk_size` rows.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn import_file<S>(
    path: &Path,
    cleaner: &RecordCleaner,
    options: &ImportOptions,
    sink: &mut S,
) -> Result<FileSummary>
where
    S: RecordSink + ?Sized,
{
    let batch = read_source(path, &options.read)?;
    info!(rows = batch.len(), "read source file");

    let mapping = cleaner.resolve(&batch.headers);
    if !mapping.has_phone() {
        warn!(headers = ?batch.headers, "no phone column found, skipping file");
        let mut summary = FileSummary::new(path, FileOutcome::MissingPhoneColumn);
        summary.stats.rows_read = batch.len();
        summary.stats.rows_without_phone = batch.len();
        return Ok(summary);
    }

    let lead_source = cleaner.policy().lead_source.lead_source_for(path);
    let mut summary = FileSummary::new(path, FileOutcome::Loaded);

    for (index, rows) in batch.rows.chunks(options.chunk_size.max(1)).enumerate() {
        let cleaned = cleaner.clean_rows(&mapping, rows, &lead_source);
        summary.stats += cleaned.stats;
        summary.batches += 1;

        if cleaned.records.is_empty() {
            info!(batch = index + 1, rows_read = rows.len(), "batch has no usable rows");
            continue;
        }

        let inserted = sink.load(&cleaned.records).await?;
        summary.inserted += inserted;
        info!(
            batch = index + 1,
            rows_read = cleaned.stats.rows_read,
            rows_cleaned = cleaned.stats.cleaned,
            rows_inserted = inserted,
            "loaded batch"
        );
    }

    info!(
        rows_read = summary.stats.rows_read,
        rows_cleaned = summary.stats.cleaned,
        rows_inserted = summary.inserted,
        "finished file"
    );
    Ok(summary)
}

/// Cleans one file without loading it. The whole file is treated as a single
/// batch.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn clean_file(
    path: &Path,
    cleaner: &RecordCleaner,
    options: &ImportOptions,
) -> Result<(Vec<CanonicalRecord>, CleanStats)> {
    let batch = read_source(path, &options.read)?;
    let mapping = cleaner.resolve(&batch.headers);
    if !mapping.has_phone() {
        return Err(IngestError::MissingPhoneColumn(path.to_path_buf()));
    }

    let lead_source = cleaner.policy().lead_source.lead_source_for(path);
    let cleaned = cleaner.clean_rows(&mapping, &batch.rows, &lead_source);
    info!(
        rows_read = cleaned.stats.rows_read,
        rows_cleaned = cleaned.stats.cleaned,
        "cleaned source file"
    );
    Ok((cleaned.records, cleaned.stats))
}

/// Cleans `input` and writes the records to `output` as JSON.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn clean_file_to_json(
    input: &Path,
    output: &Path,
    cleaner: &RecordCleaner,
    options: &ImportOptions,
) -> Result<CleanStats> {
    let (records, stats) = clean_file(input, cleaner, options)?;
    write_records(output, &records)?;
    Ok(stats)
}
