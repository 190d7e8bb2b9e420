use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::aideon::leads::error::{IngestError, Result};
use crate::aideon::leads::io::SourceFormat;

/// Lists the importable files directly inside `dir`, sorted by file name.
/// Subdirectories and files with other extensions are ignored.
pub fn discover_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::MissingInput(dir.to_path_buf()));
    }

    let mut sources = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if SourceFormat::detect(&path).is_some() {
            sources.push(path);
        } else {
            debug!(path = %path.display(), "ignoring file with unsupported extension");
        }
    }

    sources.sort_by(|lhs, rhs| lhs.file_name().cmp(&rhs.file_name()));
    Ok(sources)
}
