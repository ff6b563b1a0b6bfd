//! Run-level attachment archive.
//!
//! Byte-for-byte reproducible for the same inputs: entries are written in
//! input order with a fixed timestamp and mode.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::AttachmentError;
use crate::model::RunId;

/// File name of the archive uploaded for a run.
pub fn archive_file_name(run_id: RunId) -> String {
    format!("TestResults_{}.zip", run_id)
}

/// Bundle `files` into a single zip payload.
///
/// Entries are named after each file's base name. Repeated base names get a
/// numeric prefix (`1_name`, `2_name`, ...) so every input is present.
pub fn archive_files(files: &[PathBuf]) -> Result<Vec<u8>, AttachmentError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut used = HashSet::new();

    for path in files {
        let bytes = std::fs::read(path)?;
        let name = unique_entry_name(path, &mut used);
        debug!(entry = %name, bytes = bytes.len(), "adding file to archive");
        zip.start_file(name, options)?;
        zip.write_all(&bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}

fn unique_entry_name(path: &Path, used: &mut HashSet<String>) -> String {
    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());

    let mut candidate = base.clone();
    let mut n = 1;
    while !used.insert(candidate.clone()) {
        candidate = format!("{}_{}", n, base);
        n += 1;
    }
    candidate
}
