//! JSONL loading for the in-memory source.
//!
//! Each non-blank line of the file is one [`ApplicationRecord`]. Records are
//! registered in file order, so a later record for the same id overwrites the
//! name and details set by an earlier one.

use super::InMemorySource;
use crate::domain::{ApplicationId, ApplicationRecord};
use crate::error::Result;
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, AsyncWriteExt, BufReader};

/// Warnings that can occur during JSONL file loading.
///
/// These are non-fatal: the offending line or relation is skipped and
/// loading continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Line that couldn't be parsed as an application record
    ///
    /// **Effect**: Line is skipped entirely.
    MalformedJson {
        /// 1-based line number in the file
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// Record missing its application id or name
    ///
    /// **Effect**: Record is skipped, including its relations.
    InvalidRecord {
        /// 1-based line number in the file
        line_number: usize,
    },

    /// Record had relations without an id or name, or pointing at itself
    ///
    /// **Effect**: Those relations are skipped; the record and its other
    /// relations are loaded.
    SkippedRelations {
        /// Application the record describes
        application_id: ApplicationId,
        /// 1-based line number in the file
        line_number: usize,
        /// Number of relations skipped
        count: usize,
    },
}

/// Load a source from a JSONL file of application records.
///
/// # Returns
///
/// Returns the populated source and every non-fatal issue encountered.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be opened or read.
pub async fn load_from_jsonl(path: &Path) -> Result<(InMemorySource, Vec<LoadWarning>)> {
    let file = File::open(path).await?;
    let mut reader = BufReader::new(file);

    let source = InMemorySource::new();
    let mut warnings = Vec::new();
    let mut inner = source.inner.lock().await;
    let mut line_number = 0;
    let mut buf = Vec::new();

    // Raw bytes: a line that is not valid UTF-8 is one malformed record,
    // not an unreadable file.
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        line_number += 1;
        let trimmed = buf.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }

        let record: ApplicationRecord = match serde_json::from_slice(trimmed) {
            Ok(record) => record,
            Err(e) => {
                warnings.push(LoadWarning::MalformedJson {
                    line_number,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let application_id = record.application_id.clone();
        let outcome = inner.register(record);
        if !outcome.accepted {
            warnings.push(LoadWarning::InvalidRecord { line_number });
            continue;
        }
        if outcome.relations_skipped > 0 {
            warnings.push(LoadWarning::SkippedRelations {
                application_id,
                line_number,
                count: outcome.relations_skipped,
            });
        }
    }

    tracing::debug!(
        path = %path.display(),
        applications = inner.applications.len(),
        relations = inner.graph.edge_count(),
        warnings = warnings.len(),
        "Loaded application records"
    );
    drop(inner);

    Ok((source, warnings))
}

/// Append one record to a JSONL file, creating the file if needed.
///
/// A file whose last line lacks its newline gets one first, so the new
/// record always starts on a line of its own.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be opened or written, and
/// `Error::Json` if the record cannot be serialized.
pub async fn append_record(path: &Path, record: &ApplicationRecord) -> Result<()> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');

    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .await?;
    if file.metadata().await?.len() > 0 {
        file.seek(SeekFrom::End(-1)).await?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last).await?;
        if last[0] != b'\n' {
            line.insert(0, b'\n');
        }
    }
    file.write_all(&line).await?;
    file.flush().await?;

    tracing::debug!(path = %path.display(), app_id = %record.application_id, "Appended record");
    Ok(())
}
