use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::{RecordIter, Snapshot};
use crate::errors::{ExError, ExErrorKind, SnapDeltaError};
use crate::model::Record;

/// Snapshot stored as a JSON-lines file (one JSON object per line)
///
/// The file is reopened on every pass and streamed line by line, so memory
/// use stays flat regardless of file size. Blank lines are skipped and do
/// not count towards record indexes.
#[derive(Debug, Clone)]
pub struct JsonLinesSnapshot {
    path: PathBuf,
}

impl JsonLinesSnapshot {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, message: String) -> ExError {
        ExError::new(ExErrorKind::SourceUnavailable)
            .with_op("read_jsonl")
            .with_entity_id(self.path.display().to_string())
            .with_message(message)
    }
}

impl Snapshot for JsonLinesSnapshot {
    fn records(&self) -> Result<RecordIter<'_>, ExError> {
        let file = File::open(&self.path)
            .map_err(|e| self.unavailable(format!("cannot open snapshot file: {}", e)))?;

        let lines = BufReader::new(file)
            .lines()
            .filter(|line| !matches!(line, Ok(text) if text.trim().is_empty()));

        let iter = lines.zip(0u64..).map(move |(line, index)| {
            let text = line.map_err(|e| {
                self.unavailable(format!("read failed: {}", e))
                    .with_record_index(index)
            })?;
            serde_json::from_str::<Record>(&text).map_err(|e| {
                ExError::from(SnapDeltaError::UndecodableRecord {
                    index,
                    reason: e.to_string(),
                })
                .with_op("read_jsonl")
                .with_entity_id(self.path.display().to_string())
            })
        });

        Ok(Box::new(iter))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
