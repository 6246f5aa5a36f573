// Error taxonomy for the import pipeline
//
// Every error here is fatal to the run: the pipeline is fail-fast and never
// retries or recovers internally. The variants are split so an operator can
// tell "fix the spreadsheet" (input format) from "fix the entity registry"
// (unknown entity) from "file a defect" (an entry that failed balancing).

use std::path::PathBuf;

use thiserror::Error;

use crate::journal::JournalEntryError;

pub type Result<T> = std::result::Result<T, ImportError>;

#[derive(Debug, Error)]
pub enum ImportError {
    /// The import-version tag is not in the conversion table.
    #[error("unknown import version: {0}")]
    UnknownVersion(String),

    /// Required columns are absent after header mapping.
    #[error("statement is missing required columns {columns:?} (version {version})")]
    MissingColumns {
        version: String,
        columns: Vec<String>,
    },

    /// A cell could not be parsed (amount, date, or controlled vocabulary).
    #[error("row {row}: could not parse {field} from {value:?}: {reason}")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A statement with zero lines cannot produce a deposit entry.
    #[error("statement contains no lines")]
    EmptyStatement,

    /// A statement line or batch parameter references an entity code that is
    /// not in the reference model.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// A constructed journal entry violated one of the entry invariants.
    #[error("journal entry invalid: {0}")]
    InvalidEntry(#[from] JournalEntryError),

    /// The export directory for this statement reference already exists.
    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
