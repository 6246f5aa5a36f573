// Journal Import - Core Library
// Exposes the statement-to-journal pipeline for use in the CLI and tests

pub mod batch;
pub mod entities;
pub mod error;
pub mod export;
pub mod journal;
pub mod statement;
pub mod vocab;

// Re-export commonly used types
pub use batch::{BatchParams, ImportBatch};
pub use entities::{Entity, EntityRegistry};
pub use error::{ImportError, Result};
pub use export::export_batch;
pub use journal::{JournalEntry, JournalEntryError, JournalLine};
pub use statement::{read_statement, StatementLine, SUPPORTED_INPUT_VERSIONS};
pub use vocab::{
    AccountType, Department, DocumentType, Division, Market,
    INTERCOMPANY_GL_ASSET_ACCOUNT, INTERCOMPANY_GL_LIABILITY_ACCOUNT,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
