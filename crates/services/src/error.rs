//! Shared error types for the services crate.

use std::io;

use thiserror::Error;

use quiz_core::model::ScoreEntryError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the quiz session engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session has no questions")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error("choice {choice} is outside the {options} available options")]
    InvalidChoice { choice: usize, options: usize },
    #[error("no missed questions to redo")]
    NoMistakes,
}

/// Errors emitted by `ScoreLedgerService`.
///
/// `Persist` means durable storage failed; the in-memory ledger already holds
/// the change. `Load` and `SkippedEntries` describe a history that could not be
/// read back in full.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LedgerError {
    #[error(transparent)]
    Score(#[from] ScoreEntryError),
    #[error("session too long to record: {len} questions")]
    TooManyQuestions { len: usize },
    #[error("could not read score history: {0}")]
    Load(#[source] StorageError),
    #[error("{skipped} stored score entries could not be read")]
    SkippedEntries { skipped: usize },
    #[error("could not persist score history: {0}")]
    Persist(#[from] StorageError),
}

/// Errors emitted by `LinkService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LinkError {
    #[error("could not open {url}: {source}")]
    Open {
        url: String,
        #[source]
        source: io::Error,
    },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
