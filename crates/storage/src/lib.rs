#![forbid(unsafe_code)]

pub mod bank;
pub mod repository;
pub mod sqlite;

pub use bank::{BankLoadError, load_bank_dir};
pub use repository::{
    InMemoryStore, KeyValueStore, KvScoreRepository, LoadedScores, SCORES_BACKUP_KEY, SCORES_KEY,
    ScoreRepository, Storage, StorageError,
};
