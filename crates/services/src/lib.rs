#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod exam;
pub mod ledger;
pub mod links;
pub mod sessions;
pub mod settings;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, LedgerError, LinkError, SessionError};
pub use exam::{EXAM_SIZE, compose_exam, compose_exam_with, exam_source};
pub use ledger::ScoreLedgerService;
pub use links::{LinkOpener, LinkService};
pub use sessions::{
    AnswerOutcome, QuizSession, RestartTarget, SessionProgress, SessionResult, SessionSource,
    SessionStatus,
};
pub use settings::SettingsStore;
