use std::sync::Arc;

use quiz_core::model::QuestionBank;
use storage::repository::Storage;

use crate::Clock;
use crate::error::{AppServicesError, LedgerError};
use crate::exam::exam_source;
use crate::ledger::ScoreLedgerService;
use crate::links::{LinkOpener, LinkService};
use crate::sessions::{QuizSession, RestartTarget, SessionSource};
use crate::settings::SettingsStore;

/// Assembles the app-facing services around one question bank.
#[derive(Clone)]
pub struct AppServices {
    bank: Arc<QuestionBank>,
    ledger: Arc<ScoreLedgerService>,
    settings: SettingsStore,
    links: LinkService,
    history_notice: Option<Arc<LedgerError>>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// A score history that cannot be read in full does not fail startup; see
    /// `history_notice`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        bank: QuestionBank,
        opener: Arc<dyn LinkOpener>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, bank, opener, clock).await)
    }

    /// Build services over volatile in-memory storage.
    pub async fn in_memory(bank: QuestionBank, opener: Arc<dyn LinkOpener>, clock: Clock) -> Self {
        Self::with_storage(Storage::in_memory(), bank, opener, clock).await
    }

    pub async fn with_storage(
        storage: Storage,
        bank: QuestionBank,
        opener: Arc<dyn LinkOpener>,
        clock: Clock,
    ) -> Self {
        let (ledger, notice) = ScoreLedgerService::open(clock, Arc::clone(&storage.scores)).await;
        Self {
            bank: Arc::new(bank),
            ledger: Arc::new(ledger),
            settings: SettingsStore::new(),
            links: LinkService::new(opener),
            history_notice: notice.map(Arc::new),
        }
    }

    /// Why the stored score history could not be read in full at startup.
    ///
    /// `None` when it loaded cleanly. The ledger holds whatever was readable.
    #[must_use]
    pub fn history_notice(&self) -> Option<&LedgerError> {
        self.history_notice.as_deref()
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn ledger(&self) -> Arc<ScoreLedgerService> {
        Arc::clone(&self.ledger)
    }

    #[must_use]
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    #[must_use]
    pub fn links(&self) -> &LinkService {
        &self.links
    }

    #[must_use]
    pub fn start_session(&self, source: SessionSource) -> QuizSession {
        QuizSession::start(&self.bank, source)
    }

    /// Start a session over a fresh exam draw.
    #[must_use]
    pub fn start_exam(&self) -> QuizSession {
        self.start_session(exam_source(&self.bank))
    }

    #[must_use]
    pub fn restart_original(&self, source: &SessionSource) -> RestartTarget {
        QuizSession::restart_original(&self.bank, source)
    }
}
