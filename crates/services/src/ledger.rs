use std::sync::Arc;

use tokio::sync::Mutex;

use quiz_core::model::{ScoreEntry, ScoreLedger, ScoreStats};
use storage::repository::ScoreRepository;

use crate::Clock;
use crate::error::LedgerError;
use crate::sessions::SessionResult;

/// Capped score history backed by a `ScoreRepository`.
///
/// The in-memory ledger is authoritative for the process lifetime. Every
/// mutation updates it first and then writes the whole ledger through; the
/// lock is held across the write so record/clear calls never interleave.
pub struct ScoreLedgerService {
    clock: Clock,
    repo: Arc<dyn ScoreRepository>,
    ledger: Mutex<ScoreLedger>,
}

impl ScoreLedgerService {
    /// An empty ledger that has not read from storage.
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn ScoreRepository>) -> Self {
        Self::with_ledger(clock, repo, ScoreLedger::new())
    }

    fn with_ledger(clock: Clock, repo: Arc<dyn ScoreRepository>, ledger: ScoreLedger) -> Self {
        Self {
            clock,
            repo,
            ledger: Mutex::new(ledger),
        }
    }

    /// Load the stored history.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Load` if the history cannot be read and
    /// `LedgerError::SkippedEntries` if any stored entry is unreadable.
    pub async fn load(clock: Clock, repo: Arc<dyn ScoreRepository>) -> Result<Self, LedgerError> {
        let loaded = repo.load_scores().await.map_err(LedgerError::Load)?;
        if loaded.skipped > 0 {
            return Err(LedgerError::SkippedEntries {
                skipped: loaded.skipped,
            });
        }
        log::debug!("loaded {} score entries", loaded.entries.len());
        Ok(Self::with_ledger(
            clock,
            repo,
            ScoreLedger::from_entries(loaded.entries),
        ))
    }

    /// Load whatever part of the stored history is readable.
    ///
    /// Never fails. The second value reports a history that could not be read
    /// in full, for the front end to show as a notice; the ledger then holds
    /// only the readable entries, or none.
    pub async fn open(
        clock: Clock,
        repo: Arc<dyn ScoreRepository>,
    ) -> (Self, Option<LedgerError>) {
        match repo.load_scores().await {
            Ok(loaded) => {
                let notice = (loaded.skipped > 0).then_some(LedgerError::SkippedEntries {
                    skipped: loaded.skipped,
                });
                let ledger = ScoreLedger::from_entries(loaded.entries);
                (Self::with_ledger(clock, repo, ledger), notice)
            }
            Err(err) => {
                log::warn!("could not read score history, starting empty: {err}");
                (Self::new(clock, repo), Some(LedgerError::Load(err)))
            }
        }
    }

    /// Record a finished session as the newest entry.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Score` for a result that cannot be scored (no
    /// questions) without touching the ledger. Returns `LedgerError::Persist`
    /// if the write fails; the entry stays in the in-memory ledger.
    pub async fn record(&self, result: &SessionResult) -> Result<ScoreEntry, LedgerError> {
        let count = |len: usize| u32::try_from(len).map_err(|_| LedgerError::TooManyQuestions { len });
        let entry = ScoreEntry::new(
            result.title.clone(),
            count(result.correct)?,
            count(result.wrong())?,
            count(result.total)?,
            self.clock.now(),
        )?;

        let mut ledger = self.ledger.lock().await;
        ledger.record(entry.clone());
        self.persist(&ledger).await?;
        Ok(entry)
    }

    /// Drop every entry.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Persist` if the write fails; the in-memory ledger
    /// is cleared regardless.
    pub async fn clear(&self) -> Result<(), LedgerError> {
        let mut ledger = self.ledger.lock().await;
        ledger.clear();
        self.persist(&ledger).await
    }

    /// Current entries, newest first.
    pub async fn entries(&self) -> Vec<ScoreEntry> {
        self.ledger.lock().await.entries().to_vec()
    }

    pub async fn aggregate(&self) -> ScoreStats {
        self.ledger.lock().await.stats()
    }

    async fn persist(&self, ledger: &ScoreLedger) -> Result<(), LedgerError> {
        self.repo.save_scores(ledger.entries()).await.map_err(|err| {
            log::warn!("score history not saved: {err}");
            LedgerError::Persist(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quiz_core::model::{LEDGER_CAPACITY, QuestionDraft};
    use quiz_core::time::fixed_clock;
    use std::sync::atomic::{AtomicBool, Ordering};
    use storage::repository::{LoadedScores, SCORES_KEY, Storage, StorageError};

    use crate::sessions::SessionSource;

    #[derive(Default)]
    struct FlakyRepo {
        fail: AtomicBool,
        saved: std::sync::Mutex<Vec<ScoreEntry>>,
    }

    #[async_trait]
    impl ScoreRepository for FlakyRepo {
        async fn load_scores(&self) -> Result<LoadedScores, StorageError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StorageError::Connection("offline".into()));
            }
            Ok(LoadedScores {
                entries: self.saved.lock().unwrap().clone(),
                skipped: 0,
            })
        }

        async fn save_scores(&self, entries: &[ScoreEntry]) -> Result<(), StorageError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StorageError::Connection("offline".into()));
            }
            *self.saved.lock().unwrap() = entries.to_vec();
            Ok(())
        }
    }

    fn result(title: &str, correct: usize, wrong: usize) -> SessionResult {
        let missed = (0..wrong)
            .map(|i| {
                QuestionDraft::new(format!("m{i}"), ["a", "b"], 1)
                    .validate()
                    .unwrap()
            })
            .collect();
        SessionResult {
            title: title.to_string(),
            correct,
            total: correct + wrong,
            missed,
            source: SessionSource::by_id("test1"),
        }
    }

    #[tokio::test]
    async fn record_builds_entry_from_result() {
        let service = ScoreLedgerService::new(fixed_clock(), Storage::in_memory().scores);
        let entry = service.record(&result("Topic A", 1, 1)).await.unwrap();

        assert_eq!(entry.title(), "Topic A");
        assert_eq!(entry.correct(), 1);
        assert_eq!(entry.wrong(), 1);
        assert_eq!(entry.total(), 2);
        assert_eq!(entry.recorded_at(), fixed_clock().now());
    }

    #[tokio::test]
    async fn record_is_capped_and_newest_first() {
        let service = ScoreLedgerService::new(fixed_clock(), Storage::in_memory().scores);
        for i in 1..=11 {
            service.record(&result(&format!("#{i}"), 1, 0)).await.unwrap();
        }

        let entries = service.entries().await;
        assert_eq!(entries.len(), LEDGER_CAPACITY);
        assert_eq!(entries.first().unwrap().title(), "#11");
        assert_eq!(entries.last().unwrap().title(), "#2");
    }

    #[tokio::test]
    async fn empty_result_is_not_recorded() {
        let service = ScoreLedgerService::new(fixed_clock(), Storage::in_memory().scores);
        let err = service.record(&result("Nada", 0, 0)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Score(_)));
        assert!(service.entries().await.is_empty());
    }

    #[tokio::test]
    async fn failed_write_keeps_in_memory_state() {
        let repo = Arc::new(FlakyRepo::default());
        let service = ScoreLedgerService::new(fixed_clock(), repo.clone());
        service.record(&result("A", 2, 0)).await.unwrap();

        repo.fail.store(true, Ordering::SeqCst);
        let err = service.record(&result("B", 0, 2)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Persist(_)));
        assert_eq!(service.entries().await.len(), 2);
        assert_eq!(repo.saved.lock().unwrap().len(), 1);

        repo.fail.store(false, Ordering::SeqCst);
        service.record(&result("C", 1, 0)).await.unwrap();
        assert_eq!(repo.saved.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn open_tolerates_unreadable_history() {
        let repo = Arc::new(FlakyRepo::default());
        repo.fail.store(true, Ordering::SeqCst);

        let err = ScoreLedgerService::load(fixed_clock(), repo.clone())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, LedgerError::Load(_)));

        let (service, notice) = ScoreLedgerService::open(fixed_clock(), repo).await;
        assert!(matches!(notice, Some(LedgerError::Load(_))));
        assert!(service.entries().await.is_empty());
    }

    #[tokio::test]
    async fn open_keeps_readable_entries_and_reports_the_rest() {
        let storage = Storage::in_memory();
        let raw = r#"[
            {"titulo":"A","aciertos":1,"errores":1,"total":2,"fecha":"2023-11-14T22:13:20Z"},
            {"titulo":"B","aciertos":1,"errores":0,"total":1,"fecha":"ayer"}
        ]"#;
        storage.kv.set(SCORES_KEY, raw).await.unwrap();

        let strict = ScoreLedgerService::load(fixed_clock(), Arc::clone(&storage.scores)).await;
        assert!(matches!(
            strict.err(),
            Some(LedgerError::SkippedEntries { skipped: 1 })
        ));

        let (service, notice) =
            ScoreLedgerService::open(fixed_clock(), Arc::clone(&storage.scores)).await;
        assert!(matches!(
            notice,
            Some(LedgerError::SkippedEntries { skipped: 1 })
        ));
        let entries = service.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title(), "A");
    }

    #[tokio::test]
    async fn open_on_clean_history_has_no_notice() {
        let (_, notice) = ScoreLedgerService::open(fixed_clock(), Storage::in_memory().scores).await;
        assert!(notice.is_none());
    }

    #[tokio::test]
    async fn clear_empties_memory_and_storage() {
        let storage = Storage::in_memory();
        let service = ScoreLedgerService::new(fixed_clock(), Arc::clone(&storage.scores));
        service.record(&result("A", 1, 0)).await.unwrap();
        service.clear().await.unwrap();

        assert!(service.entries().await.is_empty());
        assert!(storage.scores.load_scores().await.unwrap().entries.is_empty());
        assert_eq!(service.aggregate().await.average_percent, 0);
    }
}
