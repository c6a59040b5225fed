use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreEntryError {
    #[error("score title cannot be empty")]
    EmptyTitle,

    #[error("score total must be > 0")]
    EmptyTotal,

    #[error("correct ({correct}) + wrong ({wrong}) does not match total ({total})")]
    CountMismatch { correct: u32, wrong: u32, total: u32 },
}

//
// ─── SCORE ENTRY ───────────────────────────────────────────────────────────────
//

/// Persisted shape of a score entry. Field names match the stored ledger blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScoreEntryRecord {
    #[serde(rename = "titulo")]
    title: String,
    #[serde(rename = "aciertos")]
    correct: u32,
    #[serde(rename = "errores")]
    wrong: u32,
    total: u32,
    #[serde(rename = "fecha")]
    recorded_at: DateTime<Utc>,
}

/// One persisted record of a completed session's outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScoreEntryRecord", into = "ScoreEntryRecord")]
pub struct ScoreEntry {
    title: String,
    correct: u32,
    wrong: u32,
    total: u32,
    recorded_at: DateTime<Utc>,
}

impl ScoreEntry {
    /// Build a score entry, checking that the counts add up.
    ///
    /// # Errors
    ///
    /// Returns `ScoreEntryError::EmptyTotal` for a zero total (no percentage can be
    /// derived from it) and `ScoreEntryError::CountMismatch` if
    /// `correct + wrong != total`.
    pub fn new(
        title: impl Into<String>,
        correct: u32,
        wrong: u32,
        total: u32,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, ScoreEntryError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ScoreEntryError::EmptyTitle);
        }
        if total == 0 {
            return Err(ScoreEntryError::EmptyTotal);
        }
        if correct.checked_add(wrong) != Some(total) {
            return Err(ScoreEntryError::CountMismatch {
                correct,
                wrong,
                total,
            });
        }

        Ok(Self {
            title,
            correct,
            wrong,
            total,
            recorded_at,
        })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn wrong(&self) -> u32 {
        self.wrong
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Fraction of correct answers in `[0, 1]`.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        f64::from(self.correct) / f64::from(self.total)
    }

    /// Rounded percentage of correct answers.
    #[must_use]
    pub fn percent(&self) -> u32 {
        to_percent(self.ratio())
    }
}

impl TryFrom<ScoreEntryRecord> for ScoreEntry {
    type Error = ScoreEntryError;

    fn try_from(record: ScoreEntryRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.title,
            record.correct,
            record.wrong,
            record.total,
            record.recorded_at,
        )
    }
}

impl From<ScoreEntry> for ScoreEntryRecord {
    fn from(entry: ScoreEntry) -> Self {
        Self {
            title: entry.title,
            correct: entry.correct,
            wrong: entry.wrong,
            total: entry.total,
            recorded_at: entry.recorded_at,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_percent(ratio: f64) -> u32 {
    (ratio * 100.0).round().clamp(0.0, 100.0) as u32
}

//
// ─── LEDGER ────────────────────────────────────────────────────────────────────
//

/// Maximum number of entries kept in the history.
pub const LEDGER_CAPACITY: usize = 10;

/// Newest-first history of completed sessions, capped at `LEDGER_CAPACITY`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    entries: Vec<ScoreEntry>,
}

impl ScoreLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from stored entries (already newest-first).
    ///
    /// Anything past the capacity is dropped.
    #[must_use]
    pub fn from_entries(mut entries: Vec<ScoreEntry>) -> Self {
        entries.truncate(LEDGER_CAPACITY);
        Self { entries }
    }

    /// Prepend an entry, evicting the oldest ones beyond capacity.
    pub fn record(&mut self, entry: ScoreEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(LEDGER_CAPACITY);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> ScoreStats {
        ScoreStats::from_entries(&self.entries)
    }
}

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

/// Mean score for all entries sharing a title.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicScore {
    pub title: String,
    pub mean: f64,
    pub percent: u32,
}

/// Aggregate statistics over the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreStats {
    pub count: usize,
    pub average_percent: u32,
    pub best_topic: Option<TopicScore>,
    pub worst_topic: Option<TopicScore>,
}

impl ScoreStats {
    /// Compute statistics over `entries`.
    ///
    /// Topics are grouped by title in first-seen order; a stable descending sort
    /// on the mean decides ties in favour of the earlier topic for `best_topic`
    /// and the later one for `worst_topic`.
    #[must_use]
    pub fn from_entries(entries: &[ScoreEntry]) -> Self {
        if entries.is_empty() {
            return Self {
                count: 0,
                average_percent: 0,
                best_topic: None,
                worst_topic: None,
            };
        }

        let sum: f64 = entries.iter().map(ScoreEntry::ratio).sum();
        #[allow(clippy::cast_precision_loss)]
        let average = sum / entries.len() as f64;

        let mut groups: Vec<(&str, f64, u32)> = Vec::new();
        for entry in entries {
            match groups.iter_mut().find(|(title, _, _)| *title == entry.title()) {
                Some((_, sum, count)) => {
                    *sum += entry.ratio();
                    *count += 1;
                }
                None => groups.push((entry.title(), entry.ratio(), 1)),
            }
        }

        let mut topics: Vec<TopicScore> = groups
            .into_iter()
            .map(|(title, sum, count)| {
                let mean = sum / f64::from(count);
                TopicScore {
                    title: title.to_string(),
                    mean,
                    percent: to_percent(mean),
                }
            })
            .collect();
        topics.sort_by(|a, b| b.mean.total_cmp(&a.mean));

        Self {
            count: entries.len(),
            average_percent: to_percent(average),
            best_topic: topics.first().cloned(),
            worst_topic: topics.last().cloned(),
        }
    }
}
