use quiz_core::model::Question;

use super::source::SessionSource;

/// Outcome of a completed session, handed to the score ledger.
///
/// `correct + missed.len() == total` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub title: String,
    pub correct: usize,
    pub total: usize,
    pub missed: Vec<Question>,
    /// Where the session's questions came from, for "restart".
    pub source: SessionSource,
}

impl SessionResult {
    #[must_use]
    pub fn wrong(&self) -> usize {
        self.missed.len()
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.missed.is_empty()
    }
}

/// What happened when a choice was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// Zero-based index of the right option.
    pub correct_choice: usize,
    /// Set when this answer completed the session.
    pub result: Option<SessionResult>,
}
