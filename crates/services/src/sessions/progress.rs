/// Lifecycle state of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// The session was built with no questions; nothing can be answered.
    Empty,
    InProgress,
    Complete,
}

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    /// Zero-based index of the current question.
    pub position: usize,
    pub total: usize,
    pub correct: usize,
    pub wrong: usize,
    pub status: SessionStatus,
}

impl SessionProgress {
    /// Number of questions answered so far.
    #[must_use]
    pub fn answered(&self) -> usize {
        self.correct + self.wrong
    }

    /// Rounded share of correct answers over the whole session.
    ///
    /// `None` for an empty session, so callers show "no questions" instead of NaN.
    #[must_use]
    pub fn percent(&self) -> Option<usize> {
        if self.total == 0 {
            return None;
        }
        Some((self.correct * 100 + self.total / 2) / self.total)
    }
}
