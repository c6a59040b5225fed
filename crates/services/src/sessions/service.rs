use std::fmt;

use quiz_core::model::{Question, QuestionBank};

use super::progress::{SessionProgress, SessionStatus};
use super::result::{AnswerOutcome, SessionResult};
use super::source::{MISTAKES_TITLE_SUFFIX, SessionSource};
use crate::error::SessionError;

//
// ─── RESTART TARGET ────────────────────────────────────────────────────────────
//

/// Where "restart" leads after a completed session.
#[derive(Debug)]
pub enum RestartTarget {
    Session(QuizSession),
    /// Nothing to replay; go back to the question set listing.
    Listing,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One run through an ordered sequence of questions.
///
/// The question sequence is fixed for the session's lifetime. Each answer
/// advances the position by one; when the position reaches the end the
/// session is complete and the answer that completed it carries the
/// `SessionResult`.
pub struct QuizSession {
    source: SessionSource,
    title: String,
    questions: Vec<Question>,
    position: usize,
    correct: usize,
    missed: Vec<Question>,
}

impl QuizSession {
    /// Start a session, resolving `source` against `bank` once.
    ///
    /// Never fails: an unknown set id yields an empty session titled
    /// `UNKNOWN_SET_TITLE`, whose status is `SessionStatus::Empty`.
    #[must_use]
    pub fn start(bank: &QuestionBank, source: SessionSource) -> Self {
        let (title, questions) = source.resolve(bank);
        log::debug!("starting session {title:?} with {} questions", questions.len());
        Self {
            source,
            title,
            questions,
            position: 0,
            correct: 0,
            missed: Vec::new(),
        }
    }

    /// Start a new session over the questions missed in `result`, in the order
    /// they were missed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoMistakes` if nothing was missed.
    pub fn redo_mistakes(result: &SessionResult) -> Result<Self, SessionError> {
        if result.missed.is_empty() {
            return Err(SessionError::NoMistakes);
        }
        let title = format!("{}{MISTAKES_TITLE_SUFFIX}", result.title);
        let source = SessionSource::by_list(title, result.missed.clone());
        Ok(Self::start(&QuestionBank::new(), source))
    }

    /// Start over from the original source of a finished session.
    ///
    /// An explicit question list wins, then a known set id; with neither the
    /// caller should return to the listing.
    #[must_use]
    pub fn restart_original(bank: &QuestionBank, source: &SessionSource) -> RestartTarget {
        if source.is_replayable(bank) {
            RestartTarget::Session(Self::start(bank, source.clone()))
        } else {
            RestartTarget::Listing
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn source(&self) -> &SessionSource {
        &self.source
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct
    }

    /// Questions answered incorrectly so far, in the order they were missed.
    #[must_use]
    pub fn missed(&self) -> &[Question] {
        &self.missed
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        if self.questions.is_empty() {
            SessionStatus::Empty
        } else if self.position >= self.questions.len() {
            SessionStatus::Complete
        } else {
            SessionStatus::InProgress
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status() == SessionStatus::Complete
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.position)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            position: self.position,
            total: self.total(),
            correct: self.correct,
            wrong: self.missed.len(),
            status: self.status(),
        }
    }

    /// Submit a zero-based choice for the current question and advance.
    ///
    /// The returned outcome carries the `SessionResult` when this answer
    /// completes the session; its counters include this answer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` for a session without questions,
    /// `SessionError::Completed` once every question has been answered, and
    /// `SessionError::InvalidChoice` if `choice` is not one of the current
    /// options. The session is left untouched on error.
    pub fn answer(&mut self, choice: usize) -> Result<AnswerOutcome, SessionError> {
        let question = match self.status() {
            SessionStatus::Empty => return Err(SessionError::Empty),
            SessionStatus::Complete => return Err(SessionError::Completed),
            SessionStatus::InProgress => &self.questions[self.position],
        };

        let options = question.options().len();
        if choice >= options {
            return Err(SessionError::InvalidChoice { choice, options });
        }

        let correct = question.is_correct(choice);
        let correct_choice = question.correct_choice();
        if correct {
            self.correct += 1;
        } else {
            self.missed.push(question.clone());
        }
        self.position += 1;

        let result = self.is_complete().then(|| self.build_result());
        if result.is_some() {
            log::debug!(
                "session {:?} complete: {}/{}",
                self.title,
                self.correct,
                self.total()
            );
        }

        Ok(AnswerOutcome {
            correct,
            correct_choice,
            result,
        })
    }

    /// Replay the same questions from the start.
    pub fn restart(&mut self) {
        self.position = 0;
        self.correct = 0;
        self.missed.clear();
    }

    fn build_result(&self) -> SessionResult {
        SessionResult {
            title: self.title.clone(),
            correct: self.correct,
            total: self.total(),
            missed: self.missed.clone(),
            source: self.source.clone(),
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("title", &self.title)
            .field("questions_len", &self.questions.len())
            .field("position", &self.position)
            .field("correct", &self.correct)
            .field("missed_len", &self.missed.len())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
