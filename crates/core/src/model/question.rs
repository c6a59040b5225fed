use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question statement cannot be empty")]
    EmptyStatement,

    #[error("question must have at least one option")]
    NoOptions,

    #[error("answer index {index} is outside 1..={options}")]
    AnswerOutOfRange { index: usize, options: usize },
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated question as it appears in a bank file.
///
/// Field names follow the bundled JSON banks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionDraft {
    #[serde(rename = "enunciado")]
    pub statement: String,
    #[serde(rename = "opciones")]
    pub options: Vec<String>,
    /// 1-based index into `options`.
    #[serde(rename = "respuesta")]
    pub answer_index: usize,
    #[serde(rename = "imagen", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl QuestionDraft {
    #[must_use]
    pub fn new(
        statement: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
        answer_index: usize,
    ) -> Self {
        Self {
            statement: statement.into(),
            options: options.into_iter().map(Into::into).collect(),
            answer_index,
            image: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, key: impl Into<String>) -> Self {
        self.image = Some(key.into());
        self
    }

    /// Validate the draft into a `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the statement is blank, there are no options,
    /// or the answer index does not point at one of the options.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.statement.trim().is_empty() {
            return Err(QuestionError::EmptyStatement);
        }
        if self.options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if self.answer_index == 0 || self.answer_index > self.options.len() {
            return Err(QuestionError::AnswerOutOfRange {
                index: self.answer_index,
                options: self.options.len(),
            });
        }

        let image = self
            .image
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(Question {
            statement: self.statement,
            options: self.options,
            answer_index: self.answer_index,
            image,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated multiple-choice question.
///
/// Invariant: `1 <= answer_index <= options.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionDraft", into = "QuestionDraft")]
pub struct Question {
    statement: String,
    options: Vec<String>,
    answer_index: usize,
    image: Option<String>,
}

impl TryFrom<QuestionDraft> for Question {
    type Error = QuestionError;

    fn try_from(draft: QuestionDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<Question> for QuestionDraft {
    fn from(question: Question) -> Self {
        Self {
            statement: question.statement,
            options: question.options,
            answer_index: question.answer_index,
            image: question.image,
        }
    }
}

impl Question {
    #[must_use]
    pub fn statement(&self) -> &str {
        &self.statement
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// The 1-based index of the correct option, as stored in the bank.
    #[must_use]
    pub fn answer_index(&self) -> usize {
        self.answer_index
    }

    /// The zero-based index of the correct option.
    #[must_use]
    pub fn correct_choice(&self) -> usize {
        self.answer_index - 1
    }

    /// Key into the external image lookup table, if the question has a picture.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    #[must_use]
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_choice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_in_range_answer() {
        let q = QuestionDraft::new("¿Calibre?", ["a", "b", "c"], 3)
            .validate()
            .unwrap();
        assert_eq!(q.correct_choice(), 2);
        assert!(q.is_correct(2));
        assert!(!q.is_correct(0));
        assert_eq!(q.image(), None);
    }

    #[test]
    fn validate_rejects_zero_and_overflowing_answer() {
        let err = QuestionDraft::new("Q", ["a", "b"], 0).validate().unwrap_err();
        assert_eq!(err, QuestionError::AnswerOutOfRange { index: 0, options: 2 });

        let err = QuestionDraft::new("Q", ["a", "b"], 3).validate().unwrap_err();
        assert_eq!(err, QuestionError::AnswerOutOfRange { index: 3, options: 2 });
    }

    #[test]
    fn validate_rejects_blank_statement_and_missing_options() {
        let err = QuestionDraft::new("  ", ["a"], 1).validate().unwrap_err();
        assert_eq!(err, QuestionError::EmptyStatement);

        let err = QuestionDraft::new("Q", Vec::<String>::new(), 1)
            .validate()
            .unwrap_err();
        assert_eq!(err, QuestionError::NoOptions);
    }

    #[test]
    fn blank_image_key_is_dropped() {
        let q = QuestionDraft::new("Q", ["a"], 1)
            .with_image("  ")
            .validate()
            .unwrap();
        assert_eq!(q.image(), None);
    }

    #[test]
    fn deserializes_bank_shape() {
        let raw = r#"{"enunciado":"Q1","opciones":["x","y"],"respuesta":2,"imagen":"img7"}"#;
        let q: Question = serde_json::from_str(raw).unwrap();
        assert_eq!(q.statement(), "Q1");
        assert_eq!(q.options(), ["x", "y"]);
        assert_eq!(q.answer_index(), 2);
        assert_eq!(q.image(), Some("img7"));
    }

    #[test]
    fn deserialization_runs_validation() {
        let raw = r#"{"enunciado":"Q1","opciones":["x"],"respuesta":4}"#;
        assert!(serde_json::from_str::<Question>(raw).is_err());
    }
}
