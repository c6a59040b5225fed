use quiz_core::model::{Question, QuestionBank, QuestionSetId};

/// Title used when a session is started for a set id the bank does not know.
pub const UNKNOWN_SET_TITLE: &str = "Test desconocido";

/// Appended to a title when replaying the questions missed in a run.
pub const MISTAKES_TITLE_SUFFIX: &str = " (Errores)";

/// Where a session's questions come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSource {
    /// A question set from the bank.
    ById(QuestionSetId),
    /// An explicit question list (exam draws, mistake replays).
    ByList {
        title: String,
        questions: Vec<Question>,
    },
}

impl SessionSource {
    #[must_use]
    pub fn by_id(id: impl Into<QuestionSetId>) -> Self {
        Self::ById(id.into())
    }

    #[must_use]
    pub fn by_list(title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self::ByList {
            title: title.into(),
            questions,
        }
    }

    /// Resolve into a concrete title and question sequence.
    ///
    /// An unknown id resolves to an empty sequence under `UNKNOWN_SET_TITLE`.
    pub(crate) fn resolve(&self, bank: &QuestionBank) -> (String, Vec<Question>) {
        match self {
            SessionSource::ById(id) => match bank.get(id) {
                Some(set) => (set.title().to_string(), set.questions().to_vec()),
                None => {
                    log::warn!("question set {id} not found, starting an empty session");
                    (UNKNOWN_SET_TITLE.to_string(), Vec::new())
                }
            },
            SessionSource::ByList { title, questions } => (title.clone(), questions.clone()),
        }
    }

    /// Whether restarting from this source would produce any questions.
    pub(crate) fn is_replayable(&self, bank: &QuestionBank) -> bool {
        match self {
            SessionSource::ById(id) => bank.contains(id),
            SessionSource::ByList { questions, .. } => !questions.is_empty(),
        }
    }
}

impl From<QuestionSetId> for SessionSource {
    fn from(id: QuestionSetId) -> Self {
        Self::ById(id)
    }
}
