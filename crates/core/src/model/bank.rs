use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionSetId;
use crate::model::question::Question;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("duplicate question set id: {0}")]
    DuplicateSet(QuestionSetId),

    #[error("question set title cannot be empty")]
    EmptyTitle,

    #[error("invalid question set JSON: {0}")]
    Parse(String),
}

//
// ─── QUESTION SET ──────────────────────────────────────────────────────────────
//

/// A named, ordered collection of questions on one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    #[serde(rename = "titulo")]
    title: String,
    #[serde(rename = "preguntas")]
    questions: Vec<Question>,
}

impl QuestionSet {
    /// Creates a question set.
    ///
    /// # Errors
    ///
    /// Returns `BankError::EmptyTitle` if the title is blank.
    pub fn new(title: impl Into<String>, questions: Vec<Question>) -> Result<Self, BankError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(BankError::EmptyTitle);
        }
        Ok(Self { title, questions })
    }

    /// Parse one bank file (`{"titulo": .., "preguntas": [..]}`).
    ///
    /// Every question is validated on the way in.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Parse` for malformed JSON or invalid questions,
    /// `BankError::EmptyTitle` for a blank title.
    pub fn from_json(raw: &str) -> Result<Self, BankError> {
        let set: Self =
            serde_json::from_str(raw).map_err(|e| BankError::Parse(e.to_string()))?;
        Self::new(set.title, set.questions)
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

//
// ─── BANK ──────────────────────────────────────────────────────────────────────
//

/// Read-only mapping from set id to question set, in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    sets: Vec<(QuestionSetId, QuestionSet)>,
}

impl QuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bank from `(id, set)` pairs, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns `BankError::DuplicateSet` if an id appears twice.
    pub fn from_sets(
        sets: impl IntoIterator<Item = (QuestionSetId, QuestionSet)>,
    ) -> Result<Self, BankError> {
        let mut bank = Self::new();
        for (id, set) in sets {
            bank.insert(id, set)?;
        }
        Ok(bank)
    }

    /// Append a set to the bank.
    ///
    /// # Errors
    ///
    /// Returns `BankError::DuplicateSet` if the id is already present.
    pub fn insert(&mut self, id: QuestionSetId, set: QuestionSet) -> Result<(), BankError> {
        if self.contains(&id) {
            return Err(BankError::DuplicateSet(id));
        }
        self.sets.push((id, set));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &QuestionSetId) -> Option<&QuestionSet> {
        self.sets
            .iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, set)| set)
    }

    #[must_use]
    pub fn contains(&self, id: &QuestionSetId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionSetId, &QuestionSet)> {
        self.sets.iter().map(|(id, set)| (id, set))
    }

    /// Number of question sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Number of questions across every set.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.sets.iter().map(|(_, set)| set.len()).sum()
    }

    /// Every question of every set, flattened in bank order.
    pub fn pooled_questions(&self) -> impl Iterator<Item = &Question> {
        self.sets.iter().flat_map(|(_, set)| set.questions().iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionDraft;

    fn question(text: &str) -> Question {
        QuestionDraft::new(text, ["a", "b"], 1).validate().unwrap()
    }

    fn set(title: &str, n: usize) -> QuestionSet {
        let questions = (0..n).map(|i| question(&format!("{title}-{i}"))).collect();
        QuestionSet::new(title, questions).unwrap()
    }

    #[test]
    fn bank_keeps_insertion_order_and_pools_questions() {
        let bank = QuestionBank::from_sets([
            (QuestionSetId::new("test2"), set("B", 1)),
            (QuestionSetId::new("test1"), set("A", 2)),
        ])
        .unwrap();

        let ids: Vec<_> = bank.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["test2", "test1"]);
        assert_eq!(bank.total_questions(), 3);

        let pooled: Vec<_> = bank.pooled_questions().map(Question::statement).collect();
        assert_eq!(pooled, ["B-0", "A-0", "A-1"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = QuestionBank::from_sets([
            (QuestionSetId::new("test1"), set("A", 1)),
            (QuestionSetId::new("test1"), set("B", 1)),
        ])
        .unwrap_err();
        assert!(matches!(err, BankError::DuplicateSet(id) if id.as_str() == "test1"));
    }

    #[test]
    fn lookup_by_id() {
        let bank = QuestionBank::from_sets([(QuestionSetId::new("test1"), set("A", 1))]).unwrap();
        assert_eq!(bank.get(&QuestionSetId::new("test1")).unwrap().title(), "A");
        assert!(bank.get(&QuestionSetId::new("missing")).is_none());
    }

    #[test]
    fn parses_bank_file() {
        let raw = r#"{
            "titulo": "Tema 1",
            "preguntas": [
                {"enunciado": "Q1", "opciones": ["a", "b"], "respuesta": 1},
                {"enunciado": "Q2", "opciones": ["a", "b", "c"], "respuesta": 3, "imagen": "p2"}
            ]
        }"#;
        let set = QuestionSet::from_json(raw).unwrap();
        assert_eq!(set.title(), "Tema 1");
        assert_eq!(set.len(), 2);
        assert_eq!(set.questions()[1].image(), Some("p2"));
    }

    #[test]
    fn bank_file_with_invalid_question_fails() {
        let raw = r#"{"titulo": "T", "preguntas": [{"enunciado": "Q", "opciones": [], "respuesta": 1}]}"#;
        assert!(matches!(QuestionSet::from_json(raw), Err(BankError::Parse(_))));

        let raw = r#"{"titulo": " ", "preguntas": []}"#;
        assert!(matches!(QuestionSet::from_json(raw), Err(BankError::EmptyTitle)));
    }
}
