use rand::seq::SliceRandom;
use rand::{Rng, rng};

use quiz_core::model::{Question, QuestionBank};

use crate::sessions::SessionSource;

/// Number of questions in an exam draw.
pub const EXAM_SIZE: usize = 20;

/// Draw an exam from the whole bank using the thread-local RNG.
#[must_use]
pub fn compose_exam(bank: &QuestionBank) -> Vec<Question> {
    compose_exam_with(bank, &mut rng())
}

/// Draw `min(EXAM_SIZE, total questions)` questions without replacement.
///
/// The pool is every question of every set in bank order; a uniform shuffle of
/// the pool is cut to the exam size.
pub fn compose_exam_with<R: Rng + ?Sized>(bank: &QuestionBank, rng: &mut R) -> Vec<Question> {
    let mut pool: Vec<Question> = bank.pooled_questions().cloned().collect();
    pool.as_mut_slice().shuffle(rng);
    pool.truncate(EXAM_SIZE);
    pool
}

#[must_use]
pub fn exam_title(count: usize) -> String {
    format!("Examen — {count} preguntas")
}

/// A fresh exam draw wrapped as a session source.
#[must_use]
pub fn exam_source(bank: &QuestionBank) -> SessionSource {
    let questions = compose_exam(bank);
    log::debug!("composed exam with {} questions", questions.len());
    SessionSource::by_list(exam_title(questions.len()), questions)
}
