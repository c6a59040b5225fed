mod bank;
mod ids;
mod question;
mod score;
mod settings;

pub use ids::{ParseIdError, QuestionSetId};

pub use bank::{BankError, QuestionBank, QuestionSet};
pub use question::{Question, QuestionDraft, QuestionError};
pub use score::{LEDGER_CAPACITY, ScoreEntry, ScoreEntryError, ScoreLedger, ScoreStats, TopicScore};
pub use settings::{Palette, Theme, ThemeParseError};
