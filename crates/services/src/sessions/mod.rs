mod progress;
mod result;
mod service;
mod source;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::{SessionProgress, SessionStatus};
pub use result::{AnswerOutcome, SessionResult};
pub use service::{QuizSession, RestartTarget};
pub use source::{MISTAKES_TITLE_SUFFIX, SessionSource, UNKNOWN_SET_TITLE};
