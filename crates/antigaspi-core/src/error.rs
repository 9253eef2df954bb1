//! Quiz error types.
//!
//! Every failing operation of the question bank, the scoring engine, the
//! session state machine and the recap deriver reports one of these variants.
//! Unparseable numeric answers are not errors: they go through the scoring
//! fallback policy instead.

use thiserror::Error;

/// Errors raised by the quiz core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuizError {
    /// A question index outside `[0, count)` was requested.
    #[error("question index {index} out of range (bank has {count} questions)")]
    OutOfRange { index: usize, count: usize },

    /// The option text is not part of the question's own option list.
    #[error("unknown option {option:?} for question {question_id}")]
    UnknownOption { question_id: u32, option: String },

    /// Tried to advance a multiple-choice question without selecting an option.
    #[error("no answer selected for question {question_id}")]
    NoAnswerSelected { question_id: u32 },

    /// Tried to go back from the first question.
    #[error("already at the first question")]
    AtFirstQuestion,

    /// The session already reached the recap; only a restart is allowed.
    #[error("quiz is completed, restart to answer again")]
    SessionCompleted,

    /// An option was selected on a question that is not multiple-choice.
    #[error("question {question_id} is not a multiple-choice question")]
    NotMultipleChoice { question_id: u32 },

    /// Numeric input was submitted for a question that is not numeric.
    #[error("question {question_id} is not a numeric question")]
    NotNumeric { question_id: u32 },

    /// The question bank is malformed and cannot start a session.
    #[error("invalid question bank: {0}")]
    InvalidConfiguration(String),

    /// Score bounds are degenerate but the achieved score differs from them.
    #[error("score bounds are degenerate (min = max = {min}) but total score is {total}")]
    ConfigurationError { min: f64, total: f64 },
}

impl QuizError {
    /// Returns `true` for errors the presentation layer should surface to the
    /// user and carry on from, rather than treat as a fault.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            QuizError::NoAnswerSelected { .. }
                | QuizError::AtFirstQuestion
                | QuizError::ConfigurationError { .. }
        )
    }
}
