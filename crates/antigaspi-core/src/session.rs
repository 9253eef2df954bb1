//! Quiz session state machine.
//!
//! A `QuizSession` is owned by a single presentation loop. Its mutating
//! methods are the only way answers are recorded and questions are walked;
//! the presentation layer re-reads [`QuizSession::snapshot`] after each one.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::QuizError;
use crate::model::{AnswerRecord, Question, QuestionBank};
use crate::recap::{derive_recap, Recap};
use crate::scoring;

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    InProgress { current_index: usize },
    Completed,
}

/// A single run through a question bank.
#[derive(Debug, Clone)]
pub struct QuizSession<'a> {
    bank: &'a QuestionBank,
    state: SessionState,
    answers: BTreeMap<usize, AnswerRecord>,
    /// Pending text of the current numeric question.
    input: String,
}

impl PartialEq for QuizSession<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.bank, other.bank)
            && self.state == other.state
            && self.answers == other.answers
            && self.input == other.input
    }
}

/// Read-only view of an in-progress session.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressView<'a> {
    pub question: &'a Question,
    pub question_index: usize,
    pub question_count: usize,
    /// `(index + 1) / count`, the share of the quiz reached so far.
    pub progress_fraction: f64,
    pub is_last_question: bool,
    pub can_go_back: bool,
    pub current_answer: Option<&'a AnswerRecord>,
    pub answers: &'a BTreeMap<usize, AnswerRecord>,
    pub input: &'a str,
}

/// What the presentation layer renders.
#[derive(Debug, Clone)]
pub enum Snapshot<'a> {
    InProgress(ProgressView<'a>),
    /// The recap, or the configuration error that prevented computing it.
    Completed(Result<Recap, QuizError>),
}

impl<'a> QuizSession<'a> {
    /// Start a fresh session on the first question.
    pub fn new(bank: &'a QuestionBank) -> Self {
        Self {
            bank,
            state: SessionState::InProgress { current_index: 0 },
            answers: BTreeMap::new(),
            input: String::new(),
        }
    }

    pub fn bank(&self) -> &'a QuestionBank {
        self.bank
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    pub fn answers(&self) -> &BTreeMap<usize, AnswerRecord> {
        &self.answers
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Index of the current question, `None` once completed.
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            SessionState::InProgress { current_index } => Some(current_index),
            SessionState::Completed => None,
        }
    }

    pub fn current_question(&self) -> Option<&'a Question> {
        self.current_index()
            .and_then(|i| self.bank.questions().get(i))
    }

    /// The answer recorded for the current question, if any.
    pub fn current_answer(&self) -> Option<&AnswerRecord> {
        self.current_index().and_then(|i| self.answers.get(&i))
    }

    fn in_progress(&self) -> Result<(usize, &'a Question), QuizError> {
        let SessionState::InProgress { current_index } = self.state else {
            tracing::warn!("refused mutation on a completed session");
            return Err(QuizError::SessionCompleted);
        };
        Ok((current_index, self.bank.question_at(current_index)?))
    }

    fn record(&mut self, question_index: usize, raw_input: String, score: f64) {
        self.answers.insert(
            question_index,
            AnswerRecord {
                question_index,
                raw_input,
                score,
            },
        );
    }

    /// Buffer pending text for the current numeric question.
    pub fn set_input(&mut self, text: impl Into<String>) -> Result<(), QuizError> {
        self.in_progress()?;
        self.input = text.into();
        Ok(())
    }

    /// Record the chosen option for the current multiple-choice question.
    ///
    /// Does not advance; selecting again replaces the previous choice.
    pub fn select_option(&mut self, option_text: &str) -> Result<(), QuizError> {
        let (index, question) = self.in_progress()?;
        let score = scoring::score_multiple_choice(question, option_text)?;
        tracing::debug!(question_id = question.id, option = option_text, score, "option selected");
        self.record(index, option_text.to_string(), score);
        Ok(())
    }

    /// Score and record numeric input for the current question.
    ///
    /// Blank input records an empty answer with the unanswered score.
    pub fn submit_numeric(&mut self, raw_input: &str) -> Result<f64, QuizError> {
        let (index, question) = self.in_progress()?;
        if !question.is_numeric() {
            return Err(QuizError::NotNumeric {
                question_id: question.id,
            });
        }

        let (raw, score) = if raw_input.trim().is_empty() {
            (String::new(), scoring::unanswered_score(question))
        } else {
            (raw_input.to_string(), scoring::score_numeric(question, raw_input))
        };
        tracing::debug!(question_id = question.id, input = %raw, score, "numeric answer recorded");
        self.record(index, raw, score);
        Ok(score)
    }

    /// Move past the current question, completing the quiz after the last one.
    ///
    /// Numeric questions submit the buffered input first. A multiple-choice
    /// question without a selection fails with `NoAnswerSelected` and leaves
    /// the session unchanged.
    pub fn advance(&mut self) -> Result<SessionState, QuizError> {
        let (index, question) = self.in_progress()?;

        if question.is_numeric() {
            let input = std::mem::take(&mut self.input);
            self.submit_numeric(&input)?;
        } else if !self.answers.contains_key(&index) {
            tracing::warn!(question_id = question.id, "advance refused, no option selected");
            return Err(QuizError::NoAnswerSelected {
                question_id: question.id,
            });
        }

        self.input.clear();
        self.state = if index + 1 >= self.bank.question_count() {
            SessionState::Completed
        } else {
            SessionState::InProgress {
                current_index: index + 1,
            }
        };
        if self.state == SessionState::Completed {
            tracing::info!(answered = self.answers.len(), "quiz completed");
        } else {
            tracing::debug!(from = index, state = ?self.state, "advanced");
        }
        Ok(self.state)
    }

    /// Go back one question, restoring a previous numeric answer into the
    /// input buffer.
    pub fn retreat(&mut self) -> Result<(), QuizError> {
        let (index, _) = self.in_progress()?;
        if index == 0 {
            tracing::warn!("retreat refused, already at the first question");
            return Err(QuizError::AtFirstQuestion);
        }

        let previous = index - 1;
        let question = self.bank.question_at(previous)?;
        self.input = match self.answers.get(&previous) {
            Some(record) if question.is_numeric() => record.raw_input.clone(),
            _ => String::new(),
        };
        self.state = SessionState::InProgress {
            current_index: previous,
        };
        tracing::debug!(to = previous, "retreated");
        Ok(())
    }

    /// Discard everything and start over on the first question.
    pub fn restart(&mut self) {
        tracing::debug!("session restarted");
        *self = QuizSession::new(self.bank);
    }

    /// Sum of the scores recorded so far.
    pub fn total_score(&self) -> f64 {
        scoring::total_score(&self.answers)
    }

    /// Read-only state for the presentation layer.
    pub fn snapshot(&self) -> Snapshot<'_> {
        match self.state {
            SessionState::Completed => Snapshot::Completed(derive_recap(self.bank, &self.answers)),
            SessionState::InProgress { current_index } => {
                let count = self.bank.question_count();
                Snapshot::InProgress(ProgressView {
                    question: &self.bank.questions()[current_index],
                    question_index: current_index,
                    question_count: count,
                    progress_fraction: (current_index + 1) as f64 / count as f64,
                    is_last_question: current_index + 1 == count,
                    can_go_back: current_index > 0,
                    current_answer: self.answers.get(&current_index),
                    answers: &self.answers,
                    input: &self.input,
                })
            }
        }
    }

    /// The recap of a completed session.
    pub fn recap(&self) -> Result<Recap, QuizError> {
        derive_recap(self.bank, &self.answers)
    }

    /// Replay an answer sheet (question id → raw answer) through a fresh
    /// session until completion.
    ///
    /// Missing numeric answers are submitted empty; a missing
    /// multiple-choice answer fails with `NoAnswerSelected`.
    pub fn play_through(
        bank: &'a QuestionBank,
        answers: &BTreeMap<u32, String>,
    ) -> Result<Self, QuizError> {
        let mut session = QuizSession::new(bank);
        while let Some(question) = session.current_question() {
            let answer = answers.get(&question.id);
            if question.is_multiple_choice() {
                if let Some(text) = answer {
                    session.select_option(text)?;
                }
            } else {
                session.set_input(answer.cloned().unwrap_or_default())?;
            }
            session.advance()?;
        }
        Ok(session)
    }
}
