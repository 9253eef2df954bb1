//! antigaspi-core: Question bank, scoring engine and quiz state machine.
//!
//! This crate defines the question bank model, the per-answer scoring rules,
//! the session that walks a player through the quiz, and the recap derived
//! from the final answers.

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod recap;
pub mod report;
pub mod scoring;
pub mod session;

pub use error::QuizError;
