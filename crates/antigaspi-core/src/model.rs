//! Core data model types for antigaspi.
//!
//! These are the fundamental types the whole quiz uses to represent
//! questions, their scoring rules, recorded answers and the question bank.

use std::collections::HashSet;
use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::config::RecapCopy;
use crate::error::QuizError;
use crate::scoring;

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the bank.
    pub id: u32,
    /// Prompt shown to the user.
    pub text: String,
    /// How the question is answered and scored.
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// The two answer styles a question can have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Discrete options, each with its own score.
    MultipleChoice { options: Vec<AnswerOption> },
    /// Free-form value mapped to a score through range rules.
    Numeric {
        /// Display unit, not used by scoring.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
        ranges: Vec<ScoringRange>,
    },
}

impl Question {
    /// Returns `true` for multiple-choice questions.
    pub fn is_multiple_choice(&self) -> bool {
        matches!(self.kind, QuestionKind::MultipleChoice { .. })
    }

    /// Returns `true` for numeric questions.
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, QuestionKind::Numeric { .. })
    }

    /// The options of a multiple-choice question (empty for numeric ones).
    pub fn options(&self) -> &[AnswerOption] {
        match &self.kind {
            QuestionKind::MultipleChoice { options } => options,
            QuestionKind::Numeric { .. } => &[],
        }
    }

    /// The range rules of a numeric question (empty for multiple-choice ones).
    pub fn ranges(&self) -> &[ScoringRange] {
        match &self.kind {
            QuestionKind::Numeric { ranges, .. } => ranges,
            QuestionKind::MultipleChoice { .. } => &[],
        }
    }

    /// The display unit of a numeric question.
    pub fn unit(&self) -> Option<&str> {
        match &self.kind {
            QuestionKind::Numeric { unit, .. } => unit.as_deref(),
            QuestionKind::MultipleChoice { .. } => None,
        }
    }

    /// The first range rule flagged as default, if any.
    pub fn default_range(&self) -> Option<&ScoringRange> {
        self.ranges().iter().find(|r| r.default_score.is_some())
    }
}

/// A selectable option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    pub score: f64,
}

/// A range rule of a numeric question.
///
/// Bounds are inclusive. A rule may instead match a specific textual token
/// through `value`, or only carry a `default_score` used when nothing matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Non-numeric token matched case-insensitively (e.g. "Je ne sais pas").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_score: Option<f64>,
}

impl ScoringRange {
    /// Returns `true` if the rule can match a numeric value.
    pub fn is_bounded(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Inclusive match of a numeric value against this rule's bounds.
    pub fn matches(&self, v: f64) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min <= v && v <= max,
            (None, Some(max)) => v <= max,
            (Some(min), None) => v >= min,
            (None, None) => false,
        }
    }
}

/// The recorded answer for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    /// What the user selected or typed; empty when left unanswered.
    pub raw_input: String,
    pub score: f64,
}

/// Theoretical minimum and maximum total score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBounds {
    pub min: f64,
    pub max: f64,
}

impl ScoreBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Width of the attainable score interval.
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

impl Add for ScoreBounds {
    type Output = ScoreBounds;

    fn add(self, rhs: ScoreBounds) -> ScoreBounds {
        ScoreBounds {
            min: self.min + rhs.min,
            max: self.max + rhs.max,
        }
    }
}

impl fmt::Display for ScoreBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "min {} / max {}", self.min, self.max)
    }
}

/// A validated, read-only ordered set of questions.
///
/// Score bounds are computed once at construction; the bank never changes
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionBank {
    title: Option<String>,
    questions: Vec<Question>,
    bounds: ScoreBounds,
    copy: RecapCopy,
}

impl QuestionBank {
    /// Validate the questions and build the bank with the default copy.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        validate_questions(&questions)?;
        let bounds = scoring::total_bounds(&questions);
        tracing::debug!(
            questions = questions.len(),
            min = bounds.min,
            max = bounds.max,
            "question bank loaded"
        );
        Ok(Self {
            title: None,
            questions,
            bounds,
            copy: RecapCopy::default(),
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replace the recap copy (theme) used for this bank.
    pub fn with_copy(mut self, copy: RecapCopy) -> Self {
        self.copy = copy;
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// The question at `index`, or `OutOfRange`.
    pub fn question_at(&self, index: usize) -> Result<&Question, QuizError> {
        self.questions.get(index).ok_or(QuizError::OutOfRange {
            index,
            count: self.questions.len(),
        })
    }

    pub fn question_by_id(&self, id: u32) -> Option<(usize, &Question)> {
        self.questions.iter().enumerate().find(|(_, q)| q.id == id)
    }

    pub fn bounds(&self) -> ScoreBounds {
        self.bounds
    }

    pub fn copy(&self) -> &RecapCopy {
        &self.copy
    }
}

fn invalid(message: String) -> QuizError {
    QuizError::InvalidConfiguration(message)
}

fn check_finite(question_id: u32, what: &str, value: Option<f64>) -> Result<(), QuizError> {
    match value {
        Some(v) if !v.is_finite() => Err(invalid(format!(
            "question {question_id}: {what} is not a finite number ({v})"
        ))),
        _ => Ok(()),
    }
}

fn validate_questions(questions: &[Question]) -> Result<(), QuizError> {
    if questions.is_empty() {
        return Err(invalid("question bank has no questions".into()));
    }

    let mut seen_ids = HashSet::new();
    for q in questions {
        if !seen_ids.insert(q.id) {
            return Err(invalid(format!("duplicate question id {}", q.id)));
        }

        match &q.kind {
            QuestionKind::MultipleChoice { options } => {
                if options.is_empty() {
                    return Err(invalid(format!("question {}: no options", q.id)));
                }
                let mut seen_texts = HashSet::new();
                for opt in options {
                    check_finite(q.id, "option score", Some(opt.score))?;
                    if !seen_texts.insert(opt.text.as_str()) {
                        return Err(invalid(format!(
                            "question {}: duplicate option {:?}",
                            q.id, opt.text
                        )));
                    }
                }
            }
            QuestionKind::Numeric { ranges, .. } => {
                if ranges.is_empty() {
                    return Err(invalid(format!("question {}: no scoring ranges", q.id)));
                }
                for (i, r) in ranges.iter().enumerate() {
                    check_finite(q.id, "range min", r.min)?;
                    check_finite(q.id, "range max", r.max)?;
                    check_finite(q.id, "range score", r.score)?;
                    check_finite(q.id, "default score", r.default_score)?;

                    if let (Some(min), Some(max)) = (r.min, r.max) {
                        if min > max {
                            return Err(invalid(format!(
                                "question {}: range #{i} has min {min} > max {max}",
                                q.id
                            )));
                        }
                    }
                    if (r.is_bounded() || r.value.is_some()) && r.score.is_none() {
                        return Err(invalid(format!(
                            "question {}: range #{i} matches input but has no score",
                            q.id
                        )));
                    }
                    if r.score.is_none() && r.default_score.is_none() {
                        return Err(invalid(format!(
                            "question {}: range #{i} has neither score nor default score",
                            q.id
                        )));
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mc(id: u32, scores: &[(&str, f64)]) -> Question {
        Question {
            id,
            text: format!("Question {id}"),
            kind: QuestionKind::MultipleChoice {
                options: scores
                    .iter()
                    .map(|(t, s)| AnswerOption {
                        text: (*t).into(),
                        score: *s,
                    })
                    .collect(),
            },
        }
    }

    fn numeric(id: u32, ranges: Vec<ScoringRange>) -> Question {
        Question {
            id,
            text: format!("Question {id}"),
            kind: QuestionKind::Numeric {
                unit: Some("g".into()),
                ranges,
            },
        }
    }

    #[test]
    fn range_matching_is_inclusive() {
        let both = ScoringRange {
            min: Some(1.0),
            max: Some(3.0),
            score: Some(2.0),
            ..Default::default()
        };
        assert!(both.matches(1.0));
        assert!(both.matches(3.0));
        assert!(!both.matches(3.01));

        let max_only = ScoringRange {
            max: Some(100.0),
            score: Some(1.0),
            ..Default::default()
        };
        assert!(max_only.matches(-5.0));
        assert!(max_only.matches(100.0));
        assert!(!max_only.matches(100.5));

        let min_only = ScoringRange {
            min: Some(400.0),
            score: Some(4.0),
            ..Default::default()
        };
        assert!(min_only.matches(400.0));
        assert!(!min_only.matches(399.9));

        assert!(!ScoringRange::default().matches(0.0));
    }

    #[test]
    fn bank_accessors() {
        let bank = QuestionBank::new(vec![
            mc(10, &[("Oui", 1.0), ("Non", 4.0)]),
            numeric(
                20,
                vec![ScoringRange {
                    max: Some(5.0),
                    score: Some(0.0),
                    ..Default::default()
                }],
            ),
        ])
        .unwrap();

        assert_eq!(bank.question_count(), 2);
        assert_eq!(bank.question_at(1).unwrap().id, 20);
        assert_eq!(
            bank.question_at(2).unwrap_err(),
            QuizError::OutOfRange { index: 2, count: 2 }
        );
        assert_eq!(bank.question_by_id(20).map(|(i, _)| i), Some(1));
        assert!(bank.question_by_id(99).is_none());
        assert_eq!(bank.question_at(1).unwrap().unit(), Some("g"));
    }

    #[test]
    fn rejects_empty_bank() {
        assert!(matches!(
            QuestionBank::new(vec![]),
            Err(QuizError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_empty_option_list() {
        let err = QuestionBank::new(vec![mc(1, &[])]).unwrap_err();
        assert!(err.to_string().contains("no options"));
    }

    #[test]
    fn rejects_non_finite_score() {
        let err = QuestionBank::new(vec![mc(1, &[("A", f64::NAN)])]).unwrap_err();
        assert!(err.to_string().contains("not a finite number"));

        let err = QuestionBank::new(vec![numeric(
            2,
            vec![ScoringRange {
                default_score: Some(f64::INFINITY),
                ..Default::default()
            }],
        )])
        .unwrap_err();
        assert!(err.to_string().contains("default score"));
    }

    #[test]
    fn rejects_duplicate_ids_and_options() {
        let err = QuestionBank::new(vec![mc(1, &[("A", 1.0)]), mc(1, &[("B", 2.0)])]).unwrap_err();
        assert!(err.to_string().contains("duplicate question id"));

        let err = QuestionBank::new(vec![mc(1, &[("A", 1.0), ("A", 2.0)])]).unwrap_err();
        assert!(err.to_string().contains("duplicate option"));
    }

    #[test]
    fn rejects_matching_range_without_score() {
        let err = QuestionBank::new(vec![numeric(
            3,
            vec![ScoringRange {
                min: Some(1.0),
                default_score: Some(2.0),
                ..Default::default()
            }],
        )])
        .unwrap_err();
        assert!(err.to_string().contains("has no score"));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let err = QuestionBank::new(vec![numeric(
            3,
            vec![ScoringRange {
                min: Some(10.0),
                max: Some(1.0),
                score: Some(2.0),
                ..Default::default()
            }],
        )])
        .unwrap_err();
        assert!(err.to_string().contains("min 10 > max 1"));
    }

    #[test]
    fn bounds_add_componentwise() {
        let total = ScoreBounds::new(1.0, 4.0) + ScoreBounds::new(2.0, 3.0);
        assert_eq!(total, ScoreBounds::new(3.0, 7.0));
        assert_eq!(total.range(), 4.0);
    }

    #[test]
    fn question_serde_uses_type_tag() {
        let q = mc(1, &[("Oui", 0.0)]);
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["type"], "multiple_choice");
        let back: Question = serde_json::from_value(json).unwrap();
        assert_eq!(back, q);
    }
}
