//! Scoring engine.
//!
//! Pure functions mapping raw answers to scores and computing the theoretical
//! score bounds of a question bank. A higher raw score means more waste.

use std::collections::BTreeMap;

use crate::error::QuizError;
use crate::model::{AnswerRecord, Question, QuestionKind, ScoreBounds, ScoringRange};

/// Score recorded for an unanswered numeric question that has neither a
/// default score nor any finite range score.
pub const UNANSWERED_FALLBACK_SCORE: f64 = 4.0;

/// Score of the option whose text equals `option_text` exactly.
pub fn score_multiple_choice(question: &Question, option_text: &str) -> Result<f64, QuizError> {
    let QuestionKind::MultipleChoice { options } = &question.kind else {
        return Err(QuizError::NotMultipleChoice {
            question_id: question.id,
        });
    };

    options
        .iter()
        .find(|o| o.text == option_text)
        .map(|o| o.score)
        .ok_or_else(|| QuizError::UnknownOption {
            question_id: question.id,
            option: option_text.to_string(),
        })
}

/// Parse a user-entered decimal number.
///
/// The first `,` is read as a decimal separator and the longest numeric
/// prefix is kept, so `"2,5"`, `"2.5"` and `"2.5 kg"` all give `2.5`.
/// `"Infinity"` and overflowing exponents give an infinite value, which still
/// takes the range path. Returns `None` for input without a leading number.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let normalized = raw.replacen(',', ".", 1);
    let s = normalized.trim_start();
    let bytes = s.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Score used when neither a range nor a token matches: the first default
/// range's score, else the score of the last declared range.
fn fallback_score(ranges: &[ScoringRange]) -> f64 {
    if let Some(default) = ranges.iter().find_map(|r| r.default_score) {
        return default;
    }
    // Last-range fallback kept as configured; see DESIGN.md.
    ranges
        .last()
        .and_then(|r| r.score)
        .unwrap_or(UNANSWERED_FALLBACK_SCORE)
}

/// Score a non-empty numeric (or special token) answer.
///
/// Ranges are scanned in declaration order and the first match wins, so
/// min-only ranges must come after max-only ranges in the configuration.
pub fn score_numeric(question: &Question, raw_input: &str) -> f64 {
    let ranges = question.ranges();

    let Some(v) = parse_decimal(raw_input) else {
        let lowered = raw_input.to_lowercase();
        if let Some(score) = ranges
            .iter()
            .filter(|r| r.value.as_ref().is_some_and(|t| t.to_lowercase() == lowered))
            .find_map(|r| r.score)
        {
            return score;
        }
        tracing::debug!(
            question_id = question.id,
            input = raw_input,
            "non-numeric answer, using fallback score"
        );
        return fallback_score(ranges);
    };

    for range in ranges {
        if range.matches(v) {
            if let Some(score) = range.score {
                return score;
            }
        }
    }

    tracing::warn!(
        question_id = question.id,
        value = v,
        "no range matches value, using fallback score"
    );
    fallback_score(ranges)
}

/// Score recorded when a numeric question is left empty: the default score,
/// else the worst (highest) finite range score, else
/// [`UNANSWERED_FALLBACK_SCORE`].
pub fn unanswered_score(question: &Question) -> f64 {
    if let Some(default) = question.default_range().and_then(|r| r.default_score) {
        return default;
    }
    question
        .ranges()
        .iter()
        .filter_map(|r| r.score)
        .filter(|s| s.is_finite())
        .reduce(f64::max)
        .unwrap_or(UNANSWERED_FALLBACK_SCORE)
}

/// Minimum and maximum finite score reachable for one question.
///
/// A question without any finite score contributes `0` to both bounds.
pub fn score_range_bounds(question: &Question) -> ScoreBounds {
    let mut scores: Vec<f64> = match &question.kind {
        QuestionKind::MultipleChoice { options } => options.iter().map(|o| o.score).collect(),
        QuestionKind::Numeric { ranges, .. } => ranges.iter().filter_map(|r| r.score).collect(),
    };
    if let Some(default) = question.default_range().and_then(|r| r.default_score) {
        scores.push(default);
    }

    let finite = scores.into_iter().filter(|s| s.is_finite());
    let bounds = finite.fold(None, |acc: Option<ScoreBounds>, s| match acc {
        None => Some(ScoreBounds::new(s, s)),
        Some(b) => Some(ScoreBounds::new(b.min.min(s), b.max.max(s))),
    });
    bounds.unwrap_or_default()
}

/// Sum of [`score_range_bounds`] over all questions.
pub fn total_bounds(questions: &[Question]) -> ScoreBounds {
    questions
        .iter()
        .map(score_range_bounds)
        .fold(ScoreBounds::default(), |acc, b| acc + b)
}

/// Sum of all recorded answer scores.
pub fn total_score(answers: &BTreeMap<usize, AnswerRecord>) -> f64 {
    answers.values().map(|a| a.score).sum()
}
