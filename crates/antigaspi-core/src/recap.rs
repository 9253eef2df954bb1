//! Recap and feedback derivation.
//!
//! Turns the final answers and the bank's score bounds into a percentage,
//! a feedback tier with its copy, derived waste metrics and a per-question
//! breakdown. Raw scores measure waste, so the percentage is inverted: the
//! lower the total, the higher the percentage.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{CostEnrichment, RecapCopy};
use crate::error::QuizError;
use crate::model::{AnswerRecord, QuestionBank, ScoreBounds};
use crate::scoring::{parse_decimal, total_score};

/// Percentage at or above which feedback is [`FeedbackTier::High`].
pub const HIGH_TIER_THRESHOLD: f64 = 80.0;
/// Percentage at or above which feedback is at least [`FeedbackTier::Medium`].
pub const MEDIUM_TIER_THRESHOLD: f64 = 50.0;

/// Feedback level derived from the percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackTier {
    High,
    Medium,
    Low,
}

impl FeedbackTier {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= HIGH_TIER_THRESHOLD {
            FeedbackTier::High
        } else if percentage >= MEDIUM_TIER_THRESHOLD {
            FeedbackTier::Medium
        } else {
            FeedbackTier::Low
        }
    }
}

impl fmt::Display for FeedbackTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackTier::High => write!(f, "high"),
            FeedbackTier::Medium => write!(f, "medium"),
            FeedbackTier::Low => write!(f, "low"),
        }
    }
}

/// Annual cost of wasted food, from the cost enrichment hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteCost {
    pub amount: f64,
    pub currency: String,
}

/// Display metrics derived from the percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Estimated yearly waste, in `unit`.
    pub estimated_annual_waste: f64,
    /// Reference waste minus the estimate, never negative.
    pub potential_savings: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_waste_cost: Option<WasteCost>,
}

/// Two-part split for a doughnut chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSplit {
    /// Distance from the total to the worst possible score.
    pub good: f64,
    /// Distance from the best possible score to the total.
    pub bad: f64,
    pub good_label: String,
    pub bad_label: String,
}

/// One line of the detailed answer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub question_id: u32,
    pub question_text: String,
    /// The recorded answer, or the unanswered label.
    pub answer_text: String,
    pub score: Option<f64>,
}

/// The completed-quiz summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recap {
    pub theme: String,
    pub total_score: f64,
    pub bounds: ScoreBounds,
    /// Exact percentage in `[0, 100]`.
    pub percentage: f64,
    /// Displayed percentage; tier and metrics are derived from it.
    pub rounded_percentage: u8,
    pub tier: FeedbackTier,
    pub narrative: String,
    pub tip: String,
    pub metrics: DerivedMetrics,
    pub chart: ChartSplit,
    pub breakdown: Vec<BreakdownEntry>,
}

/// Inverted percentage of `total` within `bounds`, clamped to `[0, 100]`.
///
/// Degenerate bounds give 100 when the total equals them and a
/// `ConfigurationError` otherwise.
pub fn compute_percentage(total: f64, bounds: ScoreBounds) -> Result<f64, QuizError> {
    let range = bounds.range();
    if range > 0.0 {
        Ok(((bounds.max - total) / range * 100.0).clamp(0.0, 100.0))
    } else if total == bounds.min {
        Ok(100.0)
    } else {
        tracing::error!(
            min = bounds.min,
            max = bounds.max,
            total,
            "cannot compute score percentage"
        );
        Err(QuizError::ConfigurationError {
            min: bounds.min,
            total,
        })
    }
}

/// `round((100 - percentage) * reference / 100)`.
pub fn estimated_annual_waste(percentage: f64, reference: f64) -> f64 {
    ((100.0 - percentage) * reference / 100.0).round()
}

/// `max(0, reference - waste)`.
pub fn potential_savings(waste: f64, reference: f64) -> f64 {
    (reference - waste).max(0.0)
}

fn chart_split(total: f64, bounds: ScoreBounds, copy: &RecapCopy) -> ChartSplit {
    let (good, bad) = if bounds.range() > 0.0 {
        ((bounds.max - total).max(0.0), (total - bounds.min).max(0.0))
    } else {
        (100.0, 0.0)
    };
    ChartSplit {
        good,
        bad,
        good_label: copy.good_label.clone(),
        bad_label: copy.bad_label.clone(),
    }
}

fn numeric_answer(
    bank: &QuestionBank,
    answers: &BTreeMap<usize, AnswerRecord>,
    question_id: u32,
) -> Option<f64> {
    let (index, _) = bank.question_by_id(question_id)?;
    parse_decimal(&answers.get(&index)?.raw_input).filter(|v| v.is_finite())
}

/// `budget × waste% / 100 × periods_per_year`, rounded to cents.
///
/// `None` when either answer is missing or not a number.
pub fn annual_waste_cost(
    bank: &QuestionBank,
    answers: &BTreeMap<usize, AnswerRecord>,
    cost: &CostEnrichment,
) -> Option<WasteCost> {
    let budget = numeric_answer(bank, answers, cost.budget_answer_id)?;
    let waste_percent = numeric_answer(bank, answers, cost.waste_answer_id)?;
    let amount = budget * waste_percent / 100.0 * cost.periods_per_year;
    Some(WasteCost {
        amount: (amount * 100.0).round() / 100.0,
        currency: cost.currency.clone(),
    })
}

/// Derive the recap for a set of final answers.
pub fn derive_recap(
    bank: &QuestionBank,
    answers: &BTreeMap<usize, AnswerRecord>,
) -> Result<Recap, QuizError> {
    let copy = bank.copy();
    let bounds = bank.bounds();
    let total = total_score(answers);
    let percentage = compute_percentage(total, bounds)?;
    let rounded = percentage.round();
    let tier = FeedbackTier::from_percentage(rounded);

    let tier_copy = match tier {
        FeedbackTier::High => &copy.high,
        FeedbackTier::Medium => &copy.medium,
        FeedbackTier::Low => &copy.low,
    };

    let waste = estimated_annual_waste(rounded, copy.waste_reference);
    let metrics = DerivedMetrics {
        estimated_annual_waste: waste,
        potential_savings: potential_savings(waste, copy.waste_reference),
        unit: copy.waste_unit.clone(),
        annual_waste_cost: copy
            .cost
            .as_ref()
            .and_then(|cost| annual_waste_cost(bank, answers, cost)),
    };

    let breakdown = bank
        .questions()
        .iter()
        .enumerate()
        .map(|(index, q)| {
            let record = answers.get(&index);
            let answer_text = record
                .map(|r| r.raw_input.as_str())
                .filter(|raw| !raw.is_empty())
                .unwrap_or(copy.unanswered_label.as_str())
                .to_string();
            BreakdownEntry {
                question_id: q.id,
                question_text: q.text.clone(),
                answer_text,
                score: record.map(|r| r.score),
            }
        })
        .collect();

    tracing::debug!(total, percentage = rounded, %tier, "recap derived");

    Ok(Recap {
        theme: copy.theme.clone(),
        total_score: total,
        bounds,
        percentage,
        rounded_percentage: rounded as u8,
        tier,
        narrative: tier_copy.narrative.clone(),
        tip: tier_copy.tip.clone(),
        metrics,
        chart: chart_split(total, bounds, copy),
        breakdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerOption, Question, QuestionKind, ScoringRange};

    fn record(index: usize, raw: &str, score: f64) -> (usize, AnswerRecord) {
        (
            index,
            AnswerRecord {
                question_index: index,
                raw_input: raw.into(),
                score,
            },
        )
    }

    fn bank() -> QuestionBank {
        QuestionBank::new(vec![
            Question {
                id: 1,
                text: "Liste de courses ?".into(),
                kind: QuestionKind::MultipleChoice {
                    options: vec![
                        AnswerOption {
                            text: "Toujours".into(),
                            score: 1.0,
                        },
                        AnswerOption {
                            text: "Jamais".into(),
                            score: 4.0,
                        },
                    ],
                },
            },
            Question {
                id: 21,
                text: "Budget hebdomadaire ?".into(),
                kind: QuestionKind::Numeric {
                    unit: Some("€".into()),
                    ranges: vec![
                        ScoringRange {
                            max: Some(50.0),
                            score: Some(2.0),
                            ..Default::default()
                        },
                        ScoringRange {
                            min: Some(51.0),
                            score: Some(3.0),
                            default_score: Some(3.0),
                            ..Default::default()
                        },
                    ],
                },
            },
        ])
        .unwrap()
    }

    #[test]
    fn percentage_is_inverted() {
        let bounds = ScoreBounds::new(3.0, 7.0);
        assert_eq!(compute_percentage(5.0, bounds).unwrap(), 50.0);
        assert_eq!(compute_percentage(3.0, bounds).unwrap(), 100.0);
        assert_eq!(compute_percentage(7.0, bounds).unwrap(), 0.0);
    }

    #[test]
    fn percentage_is_clamped() {
        let bounds = ScoreBounds::new(3.0, 7.0);
        assert_eq!(compute_percentage(0.0, bounds).unwrap(), 100.0);
        assert_eq!(compute_percentage(12.0, bounds).unwrap(), 0.0);
    }

    #[test]
    fn degenerate_bounds() {
        let bounds = ScoreBounds::new(2.0, 2.0);
        assert_eq!(compute_percentage(2.0, bounds).unwrap(), 100.0);
        assert_eq!(
            compute_percentage(3.0, bounds).unwrap_err(),
            QuizError::ConfigurationError {
                min: 2.0,
                total: 3.0
            }
        );
    }

    #[test]
    fn tier_thresholds() {
        assert_eq!(FeedbackTier::from_percentage(100.0), FeedbackTier::High);
        assert_eq!(FeedbackTier::from_percentage(80.0), FeedbackTier::High);
        assert_eq!(FeedbackTier::from_percentage(79.0), FeedbackTier::Medium);
        assert_eq!(FeedbackTier::from_percentage(50.0), FeedbackTier::Medium);
        assert_eq!(FeedbackTier::from_percentage(49.0), FeedbackTier::Low);
        assert_eq!(FeedbackTier::Medium.to_string(), "medium");
    }

    #[test]
    fn waste_metrics() {
        assert_eq!(estimated_annual_waste(50.0, 30.0), 15.0);
        assert_eq!(estimated_annual_waste(100.0, 30.0), 0.0);
        assert_eq!(estimated_annual_waste(0.0, 30.0), 30.0);
        assert_eq!(estimated_annual_waste(75.0, 30.0), 8.0);
        assert_eq!(potential_savings(8.0, 30.0), 22.0);
        assert_eq!(potential_savings(40.0, 30.0), 0.0);
    }

    #[test]
    fn recap_for_worst_score() {
        let bank = bank();
        let answers = BTreeMap::from([record(0, "Jamais", 4.0), record(1, "", 3.0)]);
        let recap = derive_recap(&bank, &answers).unwrap();

        assert_eq!(recap.bounds, ScoreBounds::new(3.0, 7.0));
        assert_eq!(recap.total_score, 7.0);
        assert_eq!(recap.rounded_percentage, 0);
        assert_eq!(recap.tier, FeedbackTier::Low);
        assert_eq!(recap.narrative, bank.copy().low.narrative);
        assert_eq!(recap.tip, bank.copy().low.tip);
        assert_eq!(recap.metrics.estimated_annual_waste, 30.0);
        assert_eq!(recap.metrics.potential_savings, 0.0);
        assert_eq!(recap.chart.good, 0.0);
        assert_eq!(recap.chart.bad, 4.0);
        assert!(recap.metrics.annual_waste_cost.is_none());
    }

    #[test]
    fn recap_uses_rounded_percentage_for_tier() {
        let bank = bank();
        // (7 - 3.81) / 4 = 79.75% -> displayed as 80%
        let answers = BTreeMap::from([record(0, "Toujours", 1.0), record(1, "51", 2.81)]);
        let recap = derive_recap(&bank, &answers).unwrap();
        assert!(recap.percentage < 80.0);
        assert_eq!(recap.rounded_percentage, 80);
        assert_eq!(recap.tier, FeedbackTier::High);
        assert_eq!(recap.metrics.estimated_annual_waste, 6.0);
    }

    #[test]
    fn breakdown_marks_unanswered() {
        let bank = bank();
        let answers = BTreeMap::from([record(0, "Toujours", 1.0), record(1, "", 3.0)]);
        let recap = derive_recap(&bank, &answers).unwrap();
        assert_eq!(recap.breakdown.len(), 2);
        assert_eq!(recap.breakdown[0].answer_text, "Toujours");
        assert_eq!(recap.breakdown[1].answer_text, "Non répondu");
        assert_eq!(recap.breakdown[1].score, Some(3.0));

        let recap = derive_recap(&bank, &BTreeMap::from([record(0, "Toujours", 1.0)])).unwrap();
        assert_eq!(recap.breakdown[1].score, None);
        assert_eq!(recap.total_score, 1.0);
    }

    #[test]
    fn cost_enrichment() {
        let mut bank_questions = bank().questions().to_vec();
        bank_questions.push(Question {
            id: 22,
            text: "Part gaspillée ?".into(),
            kind: QuestionKind::Numeric {
                unit: Some("%".into()),
                ranges: vec![ScoringRange {
                    max: Some(100.0),
                    score: Some(0.0),
                    ..Default::default()
                }],
            },
        });
        let copy = RecapCopy {
            cost: Some(CostEnrichment {
                budget_answer_id: 21,
                waste_answer_id: 22,
                periods_per_year: 52.0,
                currency: "€".into(),
            }),
            ..RecapCopy::default()
        };
        let bank = QuestionBank::new(bank_questions).unwrap().with_copy(copy);

        let answers = BTreeMap::from([
            record(0, "Toujours", 1.0),
            record(1, "80", 3.0),
            record(2, "12,5", 0.0),
        ]);
        let recap = derive_recap(&bank, &answers).unwrap();
        let cost = recap.metrics.annual_waste_cost.unwrap();
        assert_eq!(cost.amount, 520.0);
        assert_eq!(cost.currency, "€");

        let answers = BTreeMap::from([
            record(0, "Toujours", 1.0),
            record(1, "", 3.0),
            record(2, "12,5", 0.0),
        ]);
        let recap = derive_recap(&bank, &answers).unwrap();
        assert!(recap.metrics.annual_waste_cost.is_none());

        let answers = BTreeMap::from([
            record(0, "Toujours", 1.0),
            record(1, "1e999", 3.0),
            record(2, "12,5", 0.0),
        ]);
        let recap = derive_recap(&bank, &answers).unwrap();
        assert!(recap.metrics.annual_waste_cost.is_none());
    }
}
