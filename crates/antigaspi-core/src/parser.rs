//! Question bank and answer sheet parser.
//!
//! Loads question banks from JSON or TOML files and directories, and lints
//! them for authoring mistakes that do not prevent a session from starting.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::RecapCopy;
use crate::model::{AnswerOption, Question, QuestionBank, QuestionKind, ScoringRange};
use crate::scoring::parse_decimal;

/// Intermediate structure shared by the JSON and TOML bank layouts.
#[derive(Debug, Deserialize)]
struct RawBankFile {
    #[serde(default)]
    title: Option<String>,
    questions: Vec<RawQuestion>,
    #[serde(default)]
    recap: Option<RecapCopy>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    id: u32,
    #[serde(alias = "text")]
    question: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    options: Vec<RawOption>,
    #[serde(default, rename = "scoringRanges", alias = "scoring_ranges")]
    scoring_ranges: Vec<RawRange>,
    #[serde(default)]
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    text: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
struct RawRange {
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default, rename = "defaultScore", alias = "default_score")]
    default_score: Option<f64>,
}

/// On-disk layout of a question bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    Json,
    Toml,
}

impl BankFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(BankFormat::Json),
            "toml" => Some(BankFormat::Toml),
            _ => None,
        }
    }
}

fn convert_question(raw: RawQuestion) -> Result<Question> {
    let kind = match raw.kind.to_lowercase().as_str() {
        "multiple_choice" | "multiple-choice" | "choice" => QuestionKind::MultipleChoice {
            options: raw
                .options
                .into_iter()
                .map(|o| AnswerOption {
                    text: o.text,
                    score: o.score,
                })
                .collect(),
        },
        "numeric" | "number" => QuestionKind::Numeric {
            unit: raw.unit,
            ranges: raw
                .scoring_ranges
                .into_iter()
                .map(|r| ScoringRange {
                    min: r.min,
                    max: r.max,
                    value: r.value,
                    score: r.score,
                    default_score: r.default_score,
                })
                .collect(),
        },
        other => anyhow::bail!("question {}: unknown question type: {other}", raw.id),
    };

    Ok(Question {
        id: raw.id,
        text: raw.question,
        kind,
    })
}

/// Parse a single bank file into a validated `QuestionBank`.
pub fn parse_question_bank(path: &Path) -> Result<QuestionBank> {
    let format = BankFormat::from_path(path).with_context(|| {
        format!(
            "unsupported question bank extension (expected .json or .toml): {}",
            path.display()
        )
    })?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_question_bank_str(&content, format, path)
}

/// Parse a bank document from a string (useful for testing).
pub fn parse_question_bank_str(
    content: &str,
    format: BankFormat,
    source_path: &Path,
) -> Result<QuestionBank> {
    let parsed: RawBankFile = match format {
        BankFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?,
        BankFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?,
    };

    let questions = parsed
        .questions
        .into_iter()
        .map(convert_question)
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid question bank: {}", source_path.display()))?;

    let mut bank = QuestionBank::new(questions)
        .with_context(|| format!("invalid question bank: {}", source_path.display()))?;
    if let Some(title) = parsed.title {
        bank = bank.with_title(title);
    }
    if let Some(copy) = parsed.recap {
        bank = bank.with_copy(copy);
    }
    Ok(bank)
}

/// Recursively load all `.json` / `.toml` banks from a directory.
///
/// Files that fail to parse or validate are skipped with a warning.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<(PathBuf, QuestionBank)>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if BankFormat::from_path(&path).is_some() {
            match parse_question_bank(&path) {
                Ok(bank) => banks.push((path, bank)),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// Answer sheet layout: question id → raw answer.
#[derive(Debug, Deserialize)]
struct RawAnswerSheet {
    answers: BTreeMap<String, RawAnswer>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAnswer {
    Text(String),
    Number(f64),
}

/// Parse an answer sheet file (JSON or TOML) into question id → raw answer.
pub fn parse_answer_sheet(path: &Path) -> Result<BTreeMap<u32, String>> {
    let format = BankFormat::from_path(path).with_context(|| {
        format!(
            "unsupported answer sheet extension (expected .json or .toml): {}",
            path.display()
        )
    })?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer sheet: {}", path.display()))?;
    parse_answer_sheet_str(&content, format, path)
}

/// Parse an answer sheet from a string.
pub fn parse_answer_sheet_str(
    content: &str,
    format: BankFormat,
    source_path: &Path,
) -> Result<BTreeMap<u32, String>> {
    let sheet: RawAnswerSheet = match format {
        BankFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?,
        BankFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?,
    };

    sheet
        .answers
        .into_iter()
        .map(|(key, answer)| {
            let id = key
                .trim()
                .parse::<u32>()
                .map_err(|_| anyhow::anyhow!("answer key is not a question id: '{key}'"))?;
            let raw = match answer {
                RawAnswer::Text(text) => text,
                RawAnswer::Number(n) => n.to_string(),
            };
            Ok((id, raw))
        })
        .collect()
}

/// A warning from question bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<u32>,
    /// Warning message.
    pub message: String,
}

/// Open intervals between scored bounded ranges that no range covers.
fn range_gaps(ranges: &[ScoringRange]) -> Vec<(f64, f64)> {
    let mut bounds: Vec<(f64, f64)> = ranges
        .iter()
        .filter(|r| r.is_bounded() && r.score.is_some())
        .map(|r| {
            (
                r.min.unwrap_or(f64::NEG_INFINITY),
                r.max.unwrap_or(f64::INFINITY),
            )
        })
        .collect();
    bounds.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut gaps = Vec::new();
    let mut iter = bounds.into_iter();
    let Some((_, mut covered)) = iter.next() else {
        return gaps;
    };
    for (lo, hi) in iter {
        if lo > covered {
            gaps.push((covered, lo));
        }
        covered = covered.max(hi);
    }
    gaps
}

/// Lint a question bank for authoring mistakes.
pub fn validate_question_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for q in bank.questions() {
        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: "question text is empty".into(),
            });
        }

        let ranges = q.ranges();

        // First match wins, so a min-only range shadows later max-only ranges
        let first_min_only = ranges
            .iter()
            .position(|r| r.min.is_some() && r.max.is_none());
        if let Some(pos) = first_min_only {
            if ranges[pos + 1..]
                .iter()
                .any(|r| r.max.is_some() && r.min.is_none())
            {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id),
                    message: "a min-only range is declared before a max-only range".into(),
                });
            }
        }

        for (from, to) in range_gaps(ranges) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: format!("no range matches values between {from} and {to}"),
            });
        }

        let defaults = ranges.iter().filter(|r| r.default_score.is_some()).count();
        if defaults > 1 {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: format!("{defaults} default ranges declared, only the first is used"),
            });
        }

        let last = ranges.len().saturating_sub(1);
        for (i, r) in ranges.iter().enumerate() {
            if i != last && !r.is_bounded() && r.value.is_none() && r.default_score.is_none() {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id),
                    message: format!("range #{i} can never match"),
                });
            }
        }

        if q.is_numeric() && q.default_range().is_none() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: "no default range, unmatched answers score like the last range".into(),
            });
        }
    }

    if let Some(cost) = &bank.copy().cost {
        for (role, id) in [
            ("budget", cost.budget_answer_id),
            ("waste", cost.waste_answer_id),
        ] {
            match bank.question_by_id(id) {
                None => warnings.push(ValidationWarning {
                    question_id: None,
                    message: format!("cost enrichment {role} question {id} does not exist"),
                }),
                Some((_, q)) if !q.is_numeric() => warnings.push(ValidationWarning {
                    question_id: Some(id),
                    message: format!("cost enrichment {role} question is not numeric"),
                }),
                Some(_) => {}
            }
        }
    }

    let mut seen_tokens = HashSet::new();
    for q in bank.questions() {
        seen_tokens.clear();
        for token in q.ranges().iter().filter_map(|r| r.value.as_deref()) {
            if parse_decimal(token).is_some() {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id),
                    message: format!("token {token:?} parses as a number and can never match"),
                });
            }
            if !seen_tokens.insert(token.to_lowercase()) {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id),
                    message: format!("duplicate token {token:?}"),
                });
            }
        }
    }

    warnings
}
