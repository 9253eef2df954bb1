//! Recap report with JSON persistence and markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::QuestionBank;
use crate::recap::Recap;

/// A saved quiz recap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecapReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the question bank that was played.
    pub bank: BankSummary,
    pub recap: Recap,
}

/// Summary of a question bank (without the questions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSummary {
    pub title: Option<String>,
    pub theme: String,
    pub question_count: usize,
}

impl BankSummary {
    pub fn of(bank: &QuestionBank) -> Self {
        Self {
            title: bank.title().map(str::to_string),
            theme: bank.copy().theme.clone(),
            question_count: bank.question_count(),
        }
    }
}

impl RecapReport {
    pub fn new(bank: &QuestionBank, recap: Recap) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            bank: BankSummary::of(bank),
            recap,
        }
    }

    /// Default file name for this report, unique per report id.
    pub fn file_name(&self) -> String {
        format!("recap-{}.json", self.id)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let recap = &self.recap;
        let mut md = String::new();

        md.push_str(&format!(
            "# {}\n\n",
            self.bank.title.as_deref().unwrap_or("Quiz recap")
        ));
        md.push_str(&format!(
            "**Score:** {}% ({} / {} to {})\n\n",
            recap.rounded_percentage,
            fmt_score(recap.total_score),
            fmt_score(recap.bounds.min),
            fmt_score(recap.bounds.max)
        ));
        md.push_str(&format!("{}\n\n", recap.narrative));
        md.push_str(&format!("> {}\n\n", recap.tip));

        md.push_str("## Metrics\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("|--------|-------|\n");
        md.push_str(&format!(
            "| Estimated annual waste | {} {} |\n",
            fmt_score(recap.metrics.estimated_annual_waste),
            recap.metrics.unit
        ));
        md.push_str(&format!(
            "| Potential savings | {} {} |\n",
            fmt_score(recap.metrics.potential_savings),
            recap.metrics.unit
        ));
        if let Some(cost) = &recap.metrics.annual_waste_cost {
            md.push_str(&format!(
                "| Annual waste cost | {:.2} {} |\n",
                cost.amount, cost.currency
            ));
        }
        md.push_str(&format!(
            "| {} | {} |\n| {} | {} |\n\n",
            recap.chart.good_label,
            fmt_score(recap.chart.good),
            recap.chart.bad_label,
            fmt_score(recap.chart.bad)
        ));

        md.push_str("## Answers\n\n");
        md.push_str("| # | Question | Answer | Score |\n");
        md.push_str("|---|----------|--------|-------|\n");
        for entry in &recap.breakdown {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                entry.question_id,
                escape_cell(&entry.question_text),
                escape_cell(&entry.answer_text),
                entry.score.map(fmt_score).unwrap_or_else(|| "-".into())
            ));
        }

        md
    }
}

/// Whole scores without decimals, others with up to two.
pub fn fmt_score(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        let s = format!("{rounded:.2}");
        s.trim_end_matches('0').to_string()
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}
