pub mod init;
pub mod play;
pub mod score;
pub mod validate;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use antigaspi_core::config::AppConfig;
use antigaspi_core::model::QuestionBank;
use antigaspi_core::recap::Recap;
use antigaspi_core::report::fmt_score;

/// Load the bank given on the command line, or the configured one, and
/// apply the configured copy override.
pub fn load_bank(bank: Option<PathBuf>, config: &AppConfig) -> Result<QuestionBank> {
    let path = bank.or_else(|| config.bank.clone()).context(
        "no question bank given (use --bank, set `bank` in antigaspi.toml or ANTIGASPI_BANK)",
    )?;
    let mut bank = antigaspi_core::parser::parse_question_bank(&path)?;
    if let Some(copy) = &config.copy {
        bank = bank.with_copy(copy.clone());
    }
    tracing::debug!(
        "loaded {} questions from {}",
        bank.question_count(),
        path.display()
    );
    Ok(bank)
}

/// Render a recap as plain text with a breakdown table.
pub fn write_recap(out: &mut impl Write, title: Option<&str>, recap: &Recap) -> io::Result<()> {
    use comfy_table::{Cell, Table};

    writeln!(out, "{}", title.unwrap_or("Quiz recap"))?;
    writeln!(
        out,
        "Score: {}% ({}, best {}, worst {})",
        recap.rounded_percentage,
        fmt_score(recap.total_score),
        fmt_score(recap.bounds.min),
        fmt_score(recap.bounds.max)
    )?;
    writeln!(out, "\n{}", recap.narrative)?;
    writeln!(out, "Tip: {}", recap.tip)?;
    writeln!(
        out,
        "\nEstimated annual waste: {} {}",
        fmt_score(recap.metrics.estimated_annual_waste),
        recap.metrics.unit
    )?;
    writeln!(
        out,
        "Potential savings: {} {}",
        fmt_score(recap.metrics.potential_savings),
        recap.metrics.unit
    )?;
    if let Some(cost) = &recap.metrics.annual_waste_cost {
        writeln!(out, "Annual waste cost: {:.2} {}", cost.amount, cost.currency)?;
    }
    writeln!(
        out,
        "{}: {} | {}: {}",
        recap.chart.good_label,
        fmt_score(recap.chart.good),
        recap.chart.bad_label,
        fmt_score(recap.chart.bad)
    )?;

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Answer", "Score"]);
    for (i, entry) in recap.breakdown.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&entry.question_text),
            Cell::new(&entry.answer_text),
            Cell::new(entry.score.map(fmt_score).unwrap_or_else(|| "-".into())),
        ]);
    }
    writeln!(out, "\n{table}")
}
