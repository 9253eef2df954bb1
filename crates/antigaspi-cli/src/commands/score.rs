//! The `antigaspi score` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use antigaspi_core::config::load_config_from;
use antigaspi_core::parser::parse_answer_sheet;
use antigaspi_core::report::RecapReport;
use antigaspi_core::session::QuizSession;
use antigaspi_core::QuizError;
use antigaspi_report::{generate_html, generate_markdown, write_html_report, write_markdown_report};

use super::{load_bank, write_recap};

pub fn execute(
    bank: Option<PathBuf>,
    answers: PathBuf,
    format: Option<String>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let bank = load_bank(bank, &config)?;
    let format = format.unwrap_or_else(|| config.format.clone());

    let sheet = parse_answer_sheet(&answers)?;
    for id in sheet.keys() {
        if bank.question_by_id(*id).is_none() {
            tracing::warn!("answer for unknown question {id} ignored");
        }
    }

    let session = QuizSession::play_through(&bank, &sheet).with_context(|| {
        format!(
            "answer sheet {} does not fit the question bank",
            answers.display()
        )
    })?;

    let recap = match session.recap() {
        Ok(recap) => recap,
        Err(e @ QuizError::ConfigurationError { .. }) => {
            eprintln!("Warning: {e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let report = RecapReport::new(&bank, recap);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "markdown" | "md" => println!("{}", generate_markdown(&report)),
        "html" => {
            if output.is_none() {
                println!("{}", generate_html(&report));
            }
        }
        "text" => {
            let stdout = std::io::stdout();
            write_recap(&mut stdout.lock(), report.bank.title.as_deref(), &report.recap)?;
        }
        other => anyhow::bail!("unknown format: {other} (expected text, json, markdown or html)"),
    }

    if let Some(dir) = output {
        let json_path = dir.join(report.file_name());
        report.save_json(&json_path)?;
        eprintln!("Recap saved to: {}", json_path.display());

        match format.as_str() {
            "html" => {
                let path = json_path.with_extension("html");
                write_html_report(&report, &path)?;
                eprintln!("HTML recap: {}", path.display());
            }
            "markdown" | "md" => {
                let path = json_path.with_extension("md");
                write_markdown_report(&report, &path)?;
                eprintln!("Markdown recap: {}", path.display());
            }
            _ => {}
        }
    }

    Ok(())
}
