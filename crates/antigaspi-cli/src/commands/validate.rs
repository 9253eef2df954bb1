//! The `antigaspi validate` command.

use std::path::PathBuf;

use anyhow::Result;

use antigaspi_core::report::fmt_score;

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let banks = if bank_path.is_dir() {
        antigaspi_core::parser::load_bank_directory(&bank_path)?
    } else {
        vec![(
            bank_path.clone(),
            antigaspi_core::parser::parse_question_bank(&bank_path)?,
        )]
    };

    if banks.is_empty() {
        anyhow::bail!("no valid question bank found in {}", bank_path.display());
    }

    let mut total_warnings = 0;

    for (path, bank) in &banks {
        let bounds = bank.bounds();
        println!(
            "Question bank: {} ({} questions, scores {} to {}) [{}]",
            bank.title().unwrap_or("untitled"),
            bank.question_count(),
            fmt_score(bounds.min),
            fmt_score(bounds.max),
            path.display()
        );

        let warnings = antigaspi_core::parser::validate_question_bank(bank);
        for w in &warnings {
            let prefix = w
                .question_id
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All question banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
