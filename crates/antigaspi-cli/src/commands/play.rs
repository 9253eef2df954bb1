//! The `antigaspi play` command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use antigaspi_core::config::load_config_from;
use antigaspi_core::model::{QuestionBank, QuestionKind};
use antigaspi_core::recap::Recap;
use antigaspi_core::report::RecapReport;
use antigaspi_core::session::{ProgressView, QuizSession, Snapshot};
use antigaspi_core::QuizError;

use super::{load_bank, write_recap};

pub fn execute(bank: Option<PathBuf>, config_path: Option<PathBuf>, save: bool) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let bank = load_bank(bank, &config)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let recap = run_interactive(&bank, stdin.lock(), stdout.lock())?;

    if save {
        if let Some(recap) = recap {
            let report = RecapReport::new(&bank, recap);
            let path = config.output_dir.join(report.file_name());
            report.save_json(&path)?;
            eprintln!("Recap saved to: {}", path.display());
        }
    }

    Ok(())
}

/// Drive a session from line-based input until the player quits or input
/// ends. Returns the last recap reached, if any.
///
/// While a question is shown: a number picks that option and moves on,
/// `b` goes back, `q` quits, anything else is the numeric answer (an empty
/// line keeps the current one). On the recap: `r` restarts, `q` quits.
pub fn run_interactive<R: BufRead, W: Write>(
    bank: &QuestionBank,
    mut input: R,
    mut out: W,
) -> Result<Option<Recap>> {
    let mut session = QuizSession::new(bank);
    let mut last_recap = None;
    let mut line = String::new();

    loop {
        let completed = match session.snapshot() {
            Snapshot::InProgress(view) => {
                write_question(&mut out, &view)?;
                false
            }
            Snapshot::Completed(Ok(recap)) => {
                writeln!(out)?;
                write_recap(&mut out, bank.title(), &recap)?;
                writeln!(out, "\n[r] restart  [q] quit")?;
                last_recap = Some(recap);
                true
            }
            Snapshot::Completed(Err(e)) => {
                writeln!(out, "\nWarning: {e}")?;
                writeln!(out, "[r] restart  [q] quit")?;
                true
            }
        };
        write!(out, "> ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        let answer = line.trim();

        if completed {
            match answer {
                "r" => {
                    session.restart();
                    last_recap = None;
                }
                "q" => break,
                _ => writeln!(out, "Type r to restart or q to quit.")?,
            }
            continue;
        }

        match answer {
            "q" => break,
            "b" => show_refusal(&mut out, session.retreat())?,
            _ => {
                let result = apply_answer(&mut session, answer);
                show_refusal(&mut out, result)?;
            }
        }
    }

    Ok(last_recap)
}

fn apply_answer(session: &mut QuizSession<'_>, answer: &str) -> Result<(), QuizError> {
    let Some(question) = session.current_question() else {
        return Err(QuizError::SessionCompleted);
    };

    match &question.kind {
        QuestionKind::MultipleChoice { options } => {
            if !answer.is_empty() {
                let choice = answer
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| options.get(i));
                match choice {
                    Some(option) => session.select_option(&option.text)?,
                    None => {
                        return Err(QuizError::UnknownOption {
                            question_id: question.id,
                            option: answer.to_string(),
                        })
                    }
                }
            }
        }
        QuestionKind::Numeric { .. } => {
            if !answer.is_empty() {
                session.set_input(answer)?;
            }
        }
    }

    session.advance().map(|_| ())
}

/// Print recoverable errors and keep going; anything else aborts the game.
fn show_refusal<W: Write>(out: &mut W, result: Result<(), QuizError>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e @ QuizError::UnknownOption { .. }) => {
            writeln!(out, "! {e}")?;
            Ok(())
        }
        Err(e) if e.is_recoverable() => {
            writeln!(out, "! {e}")?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn write_question<W: Write>(out: &mut W, view: &ProgressView<'_>) -> io::Result<()> {
    let q = view.question;
    writeln!(
        out,
        "\nQuestion {}/{} ({:.0}%)",
        view.question_index + 1,
        view.question_count,
        view.progress_fraction * 100.0
    )?;
    writeln!(out, "{}", q.text)?;

    match &q.kind {
        QuestionKind::MultipleChoice { options } => {
            let selected = view.current_answer.map(|a| a.raw_input.as_str());
            for (i, option) in options.iter().enumerate() {
                let marker = if selected == Some(option.text.as_str()) {
                    "*"
                } else {
                    " "
                };
                writeln!(out, " {marker}{}. {}", i + 1, option.text)?;
            }
        }
        QuestionKind::Numeric { unit, .. } => {
            match unit {
                Some(unit) => writeln!(out, "Enter a value (in {unit}):")?,
                None => writeln!(out, "Enter a value:")?,
            }
            if !view.input.is_empty() {
                writeln!(out, "Current answer: {}", view.input)?;
            }
        }
    }

    let mut hints = Vec::new();
    if view.can_go_back {
        hints.push("[b] back");
    }
    hints.push("[q] quit");
    writeln!(out, "{}", hints.join("  "))
}
