//! Markdown recap output.

use anyhow::{Context, Result};
use std::path::Path;

use antigaspi_core::report::RecapReport;

/// Generate a markdown recap.
pub fn generate_markdown(report: &RecapReport) -> String {
    let mut md = report.to_markdown();
    md.push_str(&format!(
        "\n_Generated {} (report {})_\n",
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.id
    ));
    md
}

/// Write a markdown recap to a file.
pub fn write_markdown_report(report: &RecapReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, generate_markdown(report))
        .with_context(|| format!("failed to write markdown report to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::make_test_report;

    #[test]
    fn markdown_has_footer() {
        let report = make_test_report();
        let md = generate_markdown(&report);
        assert!(md.starts_with("# Bilan anti-gaspi"));
        assert!(md.contains("| Annual waste cost | 520.00 € |"));
        assert!(md.contains(&report.id.to_string()));
    }

    #[test]
    fn markdown_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recap.md");

        write_markdown_report(&report, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("## Answers"));
    }
}
