//! HTML recap generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use antigaspi_core::recap::{ChartSplit, FeedbackTier};
use antigaspi_core::report::{fmt_score, RecapReport};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn tier_class(tier: FeedbackTier) -> &'static str {
    match tier {
        FeedbackTier::High => "high",
        FeedbackTier::Medium => "medium",
        FeedbackTier::Low => "low",
    }
}

/// Generate an HTML page from a recap report.
pub fn generate_html(report: &RecapReport) -> String {
    let recap = &report.recap;
    let title = report.bank.title.as_deref().unwrap_or("Quiz recap");
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", html_escape(title)));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(title)));
    html.push_str(&format!(
        "<p class=\"meta\">Theme: <strong>{}</strong> | {} questions | {}</p>\n",
        html_escape(&report.bank.theme),
        report.bank.question_count,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Score and feedback
    html.push_str(&format!(
        "<section class=\"score {}\">\n",
        tier_class(recap.tier)
    ));
    html.push_str(&format!(
        "<p class=\"percentage\">{}%</p>\n",
        recap.rounded_percentage
    ));
    html.push_str(&format!(
        "<p class=\"meta\">Score {} (best {}, worst {})</p>\n",
        fmt_score(recap.total_score),
        fmt_score(recap.bounds.min),
        fmt_score(recap.bounds.max)
    ));
    html.push_str(&generate_doughnut(&recap.chart));
    html.push_str(&format!(
        "<p class=\"narrative\">{}</p>\n",
        html_escape(&recap.narrative)
    ));
    html.push_str(&format!(
        "<blockquote class=\"tip\">{}</blockquote>\n",
        html_escape(&recap.tip)
    ));
    html.push_str("</section>\n");

    // Metrics
    html.push_str("<section class=\"metrics\">\n");
    html.push_str("<h2>Metrics</h2>\n");
    html.push_str("<table>\n<tbody>\n");
    html.push_str(&format!(
        "<tr><th>Estimated annual waste</th><td>{} {}</td></tr>\n",
        fmt_score(recap.metrics.estimated_annual_waste),
        html_escape(&recap.metrics.unit)
    ));
    html.push_str(&format!(
        "<tr><th>Potential savings</th><td>{} {}</td></tr>\n",
        fmt_score(recap.metrics.potential_savings),
        html_escape(&recap.metrics.unit)
    ));
    if let Some(cost) = &recap.metrics.annual_waste_cost {
        html.push_str(&format!(
            "<tr><th>Annual waste cost</th><td>{:.2} {}</td></tr>\n",
            cost.amount,
            html_escape(&cost.currency)
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Per-question breakdown
    html.push_str("<section class=\"answers\">\n");
    html.push_str("<h2>Answers</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>#</th><th>Question</th><th>Answer</th><th>Score</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for (i, entry) in recap.breakdown.iter().enumerate() {
        let class = if entry.score.is_some() {
            "answered"
        } else {
            "unanswered"
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            i + 1,
            html_escape(&entry.question_text),
            html_escape(&entry.answer_text),
            entry.score.map(fmt_score).unwrap_or_else(|| "-".into())
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML recap to a file.
pub fn write_html_report(report: &RecapReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// Two-segment doughnut drawn with stroke dash offsets on a circle of
/// circumference 100.
fn generate_doughnut(chart: &ChartSplit) -> String {
    let total = chart.good + chart.bad;
    let good = if total > 0.0 {
        chart.good / total * 100.0
    } else {
        100.0
    };
    let bad = 100.0 - good;

    let mut svg = String::from(
        "<svg class=\"doughnut\" width=\"220\" height=\"220\" viewBox=\"0 0 42 42\" xmlns=\"http://www.w3.org/2000/svg\">\n",
    );
    svg.push_str(
        "  <circle cx=\"21\" cy=\"21\" r=\"15.9155\" fill=\"transparent\" stroke=\"var(--border)\" stroke-width=\"6\"/>\n",
    );
    svg.push_str(&format!(
        "  <circle cx=\"21\" cy=\"21\" r=\"15.9155\" fill=\"transparent\" stroke=\"#22c55e\" stroke-width=\"6\" stroke-dasharray=\"{good:.2} {bad:.2}\" stroke-dashoffset=\"25\"><title>{}</title></circle>\n",
        html_escape(&chart.good_label)
    ));
    if bad > 0.0 {
        svg.push_str(&format!(
            "  <circle cx=\"21\" cy=\"21\" r=\"15.9155\" fill=\"transparent\" stroke=\"#ef4444\" stroke-width=\"6\" stroke-dasharray=\"{bad:.2} {good:.2}\" stroke-dashoffset=\"{:.2}\"><title>{}</title></circle>\n",
            125.0 - good,
            html_escape(&chart.bad_label)
        ));
    }
    svg.push_str("</svg>\n");

    svg.push_str("<ul class=\"legend\">\n");
    svg.push_str(&format!(
        "<li><span class=\"swatch good\"></span>{} {:.0}</li>\n",
        html_escape(&chart.good_label),
        good
    ));
    svg.push_str(&format!(
        "<li><span class=\"swatch bad\"></span>{} {:.0}</li>\n",
        html_escape(&chart.bad_label),
        bad
    ));
    svg.push_str("</ul>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --high: #dcfce7; --medium: #fef9c3; --low: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --high: #064e3b; --medium: #713f12; --low: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); max-width: 56rem; }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.score { padding: 1rem 2rem; border-radius: 8px; }
.score.high { background: var(--high); }
.score.medium { background: var(--medium); }
.score.low { background: var(--low); }
.percentage { font-size: 3rem; font-weight: bold; margin: 0.5rem 0; }
.tip { border-left: 4px solid var(--border); margin: 1rem 0; padding-left: 1rem; font-style: italic; }
.legend { list-style: none; padding: 0; }
.swatch { display: inline-block; width: 0.8rem; height: 0.8rem; margin-right: 0.5rem; border-radius: 2px; }
.swatch.good { background: #22c55e; }
.swatch.bad { background: #ef4444; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
thead th { background: var(--border); }
.unanswered td { color: #6b7280; font-style: italic; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;
