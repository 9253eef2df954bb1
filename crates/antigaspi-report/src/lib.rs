//! antigaspi-report: Rendered recap output (HTML, markdown).

pub mod html;
pub mod markdown;

pub use html::{generate_html, write_html_report};
pub use markdown::{generate_markdown, write_markdown_report};
