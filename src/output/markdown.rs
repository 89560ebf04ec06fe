//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a finished
//! run: how it ended, what was found, and what failed.

use crate::output::traits::{OutputResult, RunReport};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of the run to `output_path`
///
/// # Arguments
///
/// * `report` - The finished run
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_report(report: &RunReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run report as markdown
pub fn format_markdown_report(report: &RunReport) -> String {
    let mut md = String::new();

    md.push_str("# Sumi-Scan Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", report.seed));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        report.finished_at.to_rfc3339()
    ));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        report.elapsed.as_secs_f64()
    ));
    md.push_str(&format!("- **Stopped**: {}\n", report.stop_reason));
    md.push_str(&format!(
        "- **Final Depth Bound**: {}\n\n",
        report.final_depth_bound
    ));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages**: {}\n", report.pages.len()));
    md.push_str(&format!("- **Errors**: {}\n", report.errors.len()));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        report.success_rate()
    ));

    // Scan attempt breakdown
    let stats = &report.stats;
    md.push_str("## Scan Attempts\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| Started | {} |\n", stats.attempts));
    md.push_str(&format!("| Fetched | {} |\n", stats.fetched));
    md.push_str(&format!("| Failed | {} |\n", stats.failed));
    md.push_str(&format!("| Dispatched | {} |\n", stats.dispatched));
    md.push_str(&format!("| Dropped | {} |\n", stats.dropped));
    md.push_str(&format!("| Rejected | {} |\n", stats.total_rejected()));
    for reason in crate::state::RejectReason::all() {
        md.push_str(&format!(
            "| Rejected ({}) | {} |\n",
            reason,
            stats.rejected(reason)
        ));
    }
    md.push('\n');

    if !report.pages.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| URL | Title |\n");
        md.push_str("|-----|-------|\n");
        for page in &report.pages {
            md.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&page.url),
                escape_cell(&page.title)
            ));
        }
        md.push('\n');
    }

    if !report.errors.is_empty() {
        md.push_str("## Errors\n\n");
        for error in &report.errors {
            md.push_str(&format!("- `{}`: {}\n", error.url, error.message));
        }
        md.push('\n');
    }

    md
}

/// Escapes characters that would break a markdown table cell
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
