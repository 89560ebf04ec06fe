//! Output module for reporting crawl results
//!
//! This module handles:
//! - Streaming accepted results to an output handler as they arrive
//! - Recording crawl statistics
//! - Printing and exporting the final run report

mod markdown;
pub mod stats;
mod traits;

pub use markdown::{format_markdown_report, generate_markdown_report};
pub use stats::{print_statistics, CrawlStats, StatsSnapshot};
pub use traits::{
    CrawledPage, FailedPage, OutputError, OutputHandler, OutputResult, RunReport, StdoutOutput,
};

/// Prints a run report to stdout in a formatted manner
pub fn print_report(report: &RunReport) {
    println!();
    println!("=== Crawl Report ===\n");

    println!("Overview:");
    println!("  Seed: {}", report.seed);
    println!("  Stopped: {}", report.stop_reason);
    println!("  Elapsed: {:.2}s", report.elapsed.as_secs_f64());
    println!("  Final depth bound: {}", report.final_depth_bound);
    println!("  Pages: {}", report.pages.len());
    println!("  Errors: {}", report.errors.len());
    println!();

    print_statistics(&report.stats);

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for error in &report.errors {
            println!("  - {}", error.message);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} results)",
        report.success_rate(),
        report.pages.len(),
        report.total_results()
    );
}
