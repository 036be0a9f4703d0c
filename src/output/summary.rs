//! Crawl summary rendering
//!
//! Human-readable renderings of a finished run: a stdout report and a
//! markdown export tied to the configuration hash that produced it.

use crate::crawler::CrawlSummary;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prints a crawl summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  Succeeded: {}", summary.succeeded);
    println!("  Failed: {}", summary.failed);
    println!("  Total fetch attempts: {}", summary.total_attempts);
    println!(
        "  Duration: {:.1}s",
        summary.duration().num_milliseconds() as f64 / 1000.0
    );

    let settled = summary.succeeded + summary.failed;
    let success_rate = if settled > 0 {
        (summary.succeeded as f64 / settled as f64) * 100.0
    } else {
        0.0
    };
    println!("  Success rate: {:.1}%", success_rate);

    if !summary.failures.is_empty() {
        println!("\nFailed URLs ({}):", summary.failures.len());
        for failure in &summary.failures {
            println!(
                "  - {} ({} attempts): {}",
                failure.url, failure.attempts, failure.error
            );
        }
    }
}

/// Formats a crawl summary as markdown
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `config_hash` - Hash of the configuration that produced the run
pub fn format_markdown_summary(summary: &CrawlSummary, config_hash: Option<&str>) -> String {
    let mut md = String::new();

    md.push_str("# Kumo Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        summary.finished_at.to_rfc3339()
    ));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds\n",
        summary.duration().num_milliseconds() as f64 / 1000.0
    ));
    if let Some(hash) = config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Results\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| Succeeded | {} |\n", summary.succeeded));
    md.push_str(&format!("| Failed | {} |\n", summary.failed));
    md.push_str(&format!(
        "| Total attempts | {} |\n\n",
        summary.total_attempts
    ));

    if !summary.failures.is_empty() {
        md.push_str("## Failed URLs\n\n");
        md.push_str("| URL | Attempts | Last Error |\n");
        md.push_str("|-----|----------|------------|\n");
        for failure in &summary.failures {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                failure.url, failure.attempts, failure.error
            ));
        }
        md.push('\n');
    }

    md
}

/// Writes the markdown summary to a file
pub fn write_markdown_summary(
    summary: &CrawlSummary,
    config_hash: Option<&str>,
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_markdown_summary(summary, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}
