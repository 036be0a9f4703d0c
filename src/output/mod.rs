//! Output module for rendering crawl summaries
//!
//! This module handles:
//! - Printing a crawl summary to stdout
//! - Exporting a markdown report of the run

mod summary;

pub use summary::{format_markdown_summary, print_summary, write_markdown_summary};
