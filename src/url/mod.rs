//! URL handling module for Kumo
//!
//! Provides the normalization used by the crawl queue to decide whether two
//! URL strings refer to the same fetch target.

mod normalize;

pub use normalize::normalize_url;
