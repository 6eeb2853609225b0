//! Muniline Core - common infrastructure for municipal data pipelines
//!
//! This crate provides the shared building blocks used by the crawling,
//! ingestion, and extraction crates: HTTP fetching, retry, the scoped
//! staging area, text/code normalization, logging, and progress display.

pub mod fetch;
pub mod logging;
pub mod normalize;
pub mod progress;
pub mod retry;
pub mod staging;

// Re-exports for convenience
pub use fetch::{FetchError, download_document, fetch_html};
pub use logging::init_logging;
pub use normalize::{extract_year, normalize_entity_code, normalize_label, normalize_name};
pub use progress::{ProgressContext, SharedProgress};
pub use retry::retry_with_backoff;
pub use staging::StagingArea;
