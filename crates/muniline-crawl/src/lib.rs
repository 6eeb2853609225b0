//! Muniline Crawl - document discovery on portal listing pages
//!
//! Fetches result-listing pages, extracts and resolves anchor links, and
//! classifies each link into a document kind and topical module using
//! keyword heuristics over the link text and filename.

pub mod crawler;
pub mod link;

// Re-exports for convenience
pub use crawler::{Crawler, extract_anchors, resolve_href};
pub use link::{DocumentKind, DocumentLink, Module, classify_kind, classify_module};
