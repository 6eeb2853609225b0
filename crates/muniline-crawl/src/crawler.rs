//! Listing-page crawling: anchor extraction, URL resolution, seed
//! discovery, and cross-page deduplication.

use std::collections::BTreeSet;
use std::sync::LazyLock;
use std::time::Duration;

use rustc_hash::FxHashSet;
use scraper::{Html, Selector};
use url::Url;

use muniline_core::fetch::fetch_html;

use crate::link::{DocumentLink, is_downloadable};

// Static CSS selector, valid by construction
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

/// Resolve an anchor href against its page URL.
///
/// Fragment-only, mailto: and javascript: targets are dropped. A trailing
/// `/view` path segment is stripped: the portal CMS serves a preview page
/// there while the file itself lives one level up.
pub fn resolve_href(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("mailto:") || lowered.starts_with("javascript:") {
        return None;
    }

    let mut absolute = base.join(href).ok()?;
    if absolute.path().ends_with("/view") {
        let trimmed = absolute.path().strip_suffix("/view")?.to_string();
        absolute.set_path(&trimmed);
    }
    Some(absolute)
}

/// Extract all `(resolved url, text)` anchor pairs from an HTML page.
pub fn extract_anchors(html: &str, base: &Url) -> Vec<(Url, String)> {
    let document = Html::parse_document(html);
    let mut anchors = Vec::new();
    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_href(href, base) else {
            continue;
        };
        let text = element
            .text()
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        anchors.push((url, text));
    }
    anchors
}

/// Collect candidate listing-page URLs from a seed page's anchors.
///
/// A candidate contains the listing path marker, is not under the files
/// path, and is not itself a document.
pub fn listing_candidates(
    anchors: &[(Url, String)],
    listing_marker: &str,
    files_marker: &str,
) -> Vec<String> {
    let mut candidates = Vec::new();
    for (url, _) in anchors {
        if is_downloadable(url) {
            continue;
        }
        let s = url.as_str();
        if !s.contains(listing_marker) || s.contains(files_marker) {
            continue;
        }
        candidates.push(s.trim_end_matches('/').to_string());
    }
    candidates
}

/// Crawls the portal's listing pages and returns classified document links.
pub struct Crawler {
    /// Portal home page, used to discover listing pages
    pub home_url: String,
    /// Known default results page
    pub results_url: String,
    /// Path convention of result-listing pages
    pub listing_marker: String,
    /// Path convention of hosted files (excluded from listing discovery)
    pub files_marker: String,
    /// Total timeout for each page fetch
    pub timeout: Duration,
}

impl Crawler {
    /// Discover document links from every resolved listing page.
    ///
    /// Classification runs on the full discovered set; any kind/module
    /// filtering is the caller's concern. A fetch failure skips that one
    /// page and crawling continues.
    pub fn discover(&self, results_url: Option<&str>) -> Vec<DocumentLink> {
        let pages = self.listing_pages(results_url);
        log::debug!("crawling {} listing page(s)", pages.len());

        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut documents = Vec::new();

        for page in &pages {
            let html = match fetch_html(page, self.timeout) {
                Ok(html) => html,
                Err(e) => {
                    log::warn!("skipping listing page {page}: {e}");
                    continue;
                }
            };
            let Ok(base) = Url::parse(page) else {
                continue;
            };
            for (url, text) in extract_anchors(&html, &base) {
                if !is_downloadable(&url) {
                    continue;
                }
                if !seen.insert(url.to_string()) {
                    continue;
                }
                documents.push(DocumentLink::classify(url, text));
            }
        }

        log::info!("discovered {} document link(s)", documents.len());
        documents
    }

    /// Resolve which listing pages to crawl.
    ///
    /// An explicit results URL short-circuits discovery. Otherwise the
    /// known entry pages are visited and every linked listing page is
    /// collected, ranked most-recent-first (descending URL order is the
    /// deterministic tie-break the portal's year-suffixed paths give us).
    fn listing_pages(&self, results_url: Option<&str>) -> Vec<String> {
        if let Some(url) = results_url {
            return vec![url.to_string()];
        }

        let mut candidates: BTreeSet<String> = BTreeSet::new();
        candidates.insert(self.results_url.trim_end_matches('/').to_string());

        for seed in [&self.home_url, &self.results_url] {
            let html = match fetch_html(seed, self.timeout) {
                Ok(html) => html,
                Err(e) => {
                    log::warn!("skipping seed page {seed}: {e}");
                    continue;
                }
            };
            let Ok(base) = Url::parse(seed) else {
                continue;
            };
            let anchors = extract_anchors(&html, &base);
            candidates.extend(listing_candidates(
                &anchors,
                &self.listing_marker,
                &self.files_marker,
            ));
        }

        candidates.into_iter().rev().collect()
    }
}
