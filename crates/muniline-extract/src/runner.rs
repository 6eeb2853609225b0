//! Pipeline orchestration: discover, download, unpack, load, infer,
//! assemble, partition.
//!
//! Every stage is skip-and-continue; the worst case is an empty result
//! set, never a crash. The staging area lives exactly as long as the
//! call and is removed on every exit path.

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use muniline_core::progress::ProgressContext;
use muniline_core::retry::retry_with_backoff;
use muniline_core::staging::StagingArea;
use muniline_core::download_document;
use muniline_crawl::link::{SPREADSHEET_FILE_EXTENSIONS, is_spreadsheet_source};
use muniline_crawl::{Crawler, DocumentKind, DocumentLink};
use muniline_tabular::{extract_zip, is_spreadsheet_file, load_table};

use crate::assemble::assemble;
use crate::config::EngineConfig;
use crate::partition::partition_by_year;
use crate::records::{LongRecord, YearDataset};
use crate::roles::infer_roles;

/// A failed download is retried this many extra times, then abandoned.
const DOWNLOAD_RETRIES: u32 = 1;

/// Result of one extraction run.
#[derive(Debug)]
pub struct RunOutcome {
    pub datasets: Vec<YearDataset>,
    pub summary: RunSummary,
}

/// Counters for one extraction run.
#[derive(Debug)]
pub struct RunSummary {
    pub documents_discovered: usize,
    pub documents_selected: usize,
    pub documents_failed: usize,
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub records: usize,
    pub years: usize,
    pub elapsed: std::time::Duration,
}

impl RunSummary {
    pub fn log(&self) {
        log::info!("=== Extraction Summary ===");
        log::info!(
            "Documents: {}/{} processed ({} failed)",
            self.documents_selected - self.documents_failed,
            self.documents_selected,
            self.documents_failed
        );
        log::info!(
            "Files: {} loaded, {} skipped",
            self.files_loaded,
            self.files_skipped
        );
        log::info!("Records: {} across {} year(s)", self.records, self.years);
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}

/// Worker-local result for one document; folded after the parallel
/// section so no shared state mutates during iteration.
struct DocOutcome {
    index: usize,
    records: Vec<LongRecord>,
    files_loaded: usize,
    files_skipped: usize,
    failed: bool,
}

/// Run the extraction pipeline.
pub fn run(config: &EngineConfig, progress: &ProgressContext) -> anyhow::Result<RunOutcome> {
    let start = Instant::now();
    let staging = StagingArea::new()?;

    let crawler = Crawler {
        home_url: config.home_url.clone(),
        results_url: config.results_url.clone(),
        listing_marker: config.listing_marker.clone(),
        files_marker: config.files_marker.clone(),
        timeout: config.timeout,
    };

    let discovered = crawler.discover(config.listing_url.as_deref());
    let documents_discovered = discovered.len();

    // Classification already ran on the full set; filters only select
    let documents: Vec<DocumentLink> = discovered
        .into_iter()
        .filter(|doc| config.wants_kind(doc.kind) && config.wants_module(doc.module))
        .filter(|doc| doc.kind == DocumentKind::Spreadsheet && is_spreadsheet_source(&doc.url))
        .collect();
    log::info!(
        "{} of {} documents selected for extraction",
        documents.len(),
        documents_discovered
    );

    if documents.is_empty() {
        return Ok(RunOutcome {
            datasets: Vec::new(),
            summary: RunSummary {
                documents_discovered,
                documents_selected: 0,
                documents_failed: 0,
                files_loaded: 0,
                files_skipped: 0,
                records: 0,
                years: 0,
                elapsed: start.elapsed(),
            },
        });
    }

    let workers = config.workers.clamp(1, documents.len());
    log::info!("processing {} documents with {workers} worker(s)", documents.len());

    let overall = progress.overall_bar(documents.len());
    let next_index = AtomicUsize::new(0);
    let outcomes: Mutex<Vec<DocOutcome>> = Mutex::new(Vec::new());

    rayon::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|_| {
                loop {
                    // Atomically claim the next document
                    let index = next_index.fetch_add(1, Ordering::SeqCst);
                    if index >= documents.len() {
                        break;
                    }
                    let doc = &documents[index];

                    let pb = progress.document_bar(doc.file_name());
                    let outcome = process_document(index, doc, &staging, config, &pb);
                    pb.finish_and_clear();
                    overall.inc(1);
                    outcomes.lock().unwrap().push(outcome);
                }
            });
        }
    });
    overall.finish_and_clear();

    // Fold worker-local buffers in claim order so parallel execution
    // cannot change the output
    let mut outcomes = outcomes.into_inner().unwrap();
    outcomes.sort_by_key(|o| o.index);

    let documents_selected = documents.len();
    let documents_failed = outcomes.iter().filter(|o| o.failed).count();
    let files_loaded = outcomes.iter().map(|o| o.files_loaded).sum();
    let files_skipped = outcomes.iter().map(|o| o.files_skipped).sum();

    let mut records = Vec::new();
    for outcome in outcomes {
        records.extend(outcome.records);
    }

    let datasets = partition_by_year(records);
    let summary = RunSummary {
        documents_discovered,
        documents_selected,
        documents_failed,
        files_loaded,
        files_skipped,
        records: datasets.iter().map(YearDataset::len).sum(),
        years: datasets.len(),
        elapsed: start.elapsed(),
    };
    summary.log();

    Ok(RunOutcome { datasets, summary })
}

/// Download, unpack, and extract one document into local records.
fn process_document(
    index: usize,
    doc: &DocumentLink,
    staging: &StagingArea,
    config: &EngineConfig,
    pb: &indicatif::ProgressBar,
) -> DocOutcome {
    let name = doc.file_name();
    let mut outcome = DocOutcome {
        index,
        records: Vec::new(),
        files_loaded: 0,
        files_skipped: 0,
        failed: false,
    };

    pb.set_message("downloading");
    let downloaded = retry_with_backoff(name, DOWNLOAD_RETRIES, || {
        download_document(
            doc.url.as_str(),
            name,
            staging.raw_dir(),
            config.timeout,
            config.overwrite,
        )
    });
    let path = match downloaded {
        Ok(path) => path,
        Err(e) => {
            log::warn!("{name}: download failed: {e}");
            outcome.failed = true;
            return outcome;
        }
    };

    let mut files = Vec::new();
    let is_zip = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("zip"));
    if is_zip {
        pb.set_message("extracting");
        match extract_zip(
            &path,
            staging.extracted_dir(),
            SPREADSHEET_FILE_EXTENSIONS,
            config.overwrite,
        ) {
            Ok(extracted) => files.extend(extracted),
            Err(e) => {
                log::warn!("{name}: archive skipped: {e}");
                outcome.failed = true;
                return outcome;
            }
        }
    } else if is_spreadsheet_file(&path) {
        files.push(path);
    }

    for file in &files {
        pb.set_message(format!("parsing {}", display_name(file)));
        match extract_file(file, doc) {
            Some(records) if !records.is_empty() => {
                outcome.files_loaded += 1;
                outcome.records.extend(records);
            }
            _ => outcome.files_skipped += 1,
        }
    }
    outcome
}

/// Load one tabular file and assemble its records. `None` means the file
/// was skipped; inference failures here are routine, not anomalies.
fn extract_file(file: &Path, doc: &DocumentLink) -> Option<Vec<LongRecord>> {
    let table = match load_table(file) {
        Ok(table) => table,
        Err(e) => {
            log::debug!("{}: not loadable: {e}", display_name(file));
            return None;
        }
    };
    if table.is_empty() {
        return None;
    }

    let roles = match infer_roles(&table, file) {
        Ok(roles) => roles,
        Err(e) => {
            log::debug!("{}: {e}", display_name(file));
            return None;
        }
    };

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Some(assemble(
        &table,
        &roles,
        doc.module.map(|m| m.tag()),
        &stem,
    ))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
