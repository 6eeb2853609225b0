//! Muniline Extract - schema inference and long-format record assembly
//!
//! Takes the tables loaded from discovered documents, infers which
//! column carries the municipality code and which carries the year,
//! parses every cell into a canonical typed value, and emits long-format
//! records `(entity_code, year, indicator, value)` partitioned by year.
//!
//! # Example
//!
//! ```no_run
//! use muniline_extract::{EngineConfig, run};
//! use muniline_core::ProgressContext;
//!
//! let config = EngineConfig::default();
//! let progress = ProgressContext::new();
//! let outcome = run(&config, &progress).expect("extraction failed");
//! for dataset in &outcome.datasets {
//!     println!("{}: {} records", dataset.year, dataset.records.len());
//! }
//! ```

pub mod assemble;
pub mod config;
pub mod partition;
pub mod records;
pub mod roles;
pub mod runner;
pub mod value;

// Re-exports for convenience
pub use config::EngineConfig;
pub use records::{LongRecord, YearDataset};
pub use roles::{ColumnRoles, YearSource, infer_roles};
pub use runner::{RunOutcome, RunSummary, run};
pub use value::{CanonicalValue, ValueKind, parse_cell};
