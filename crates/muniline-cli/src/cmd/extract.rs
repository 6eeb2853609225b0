//! Extract subcommand - run the pipeline and write per-year files

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use muniline_core::SharedProgress;
use muniline_extract::{EngineConfig, YearDataset};

use crate::cmd::{KindArg, ModuleArg};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Results page URL (discovered from the portal home when omitted)
    #[arg(short, long)]
    pub url: Option<String>,

    /// Document kinds to process (comma-separated)
    #[arg(short, long, value_enum, value_delimiter = ',', default_value = "spreadsheet")]
    pub kinds: Vec<KindArg>,

    /// Process every document kind
    #[arg(long, conflicts_with = "kinds")]
    pub all_kinds: bool,

    /// Modules to process (comma-separated; default: all)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub modules: Vec<ModuleArg>,

    /// Output directory for per-year indicator files
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Re-download and re-extract files already staged this run
    #[arg(long)]
    pub overwrite: bool,

    /// Request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Number of parallel document workers
    #[arg(short, long)]
    pub workers: Option<usize>,
}

pub fn run(args: ExtractArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let engine_config = EngineConfig {
        home_url: config.portal.home_url.clone(),
        results_url: config.portal.results_url.clone(),
        listing_url: args.url.clone(),
        listing_marker: config.portal.listing_marker.clone(),
        files_marker: config.portal.files_marker.clone(),
        kinds: if args.all_kinds {
            None
        } else {
            Some(args.kinds.iter().map(|&k| k.into()).collect())
        },
        modules: if args.modules.is_empty() {
            None
        } else {
            Some(args.modules.iter().map(|&m| m.into()).collect())
        },
        overwrite: args.overwrite,
        timeout: Duration::from_secs(args.timeout.unwrap_or(config.http.timeout)),
        workers: args
            .workers
            .unwrap_or(config.workers.default)
            .clamp(1, config.workers.max.max(1)),
    };

    let outcome = muniline_extract::run(&engine_config, progress)?;

    if outcome.datasets.is_empty() {
        // A legitimate outcome: the portal may have changed beyond
        // recognition or the filters excluded everything
        eprintln!("no records extracted");
        return Ok(());
    }

    let out_dir = args.out.unwrap_or_else(|| config.output.default_dir.clone());
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Year").fg(Color::Cyan),
            Cell::new("Records").fg(Color::Cyan),
            Cell::new("Indicators").fg(Color::Cyan),
            Cell::new("File").fg(Color::Cyan),
        ]);

    for dataset in &outcome.datasets {
        let path = write_year_csv(dataset, &out_dir)?;
        table.add_row(vec![
            dataset.year.to_string(),
            dataset.len().to_string(),
            dataset.indicator_kinds().len().to_string(),
            path.display().to_string(),
        ]);
    }

    eprintln!("\n{table}");
    Ok(())
}

/// Write one per-year dataset as a `;`-separated long-format file.
fn write_year_csv(dataset: &YearDataset, out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(format!("indicators_{}.csv", dataset.year));
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(["entity_code", "year", "indicator", "value"])?;
    for record in &dataset.records {
        writer.write_record([
            record.entity_code.to_string(),
            record.year.to_string(),
            record.indicator.clone(),
            record.value.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(path)
}
