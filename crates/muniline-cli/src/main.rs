//! muniline - municipal open-data extraction pipeline
//!
//! Discovers spreadsheet documents on government results pages, loads
//! their drifting tabular layouts, and emits canonical long-format
//! indicator records partitioned by year.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "muniline")]
#[command(about = "Municipal open-data extraction pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./muniline.toml or ~/.config/muniline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List documents discovered on the portal's listing pages
    Documents(cmd::documents::DocumentsArgs),
    /// Run the extraction pipeline and write per-year indicator files
    Extract(cmd::extract::ExtractArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(muniline_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug  — progress bars show activity
    //   non-TTY: info unless --debug          — logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    muniline_core::init_logging(quiet, cli.debug, multi);

    // Load configuration
    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Documents(args) => cmd::documents::run(args, &config),
        Command::Extract(args) => cmd::extract::run(args, &config, &progress),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec!["Portal home", &config.portal.home_url]);
            table.add_row(vec!["Results page", &config.portal.results_url]);
            table.add_row(vec!["Listing marker", &config.portal.listing_marker]);
            table.add_row(vec!["Files marker", &config.portal.files_marker]);
            table.add_row(vec![
                "Output directory",
                &config.output.default_dir.display().to_string(),
            ]);
            table.add_row(vec!["Timeout", &format!("{}s", config.http.timeout)]);
            table.add_row(vec![
                "Workers",
                &format!("{} (max: {})", config.workers.default, config.workers.max),
            ]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
