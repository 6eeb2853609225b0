//! Documents subcommand - list discovered and classified links

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use muniline_crawl::{Crawler, DocumentKind, Module};

use crate::cmd::{KindArg, ModuleArg};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct DocumentsArgs {
    /// Results page URL (discovered from the portal home when omitted)
    #[arg(short, long)]
    pub url: Option<String>,

    /// Keep only these document kinds (comma-separated; default: all)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub kinds: Vec<KindArg>,

    /// Keep only these modules (comma-separated; default: all)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub modules: Vec<ModuleArg>,

    /// Request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,
}

pub fn run(args: DocumentsArgs, config: &Config) -> Result<()> {
    let crawler = Crawler {
        home_url: config.portal.home_url.clone(),
        results_url: config.portal.results_url.clone(),
        listing_marker: config.portal.listing_marker.clone(),
        files_marker: config.portal.files_marker.clone(),
        timeout: Duration::from_secs(args.timeout.unwrap_or(config.http.timeout)),
    };

    let kinds: Vec<DocumentKind> = args.kinds.iter().map(|&k| k.into()).collect();
    let modules: Vec<Module> = args.modules.iter().map(|&m| m.into()).collect();

    // Classification runs on everything; the filters only trim the view
    let documents: Vec<_> = crawler
        .discover(args.url.as_deref())
        .into_iter()
        .filter(|doc| kinds.is_empty() || kinds.contains(&doc.kind))
        .filter(|doc| {
            modules.is_empty() || doc.module.map_or(false, |m| modules.contains(&m))
        })
        .collect();

    if documents.is_empty() {
        eprintln!("no documents matched");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Kind").fg(Color::Cyan),
            Cell::new("Module").fg(Color::Cyan),
            Cell::new("Link text").fg(Color::Cyan),
            Cell::new("File").fg(Color::Cyan),
        ]);

    for doc in &documents {
        let text: String = doc.text.chars().take(48).collect();
        table.add_row(vec![
            doc.kind.to_string(),
            doc.module.map(|m| m.to_string()).unwrap_or_default(),
            text,
            doc.file_name().to_string(),
        ]);
    }

    eprintln!("\n{table}");
    eprintln!("{} document(s)", documents.len());
    Ok(())
}
