//! Engine configuration

use std::time::Duration;

use muniline_crawl::{DocumentKind, Module};

/// Runtime configuration for one extraction run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Portal home page, crawled to discover listing pages
    pub home_url: String,
    /// Known default results page
    pub results_url: String,
    /// Explicit results page; skips listing discovery when set
    pub listing_url: Option<String>,
    /// Path convention of result-listing pages
    pub listing_marker: String,
    /// Path convention of hosted files, excluded from listing discovery
    pub files_marker: String,
    /// Document kinds to process; `None` keeps every kind
    pub kinds: Option<Vec<DocumentKind>>,
    /// Topical modules to process; `None` keeps every module
    pub modules: Option<Vec<Module>>,
    /// Re-download and re-extract files already staged this run
    pub overwrite: bool,
    /// Total timeout applied to every page fetch and download
    pub timeout: Duration,
    /// Parallel document workers; 1 degenerates to sequential
    pub workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2);
        Self {
            home_url: "https://www.gov.br/cidades/pt-br/acesso-a-informacao/acoes-e-programas/saneamento/sinisa".to_string(),
            results_url: "https://www.gov.br/cidades/pt-br/acesso-a-informacao/acoes-e-programas/saneamento/sinisa/resultados-sinisa".to_string(),
            listing_url: None,
            listing_marker: "/resultados-sinisa/".to_string(),
            files_marker: "/arquivos/".to_string(),
            kinds: Some(vec![DocumentKind::Spreadsheet]),
            modules: None,
            overwrite: false,
            timeout: Duration::from_secs(120),
            workers: cpus.min(4),
        }
    }
}

impl EngineConfig {
    pub fn wants_kind(&self, kind: DocumentKind) -> bool {
        self.kinds.as_ref().map_or(true, |kinds| kinds.contains(&kind))
    }

    pub fn wants_module(&self, module: Option<Module>) -> bool {
        match (&self.modules, module) {
            (None, _) => true,
            (Some(wanted), Some(module)) => wanted.contains(&module),
            (Some(_), None) => false,
        }
    }
}
