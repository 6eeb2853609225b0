//! Discovered document links and keyword classification.
//!
//! The portal publishes spreadsheets, reports, glossaries, and compliance
//! certificates side by side on the same listing pages, with naming that
//! shifts between releases. Classification normalizes the link text plus
//! filename and tests it against ordered keyword tables; the tables are
//! plain static data so they can be tested without any network access.

use std::fmt;

use url::Url;

use muniline_core::normalize::normalize_label;

/// Coarse content kind of a discovered link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Spreadsheet,
    Report,
    Glossary,
    Certificate,
    Other,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Report => "report",
            Self::Glossary => "glossary",
            Self::Certificate => "certificate",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topical module a document belongs to on the sanitation portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Module {
    MunicipalManagement,
    Water,
    Sewage,
    SolidWaste,
    StormWater,
}

impl Module {
    /// Tag used as the indicator-name prefix.
    pub fn tag(self) -> &'static str {
        match self {
            Self::MunicipalManagement => "GESTAO_MUNICIPAL",
            Self::Water => "AGUA",
            Self::Sewage => "ESGOTO",
            Self::SolidWaste => "RESIDUOS",
            Self::StormWater => "AGUAS_PLUVIAIS",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MunicipalManagement => "gestao_municipal",
            Self::Water => "agua",
            Self::Sewage => "esgoto",
            Self::SolidWaste => "residuos",
            Self::StormWater => "aguas_pluviais",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered keyword table entry; the first matching rule wins.
pub struct KindRule {
    pub kind: DocumentKind,
    pub patterns: &'static [&'static str],
}

/// Kind classification table, tested in order. Patterns are matched as
/// substrings of the normalized `link text + filename` haystack.
pub const KIND_RULES: &[KindRule] = &[
    KindRule {
        kind: DocumentKind::Spreadsheet,
        patterns: &["planilha", "informacoes e indicadores", "indicadores", "spreadsheet"],
    },
    KindRule {
        kind: DocumentKind::Report,
        patterns: &["relatorio", "report"],
    },
    KindRule {
        kind: DocumentKind::Glossary,
        patterns: &["glossario", "glossary"],
    },
    KindRule {
        kind: DocumentKind::Certificate,
        patterns: &["atestado", "adimplencia", "regularidade"],
    },
];

/// Module table entry.
pub struct ModuleRule {
    pub module: Module,
    pub patterns: &'static [&'static str],
}

/// Module classification table, tested in order. Storm water precedes
/// water so "aguas pluviais" is not claimed by the "agua" pattern.
pub const MODULE_RULES: &[ModuleRule] = &[
    ModuleRule {
        module: Module::MunicipalManagement,
        patterns: &["gestao municipal"],
    },
    ModuleRule {
        module: Module::StormWater,
        patterns: &["pluvial", "aguas pluviais", "aguaspluviais"],
    },
    ModuleRule {
        module: Module::Water,
        patterns: &["agua", "abastecimento"],
    },
    ModuleRule {
        module: Module::Sewage,
        patterns: &["esgoto", "esgotamento"],
    },
    ModuleRule {
        module: Module::SolidWaste,
        patterns: &["residuo"],
    },
];

/// Extensions worth surfacing from a listing page at all.
pub const DOWNLOADABLE_EXTENSIONS: &[&str] = &["zip", "xlsx", "xls", "csv", "ods", "pdf"];

/// Extensions a spreadsheet document may arrive as (archives included).
pub const SPREADSHEET_SOURCE_EXTENSIONS: &[&str] = &["zip", "csv", "xlsx", "xls", "ods"];

/// Extensions of the tabular files actually loaded.
pub const SPREADSHEET_FILE_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls", "ods"];

/// A classified document link. Immutable once built.
#[derive(Debug, Clone)]
pub struct DocumentLink {
    pub url: Url,
    pub text: String,
    pub kind: DocumentKind,
    pub module: Option<Module>,
}

impl DocumentLink {
    pub fn classify(url: Url, text: String) -> Self {
        let kind = classify_kind(&text, &url);
        let module = classify_module(&text, &url);
        Self {
            url,
            text,
            kind,
            module,
        }
    }

    /// Last segment of the URL path, used as the staged file name.
    pub fn file_name(&self) -> &str {
        file_name_of(&self.url)
    }
}

fn file_name_of(url: &Url) -> &str {
    url.path().rsplit('/').next().unwrap_or_default()
}

fn path_extension(url: &Url) -> Option<String> {
    let name = file_name_of(url);
    let (_, ext) = name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

fn has_extension(url: &Url, extensions: &[&str]) -> bool {
    path_extension(url).is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// Whether the URL points at a file worth classifying.
pub fn is_downloadable(url: &Url) -> bool {
    has_extension(url, DOWNLOADABLE_EXTENSIONS)
}

/// Whether the URL can yield tabular data (directly or via an archive).
pub fn is_spreadsheet_source(url: &Url) -> bool {
    has_extension(url, SPREADSHEET_SOURCE_EXTENSIONS)
}

fn haystack(text: &str, url: &Url) -> String {
    normalize_label(&format!("{text} {}", file_name_of(url)))
}

/// Decide the document kind for a link. First matching rule wins; no
/// match yields [`DocumentKind::Other`].
pub fn classify_kind(text: &str, url: &Url) -> DocumentKind {
    let hay = haystack(text, url);
    for rule in KIND_RULES {
        if rule.patterns.iter().any(|p| hay.contains(p)) {
            return rule.kind;
        }
    }
    DocumentKind::Other
}

/// Decide the topical module for a link, if any.
pub fn classify_module(text: &str, url: &Url) -> Option<Module> {
    let hay = haystack(text, url);
    for rule in MODULE_RULES {
        if rule.patterns.iter().any(|p| hay.contains(p)) {
            return Some(rule.module);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn kind_from_link_text() {
        let u = url("https://portal.example/arquivos/dados.xlsx");
        assert_eq!(classify_kind("Planilha de Informações e Indicadores", &u), DocumentKind::Spreadsheet);
        assert_eq!(classify_kind("Relatório Temático", &u), DocumentKind::Report);
        assert_eq!(classify_kind("Glossário de termos", &u), DocumentKind::Glossary);
        assert_eq!(classify_kind("Atestado de regularidade", &u), DocumentKind::Certificate);
    }

    #[test]
    fn kind_from_filename_when_text_silent() {
        let u = url("https://portal.example/arquivos/planilha_agua_2023.zip");
        assert_eq!(classify_kind("baixar arquivo", &u), DocumentKind::Spreadsheet);
    }

    #[test]
    fn kind_first_rule_wins() {
        // Matches both the spreadsheet and report tables; spreadsheet is
        // listed first.
        let u = url("https://portal.example/arquivos/indicadores_relatorio.xlsx");
        assert_eq!(classify_kind("", &u), DocumentKind::Spreadsheet);
    }

    #[test]
    fn kind_falls_back_to_other() {
        let u = url("https://portal.example/arquivos/notas.pdf");
        assert_eq!(classify_kind("Notas metodológicas", &u), DocumentKind::Other);
    }

    #[test]
    fn module_accent_insensitive() {
        let u = url("https://portal.example/arquivos/dados.xlsx");
        assert_eq!(classify_module("Módulo Água", &u), Some(Module::Water));
        assert_eq!(classify_module("Esgotamento sanitário", &u), Some(Module::Sewage));
        assert_eq!(classify_module("Resíduos Sólidos", &u), Some(Module::SolidWaste));
        assert_eq!(classify_module("Águas Pluviais", &u), Some(Module::StormWater));
        assert_eq!(classify_module("Gestão Municipal", &u), Some(Module::MunicipalManagement));
    }

    #[test]
    fn module_from_filename_token() {
        let u = url("https://portal.example/arquivos/PlanilhaAguasPluviais2023.zip");
        assert_eq!(classify_module("baixar", &u), Some(Module::StormWater));
    }

    #[test]
    fn module_none_when_unmatched() {
        let u = url("https://portal.example/arquivos/dados_gerais.xlsx");
        assert_eq!(classify_module("dados gerais", &u), None);
    }

    #[test]
    fn downloadable_extensions() {
        assert!(is_downloadable(&url("https://p.example/a/dados.XLSX")));
        assert!(is_downloadable(&url("https://p.example/a/dados.zip")));
        assert!(!is_downloadable(&url("https://p.example/a/pagina")));
        assert!(!is_downloadable(&url("https://p.example/a/foto.png")));
    }

    #[test]
    fn spreadsheet_source_excludes_pdf() {
        assert!(is_spreadsheet_source(&url("https://p.example/a/d.csv")));
        assert!(is_spreadsheet_source(&url("https://p.example/a/d.zip")));
        assert!(!is_spreadsheet_source(&url("https://p.example/a/d.pdf")));
    }

    #[test]
    fn classify_builds_immutable_link() {
        let link = DocumentLink::classify(
            url("https://p.example/resultados/planilha_esgoto_2022.zip"),
            "Planilha Esgoto".to_string(),
        );
        assert_eq!(link.kind, DocumentKind::Spreadsheet);
        assert_eq!(link.module, Some(Module::Sewage));
        assert_eq!(link.file_name(), "planilha_esgoto_2022.zip");
    }
}
