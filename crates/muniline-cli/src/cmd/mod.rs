//! CLI subcommands

pub mod documents;
pub mod extract;

use clap::ValueEnum;

use muniline_crawl::{DocumentKind, Module};

/// Document kinds selectable from the command line.
#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum KindArg {
    Spreadsheet,
    Report,
    Glossary,
    Certificate,
    Other,
}

impl From<KindArg> for DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Spreadsheet => DocumentKind::Spreadsheet,
            KindArg::Report => DocumentKind::Report,
            KindArg::Glossary => DocumentKind::Glossary,
            KindArg::Certificate => DocumentKind::Certificate,
            KindArg::Other => DocumentKind::Other,
        }
    }
}

/// Topical modules selectable from the command line.
#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum ModuleArg {
    GestaoMunicipal,
    Agua,
    Esgoto,
    Residuos,
    AguasPluviais,
}

impl From<ModuleArg> for Module {
    fn from(module: ModuleArg) -> Self {
        match module {
            ModuleArg::GestaoMunicipal => Module::MunicipalManagement,
            ModuleArg::Agua => Module::Water,
            ModuleArg::Esgoto => Module::Sewage,
            ModuleArg::Residuos => Module::SolidWaste,
            ModuleArg::AguasPluviais => Module::StormWater,
        }
    }
}
