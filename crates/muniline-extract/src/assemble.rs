//! Long-format assembly: one table in, canonical records out.

use rustc_hash::FxHashSet;

use muniline_core::normalize::normalize_name;
use muniline_tabular::RawTable;

use crate::records::LongRecord;
use crate::roles::{ColumnRoles, YearSource, cell_entity_code, cell_year};
use crate::value::{CanonicalValue, parse_cell};

/// Columns that describe the entity rather than measure anything; never
/// emitted as indicators.
pub const METADATA_COLUMNS: &[&str] = &[
    "municipio",
    "nome_municipio",
    "uf",
    "estado",
    "sigla_uf",
    "regiao",
    "microrregiao",
    "mesorregiao",
    "prestador",
    "prestador_nome",
    "servico",
    "sistema",
    "localidade",
    "codigo_localidade",
    "descricao",
    "tipo",
    "classe",
];

/// An all-text column with more distinct values than this is treated as
/// free-text description, not an indicator.
const MAX_TEXT_DISTINCT: usize = 20;

/// Module tag used when a document carries no topical module.
pub const DEFAULT_MODULE_TAG: &str = "GENERAL";

/// Assemble long-format records from a table with inferred roles.
///
/// A row contributes only when both its entity code and year resolve.
/// Indicator names are `MODULE_FILESTEM_COLUMN`, every part normalized
/// to the same uppercase underscore convention. Records come out in
/// column-major order: all rows of the first kept indicator, then the
/// next, preserving row order within each.
pub fn assemble(
    table: &RawTable,
    roles: &ColumnRoles,
    module_tag: Option<&str>,
    file_stem: &str,
) -> Vec<LongRecord> {
    let n_rows = table.n_rows();

    let entities: Vec<Option<i64>> = table
        .column(roles.entity)
        .iter()
        .map(cell_entity_code)
        .collect();

    let (years, year_column): (Vec<Option<i32>>, Option<usize>) = match roles.year {
        YearSource::Column(idx) => (table.column(idx).iter().map(cell_year).collect(), Some(idx)),
        YearSource::Constant(year) => (vec![Some(year); n_rows], None),
    };

    let valid: Vec<bool> = entities
        .iter()
        .zip(&years)
        .map(|(e, y)| e.is_some() && y.is_some())
        .collect();
    if !valid.iter().any(|v| *v) {
        return Vec::new();
    }

    let module = module_tag.unwrap_or(DEFAULT_MODULE_TAG);
    let stem = normalize_name(file_stem);

    let mut records = Vec::new();
    for col in 0..table.n_cols() {
        if col == roles.entity || Some(col) == year_column {
            continue;
        }
        let name = &table.columns()[col];
        if METADATA_COLUMNS.iter().any(|m| name.eq_ignore_ascii_case(m)) {
            continue;
        }

        let parsed: Vec<CanonicalValue> = table.column(col).iter().map(parse_cell).collect();
        let kept: Vec<usize> = (0..n_rows)
            .filter(|&row| valid[row] && !parsed[row].is_absent())
            .collect();
        if kept.is_empty() {
            continue;
        }

        if is_descriptive_text(&parsed, &kept) {
            log::debug!("{file_stem}: skipping free-text column {name}");
            continue;
        }

        let indicator = format!("{module}_{stem}_{name}");
        for &row in &kept {
            let (Some(entity_code), Some(year)) = (entities[row], years[row]) else {
                continue;
            };
            records.push(LongRecord {
                entity_code,
                year,
                indicator: indicator.clone(),
                value: parsed[row].clone(),
            });
        }
    }
    records
}

/// True when every kept value is text and the distinct count exceeds the
/// indicator ceiling — the signature of a description column.
fn is_descriptive_text(parsed: &[CanonicalValue], kept: &[usize]) -> bool {
    let mut distinct: FxHashSet<&str> = FxHashSet::default();
    for &row in kept {
        match &parsed[row] {
            CanonicalValue::Text(s) => {
                distinct.insert(s.as_str());
            }
            _ => return false,
        }
    }
    distinct.len() > MAX_TEXT_DISTINCT
}
