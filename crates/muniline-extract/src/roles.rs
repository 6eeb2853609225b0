//! Column role inference: which column is the entity code, where the
//! year comes from.
//!
//! Alias matches are cheap and tried first. When no alias fits, the
//! entity column is chosen by scoring how many sampled cells normalize
//! to a plausible municipality code; a column only wins with a clear
//! majority, otherwise the whole file is skipped. Year information may
//! come from a column or, failing that, from a 4-digit token in the
//! file's own path — yearly releases encode it in the filename.

use std::path::Path;

use muniline_core::normalize::{extract_year, normalize_entity_code};
use muniline_tabular::{RawCell, RawTable};

/// Column names that directly identify the entity-code column.
pub const ENTITY_ALIASES: &[&str] = &[
    "codigo_municipio",
    "cod_municipio",
    "municipio_codigo",
    "id_municipio",
    "id_municipio_ibge",
    "cod_ibge",
    "ibge",
];

/// Column names that directly identify the year column.
pub const YEAR_ALIASES: &[&str] = &[
    "ano",
    "ano_referencia",
    "anoreferencia",
    "ano_base",
    "ano_ref",
    "year",
];

/// Rows sampled when scoring candidate entity columns.
const SAMPLE_ROWS: usize = 500;

/// Minimum hits for a scored column to win.
const MIN_HITS: usize = 10;

/// Where the year of each row comes from. Exactly one source exists per
/// file by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSource {
    /// Per-row year read from this column
    Column(usize),
    /// Single year for the whole file, taken from its path
    Constant(i32),
}

/// Inferred roles for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRoles {
    /// Index of the entity-code column
    pub entity: usize,
    pub year: YearSource,
}

/// Inference failure; the file is skipped. Common and expected for
/// cover sheets, notes, and summary tabs.
#[derive(Debug, PartialEq, Eq)]
pub enum InferError {
    NoEntityColumn,
    NoYearInfo,
}

impl std::fmt::Display for InferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoEntityColumn => f.write_str("no entity-code column found"),
            Self::NoYearInfo => f.write_str("no year column or year in file path"),
        }
    }
}

impl std::error::Error for InferError {}

/// Normalize one cell into an entity code, if it holds one.
pub(crate) fn cell_entity_code(cell: &RawCell) -> Option<i64> {
    match cell {
        RawCell::Empty | RawCell::Bool(_) => None,
        RawCell::Int(i) => normalize_entity_code(&i.to_string()),
        RawCell::Float(f) if f.fract() == 0.0 => {
            normalize_entity_code(&(*f as i64).to_string())
        }
        RawCell::Float(_) => None,
        RawCell::Text(s) => normalize_entity_code(s),
    }
}

/// Extract a year from one cell, if it holds one in range.
pub(crate) fn cell_year(cell: &RawCell) -> Option<i32> {
    match cell {
        RawCell::Empty | RawCell::Bool(_) => None,
        RawCell::Int(i) => extract_year(&i.to_string()),
        RawCell::Float(f) => extract_year(&f.to_string()),
        RawCell::Text(s) => extract_year(s),
    }
}

/// Infer the entity column and year source for a table.
pub fn infer_roles(table: &RawTable, source_path: &Path) -> Result<ColumnRoles, InferError> {
    let entity = find_entity_column(table).ok_or(InferError::NoEntityColumn)?;
    let year = find_year_source(table, source_path).ok_or(InferError::NoYearInfo)?;
    Ok(ColumnRoles { entity, year })
}

fn alias_match(columns: &[String], aliases: &[&str]) -> Option<usize> {
    columns
        .iter()
        .position(|name| aliases.iter().any(|a| name.eq_ignore_ascii_case(a)))
}

fn find_entity_column(table: &RawTable) -> Option<usize> {
    if let Some(idx) = alias_match(table.columns(), ENTITY_ALIASES) {
        return Some(idx);
    }

    let sample = table.n_rows().min(SAMPLE_ROWS);
    if sample == 0 {
        return None;
    }

    let mut best: Option<(usize, usize)> = None;
    for col in 0..table.n_cols() {
        let hits = table.column(col)[..sample]
            .iter()
            .filter(|cell| cell_entity_code(cell).is_some())
            .count();
        if best.map_or(true, |(_, b)| hits > b) {
            best = Some((col, hits));
        }
    }

    let (idx, hits) = best?;
    let threshold = MIN_HITS.max(sample / 2);
    (hits >= threshold).then_some(idx)
}

fn find_year_source(table: &RawTable, source_path: &Path) -> Option<YearSource> {
    if let Some(idx) = alias_match(table.columns(), YEAR_ALIASES) {
        return Some(YearSource::Column(idx));
    }
    extract_year(&source_path.to_string_lossy()).map(YearSource::Constant)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    fn table(headers: &[&str], rows: Vec<Vec<RawCell>>) -> RawTable {
        RawTable::new(headers.iter().map(|h| h.to_string()).collect(), rows)
    }

    #[test]
    fn entity_by_alias() {
        let t = table(
            &["Município", "Codigo_Municipio", "Valor"],
            vec![vec![text("São Paulo"), RawCell::Int(3550308), RawCell::Int(1)]],
        );
        let roles = infer_roles(&t, Path::new("dados_2023.csv")).unwrap();
        assert_eq!(roles.entity, 1);
    }

    #[test]
    fn entity_by_scoring_without_alias() {
        // 500 valid 7-digit codes in a column with an unrecognized name
        let rows: Vec<Vec<RawCell>> = (0..500)
            .map(|i| {
                vec![
                    text(&format!("Cidade {i}")),
                    RawCell::Int(3500000 + i),
                    RawCell::Int(i),
                ]
            })
            .collect();
        let t = table(&["Nome", "Cd Mun Completo", "Qtd"], rows);
        let roles = infer_roles(&t, Path::new("dados_2023.csv")).unwrap();
        assert_eq!(roles.entity, 1);
    }

    #[test]
    fn scoring_fails_below_majority() {
        // Only 3 of 500 rows look like codes anywhere: inference must
        // fail rather than pick a wrong column
        let rows: Vec<Vec<RawCell>> = (0..500)
            .map(|i| {
                let cell = if i < 3 {
                    RawCell::Int(3500000 + i)
                } else {
                    RawCell::Int(i)
                };
                vec![text("x"), cell]
            })
            .collect();
        let t = table(&["A", "B"], rows);
        assert_eq!(
            infer_roles(&t, Path::new("dados_2023.csv")),
            Err(InferError::NoEntityColumn)
        );
    }

    #[test]
    fn scoring_small_table_needs_ten_hits() {
        // 8 of 12 rows are codes: majority but under the absolute floor
        let rows: Vec<Vec<RawCell>> = (0..12)
            .map(|i| {
                let cell = if i < 8 { RawCell::Int(3500000 + i) } else { RawCell::Empty };
                vec![cell]
            })
            .collect();
        let t = table(&["B"], rows);
        assert_eq!(
            infer_roles(&t, Path::new("d_2023.csv")),
            Err(InferError::NoEntityColumn)
        );
    }

    #[test]
    fn year_from_column_alias() {
        let t = table(
            &["codigo_municipio", "Ano", "Valor"],
            vec![vec![RawCell::Int(3550308), RawCell::Int(2021), RawCell::Int(5)]],
        );
        let roles = infer_roles(&t, Path::new("sem_ano.csv")).unwrap();
        assert_eq!(roles.year, YearSource::Column(1));
    }

    #[test]
    fn year_from_file_path() {
        let t = table(
            &["codigo_municipio", "Valor"],
            vec![vec![RawCell::Int(3550308), RawCell::Int(5)]],
        );
        let roles = infer_roles(&t, Path::new("extracted/planilha_agua_2022.xlsx")).unwrap();
        assert_eq!(roles.year, YearSource::Constant(2022));
    }

    #[test]
    fn no_year_info_fails() {
        let t = table(
            &["codigo_municipio", "Valor"],
            vec![vec![RawCell::Int(3550308), RawCell::Int(5)]],
        );
        assert_eq!(
            infer_roles(&t, Path::new("planilha_indicadores.xlsx")),
            Err(InferError::NoYearInfo)
        );
    }

    #[test]
    fn cell_code_forms() {
        assert_eq!(cell_entity_code(&RawCell::Int(3550308)), Some(3550308));
        assert_eq!(cell_entity_code(&RawCell::Float(3550308.0)), Some(3550308));
        assert_eq!(cell_entity_code(&text(" 35.0101-0 ")), Some(3501010));
        assert_eq!(cell_entity_code(&RawCell::Float(3550308.5)), None);
        assert_eq!(cell_entity_code(&RawCell::Bool(true)), None);
        assert_eq!(cell_entity_code(&RawCell::Empty), None);
    }

    #[test]
    fn cell_year_forms() {
        assert_eq!(cell_year(&RawCell::Int(2021)), Some(2021));
        assert_eq!(cell_year(&RawCell::Float(2021.0)), Some(2021));
        assert_eq!(cell_year(&text("Ano de 2019")), Some(2019));
        assert_eq!(cell_year(&RawCell::Int(123)), None);
    }
}
