//! In-memory table with normalized, de-duplicated column names.

use std::path::Path;

use muniline_core::normalize::normalize_name;

/// A raw cell as read from the source file, before canonical parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Fallback name for columns whose header normalizes to nothing.
const UNNAMED_COLUMN: &str = "COL";

/// An ordered set of named columns read from one file.
///
/// Column names are normalized and de-duplicated at construction; cells
/// are stored column-major. Rows shorter than the header are padded with
/// empty cells, longer rows are truncated to the header width.
#[derive(Debug, Clone)]
pub struct RawTable {
    columns: Vec<String>,
    cells: Vec<Vec<RawCell>>,
    n_rows: usize,
}

impl RawTable {
    /// Build a table from a header row and row-major data.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<RawCell>>) -> Self {
        let columns = dedup_headers(headers);
        let n_cols = columns.len();
        let n_rows = rows.len();

        let mut cells: Vec<Vec<RawCell>> = (0..n_cols)
            .map(|_| Vec::with_capacity(n_rows))
            .collect();
        for mut row in rows {
            row.resize(n_cols, RawCell::Empty);
            for (col, cell) in row.into_iter().enumerate() {
                cells[col].push(cell);
            }
        }

        Self {
            columns,
            cells,
            n_rows,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0 || self.columns.is_empty()
    }

    /// Normalized column names, in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, idx: usize) -> &[RawCell] {
        &self.cells[idx]
    }
}

/// Normalize header names and disambiguate repeats with `_1`, `_2`, ...
fn dedup_headers(headers: Vec<String>) -> Vec<String> {
    let mut used: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut out = Vec::with_capacity(headers.len());
    for header in headers {
        let mut base = normalize_name(&header);
        if base.is_empty() {
            base = UNNAMED_COLUMN.to_string();
        }
        match used.get_mut(&base) {
            None => {
                used.insert(base.clone(), 1);
                out.push(base);
            }
            Some(count) => {
                let name = format!("{base}_{count}");
                *count += 1;
                out.push(name);
            }
        }
    }
    out
}

/// Whether a path names a tabular file the loader understands.
pub fn is_spreadsheet_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| matches!(e.as_str(), "csv" | "xlsx" | "xls" | "ods"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_normalized_and_deduped() {
        let table = RawTable::new(
            vec![
                "Código IBGE Município".to_string(),
                "Ano".to_string(),
                "Valor".to_string(),
                "Valor".to_string(),
                "valor!".to_string(),
                "".to_string(),
            ],
            vec![],
        );
        assert_eq!(
            table.columns(),
            &["CODIGO_IBGE_MUNICIPIO", "ANO", "VALOR", "VALOR_1", "VALOR_2", "COL"]
        );
    }

    #[test]
    fn short_rows_padded_long_rows_truncated() {
        let table = RawTable::new(
            vec!["A".to_string(), "B".to_string()],
            vec![
                vec![RawCell::Int(1)],
                vec![
                    RawCell::Int(2),
                    RawCell::Int(3),
                    RawCell::Text("extra".to_string()),
                ],
            ],
        );
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_cols(), 2);
        assert_eq!(table.column(1)[0], RawCell::Empty);
        assert_eq!(table.column(1)[1], RawCell::Int(3));
    }

    #[test]
    fn spreadsheet_file_matcher() {
        assert!(is_spreadsheet_file(Path::new("dados/planilha.XLSX")));
        assert!(is_spreadsheet_file(Path::new("dados.csv")));
        assert!(is_spreadsheet_file(Path::new("dados.ods")));
        assert!(!is_spreadsheet_file(Path::new("relatorio.pdf")));
        assert!(!is_spreadsheet_file(Path::new("arquivo.zip")));
        assert!(!is_spreadsheet_file(Path::new("sem_extensao")));
    }
}
