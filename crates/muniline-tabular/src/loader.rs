//! Table loading with format dispatch, ranked encodings, and delimiter
//! sniffing.
//!
//! Spreadsheet-family files go through calamine's auto-detecting reader
//! (first sheet only, as published). Delimited text is tried against a
//! ranked encoding list; the first encoding that decodes cleanly and
//! parses wins. Windows-1252 decodes any byte sequence, which makes the
//! fallback deterministic.

use std::fs;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::table::{RawCell, RawTable};

/// Encodings tried for delimited text, in order.
const ENCODINGS: &[&Encoding] = &[UTF_8, WINDOWS_1252];

/// Delimiters considered when sniffing, in priority order.
const DELIMITERS: &[u8] = b";,\t|";

/// Error loading one file; the caller skips the file and continues.
#[derive(Debug)]
pub enum LoadError {
    /// Extension is not a format the loader understands
    UnsupportedFormat(String),
    /// Workbook could not be opened or its first sheet read
    Workbook(String),
    /// No encoding produced a parseable delimited table
    Undecodable,
    Io(std::io::Error),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat(ext) => write!(f, "unsupported format: .{ext}"),
            Self::Workbook(e) => write!(f, "workbook error: {e}"),
            Self::Undecodable => write!(f, "no encoding produced a parseable table"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Load a file into a [`RawTable`], dispatching on its extension.
pub fn load_table(path: &Path) -> Result<RawTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xls" | "ods" => load_workbook(path),
        "csv" => load_delimited(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

/// Read the first sheet of a spreadsheet workbook.
fn load_workbook(path: &Path) -> Result<RawTable, LoadError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| LoadError::Workbook(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names
        .first()
        .ok_or_else(|| LoadError::Workbook("workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| LoadError::Workbook(e.to_string()))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .ok_or_else(|| LoadError::Workbook("sheet is empty".to_string()))?
        .iter()
        .map(header_cell)
        .collect();

    let rows: Vec<Vec<RawCell>> = rows_iter
        .map(|row| row.iter().map(data_cell).collect())
        .collect();

    Ok(RawTable::new(headers, rows))
}

fn header_cell(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn data_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty | Data::Error(_) => RawCell::Empty,
        Data::Bool(b) => RawCell::Bool(*b),
        Data::Int(i) => RawCell::Int(*i),
        Data::Float(f) => RawCell::Float(*f),
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                RawCell::Empty
            } else {
                RawCell::Text(trimmed.to_string())
            }
        }
        Data::DateTime(dt) => RawCell::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
    }
}

/// Read a delimited-text file, trying each encoding in rank order.
fn load_delimited(path: &Path) -> Result<RawTable, LoadError> {
    let bytes = fs::read(path)?;
    for encoding in ENCODINGS {
        let (text, _, had_errors) = encoding.decode(&bytes);
        if had_errors {
            continue;
        }
        if let Some(table) = parse_delimited(&text) {
            return Ok(table);
        }
    }
    Err(LoadError::Undecodable)
}

/// Pick the delimiter that occurs most often in the first non-empty line.
/// Ties go to the earlier entry in [`DELIMITERS`].
fn sniff_delimiter(line: &str) -> u8 {
    let mut best = DELIMITERS[0];
    let mut best_count = 0usize;
    for &candidate in DELIMITERS {
        let count = line.bytes().filter(|&b| b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

fn parse_delimited(text: &str) -> Option<RawTable> {
    let first_line = text.lines().find(|l| !l.trim().is_empty())?;
    let delimiter = sniff_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .ok()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.ok()?;
        rows.push(
            record
                .iter()
                .map(|cell| {
                    let trimmed = cell.trim();
                    if trimmed.is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(trimmed.to_string())
                    }
                })
                .collect(),
        );
    }
    Some(RawTable::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, bytes: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_semicolon_csv() {
        let (_dir, path) = write_temp(
            "dados.csv",
            b"Codigo Municipio;Ano;Valor\n3550308;2023;10\n3304557;2023;20\n",
        );
        let table = load_table(&path).unwrap();
        assert_eq!(table.columns(), &["CODIGO_MUNICIPIO", "ANO", "VALOR"]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column(2)[1], RawCell::Text("20".to_string()));
    }

    #[test]
    fn sniffs_comma_and_tab() {
        let (_dir, path) = write_temp("a.csv", b"a,b,c\n1,2,3\n");
        assert_eq!(load_table(&path).unwrap().n_cols(), 3);

        let (_dir, path) = write_temp("b.csv", b"a\tb\tc\n1\t2\t3\n");
        assert_eq!(load_table(&path).unwrap().n_cols(), 3);
    }

    #[test]
    fn utf8_bom_stripped() {
        let (_dir, path) = write_temp("bom.csv", b"\xEF\xBB\xBFcodigo;ano\n355030;2022\n");
        let table = load_table(&path).unwrap();
        assert_eq!(table.columns()[0], "CODIGO");
    }

    #[test]
    fn latin1_falls_back_to_windows_1252() {
        // "Município;Descrição" in ISO-8859-1: invalid UTF-8 bytes
        let bytes = b"Munic\xEDpio;Descri\xE7\xE3o\nSanto Andr\xE9;ok\n";
        let (_dir, path) = write_temp("latin.csv", bytes);
        let table = load_table(&path).unwrap();
        assert_eq!(table.columns(), &["MUNICIPIO", "DESCRICAO"]);
        assert_eq!(
            table.column(0)[0],
            RawCell::Text("Santo André".to_string())
        );
    }

    #[test]
    fn blank_cells_become_empty() {
        let (_dir, path) = write_temp("gaps.csv", b"a;b\n1;\n;2\n");
        let table = load_table(&path).unwrap();
        assert_eq!(table.column(1)[0], RawCell::Empty);
        assert_eq!(table.column(0)[1], RawCell::Empty);
    }

    #[test]
    fn unsupported_extension_rejected() {
        let (_dir, path) = write_temp("relatorio.pdf", b"%PDF-1.4");
        assert!(matches!(
            load_table(&path),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn corrupt_workbook_rejected() {
        let (_dir, path) = write_temp("quebrado.xlsx", b"this is not a zip container");
        assert!(matches!(load_table(&path), Err(LoadError::Workbook(_))));
    }

    #[test]
    fn empty_csv_undecodable() {
        let (_dir, path) = write_temp("vazio.csv", b"");
        assert!(matches!(load_table(&path), Err(LoadError::Undecodable)));
    }
}
