//! Text, entity-code, and year normalization.
//!
//! Source spreadsheets drift in accents, casing, and punctuation from one
//! release to the next; everything that names or matches a column goes
//! through the normalizers here so the rest of the engine compares clean
//! ASCII tokens only.

use chrono::{Datelike, Local};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Earliest year any published dataset refers to.
pub const MIN_YEAR: i32 = 1980;

/// Decompose and drop combining marks: "água" -> "agua".
pub fn strip_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Normalize free text for keyword matching: accent-stripped lowercase
/// with non-alphanumeric runs collapsed to single spaces.
pub fn normalize_label(text: &str) -> String {
    let stripped = strip_accents(&text.to_lowercase());
    let mut out = String::with_capacity(stripped.len());
    let mut pending_space = false;
    for c in stripped.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Normalize a column or file-stem name into the canonical identifier
/// form: accent-stripped, non-alphanumeric runs collapsed to `_`,
/// uppercased. `"Índice de Atendimento (%)"` -> `"INDICE_DE_ATENDIMENTO"`.
pub fn normalize_name(name: &str) -> String {
    let stripped = strip_accents(&name.to_lowercase());
    let mut out = String::with_capacity(stripped.len());
    let mut pending_sep = false;
    for c in stripped.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        } else {
            pending_sep = true;
        }
    }
    out.to_uppercase()
}

/// Extract a plausible geographic entity code from a raw cell value.
///
/// Strips every non-digit character; a 7-digit result is the canonical
/// code. A 6-digit result is accepted as-is — completing it to the full
/// code length is the downstream reference table's responsibility, not
/// this engine's. Any other length is rejected.
pub fn normalize_entity_code(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        6 | 7 => digits.parse().ok(),
        _ => None,
    }
}

/// Upper bound for plausible years: next year's preliminary releases exist.
pub fn max_year() -> i32 {
    Local::now().year() + 1
}

/// Find the first 4-digit year token in `[MIN_YEAR, current year + 1]`
/// anywhere in the text. Tokens outside the range are skipped even when
/// they look like years.
pub fn extract_year(text: &str) -> Option<i32> {
    let upper = max_year();
    let bytes = text.as_bytes();
    for i in 0..bytes.len().saturating_sub(3) {
        if !bytes[i..i + 4].iter().all(u8::is_ascii_digit) {
            continue;
        }
        let century = &bytes[i..i + 2];
        if century != b"19" && century != b"20" {
            continue;
        }
        if let Ok(year) = text[i..i + 4].parse::<i32>() {
            if (MIN_YEAR..=upper).contains(&year) {
                return Some(year);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_accents_portuguese() {
        assert_eq!(strip_accents("água e esgoto"), "agua e esgoto");
        assert_eq!(strip_accents("Município"), "Municipio");
        assert_eq!(strip_accents("ção"), "cao");
    }

    #[test]
    fn label_collapses_punctuation() {
        assert_eq!(normalize_label("Gestão_Municipal - 2023"), "gestao municipal 2023");
        assert_eq!(normalize_label("  Águas   Pluviais  "), "aguas pluviais");
        assert_eq!(normalize_label("---"), "");
    }

    #[test]
    fn name_canonical_form() {
        assert_eq!(normalize_name("Código IBGE Município"), "CODIGO_IBGE_MUNICIPIO");
        assert_eq!(normalize_name("Índice de Atendimento (%)"), "INDICE_DE_ATENDIMENTO");
        assert_eq!(normalize_name("  ano__referência "), "ANO_REFERENCIA");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn entity_code_from_noisy_text() {
        assert_eq!(normalize_entity_code("  35.0101-0 "), Some(3501010));
        assert_eq!(normalize_entity_code("3550308"), Some(3550308));
    }

    #[test]
    fn entity_code_six_digits_accepted() {
        // Completed to seven digits upstream, outside this engine
        assert_eq!(normalize_entity_code("355030"), Some(355030));
    }

    #[test]
    fn entity_code_wrong_lengths_rejected() {
        assert_eq!(normalize_entity_code("12345"), None);
        assert_eq!(normalize_entity_code("12345678"), None);
        assert_eq!(normalize_entity_code("abc"), None);
        assert_eq!(normalize_entity_code(""), None);
    }

    #[test]
    fn year_found_in_path() {
        assert_eq!(extract_year("planilha_sinisa_2023.xlsx"), Some(2023));
        assert_eq!(extract_year("resultados/1995/dados.csv"), Some(1995));
    }

    #[test]
    fn year_out_of_range_ignored() {
        assert_eq!(extract_year("arquivo_1979.csv"), None);
        assert_eq!(extract_year("protocolo_2099.csv"), None);
        // Skips the out-of-range token but keeps scanning
        assert_eq!(extract_year("v1970_dados_2021.csv"), Some(2021));
    }

    #[test]
    fn year_inside_longer_digit_run() {
        assert_eq!(extract_year("export_20231215.xlsx"), Some(2023));
    }

    #[test]
    fn year_absent() {
        assert_eq!(extract_year("planilha_indicadores.xlsx"), None);
    }
}
