//! Canonical cell values and the heuristics that produce them.
//!
//! Source cells arrive as whatever the file format happened to carry:
//! native numbers, booleans, sentinel strings, percentages with Brazilian
//! decimal commas. Everything funnels into [`CanonicalValue`]; `Absent`
//! is distinct from zero and false and is dropped before emission.

use std::fmt;

use muniline_tabular::RawCell;

/// Typed value of one cell after parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Absent,
}

impl CanonicalValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for CanonicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Absent => Ok(()),
        }
    }
}

/// Placeholder tokens the sources use for "no value", compared lowercase.
const SENTINELS: &[&str] = &["-", "--", "---", "n/a", "na"];

/// Affirmative tokens, compared lowercase.
const TRUE_TOKENS: &[&str] = &["sim", "s", "yes", "true"];

/// Negative tokens, compared lowercase. Both spellings of "não" appear
/// in the wild.
const FALSE_TOKENS: &[&str] = &["nao", "não", "n", "no", "false"];

/// Parse one raw cell into its canonical value.
///
/// Native booleans and numbers pass through unchanged, so reapplying the
/// parser to its own output is the identity.
pub fn parse_cell(cell: &RawCell) -> CanonicalValue {
    match cell {
        RawCell::Empty => CanonicalValue::Absent,
        RawCell::Bool(b) => CanonicalValue::Bool(*b),
        RawCell::Int(i) => CanonicalValue::Int(*i),
        RawCell::Float(f) => CanonicalValue::Float(*f),
        RawCell::Text(s) => parse_text(s),
    }
}

/// Parse a textual cell.
///
/// After sentinel and boolean-token handling, the remaining text is
/// coerced numerically: `%` stripped, `.` treated as the thousands
/// separator, `,` as the decimal separator. Text that survives no
/// coercion is kept verbatim (trimmed).
pub fn parse_text(raw: &str) -> CanonicalValue {
    let text = raw.trim();
    if text.is_empty() {
        return CanonicalValue::Absent;
    }

    let lowered = text.to_lowercase();
    if SENTINELS.contains(&lowered.as_str()) {
        return CanonicalValue::Absent;
    }
    if TRUE_TOKENS.contains(&lowered.as_str()) {
        return CanonicalValue::Bool(true);
    }
    if FALSE_TOKENS.contains(&lowered.as_str()) {
        return CanonicalValue::Bool(false);
    }

    let numeric: String = text.replace('%', "").replace('.', "").replace(',', ".");
    if numeric.contains('.') {
        if let Ok(f) = numeric.parse::<f64>() {
            return CanonicalValue::Float(f);
        }
    } else if let Ok(i) = numeric.parse::<i64>() {
        return CanonicalValue::Int(i);
    }

    CanonicalValue::Text(text.to_string())
}

/// Declared type of one indicator, inferred over all of its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Text,
    Unknown,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "string",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infer the declared type for a set of canonical values.
///
/// All-boolean wins first; otherwise any text forces `Text`; otherwise
/// the values are numeric and the kind is `Int` when every float is
/// integral. Absent values are ignored; all-absent is `Unknown`.
pub fn infer_kind<'a, I>(values: I) -> ValueKind
where
    I: IntoIterator<Item = &'a CanonicalValue>,
{
    let mut seen_any = false;
    let mut all_bool = true;
    let mut any_text = false;
    let mut any_fractional = false;

    for value in values {
        match value {
            CanonicalValue::Absent => continue,
            CanonicalValue::Bool(_) => seen_any = true,
            CanonicalValue::Int(_) => {
                seen_any = true;
                all_bool = false;
            }
            CanonicalValue::Float(f) => {
                seen_any = true;
                all_bool = false;
                if f.fract() != 0.0 {
                    any_fractional = true;
                }
            }
            CanonicalValue::Text(_) => {
                seen_any = true;
                all_bool = false;
                any_text = true;
            }
        }
    }

    if !seen_any {
        ValueKind::Unknown
    } else if all_bool {
        ValueKind::Bool
    } else if any_text {
        ValueKind::Text
    } else if any_fractional {
        ValueKind::Float
    } else {
        ValueKind::Int
    }
}
