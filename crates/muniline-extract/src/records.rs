//! Canonical long-format records and per-year datasets.

use std::collections::BTreeMap;

use crate::value::{CanonicalValue, ValueKind, infer_kind};

/// One observation: an indicator value for one entity in one year.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    /// Geographic entity code (6 or 7 digits as published)
    pub entity_code: i64,
    pub year: i32,
    pub indicator: String,
    /// Never `Absent`; absent values are dropped before emission
    pub value: CanonicalValue,
}

/// All records of one year, in assembly order.
#[derive(Debug, Clone)]
pub struct YearDataset {
    pub year: i32,
    pub records: Vec<LongRecord>,
}

impl YearDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct indicators present, each with its inferred declared type.
    ///
    /// The downstream aggregator uses the declared type to pick a column
    /// type per indicator.
    pub fn indicator_kinds(&self) -> Vec<(String, ValueKind)> {
        let mut by_indicator: BTreeMap<&str, Vec<&CanonicalValue>> = BTreeMap::new();
        for record in &self.records {
            by_indicator
                .entry(record.indicator.as_str())
                .or_default()
                .push(&record.value);
        }
        by_indicator
            .into_iter()
            .map(|(name, values)| (name.to_string(), infer_kind(values)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(indicator: &str, value: CanonicalValue) -> LongRecord {
        LongRecord {
            entity_code: 3550308,
            year: 2023,
            indicator: indicator.to_string(),
            value,
        }
    }

    #[test]
    fn indicator_kinds_sorted_and_typed() {
        let dataset = YearDataset {
            year: 2023,
            records: vec![
                record("B_TAXA", CanonicalValue::Float(1.5)),
                record("A_POSSUI", CanonicalValue::Bool(true)),
                record("B_TAXA", CanonicalValue::Int(2)),
            ],
        };
        let kinds = dataset.indicator_kinds();
        assert_eq!(
            kinds,
            vec![
                ("A_POSSUI".to_string(), ValueKind::Bool),
                ("B_TAXA".to_string(), ValueKind::Float),
            ]
        );
    }
}
