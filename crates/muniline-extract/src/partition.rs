//! Grouping of accumulated records into per-year datasets.

use std::collections::BTreeMap;

use crate::records::{LongRecord, YearDataset};

/// Split records by year, ascending. Within a year the assembly order is
/// preserved. Pure and side-effect-free.
pub fn partition_by_year(records: Vec<LongRecord>) -> Vec<YearDataset> {
    let mut by_year: BTreeMap<i32, Vec<LongRecord>> = BTreeMap::new();
    for record in records {
        by_year.entry(record.year).or_default().push(record);
    }
    by_year
        .into_iter()
        .map(|(year, records)| YearDataset { year, records })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CanonicalValue;

    fn record(code: i64, year: i32, indicator: &str) -> LongRecord {
        LongRecord {
            entity_code: code,
            year,
            indicator: indicator.to_string(),
            value: CanonicalValue::Int(1),
        }
    }

    #[test]
    fn years_ascending_order_preserved() {
        let records = vec![
            record(1100015, 2023, "A"),
            record(1100015, 2021, "A"),
            record(1100023, 2023, "B"),
            record(1100023, 2021, "B"),
        ];
        let datasets = partition_by_year(records);

        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[0].year, 2021);
        assert_eq!(datasets[1].year, 2023);
        assert_eq!(datasets[0].records[0].indicator, "A");
        assert_eq!(datasets[0].records[1].indicator, "B");
        assert_eq!(datasets[1].len(), 2);
    }

    #[test]
    fn empty_in_empty_out() {
        assert!(partition_by_year(Vec::new()).is_empty());
    }
}
