// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/sort.rs
// Version: 1.0.0
//
// This file implements list ordering for entity collections. A sort spec is a
// field name, optionally prefixed with '-' for descending order. Field values
// are normalized before comparison so that numbers, ISO dates and free text
// each sort the way a dashboard user expects.
//
// Tree Location:
// - src/core/sort.rs (sort spec and value normalization)
// - Depends on: serde_json, core/time

use super::time::parse_timestamp_millis;
use super::types::Record;
use serde_json::Value;
use std::cmp::Ordering;

/// Parsed sort specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

impl SortSpec {
    /// Parse `field` or `-field`. Returns `None` for an empty spec.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        let (field, descending) = match spec.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (spec, false),
        };
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            descending,
        })
    }

    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = SortKey::of(a.get(&self.field)).cmp(&SortKey::of(b.get(&self.field)));
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }

    /// Stable sort in place.
    pub fn sort(&self, records: &mut [Record]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

/// Normalized comparison key.
///
/// Missing and null values count as zero, booleans as 0/1, date-like strings
/// as epoch milliseconds, anything else textual is lower-cased. Numeric keys
/// order before text keys, and arrays/objects after both.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Text(String),
    Other,
}

impl SortKey {
    pub fn of(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => SortKey::Number(0.0),
            Some(Value::Bool(flag)) => SortKey::Number(if *flag { 1.0 } else { 0.0 }),
            Some(Value::Number(number)) => SortKey::Number(number.as_f64().unwrap_or(0.0)),
            Some(Value::String(text)) => match parse_timestamp_millis(text) {
                Some(millis) => SortKey::Number(millis as f64),
                None => SortKey::Text(text.to_lowercase()),
            },
            Some(Value::Array(_)) | Some(Value::Object(_)) => SortKey::Other,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Text(_) => 1,
            SortKey::Other => 2,
        }
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test records must be objects"),
        }
    }

    fn names(records: &[Record]) -> Vec<&str> {
        records
            .iter()
            .map(|r| r.get("name").and_then(Value::as_str).unwrap_or(""))
            .collect()
    }

    #[test]
    fn parse_handles_prefix_and_empty() {
        assert_eq!(
            SortSpec::parse("-created_date"),
            Some(SortSpec {
                field: "created_date".to_string(),
                descending: true
            })
        );
        assert_eq!(SortSpec::parse("hashrate").map(|s| s.descending), Some(false));
        assert_eq!(SortSpec::parse(""), None);
        assert_eq!(SortSpec::parse("-"), None);
    }

    #[test]
    fn numbers_sort_numerically_and_missing_is_zero() {
        let mut records = vec![
            record(json!({"name": "b", "hashrate": 10})),
            record(json!({"name": "a", "hashrate": 2.5})),
            record(json!({"name": "none"})),
            record(json!({"name": "neg", "hashrate": -1})),
        ];
        SortSpec::parse("hashrate").unwrap().sort(&mut records);
        assert_eq!(names(&records), vec!["neg", "none", "a", "b"]);
    }

    #[test]
    fn dates_sort_by_timestamp_not_text() {
        let mut records = vec![
            record(json!({"name": "old", "created_date": "2024-01-02T00:00:00.000Z"})),
            record(json!({"name": "new", "created_date": "2024-01-10T00:00:00.000Z"})),
            record(json!({"name": "offset", "created_date": "2024-01-05T00:00:00+05:00"})),
        ];
        SortSpec::parse("-created_date").unwrap().sort(&mut records);
        assert_eq!(names(&records), vec!["new", "offset", "old"]);
    }

    #[test]
    fn text_sorts_case_insensitively() {
        let mut records = vec![
            record(json!({"name": "ravencoin"})),
            record(json!({"name": "Ethereum Classic"})),
            record(json!({"name": "bitcoin Gold"})),
        ];
        SortSpec::parse("name").unwrap().sort(&mut records);
        assert_eq!(
            names(&records),
            vec!["bitcoin Gold", "Ethereum Classic", "ravencoin"]
        );
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let mut records = vec![
            record(json!({"name": "first", "status": "active"})),
            record(json!({"name": "second", "status": "active"})),
            record(json!({"name": "third", "status": "Active"})),
        ];
        SortSpec::parse("-status").unwrap().sort(&mut records);
        assert_eq!(names(&records), vec!["first", "second", "third"]);
    }

    #[test]
    fn mixed_kinds_have_a_total_order() {
        let mut records = vec![
            record(json!({"name": "obj", "v": {"a": 1}})),
            record(json!({"name": "text", "v": "zeta"})),
            record(json!({"name": "num", "v": 3})),
        ];
        SortSpec::parse("v").unwrap().sort(&mut records);
        assert_eq!(names(&records), vec!["num", "text", "obj"]);
    }
}
