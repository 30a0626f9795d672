//! Answer normalization
//!
//! Collapses each raw answer into one value, dedups repeat submissions, and
//! pivots the long answer log into one wide row per ping.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::cleanup::{cleanup_value, list_text};
use crate::error::TabulateError;
use crate::schema::RawAnswer;
use crate::table::Table;

/// Sentinel recorded when a subject declined to answer
pub const PNA: &str = "PNA";

/// A raw answer with its payload collapsed to a single value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAnswer {
    pub ping_id: Option<String>,
    pub question_id: Option<String>,
    pub date: Option<String>,
    pub value: Option<String>,
    /// 0-based occurrence index per question, in encounter order.
    /// Diagnostic only; the pivot does not consume it.
    pub ordinal: usize,
}

/// Steps 1-4 of normalization: value isolation, cleanup, dedup by date
/// (first occurrence kept), per-question ordinal tagging.
pub fn isolate(answers: &[RawAnswer]) -> Vec<NormalizedAnswer> {
    let mut seen_dates: HashSet<Option<String>> = HashSet::new();
    let mut ordinals: HashMap<Option<String>, usize> = HashMap::new();
    let mut out = Vec::new();

    for answer in answers {
        if !seen_dates.insert(answer.date.clone()) {
            continue;
        }

        let ordinal = ordinals.entry(answer.question_id.clone()).or_insert(0);
        let value = isolate_value(answer);

        out.push(NormalizedAnswer {
            ping_id: answer.ping_id.clone(),
            question_id: answer.question_id.clone(),
            date: answer.date.clone(),
            value,
            ordinal: *ordinal,
        });
        *ordinal += 1;
    }

    out
}

/// Collapse one answer's payload to a single value.
///
/// PNA wins over any payload. Otherwise the `data` map's values are taken in
/// insertion order and rendered as list text; a missing or non-map payload
/// collapses to a missing value rather than a stage error.
fn isolate_value(answer: &RawAnswer) -> Option<String> {
    if answer.prefer_not_to_answer {
        return Some(PNA.to_string());
    }

    match answer.data.as_ref() {
        Some(Value::Object(map)) => {
            let values: Vec<Value> = map.values().cloned().collect();
            Some(cleanup_value(&list_text(&Value::Array(values))))
        }
        _ => None,
    }
}

/// Step 6: pivot long rows `(ping_id, question_id, value)` into one row per
/// ping, one column per question. The row key column is named `id` so the
/// result joins against the ping table.
///
/// Rows lacking a ping or question id cannot take part in the reshape and
/// are skipped. A surviving duplicate `(ping, question)` pair is a
/// [`TabulateError::PivotConflict`], caught per subject upstream.
pub fn pivot(normalized: &[NormalizedAnswer]) -> Result<Table, TabulateError> {
    let mut table = Table::with_columns(["id"]);
    let mut row_of: HashMap<String, usize> = HashMap::new();
    let mut occupied: HashSet<(String, String)> = HashSet::new();

    for answer in normalized {
        let (Some(ping_id), Some(question_id)) = (&answer.ping_id, &answer.question_id) else {
            continue;
        };

        if !occupied.insert((ping_id.clone(), question_id.clone())) {
            return Err(TabulateError::PivotConflict {
                ping_id: ping_id.clone(),
                question_id: question_id.clone(),
            });
        }

        let row = match row_of.get(ping_id) {
            Some(&row) => row,
            None => {
                let row = table.push_row();
                table.set(row, "id", Some(ping_id.clone()));
                row_of.insert(ping_id.clone(), row);
                row
            }
        };

        table.set(row, question_id, answer.value.clone());
    }

    Ok(table)
}

/// Full normalization: isolate, cleanup, dedup, pivot long to wide
pub fn normalize(answers: &[RawAnswer]) -> Result<Table, TabulateError> {
    pivot(&isolate(answers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn answers(json: &str) -> Vec<RawAnswer> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_single_value_isolation() {
        let raw = answers(
            r#"[{"pingId": "p1", "questionId": "q1", "date": "d0",
                 "preferNotToAnswer": false, "data": {"0": "yes"}}]"#,
        );
        let table = normalize(&raw).unwrap();

        assert_eq!(table.columns(), &["id", "q1"]);
        assert_eq!(table.get(0, "id"), Some("p1"));
        assert_eq!(table.get(0, "q1"), Some("yes"));
    }

    #[test]
    fn test_pna_wins_over_payload() {
        let raw = answers(
            r#"[{"pingId": "p1", "questionId": "q1", "date": "d0",
                 "preferNotToAnswer": true, "data": {"0": "secret"}}]"#,
        );
        let table = normalize(&raw).unwrap();
        assert_eq!(table.get(0, "q1"), Some(PNA));
    }

    #[test]
    fn test_missing_data_is_local_fallback() {
        let raw = answers(
            r#"[{"pingId": "p1", "questionId": "q1", "date": "d0",
                 "preferNotToAnswer": false},
                {"pingId": "p1", "questionId": "q2", "date": "d1",
                 "preferNotToAnswer": false, "data": "not a map"}]"#,
        );
        let table = normalize(&raw).unwrap();
        assert_eq!(table.get(0, "q1"), None);
        assert_eq!(table.get(0, "q2"), None);
    }

    #[test]
    fn test_multi_value_keeps_list_text() {
        // Values stay in insertion order and keep inner quoting for the
        // nomination decoder to split on.
        let raw = answers(
            r#"[{"pingId": "p1", "questionId": "SU_Nom", "date": "d0",
                 "preferNotToAnswer": false,
                 "data": {"0": "Alice", "1": "Bob", "2": "Carol"}}]"#,
        );
        let table = normalize(&raw).unwrap();
        assert_eq!(table.get(0, "SU_Nom"), Some("Alice', 'Bob', 'Carol"));
    }

    #[test]
    fn test_dedup_by_date_keeps_first() {
        let raw = answers(
            r#"[{"pingId": "p1", "questionId": "q1", "date": "d0",
                 "preferNotToAnswer": false, "data": {"0": "first"}},
                {"pingId": "p2", "questionId": "q1", "date": "d0",
                 "preferNotToAnswer": false, "data": {"0": "second"}}]"#,
        );
        let normalized = isolate(&raw);

        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].value.as_deref(), Some("first"));
    }

    #[test]
    fn test_ordinal_counts_per_question() {
        let raw = answers(
            r#"[{"pingId": "p1", "questionId": "q1", "date": "d0",
                 "preferNotToAnswer": false, "data": {"0": "a"}},
                {"pingId": "p2", "questionId": "q1", "date": "d1",
                 "preferNotToAnswer": false, "data": {"0": "b"}},
                {"pingId": "p1", "questionId": "q2", "date": "d2",
                 "preferNotToAnswer": false, "data": {"0": "c"}}]"#,
        );
        let normalized = isolate(&raw);

        assert_eq!(normalized[0].ordinal, 0);
        assert_eq!(normalized[1].ordinal, 1);
        assert_eq!(normalized[2].ordinal, 0);
    }

    #[test]
    fn test_pivot_conflict_detected() {
        let raw = answers(
            r#"[{"pingId": "p1", "questionId": "q1", "date": "d0",
                 "preferNotToAnswer": false, "data": {"0": "a"}},
                {"pingId": "p1", "questionId": "q1", "date": "d1",
                 "preferNotToAnswer": false, "data": {"0": "b"}}]"#,
        );
        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, TabulateError::PivotConflict { .. }));
    }

    #[test]
    fn test_pivot_multiple_pings_and_questions() {
        let raw = answers(
            r#"[{"pingId": "p1", "questionId": "q1", "date": "d0",
                 "preferNotToAnswer": false, "data": {"0": "a"}},
                {"pingId": "p2", "questionId": "q2", "date": "d1",
                 "preferNotToAnswer": false, "data": {"0": "b"}}]"#,
        );
        let table = normalize(&raw).unwrap();

        assert_eq!(table.columns(), &["id", "q1", "q2"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, "q2"), None);
        assert_eq!(table.get(1, "q2"), Some("b"));
    }
}
