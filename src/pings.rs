//! Ping extraction
//!
//! Projects the fixed ping columns from one subject's prompt events and tags
//! every row with the subject's username and login node.

use crate::cleanup::cell_text;
use crate::error::TabulateError;
use crate::schema::{SubjectKey, SubjectRecord};
use crate::table::Table;

/// Column order of the extracted ping table
pub const PING_COLUMNS: [&str; 8] = [
    "username",
    "login-node",
    "streamName",
    "startTime",
    "notificationTime",
    "endTime",
    "id",
    "tzOffset",
];

/// Build one row per ping event, augmented with identity columns.
///
/// A record without a `pings` field is a structural stage error; the
/// orchestrator catches and logs it for the subject.
pub fn extract(record: &SubjectRecord, key: &SubjectKey) -> Result<Table, TabulateError> {
    let pings = record
        .pings
        .as_ref()
        .ok_or_else(|| TabulateError::MissingField("pings".to_string()))?;

    let username = key.subject_id().to_string();
    let login_node = key.login_node();

    let mut table = Table::with_columns(PING_COLUMNS);
    for ping in pings {
        let row = table.push_row();
        table.set(row, "username", Some(username.clone()));
        table.set(row, "login-node", Some(login_node.clone()));
        table.set(row, "streamName", ping.stream_name.as_ref().map(cell_text));
        table.set(row, "startTime", ping.start_time.as_ref().map(cell_text));
        table.set(
            row,
            "notificationTime",
            ping.notification_time.as_ref().map(cell_text),
        );
        table.set(row, "endTime", ping.end_time.as_ref().map(cell_text));
        table.set(row, "id", ping.id.as_ref().map(cell_text));
        table.set(row, "tzOffset", ping.tz_offset.as_ref().map(cell_text));
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(json: &str) -> SubjectRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_projects_fixed_columns() {
        let record = record(
            r#"{
                "pings": [{"streamName": "s", "startTime": "t0",
                           "notificationTime": "t0", "endTime": "t1",
                           "id": "p1", "tzOffset": -480}],
                "answers": [],
                "user": {"username": "alice"}
            }"#,
        );
        let key = SubjectKey::parse("alice-A-B");

        let table = extract(&record, &key).unwrap();
        assert_eq!(table.columns(), &PING_COLUMNS);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.get(0, "username"), Some("alice"));
        assert_eq!(table.get(0, "login-node"), Some("AB"));
        assert_eq!(table.get(0, "id"), Some("p1"));
        assert_eq!(table.get(0, "tzOffset"), Some("-480"));
    }

    #[test]
    fn test_missing_pings_is_structural_error() {
        let record = record(r#"{"answers": [], "user": {"username": "bob"}}"#);
        let key = SubjectKey::parse("bob-B");

        let err = extract(&record, &key).unwrap_err();
        assert!(matches!(err, TabulateError::MissingField(ref f) if f == "pings"));
    }

    #[test]
    fn test_partial_ping_yields_missing_cells() {
        let record = record(
            r#"{
                "pings": [{"id": "p1"}],
                "answers": [],
                "user": {"username": "carol"}
            }"#,
        );
        let key = SubjectKey::parse("carol-C");

        let table = extract(&record, &key).unwrap();
        assert_eq!(table.get(0, "streamName"), None);
        assert_eq!(table.get(0, "id"), Some("p1"));
    }
}
