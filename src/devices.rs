//! Device metadata flattening
//!
//! Each subject record carries nested `device` and `app` installation maps.
//! The extractor flattens both onto a username base row, producing one wide
//! row per subject for the device aggregate. A reduced device-only projection
//! feeds the subject row merger.

use crate::cleanup::cell_text;
use crate::error::TabulateError;
use crate::schema::{Installation, SubjectKey, SubjectRecord};
use crate::table::Table;

fn installation(record: &SubjectRecord) -> Result<&Installation, TabulateError> {
    record
        .user
        .installation
        .as_ref()
        .ok_or_else(|| TabulateError::MissingField("user.installation".to_string()))
}

/// Flatten a subject's device and app metadata into one row.
///
/// The row starts with `username` and `login_time` (the key's last segment),
/// then device attributes, then app attributes. An app attribute whose name
/// collides with a device attribute is suffixed `_app`.
pub fn extract(record: &SubjectRecord, key: &SubjectKey) -> Result<Table, TabulateError> {
    let installation = installation(record)?;

    let mut table = Table::with_columns(["username", "login_time"]);
    let row = table.push_row();
    table.set(row, "username", Some(record.user.username.clone()));
    table.set(row, "login_time", Some(key.login_time().to_string()));

    for (name, value) in &installation.device {
        table.set(row, name, Some(cell_text(value)));
    }
    for (name, value) in &installation.app {
        let column = if table.has_column(name) {
            format!("{name}_app")
        } else {
            name.clone()
        };
        table.set(row, &column, Some(cell_text(value)));
    }

    Ok(table)
}

/// Reduced projection for the subject row merger: username plus the device
/// map only. The exhaustive metadata stays in the device aggregate.
pub fn device_projection(record: &SubjectRecord) -> Result<Table, TabulateError> {
    let installation = installation(record)?;

    let mut table = Table::with_columns(["username"]);
    let row = table.push_row();
    table.set(row, "username", Some(record.user.username.clone()));
    for (name, value) in &installation.device {
        table.set(row, name, Some(cell_text(value)));
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

    fn full_record() -> SubjectRecord {
        record(
            r#"{
                "pings": [],
                "answers": [],
                "user": {
                    "username": "alice",
                    "installation": {
                        "device": {"model": "Pixel 6", "osVersion": 13},
                        "app": {"version": "1.4.2", "build": 88}
                    }
                }
            }"#,
        )
    }

    #[test]
    fn test_flattens_device_then_app() {
        let key = SubjectKey::parse("alice-A-1650000000");
        let table = extract(&full_record(), &key).unwrap();

        assert_eq!(table.row_count(), 1);
        assert_eq!(
            table.columns(),
            &["username", "login_time", "model", "osVersion", "version", "build"]
        );
        assert_eq!(table.get(0, "username"), Some("alice"));
        assert_eq!(table.get(0, "login_time"), Some("1650000000"));
        assert_eq!(table.get(0, "model"), Some("Pixel 6"));
        assert_eq!(table.get(0, "version"), Some("1.4.2"));
    }

    #[test]
    fn test_app_collision_suffixed() {
        let rec = record(
            r#"{
                "answers": [],
                "user": {
                    "username": "bob",
                    "installation": {
                        "device": {"version": "hw-2"},
                        "app": {"version": "1.0"}
                    }
                }
            }"#,
        );
        let key = SubjectKey::parse("bob-B");
        let table = extract(&rec, &key).unwrap();

        assert_eq!(table.get(0, "version"), Some("hw-2"));
        assert_eq!(table.get(0, "version_app"), Some("1.0"));
    }

    #[test]
    fn test_missing_installation_is_stage_error() {
        let rec = record(r#"{"answers": [], "user": {"username": "carol"}}"#);
        let key = SubjectKey::parse("carol-C");

        let err = extract(&rec, &key).unwrap_err();
        assert!(matches!(err, TabulateError::MissingField(_)));
    }

    #[test]
    fn test_projection_excludes_app_and_login_time() {
        let table = device_projection(&full_record()).unwrap();

        assert_eq!(table.columns(), &["username", "model", "osVersion"]);
        assert_eq!(table.get(0, "osVersion"), Some("13"));
    }
}
