//! Survey export schema
//!
//! The export is one JSON object mapping subject-session keys to subject
//! records. Records are deserialized tolerantly: only the fields the pipeline
//! projects are modeled, everything else is kept in flattened `extra` maps so
//! zero-answer records can be written back out verbatim.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TabulateError;

/// The whole record store, keyed by subject-session key.
///
/// A `BTreeMap` keeps subject iteration deterministic across runs.
pub type ResponseStore = BTreeMap<String, SubjectRecord>;

/// Load a record store from a JSON export file
pub fn load_store(path: &Path) -> Result<ResponseStore, TabulateError> {
    let raw = fs::read_to_string(path)?;
    let store: ResponseStore = serde_json::from_str(&raw)?;
    Ok(store)
}

/// One subject's full export record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectRecord {
    /// Prompt occurrences; absence is a per-subject structural error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pings: Option<Vec<PingEvent>>,
    /// Responses; an empty sequence routes the record to parent errors
    #[serde(default)]
    pub answers: Vec<RawAnswer>,
    pub user: UserInfo,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One prompt occurrence shown to a subject
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_time: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tz_offset: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One response to one question at one ping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub prefer_not_to_answer: bool,
    /// Response payload; `null` or a non-object collapses to a missing value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installation: Option<Installation>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installation {
    #[serde(default)]
    pub device: Map<String, Value>,
    #[serde(default)]
    pub app: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parsed view of a subject-session key (`subjectId-sessionSuffix...`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectKey {
    raw: String,
    split: Option<usize>,
}

impl SubjectKey {
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            split: raw.find('-'),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Text before the first separator (the subject's username)
    pub fn subject_id(&self) -> &str {
        match self.split {
            Some(ix) => &self.raw[..ix],
            None => &self.raw,
        }
    }

    /// Everything after the first separator, separators preserved
    pub fn session_id(&self) -> &str {
        match self.split {
            Some(ix) => &self.raw[ix + 1..],
            None => "",
        }
    }

    /// Session segments concatenated with no separator (the login-node column)
    pub fn login_node(&self) -> String {
        self.session_id().split('-').collect()
    }

    /// Last key segment, the export's login timestamp
    pub fn login_time(&self) -> &str {
        self.raw.rsplit('-').next().unwrap_or(&self.raw)
    }
}
