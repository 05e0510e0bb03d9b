//! Export and import files for the tag list.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tagmark_core::Tag;
use thiserror::Error;

pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub tags: Vec<String>,
    pub export_date: String,
    pub version: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportFormatError {
    #[error("not valid JSON: {0}")]
    Json(String),
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("missing \"tags\" field")]
    MissingTags,
    #[error("\"tags\" must be an array")]
    TagsNotArray,
    #[error("entry {index} in \"tags\" is not a string")]
    NonStringEntry { index: usize },
}

pub fn export_document(tags: &[Tag], now: DateTime<Utc>) -> ExportFile {
    ExportFile {
        tags: tags.iter().map(|t| t.as_str().to_owned()).collect(),
        export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        version: EXPORT_VERSION.to_string(),
    }
}

/// Default file name for an export made at `now`.
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("tagmark-export-{}.json", now.format("%Y-%m-%d"))
}

/// Extracts the raw `tags` entries of an import file.
///
/// Entries are returned as written; validation and deduplication happen when
/// they are merged into the store. A non-string entry rejects the whole file.
pub fn parse_import(text: &str) -> Result<Vec<String>, ImportFormatError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ImportFormatError::Json(e.to_string()))?;
    let Value::Object(mut object) = value else {
        return Err(ImportFormatError::NotAnObject);
    };
    let tags = object.remove("tags").ok_or(ImportFormatError::MissingTags)?;
    let Value::Array(entries) = tags else {
        return Err(ImportFormatError::TagsNotArray);
    };
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::String(s) => Ok(s),
            _ => Err(ImportFormatError::NonStringEntry { index }),
        })
        .collect()
}
