//! Fetch collaborator contract and a JSON snapshot implementation.
//!
//! # Responsibility
//! - Define how record snapshots enter core ([`RecordSource`]).
//! - Decode JSON snapshots, bare arrays or `{ "data": [...] }` envelopes.
//!
//! # Invariants
//! - Sources never retry; a failure is reported once to the caller.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

const ENVELOPE_KEYS: &[&str] = &["data", "items", "results"];

/// Failure reported by a fetch collaborator.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read snapshot {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("snapshot is not a record list: {0}")]
    Shape(String),
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    /// Short stable name for log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Decode(_) => "decode",
            Self::Shape(_) => "shape",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

/// Supplies a snapshot of records of type `R`.
pub trait RecordSource<R> {
    fn fetch(&self) -> Result<Vec<R>, SourceError>;
}

/// Adapts a closure into a [`RecordSource`].
pub struct FnSource<F>(pub F);

impl<R, F> RecordSource<R> for FnSource<F>
where
    F: Fn() -> Result<Vec<R>, SourceError>,
{
    fn fetch(&self) -> Result<Vec<R>, SourceError> {
        (self.0)()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SnapshotOrigin {
    File(PathBuf),
    Inline(String),
}

/// JSON snapshot read from a file or an in-memory document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonSnapshotSource {
    origin: SnapshotOrigin,
}

impl JsonSnapshotSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: SnapshotOrigin::File(path.into()),
        }
    }

    pub fn from_json(document: impl Into<String>) -> Self {
        Self {
            origin: SnapshotOrigin::Inline(document.into()),
        }
    }

    fn read_document(&self) -> Result<String, SourceError> {
        match &self.origin {
            SnapshotOrigin::File(path) => {
                std::fs::read_to_string(path).map_err(|source| SourceError::Io {
                    path: path.clone(),
                    source,
                })
            }
            SnapshotOrigin::Inline(document) => Ok(document.clone()),
        }
    }
}

impl<R: DeserializeOwned> RecordSource<R> for JsonSnapshotSource {
    fn fetch(&self) -> Result<Vec<R>, SourceError> {
        let document = self.read_document()?;
        decode_records(&document)
    }
}

/// Decodes a bare JSON array or an envelope object holding one.
pub fn decode_records<R: DeserializeOwned>(document: &str) -> Result<Vec<R>, SourceError> {
    let value: Value = serde_json::from_str(document)?;
    let list = match value {
        Value::Array(_) => value,
        Value::Object(mut object) => ENVELOPE_KEYS
            .iter()
            .find_map(|key| object.remove(*key).filter(Value::is_array))
            .ok_or_else(|| {
                SourceError::Shape(format!("expected one of {ENVELOPE_KEYS:?} to hold an array"))
            })?,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(SourceError::Shape(format!(
                "expected array or object, got {}",
                json_type_name(&other)
            )))
        }
    };
    Ok(serde_json::from_value(list)?)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_records, SourceError};
    use crate::model::project::ProjectRecord;

    #[test]
    fn accepts_bare_array_and_envelope() {
        let bare: Vec<ProjectRecord> = decode_records(r#"[{ "id": 1 }]"#).unwrap();
        assert_eq!(bare.len(), 1);

        let wrapped: Vec<ProjectRecord> =
            decode_records(r#"{ "data": [{ "id": 1 }, { "id": 2 }], "total": 2 }"#).unwrap();
        assert_eq!(wrapped.len(), 2);
    }

    #[test]
    fn null_document_is_empty() {
        let records: Vec<ProjectRecord> = decode_records("null").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn scalar_document_is_shape_error() {
        let err = decode_records::<ProjectRecord>("42").unwrap_err();
        assert!(matches!(err, SourceError::Shape(_)));
        assert_eq!(err.kind(), "shape");
    }
}
