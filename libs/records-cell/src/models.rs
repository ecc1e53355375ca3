use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// One entry in the intermediate operation list bridging collected patient
/// data and the relational schema.
///
/// Serializes to `{"table": ..., "columns": {...}}` for single records and
/// `{"table": ..., "records": [{...}]}` for batches; the distinct field
/// names make the untagged representation round-trip exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappedOperation {
    Single {
        table: String,
        columns: Map<String, Value>,
    },
    Batch {
        table: String,
        records: Vec<Map<String, Value>>,
    },
}

impl MappedOperation {
    pub fn table(&self) -> &str {
        match self {
            MappedOperation::Single { table, .. } => table,
            MappedOperation::Batch { table, .. } => table,
        }
    }
}

/// Result of a successful import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub status: String,
    pub patient_id: Option<i64>,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for ImportError {
    fn from(e: sqlx::Error) -> Self {
        ImportError::Database(e.to_string())
    }
}
