//! Domain Layer - Record Trait
//!
//! Every record lives in a flat remote collection, carries a stable string
//! id and is owned by one branch. Raw documents are decoded into records at
//! the boundary; nothing downstream sees untyped data.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{LiveResult, LiveViewError};
use super::scope::BranchId;

/// Field holding the owning branch on every document
pub const BRANCH_FIELD: &str = "upc";

/// Raw document as delivered by the remote store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Build from a JSON object literal; non-objects give an empty document
    pub fn from_value(id: impl Into<String>, value: Value) -> Self {
        let data = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(id, data)
    }

    pub fn field_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }

    pub fn path(&self, collection: &str) -> String {
        format!("{}/{}", collection, self.id)
    }
}

/// Core trait for all remote records
pub trait Record: DeserializeOwned + Clone + 'static {
    /// Remote collection name
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    fn branch(&self) -> &BranchId;

    /// Decode a raw document, validating enumerated fields
    fn from_document(doc: &Document) -> LiveResult<Self> {
        let mut data = doc.data.clone();
        data.insert("id".to_string(), Value::String(doc.id.clone()));
        serde_json::from_value(Value::Object(data)).map_err(|e| LiveViewError::Decode {
            path: doc.path(Self::COLLECTION),
            message: e.to_string(),
        })
    }
}

/// Serialize a payload into document fields
pub fn to_fields<T: Serialize>(value: &T) -> LiveResult<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(LiveViewError::Validation(format!(
            "payload must be an object, got {}",
            other
        ))),
        Err(e) => Err(LiveViewError::Validation(e.to_string())),
    }
}

/// Decode a snapshot, skipping documents that fail validation
pub fn decode_documents<R: Record>(documents: &[Document]) -> Vec<R> {
    documents
        .iter()
        .filter_map(|doc| match R::from_document(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("[DECODE] Skipping document: {}", e);
                None
            }
        })
        .collect()
}
