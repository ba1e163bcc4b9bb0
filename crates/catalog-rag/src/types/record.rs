//! Catalog record: a field-to-value mapping owned by the collection store

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Canonical identifier field
pub const ID_FIELD: &str = "id";

/// Field holding the persisted embedding vector
pub const EMBEDDING_FIELD: &str = "embedding";

/// One domain entity (product, customer, ...) as stored in a collection.
///
/// Backed by `serde_json::Map`, which keeps keys in sorted order, so
/// serializing the same record always yields the same text. The reconciler
/// relies on that to keep re-embeds stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Create from an existing field map
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Get a field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field value
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// The record identifier, if present
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    /// The record identifier, or an error for records that lack one
    pub fn require_id(&self) -> Result<&str> {
        self.id()
            .ok_or_else(|| Error::store(format!("record has no '{}' field", ID_FIELD)))
    }

    /// The stored embedding vector, if present and well-formed
    pub fn embedding(&self) -> Option<Vec<f32>> {
        let values = self.0.get(EMBEDDING_FIELD)?.as_array()?;
        values
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect()
    }

    /// Whether the record carries an embedding field
    pub fn has_embedding(&self) -> bool {
        self.0.contains_key(EMBEDDING_FIELD)
    }

    /// Set the embedding field
    pub fn set_embedding(&mut self, embedding: &[f32]) {
        let values: Vec<Value> = embedding.iter().map(|f| Value::from(*f as f64)).collect();
        self.0.insert(EMBEDDING_FIELD.to_string(), Value::Array(values));
    }

    /// Remove the embedding field; returns whether one was present
    pub fn strip_embedding(&mut self) -> bool {
        self.0.remove(EMBEDDING_FIELD).is_some()
    }

    /// Copy of this record with the embedding field removed
    pub fn without_embedding(&self) -> Record {
        let mut copy = self.clone();
        copy.strip_embedding();
        copy
    }

    /// Serialize all fields except the embedding to compact JSON.
    ///
    /// This is the text submitted to the embedding provider: the stored vector
    /// must never feed back into its own replacement.
    pub fn content_text(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.without_embedding())?)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying field map
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying field map
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
