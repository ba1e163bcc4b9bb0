//! Catalog loading: parse raw JSON entries and normalize them into records

use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::CollectionStore;
use crate::types::{Record, ID_FIELD};

/// Normalize one raw catalog entry.
///
/// Underscore-prefixed fields are backend-internal and dropped, except `_id`,
/// which becomes the canonical `id` when no `id` is present. Entries without
/// any identifier get a minted UUID.
pub fn normalize_record(value: Value) -> Result<Record> {
    let Value::Object(fields) = value else {
        return Err(Error::invalid_argument("catalog entries must be JSON objects"));
    };

    let mut record = Record::new();
    let mut legacy_id = None;

    for (key, value) in fields {
        if key == "_id" {
            legacy_id = Some(value);
            continue;
        }
        if key.starts_with('_') {
            continue;
        }
        record.set(key, value);
    }

    if record.id().is_none() {
        match legacy_id {
            Some(Value::String(id)) => record.set(ID_FIELD, Value::String(id)),
            _ => record.set(ID_FIELD, Value::String(Uuid::new_v4().to_string())),
        }
    }

    Ok(record)
}

/// Parse a JSON array of catalog entries into normalized records
pub fn parse_catalog(json: &str) -> Result<Vec<Record>> {
    let values: Vec<Value> = serde_json::from_str(json)?;
    values.into_iter().map(normalize_record).collect()
}

/// Insert records into a collection, optionally clearing it first
pub async fn load_catalog(
    store: &dyn CollectionStore,
    collection: &str,
    records: Vec<Record>,
    replace: bool,
) -> Result<usize> {
    if replace {
        let deleted = store.delete_all(collection).await?;
        if deleted > 0 {
            tracing::info!("Cleared {} records from '{}'", deleted, collection);
        }
    }

    let inserted = store.insert_many(collection, records).await?;
    tracing::info!("Inserted {} records into '{}'", inserted, collection);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_normalize_drops_internal_fields() {
        let record = normalize_record(json!({
            "id": "BK-1",
            "name": "Road Bike",
            "_rid": "backend-internal",
            "_etag": "xyz"
        }))
        .unwrap();

        assert_eq!(record.id(), Some("BK-1"));
        assert!(record.get("_rid").is_none());
        assert!(record.get("_etag").is_none());
        assert_eq!(record.get("name"), Some(&json!("Road Bike")));
    }

    #[test]
    fn test_normalize_promotes_legacy_id() {
        let record = normalize_record(json!({
            "_id": "SE-1",
            "name": "Saddle"
        }))
        .unwrap();
        assert_eq!(record.id(), Some("SE-1"));
    }

    #[test]
    fn test_normalize_mints_missing_id() {
        let record = normalize_record(json!({ "name": "Helmet" })).unwrap();
        let id = record.id().expect("id should be minted");
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn test_normalize_rejects_non_objects() {
        assert!(normalize_record(json!("not an object")).is_err());
    }

    #[test]
    fn test_parse_catalog() {
        let records = parse_catalog(r#"[{"id": "a"}, {"id": "b"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id(), Some("a"));
    }

    #[tokio::test]
    async fn test_load_catalog_replace() {
        let store = MemoryStore::new();
        let first = parse_catalog(r#"[{"id": "a"}]"#).unwrap();
        load_catalog(&store, "products", first, false).await.unwrap();

        let second = parse_catalog(r#"[{"id": "b"}, {"id": "c"}]"#).unwrap();
        let inserted = load_catalog(&store, "products", second, true).await.unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(store.len("products"), 2);
    }
}
