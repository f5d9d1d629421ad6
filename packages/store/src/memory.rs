use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::docstore::{DocumentStore, Fields, SortDirection, WriteOp};
use crate::error::StoreError;

/// In-memory DocumentStore for tests and local fallback.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<HashMap<String, BTreeMap<String, Fields>>>>,
    next_id: Arc<Mutex<u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("doc-{next}")
    }

    fn apply(
        data: &mut HashMap<String, BTreeMap<String, Fields>>,
        op: &WriteOp,
    ) -> Result<(), StoreError> {
        match op {
            WriteOp::Set {
                collection,
                id,
                fields,
            } => {
                data.entry(collection.clone())
                    .or_default()
                    .insert(id.clone(), fields.clone());
            }
            WriteOp::Update {
                collection,
                id,
                patch,
            } => {
                let existing = data
                    .get_mut(collection)
                    .and_then(|docs| docs.get_mut(id))
                    .ok_or_else(|| StoreError::not_found(collection, id))?;
                for (key, value) in patch {
                    existing.insert(key.clone(), value.clone());
                }
            }
            WriteOp::Delete { collection, id } => {
                if let Some(docs) = data.get_mut(collection) {
                    docs.remove(id);
                }
            }
        }
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: Fields,
    ) -> Result<String, StoreError> {
        let id = id
            .map(str::to_string)
            .unwrap_or_else(|| self.generate_id());
        let mut data = self.collections.lock().unwrap();
        data.entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn read(&self, collection: &str, id: &str) -> Result<Option<Fields>, StoreError> {
        let data = self.collections.lock().unwrap();
        Ok(data
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<(), StoreError> {
        let mut data = self.collections.lock().unwrap();
        Self::apply(
            &mut data,
            &WriteOp::Update {
                collection: collection.to_string(),
                id: id.to_string(),
                patch,
            },
        )
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut data = self.collections.lock().unwrap();
        if let Some(docs) = data.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        filters: Vec<(String, Value)>,
        sort_key: &str,
        direction: SortDirection,
    ) -> Result<Vec<(String, Fields)>, StoreError> {
        let data = self.collections.lock().unwrap();
        let mut matches: Vec<(String, Fields)> = data
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| {
                        filters
                            .iter()
                            .all(|(key, value)| fields.get(key) == Some(value))
                    })
                    .map(|(id, fields)| (id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();

        matches.sort_by(|(_, a), (_, b)| {
            let ordering = value_cmp(a.get(sort_key), b.get(sort_key));
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        Ok(matches)
    }

    async fn batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut data = self.collections.lock().unwrap();
        // Stage against a copy so a failing op leaves nothing applied.
        let mut staged = data.clone();
        for op in &ops {
            Self::apply(&mut staged, op)?;
        }
        *data = staged;
        Ok(())
    }
}

fn value_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn create_read_update_delete() {
        let store = MemoryStore::new();

        let id = store
            .create("cabinets", Some("03-3-20-53"), fields(json!({"code": "03-3-20-53"})))
            .await
            .unwrap();
        assert_eq!(id, "03-3-20-53");

        let doc = store.read("cabinets", &id).await.unwrap().unwrap();
        assert_eq!(doc["code"], "03-3-20-53");

        store
            .update("cabinets", &id, fields(json!({"type": "Huawei"})))
            .await
            .unwrap();
        let doc = store.read("cabinets", &id).await.unwrap().unwrap();
        assert_eq!(doc["type"], "Huawei");

        store.delete("cabinets", &id).await.unwrap();
        assert!(store.read("cabinets", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_missing_document_fails() {
        let store = MemoryStore::new();
        let err = store
            .update("users", "nobody", Fields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn query_filters_and_sorts() {
        let store = MemoryStore::new();
        for (number, ts) in [("1", 10), ("2", 30), ("3", 20)] {
            store
                .create(
                    "entries",
                    None,
                    fields(json!({"userId": "u1", "number": number, "timestamp": ts})),
                )
                .await
                .unwrap();
        }
        store
            .create(
                "entries",
                None,
                fields(json!({"userId": "u2", "number": "9", "timestamp": 99})),
            )
            .await
            .unwrap();

        let results = store
            .query(
                "entries",
                vec![("userId".to_string(), json!("u1"))],
                "timestamp",
                SortDirection::Descending,
            )
            .await
            .unwrap();
        let numbers: Vec<&str> = results
            .iter()
            .map(|(_, f)| f["number"].as_str().unwrap())
            .collect();
        assert_eq!(numbers, ["2", "3", "1"]);
    }

    #[tokio::test]
    async fn failed_batch_applies_nothing() {
        let store = MemoryStore::new();
        store
            .create("users", Some("u1"), fields(json!({"email": "a@b.c"})))
            .await
            .unwrap();

        let err = store
            .batch(vec![
                WriteOp::Delete {
                    collection: "users".to_string(),
                    id: "u1".to_string(),
                },
                WriteOp::Update {
                    collection: "users".to_string(),
                    id: "missing".to_string(),
                    patch: Fields::new(),
                },
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        // The delete in the same batch must not have gone through.
        assert!(store.read("users", "u1").await.unwrap().is_some());
    }
}
