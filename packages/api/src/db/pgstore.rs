use serde_json::Value;
use sqlx::PgPool;
use store::docstore::{DocumentStore, Fields, SortDirection, WriteOp};
use store::StoreError;
use uuid::Uuid;

/// The `entries` uniqueness index; violations of it get the user-facing
/// duplicate-number message instead of a generic conflict.
const ENTRY_NUMBER_INDEX: &str = "documents_entries_unique_number";

/// PostgreSQL-backed document store.
///
/// Documents live in one table keyed by `(collection, id)`, with the field
/// map in a `jsonb` column. See `migrations/` for the schema, the GIN index
/// that serves containment queries, and the partial unique index enforcing
/// entry-number uniqueness at the store layer.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DocumentStore for PgStore {
    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: Fields,
    ) -> Result<String, StoreError> {
        let id = id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        sqlx::query(
            "INSERT INTO documents (collection, id, fields) VALUES ($1, $2, $3)
             ON CONFLICT (collection, id) DO UPDATE SET fields = EXCLUDED.fields, updated_at = NOW()",
        )
        .bind(collection)
        .bind(&id)
        .bind(Value::Object(fields))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(id)
    }

    async fn read(&self, collection: &str, id: &str) -> Result<Option<Fields>, StoreError> {
        let row: Option<(Value,)> =
            sqlx::query_as("SELECT fields FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        match row {
            Some((Value::Object(fields),)) => Ok(Some(fields)),
            Some(_) => Err(StoreError::malformed(collection, "fields is not an object")),
            None => Ok(None),
        }
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET fields = fields || $3, updated_at = NOW()
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Value::Object(patch))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        filters: Vec<(String, Value)>,
        sort_key: &str,
        direction: SortDirection,
    ) -> Result<Vec<(String, Fields)>, StoreError> {
        let mut filter_object = Fields::new();
        for (key, value) in filters {
            filter_object.insert(key, value);
        }
        let order = match direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        // `order` is one of two fixed literals, never user input.
        let sql = format!(
            "SELECT id, fields FROM documents
             WHERE collection = $1 AND fields @> $2
             ORDER BY fields -> ($3::text) {order}"
        );

        let rows: Vec<(String, Value)> = sqlx::query_as(&sql)
            .bind(collection)
            .bind(Value::Object(filter_object))
            .bind(sort_key)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|(id, fields)| match fields {
                Value::Object(fields) => Ok((id, fields)),
                _ => Err(StoreError::malformed(collection, "fields is not an object")),
            })
            .collect()
    }

    async fn batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        for op in ops {
            match op {
                WriteOp::Set {
                    collection,
                    id,
                    fields,
                } => {
                    sqlx::query(
                        "INSERT INTO documents (collection, id, fields) VALUES ($1, $2, $3)
                         ON CONFLICT (collection, id) DO UPDATE SET fields = EXCLUDED.fields, updated_at = NOW()",
                    )
                    .bind(&collection)
                    .bind(&id)
                    .bind(Value::Object(fields))
                    .execute(&mut *tx)
                    .await
                    .map_err(map_sqlx_error)?;
                }
                WriteOp::Update {
                    collection,
                    id,
                    patch,
                } => {
                    let result = sqlx::query(
                        "UPDATE documents SET fields = fields || $3, updated_at = NOW()
                         WHERE collection = $1 AND id = $2",
                    )
                    .bind(&collection)
                    .bind(&id)
                    .bind(Value::Object(patch))
                    .execute(&mut *tx)
                    .await
                    .map_err(map_sqlx_error)?;
                    if result.rows_affected() == 0 {
                        return Err(StoreError::not_found(&collection, &id));
                    }
                }
                WriteOp::Delete { collection, id } => {
                    sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                        .bind(&collection)
                        .bind(&id)
                        .execute(&mut *tx)
                        .await
                        .map_err(map_sqlx_error)?;
                }
            }
        }
        tx.commit().await.map_err(map_sqlx_error)
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return if db_err.constraint() == Some(ENTRY_NUMBER_INDEX) {
                StoreError::Conflict("This number already exists.".to_string())
            } else {
                StoreError::Conflict("A document with these unique fields already exists.".to_string())
            };
        }
    }
    StoreError::Backend(err.to_string())
}
