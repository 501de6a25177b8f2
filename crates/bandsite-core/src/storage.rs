use std::future::Future;

use serde_json::Value;

use crate::error::StorageError;
use crate::query::{Filter, Select, Table};

/// Relational access to the remote tables. Rows travel as JSON objects.
pub trait TableService: Send + Sync {
    /// Run a select and return the matching rows.
    fn select(&self, query: Select)
        -> impl Future<Output = Result<Vec<Value>, StorageError>> + Send;

    /// Insert rows and return them as stored, with server-assigned columns.
    fn insert(
        &self,
        table: Table,
        rows: Vec<Value>,
    ) -> impl Future<Output = Result<Vec<Value>, StorageError>> + Send;

    /// Apply `patch` to every row matching all `filters`.
    fn update(
        &self,
        table: Table,
        patch: Value,
        filters: Vec<Filter>,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete every row matching all `filters`.
    fn delete(
        &self,
        table: Table,
        filters: Vec<Filter>,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete every row of the table.
    fn delete_all(&self, table: Table) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Object storage for uploaded assets.
pub trait ObjectStorage: Send + Sync {
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Public URL of an object. Does not check that the object exists.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Everything the content store needs from its backend.
pub trait StorageService: TableService + ObjectStorage {}

impl<T: TableService + ObjectStorage> StorageService for T {}

// In-memory implementation for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::DateTime;

    /// Base timestamp for `created_at` stamping; each insert advances one second.
    const CLOCK_START_SECS: i64 = 1_700_000_000;

    /// A call received by [`MemoryStorage`], recorded for assertions.
    #[derive(Debug, Clone, PartialEq)]
    pub enum StorageCall {
        Select(Select),
        Insert {
            table: Table,
            rows: Vec<Value>,
        },
        Update {
            table: Table,
            patch: Value,
            filters: Vec<Filter>,
        },
        Delete {
            table: Table,
            filters: Vec<Filter>,
        },
        DeleteAll(Table),
        Upload {
            bucket: String,
            path: String,
        },
    }

    impl StorageCall {
        pub fn table(&self) -> Option<Table> {
            match self {
                StorageCall::Select(select) => Some(select.table),
                StorageCall::Insert { table, .. }
                | StorageCall::Update { table, .. }
                | StorageCall::Delete { table, .. }
                | StorageCall::DeleteAll(table) => Some(*table),
                StorageCall::Upload { .. } => None,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Operation {
        Select,
        Insert,
        Update,
        Delete,
    }

    #[derive(Default)]
    struct State {
        tables: HashMap<Table, Vec<Value>>,
        next_id: HashMap<Table, i64>,
        clock: i64,
        objects: HashMap<(String, String), Vec<u8>>,
        // Remaining successful calls before an operation starts failing.
        failures: HashMap<(Table, Operation), usize>,
        fail_uploads: bool,
        calls: Vec<StorageCall>,
    }

    impl State {
        fn check(&mut self, table: Table, op: Operation) -> Result<(), StorageError> {
            match self.failures.get_mut(&(table, op)) {
                Some(0) => Err(StorageError::Api {
                    status: 500,
                    message: format!("injected {:?} failure on {}", op, table),
                }),
                Some(remaining) => {
                    *remaining -= 1;
                    Ok(())
                }
                None => Ok(()),
            }
        }

        fn stamp(&mut self, table: Table, mut row: Value) -> Value {
            let next = self.next_id.entry(table).or_insert(1);
            if let Some(obj) = row.as_object_mut() {
                match obj.get("id").and_then(Value::as_i64) {
                    Some(id) => *next = (*next).max(id + 1),
                    None => {
                        obj.insert("id".to_string(), Value::from(*next));
                        *next += 1;
                    }
                }
                if !obj.contains_key("created_at") {
                    self.clock += 1;
                    let ts = DateTime::from_timestamp(CLOCK_START_SECS + self.clock, 0)
                        .unwrap_or_default();
                    obj.insert("created_at".to_string(), Value::from(ts.to_rfc3339()));
                }
            }
            row
        }
    }

    fn matches_all(filters: &[Filter], row: &Value) -> bool {
        filters.iter().all(|f| f.matches(row))
    }

    /// In-memory storage backend for testing.
    ///
    /// Assigns sequential ids per table, stamps `created_at`, and supports
    /// injected failures per table and operation.
    #[derive(Default)]
    pub struct MemoryStorage {
        state: Mutex<State>,
    }

    impl MemoryStorage {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a table. Rows without an `id` get one assigned.
        pub fn with_rows(self, table: Table, rows: Vec<Value>) -> Self {
            {
                let mut state = self.state.lock().unwrap();
                for row in rows {
                    let row = state.stamp(table, row);
                    state.tables.entry(table).or_default().push(row);
                }
            }
            self
        }

        /// Current rows of a table, in insertion order.
        pub fn rows(&self, table: Table) -> Vec<Value> {
            let state = self.state.lock().unwrap();
            state.tables.get(&table).cloned().unwrap_or_default()
        }

        pub fn row(&self, table: Table, id: i64) -> Option<Value> {
            self.rows(table)
                .into_iter()
                .find(|row| row.get("id").and_then(Value::as_i64) == Some(id))
        }

        pub fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
            let state = self.state.lock().unwrap();
            state
                .objects
                .get(&(bucket.to_string(), path.to_string()))
                .cloned()
        }

        pub fn calls(&self) -> Vec<StorageCall> {
            self.state.lock().unwrap().calls.clone()
        }

        /// Calls that touched `table`.
        pub fn calls_on(&self, table: Table) -> Vec<StorageCall> {
            self.calls()
                .into_iter()
                .filter(|call| call.table() == Some(table))
                .collect()
        }

        pub fn clear_calls(&self) {
            self.state.lock().unwrap().calls.clear();
        }

        /// Make every `op` on `table` fail.
        pub fn fail(&self, table: Table, op: Operation) {
            self.fail_after(table, op, 0);
        }

        /// Let `successes` calls of `op` on `table` through, then fail.
        pub fn fail_after(&self, table: Table, op: Operation, successes: usize) {
            let mut state = self.state.lock().unwrap();
            state.failures.insert((table, op), successes);
        }

        pub fn fail_uploads(&self) {
            self.state.lock().unwrap().fail_uploads = true;
        }

        /// Remove all injected failures.
        pub fn heal(&self) {
            let mut state = self.state.lock().unwrap();
            state.failures.clear();
            state.fail_uploads = false;
        }
    }

    impl TableService for MemoryStorage {
        async fn select(&self, query: Select) -> Result<Vec<Value>, StorageError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(StorageCall::Select(query.clone()));
            state.check(query.table, Operation::Select)?;

            let mut rows: Vec<Value> = state
                .tables
                .get(&query.table)
                .map(|rows| {
                    rows.iter()
                        .filter(|row| matches_all(&query.filters, row))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            query.sort(&mut rows);
            if let Some(limit) = query.limit {
                rows.truncate(limit);
            }

            if let Some(embed) = &query.embed {
                let children = state.tables.get(&embed.table).cloned().unwrap_or_default();
                for row in &mut rows {
                    let parent_id = row.get("id").cloned().unwrap_or(Value::Null);
                    let owned: Vec<Value> = children
                        .iter()
                        .filter(|child| child.get(embed.foreign_key) == Some(&parent_id))
                        .cloned()
                        .collect();
                    if let Some(obj) = row.as_object_mut() {
                        obj.insert(embed.table.as_str().to_string(), Value::Array(owned));
                    }
                }
            }

            Ok(rows)
        }

        async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<Vec<Value>, StorageError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(StorageCall::Insert {
                table,
                rows: rows.clone(),
            });
            state.check(table, Operation::Insert)?;

            let stored: Vec<Value> = rows.into_iter().map(|row| state.stamp(table, row)).collect();
            state
                .tables
                .entry(table)
                .or_default()
                .extend(stored.iter().cloned());
            Ok(stored)
        }

        async fn update(
            &self,
            table: Table,
            patch: Value,
            filters: Vec<Filter>,
        ) -> Result<(), StorageError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(StorageCall::Update {
                table,
                patch: patch.clone(),
                filters: filters.clone(),
            });
            state.check(table, Operation::Update)?;

            let Some(fields) = patch.as_object() else {
                return Err(StorageError::Api {
                    status: 400,
                    message: "patch must be a JSON object".to_string(),
                });
            };

            for row in state.tables.entry(table).or_default() {
                if !matches_all(&filters, row) {
                    continue;
                }
                if let Some(obj) = row.as_object_mut() {
                    for (key, value) in fields {
                        obj.insert(key.clone(), value.clone());
                    }
                }
            }
            Ok(())
        }

        async fn delete(&self, table: Table, filters: Vec<Filter>) -> Result<(), StorageError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(StorageCall::Delete {
                table,
                filters: filters.clone(),
            });
            state.check(table, Operation::Delete)?;

            state
                .tables
                .entry(table)
                .or_default()
                .retain(|row| !matches_all(&filters, row));
            Ok(())
        }

        async fn delete_all(&self, table: Table) -> Result<(), StorageError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(StorageCall::DeleteAll(table));
            state.check(table, Operation::Delete)?;

            state.tables.remove(&table);
            Ok(())
        }
    }

    impl ObjectStorage for MemoryStorage {
        async fn upload(
            &self,
            bucket: &str,
            path: &str,
            bytes: Vec<u8>,
            _content_type: Option<&str>,
        ) -> Result<(), StorageError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(StorageCall::Upload {
                bucket: bucket.to_string(),
                path: path.to_string(),
            });
            if state.fail_uploads {
                return Err(StorageError::Api {
                    status: 403,
                    message: "injected upload failure".to_string(),
                });
            }

            state
                .objects
                .insert((bucket.to_string(), path.to_string()), bytes);
            Ok(())
        }

        fn public_url(&self, bucket: &str, path: &str) -> String {
            format!("memory://{}/{}", bucket, path)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::query::Order;
        use serde_json::json;

        #[tokio::test]
        async fn test_insert_assigns_ids() {
            let storage = MemoryStorage::new();

            let stored = storage
                .insert(Table::Shows, vec![json!({"venue": "A"}), json!({"venue": "B"})])
                .await
                .unwrap();

            assert_eq!(stored[0]["id"], 1);
            assert_eq!(stored[1]["id"], 2);
            assert!(stored[0]["created_at"].is_string());
            assert_eq!(storage.rows(Table::Shows).len(), 2);
        }

        #[tokio::test]
        async fn test_seeded_ids_are_respected() {
            let storage = MemoryStorage::new().with_rows(Table::Songs, vec![json!({"id": 7})]);

            let stored = storage
                .insert(Table::Songs, vec![json!({"title": "x"})])
                .await
                .unwrap();

            assert_eq!(stored[0]["id"], 8);
        }

        #[tokio::test]
        async fn test_select_orders_and_limits() {
            let storage = MemoryStorage::new().with_rows(
                Table::TechnicalRider,
                vec![json!({"name": "Mic"}), json!({"name": "Amp"}), json!({"name": "Cable"})],
            );

            let rows = storage
                .select(Select::from(Table::TechnicalRider).order(Order::asc("name")))
                .await
                .unwrap();
            let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
            assert_eq!(names, vec!["Amp", "Cable", "Mic"]);

            let single = storage
                .select(Select::from(Table::TechnicalRider).single())
                .await
                .unwrap();
            assert_eq!(single.len(), 1);
        }

        #[tokio::test]
        async fn test_select_embeds_children() {
            let storage = MemoryStorage::new()
                .with_rows(Table::Albums, vec![json!({"id": 1}), json!({"id": 2})])
                .with_rows(
                    Table::Photos,
                    vec![
                        json!({"album_id": 1, "url": "a"}),
                        json!({"album_id": 2, "url": "b"}),
                        json!({"album_id": 1, "url": "c"}),
                    ],
                );

            let rows = storage
                .select(Select::from(Table::Albums).embed(Table::Photos, "album_id"))
                .await
                .unwrap();

            assert_eq!(rows[0]["photos"].as_array().unwrap().len(), 2);
            assert_eq!(rows[1]["photos"].as_array().unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_update_and_delete_by_filter() {
            let storage = MemoryStorage::new().with_rows(
                Table::Members,
                vec![
                    json!({"name": "A", "order_index": 0}),
                    json!({"name": "B", "order_index": 1}),
                ],
            );

            storage
                .update(Table::Members, json!({"order_index": 5}), vec![Filter::id(2)])
                .await
                .unwrap();
            assert_eq!(storage.row(Table::Members, 2).unwrap()["order_index"], 5);
            assert_eq!(storage.row(Table::Members, 1).unwrap()["order_index"], 0);

            storage
                .delete(Table::Members, vec![Filter::id(1)])
                .await
                .unwrap();
            assert!(storage.row(Table::Members, 1).is_none());

            storage.delete_all(Table::Members).await.unwrap();
            assert!(storage.rows(Table::Members).is_empty());
        }

        #[tokio::test]
        async fn test_fail_after() {
            let storage = MemoryStorage::new();
            storage.fail_after(Table::Photos, Operation::Update, 1);

            let first = storage
                .update(Table::Photos, json!({}), vec![Filter::id(1)])
                .await;
            let second = storage
                .update(Table::Photos, json!({}), vec![Filter::id(2)])
                .await;

            assert!(first.is_ok());
            assert!(matches!(second, Err(StorageError::Api { status: 500, .. })));
            assert_eq!(storage.calls_on(Table::Photos).len(), 2);

            storage.heal();
            assert!(storage
                .update(Table::Photos, json!({}), vec![Filter::id(3)])
                .await
                .is_ok());
        }

        #[tokio::test]
        async fn test_upload_and_public_url() {
            let storage = MemoryStorage::new();
            storage
                .upload("images", "a.png", vec![1, 2, 3], Some("image/png"))
                .await
                .unwrap();

            assert_eq!(storage.object("images", "a.png"), Some(vec![1, 2, 3]));
            assert_eq!(storage.public_url("images", "a.png"), "memory://images/a.png");

            storage.fail_uploads();
            assert!(storage.upload("images", "b.png", vec![], None).await.is_err());
        }
    }
}
