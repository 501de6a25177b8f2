//! Generic synchronization steps shared by every collection.
//!
//! Each step performs one remote call and touches the local collection only
//! when that call succeeded. Failures are logged and swallowed here.

use serde_json::json;

use bandsite_core::{Filter, Inserted, Ordered, Record, Select, StorageError, TableService};

/// Order index for a zero-based position, or `None` if it does not fit
/// the column.
pub(crate) fn order_index(position: usize) -> Option<i32> {
    i32::try_from(position).ok()
}

/// Where a newly inserted record goes in its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    Append,
    Prepend,
}

/// Run a select and map every row to `R`.
pub(crate) async fn fetch<S, R>(storage: &S, query: Select) -> Result<Vec<R>, StorageError>
where
    S: TableService,
    R: Record,
{
    storage
        .select(query)
        .await?
        .into_iter()
        .map(R::decode)
        .collect()
}

/// Insert one record and return the columns the remote assigned.
pub(crate) async fn insert_one<S, R>(storage: &S, record: &R) -> Result<Inserted, StorageError>
where
    S: TableService,
    R: Record,
{
    let payload = record.encode()?;
    let row = storage
        .insert(R::TABLE, vec![payload])
        .await?
        .into_iter()
        .next()
        .ok_or(StorageError::EmptyResponse(R::TABLE.as_str()))?;
    Inserted::decode(R::TABLE, row)
}

async fn write_update<S, R>(storage: &S, record: &R, id: i64) -> Result<(), StorageError>
where
    S: TableService,
    R: Record,
{
    let patch = record.encode_update()?;
    storage.update(R::TABLE, patch, vec![Filter::id(id)]).await
}

pub(crate) async fn add<S, R>(
    storage: &S,
    items: &mut Vec<R>,
    mut record: R,
    placement: Placement,
) -> Option<i64>
where
    S: TableService,
    R: Record,
{
    match insert_one(storage, &record).await {
        Ok(inserted) => {
            record.assign(&inserted);
            match placement {
                Placement::Append => items.push(record),
                Placement::Prepend => items.insert(0, record),
            }
            Some(inserted.id)
        }
        Err(e) => {
            tracing::error!("Error adding {} row: {}", R::TABLE, e);
            None
        }
    }
}

pub(crate) async fn remove<S, R>(storage: &S, items: &mut Vec<R>, id: i64) -> bool
where
    S: TableService,
    R: Record,
{
    match storage.delete(R::TABLE, vec![Filter::id(id)]).await {
        Ok(()) => {
            let before = items.len();
            items.retain(|item| item.id() != Some(id));
            items.len() != before
        }
        Err(e) => {
            tracing::error!("Error deleting {} row {}: {}", R::TABLE, id, e);
            false
        }
    }
}

/// Replace the stored row and the local entry with `record`.
/// Records without an id are skipped without a remote call.
pub(crate) async fn update<S, R>(storage: &S, items: &mut [R], record: R) -> bool
where
    S: TableService,
    R: Record,
{
    let Some(id) = record.id() else {
        return false;
    };

    if let Err(e) = write_update(storage, &record, id).await {
        tracing::error!("Error updating {} row {}: {}", R::TABLE, id, e);
        return false;
    }

    match items.iter_mut().find(|item| item.id() == Some(id)) {
        Some(slot) => {
            *slot = record;
            true
        }
        None => false,
    }
}

/// Apply `new_order` locally, then persist each position in sequence.
///
/// Local state is replaced before any remote call. The first failed update
/// stops the sequence; positions already written stay written. Returns the
/// number of updates the remote accepted.
pub(crate) async fn reorder<S, R>(storage: &S, items: &mut Vec<R>, new_order: Vec<R>) -> usize
where
    S: TableService,
    R: Ordered,
{
    if order_index(new_order.len().saturating_sub(1)).is_none() {
        tracing::error!("Too many {} rows to reorder: {}", R::TABLE, new_order.len());
        return 0;
    }

    *items = new_order;
    for (position, item) in items.iter_mut().enumerate() {
        if let Some(index) = order_index(position) {
            item.set_order_index(index);
        }
    }

    let mut confirmed = 0;
    for item in items.iter() {
        let Some(id) = item.id() else {
            tracing::warn!("Skipping unsaved {} row in reorder", R::TABLE);
            continue;
        };

        let patch = json!({ "order_index": item.order_index() });
        if let Err(e) = storage.update(R::TABLE, patch, vec![Filter::id(id)]).await {
            tracing::error!("Error reordering {} row {}: {}", R::TABLE, id, e);
            break;
        }
        confirmed += 1;
    }

    confirmed
}

pub(crate) async fn clear<S, R>(storage: &S, items: &mut Vec<R>) -> bool
where
    S: TableService,
    R: Record,
{
    match storage.delete_all(R::TABLE).await {
        Ok(()) => {
            items.clear();
            true
        }
        Err(e) => {
            tracing::error!("Error clearing {}: {}", R::TABLE, e);
            false
        }
    }
}
