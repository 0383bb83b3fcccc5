use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parrot_application::{
    RecordPage, RecordQuery, RecordRepository, UniqueFieldValue, hash_json_value,
};
use parrot_core::{AppError, AppResult};
use parrot_domain::Record;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

mod bulk;
mod write;

#[cfg(test)]
mod tests;

type RecordKey = (String, String);
type UniqueKey = (String, String, String);

/// In-memory resource record repository.
///
/// Record ids are time-ordered UUIDs so id order follows insertion order.
/// Locks are always taken records first, then the unique index.
#[derive(Debug, Default)]
pub struct InMemoryRecordRepository {
    records: RwLock<HashMap<RecordKey, Record>>,
    unique_values: RwLock<HashMap<UniqueKey, String>>,
}

impl InMemoryRecordRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            unique_values: RwLock::new(HashMap::new()),
        }
    }
}

fn record_storage_key(resource: &str, record_id: &str) -> RecordKey {
    (resource.to_owned(), record_id.to_owned())
}

fn unique_value_storage_key(resource: &str, unique_value: &UniqueFieldValue) -> UniqueKey {
    (
        resource.to_owned(),
        unique_value.field_name.clone(),
        unique_value.field_value_hash.clone(),
    )
}

fn record_not_found_error(resource: &str, record_id: &str) -> AppError {
    AppError::NotFound(format!(
        "record '{record_id}' does not exist in resource '{resource}'"
    ))
}

fn unique_conflict_error(field_name: &str) -> AppError {
    AppError::Conflict(format!(
        "unique constraint violated for field '{field_name}'"
    ))
}

fn remove_record_unique_values(
    unique_index: &mut HashMap<UniqueKey, String>,
    resource: &str,
    record_id: &str,
) {
    unique_index.retain(|(stored_resource, _, _), owner| {
        !(stored_resource == resource && owner == record_id)
    });
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    async fn create_record(
        &self,
        resource: &str,
        data: Value,
        unique_values: Vec<UniqueFieldValue>,
    ) -> AppResult<Record> {
        self.create_record_impl(resource, data, unique_values).await
    }

    async fn update_record(
        &self,
        resource: &str,
        record_id: &str,
        data: Value,
        unique_values: Vec<UniqueFieldValue>,
    ) -> AppResult<Record> {
        self.update_record_impl(resource, record_id, data, unique_values)
            .await
    }

    async fn find_record(&self, resource: &str, record_id: &str) -> AppResult<Option<Record>> {
        Ok(self
            .records
            .read()
            .await
            .get(&record_storage_key(resource, record_id))
            .cloned())
    }

    async fn delete_record(&self, resource: &str, record_id: &str) -> AppResult<()> {
        let mut records = self.records.write().await;
        if records
            .remove(&record_storage_key(resource, record_id))
            .is_none()
        {
            return Err(record_not_found_error(resource, record_id));
        }

        let mut unique_index = self.unique_values.write().await;
        remove_record_unique_values(&mut unique_index, resource, record_id);
        tracing::debug!(resource, record_id, "deleted in-memory record");

        Ok(())
    }

    async fn query_records(&self, resource: &str, query: &RecordQuery) -> AppResult<RecordPage> {
        let records = self.records.read().await;
        let scoped = records
            .iter()
            .filter(|((stored_resource, _), _)| stored_resource == resource)
            .map(|(_, record)| record.clone());

        Ok(query.apply(scoped))
    }

    async fn count_records(&self, resource: &str) -> AppResult<usize> {
        Ok(self
            .records
            .read()
            .await
            .keys()
            .filter(|(stored_resource, _)| stored_resource == resource)
            .count())
    }

    async fn find_unique_owner(
        &self,
        resource: &str,
        unique_value: &UniqueFieldValue,
    ) -> AppResult<Option<String>> {
        Ok(self
            .unique_values
            .read()
            .await
            .get(&unique_value_storage_key(resource, unique_value))
            .cloned())
    }

    async fn bulk_delete(&self, resource: &str, record_ids: &[String]) -> AppResult<usize> {
        self.bulk_delete_impl(resource, record_ids).await
    }

    async fn bulk_set_field(
        &self,
        resource: &str,
        record_ids: &[String],
        field: &str,
        value: Value,
        unique: bool,
    ) -> AppResult<usize> {
        self.bulk_set_field_impl(resource, record_ids, field, value, unique)
            .await
    }
}
