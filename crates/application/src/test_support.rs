use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parrot_core::{AppError, AppResult};
use parrot_domain::Record;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::record_ports::{RecordPage, RecordQuery, RecordRepository, UniqueFieldValue};

type UniqueKey = (String, String, String);

/// Recording repository shared by service tests.
#[derive(Default)]
pub(crate) struct FakeRecordRepository {
    records: Mutex<BTreeMap<(String, String), Record>>,
    unique_values: Mutex<HashMap<UniqueKey, String>>,
    next_id: AtomicUsize,
    writes: AtomicUsize,
}

impl FakeRecordRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub(crate) async fn record(&self, resource: &str, record_id: &str) -> Option<Record> {
        self.records
            .lock()
            .await
            .get(&(resource.to_owned(), record_id.to_owned()))
            .cloned()
    }

    pub(crate) async fn seed(&self, resource: &str, data: Value) -> Record {
        self.create_record(resource, data, Vec::new())
            .await
            .unwrap_or_else(|_| unreachable!())
    }

    async fn claim_unique_values(
        &self,
        resource: &str,
        record_id: &str,
        unique_values: Vec<UniqueFieldValue>,
    ) -> AppResult<()> {
        let mut index = self.unique_values.lock().await;
        for unique_value in &unique_values {
            let key = (
                resource.to_owned(),
                unique_value.field_name.clone(),
                unique_value.field_value_hash.clone(),
            );
            if index
                .get(&key)
                .is_some_and(|owner| owner.as_str() != record_id)
            {
                return Err(AppError::Conflict(format!(
                    "unique constraint violated for field '{}'",
                    unique_value.field_name
                )));
            }
        }

        index.retain(|(owner_resource, _, _), owner| {
            !(owner_resource == resource && owner == record_id)
        });
        for unique_value in unique_values {
            index.insert(
                (
                    resource.to_owned(),
                    unique_value.field_name,
                    unique_value.field_value_hash,
                ),
                record_id.to_owned(),
            );
        }

        Ok(())
    }

    async fn ensure_all_exist(&self, resource: &str, record_ids: &[String]) -> AppResult<()> {
        let records = self.records.lock().await;
        for record_id in record_ids {
            if !records.contains_key(&(resource.to_owned(), record_id.clone())) {
                return Err(AppError::NotFound(format!(
                    "record '{record_id}' does not exist in resource '{resource}'"
                )));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl RecordRepository for FakeRecordRepository {
    async fn create_record(
        &self,
        resource: &str,
        data: Value,
        unique_values: Vec<UniqueFieldValue>,
    ) -> AppResult<Record> {
        let record_id = format!("{:06}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.claim_unique_values(resource, &record_id, unique_values)
            .await?;

        let now = Utc::now();
        let record = Record::new(record_id.clone(), resource, data, now, now)?;
        self.records
            .lock()
            .await
            .insert((resource.to_owned(), record_id), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(record)
    }

    async fn update_record(
        &self,
        resource: &str,
        record_id: &str,
        data: Value,
        unique_values: Vec<UniqueFieldValue>,
    ) -> AppResult<Record> {
        let Some(existing) = self.record(resource, record_id).await else {
            return Err(AppError::NotFound(format!(
                "record '{record_id}' does not exist in resource '{resource}'"
            )));
        };
        self.claim_unique_values(resource, record_id, unique_values)
            .await?;

        let record = Record::new(record_id, resource, data, existing.created_at(), Utc::now())?;
        self.records
            .lock()
            .await
            .insert((resource.to_owned(), record_id.to_owned()), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(record)
    }

    async fn find_record(&self, resource: &str, record_id: &str) -> AppResult<Option<Record>> {
        Ok(self.record(resource, record_id).await)
    }

    async fn delete_record(&self, resource: &str, record_id: &str) -> AppResult<()> {
        let removed = self
            .records
            .lock()
            .await
            .remove(&(resource.to_owned(), record_id.to_owned()));
        if removed.is_none() {
            return Err(AppError::NotFound(format!(
                "record '{record_id}' does not exist in resource '{resource}'"
            )));
        }

        self.unique_values
            .lock()
            .await
            .retain(|(owner_resource, _, _), owner| {
                !(owner_resource == resource && owner == record_id)
            });
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn query_records(&self, resource: &str, query: &RecordQuery) -> AppResult<RecordPage> {
        let records = self.records.lock().await;
        Ok(query.apply(
            records
                .values()
                .filter(|record| record.resource().as_str() == resource)
                .cloned(),
        ))
    }

    async fn count_records(&self, resource: &str) -> AppResult<usize> {
        Ok(self
            .records
            .lock()
            .await
            .values()
            .filter(|record| record.resource().as_str() == resource)
            .count())
    }

    async fn find_unique_owner(
        &self,
        resource: &str,
        unique_value: &UniqueFieldValue,
    ) -> AppResult<Option<String>> {
        Ok(self
            .unique_values
            .lock()
            .await
            .get(&(
                resource.to_owned(),
                unique_value.field_name.clone(),
                unique_value.field_value_hash.clone(),
            ))
            .cloned())
    }

    async fn bulk_delete(&self, resource: &str, record_ids: &[String]) -> AppResult<usize> {
        self.ensure_all_exist(resource, record_ids).await?;
        for record_id in record_ids {
            self.delete_record(resource, record_id).await?;
        }

        Ok(record_ids.len())
    }

    async fn bulk_set_field(
        &self,
        resource: &str,
        record_ids: &[String],
        field: &str,
        value: Value,
        unique: bool,
    ) -> AppResult<usize> {
        self.ensure_all_exist(resource, record_ids).await?;
        let blank = value.is_null() || value.as_str().is_some_and(|text| text.trim().is_empty());
        if unique && !blank && record_ids.len() > 1 {
            return Err(AppError::Conflict(format!(
                "unique constraint violated for field '{field}'"
            )));
        }
        let mut records = self.records.lock().await;
        for record_id in record_ids {
            let key = (resource.to_owned(), record_id.clone());
            if let Some(record) = records.get(&key) {
                let data = Value::Object(record.data_with(field, value.clone()));
                let updated =
                    Record::new(record_id.clone(), resource, data, record.created_at(), Utc::now())?;
                records.insert(key, updated);
            }
        }
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(record_ids.len())
    }
}
