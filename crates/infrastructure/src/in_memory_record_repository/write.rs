use super::*;

impl InMemoryRecordRepository {
    pub(super) async fn create_record_impl(
        &self,
        resource: &str,
        data: Value,
        unique_values: Vec<UniqueFieldValue>,
    ) -> AppResult<Record> {
        let now = Utc::now();
        let record = Record::new(Uuid::now_v7().to_string(), resource, data, now, now)?;
        let record_id = record.id().as_str().to_owned();

        let mut records = self.records.write().await;
        let mut unique_index = self.unique_values.write().await;
        ensure_unique_values_available(&unique_index, resource, &unique_values, None)?;

        for unique_value in unique_values {
            unique_index.insert(
                unique_value_storage_key(resource, &unique_value),
                record_id.clone(),
            );
        }
        records.insert(record_storage_key(resource, &record_id), record.clone());
        tracing::debug!(resource, record_id = %record_id, "created in-memory record");

        Ok(record)
    }

    pub(super) async fn update_record_impl(
        &self,
        resource: &str,
        record_id: &str,
        data: Value,
        unique_values: Vec<UniqueFieldValue>,
    ) -> AppResult<Record> {
        let record_key = record_storage_key(resource, record_id);
        let mut records = self.records.write().await;
        let Some(existing) = records.get(&record_key) else {
            return Err(record_not_found_error(resource, record_id));
        };
        let updated = Record::new(record_id, resource, data, existing.created_at(), Utc::now())?;

        let mut unique_index = self.unique_values.write().await;
        ensure_unique_values_available(&unique_index, resource, &unique_values, Some(record_id))?;
        remove_record_unique_values(&mut unique_index, resource, record_id);

        for unique_value in unique_values {
            unique_index.insert(
                unique_value_storage_key(resource, &unique_value),
                record_id.to_owned(),
            );
        }
        records.insert(record_key, updated.clone());
        tracing::debug!(resource, record_id, "updated in-memory record");

        Ok(updated)
    }
}

pub(super) fn ensure_unique_values_available(
    unique_index: &HashMap<UniqueKey, String>,
    resource: &str,
    unique_values: &[UniqueFieldValue],
    current_record_id: Option<&str>,
) -> AppResult<()> {
    for unique_value in unique_values {
        let key = unique_value_storage_key(resource, unique_value);
        let taken = unique_index.get(&key).is_some_and(|owner| {
            current_record_id.is_none_or(|record_id| owner.as_str() != record_id)
        });
        if taken {
            return Err(unique_conflict_error(unique_value.field_name.as_str()));
        }
    }

    Ok(())
}
