use super::write::ensure_unique_values_available;
use super::*;

impl InMemoryRecordRepository {
    pub(super) async fn bulk_delete_impl(
        &self,
        resource: &str,
        record_ids: &[String],
    ) -> AppResult<usize> {
        let mut records = self.records.write().await;
        ensure_all_exist(&records, resource, record_ids)?;

        let mut unique_index = self.unique_values.write().await;
        let mut deleted = 0;
        for record_id in record_ids {
            if records
                .remove(&record_storage_key(resource, record_id))
                .is_some()
            {
                remove_record_unique_values(&mut unique_index, resource, record_id);
                deleted += 1;
            }
        }
        tracing::info!(resource, deleted, "bulk deleted in-memory records");

        Ok(deleted)
    }

    pub(super) async fn bulk_set_field_impl(
        &self,
        resource: &str,
        record_ids: &[String],
        field: &str,
        value: Value,
        unique: bool,
    ) -> AppResult<usize> {
        let mut records = self.records.write().await;
        ensure_all_exist(&records, resource, record_ids)?;

        let mut unique_index = self.unique_values.write().await;
        if unique {
            reindex_unique_field(&mut unique_index, resource, record_ids, field, &value)?;
        }

        let now = Utc::now();
        let mut updated = 0;
        for record_id in record_ids {
            let key = record_storage_key(resource, record_id);
            let Some(existing) = records.get(&key) else {
                continue;
            };

            let data = existing.data_with(field, value.clone());
            let record = Record::new(
                record_id.as_str(),
                resource,
                Value::Object(data),
                existing.created_at(),
                now,
            )?;
            records.insert(key, record);
            updated += 1;
        }
        tracing::info!(resource, field, updated, "bulk updated in-memory records");

        Ok(updated)
    }
}

fn ensure_all_exist(
    records: &HashMap<RecordKey, Record>,
    resource: &str,
    record_ids: &[String],
) -> AppResult<()> {
    match record_ids
        .iter()
        .find(|record_id| !records.contains_key(&record_storage_key(resource, record_id)))
    {
        Some(missing) => Err(record_not_found_error(resource, missing)),
        None => Ok(()),
    }
}

/// Moves the unique index entries of `field` to the new shared value.
///
/// A non-blank value can only be owned by one record.
fn reindex_unique_field(
    unique_index: &mut HashMap<UniqueKey, String>,
    resource: &str,
    record_ids: &[String],
    field: &str,
    value: &Value,
) -> AppResult<()> {
    let blank = value.is_null() || value.as_str().is_some_and(|text| text.trim().is_empty());
    let claimed = if blank {
        None
    } else {
        if record_ids.len() > 1 {
            return Err(unique_conflict_error(field));
        }
        let unique_value = UniqueFieldValue {
            field_name: field.to_owned(),
            field_value_hash: hash_json_value(value)?,
        };
        ensure_unique_values_available(
            unique_index,
            resource,
            std::slice::from_ref(&unique_value),
            record_ids.first().map(String::as_str),
        )?;
        Some(unique_value)
    };

    unique_index.retain(|(stored_resource, field_name, _), owner| {
        !(stored_resource == resource && field_name == field && record_ids.contains(owner))
    });
    if let (Some(unique_value), Some(record_id)) = (claimed, record_ids.first()) {
        unique_index.insert(
            unique_value_storage_key(resource, &unique_value),
            record_id.clone(),
        );
    }

    Ok(())
}
