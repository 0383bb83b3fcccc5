use super::*;

impl PostgresRecordRepository {
    pub(super) async fn bulk_delete_impl(
        &self,
        resource: &str,
        record_ids: &[String],
    ) -> AppResult<usize> {
        let record_uuids = resolve_record_uuids(resource, record_ids)?;
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start bulk delete transaction for resource '{resource}': {error}"
            ))
        })?;

        ensure_all_exist(&mut transaction, resource, record_ids, &record_uuids).await?;

        let result = sqlx::query(
            r#"
            DELETE FROM resource_records
            WHERE resource = $1 AND id = ANY($2)
            "#,
        )
        .bind(resource)
        .bind(&record_uuids)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to bulk delete records in resource '{resource}': {error}"
            ))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit bulk delete transaction for resource '{resource}': {error}"
            ))
        })?;

        let deleted = affected_rows(result.rows_affected())?;
        tracing::info!(resource, deleted, "bulk deleted records");
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
        let record_uuids = resolve_record_uuids(resource, record_ids)?;
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start bulk update transaction for resource '{resource}': {error}"
            ))
        })?;

        ensure_all_exist(&mut transaction, resource, record_ids, &record_uuids).await?;
        if unique {
            reindex_unique_field(&mut transaction, resource, &record_uuids, field, &value).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE resource_records
            SET data = jsonb_set(data, ARRAY[$3::text], $4, true),
                updated_at = now()
            WHERE resource = $1 AND id = ANY($2)
            "#,
        )
        .bind(resource)
        .bind(&record_uuids)
        .bind(field)
        .bind(&value)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to bulk update field '{field}' in resource '{resource}': {error}"
            ))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit bulk update transaction for resource '{resource}': {error}"
            ))
        })?;

        let updated = affected_rows(result.rows_affected())?;
        tracing::info!(resource, field, updated, "bulk updated records");
        Ok(updated)
    }
}

fn resolve_record_uuids(resource: &str, record_ids: &[String]) -> AppResult<Vec<Uuid>> {
    let mut record_uuids = Vec::with_capacity(record_ids.len());
    for record_id in record_ids {
        let record_uuid =
            parse_record_uuid(record_id).ok_or_else(|| record_not_found_error(resource, record_id))?;
        if !record_uuids.contains(&record_uuid) {
            record_uuids.push(record_uuid);
        }
    }

    Ok(record_uuids)
}

fn affected_rows(rows: u64) -> AppResult<usize> {
    usize::try_from(rows)
        .map_err(|error| AppError::Internal(format!("invalid affected row count: {error}")))
}

async fn ensure_all_exist(
    transaction: &mut sqlx::Transaction<'_, Postgres>,
    resource: &str,
    record_ids: &[String],
    record_uuids: &[Uuid],
) -> AppResult<()> {
    let existing = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id
        FROM resource_records
        WHERE resource = $1 AND id = ANY($2)
        FOR UPDATE
        "#,
    )
    .bind(resource)
    .bind(record_uuids)
    .fetch_all(&mut **transaction)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to lock records for bulk action in resource '{resource}': {error}"
        ))
    })?;

    if let Some(missing) = record_ids.iter().find(|record_id| {
        parse_record_uuid(record_id).is_none_or(|record_uuid| !existing.contains(&record_uuid))
    }) {
        return Err(record_not_found_error(resource, missing));
    }

    Ok(())
}

/// Moves the unique index entries of `field` to the new shared value.
///
/// A non-blank value can only be owned by one record.
async fn reindex_unique_field(
    transaction: &mut sqlx::Transaction<'_, Postgres>,
    resource: &str,
    record_uuids: &[Uuid],
    field: &str,
    value: &Value,
) -> AppResult<()> {
    let blank = value.is_null() || value.as_str().is_some_and(|text| text.trim().is_empty());
    if !blank && record_uuids.len() > 1 {
        return Err(AppError::Conflict(format!(
            "unique constraint violated for field '{field}'"
        )));
    }

    sqlx::query(
        r#"
        DELETE FROM resource_record_unique_values
        WHERE resource = $1 AND field_name = $2 AND record_id = ANY($3)
        "#,
    )
    .bind(resource)
    .bind(field)
    .bind(record_uuids)
    .execute(&mut **transaction)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to clear unique index for field '{field}' in resource '{resource}': {error}"
        ))
    })?;

    if blank {
        return Ok(());
    }

    let Some(record_uuid) = record_uuids.first() else {
        return Ok(());
    };
    let unique_value = UniqueFieldValue {
        field_name: field.to_owned(),
        field_value_hash: hash_json_value(value)?,
    };
    index_unique_values(transaction, resource, *record_uuid, &[unique_value]).await
}
