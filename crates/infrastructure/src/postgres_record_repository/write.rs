use super::*;

impl PostgresRecordRepository {
    pub(super) async fn create_record_impl(
        &self,
        resource: &str,
        data: Value,
        unique_values: Vec<UniqueFieldValue>,
    ) -> AppResult<Record> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start record create transaction for resource '{resource}': {error}"
            ))
        })?;

        let created = sqlx::query_as::<_, RecordRow>(
            r#"
            INSERT INTO resource_records (id, resource, data)
            VALUES ($1, $2, $3)
            RETURNING id, resource, data, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(resource)
        .bind(&data)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to create record in resource '{resource}': {error}"
            ))
        })?;

        index_unique_values(&mut transaction, resource, created.id, &unique_values).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit record create transaction for resource '{resource}': {error}"
            ))
        })?;

        tracing::debug!(resource, record_id = %created.id, "created record");
        record_from_row(created)
    }

    pub(super) async fn update_record_impl(
        &self,
        resource: &str,
        record_id: &str,
        data: Value,
        unique_values: Vec<UniqueFieldValue>,
    ) -> AppResult<Record> {
        let record_uuid =
            parse_record_uuid(record_id).ok_or_else(|| record_not_found_error(resource, record_id))?;

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start record update transaction for resource '{resource}': {error}"
            ))
        })?;

        let updated = sqlx::query_as::<_, RecordRow>(
            r#"
            UPDATE resource_records
            SET data = $3,
                updated_at = now()
            WHERE resource = $1 AND id = $2
            RETURNING id, resource, data, created_at, updated_at
            "#,
        )
        .bind(resource)
        .bind(record_uuid)
        .bind(&data)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to update record '{record_id}' in resource '{resource}': {error}"
            ))
        })?
        .ok_or_else(|| record_not_found_error(resource, record_id))?;

        sqlx::query(
            r#"
            DELETE FROM resource_record_unique_values
            WHERE resource = $1 AND record_id = $2
            "#,
        )
        .bind(resource)
        .bind(record_uuid)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to clear unique field index for record '{record_id}' in resource '{resource}': {error}"
            ))
        })?;

        index_unique_values(&mut transaction, resource, record_uuid, &unique_values).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit record update transaction for resource '{resource}': {error}"
            ))
        })?;

        tracing::debug!(resource, record_id, "updated record");
        record_from_row(updated)
    }
}
