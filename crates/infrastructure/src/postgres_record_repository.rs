use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parrot_application::{
    RecordPage, RecordQuery, RecordRepository, UniqueFieldValue, hash_json_value,
};
use parrot_core::{AppError, AppResult};
use parrot_domain::Record;
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

mod bulk;
mod query;
mod write;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed resource record repository.
#[derive(Clone)]
pub struct PostgresRecordRepository {
    pool: PgPool,
}

impl PostgresRecordRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RecordRow {
    id: Uuid,
    resource: String,
    data: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Ids that are not UUIDs cannot exist in storage.
fn parse_record_uuid(record_id: &str) -> Option<Uuid> {
    Uuid::parse_str(record_id).ok()
}

fn record_from_row(row: RecordRow) -> AppResult<Record> {
    Record::new(
        row.id.to_string(),
        row.resource,
        row.data,
        row.created_at,
        row.updated_at,
    )
}

fn record_not_found_error(resource: &str, record_id: &str) -> AppError {
    AppError::NotFound(format!(
        "record '{record_id}' does not exist in resource '{resource}'"
    ))
}

async fn index_unique_values(
    transaction: &mut sqlx::Transaction<'_, Postgres>,
    resource: &str,
    record_id: Uuid,
    unique_values: &[UniqueFieldValue],
) -> AppResult<()> {
    for unique_value in unique_values {
        let result = sqlx::query(
            r#"
            INSERT INTO resource_record_unique_values (
                resource,
                field_name,
                field_value_hash,
                record_id
            )
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(resource)
        .bind(unique_value.field_name.as_str())
        .bind(unique_value.field_value_hash.as_str())
        .bind(record_id)
        .execute(&mut **transaction)
        .await;

        if let Err(error) = result {
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some("23505")
            {
                return Err(AppError::Conflict(format!(
                    "unique constraint violated for field '{}'",
                    unique_value.field_name
                )));
            }

            return Err(AppError::Internal(format!(
                "failed to index unique value for field '{}' on resource '{resource}': {error}",
                unique_value.field_name
            )));
        }
    }

    Ok(())
}

#[async_trait]
impl RecordRepository for PostgresRecordRepository {
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
        let Some(record_uuid) = parse_record_uuid(record_id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, resource, data, created_at, updated_at
            FROM resource_records
            WHERE resource = $1 AND id = $2
            "#,
        )
        .bind(resource)
        .bind(record_uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find record '{record_id}' in resource '{resource}': {error}"
            ))
        })?;

        row.map(record_from_row).transpose()
    }

    async fn delete_record(&self, resource: &str, record_id: &str) -> AppResult<()> {
        let Some(record_uuid) = parse_record_uuid(record_id) else {
            return Err(record_not_found_error(resource, record_id));
        };

        let result = sqlx::query(
            r#"
            DELETE FROM resource_records
            WHERE resource = $1 AND id = $2
            "#,
        )
        .bind(resource)
        .bind(record_uuid)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to delete record '{record_id}' in resource '{resource}': {error}"
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(record_not_found_error(resource, record_id));
        }

        tracing::debug!(resource, record_id, "deleted record");
        Ok(())
    }

    async fn query_records(&self, resource: &str, query: &RecordQuery) -> AppResult<RecordPage> {
        self.query_records_impl(resource, query).await
    }

    async fn count_records(&self, resource: &str) -> AppResult<usize> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM resource_records
            WHERE resource = $1
            "#,
        )
        .bind(resource)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to count records in resource '{resource}': {error}"
            ))
        })?;

        usize::try_from(count).map_err(|error| {
            AppError::Internal(format!("invalid record count for '{resource}': {error}"))
        })
    }

    async fn find_unique_owner(
        &self,
        resource: &str,
        unique_value: &UniqueFieldValue,
    ) -> AppResult<Option<String>> {
        let owner = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT record_id
            FROM resource_record_unique_values
            WHERE resource = $1 AND field_name = $2 AND field_value_hash = $3
            "#,
        )
        .bind(resource)
        .bind(unique_value.field_name.as_str())
        .bind(unique_value.field_value_hash.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to look up unique value for field '{}' in resource '{resource}': {error}",
                unique_value.field_name
            ))
        })?;

        Ok(owner.map(|record_id| record_id.to_string()))
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
