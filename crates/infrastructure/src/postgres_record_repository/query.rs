use parrot_application::{RecordFilter, RecordSearch, RecordSort};
use parrot_domain::SortDirection;
use sqlx::QueryBuilder;

use super::*;

const DISPLAY_TIMESTAMP_FORMAT: &str = r#"'YYYY-MM-DD"T"HH24:MI:SS"Z"'"#;

impl PostgresRecordRepository {
    pub(super) async fn query_records_impl(
        &self,
        resource: &str,
        query: &RecordQuery,
    ) -> AppResult<RecordPage> {
        let mut count_builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM resource_records");
        push_conditions(&mut count_builder, resource, query);
        let total = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to count matching records in resource '{resource}': {error}"
                ))
            })?;
        let total = usize::try_from(total).map_err(|error| {
            AppError::Internal(format!("invalid record count for '{resource}': {error}"))
        })?;
        if query.offset >= total {
            return Ok(RecordPage {
                records: Vec::new(),
                total,
            });
        }

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT id, resource, data, created_at, updated_at FROM resource_records",
        );
        push_conditions(&mut builder, resource, query);

        builder.push(" ORDER BY ");
        if let Some(sort) = &query.sort {
            push_sort_clause(&mut builder, sort);
            builder.push(", ");
        }
        builder.push("id ASC");

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        builder.push(" OFFSET ");
        builder.push_bind(i64::try_from(query.offset).unwrap_or(i64::MAX));

        let rows = builder
            .build_query_as::<RecordRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to query records in resource '{resource}': {error}"
                ))
            })?;

        let records = rows
            .into_iter()
            .map(record_from_row)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(RecordPage { records, total })
    }
}

fn push_conditions(builder: &mut QueryBuilder<'_, Postgres>, resource: &str, query: &RecordQuery) {
    builder.push(" WHERE resource = ");
    builder.push_bind(resource.to_owned());

    for filter in &query.filters {
        builder.push(" AND ");
        push_filter_condition(builder, filter);
    }

    if let Some(search) = &query.search {
        builder.push(" AND ");
        push_search_condition(builder, search);
    }
}

/// Pushes the text form of a column, matching how records render values.
fn push_text_expression(builder: &mut QueryBuilder<'_, Postgres>, field: &str) {
    match field {
        "id" => {
            builder.push("id::text");
        }
        "created_at" | "updated_at" => {
            builder.push("to_char(");
            builder.push(field);
            builder.push(" AT TIME ZONE 'UTC', ");
            builder.push(DISPLAY_TIMESTAMP_FORMAT);
            builder.push(')');
        }
        _ => {
            builder.push("(data ->> ");
            builder.push_bind(field.to_owned());
            builder.push(')');
        }
    }
}

fn push_json_type(builder: &mut QueryBuilder<'_, Postgres>, field: &str) {
    builder.push("jsonb_typeof(data -> ");
    builder.push_bind(field.to_owned());
    builder.push(')');
}

fn push_contains(builder: &mut QueryBuilder<'_, Postgres>, field: &str, needle: &str) {
    builder.push("strpos(lower(");
    push_text_expression(builder, field);
    builder.push("), ");
    builder.push_bind(needle.to_owned());
    builder.push(") > 0");
}

fn push_filter_condition(builder: &mut QueryBuilder<'_, Postgres>, filter: &RecordFilter) {
    match filter {
        RecordFilter::Contains { field, needle } => {
            builder.push("COALESCE(");
            push_contains(builder, field, needle);
            builder.push(", false)");
        }
        RecordFilter::Equals { field, value } => {
            builder.push("COALESCE(");
            push_text_expression(builder, field);
            builder.push(", '') = ");
            builder.push_bind(value.clone());
        }
        RecordFilter::DateRange { field, from, to } => {
            builder.push("(length(");
            push_text_expression(builder, field);
            builder.push(") >= 10");
            if let Some(from) = from {
                builder.push(" AND left(");
                push_text_expression(builder, field);
                builder.push(", 10) COLLATE \"C\" >= ");
                builder.push_bind(from.clone());
            }
            if let Some(to) = to {
                builder.push(" AND left(");
                push_text_expression(builder, field);
                builder.push(", 10) COLLATE \"C\" <= ");
                builder.push_bind(to.clone());
            }
            builder.push(')');
        }
        RecordFilter::Boolean { field, expected } => {
            builder.push("(CASE ");
            push_json_type(builder, field);
            builder.push(" WHEN 'boolean' THEN (data ->> ");
            builder.push_bind(field.clone());
            builder.push(")::boolean WHEN 'number' THEN (data ->> ");
            builder.push_bind(field.clone());
            builder.push(")::numeric <> 0 WHEN 'string' THEN CASE lower(trim(data ->> ");
            builder.push_bind(field.clone());
            builder.push(
                ")) WHEN '1' THEN true WHEN 'true' THEN true WHEN 'yes' THEN true WHEN 'on' THEN true \
                 WHEN '0' THEN false WHEN 'false' THEN false WHEN 'no' THEN false WHEN 'off' THEN false END END) IS NOT DISTINCT FROM ",
            );
            builder.push_bind(*expected);
        }
    }
}

fn push_search_condition(builder: &mut QueryBuilder<'_, Postgres>, search: &RecordSearch) {
    if search.fields.is_empty() {
        builder.push("true");
        return;
    }

    builder.push('(');
    for (index, field) in search.fields.iter().enumerate() {
        if index > 0 {
            builder.push(" OR ");
        }
        builder.push("COALESCE(");
        push_contains(builder, field, search.term.as_str());
        builder.push(", false)");
    }
    builder.push(')');
}

/// Numbers sort before text and missing values sort last in both directions.
fn push_sort_clause(builder: &mut QueryBuilder<'_, Postgres>, sort: &RecordSort) {
    let direction = match sort.direction {
        SortDirection::Asc => " ASC",
        SortDirection::Desc => " DESC",
    };

    if matches!(sort.field.as_str(), "id" | "created_at" | "updated_at") {
        push_text_expression(builder, sort.field.as_str());
        builder.push(" COLLATE \"C\"");
        builder.push(direction);
        return;
    }

    builder.push("CASE COALESCE(");
    push_json_type(builder, sort.field.as_str());
    builder.push(", 'null') WHEN 'number' THEN 0 WHEN 'null' THEN 2 ELSE 1 END ASC, ");

    builder.push("CASE WHEN ");
    push_json_type(builder, sort.field.as_str());
    builder.push(" = 'number' THEN (data ->> ");
    builder.push_bind(sort.field.clone());
    builder.push(")::double precision END");
    builder.push(direction);
    builder.push(", ");

    builder.push("lower(data ->> ");
    builder.push_bind(sort.field.clone());
    builder.push(") COLLATE \"C\"");
    builder.push(direction);
}
