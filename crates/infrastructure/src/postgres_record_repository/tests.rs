use parrot_application::{
    RecordFilter, RecordQuery, RecordRepository, RecordSearch, RecordSort, UniqueFieldValue,
    hash_json_value,
};
use parrot_core::AppError;
use parrot_domain::SortDirection;
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresRecordRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres record tests: {error}");
    }

    Some(pool)
}

/// Each test writes into its own resource so runs do not interfere.
fn unique_resource(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

fn unique_email(email: &str) -> UniqueFieldValue {
    UniqueFieldValue {
        field_name: "email".to_owned(),
        field_value_hash: hash_json_value(&json!(email)).unwrap_or_else(|_| unreachable!()),
    }
}

#[tokio::test]
async fn unique_values_are_enforced_per_resource() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRecordRepository::new(pool);
    let resource = unique_resource("users");

    let ada = repository
        .create_record(
            resource.as_str(),
            json!({"name": "Ada", "email": "ada@x.com"}),
            vec![unique_email("ada@x.com")],
        )
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));

    let duplicate = repository
        .create_record(
            resource.as_str(),
            json!({"name": "Eve", "email": "ada@x.com"}),
            vec![unique_email("ada@x.com")],
        )
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let owner = repository
        .find_unique_owner(resource.as_str(), &unique_email("ada@x.com"))
        .await
        .unwrap_or_else(|error| panic!("lookup failed: {error}"));
    assert_eq!(owner.as_deref(), Some(ada.id().as_str()));

    let other_resource = unique_resource("members");
    let elsewhere = repository
        .create_record(
            other_resource.as_str(),
            json!({"email": "ada@x.com"}),
            vec![unique_email("ada@x.com")],
        )
        .await;
    assert!(elsewhere.is_ok());

    assert!(
        repository
            .delete_record(resource.as_str(), ada.id().as_str())
            .await
            .is_ok()
    );
    assert!(matches!(
        repository.delete_record(resource.as_str(), "not-a-uuid").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn queries_match_in_memory_semantics() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRecordRepository::new(pool);
    let resource = unique_resource("people");

    for (name, age, active) in [
        ("Ada", json!(36), json!(true)),
        ("grace", json!(85), json!("1")),
        ("Linus", Value::Null, json!(false)),
    ] {
        repository
            .create_record(
                resource.as_str(),
                json!({"name": name, "age": age, "active": active}),
                Vec::new(),
            )
            .await
            .unwrap_or_else(|error| panic!("seed failed: {error}"));
    }

    let sorted = repository
        .query_records(
            resource.as_str(),
            &RecordQuery {
                sort: Some(RecordSort {
                    field: "age".to_owned(),
                    direction: SortDirection::Desc,
                }),
                ..RecordQuery::default()
            },
        )
        .await
        .unwrap_or_else(|error| panic!("query failed: {error}"));
    let names: Vec<Option<Value>> = sorted
        .records
        .iter()
        .map(|record| record.field_value("name"))
        .collect();
    assert_eq!(
        names,
        vec![Some(json!("grace")), Some(json!("Ada")), Some(json!("Linus"))]
    );

    let filtered = repository
        .query_records(
            resource.as_str(),
            &RecordQuery {
                filters: vec![RecordFilter::Boolean {
                    field: "active".to_owned(),
                    expected: true,
                }],
                search: Some(RecordSearch {
                    term: "a".to_owned(),
                    fields: vec!["name".to_owned()],
                }),
                limit: Some(1),
                ..RecordQuery::default()
            },
        )
        .await
        .unwrap_or_else(|error| panic!("query failed: {error}"));
    assert_eq!(filtered.total, 2);
    assert_eq!(filtered.records.len(), 1);
}

#[tokio::test]
async fn bulk_actions_roll_back_when_an_id_is_missing() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRecordRepository::new(pool);
    let resource = unique_resource("tasks");

    let mut ids = Vec::new();
    for title in ["one", "two"] {
        let record = repository
            .create_record(resource.as_str(), json!({"title": title}), Vec::new())
            .await
            .unwrap_or_else(|error| panic!("seed failed: {error}"));
        ids.push(record.id().as_str().to_owned());
    }

    let mut with_missing = ids.clone();
    with_missing.push(Uuid::now_v7().to_string());
    assert!(matches!(
        repository.bulk_delete(resource.as_str(), &with_missing).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(repository.count_records(resource.as_str()).await.ok(), Some(2));

    assert_eq!(
        repository
            .bulk_set_field(resource.as_str(), &ids, "done", json!(true), false)
            .await
            .ok(),
        Some(2)
    );
    assert_eq!(repository.bulk_delete(resource.as_str(), &ids).await.ok(), Some(2));
    assert_eq!(repository.count_records(resource.as_str()).await.ok(), Some(0));
}

#[tokio::test]
async fn bulk_writes_keep_cleared_unique_fields_unique() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRecordRepository::new(pool);
    let resource = unique_resource("users");

    let mut ids = Vec::new();
    for email in ["ada@x.com", "grace@x.com"] {
        let record = repository
            .create_record(
                resource.as_str(),
                json!({"email": email}),
                vec![unique_email(email)],
            )
            .await
            .unwrap_or_else(|error| panic!("seed failed: {error}"));
        ids.push(record.id().as_str().to_owned());
    }

    assert_eq!(
        repository
            .bulk_set_field(resource.as_str(), &ids, "email", Value::Null, true)
            .await
            .ok(),
        Some(2)
    );
    assert!(matches!(
        repository
            .bulk_set_field(resource.as_str(), &ids, "email", json!("team@x.com"), true)
            .await,
        Err(AppError::Conflict(_))
    ));
    assert_eq!(
        repository
            .bulk_set_field(resource.as_str(), &ids[..1], "email", json!("team@x.com"), true)
            .await
            .ok(),
        Some(1)
    );
    assert!(matches!(
        repository
            .create_record(
                resource.as_str(),
                json!({"email": "team@x.com"}),
                vec![unique_email("team@x.com")],
            )
            .await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn offsets_past_the_end_return_an_empty_page() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRecordRepository::new(pool);
    let resource = unique_resource("pages");
    repository
        .create_record(resource.as_str(), json!({"title": "Install"}), Vec::new())
        .await
        .unwrap_or_else(|error| panic!("seed failed: {error}"));

    for offset in [1, usize::MAX - 9] {
        let page = repository
            .query_records(
                resource.as_str(),
                &RecordQuery {
                    limit: Some(10),
                    offset,
                    ..RecordQuery::default()
                },
            )
            .await
            .unwrap_or_else(|error| panic!("query failed: {error}"));
        assert!(page.records.is_empty());
        assert_eq!(page.total, 1);
    }
}
