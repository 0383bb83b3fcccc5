use parrot_application::{
    RecordFilter, RecordQuery, RecordRepository, RecordSort, UniqueFieldValue, hash_json_value,
};
use parrot_core::AppError;
use parrot_domain::SortDirection;
use serde_json::{Value, json};

use super::InMemoryRecordRepository;

fn unique_email(email: &str) -> UniqueFieldValue {
    UniqueFieldValue {
        field_name: "email".to_owned(),
        field_value_hash: hash_json_value(&json!(email)).unwrap_or_else(|_| unreachable!()),
    }
}

async fn seed(repository: &InMemoryRecordRepository, name: &str, email: &str) -> String {
    repository
        .create_record(
            "users",
            json!({"name": name, "email": email}),
            vec![unique_email(email)],
        )
        .await
        .map(|record| record.id().as_str().to_owned())
        .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn records_are_scoped_by_resource() {
    let repository = InMemoryRecordRepository::new();
    seed(&repository, "Ada", "ada@x.com").await;
    let page_id = repository
        .create_record("pages", json!({"title": "Intro"}), Vec::new())
        .await
        .map(|record| record.id().as_str().to_owned())
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(repository.count_records("users").await.ok(), Some(1));
    assert_eq!(repository.count_records("pages").await.ok(), Some(1));
    assert!(
        repository
            .find_record("users", page_id.as_str())
            .await
            .unwrap_or_else(|_| unreachable!())
            .is_none()
    );
}

#[tokio::test]
async fn unique_values_conflict_across_records_but_not_with_self() {
    let repository = InMemoryRecordRepository::new();
    let ada = seed(&repository, "Ada", "ada@x.com").await;

    let duplicate = repository
        .create_record(
            "users",
            json!({"name": "Eve", "email": "ada@x.com"}),
            vec![unique_email("ada@x.com")],
        )
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let renamed = repository
        .update_record(
            "users",
            ada.as_str(),
            json!({"name": "Ada L.", "email": "ada@x.com"}),
            vec![unique_email("ada@x.com")],
        )
        .await;
    assert!(renamed.is_ok());

    let owner = repository
        .find_unique_owner("users", &unique_email("ada@x.com"))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(owner.as_deref(), Some(ada.as_str()));
}

#[tokio::test]
async fn deleting_a_record_releases_its_unique_values() {
    let repository = InMemoryRecordRepository::new();
    let ada = seed(&repository, "Ada", "ada@x.com").await;

    assert!(repository.delete_record("users", ada.as_str()).await.is_ok());
    assert!(matches!(
        repository.delete_record("users", ada.as_str()).await,
        Err(AppError::NotFound(_))
    ));

    seed(&repository, "Eve", "ada@x.com").await;
}

#[tokio::test]
async fn queries_filter_sort_and_paginate() {
    let repository = InMemoryRecordRepository::new();
    for index in 0..5 {
        repository
            .create_record(
                "users",
                json!({"name": format!("user-{index}"), "rank": 10 - index}),
                Vec::new(),
            )
            .await
            .unwrap_or_else(|_| unreachable!());
    }

    let query = RecordQuery {
        filters: vec![RecordFilter::Contains {
            field: "name".to_owned(),
            needle: "user".to_owned(),
        }],
        search: None,
        sort: Some(RecordSort {
            field: "rank".to_owned(),
            direction: SortDirection::Asc,
        }),
        limit: Some(2),
        offset: 0,
    };
    let page = repository
        .query_records("users", &query)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(page.total, 5);
    let names: Vec<Option<Value>> = page
        .records
        .iter()
        .map(|record| record.field_value("name"))
        .collect();
    assert_eq!(names, vec![Some(json!("user-4")), Some(json!("user-3"))]);
}

#[tokio::test]
async fn bulk_operations_are_all_or_nothing() {
    let repository = InMemoryRecordRepository::new();
    let ada = seed(&repository, "Ada", "ada@x.com").await;
    let grace = seed(&repository, "Grace", "grace@x.com").await;

    let partial = repository
        .bulk_delete("users", &[ada.clone(), "missing".to_owned()])
        .await;
    assert!(matches!(partial, Err(AppError::NotFound(_))));
    assert_eq!(repository.count_records("users").await.ok(), Some(2));

    let updated = repository
        .bulk_set_field("users", &[ada.clone(), grace.clone()], "active", json!(true), false)
        .await;
    assert_eq!(updated.ok(), Some(2));
    let record = repository
        .find_record("users", grace.as_str())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(
        record.and_then(|record| record.field_value("active")),
        Some(json!(true))
    );

    let deleted = repository.bulk_delete("users", &[ada, grace]).await;
    assert_eq!(deleted.ok(), Some(2));
    assert_eq!(repository.count_records("users").await.ok(), Some(0));
}

#[tokio::test]
async fn bulk_writes_to_unique_fields_cannot_duplicate_values() {
    let repository = InMemoryRecordRepository::new();
    let ada = seed(&repository, "Ada", "ada@x.com").await;
    let grace = seed(&repository, "Grace", "grace@x.com").await;

    let shared = repository
        .bulk_set_field(
            "users",
            &[ada.clone(), grace.clone()],
            "email",
            json!("team@x.com"),
            true,
        )
        .await;
    assert!(matches!(shared, Err(AppError::Conflict(_))));

    let stolen = repository
        .bulk_set_field("users", std::slice::from_ref(&grace), "email", json!("ada@x.com"), true)
        .await;
    assert!(matches!(stolen, Err(AppError::Conflict(_))));

    let cleared = repository
        .bulk_set_field("users", &[ada, grace], "email", Value::Null, true)
        .await;
    assert_eq!(cleared.ok(), Some(2));
    seed(&repository, "Eve", "ada@x.com").await;
}

#[tokio::test]
async fn cleared_unique_fields_stay_unique_under_bulk_writes() {
    let repository = InMemoryRecordRepository::new();
    let ada = seed(&repository, "Ada", "ada@x.com").await;
    let grace = seed(&repository, "Grace", "grace@x.com").await;
    let both = [ada.clone(), grace.clone()];

    let cleared = repository
        .bulk_set_field("users", &both, "email", Value::Null, true)
        .await;
    assert_eq!(cleared.ok(), Some(2));

    let shared = repository
        .bulk_set_field("users", &both, "email", json!("team@x.com"), true)
        .await;
    assert!(matches!(shared, Err(AppError::Conflict(_))));

    let claimed = repository
        .bulk_set_field("users", std::slice::from_ref(&ada), "email", json!("team@x.com"), true)
        .await;
    assert_eq!(claimed.ok(), Some(1));

    let duplicate = repository
        .create_record(
            "users",
            json!({"name": "Eve", "email": "team@x.com"}),
            vec![unique_email("team@x.com")],
        )
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn never_filled_unique_fields_reject_shared_bulk_values() {
    let repository = InMemoryRecordRepository::new();
    let first = repository
        .create_record("users", json!({"name": "Ada"}), Vec::new())
        .await
        .map(|record| record.id().as_str().to_owned())
        .unwrap_or_else(|_| unreachable!());
    let second = repository
        .create_record("users", json!({"name": "Grace"}), Vec::new())
        .await
        .map(|record| record.id().as_str().to_owned())
        .unwrap_or_else(|_| unreachable!());

    let shared = repository
        .bulk_set_field("users", &[first, second], "email", json!("team@x.com"), true)
        .await;

    assert!(matches!(shared, Err(AppError::Conflict(_))));
}
