use std::collections::BTreeMap;
use std::sync::Arc;

use parrot_core::AppError;
use parrot_domain::{ActionDescriptor, BulkActionDescriptor, SortDirection};
use serde_json::json;

use super::{DataViewService, GridBuilder, GridConfig, GridRequest};
use crate::markup::Markup;
use crate::test_support::FakeRecordRepository;

fn request(pairs: &[(&str, &str)]) -> GridRequest {
    GridRequest::from_params(
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn grid() -> GridConfig {
    GridBuilder::new("users")
        .title("Users")
        .per_page(10)
        .default_sort("name", SortDirection::Asc)
        .id("ID")
        .column("name", "Name", |column| column.sortable().searchable())
        .column("email", "Email", |column| column.searchable())
        .column("notes", "Notes", |column| column)
        .column("role", "Role", |column| {
            column.lookup([("admin", "Administrator")])
        })
        .column("active", "Active", |column| column.badge("Yes", "No"))
        .text_filter("name", "Name")
        .select_filter("role", "Role", [("admin", "Admin"), ("editor", "Editor")])
        .boolean_filter("active", "Active")
        .date_range_filter("created_at", "Created")
        .actions([
            ActionDescriptor::edit().unwrap_or_else(|_| unreachable!()),
            ActionDescriptor::destroy().unwrap_or_else(|_| unreachable!()),
        ])
        .bulk_actions([
            BulkActionDescriptor::delete().unwrap_or_else(|_| unreachable!()),
            BulkActionDescriptor::set_field("activate", "Activate", "active", json!(true))
                .unwrap_or_else(|_| unreachable!()),
        ])
        .build()
        .unwrap_or_else(|_| unreachable!())
}

async fn seeded(count: usize) -> Arc<FakeRecordRepository> {
    let repository = Arc::new(FakeRecordRepository::new());
    for index in 0..count {
        repository
            .seed(
                "users",
                json!({
                    "name": format!("User {index:02}"),
                    "email": format!("user{index:02}@example.com"),
                    "notes": if index == 3 { "vip customer" } else { "" },
                    "role": if index % 2 == 0 { "admin" } else { "editor" },
                    "active": index % 3 == 0,
                }),
            )
            .await;
    }
    repository
}

#[tokio::test]
async fn paginates_twenty_five_records_ten_per_page() {
    let repository = seeded(25).await;
    let service = DataViewService::new(repository);
    let grid = grid();

    let first = service
        .query(&grid, &request(&[]))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(first.records.len(), 10);
    assert_eq!(first.total, 25);
    assert_eq!(first.total_pages, 3);

    let third = service
        .query(&grid, &request(&[("page", "3")]))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(third.records.len(), 5);
    assert_eq!(third.current_page, 3);

    let beyond = service
        .render(&grid, &request(&[("page", "4")]))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(beyond.total_pages, 3);
    assert_eq!(beyond.current_page, 4);
    assert!(beyond.markup.as_str().contains("No records found."));
}

#[tokio::test]
async fn empty_listing_still_has_one_page() {
    let service = DataViewService::new(Arc::new(FakeRecordRepository::new()));
    let result = service
        .query(&grid(), &request(&[]))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(result.total, 0);
    assert_eq!(result.total_pages, 1);
}

#[tokio::test]
async fn enormous_page_numbers_list_nothing() {
    let service = DataViewService::new(seeded(3).await);
    let grid = grid();
    let request = request(&[("page", "1000000000000000000")]);

    assert_eq!(grid.record_query(&request).offset, 999_999_999_999_999_999 * 10);
    let result = service
        .query(&grid, &request)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(result.records.is_empty());
    assert_eq!(result.total, 3);
    assert_eq!(result.current_page, 1_000_000_000_000_000_000);
    assert_eq!(result.total_pages, 1);
}

#[tokio::test]
async fn search_only_covers_searchable_columns() {
    let service = DataViewService::new(seeded(5).await);
    let grid = grid();

    let by_email = service
        .query(&grid, &request(&[("search", "USER04@")]))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(by_email.total, 1);

    let by_notes = service
        .query(&grid, &request(&[("search", "vip")]))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(by_notes.total, 0);
}

#[tokio::test]
async fn unknown_sort_columns_fall_back_to_default_sort() {
    let service = DataViewService::new(seeded(3).await);
    let grid = grid();

    let fallback = service
        .query(&grid, &request(&[("sort", "notes"), ("direction", "sideways")]))
        .await
        .unwrap_or_else(|_| unreachable!());
    let names: Vec<String> = fallback
        .records
        .iter()
        .filter_map(|record| record.field_value("name"))
        .filter_map(|value| value.as_str().map(str::to_owned))
        .collect();
    assert_eq!(names, vec!["User 00", "User 01", "User 02"]);

    let descending = service
        .query(&grid, &request(&[("sort", "name"), ("direction", "desc")]))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(
        descending.records[0].field_value("name"),
        Some(json!("User 02"))
    );
}

#[tokio::test]
async fn filters_are_lenient_and_combine() {
    let service = DataViewService::new(seeded(6).await);
    let grid = grid();

    let admins = service
        .query(&grid, &request(&[("role", "admin"), ("active", "yes")]))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(admins.total, 1);

    let ignored = service
        .query(
            &grid,
            &request(&[
                ("role", "owner"),
                ("active", "perhaps"),
                ("created_at_from", "not-a-date"),
                ("page", "-2"),
                ("unknown", "x"),
            ]),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(ignored.total, 6);
    assert_eq!(ignored.current_page, 1);

    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let created_today = service
        .query(&grid, &request(&[("created_at_from", today.as_str())]))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(created_today.total, 6);
}

#[tokio::test]
async fn display_transforms_shape_cells() {
    let service = DataViewService::new(seeded(1).await);
    let page = service
        .render(&grid(), &request(&[]))
        .await
        .unwrap_or_else(|_| unreachable!());
    let html = page.markup.as_str();

    assert!(html.contains("Administrator"));
    assert!(html.contains("<span class=\"badge badge-success\">Yes</span>"));
    assert!(html.contains("/admin/users/000001/edit"));
    assert!(html.contains("name=\"_method\" value=\"DELETE\""));
    assert!(html.contains("name=\"ids\" value=\"000001\""));
}

#[tokio::test]
async fn bulk_actions_report_affected_records() {
    let repository = seeded(4).await;
    let service = DataViewService::new(repository.clone());
    let grid = grid();

    let activated = service
        .bulk_action(
            &grid,
            "activate",
            &["000002".to_owned(), "000003".to_owned(), "000002".to_owned()],
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(activated, 2);
    let record = repository.record("users", "000002").await;
    assert_eq!(
        record.and_then(|record| record.field_value("active")),
        Some(json!(true))
    );

    let deleted = service
        .bulk_action(&grid, "delete", &["000001".to_owned()])
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(deleted, 1);
}

#[tokio::test]
async fn bulk_actions_are_all_or_nothing() {
    let repository = seeded(2).await;
    let service = DataViewService::new(repository.clone());
    let grid = grid();

    let result = service
        .bulk_action(&grid, "delete", &["000001".to_owned(), "missing".to_owned()])
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(repository.record("users", "000001").await.is_some());

    let unknown = service
        .bulk_action(&grid, "archive", &["000001".to_owned()])
        .await;
    assert!(matches!(unknown, Err(AppError::Validation(_))));

    let empty = service.bulk_action(&grid, "delete", &[]).await;
    assert!(matches!(empty, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn shared_values_cannot_be_bulk_written_to_unique_fields() {
    let repository = seeded(2).await;
    let service = DataViewService::new(repository.clone());
    let grid = GridBuilder::new("users")
        .column("email", "Email", |column| column)
        .bulk_actions([
            BulkActionDescriptor::set_field("assign", "Assign", "email", json!("team@x.com"))
                .unwrap_or_else(|_| unreachable!()),
        ])
        .build()
        .unwrap_or_else(|_| unreachable!())
        .with_unique_fields(["email"]);

    let shared = service
        .bulk_action(&grid, "assign", &["000001".to_owned(), "000002".to_owned()])
        .await;
    assert!(matches!(shared, Err(AppError::Conflict(_))));
    assert_eq!(
        repository
            .record("users", "000001")
            .await
            .and_then(|record| record.field_value("email")),
        Some(json!("user00@example.com"))
    );

    let single = service
        .bulk_action(&grid, "assign", &["000002".to_owned()])
        .await;
    assert_eq!(single.ok(), Some(1));
}

#[test]
fn pagination_can_be_disabled() {
    let grid = GridBuilder::new("users")
        .pagination(false)
        .column("name", "Name", |column| column.display(|_, _| Markup::raw("x")))
        .build()
        .unwrap_or_else(|_| unreachable!());
    let query = grid.record_query(&request(&[("page", "5")]));
    assert_eq!(query.limit, None);
    assert_eq!(query.offset, 0);
}

#[test]
fn build_rejects_inconsistent_grids() {
    let zero_page = GridBuilder::new("users").per_page(0).build();
    assert!(matches!(zero_page, Err(AppError::Configuration(_))));

    let duplicate = GridBuilder::new("users")
        .column("name", "Name", |column| column)
        .column("name", "Again", |column| column)
        .build();
    assert!(matches!(duplicate, Err(AppError::Configuration(_))));

    let unknown_sort = GridBuilder::new("users")
        .default_sort("missing", SortDirection::Desc)
        .build();
    assert!(matches!(unknown_sort, Err(AppError::Configuration(_))));
}
