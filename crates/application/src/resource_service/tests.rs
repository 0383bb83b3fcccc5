use std::sync::Arc;

use parrot_core::{AppError, AppResult};
use parrot_domain::{ActionDescriptor, HttpMethod};
use serde_json::json;

use super::{
    FormTarget, ResourceConfig, ResourceService, SubmissionError, ValidationFailure,
};
use crate::form_service::{FieldContainer, FormInput};
use crate::security_ports::PasswordHasher;
use crate::test_support::FakeRecordRepository;
use crate::validation_service::FieldErrors;

struct ReversingHasher;

impl PasswordHasher for ReversingHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{}", password.chars().rev().collect::<String>()))
    }
}

fn people_config() -> ResourceConfig {
    ResourceConfig::builder("people")
        .title("People")
        .route_prefix("/admin/people/")
        .fields(|form| {
            form.text("name", |field| field.required())
                .email("email", |field| field.required().searchable())
                .switch("active", |field| field)
        })
        .actions([ActionDescriptor::edit().unwrap_or_else(|_| unreachable!())])
        .build()
        .unwrap_or_else(|_| unreachable!())
}

fn accounts_config() -> ResourceConfig {
    ResourceConfig::builder("accounts")
        .fields(|form| {
            form.text("name", |field| field.required())
                .email("email", |field| field.required().unique())
                .password("password", |field| field.required().rules(["min:8"]))
        })
        .build()
        .unwrap_or_else(|_| unreachable!())
}

fn service(config: ResourceConfig) -> (ResourceService, Arc<FakeRecordRepository>) {
    let repository = Arc::new(FakeRecordRepository::new());
    let service = ResourceService::new(
        Arc::new(config),
        repository.clone(),
        Arc::new(ReversingHasher),
    );
    (service, repository)
}

fn input(pairs: &[(&str, &str)]) -> FormInput {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

fn invalid(result: Result<parrot_domain::Record, SubmissionError>) -> ValidationFailure {
    match result {
        Err(SubmissionError::Invalid(failure)) => failure,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[tokio::test]
async fn store_with_empty_input_fails_without_writes() {
    let (service, repository) = service(people_config());

    let failure = invalid(service.store(&FormInput::new()).await);

    assert!(failure.errors.has("name"));
    assert_eq!(repository.writes(), 0);
}

#[tokio::test]
async fn end_to_end_store_scenario() {
    let (service, repository) = service(people_config());

    let failure = invalid(
        service
            .store(&input(&[("name", "Ada"), ("email", "bad-email"), ("active", "1")]))
            .await,
    );
    assert!(failure.errors.has("email"));
    assert!(!failure.errors.has("name"));
    assert_eq!(failure.old_input.get("email").map(String::as_str), Some("bad-email"));
    assert_eq!(repository.writes(), 0);

    let record = service
        .store(&input(&[("name", "Ada"), ("email", "ada@x.com"), ("active", "1")]))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(repository.writes(), 1);
    assert_eq!(record.field_value("name"), Some(json!("Ada")));
    assert_eq!(record.field_value("email"), Some(json!("ada@x.com")));
    assert_eq!(record.field_value("active"), Some(json!(true)));
}

#[tokio::test]
async fn rejected_forms_keep_old_input_and_errors() {
    let (service, _) = service(people_config());
    let submitted = input(&[("name", ""), ("email", "grace@x.com")]);
    let failure = invalid(service.store(&submitted).await);

    let page = service.render_rejected(
        FormTarget::Create,
        &failure.old_input,
        &failure.errors,
        None,
    );
    assert_eq!(page.action, "/admin/people");
    assert_eq!(page.method, HttpMethod::Post);
    assert!(page.markup.as_str().contains("value=\"grace@x.com\""));
    assert!(page.markup.as_str().contains("The Name field is required."));

    let banner = service.render_rejected(
        FormTarget::Edit("42"),
        &submitted,
        &FieldErrors::new(),
        Some("The record could not be saved."),
    );
    assert_eq!(banner.action, "/admin/people/42");
    assert_eq!(banner.method, HttpMethod::Put);
    assert!(banner.markup.as_str().contains("alert-danger"));
}

#[tokio::test]
async fn passwords_are_hashed_and_never_echoed() {
    let (service, repository) = service(accounts_config());

    let record = service
        .store(&input(&[
            ("name", "Ada"),
            ("email", "ada@x.com"),
            ("password", "correct-horse"),
        ]))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(
        record.field_value("password"),
        Some(json!("hashed:esroh-tcerroc"))
    );

    let edit = service
        .edit(record.id().as_str())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(!edit.markup.as_str().contains("hashed:"));
    assert!(edit.markup.as_str().contains("value=\"ada@x.com\""));

    let failure = invalid(
        service
            .store(&input(&[("name", ""), ("email", "x@x.com"), ("password", "short")]))
            .await,
    );
    assert!(!failure.old_input.contains_key("password"));
    assert_eq!(repository.writes(), 1);
}

#[tokio::test]
async fn blank_password_on_update_keeps_the_stored_hash() {
    let (service, _) = service(accounts_config());
    let record = service
        .store(&input(&[
            ("name", "Ada"),
            ("email", "ada@x.com"),
            ("password", "correct-horse"),
        ]))
        .await
        .unwrap_or_else(|_| unreachable!());

    let updated = service
        .update(
            record.id().as_str(),
            &input(&[("name", "Ada Lovelace"), ("email", "ada@x.com"), ("password", "")]),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(updated.field_value("name"), Some(json!("Ada Lovelace")));
    assert_eq!(
        updated.field_value("password"),
        record.field_value("password")
    );
}

#[tokio::test]
async fn unique_checks_exclude_the_current_record() {
    let (service, repository) = service(accounts_config());
    let ada = service
        .store(&input(&[("name", "Ada"), ("email", "ada@x.com"), ("password", "password-1")]))
        .await
        .unwrap_or_else(|_| unreachable!());
    let grace = service
        .store(&input(&[("name", "Grace"), ("email", "grace@x.com"), ("password", "password-2")]))
        .await
        .unwrap_or_else(|_| unreachable!());

    let duplicate = invalid(
        service
            .store(&input(&[("name", "Eve"), ("email", "ada@x.com"), ("password", "password-3")]))
            .await,
    );
    assert_eq!(
        duplicate.errors.first("email"),
        Some("The Email has already been taken.")
    );

    let unchanged = service
        .update(
            ada.id().as_str(),
            &input(&[("name", "Ada L."), ("email", "ada@x.com")]),
        )
        .await;
    assert!(unchanged.is_ok());

    let stolen = invalid(
        service
            .update(
                grace.id().as_str(),
                &input(&[("name", "Grace"), ("email", "ada@x.com")]),
            )
            .await,
    );
    assert!(stolen.errors.has("email"));
    assert_eq!(repository.writes(), 3);
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let (service, _) = service(people_config());

    assert!(matches!(service.edit("missing").await, Err(AppError::NotFound(_))));
    assert!(matches!(service.show("missing").await, Err(AppError::NotFound(_))));
    assert!(matches!(service.destroy("missing").await, Err(AppError::NotFound(_))));
    assert!(matches!(
        service.update("missing", &input(&[("name", "x")])).await,
        Err(SubmissionError::Failed(AppError::NotFound(_)))
    ));
}

#[tokio::test]
async fn show_and_destroy_round_out_the_lifecycle() {
    let (service, repository) = service(people_config());
    let record = service
        .store(&input(&[("name", "Ada"), ("email", "ada@x.com"), ("active", "0")]))
        .await
        .unwrap_or_else(|_| unreachable!());

    let detail = service
        .show(record.id().as_str())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(detail.title, "People details");
    assert!(detail.markup.as_str().contains("<dt>Active</dt><dd>No</dd>"));

    service
        .destroy(record.id().as_str())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(repository.record("people", record.id().as_str()).await.is_none());
}

#[test]
fn accessors_expose_the_configuration() {
    let (service, _) = service(people_config());
    assert_eq!(service.resource(), "people");
    assert_eq!(service.route_prefix(), "/admin/people");
    assert_eq!(service.title(), "People");
    assert_eq!(service.config().actions().len(), 1);

    let page = service.create();
    assert_eq!(page.title, "Create People");
}

#[test]
fn resource_build_names_the_resource_on_configuration_errors() {
    let result = ResourceConfig::builder("people")
        .fields(|form| {
            form.tab("main", "Main", None)
                .text("", |field| field)
                .end()
        })
        .build();
    assert!(matches!(result, Err(AppError::Configuration(message)) if message.contains("'people'")));
}
