use chrono::Utc;
use parrot_core::AppError;
use parrot_domain::{AlertLevel, FieldType, Record};
use serde_json::json;

use super::{FieldContainer, FormBuilder, FormInput, FormState};
use crate::validation_service::FieldErrors;

fn configuration_message(builder: FormBuilder) -> String {
    match builder.build() {
        Err(AppError::Configuration(message)) => message,
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn duplicate_field_names_keep_the_last_declaration() {
    let form = FormBuilder::new()
        .text("title", |field| {
            field.label("First").required().unique().rules(["min:3"])
        })
        .email("contact", |field| field)
        .textarea("title", |field| field.label("Second"))
        .build()
        .unwrap_or_else(|_| unreachable!());

    let names: Vec<&str> = form.fields().map(|field| field.name()).collect();
    assert_eq!(names, vec!["contact", "title"]);

    let title = form.field("title").unwrap_or_else(|| unreachable!());
    assert_eq!(title.label_text(), "Second");
    assert_eq!(title.field_type(), FieldType::Textarea);
    assert!(!title.is_required());
    assert!(!title.is_unique());
    assert!(title.validation_rules().is_empty());
}

#[test]
fn tab_collisions_move_the_field_to_the_latest_tab() {
    let form = FormBuilder::new()
        .tab("general", "General", Some("cog"))
        .text("slug", |field| field.label("Slug A"))
        .text("title", |field| field)
        .end()
        .tab("seo", "SEO", None)
        .text("slug", |field| field.label("Slug B"))
        .end()
        .build()
        .unwrap_or_else(|_| unreachable!());

    let general: Vec<&str> = form.tabs()[0].field_names().collect();
    let seo: Vec<&str> = form.tabs()[1].field_names().collect();
    assert_eq!(general, vec!["title"]);
    assert_eq!(seo, vec!["slug"]);
    assert_eq!(
        form.field("slug").map(|field| field.label_text()),
        Some("Slug B")
    );

    let markup = form.render(&FormState::new());
    assert_eq!(markup.as_str().matches("name=\"slug\"").count(), 1);
}

#[test]
fn build_rejects_invalid_declarations() {
    let empty_name = configuration_message(FormBuilder::new().text("  ", |field| field));
    assert!(empty_name.contains("non-empty name"));

    let bad_type =
        configuration_message(FormBuilder::new().field_of_type("hologram", "beam", |field| field));
    assert!(bad_type.contains("'beam'"));

    let bad_rule =
        configuration_message(FormBuilder::new().text("title", |field| field.rules(["sparkles"])));
    assert!(bad_rule.contains("'title'"));

    let duplicate_tab = configuration_message(
        FormBuilder::new()
            .tab("main", "Main", None)
            .end()
            .tab("main", "Again", None)
            .end(),
    );
    assert!(duplicate_tab.contains("'main'"));

    let mixed = configuration_message(
        FormBuilder::new()
            .text("orphan", |field| field)
            .tab("main", "Main", None)
            .text("title", |field| field)
            .end(),
    );
    assert!(mixed.contains("'orphan'"));
}

#[test]
fn field_of_type_accepts_type_names() {
    let form = FormBuilder::new()
        .field_of_type("email", "contact", |field| field.required())
        .build()
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(
        form.field("contact").map(|field| field.field_type()),
        Some(FieldType::Email)
    );
}

#[test]
fn rendering_is_idempotent() {
    let form = FormBuilder::new()
        .tab("content", "Content", Some("file"))
        .text("title", |field| field.required().placeholder("Title"))
        .divider(Some("Body"))
        .rich_text("body", |field| field.height(400))
        .end()
        .tab("publishing", "Publishing", None)
        .switch("published", |field| field.default_value(json!(true)))
        .alert(AlertLevel::Warning, "Changes go live immediately")
        .end()
        .build()
        .unwrap_or_else(|_| unreachable!());

    let mut errors = FieldErrors::new();
    errors.add("title", "The Title field is required.");
    let state = FormState::from_input(&FormInput::new(), errors);

    let first = form.render(&state);
    let second = form.render(&state);
    assert_eq!(first, second);
    assert!(first.as_str().contains("has-errors"));
    assert!(first.as_str().contains("data-height=\"400\""));
    assert!(first.as_str().contains("checked"));
    assert!(first.as_str().contains("alert-warning"));
}

#[test]
fn flat_forms_render_in_declaration_order_with_escaped_values() {
    let form = FormBuilder::new()
        .text("name", |field| field)
        .select("role", |field| {
            field.options([("admin", "Admin"), ("editor", "Editor")])
        })
        .custom_html("<p class=\"notice\">Heads up</p>", "Notice", Some("wide"))
        .build()
        .unwrap_or_else(|_| unreachable!());

    let mut input = FormInput::new();
    input.insert("name".to_owned(), "<Ada>".to_owned());
    input.insert("role".to_owned(), "editor".to_owned());
    let markup = form.render(&FormState::from_input(&input, FieldErrors::new()));
    let html = markup.as_str();

    assert!(html.contains("value=\"&lt;Ada&gt;\""));
    assert!(html.contains("<option value=\"editor\" selected>Editor</option>"));
    assert!(html.contains("<div class=\"custom-html wide\"><p class=\"notice\">Heads up</p></div>"));
    let name_at = html.find("name=\"name\"").unwrap_or_else(|| unreachable!());
    let role_at = html.find("name=\"role\"").unwrap_or_else(|| unreachable!());
    assert!(name_at < role_at);
}

#[test]
fn record_state_never_echoes_passwords() {
    let form = FormBuilder::new()
        .email("email", |field| field)
        .password("password", |field| field)
        .build()
        .unwrap_or_else(|_| unreachable!());
    let now = Utc::now();
    let record = Record::new(
        "1",
        "users",
        json!({"email": "ada@x.com", "password": "$argon2id$hash"}),
        now,
        now,
    )
    .unwrap_or_else(|_| unreachable!());

    let state = FormState::from_record(&form, &record);
    assert_eq!(state.value("email"), Some(&json!("ada@x.com")));
    assert_eq!(state.value("password"), None);
    assert!(!form.render(&state).as_str().contains("argon2"));
}
