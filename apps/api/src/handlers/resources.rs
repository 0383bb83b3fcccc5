use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use parrot_application::{FieldErrors, FormTarget, GridRequest, ResourceService, SubmissionError};
use parrot_core::AppError;
use tracing::{info, warn};
use url::form_urlencoded;

use crate::error::{ApiResult, status_for};
use crate::state::AppState;
use crate::submission::Submission;
use crate::views;


pub async fn index_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
) -> ApiResult<Html<String>> {
    let grid = state.registry.data_view(slug.as_str())?;
    let notice = views::flash(
        params.get("status").map(String::as_str),
        params.get("count").map(String::as_str),
    );
    let request = GridRequest::from_params(params);
    let page = state
        .registry
        .data_view_service()
        .render(&grid, &request)
        .await?;

    Ok(views::admin_page(
        &state.registry,
        grid.title(),
        &views::index_body(&grid, &page, notice),
    ))
}

pub async fn create_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Html<String>> {
    let service = state.registry.service(slug.as_str())?;
    let page = service.create();

    Ok(views::admin_page(
        &state.registry,
        page.title.as_str(),
        &views::form_body(&page, service.route_prefix()),
    ))
}

pub async fn store_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    body: Bytes,
) -> ApiResult<Response> {
    let service = state.registry.service(slug.as_str())?;
    let submission = Submission::parse(&body);

    match service.store(submission.fields()).await {
        Ok(record) => {
            info!(
                resource = service.resource(),
                record_id = record.id().as_str(),
                "created record"
            );
            Ok(redirect_with(service.route_prefix(), &[("status", "created")]))
        }
        Err(error) => rejected(&state, &service, FormTarget::Create, &submission, error),
    }
}

pub async fn show_handler(
    State(state): State<AppState>,
    Path((slug, record_id)): Path<(String, String)>,
) -> ApiResult<Html<String>> {
    let service = state.registry.service(slug.as_str())?;
    let detail = service.show(record_id.as_str()).await?;

    Ok(views::admin_page(
        &state.registry,
        detail.title.as_str(),
        &views::detail_body(service.route_prefix(), &detail),
    ))
}

pub async fn edit_handler(
    State(state): State<AppState>,
    Path((slug, record_id)): Path<(String, String)>,
) -> ApiResult<Html<String>> {
    let service = state.registry.service(slug.as_str())?;
    let page = service.edit(record_id.as_str()).await?;
    let cancel_href = format!("{}/{record_id}", service.route_prefix());

    Ok(views::admin_page(
        &state.registry,
        page.title.as_str(),
        &views::form_body(&page, cancel_href.as_str()),
    ))
}

pub async fn update_handler(
    State(state): State<AppState>,
    Path((slug, record_id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Response> {
    update_record(&state, slug.as_str(), record_id.as_str(), &Submission::parse(&body)).await
}

pub async fn destroy_handler(
    State(state): State<AppState>,
    Path((slug, record_id)): Path<(String, String)>,
) -> ApiResult<Response> {
    destroy_record(&state, slug.as_str(), record_id.as_str()).await
}

/// Dispatches an HTML form post on a record URL by its `_method` field.
pub async fn record_form_handler(
    State(state): State<AppState>,
    Path((slug, record_id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Response> {
    let submission = Submission::parse(&body);
    match submission.method() {
        Some("PUT" | "PATCH") => {
            update_record(&state, slug.as_str(), record_id.as_str(), &submission).await
        }
        Some("DELETE") => destroy_record(&state, slug.as_str(), record_id.as_str()).await,
        Some(method) => Err(AppError::Validation(format!(
            "form method '{method}' is not supported on a record"
        ))
        .into()),
        None => Err(AppError::Validation(
            "record forms must declare a _method of PUT, PATCH or DELETE".to_owned(),
        )
        .into()),
    }
}

pub async fn bulk_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    body: Bytes,
) -> ApiResult<Response> {
    let grid = state.registry.data_view(slug.as_str())?;
    let submission = Submission::parse(&body);
    let action = submission.field("action").unwrap_or_default();

    let affected = state
        .registry
        .data_view_service()
        .bulk_action(&grid, action, submission.ids())
        .await?;
    info!(
        resource = grid.resource(),
        action,
        affected,
        "applied bulk action"
    );

    let count = affected.to_string();
    Ok(redirect_with(
        grid.route_prefix(),
        &[("status", "bulk"), ("count", count.as_str())],
    ))
}

async fn update_record(
    state: &AppState,
    slug: &str,
    record_id: &str,
    submission: &Submission,
) -> ApiResult<Response> {
    let service = state.registry.service(slug)?;

    match service.update(record_id, submission.fields()).await {
        Ok(record) => {
            info!(
                resource = service.resource(),
                record_id = record.id().as_str(),
                "updated record"
            );
            Ok(redirect_with(service.route_prefix(), &[("status", "updated")]))
        }
        Err(error) => rejected(state, &service, FormTarget::Edit(record_id), submission, error),
    }
}

async fn destroy_record(state: &AppState, slug: &str, record_id: &str) -> ApiResult<Response> {
    let service = state.registry.service(slug)?;
    service.destroy(record_id).await?;
    info!(resource = service.resource(), record_id, "deleted record");

    Ok(redirect_with(service.route_prefix(), &[("status", "deleted")]))
}

/// Re-renders a rejected submission into its form.
///
/// Validation failures answer 422 with field errors. Persistence failures keep
/// the submitted values behind an error banner, except a missing record which
/// becomes the 404 page.
fn rejected(
    state: &AppState,
    service: &ResourceService,
    target: FormTarget<'_>,
    submission: &Submission,
    error: SubmissionError,
) -> ApiResult<Response> {
    let (status, page) = match error {
        SubmissionError::Invalid(failure) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            service.render_rejected(target, &failure.old_input, &failure.errors, None),
        ),
        SubmissionError::Failed(error @ AppError::NotFound(_)) => return Err(error.into()),
        SubmissionError::Failed(error) => {
            let status = status_for(&error);
            if status.is_server_error() {
                tracing::error!(resource = service.resource(), error = %error, "failed to save record");
            } else {
                warn!(resource = service.resource(), error = %error, "record save rejected");
            }

            let banner = match error {
                AppError::Conflict(_) => "The record conflicts with an existing record.",
                _ => "The record could not be saved.",
            };
            (
                status,
                service.render_rejected(
                    target,
                    submission.fields(),
                    &FieldErrors::new(),
                    Some(banner),
                ),
            )
        }
    };

    let cancel_href = match target {
        FormTarget::Create => service.route_prefix().to_owned(),
        FormTarget::Edit(record_id) => format!("{}/{record_id}", service.route_prefix()),
    };
    let body = views::admin_page(
        &state.registry,
        page.title.as_str(),
        &views::form_body(&page, cancel_href.as_str()),
    );

    Ok((status, body).into_response())
}

fn redirect_with(location: &str, params: &[(&str, &str)]) -> Response {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();

    Redirect::to(format!("{location}?{query}").as_str()).into_response()
}
