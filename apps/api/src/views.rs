//! HTML page shell around the markup produced by the application services.

use axum::http::StatusCode;
use axum::response::Html;
use parrot_application::{
    DetailPage, FormPage, GridConfig, GridPage, Markup, ResourceRegistry, escape,
};

/// Wraps a page body with the admin navigation.
pub fn admin_page(registry: &ResourceRegistry, title: &str, body: &Markup) -> Html<String> {
    let mut navigation = format!(
        "<nav class=\"admin-nav\"><a href=\"{}\">Dashboard</a>",
        escape(registry.admin_prefix())
    );
    for summary in registry.summaries() {
        navigation.push_str(&format!(
            "<a href=\"{}\">{}</a>",
            escape(&summary.route_prefix),
            escape(&summary.title)
        ));
    }
    navigation.push_str("</nav>");

    document(title, &navigation, body.as_str())
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        "<div class=\"alert alert-danger\" role=\"alert\"><strong>{}</strong> {}</div>",
        status.as_u16(),
        escape(message)
    );
    document(title, "", &body)
}

fn document(title: &str, navigation: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{title} | Parrot Admin</title></head>\
         <body>{navigation}<main class=\"admin-content\"><h1>{title}</h1>{body}</main></body></html>",
        title = escape(title),
    ))
}

/// Renders the notice for a `status` query parameter set by a redirect.
pub fn flash(status: Option<&str>, count: Option<&str>) -> Markup {
    let message = match status {
        Some("created") => "The record was created.".to_owned(),
        Some("updated") => "The record was updated.".to_owned(),
        Some("deleted") => "The record was deleted.".to_owned(),
        Some("bulk") => match count.and_then(|count| count.parse::<usize>().ok()) {
            Some(1) => "The action was applied to 1 record.".to_owned(),
            Some(count) => format!("The action was applied to {count} records."),
            None => "The action was applied.".to_owned(),
        },
        _ => return Markup::default(),
    };

    Markup::raw(format!(
        "<div class=\"alert alert-success\" role=\"status\">{}</div>",
        escape(&message)
    ))
}

pub fn index_body(grid: &GridConfig, page: &GridPage, notice: Markup) -> Markup {
    let mut body = notice;
    if let Some(description) = grid.description() {
        body.push_raw(&format!("<p class=\"description\">{}</p>", escape(description)));
    }
    body.push_raw(&format!(
        "<p class=\"page-actions\"><a class=\"btn btn-primary\" href=\"{}/create\">Create</a></p>",
        escape(grid.route_prefix())
    ));
    body.push(&page.markup);
    body
}

pub fn form_body(page: &FormPage, cancel_href: &str) -> Markup {
    let mut body = Markup::default();
    if let Some(description) = &page.description {
        body.push_raw(&format!("<p class=\"description\">{}</p>", escape(description)));
    }

    body.push_raw(&format!(
        "<form method=\"post\" action=\"{}\" class=\"resource-form\">",
        escape(&page.action)
    ));
    if !page.method.is_native_form_method() {
        body.push_raw(&format!(
            "<input type=\"hidden\" name=\"_method\" value=\"{}\">",
            page.method.as_str()
        ));
    }
    body.push(&page.markup);
    body.push_raw(&format!(
        "<div class=\"form-actions\"><button type=\"submit\" class=\"btn btn-primary\">Save</button> \
         <a class=\"btn\" href=\"{}\">Cancel</a></div></form>",
        escape(cancel_href)
    ));
    body
}

pub fn detail_body(route_prefix: &str, detail: &DetailPage) -> Markup {
    let record_href = format!("{route_prefix}/{}", detail.record.id().as_str());
    let mut body = detail.markup.clone();
    body.push_raw(&format!(
        "<div class=\"page-actions\"><a class=\"btn\" href=\"{edit}/edit\">Edit</a> \
         <form method=\"post\" action=\"{edit}\" data-confirm=\"Are you sure?\">\
         <input type=\"hidden\" name=\"_method\" value=\"DELETE\">\
         <button type=\"submit\" class=\"btn btn-danger\">Delete</button></form> \
         <a class=\"btn\" href=\"{back}\">Back to list</a></div>",
        edit = escape(&record_href),
        back = escape(route_prefix),
    ));
    body
}
