//! Free-form admin pages composed with the layout builder.

use axum::extract::State;
use axum::response::Html;
use parrot_application::{FormState, LayoutBuilder, Markup, escape};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::views;

const DOCUMENTATION_SLUG: &str = "documentation-pages";

struct ResourceCard {
    title: String,
    href: String,
    count: usize,
}

/// Landing page with one card per registered resource.
pub async fn dashboard_handler(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let repository = state.registry.repository();
    let mut cards = Vec::new();
    for summary in state.registry.summaries() {
        let count = repository.count_records(summary.resource.as_str()).await?;
        cards.push(ResourceCard {
            title: summary.title,
            href: summary.route_prefix,
            count,
        });
    }

    let layout = LayoutBuilder::new()
        .section("Dashboard", Some("Records managed by this admin."), |section| {
            section.grid(3, 1, |grid| {
                for card in &cards {
                    grid.item(|_, item| {
                        item.html(&format!(
                            "<a class=\"stat-card\" href=\"{}\"><span class=\"stat-value\">{}</span> \
                             <span class=\"stat-label\">{}</span></a>",
                            escape(&card.href),
                            card.count,
                            escape(&card.title)
                        ));
                    });
                }
            })
        })
        .build()?;

    Ok(views::admin_page(
        &state.registry,
        "Dashboard",
        &layout.render(&FormState::new()),
    ))
}

/// Two-column editor for documentation pages placing the resource's fields
/// by hand instead of in tabs.
pub async fn quick_documentation_handler(
    State(state): State<AppState>,
) -> ApiResult<Html<String>> {
    let service = state.registry.service(DOCUMENTATION_SLUG)?;

    let layout = LayoutBuilder::new()
        .with_form(service.config().form().clone())
        .section(
            "Quick documentation",
            Some("Draft a page without leaving the overview."),
            |section| {
                section.row(|row| {
                    row.column(8, |column| {
                        column
                            .field("title")
                            .field("slug")
                            .card(Some("Body"), |card| card.field("content"))
                    })
                    .column(4, |column| {
                        column
                            .card(Some("Publishing"), |card| {
                                card.field("category")
                                    .divider()
                                    .field("published")
                                    .field("published_at")
                            })
                            .spacer(2)
                            .view("doc-preview", serde_json::json!({ "source": "content" }))
                    })
                })
            },
        )
        .build()?;

    let mut body = Markup::raw(format!(
        "<form method=\"post\" action=\"{}\" class=\"resource-form\">",
        escape(service.route_prefix())
    ));
    body.push(&layout.render(&FormState::new()));
    body.push_raw(
        "<div class=\"form-actions\"><button type=\"submit\" class=\"btn btn-primary\">Save</button></div></form>",
    );

    Ok(views::admin_page(&state.registry, "Quick documentation", &body))
}
