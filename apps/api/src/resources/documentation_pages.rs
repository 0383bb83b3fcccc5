use parrot_application::{
    FieldContainer, GridBuilder, GridConfig, Markup, ResourceConfig, ResourceController, escape,
};
use parrot_core::AppResult;
use parrot_domain::{ActionDescriptor, AlertLevel, BulkActionDescriptor, SortDirection};
use serde_json::json;

pub const CATEGORIES: [(&str, &str); 4] = [
    ("getting-started", "Getting started"),
    ("guides", "Guides"),
    ("reference", "Reference"),
    ("faq", "FAQ"),
];

/// Documentation pages edited through a tabbed form.
pub struct DocumentationPagesResource;

impl ResourceController for DocumentationPagesResource {
    fn slug(&self) -> &str {
        "documentation-pages"
    }

    fn resource(&self, route_prefix: &str) -> AppResult<ResourceConfig> {
        ResourceConfig::builder("documentation_pages")
            .title("Documentation pages")
            .route_prefix(route_prefix)
            .fields(|form| {
                form.tab("content", "Content", Some("file-text"))
                    .text("title", |field| field.required().searchable().rules(["max:160"]))
                    .text("slug", |field| {
                        field
                            .required()
                            .unique()
                            .searchable()
                            .rules(["alpha_dash", "max:80"])
                            .help("Used in the page URL.")
                    })
                    .select("category", |field| field.required().options(CATEGORIES))
                    .divider(Some("Body"))
                    .rich_text("content", |field| field.height(400))
                    .end()
                    .tab("publishing", "Publishing", Some("calendar"))
                    .alert(AlertLevel::Info, "Unpublished pages are only visible in the admin.")
                    .switch("published", |field| field.label("Published"))
                    .date("published_at", |field| field.label("Publish date"))
                    .end()
            })
            .actions([ActionDescriptor::show()?, ActionDescriptor::edit()?])
            .build()
    }

    fn data_view(&self, route_prefix: &str) -> AppResult<GridConfig> {
        GridBuilder::new("documentation_pages")
            .title("Documentation pages")
            .route_prefix(route_prefix)
            .per_page(20)
            .default_sort("updated_at", SortDirection::Desc)
            .column("title", "Title", |column| column.sortable().searchable())
            .column("slug", "Slug", |column| {
                column.searchable().display(|value, _| {
                    Markup::raw(format!(
                        "<code>{}</code>",
                        escape(&parrot_domain::value_to_text(value))
                    ))
                })
            })
            .column("category", "Category", |column| column.sortable().lookup(CATEGORIES))
            .column("published", "Published", |column| column.badge("Published", "Draft"))
            .column("published_at", "Publish date", |column| column.sortable())
            .column("updated_at", "Updated", |column| column.sortable())
            .select_filter("category", "Category", CATEGORIES)
            .boolean_filter("published", "Published")
            .date_range_filter("published_at", "Publish date")
            .actions([ActionDescriptor::show()?, ActionDescriptor::edit()?])
            .bulk_actions([
                BulkActionDescriptor::set_field("publish", "Publish", "published", json!(true))?,
                BulkActionDescriptor::set_field("unpublish", "Unpublish", "published", json!(false))?,
                BulkActionDescriptor::delete()?,
            ])
            .build()
    }
}
