use parrot_application::{
    FieldContainer, GridBuilder, GridConfig, ResourceConfig, ResourceController,
};
use parrot_core::AppResult;
use parrot_domain::{ActionDescriptor, BulkActionDescriptor, SortDirection};
use serde_json::json;

const ROLES: [(&str, &str); 3] = [
    ("admin", "Administrator"),
    ("editor", "Editor"),
    ("viewer", "Viewer"),
];

/// Admin accounts.
pub struct UsersResource;

impl ResourceController for UsersResource {
    fn slug(&self) -> &str {
        "users"
    }

    fn resource(&self, route_prefix: &str) -> AppResult<ResourceConfig> {
        ResourceConfig::builder("users")
            .title("Users")
            .description("Accounts that can sign in to the admin.")
            .route_prefix(route_prefix)
            .fields(|form| {
                form.text("name", |field| {
                    field
                        .label("Full name")
                        .required()
                        .searchable()
                        .sortable()
                        .rules(["max:120"])
                })
                .email("email", |field| {
                    field
                        .required()
                        .unique()
                        .searchable()
                        .sortable()
                        .placeholder("name@example.com")
                })
                .password("password", |field| {
                    field
                        .required()
                        .rules(["min:8"])
                        .help("Leave blank to keep the current password.")
                })
                .select("role", |field| {
                    field.required().options(ROLES).default_value(json!("viewer"))
                })
                .switch("active", |field| field.default_value(json!(true)))
            })
            .actions(row_actions()?)
            .build()
    }

    fn data_view(&self, route_prefix: &str) -> AppResult<GridConfig> {
        GridBuilder::new("users")
            .title("Users")
            .route_prefix(route_prefix)
            .per_page(15)
            .default_sort("name", SortDirection::Asc)
            .id("ID")
            .column("name", "Name", |column| column.sortable().searchable())
            .column("email", "Email", |column| column.sortable().searchable())
            .column("role", "Role", |column| column.sortable().lookup(ROLES))
            .column("active", "Active", |column| column.badge("Active", "Inactive"))
            .column("created_at", "Created", |column| column.sortable())
            .select_filter("role", "Role", ROLES)
            .boolean_filter("active", "Active")
            .date_range_filter("created_at", "Created")
            .actions(row_actions()?)
            .bulk_actions([
                BulkActionDescriptor::delete()?,
                BulkActionDescriptor::set_field("activate", "Activate", "active", json!(true))?,
                BulkActionDescriptor::set_field("deactivate", "Deactivate", "active", json!(false))?,
            ])
            .build()
    }
}

fn row_actions() -> AppResult<[ActionDescriptor; 3]> {
    Ok([
        ActionDescriptor::show()?,
        ActionDescriptor::edit()?,
        ActionDescriptor::destroy()?,
    ])
}
