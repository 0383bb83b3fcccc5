use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Mounts the dashboard, the layout pages and the generic resource routes
/// under the registry's admin prefix.
pub fn build_router(app_state: AppState) -> Router {
    let admin_prefix = app_state.registry.admin_prefix().to_owned();
    let resource_path = format!("{admin_prefix}/{{resource}}");
    let record_path = format!("{resource_path}/{{record_id}}");

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            admin_prefix.as_str(),
            get(handlers::pages::dashboard_handler),
        )
        .route(
            format!("{admin_prefix}/pages/quick-documentation").as_str(),
            get(handlers::pages::quick_documentation_handler),
        )
        .route(
            resource_path.as_str(),
            get(handlers::resources::index_handler).post(handlers::resources::store_handler),
        )
        .route(
            format!("{resource_path}/create").as_str(),
            get(handlers::resources::create_handler),
        )
        .route(
            format!("{resource_path}/bulk").as_str(),
            post(handlers::resources::bulk_handler),
        )
        .route(
            record_path.as_str(),
            get(handlers::resources::show_handler)
                .post(handlers::resources::record_form_handler)
                .put(handlers::resources::update_handler)
                .patch(handlers::resources::update_handler)
                .delete(handlers::resources::destroy_handler),
        )
        .route(
            format!("{record_path}/edit").as_str(),
            get(handlers::resources::edit_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
