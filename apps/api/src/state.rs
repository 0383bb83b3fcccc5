use parrot_application::ResourceRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub registry: ResourceRegistry,
    pub storage_backend: &'static str,
}
