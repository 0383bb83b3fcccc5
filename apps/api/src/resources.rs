//! Concrete resources served by the admin.

mod documentation_pages;
mod users;

use std::sync::Arc;

use parrot_application::{PasswordHasher, RecordRepository, ResourceRegistry};
use parrot_core::AppResult;

pub use documentation_pages::DocumentationPagesResource;
pub use users::UsersResource;

/// Registers every shipped resource under `admin_prefix`.
pub fn build_registry(
    admin_prefix: &str,
    repository: Arc<dyn RecordRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
) -> AppResult<ResourceRegistry> {
    Ok(
        ResourceRegistry::builder(admin_prefix, repository, password_hasher)
            .register(Arc::new(UsersResource))?
            .register(Arc::new(DocumentationPagesResource))?
            .build(),
    )
}
