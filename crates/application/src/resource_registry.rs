use std::sync::Arc;

use indexmap::IndexMap;
use parrot_core::{AppError, AppResult};

use crate::data_view_service::{DataViewService, GridConfig};
use crate::record_ports::RecordRepository;
use crate::resource_service::{ResourceConfig, ResourceService};
use crate::security_ports::PasswordHasher;

/// Concrete resource description bound to a URL slug.
pub trait ResourceController: Send + Sync {
    /// URL segment under the admin prefix, e.g. `users`.
    fn slug(&self) -> &str;

    /// Builds the resource configuration; `route_prefix` is where the resource
    /// is mounted.
    fn resource(&self, route_prefix: &str) -> AppResult<ResourceConfig>;

    /// Builds the listing configuration for one request.
    fn data_view(&self, route_prefix: &str) -> AppResult<GridConfig>;
}

struct RegisteredResource {
    controller: Arc<dyn ResourceController>,
    config: Arc<ResourceConfig>,
    route_prefix: String,
}

/// Summary of one registered resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSummary {
    /// URL slug.
    pub slug: String,
    /// Page title.
    pub title: String,
    /// Bound resource name.
    pub resource: String,
    /// Mount point.
    pub route_prefix: String,
}

/// Registry of resource controllers served by the generic handlers.
#[derive(Clone)]
pub struct ResourceRegistry {
    admin_prefix: String,
    resources: Arc<IndexMap<String, RegisteredResource>>,
    repository: Arc<dyn RecordRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

/// Collects controllers before the registry is frozen.
pub struct ResourceRegistryBuilder {
    admin_prefix: String,
    resources: IndexMap<String, RegisteredResource>,
    repository: Arc<dyn RecordRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl ResourceRegistryBuilder {
    /// Registers a controller, building its configuration eagerly.
    ///
    /// Duplicate slugs, duplicate resource bindings and invalid declarations are
    /// configuration errors.
    pub fn register(mut self, controller: Arc<dyn ResourceController>) -> AppResult<Self> {
        let slug = controller.slug().trim().to_owned();
        let valid_slug = !slug.is_empty()
            && slug
                .chars()
                .all(|character| character.is_ascii_alphanumeric() || matches!(character, '-' | '_'));
        if !valid_slug {
            return Err(AppError::Configuration(format!(
                "resource slug '{slug}' must be non-empty and URL-safe"
            )));
        }

        if self.resources.contains_key(&slug) {
            return Err(AppError::Configuration(format!(
                "resource slug '{slug}' is registered twice"
            )));
        }

        let route_prefix = format!("{}/{slug}", self.admin_prefix);
        let config = controller.resource(&route_prefix)?;
        if let Some(existing) = self
            .resources
            .values()
            .find(|registered| registered.config.resource() == config.resource())
        {
            return Err(AppError::Configuration(format!(
                "resource '{}' is already bound to '{}'",
                config.resource(),
                existing.route_prefix
            )));
        }

        let grid = controller.data_view(&route_prefix)?;
        if grid.resource() != config.resource() {
            return Err(AppError::Configuration(format!(
                "data view of '{slug}' lists '{}' instead of '{}'",
                grid.resource(),
                config.resource()
            )));
        }

        self.resources.insert(
            slug,
            RegisteredResource {
                controller,
                config: Arc::new(config),
                route_prefix,
            },
        );
        Ok(self)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> ResourceRegistry {
        ResourceRegistry {
            admin_prefix: self.admin_prefix,
            resources: Arc::new(self.resources),
            repository: self.repository,
            password_hasher: self.password_hasher,
        }
    }
}

impl ResourceRegistry {
    /// Starts a registry mounted under `admin_prefix`.
    #[must_use]
    pub fn builder(
        admin_prefix: &str,
        repository: Arc<dyn RecordRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> ResourceRegistryBuilder {
        ResourceRegistryBuilder {
            admin_prefix: admin_prefix.trim_end_matches('/').to_owned(),
            resources: IndexMap::new(),
            repository,
            password_hasher,
        }
    }

    /// Returns the admin mount prefix.
    #[must_use]
    pub fn admin_prefix(&self) -> &str {
        self.admin_prefix.as_str()
    }

    /// Returns the resource service for a slug.
    pub fn service(&self, slug: &str) -> AppResult<ResourceService> {
        let registered = self.registered(slug)?;
        Ok(ResourceService::new(
            registered.config.clone(),
            self.repository.clone(),
            self.password_hasher.clone(),
        ))
    }

    /// Builds the listing configuration for a slug, carrying the unique
    /// fields of the resource form.
    pub fn data_view(&self, slug: &str) -> AppResult<GridConfig> {
        let registered = self.registered(slug)?;
        let grid = registered.controller.data_view(&registered.route_prefix)?;
        let unique_fields = registered
            .config
            .form()
            .fields()
            .filter(|field| field.is_unique())
            .map(|field| field.name().to_owned());

        Ok(grid.with_unique_fields(unique_fields))
    }

    /// Returns a data view service over the shared repository.
    #[must_use]
    pub fn data_view_service(&self) -> DataViewService {
        DataViewService::new(self.repository.clone())
    }

    /// Returns the shared repository.
    #[must_use]
    pub fn repository(&self) -> Arc<dyn RecordRepository> {
        self.repository.clone()
    }

    /// Lists registered resources in registration order.
    #[must_use]
    pub fn summaries(&self) -> Vec<ResourceSummary> {
        self.resources
            .iter()
            .map(|(slug, registered)| ResourceSummary {
                slug: slug.clone(),
                title: registered.config.title().to_owned(),
                resource: registered.config.resource().to_owned(),
                route_prefix: registered.route_prefix.clone(),
            })
            .collect()
    }

    fn registered(&self, slug: &str) -> AppResult<&RegisteredResource> {
        self.resources
            .get(slug)
            .ok_or_else(|| AppError::NotFound(format!("resource '{slug}' is not registered")))
    }
}
