use super::*;

/// Accumulates the resource description consumed by [`ResourceService`].
#[derive(Debug)]
pub struct ResourceBuilder {
    resource: String,
    title: Option<String>,
    description: Option<String>,
    route_prefix: Option<String>,
    form: FormBuilder,
    actions: Vec<ActionDescriptor>,
}

/// Immutable resource configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceConfig {
    resource: String,
    title: String,
    description: Option<String>,
    route_prefix: String,
    form: Form,
    actions: Vec<ActionDescriptor>,
}

impl ResourceConfig {
    /// Starts a builder bound to a resource name.
    #[must_use]
    pub fn builder(resource: impl Into<String>) -> ResourceBuilder {
        ResourceBuilder {
            resource: resource.into().trim().to_owned(),
            title: None,
            description: None,
            route_prefix: None,
            form: FormBuilder::new(),
            actions: Vec::new(),
        }
    }

    /// Returns the bound resource name.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.resource.as_str()
    }

    /// Returns the page title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the page description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the route prefix.
    #[must_use]
    pub fn route_prefix(&self) -> &str {
        self.route_prefix.as_str()
    }

    /// Returns the built form.
    #[must_use]
    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Returns the row actions.
    #[must_use]
    pub fn actions(&self) -> &[ActionDescriptor] {
        &self.actions
    }
}

impl ResourceBuilder {
    /// Sets the page title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the page description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the route prefix used for form actions and links.
    #[must_use]
    pub fn route_prefix(mut self, route_prefix: impl Into<String>) -> Self {
        self.route_prefix = Some(route_prefix.into().trim_end_matches('/').to_owned());
        self
    }

    /// Declares the fields and tabs of the resource form.
    #[must_use]
    pub fn fields<F>(mut self, declare: F) -> Self
    where
        F: FnOnce(FormBuilder) -> FormBuilder,
    {
        self.form = declare(self.form);
        self
    }

    /// Adds row actions.
    #[must_use]
    pub fn actions<I>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = ActionDescriptor>,
    {
        self.actions.extend(actions);
        self
    }

    /// Validates the declarations and produces the immutable configuration.
    pub fn build(self) -> AppResult<ResourceConfig> {
        if self.resource.is_empty() {
            return Err(AppError::Configuration(
                "resource must be bound to a non-empty name".to_owned(),
            ));
        }

        let form = self.form.build().map_err(|error| match error {
            AppError::Configuration(message) => AppError::Configuration(format!(
                "resource '{}': {message}",
                self.resource
            )),
            other => other,
        })?;

        Ok(ResourceConfig {
            title: self
                .title
                .unwrap_or_else(|| parrot_domain::humanize(&self.resource)),
            route_prefix: self
                .route_prefix
                .unwrap_or_else(|| format!("/admin/{}", self.resource)),
            resource: self.resource,
            description: self.description,
            form,
            actions: self.actions,
        })
    }
}
