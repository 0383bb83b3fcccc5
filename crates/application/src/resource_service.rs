use std::sync::Arc;

use parrot_core::{AppError, AppResult};
use parrot_domain::{
    ActionDescriptor, FieldDescriptor, FieldType, HttpMethod, Record, format_timestamp,
    value_to_text,
};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::form_service::{Form, FormBuilder, FormInput, FormState};
use crate::markup::{Markup, escape};
use crate::record_ports::{RecordRepository, UniqueFieldValue, value_as_flag};
use crate::security_ports::PasswordHasher;
use crate::validation_service::{FieldErrors, SubmissionMode, validate_input};

mod config;
mod lifecycle;
mod pages;

#[cfg(test)]
mod tests;

pub use config::{ResourceBuilder, ResourceConfig};

/// Rendered create or edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPage {
    /// Page title.
    pub title: String,
    /// Optional page description.
    pub description: Option<String>,
    /// Submission URL.
    pub action: String,
    /// Submission method; non-POST methods are sent through `_method`.
    pub method: HttpMethod,
    /// Form body markup.
    pub markup: Markup,
}

/// Rendered record detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPage {
    /// Page title.
    pub title: String,
    /// Displayed record.
    pub record: Record,
    /// Label and value list markup.
    pub markup: Markup,
}

/// Which form a rejected submission is rendered back into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget<'a> {
    /// The create form.
    Create,
    /// The edit form of a record.
    Edit(&'a str),
}

/// Recoverable validation failure carrying what the user submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Messages keyed by field.
    pub errors: FieldErrors,
    /// Submitted input without password values.
    pub old_input: FormInput,
}

/// Outcome of a rejected store or update.
#[derive(Debug)]
pub enum SubmissionError {
    /// Input failed validation; nothing was written.
    Invalid(ValidationFailure),
    /// Lookup or persistence failed.
    Failed(AppError),
}

impl From<AppError> for SubmissionError {
    fn from(error: AppError) -> Self {
        Self::Failed(error)
    }
}

/// Application service driving the create, store, edit, update, show and
/// destroy lifecycle of one resource.
#[derive(Clone)]
pub struct ResourceService {
    config: Arc<ResourceConfig>,
    repository: Arc<dyn RecordRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl ResourceService {
    /// Creates a resource service.
    #[must_use]
    pub fn new(
        config: Arc<ResourceConfig>,
        repository: Arc<dyn RecordRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            config,
            repository,
            password_hasher,
        }
    }

    /// Returns the bound resource name.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.config.resource()
    }

    /// Returns the route prefix.
    #[must_use]
    pub fn route_prefix(&self) -> &str {
        self.config.route_prefix()
    }

    /// Returns the page title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.config.title()
    }

    /// Returns the resource configuration.
    #[must_use]
    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }
}

/// Hashes a JSON value into a stable uniqueness key.
pub fn hash_json_value(value: &Value) -> AppResult<String> {
    let encoded = serde_json::to_vec(value).map_err(|error| {
        AppError::Internal(format!(
            "failed to encode unique field value hash input: {error}"
        ))
    })?;

    let digest = Sha256::digest(encoded);
    Ok(digest.iter().map(|byte| format!("{byte:02x}")).collect())
}
