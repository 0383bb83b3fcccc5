use std::str::FromStr;

use parrot_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Route verb an action links to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionVerb {
    /// Record detail page.
    Show,
    /// Record edit form.
    Edit,
    /// Record deletion.
    Destroy,
    /// Custom path segment appended after the record id.
    Custom(String),
}

/// HTTP method used to trigger an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Safe navigation.
    Get,
    /// Form submission.
    Post,
    /// Full update.
    Put,
    /// Partial update.
    Patch,
    /// Removal.
    Delete,
}

impl HttpMethod {
    /// Returns the method token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Returns whether browsers can submit the method from a plain form.
    #[must_use]
    pub fn is_native_form_method(&self) -> bool {
        matches!(self, Self::Get | Self::Post)
    }
}

impl FromStr for HttpMethod {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unsupported http method '{value}'"
            ))),
        }
    }
}

/// Row-level action rendered next to each record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    key: NonEmptyString,
    label: String,
    icon: Option<String>,
    verb: ActionVerb,
    http_method: HttpMethod,
    requires_confirm: bool,
}

impl ActionDescriptor {
    /// Creates a validated action descriptor.
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        verb: ActionVerb,
        http_method: HttpMethod,
    ) -> AppResult<Self> {
        let key = NonEmptyString::new(key)
            .map_err(|_| AppError::Configuration("action key must not be empty".to_owned()))?;
        if let ActionVerb::Custom(segment) = &verb
            && segment.trim().is_empty()
        {
            return Err(AppError::Configuration(format!(
                "custom action '{key}' must name a path segment"
            )));
        }

        Ok(Self {
            key,
            label: label.into(),
            icon: None,
            verb,
            http_method,
            requires_confirm: false,
        })
    }

    /// Link to the detail page.
    pub fn show() -> AppResult<Self> {
        Ok(Self::new("show", "View", ActionVerb::Show, HttpMethod::Get)?.with_icon("eye"))
    }

    /// Link to the edit form.
    pub fn edit() -> AppResult<Self> {
        Ok(Self::new("edit", "Edit", ActionVerb::Edit, HttpMethod::Get)?.with_icon("pencil"))
    }

    /// Delete button guarded by a confirmation prompt.
    pub fn destroy() -> AppResult<Self> {
        Ok(
            Self::new("destroy", "Delete", ActionVerb::Destroy, HttpMethod::Delete)?
                .with_icon("trash")
                .confirm(),
        )
    }

    /// Custom action under `{route_prefix}/{id}/{segment}`.
    pub fn custom(
        key: impl Into<String>,
        label: impl Into<String>,
        segment: impl Into<String>,
        http_method: HttpMethod,
    ) -> AppResult<Self> {
        Self::new(key, label, ActionVerb::Custom(segment.into()), http_method)
    }

    /// Sets the icon name.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Requires a confirmation prompt before submitting.
    #[must_use]
    pub fn confirm(mut self) -> Self {
        self.requires_confirm = true;
        self
    }

    /// Returns the action key.
    #[must_use]
    pub fn key(&self) -> &NonEmptyString {
        &self.key
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the icon name.
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Returns the route verb.
    #[must_use]
    pub fn verb(&self) -> &ActionVerb {
        &self.verb
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn http_method(&self) -> HttpMethod {
        self.http_method
    }

    /// Returns whether the action asks for confirmation.
    #[must_use]
    pub fn requires_confirm(&self) -> bool {
        self.requires_confirm
    }

    /// Builds the action URL for one record.
    #[must_use]
    pub fn href(&self, route_prefix: &str, record_id: &str) -> String {
        let base = format!("{}/{record_id}", route_prefix.trim_end_matches('/'));
        match &self.verb {
            ActionVerb::Show | ActionVerb::Destroy => base,
            ActionVerb::Edit => format!("{base}/edit"),
            ActionVerb::Custom(segment) => {
                format!("{base}/{}", segment.trim_matches('/'))
            }
        }
    }
}

/// Mutation a bulk action applies to every selected record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum BulkOperation {
    /// Removes the records.
    Delete,
    /// Writes one data field on every record.
    SetField {
        /// Target field name.
        field: String,
        /// Value written.
        value: Value,
    },
}

/// Action applied to a caller-selected set of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkActionDescriptor {
    action: ActionDescriptor,
    operation: BulkOperation,
}

impl BulkActionDescriptor {
    /// Creates a bulk action from a descriptor and its operation.
    pub fn new(action: ActionDescriptor, operation: BulkOperation) -> AppResult<Self> {
        if let BulkOperation::SetField { field, .. } = &operation
            && field.trim().is_empty()
        {
            return Err(AppError::Configuration(format!(
                "bulk action '{}' must name the field it sets",
                action.key()
            )));
        }

        Ok(Self { action, operation })
    }

    /// Bulk delete with confirmation.
    pub fn delete() -> AppResult<Self> {
        let action = ActionDescriptor::new(
            "delete",
            "Delete selected",
            ActionVerb::Custom("bulk".to_owned()),
            HttpMethod::Post,
        )?
        .with_icon("trash")
        .confirm();
        Self::new(action, BulkOperation::Delete)
    }

    /// Bulk field assignment, e.g. activate or deactivate.
    pub fn set_field(
        key: impl Into<String>,
        label: impl Into<String>,
        field: impl Into<String>,
        value: Value,
    ) -> AppResult<Self> {
        let action = ActionDescriptor::new(
            key,
            label,
            ActionVerb::Custom("bulk".to_owned()),
            HttpMethod::Post,
        )?;
        Self::new(
            action,
            BulkOperation::SetField {
                field: field.into(),
                value,
            },
        )
    }

    /// Returns the descriptor.
    #[must_use]
    pub fn action(&self) -> &ActionDescriptor {
        &self.action
    }

    /// Returns the action key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.action.key().as_str()
    }

    /// Returns the mutation.
    #[must_use]
    pub fn operation(&self) -> &BulkOperation {
        &self.operation
    }
}
