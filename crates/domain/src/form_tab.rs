use parrot_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Severity of an alert content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Neutral information.
    Info,
    /// Positive confirmation.
    Success,
    /// Something needs attention.
    Warning,
    /// Something went wrong.
    Danger,
}

impl AlertLevel {
    /// Returns the CSS modifier for the level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// Non-field renderable unit interleaved with fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Horizontal rule with an optional caption.
    Divider {
        /// Optional caption.
        label: Option<String>,
    },
    /// Highlighted message.
    Alert {
        /// Alert severity.
        level: AlertLevel,
        /// Message text, escaped on render.
        message: String,
    },
    /// Raw markup inserted as-is.
    Html {
        /// Trusted markup supplied by the controller.
        content: String,
    },
}

/// One entry in a form's rendering order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FormItem {
    /// Reference to a field by name.
    Field(String),
    /// Content block.
    Block(ContentBlock),
}

/// Named, ordered grouping of fields and content blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    key: NonEmptyString,
    label: String,
    icon: Option<String>,
    items: Vec<FormItem>,
}

impl Tab {
    /// Creates an empty tab.
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        icon: Option<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            key: NonEmptyString::new(key)?,
            label: label.into(),
            icon: icon.filter(|icon| !icon.trim().is_empty()),
            items: Vec::new(),
        })
    }

    /// Returns the tab key.
    #[must_use]
    pub fn key(&self) -> &NonEmptyString {
        &self.key
    }

    /// Returns the tab label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the icon name.
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Returns items in rendering order.
    #[must_use]
    pub fn items(&self) -> &[FormItem] {
        &self.items
    }

    /// Returns the names of fields placed in this tab.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            FormItem::Field(name) => Some(name.as_str()),
            FormItem::Block(_) => None,
        })
    }

    /// Appends an item.
    pub fn push(&mut self, item: FormItem) {
        self.items.push(item);
    }

    /// Removes a field placement, returning whether one was removed.
    pub fn remove_field(&mut self, name: &str) -> bool {
        let before = self.items.len();
        self.items
            .retain(|item| !matches!(item, FormItem::Field(existing) if existing == name));
        before != self.items.len()
    }
}
