use std::collections::BTreeMap;

use indexmap::IndexMap;
use parrot_core::{AppError, AppResult};
use parrot_domain::{
    AlertLevel, ContentBlock, FieldDescriptor, FieldType, FormItem, Record, Tab, value_to_text,
};
use serde_json::Value;

use crate::markup::{Markup, escape};
use crate::record_ports::value_as_flag;
use crate::validation_service::FieldErrors;

mod builder;
mod render;

#[cfg(test)]
mod tests;

pub use builder::{FieldContainer, FormBuilder, TabBuilder};

/// Submitted form input keyed by field name.
pub type FormInput = BTreeMap<String, String>;

/// Immutable form produced by [`FormBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    fields: IndexMap<String, FieldDescriptor>,
    layout: FormLayout,
}

#[derive(Debug, Clone, PartialEq)]
enum FormLayout {
    Flat(Vec<FormItem>),
    Tabbed(Vec<Tab>),
}

impl Form {
    /// Returns a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Returns every field in rendering order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.items()
            .filter_map(|item| match item {
                FormItem::Field(name) => self.fields.get(name),
                FormItem::Block(_) => None,
            })
    }

    /// Returns the tabs, empty for flat forms.
    #[must_use]
    pub fn tabs(&self) -> &[Tab] {
        match &self.layout {
            FormLayout::Flat(_) => &[],
            FormLayout::Tabbed(tabs) => tabs,
        }
    }

    /// Returns whether the form renders as tabs.
    #[must_use]
    pub fn has_tabs(&self) -> bool {
        matches!(self.layout, FormLayout::Tabbed(_))
    }

    fn items(&self) -> Box<dyn Iterator<Item = &FormItem> + '_> {
        match &self.layout {
            FormLayout::Flat(items) => Box::new(items.iter()),
            FormLayout::Tabbed(tabs) => Box::new(tabs.iter().flat_map(|tab| tab.items().iter())),
        }
    }
}

/// Values and errors shown when a form is rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    values: BTreeMap<String, Value>,
    errors: FieldErrors,
}

impl FormState {
    /// Creates an empty state; fields show their defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-displays submitted input together with its errors.
    #[must_use]
    pub fn from_input(input: &FormInput, errors: FieldErrors) -> Self {
        Self {
            values: input
                .iter()
                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                .collect(),
            errors,
        }
    }

    /// Pre-populates a form with stored record values, leaving passwords blank.
    #[must_use]
    pub fn from_record(form: &Form, record: &Record) -> Self {
        let values = form
            .fields()
            .filter(|field| field.field_type() != FieldType::Password)
            .filter_map(|field| {
                record
                    .field_value(field.name())
                    .map(|value| (field.name().to_owned(), value))
            })
            .collect();

        Self {
            values,
            errors: FieldErrors::new(),
        }
    }

    /// Sets one value.
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Returns a value by field name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns the field errors.
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }
}
