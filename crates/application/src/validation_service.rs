use indexmap::IndexMap;
use parrot_core::AppResult;
use parrot_domain::{FieldDescriptor, FieldType, RuleContext, RuleOutcome, ValidationRule};
use serde::Serialize;

use crate::form_service::{Form, FormInput};

/// Ordered field name to messages map produced by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(IndexMap<String, Vec<String>>);

impl FieldErrors {
    /// Creates an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Returns every message recorded for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// Returns the first message recorded for a field.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    /// Returns whether a field has errors.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    /// Returns whether no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates fields with their messages in the order they failed.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

/// Whether a submission creates a record or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionMode {
    /// New record.
    Create,
    /// Existing record.
    Update,
}

/// Result of validating a submission before persistence checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Rule violations keyed by field.
    pub errors: FieldErrors,
    /// Fields that passed their local rules and still need a uniqueness lookup.
    pub pending_unique: Vec<String>,
}

/// Validates submitted input against every input field of a form.
///
/// Rules run in declared order and the first failure per field wins. Blank
/// values only answer to `required`. Blank passwords on update keep the stored
/// hash and skip validation entirely.
pub fn validate_input(
    form: &Form,
    input: &FormInput,
    mode: SubmissionMode,
) -> AppResult<ValidationOutcome> {
    let mut outcome = ValidationOutcome::default();

    for field in form.fields() {
        if !field.field_type().is_input() {
            continue;
        }

        let name = field.name();
        let value = input.get(name).map_or("", String::as_str);
        let blank = value.trim().is_empty();

        if blank && mode == SubmissionMode::Update && field.field_type() == FieldType::Password {
            continue;
        }

        let rules = field.effective_rules()?;
        if blank {
            if rules.contains(&ValidationRule::Required) {
                outcome
                    .errors
                    .add(name, ValidationRule::Required.message(field.label_text(), false));
            }
            continue;
        }

        let context = RuleContext {
            label: field.label_text(),
            numeric: is_numeric_context(field, &rules),
            confirmation: input.get(&format!("{name}_confirmation")).map(String::as_str),
        };

        let mut deferred = false;
        for rule in &rules {
            match rule.check(value, context) {
                RuleOutcome::Pass => {}
                RuleOutcome::Deferred => deferred = true,
                RuleOutcome::Fail(message) => {
                    outcome.errors.add(name, message);
                    deferred = false;
                    break;
                }
            }
        }

        if deferred {
            outcome.pending_unique.push(name.to_owned());
        }
    }

    Ok(outcome)
}

fn is_numeric_context(field: &FieldDescriptor, rules: &[ValidationRule]) -> bool {
    field.field_type().is_numeric() || rules.iter().any(ValidationRule::implies_numeric)
}
