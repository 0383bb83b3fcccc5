use std::collections::BTreeMap;
use std::str::FromStr;

use indexmap::IndexMap;
use parrot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::validation_rule::ValidationRule;

/// Supported form field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Single-line text input.
    Text,
    /// Multi-line text input.
    Textarea,
    /// Email input with implied format validation.
    Email,
    /// Password input, hashed before persistence.
    Password,
    /// Numeric input.
    Number,
    /// Option list.
    Select,
    /// Boolean toggle.
    Switch,
    /// Date-only input (`YYYY-MM-DD`).
    Date,
    /// Date and time input.
    DateTime,
    /// Absolute URL input.
    Url,
    /// Color picker.
    Color,
    /// Hidden input.
    Hidden,
    /// Stored-file identifier produced by the media collaborator.
    File,
    /// Rich text editor.
    RichText,
    /// Raw HTML block rendered in the field flow; never submitted.
    CustomHtml,
}

impl FieldType {
    /// Returns a stable storage value for the field type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Email => "email",
            Self::Password => "password",
            Self::Number => "number",
            Self::Select => "select",
            Self::Switch => "switch",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Url => "url",
            Self::Color => "color",
            Self::Hidden => "hidden",
            Self::File => "file",
            Self::RichText => "richtext",
            Self::CustomHtml => "custom_html",
        }
    }

    /// Returns whether the field accepts submitted input.
    #[must_use]
    pub fn is_input(&self) -> bool {
        !matches!(self, Self::CustomHtml)
    }

    /// Returns whether size rules compare numeric values instead of lengths.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number)
    }

    /// Returns the validation rules implied by the field type alone.
    #[must_use]
    pub fn implied_rules(&self) -> Vec<ValidationRule> {
        match self {
            Self::Email => vec![ValidationRule::Email],
            Self::Number => vec![ValidationRule::Numeric],
            Self::Switch => vec![ValidationRule::Boolean],
            Self::Date | Self::DateTime => vec![ValidationRule::Date],
            Self::Url => vec![ValidationRule::Url],
            _ => Vec::new(),
        }
    }

    /// Converts a submitted string into the stored JSON representation.
    #[must_use]
    pub fn coerce_input(&self, raw: &str) -> Value {
        match self {
            Self::Switch => Value::Bool(is_truthy(raw)),
            Self::Number => {
                let trimmed = raw.trim();
                if let Ok(integer) = trimmed.parse::<i64>() {
                    return Value::Number(integer.into());
                }

                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(raw.to_owned()))
            }
            _ => Value::String(raw.to_owned()),
        }
    }
}

impl FromStr for FieldType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" | "string" => Ok(Self::Text),
            "textarea" => Ok(Self::Textarea),
            "email" => Ok(Self::Email),
            "password" => Ok(Self::Password),
            "number" => Ok(Self::Number),
            "select" => Ok(Self::Select),
            "switch" | "checkbox" => Ok(Self::Switch),
            "date" => Ok(Self::Date),
            "datetime" => Ok(Self::DateTime),
            "url" => Ok(Self::Url),
            "color" => Ok(Self::Color),
            "hidden" => Ok(Self::Hidden),
            "file" => Ok(Self::File),
            "richtext" | "rich_text" => Ok(Self::RichText),
            "custom_html" => Ok(Self::CustomHtml),
            _ => Err(AppError::Configuration(format!(
                "unknown field type '{value}'"
            ))),
        }
    }
}

/// Declarative configuration for one form input.
///
/// Setters consume and return the descriptor so they can be chained inside
/// the form builder's configuration closures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    name: String,
    field_type: FieldType,
    label: String,
    placeholder: Option<String>,
    help: Option<String>,
    required: bool,
    unique: bool,
    searchable: bool,
    sortable: bool,
    validation_rules: Vec<String>,
    options: IndexMap<String, String>,
    default_value: Option<Value>,
    metadata: BTreeMap<String, Value>,
}

impl FieldDescriptor {
    /// Creates a descriptor with a label derived from the field name.
    #[must_use]
    pub fn new(field_type: FieldType, name: impl Into<String>) -> Self {
        let name = name.into().trim().to_owned();
        Self {
            label: humanize(name.as_str()),
            name,
            field_type,
            placeholder: None,
            help: None,
            required: false,
            unique: false,
            searchable: false,
            sortable: false,
            validation_rules: Vec::new(),
            options: IndexMap::new(),
            default_value: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Sets the visible label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the input placeholder.
    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets help text rendered under the input.
    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Requires the value to be unique across records of the resource.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the field as searchable in listings.
    #[must_use]
    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// Marks the field as sortable in listings.
    #[must_use]
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Appends validation rule strings such as `min:3` or `max:255`.
    #[must_use]
    pub fn rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validation_rules
            .extend(rules.into_iter().map(Into::into));
        self
    }

    /// Replaces the option list; insertion order is the display order.
    #[must_use]
    pub fn options<I, K, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|(value, label)| (value.into(), label.into()))
            .collect();
        self
    }

    /// Sets the value used when a new form is rendered.
    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Sets the accepted MIME types for file inputs.
    #[must_use]
    pub fn accept(self, accept: impl Into<String>) -> Self {
        self.meta("accept", Value::String(accept.into()))
    }

    /// Sets the editor height in pixels.
    #[must_use]
    pub fn height(self, height: u32) -> Self {
        self.meta("height", Value::Number(height.into()))
    }

    /// Sets the visible row count for text areas.
    #[must_use]
    pub fn rows(self, rows: u32) -> Self {
        self.meta("rows", Value::Number(rows.into()))
    }

    /// Sets the CSS class of the wrapping element.
    #[must_use]
    pub fn wrapper_class(self, class: impl Into<String>) -> Self {
        self.meta("wrapper_class", Value::String(class.into()))
    }

    /// Stores an arbitrary rendering hint.
    #[must_use]
    pub fn meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns the field name used as the submission key.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the field type.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns the label.
    #[must_use]
    pub fn label_text(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the placeholder.
    #[must_use]
    pub fn placeholder_text(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Returns help text.
    #[must_use]
    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Returns whether the field is required, either by flag or by rule string.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
            || self
                .validation_rules
                .iter()
                .any(|rule| rule.trim() == "required")
    }

    /// Returns whether the field value must be unique.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.unique
            || self
                .validation_rules
                .iter()
                .any(|rule| rule.trim() == "unique")
    }

    /// Returns whether the field is searchable.
    #[must_use]
    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    /// Returns whether the field is sortable.
    #[must_use]
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Returns the declared rule strings.
    #[must_use]
    pub fn validation_rules(&self) -> &[String] {
        &self.validation_rules
    }

    /// Returns the option list.
    #[must_use]
    pub fn option_map(&self) -> &IndexMap<String, String> {
        &self.options
    }

    /// Returns the default value.
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    /// Returns a rendering hint.
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Validates structural invariants of the descriptor.
    pub fn validate(&self) -> AppResult<()> {
        if self.name.is_empty() {
            return Err(AppError::Configuration(format!(
                "{} field must have a non-empty name",
                self.field_type.as_str()
            )));
        }

        if self.name.chars().any(char::is_whitespace) {
            return Err(AppError::Configuration(format!(
                "field name '{}' must not contain whitespace",
                self.name
            )));
        }

        self.effective_rules().map(|_| ())
    }

    /// Compiles the ordered rule list evaluated for submitted values.
    ///
    /// `required` always comes first, then type-implied rules, then declared
    /// rules in declaration order. `unique` is appended last.
    pub fn effective_rules(&self) -> AppResult<Vec<ValidationRule>> {
        let mut rules = Vec::new();
        if self.is_required() {
            rules.push(ValidationRule::Required);
        }

        rules.extend(self.field_type.implied_rules());
        if self.field_type == FieldType::Select && !self.options.is_empty() {
            rules.push(ValidationRule::In(self.options.keys().cloned().collect()));
        }

        for raw in &self.validation_rules {
            let rule = ValidationRule::parse(raw).map_err(|error| match error {
                AppError::Configuration(message) => {
                    AppError::Configuration(format!("{message} on field '{}'", self.name))
                }
                other => other,
            })?;

            if matches!(rule, ValidationRule::Unique) {
                continue;
            }

            if !rules.contains(&rule) {
                rules.push(rule);
            }
        }

        if self.is_unique() {
            rules.push(ValidationRule::Unique);
        }

        Ok(rules)
    }
}

/// Turns a snake_case key into a sentence-case label.
#[must_use]
pub fn humanize(name: &str) -> String {
    let spaced = name.trim().replace(['_', '-'], " ");
    let mut characters = spaced.chars();
    match characters.next() {
        Some(first) => first.to_uppercase().chain(characters).collect(),
        None => String::new(),
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{FieldDescriptor, FieldType, humanize};
    use crate::ValidationRule;

    #[test]
    fn labels_default_to_humanized_names() {
        let field = FieldDescriptor::new(FieldType::Text, "first_name");
        assert_eq!(field.label_text(), "First name");
        assert_eq!(humanize("published-at"), "Published at");
    }

    #[test]
    fn unknown_field_type_is_a_configuration_error() {
        let result = "wysiwyg".parse::<FieldType>();
        assert!(matches!(
            result,
            Err(parrot_core::AppError::Configuration(message)) if message.contains("wysiwyg")
        ));
    }

    #[test]
    fn effective_rules_put_required_and_type_rules_first() {
        let field = FieldDescriptor::new(FieldType::Email, "email")
            .rules(["max:255"])
            .required()
            .unique();

        let rules = field.effective_rules().unwrap_or_else(|_| unreachable!());
        assert_eq!(
            rules,
            vec![
                ValidationRule::Required,
                ValidationRule::Email,
                ValidationRule::Max(255.0),
                ValidationRule::Unique,
            ]
        );
    }

    #[test]
    fn select_options_imply_membership_rule() {
        let field = FieldDescriptor::new(FieldType::Select, "role")
            .options([("admin", "Administrator"), ("editor", "Editor")]);

        let rules = field.effective_rules().unwrap_or_else(|_| unreachable!());
        assert_eq!(
            rules,
            vec![ValidationRule::In(vec![
                "admin".to_owned(),
                "editor".to_owned()
            ])]
        );
    }

    #[test]
    fn unknown_rule_names_the_field() {
        let field = FieldDescriptor::new(FieldType::Text, "title").rules(["shiny"]);
        let error = field.validate().err().map(|error| error.to_string());
        assert!(error.is_some_and(|message| message.contains("'title'")));
    }

    #[test]
    fn empty_names_are_rejected() {
        assert!(FieldDescriptor::new(FieldType::Text, "  ").validate().is_err());
    }

    #[test]
    fn switch_and_number_inputs_are_coerced() {
        assert_eq!(FieldType::Switch.coerce_input("on"), json!(true));
        assert_eq!(FieldType::Switch.coerce_input("0"), json!(false));
        assert_eq!(FieldType::Number.coerce_input("42"), json!(42));
        assert_eq!(FieldType::Number.coerce_input("2.5"), json!(2.5));
        assert_eq!(FieldType::Text.coerce_input("42"), json!("42"));
    }
}
