use chrono::{DateTime, SecondsFormat, Utc};
use parrot_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Persisted resource record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: NonEmptyString,
    resource: NonEmptyString,
    data: Map<String, Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Record {
    /// Creates a validated record.
    pub fn new(
        id: impl Into<String>,
        resource: impl Into<String>,
        data: Value,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        let Value::Object(data) = data else {
            return Err(AppError::Validation(
                "record data must be a JSON object".to_owned(),
            ));
        };

        Ok(Self {
            id: NonEmptyString::new(id)?,
            resource: NonEmptyString::new(resource)?,
            data,
            created_at,
            updated_at,
        })
    }

    /// Returns the record id.
    #[must_use]
    pub fn id(&self) -> &NonEmptyString {
        &self.id
    }

    /// Returns the owning resource name.
    #[must_use]
    pub fn resource(&self) -> &NonEmptyString {
        &self.resource
    }

    /// Returns the stored data object.
    #[must_use]
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Resolves a column key, including `id` and the timestamps.
    #[must_use]
    pub fn field_value(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(Value::String(self.id.as_str().to_owned())),
            "created_at" => Some(Value::String(format_timestamp(self.created_at))),
            "updated_at" => Some(Value::String(format_timestamp(self.updated_at))),
            _ => self.data.get(key).cloned(),
        }
    }

    /// Returns a copy of the data with `value` written under `key`.
    #[must_use]
    pub fn data_with(&self, key: &str, value: Value) -> Map<String, Value> {
        let mut data = self.data.clone();
        data.insert(key.to_owned(), value);
        data
    }
}

/// Renders a timestamp in the form used for display and range filters.
#[must_use]
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Renders a stored value as plain text.
#[must_use]
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
