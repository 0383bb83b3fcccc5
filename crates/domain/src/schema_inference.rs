use parrot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::field::{FieldDescriptor, FieldType};

/// Columns managed by persistence and never exposed as form fields.
pub const RESERVED_COLUMNS: [&str; 6] = [
    "id",
    "created_at",
    "updated_at",
    "deleted_at",
    "remember_token",
    "email_verified_at",
];

/// Storage type reported by a schema description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Short string.
    String,
    /// Long text.
    Text,
    /// Whole number.
    Integer,
    /// Fractional number.
    Decimal,
    /// Boolean flag.
    Boolean,
    /// Calendar date.
    Date,
    /// Timestamp.
    DateTime,
    /// Structured JSON.
    Json,
}

/// One column of an explicit schema description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    /// Column name.
    pub name: String,
    /// Reported storage type.
    pub inferred_type: ColumnType,
    /// Whether the column accepts nulls.
    pub nullable: bool,
}

impl SchemaColumn {
    /// Creates a column description.
    pub fn new(name: impl Into<String>, inferred_type: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            inferred_type,
            nullable,
        }
    }
}

/// Guesses the field type for a column from its name and storage type.
///
/// Name hints win over string-like storage types; non-string storage types
/// decide on their own.
#[must_use]
pub fn infer_field_type(name: &str, column_type: ColumnType) -> FieldType {
    let name = name.trim().to_ascii_lowercase();
    let has = |needle: &str| name.contains(needle);

    match column_type {
        ColumnType::Boolean => return FieldType::Switch,
        ColumnType::Integer | ColumnType::Decimal => return FieldType::Number,
        ColumnType::Date => return FieldType::Date,
        ColumnType::DateTime => return FieldType::DateTime,
        ColumnType::Json => return FieldType::Textarea,
        ColumnType::String | ColumnType::Text => {}
    }

    if has("password") {
        FieldType::Password
    } else if has("email") {
        FieldType::Email
    } else if has("url") || has("website") || has("link") {
        FieldType::Url
    } else if has("color") || has("colour") {
        FieldType::Color
    } else if has("image") || has("avatar") || has("photo") || has("file") {
        FieldType::File
    } else if name.starts_with("is_") || name.starts_with("has_") {
        FieldType::Switch
    } else if name.ends_with("_at") {
        FieldType::DateTime
    } else if has("date") {
        FieldType::Date
    } else if has("content") || has("body") {
        FieldType::RichText
    } else if column_type == ColumnType::Text || has("description") || has("notes") {
        FieldType::Textarea
    } else {
        FieldType::Text
    }
}

/// Produces form fields for a schema description, skipping reserved columns.
///
/// Non-nullable columns become required unless they are switches, which always
/// submit a value.
pub fn infer_fields(columns: &[SchemaColumn]) -> AppResult<Vec<FieldDescriptor>> {
    let mut fields = Vec::new();
    for column in columns {
        let name = column.name.trim();
        if name.is_empty() {
            return Err(AppError::Configuration(
                "schema column names must not be empty".to_owned(),
            ));
        }
        if RESERVED_COLUMNS.contains(&name) {
            continue;
        }

        let field_type = infer_field_type(name, column.inferred_type);
        let mut field = FieldDescriptor::new(field_type, name);
        if !column.nullable && field_type != FieldType::Switch {
            field = field.required();
        }
        if matches!(field_type, FieldType::Text | FieldType::Email) {
            field = field.searchable().sortable();
        }
        fields.push(field);
    }

    Ok(fields)
}
