//! Domain entities and invariants for resource scaffolding.

#![forbid(unsafe_code)]

mod action;
mod field;
mod filter;
mod form_tab;
mod record;
mod schema_inference;
mod sort;
mod validation_rule;

pub use action::{ActionDescriptor, ActionVerb, BulkActionDescriptor, BulkOperation, HttpMethod};
pub use field::{FieldDescriptor, FieldType, humanize};
pub use filter::{FilterDefinition, FilterKind};
pub use form_tab::{AlertLevel, ContentBlock, FormItem, Tab};
pub use record::{Record, format_timestamp, value_to_text};
pub use schema_inference::{
    ColumnType, RESERVED_COLUMNS, SchemaColumn, infer_field_type, infer_fields,
};
pub use sort::SortDirection;
pub use validation_rule::{RuleContext, RuleOutcome, ValidationRule};
