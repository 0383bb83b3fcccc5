//! Application services and ports.

#![forbid(unsafe_code)]

mod data_view_service;
mod form_service;
mod layout_service;
mod markup;
mod record_ports;
mod resource_registry;
mod resource_service;
mod security_ports;
mod validation_service;

#[cfg(test)]
mod test_support;

pub use data_view_service::{
    ColumnDescriptor, DataViewService, DisplayFn, GridBuilder, GridConfig, GridPage, GridRequest,
    GridResult,
};
pub use form_service::{
    FieldContainer, Form, FormBuilder, FormInput, FormState, TabBuilder,
};
pub use layout_service::{GridScope, Layout, LayoutBuilder, LayoutItem, LayoutNode};
pub use markup::{Markup, escape};
pub use record_ports::{
    RecordFilter, RecordPage, RecordQuery, RecordRepository, RecordSearch, RecordSort,
    UniqueFieldValue, parse_flag, value_as_flag,
};
pub use resource_registry::{
    ResourceController, ResourceRegistry, ResourceRegistryBuilder, ResourceSummary,
};
pub use resource_service::{
    DetailPage, FormPage, FormTarget, ResourceBuilder, ResourceConfig, ResourceService,
    SubmissionError, ValidationFailure, hash_json_value,
};
pub use security_ports::PasswordHasher;
pub use validation_service::{
    FieldErrors, SubmissionMode, ValidationOutcome, validate_input,
};
