use indexmap::IndexMap;
use parrot_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Kind of listing filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterKind {
    /// Case-insensitive substring match.
    Text,
    /// Exact match against one of the options.
    Select {
        /// Option value to label, in display order.
        options: IndexMap<String, String>,
    },
    /// Inclusive date range read from `{key}_from` and `{key}_to`.
    DateRange,
    /// Yes/no match.
    Boolean,
}

/// Filter narrowing a listing query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDefinition {
    key: NonEmptyString,
    label: String,
    kind: FilterKind,
}

impl FilterDefinition {
    /// Creates a validated filter definition.
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FilterKind) -> AppResult<Self> {
        Ok(Self {
            key: NonEmptyString::new(key)?,
            label: label.into(),
            kind,
        })
    }

    /// Returns the filter key, which is also the query parameter name.
    #[must_use]
    pub fn key(&self) -> &NonEmptyString {
        &self.key
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the filter kind.
    #[must_use]
    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    /// Returns the query parameter names the filter reads.
    #[must_use]
    pub fn parameter_names(&self) -> Vec<String> {
        match self.kind {
            FilterKind::DateRange => vec![
                format!("{}_from", self.key.as_str()),
                format!("{}_to", self.key.as_str()),
            ],
            _ => vec![self.key.as_str().to_owned()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FilterDefinition, FilterKind};

    #[test]
    fn date_ranges_read_two_parameters() {
        let filter = FilterDefinition::new("created_at", "Created", FilterKind::DateRange)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(
            filter.parameter_names(),
            vec!["created_at_from".to_owned(), "created_at_to".to_owned()]
        );
    }
}
