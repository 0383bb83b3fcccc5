use std::cmp::Ordering;

use async_trait::async_trait;
use parrot_core::AppResult;
use parrot_domain::{Record, SortDirection, value_to_text};
use serde_json::Value;

/// Uniqueness index entry persisted alongside resource records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniqueFieldValue {
    /// Field name.
    pub field_name: String,
    /// Stable hash for the field value.
    pub field_value_hash: String,
}

/// Single narrowing condition applied to a listing.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordFilter {
    /// Case-insensitive substring match on the text form.
    Contains {
        /// Column key.
        field: String,
        /// Lowercased needle.
        needle: String,
    },
    /// Exact match on the text form.
    Equals {
        /// Column key.
        field: String,
        /// Expected text.
        value: String,
    },
    /// Inclusive range on the `YYYY-MM-DD` prefix of the text form.
    DateRange {
        /// Column key.
        field: String,
        /// Lower bound.
        from: Option<String>,
        /// Upper bound.
        to: Option<String>,
    },
    /// Boolean-like match.
    Boolean {
        /// Column key.
        field: String,
        /// Expected flag.
        expected: bool,
    },
}

impl RecordFilter {
    /// Returns the column key the filter reads.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Contains { field, .. }
            | Self::Equals { field, .. }
            | Self::DateRange { field, .. }
            | Self::Boolean { field, .. } => field.as_str(),
        }
    }

    /// Returns whether the record satisfies the filter.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        let value = record.field_value(self.field());
        match self {
            Self::Contains { needle, .. } => value
                .as_ref()
                .is_some_and(|value| value_to_text(value).to_lowercase().contains(needle)),
            Self::Equals { value: expected, .. } => value
                .as_ref()
                .is_some_and(|value| value_to_text(value) == *expected),
            Self::DateRange { from, to, .. } => {
                let Some(text) = value.as_ref().map(value_to_text) else {
                    return false;
                };
                let Some(day) = text.get(..10) else {
                    return false;
                };
                from.as_deref().is_none_or(|from| day >= from)
                    && to.as_deref().is_none_or(|to| day <= to)
            }
            Self::Boolean { expected, .. } => {
                value.as_ref().and_then(value_as_flag) == Some(*expected)
            }
        }
    }
}

/// Free-text search across a set of columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSearch {
    /// Lowercased search term.
    pub term: String,
    /// Columns searched, combined with logical OR.
    pub fields: Vec<String>,
}

impl RecordSearch {
    /// Returns whether any searched column contains the term.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.fields.iter().any(|field| {
            record
                .field_value(field)
                .is_some_and(|value| value_to_text(&value).to_lowercase().contains(&self.term))
        })
    }
}

/// Sort instruction for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSort {
    /// Column key.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

/// Query inputs for resource record listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    /// Filters combined with logical AND.
    pub filters: Vec<RecordFilter>,
    /// Optional free-text search.
    pub search: Option<RecordSearch>,
    /// Optional sort; records fall back to id order.
    pub sort: Option<RecordSort>,
    /// Maximum rows returned, or all rows when absent.
    pub limit: Option<usize>,
    /// Rows skipped before the page starts.
    pub offset: usize,
}

/// One page of records plus the number of matching records.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPage {
    /// Records on the page.
    pub records: Vec<Record>,
    /// Matching records before pagination.
    pub total: usize,
}

impl RecordQuery {
    /// Returns whether the record passes every filter and the search.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|filter| filter.matches(record))
            && self
                .search
                .as_ref()
                .is_none_or(|search| search.matches(record))
    }

    /// Orders two records by the sort column, then by id.
    ///
    /// Numbers sort before text and missing values sort last in both
    /// directions.
    #[must_use]
    pub fn compare(&self, left: &Record, right: &Record) -> Ordering {
        let ordering = match &self.sort {
            Some(sort) => {
                let left_key = SortKey::of(left.field_value(&sort.field));
                let right_key = SortKey::of(right.field_value(&sort.field));
                left_key.compare(&right_key, sort.direction)
            }
            None => Ordering::Equal,
        };

        ordering.then_with(|| left.id().as_str().cmp(right.id().as_str()))
    }

    /// Filters, sorts and paginates an in-memory record set.
    #[must_use]
    pub fn apply(&self, records: impl IntoIterator<Item = Record>) -> RecordPage {
        let mut matching: Vec<Record> = records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect();
        matching.sort_by(|left, right| self.compare(left, right));

        let total = matching.len();
        let records = matching
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();

        RecordPage { records, total }
    }
}

#[derive(Debug, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
    Missing,
}

impl SortKey {
    fn of(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Missing,
            Some(Value::Number(number)) => number
                .as_f64()
                .map_or_else(|| Self::Text(number.to_string()), Self::Number),
            Some(value) => Self::Text(value_to_text(&value).to_lowercase()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Text(_) => 1,
            Self::Missing => 2,
        }
    }

    fn compare(&self, other: &Self, direction: SortDirection) -> Ordering {
        let ordering = match (self, other) {
            (Self::Number(left), Self::Number(right)) => left.total_cmp(right),
            (Self::Text(left), Self::Text(right)) => left.cmp(right),
            _ => return self.rank().cmp(&other.rank()),
        };

        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Interprets a stored value as a flag.
#[must_use]
pub fn value_as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_i64().map(|number| number != 0),
        Value::String(text) => parse_flag(text),
        _ => None,
    }
}

/// Parses `1/0/true/false/yes/no/on/off`.
#[must_use]
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Repository port for resource record persistence.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Creates a record and attaches unique field index entries.
    async fn create_record(
        &self,
        resource: &str,
        data: Value,
        unique_values: Vec<UniqueFieldValue>,
    ) -> AppResult<Record>;

    /// Replaces a record's data and its unique field index entries.
    async fn update_record(
        &self,
        resource: &str,
        record_id: &str,
        data: Value,
        unique_values: Vec<UniqueFieldValue>,
    ) -> AppResult<Record>;

    /// Finds a record by identifier.
    async fn find_record(&self, resource: &str, record_id: &str) -> AppResult<Option<Record>>;

    /// Deletes a record by identifier.
    async fn delete_record(&self, resource: &str, record_id: &str) -> AppResult<()>;

    /// Queries records with filters, search, sort and pagination.
    async fn query_records(&self, resource: &str, query: &RecordQuery) -> AppResult<RecordPage>;

    /// Counts every record of a resource.
    async fn count_records(&self, resource: &str) -> AppResult<usize>;

    /// Returns the id of the record owning a unique value, if any.
    async fn find_unique_owner(
        &self,
        resource: &str,
        unique_value: &UniqueFieldValue,
    ) -> AppResult<Option<String>>;

    /// Deletes every listed record, or none when one id is missing.
    async fn bulk_delete(&self, resource: &str, record_ids: &[String]) -> AppResult<usize>;

    /// Writes one data field on every listed record, or on none when one id is
    /// missing.
    ///
    /// When `unique` is set a non-blank value can be written to a single
    /// record only, and the unique index follows the new value.
    async fn bulk_set_field(
        &self,
        resource: &str,
        record_ids: &[String],
        field: &str,
        value: Value,
        unique: bool,
    ) -> AppResult<usize>;
}
