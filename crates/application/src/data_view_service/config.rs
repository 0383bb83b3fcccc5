use super::*;

/// Display transform turning a stored value into cell markup.
pub type DisplayFn = Arc<dyn Fn(&Value, &Record) -> Markup + Send + Sync>;

/// Declarative configuration for one grid column.
#[derive(Clone)]
pub struct ColumnDescriptor {
    key: String,
    label: String,
    sortable: bool,
    searchable: bool,
    display: Option<DisplayFn>,
}

impl Debug for ColumnDescriptor {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ColumnDescriptor")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("searchable", &self.searchable)
            .field("display", &self.display.is_some())
            .finish()
    }
}

impl ColumnDescriptor {
    /// Creates a plain column.
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into().trim().to_owned(),
            label: label.into(),
            sortable: false,
            searchable: false,
            display: None,
        }
    }

    /// Allows sorting by this column.
    #[must_use]
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Includes this column in free-text search.
    #[must_use]
    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// Sets the display transform.
    #[must_use]
    pub fn display<F>(mut self, display: F) -> Self
    where
        F: Fn(&Value, &Record) -> Markup + Send + Sync + 'static,
    {
        self.display = Some(Arc::new(display));
        self
    }

    /// Renders boolean-like values as a yes/no badge.
    #[must_use]
    pub fn badge(self, yes: &str, no: &str) -> Self {
        let yes = escape(yes);
        let no = escape(no);
        self.display(move |value, _| {
            if value_as_flag(value) == Some(true) {
                Markup::raw(format!("<span class=\"badge badge-success\">{yes}</span>"))
            } else {
                Markup::raw(format!("<span class=\"badge badge-secondary\">{no}</span>"))
            }
        })
    }

    /// Maps stored values to labels, falling back to the raw value.
    #[must_use]
    pub fn lookup<I, K, V>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let labels: IndexMap<String, String> = labels
            .into_iter()
            .map(|(value, label)| (value.into(), label.into()))
            .collect();
        self.display(move |value, _| {
            let text = value_to_text(value);
            let label = labels.get(&text).unwrap_or(&text);
            Markup::text(label)
        })
    }

    /// Returns the column key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the header label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns whether the column is sortable.
    #[must_use]
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Returns whether the column is searchable.
    #[must_use]
    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    /// Renders the cell for one record.
    #[must_use]
    pub fn render_cell(&self, record: &Record) -> Markup {
        let value = record.field_value(&self.key).unwrap_or(Value::Null);
        match &self.display {
            Some(display) => display(&value, record),
            None => Markup::text(&value_to_text(&value)),
        }
    }
}

/// Accumulates columns, filters and actions into a [`GridConfig`].
#[derive(Debug)]
pub struct GridBuilder {
    resource: String,
    title: Option<String>,
    description: Option<String>,
    route_prefix: Option<String>,
    columns: Vec<ColumnDescriptor>,
    filters: Vec<FilterDefinition>,
    per_page: usize,
    default_sort: Option<(String, SortDirection)>,
    pagination: bool,
    search: bool,
    actions: Vec<ActionDescriptor>,
    bulk_actions: Vec<BulkActionDescriptor>,
    error: Option<AppError>,
}

/// Immutable grid configuration produced by [`GridBuilder::build`].
#[derive(Debug, Clone)]
pub struct GridConfig {
    resource: String,
    title: String,
    description: Option<String>,
    route_prefix: String,
    columns: Vec<ColumnDescriptor>,
    filters: Vec<FilterDefinition>,
    per_page: usize,
    default_sort: Option<(String, SortDirection)>,
    pagination: bool,
    search: bool,
    actions: Vec<ActionDescriptor>,
    bulk_actions: Vec<BulkActionDescriptor>,
    unique_fields: BTreeSet<String>,
}

impl GridBuilder {
    /// Creates a builder bound to a resource name.
    #[must_use]
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into().trim().to_owned(),
            title: None,
            description: None,
            route_prefix: None,
            columns: Vec::new(),
            filters: Vec::new(),
            per_page: 15,
            default_sort: None,
            pagination: true,
            search: true,
            actions: Vec::new(),
            bulk_actions: Vec::new(),
            error: None,
        }
    }

    /// Sets the page title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the page description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the route prefix used for row and bulk action links.
    #[must_use]
    pub fn route_prefix(mut self, route_prefix: impl Into<String>) -> Self {
        self.route_prefix = Some(route_prefix.into());
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    /// Sets the sort used when the request names no sortable column.
    #[must_use]
    pub fn default_sort(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.default_sort = Some((column.into(), direction));
        self
    }

    /// Enables or disables pagination.
    #[must_use]
    pub fn pagination(mut self, enabled: bool) -> Self {
        self.pagination = enabled;
        self
    }

    /// Enables or disables free-text search.
    #[must_use]
    pub fn search(mut self, enabled: bool) -> Self {
        self.search = enabled;
        self
    }

    /// Adds the sortable record id column.
    #[must_use]
    pub fn id(self, label: &str) -> Self {
        self.column("id", label, ColumnDescriptor::sortable)
    }

    /// Adds a column configured by `configure`.
    #[must_use]
    pub fn column<F>(mut self, key: &str, label: &str, configure: F) -> Self
    where
        F: FnOnce(ColumnDescriptor) -> ColumnDescriptor,
    {
        self.columns
            .push(configure(ColumnDescriptor::new(key, label)));
        self
    }

    /// Adds a case-insensitive substring filter.
    #[must_use]
    pub fn text_filter(self, key: &str, label: &str) -> Self {
        self.filter(key, label, FilterKind::Text)
    }

    /// Adds an exact-match filter over the listed options.
    #[must_use]
    pub fn select_filter<I, K, V>(self, key: &str, label: &str, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let options = options
            .into_iter()
            .map(|(value, label)| (value.into(), label.into()))
            .collect();
        self.filter(key, label, FilterKind::Select { options })
    }

    /// Adds an inclusive date range filter.
    #[must_use]
    pub fn date_range_filter(self, key: &str, label: &str) -> Self {
        self.filter(key, label, FilterKind::DateRange)
    }

    /// Adds a yes/no filter.
    #[must_use]
    pub fn boolean_filter(self, key: &str, label: &str) -> Self {
        self.filter(key, label, FilterKind::Boolean)
    }

    /// Adds row actions.
    #[must_use]
    pub fn actions<I>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = ActionDescriptor>,
    {
        self.actions.extend(actions);
        self
    }

    /// Adds bulk actions.
    #[must_use]
    pub fn bulk_actions<I>(mut self, bulk_actions: I) -> Self
    where
        I: IntoIterator<Item = BulkActionDescriptor>,
    {
        self.bulk_actions.extend(bulk_actions);
        self
    }

    /// Validates the declarations and produces the immutable grid.
    pub fn build(self) -> AppResult<GridConfig> {
        if let Some(error) = self.error {
            return Err(error);
        }

        if self.resource.is_empty() {
            return Err(AppError::Configuration(
                "data grid must be bound to a resource".to_owned(),
            ));
        }

        if self.per_page == 0 {
            return Err(AppError::Configuration(format!(
                "data grid '{}' must show at least one row per page",
                self.resource
            )));
        }

        let mut column_keys = BTreeSet::new();
        for column in &self.columns {
            if column.key().is_empty() {
                return Err(AppError::Configuration(format!(
                    "data grid '{}' has a column with an empty key",
                    self.resource
                )));
            }
            if !column_keys.insert(column.key()) {
                return Err(AppError::Configuration(format!(
                    "data grid '{}' declares column '{}' twice",
                    self.resource,
                    column.key()
                )));
            }
        }

        let mut filter_keys = BTreeSet::new();
        for filter in &self.filters {
            if !filter_keys.insert(filter.key().as_str()) {
                return Err(AppError::Configuration(format!(
                    "data grid '{}' declares filter '{}' twice",
                    self.resource,
                    filter.key()
                )));
            }
        }

        let mut bulk_keys = BTreeSet::new();
        for bulk_action in &self.bulk_actions {
            if !bulk_keys.insert(bulk_action.key()) {
                return Err(AppError::Configuration(format!(
                    "data grid '{}' declares bulk action '{}' twice",
                    self.resource,
                    bulk_action.key()
                )));
            }
        }

        if let Some((column, _)) = &self.default_sort
            && !column_keys.contains(column.as_str())
        {
            return Err(AppError::Configuration(format!(
                "data grid '{}' sorts by unknown column '{column}'",
                self.resource
            )));
        }

        Ok(GridConfig {
            title: self
                .title
                .unwrap_or_else(|| parrot_domain::humanize(&self.resource)),
            route_prefix: self
                .route_prefix
                .unwrap_or_else(|| format!("/admin/{}", self.resource)),
            resource: self.resource,
            description: self.description,
            columns: self.columns,
            filters: self.filters,
            per_page: self.per_page,
            default_sort: self.default_sort,
            pagination: self.pagination,
            search: self.search,
            actions: self.actions,
            bulk_actions: self.bulk_actions,
            unique_fields: BTreeSet::new(),
        })
    }

    fn filter(mut self, key: &str, label: &str, kind: FilterKind) -> Self {
        match FilterDefinition::new(key.trim(), label, kind) {
            Ok(filter) => self.filters.push(filter),
            Err(_) => {
                self.error.get_or_insert(AppError::Configuration(format!(
                    "data grid '{}' has a filter with an empty key",
                    self.resource
                )));
            }
        }
        self
    }
}

impl GridConfig {
    /// Returns the bound resource name.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.resource.as_str()
    }

    /// Returns the page title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the page description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the route prefix.
    #[must_use]
    pub fn route_prefix(&self) -> &str {
        self.route_prefix.as_str()
    }

    /// Returns the columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Returns a column by key.
    #[must_use]
    pub fn column(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.key() == key)
    }

    /// Returns the filters.
    #[must_use]
    pub fn filters(&self) -> &[FilterDefinition] {
        &self.filters
    }

    /// Returns the page size.
    #[must_use]
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Returns the default sort.
    #[must_use]
    pub fn default_sort(&self) -> Option<(&str, SortDirection)> {
        self.default_sort
            .as_ref()
            .map(|(column, direction)| (column.as_str(), *direction))
    }

    /// Returns whether results are paginated.
    #[must_use]
    pub fn paginated(&self) -> bool {
        self.pagination
    }

    /// Returns whether free-text search is enabled.
    #[must_use]
    pub fn searchable(&self) -> bool {
        self.search
    }

    /// Returns the row actions.
    #[must_use]
    pub fn actions(&self) -> &[ActionDescriptor] {
        &self.actions
    }

    /// Returns the bulk actions.
    #[must_use]
    pub fn bulk_actions(&self) -> &[BulkActionDescriptor] {
        &self.bulk_actions
    }

    /// Returns a bulk action by key.
    #[must_use]
    pub fn bulk_action(&self, key: &str) -> Option<&BulkActionDescriptor> {
        self.bulk_actions
            .iter()
            .find(|bulk_action| bulk_action.key() == key)
    }

    /// Marks the resource's unique fields so bulk writes keep them unique.
    #[must_use]
    pub fn with_unique_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_fields
            .extend(fields.into_iter().map(|field| field.into().trim().to_owned()));
        self
    }

    /// Returns whether `field` holds values unique across the resource.
    #[must_use]
    pub fn is_unique_field(&self, field: &str) -> bool {
        self.unique_fields.contains(field)
    }
}
