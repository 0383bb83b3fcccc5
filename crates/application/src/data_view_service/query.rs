use super::*;

/// Listing parameters read leniently from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridRequest {
    page: usize,
    sort: Option<String>,
    direction: Option<SortDirection>,
    search: Option<String>,
    params: BTreeMap<String, String>,
}

impl GridRequest {
    /// Reads `page`, `sort`, `direction`, `search` and filter parameters.
    ///
    /// Unparseable pages fall back to 1 and unknown directions are dropped.
    #[must_use]
    pub fn from_params(params: BTreeMap<String, String>) -> Self {
        let page = params
            .get("page")
            .and_then(|page| page.trim().parse::<usize>().ok())
            .filter(|page| *page > 0)
            .unwrap_or(1);
        let sort = non_blank(params.get("sort"));
        let direction = params
            .get("direction")
            .and_then(|direction| direction.parse::<SortDirection>().ok());
        let search = non_blank(params.get("search"));

        Self {
            page,
            sort,
            direction,
            search,
            params,
        }
    }

    /// Returns the 1-indexed page.
    #[must_use]
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    /// Returns the requested sort column.
    #[must_use]
    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    /// Returns the requested direction.
    #[must_use]
    pub fn direction(&self) -> Option<SortDirection> {
        self.direction
    }

    /// Returns the search term.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Returns a raw parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Builds a query string from the current parameters with overrides.
    #[must_use]
    pub fn query_string(&self, overrides: &[(&str, String)]) -> String {
        let mut params = self.params.clone();
        for (key, value) in overrides {
            params.insert((*key).to_owned(), value.clone());
        }

        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter().filter(|(_, value)| !value.is_empty()))
            .finish()
    }
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

impl GridConfig {
    /// Translates a request into a repository query.
    ///
    /// Unknown sort columns, unknown select options and malformed dates are
    /// ignored rather than rejected.
    #[must_use]
    pub fn record_query(&self, request: &GridRequest) -> RecordQuery {
        let filters = self
            .filters()
            .iter()
            .filter_map(|filter| Self::record_filter(filter, request))
            .collect();

        let search = request
            .search()
            .filter(|_| self.searchable())
            .and_then(|term| {
                let fields: Vec<String> = self
                    .columns()
                    .iter()
                    .filter(|column| column.is_searchable())
                    .map(|column| column.key().to_owned())
                    .collect();
                (!fields.is_empty()).then(|| RecordSearch {
                    term: term.to_lowercase(),
                    fields,
                })
            });

        let (limit, offset) = if self.paginated() {
            let offset = (request.page() - 1).saturating_mul(self.per_page());
            (Some(self.per_page()), offset)
        } else {
            (None, 0)
        };

        RecordQuery {
            filters,
            search,
            sort: self.effective_sort(request),
            limit,
            offset,
        }
    }

    /// Resolves the requested sort, falling back to the default sort.
    #[must_use]
    pub fn effective_sort(&self, request: &GridRequest) -> Option<RecordSort> {
        let requested = request
            .sort()
            .and_then(|key| self.column(key))
            .filter(|column| column.is_sortable())
            .map(|column| RecordSort {
                field: column.key().to_owned(),
                direction: request.direction().unwrap_or_default(),
            });

        requested.or_else(|| {
            self.default_sort().map(|(field, direction)| RecordSort {
                field: field.to_owned(),
                direction,
            })
        })
    }

    fn record_filter(filter: &FilterDefinition, request: &GridRequest) -> Option<RecordFilter> {
        let key = filter.key().as_str();
        match filter.kind() {
            FilterKind::Text => request.param(key).map(|needle| RecordFilter::Contains {
                field: key.to_owned(),
                needle: needle.trim().to_lowercase(),
            }),
            FilterKind::Select { options } => request
                .param(key)
                .filter(|value| options.contains_key(*value))
                .map(|value| RecordFilter::Equals {
                    field: key.to_owned(),
                    value: value.to_owned(),
                }),
            FilterKind::DateRange => {
                let from = date_param(request, &format!("{key}_from"));
                let to = date_param(request, &format!("{key}_to"));
                (from.is_some() || to.is_some()).then(|| RecordFilter::DateRange {
                    field: key.to_owned(),
                    from,
                    to,
                })
            }
            FilterKind::Boolean => request
                .param(key)
                .and_then(parse_flag)
                .map(|expected| RecordFilter::Boolean {
                    field: key.to_owned(),
                    expected,
                }),
        }
    }
}

fn date_param(request: &GridRequest, key: &str) -> Option<String> {
    request
        .param(key)
        .map(str::trim)
        .and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
}
