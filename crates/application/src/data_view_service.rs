use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use chrono::NaiveDate;
use indexmap::IndexMap;
use parrot_core::{AppError, AppResult};
use parrot_domain::{
    ActionDescriptor, BulkActionDescriptor, BulkOperation, FilterDefinition, FilterKind,
    HttpMethod, Record, SortDirection, value_to_text,
};
use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

use crate::markup::{Markup, escape};
use crate::record_ports::{
    RecordFilter, RecordQuery, RecordRepository, RecordSearch, RecordSort, parse_flag,
    value_as_flag,
};

mod bulk;
mod config;
mod query;
mod render;

#[cfg(test)]
mod tests;

pub use config::{ColumnDescriptor, DisplayFn, GridBuilder, GridConfig};
pub use query::GridRequest;

/// One executed listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct GridResult {
    /// Records on the page after filters, search, sort and pagination.
    pub records: Vec<Record>,
    /// Matching records before pagination.
    pub total: usize,
    /// 1-indexed page that was requested.
    pub current_page: usize,
    /// `max(1, ceil(total / per_page))`.
    pub total_pages: usize,
    /// Page size applied.
    pub per_page: usize,
}

/// Rendered listing plus its pagination summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridPage {
    /// Table markup including toolbar and pagination.
    pub markup: Markup,
    /// 1-indexed page that was requested.
    pub current_page: usize,
    /// Number of pages.
    pub total_pages: usize,
    /// Matching records before pagination.
    pub total: usize,
    /// Page size applied.
    pub per_page: usize,
}

/// Application service executing data grid configurations.
#[derive(Clone)]
pub struct DataViewService {
    repository: Arc<dyn RecordRepository>,
}

impl DataViewService {
    /// Creates a data view service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn RecordRepository>) -> Self {
        Self { repository }
    }

    /// Runs the grid query for one request.
    pub async fn query(&self, grid: &GridConfig, request: &GridRequest) -> AppResult<GridResult> {
        let query = grid.record_query(request);
        let page = self
            .repository
            .query_records(grid.resource(), &query)
            .await?;

        let per_page = if grid.paginated() {
            grid.per_page()
        } else {
            page.total
        };
        let current_page = if grid.paginated() { request.page() } else { 1 };

        Ok(GridResult {
            records: page.records,
            total: page.total,
            current_page,
            total_pages: total_pages(page.total, per_page),
            per_page,
        })
    }

    /// Runs the grid query and renders the table.
    pub async fn render(&self, grid: &GridConfig, request: &GridRequest) -> AppResult<GridPage> {
        let result = self.query(grid, request).await?;
        let markup = grid.render_table(request, &result);

        Ok(GridPage {
            markup,
            current_page: result.current_page,
            total_pages: result.total_pages,
            total: result.total,
            per_page: result.per_page,
        })
    }
}

fn total_pages(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 1;
    }

    total.div_ceil(per_page).max(1)
}
