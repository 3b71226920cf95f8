/// Task listing query model
///
/// Turns raw listing parameters into a typed [`TaskQuery`]: a list of
/// [`TaskFilter`] clauses plus a [`Page`]. Store implementations translate each
/// clause into their own predicate form (bound SQL parameters for PostgreSQL,
/// [`TaskFilter::matches`] for the in-memory store), so both backends share the
/// exact same sentinel handling.
///
/// # Sentinels
///
/// | Parameter     | "no filter" values      |
/// |---------------|-------------------------|
/// | `search`      | empty                   |
/// | `status`      | `"all"` (default)       |
/// | `category_id` | empty, `"0"`            |
///
/// # Example
///
/// ```
/// use tasktrack_shared::query::{ListTasksParams, TaskFilter, TaskQuery};
///
/// let params = ListTasksParams {
///     page: Some("2".to_string()),
///     status: Some("completed".to_string()),
///     ..Default::default()
/// };
///
/// let query = TaskQuery::from_params(&params).unwrap();
/// assert_eq!(query.page.offset(), 10);
/// assert_eq!(query.filters, vec![TaskFilter::StatusIs("completed".to_string())]);
/// ```
use serde::Deserialize;

use crate::models::task::Task;

/// Default page number
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: i64 = 100;

/// Status value meaning "any status"
pub const ALL_STATUSES: &str = "all";

/// Raw listing parameters as received from the query string
///
/// Kept as strings so malformed numbers fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTasksParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub category_id: Option<String>,
}

/// Error for listing parameters that cannot be interpreted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid category_id: {0}")]
    InvalidCategory(String),
}

/// One page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub number: i64,

    /// Rows per page, within `1..=MAX_PAGE_SIZE`
    pub size: i64,
}

impl Page {
    /// Parses page/limit strings, falling back to defaults for absent,
    /// non-numeric, or non-positive values and capping the size
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        let number = parse_positive(page).unwrap_or(DEFAULT_PAGE);
        let size = parse_positive(limit)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);

        Self { number, size }
    }

    /// Rows to skip: `(page - 1) * limit`
    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.size)
    }

    pub fn limit(&self) -> i64 {
        self.size
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn parse_positive(value: Option<&str>) -> Option<i64> {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 1)
}

/// A single predicate clause over a user's tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFilter {
    /// Case-insensitive literal substring of the title
    TitleContains(String),

    /// Exact status string
    StatusIs(String),

    /// Exact category reference
    CategoryIs(i64),
}

impl TaskFilter {
    /// Evaluates the clause against an in-memory task
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::TitleContains(needle) => task
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            TaskFilter::StatusIs(status) => task.status.as_str() == status,
            TaskFilter::CategoryIs(id) => task.category_id == Some(*id),
        }
    }
}

/// Typed listing query: filters combined with AND, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub filters: Vec<TaskFilter>,
    pub page: Page,
}

impl TaskQuery {
    /// Starts an unfiltered query for the first page
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a clause
    pub fn filter(mut self, filter: TaskFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    /// Builds a query from raw parameters, dropping sentinel values
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidCategory`] when `category_id` is neither a
    /// sentinel nor an integer.
    pub fn from_params(params: &ListTasksParams) -> Result<Self, QueryError> {
        let mut query =
            TaskQuery::new().page(Page::parse(params.page.as_deref(), params.limit.as_deref()));

        if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(TaskFilter::TitleContains(search.to_string()));
        }

        if let Some(status) = params
            .status
            .as_deref()
            .filter(|s| !s.is_empty() && *s != ALL_STATUSES)
        {
            query = query.filter(TaskFilter::StatusIs(status.to_string()));
        }

        if let Some(raw) = params
            .category_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "0")
        {
            let id = raw
                .parse::<i64>()
                .map_err(|_| QueryError::InvalidCategory(raw.to_string()))?;
            query = query.filter(TaskFilter::CategoryIs(id));
        }

        Ok(query)
    }

    /// Checks whether a task satisfies every clause
    pub fn matches(&self, task: &Task) -> bool {
        self.filters.iter().all(|f| f.matches(task))
    }
}

/// Escapes LIKE wildcards so the needle matches literally
pub fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
