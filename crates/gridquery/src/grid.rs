//! Grid queries and the page engine.
//!
//! A [`GridQuery`] is everything a grid asks for in one request: an
//! optional filter, one sort key and a page window. Compiling it against a
//! record type resolves every path once; the resulting [`CompiledGrid`]
//! can then be run against any number of sources.
//!
//! Running a query
//!
//! 1. filters the source (only when searching is on),
//! 2. stable-sorts the survivors,
//! 3. counts them and derives the page count,
//! 4. cuts out the requested page.
//!
//! Count and window are taken from the same filtered vector.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::GridConfig;
use crate::error::Result;
use crate::filter::{compile_filter, Filter, RuleGroup};
use crate::ordering::{Dir, OrderBy};
use crate::request::RequestContext;
use crate::traits::Gridable;

/// A grid request: filter, sort and page.
///
/// `page == 0` means the first page, `rows == 0` means the configured
/// default page size and an empty `sort_field` means the configured
/// default sort key.
///
/// # Example
///
/// ```
/// use gridquery::{Dir, GridQuery, Op, RuleGroup};
///
/// let query = GridQuery::new()
///     .filter(RuleGroup::and().rule("status", Op::Eq, "Active"))
///     .sort("name", Dir::Asc)
///     .page(2)
///     .rows(10);
/// assert!(query.search);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridQuery {
    /// Whether the filter is applied at all.
    pub search: bool,
    pub filter: Option<RuleGroup>,
    pub sort_field: String,
    pub sort_dir: Dir,
    /// 1-based page number.
    pub page: usize,
    pub rows: usize,
    pub context: RequestContext,
}

impl GridQuery {
    /// Creates a query for the first page with default size and order.
    pub fn new() -> Self {
        GridQuery::default()
    }

    /// Sets the filter and turns searching on.
    pub fn filter(mut self, group: RuleGroup) -> Self {
        self.filter = Some(group);
        self.search = true;
        self
    }

    /// Turns searching on or off without touching the filter.
    pub fn searching(mut self, search: bool) -> Self {
        self.search = search;
        self
    }

    pub fn sort(mut self, field: &str, dir: Dir) -> Self {
        self.sort_field = field.to_string();
        self.sort_dir = dir;
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    pub fn context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    /// Compiles this query for records of type `T` with default settings.
    pub fn compile<T: Gridable>(&self) -> Result<CompiledGrid<T>> {
        self.compile_with(&GridConfig::default())
    }

    /// Compiles this query for records of type `T`.
    ///
    /// Fails if a filter or sort path does not resolve against `T`.
    pub fn compile_with<T: Gridable>(&self, config: &GridConfig) -> Result<CompiledGrid<T>> {
        let schema = T::grid_schema();

        let filter = match (&self.filter, self.search) {
            (Some(group), true) => Some(compile_filter(group, schema, config)?),
            _ => None,
        };
        let order = OrderBy::compile(schema, &self.sort_field, self.sort_dir, config)?;
        let page = self.page.max(1);
        let rows = match self.rows {
            0 => config.default_page_size.max(1),
            rows => rows,
        };

        debug!(
            schema = schema.name,
            filtered = filter.is_some(),
            page,
            rows,
            client_id = self.context.client_id,
            request_id = self.context.request_id,
            "compiled grid query"
        );

        Ok(CompiledGrid {
            filter,
            order,
            page,
            rows,
            _record: PhantomData,
        })
    }
}

/// A grid query resolved against one record type.
///
/// Reusable and shareable across threads.
#[derive(Debug)]
pub struct CompiledGrid<T> {
    filter: Option<Filter>,
    order: OrderBy,
    page: usize,
    rows: usize,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for CompiledGrid<T> {
    fn clone(&self) -> Self {
        CompiledGrid {
            filter: self.filter.clone(),
            order: self.order.clone(),
            page: self.page,
            rows: self.rows,
            _record: PhantomData,
        }
    }
}

impl<T: Gridable> CompiledGrid<T> {
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn order(&self) -> &OrderBy {
        &self.order
    }

    /// Effective page number (at least 1).
    pub fn page(&self) -> usize {
        self.page
    }

    /// Effective page size (at least 1).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Runs the query, borrowing rows from `source`.
    pub fn run<'a>(&self, source: &'a [T]) -> GridResult<&'a T> {
        let mut matched: Vec<&'a T> = match &self.filter {
            Some(filter) => filter.apply(source),
            None => source.iter().collect(),
        };
        self.order.sort(&mut matched);

        let total_records = matched.len();
        let total_pages = total_records.div_ceil(self.rows);
        let start = (self.page - 1).saturating_mul(self.rows).min(total_records);
        let end = start.saturating_add(self.rows).min(total_records);

        trace!(
            total_records,
            total_pages,
            page = self.page,
            start,
            end,
            "cut page window"
        );

        let rows = matched.drain(start..end).collect();
        GridResult {
            total_pages,
            current_page: self.page,
            total_records,
            rows,
        }
    }

    /// Runs the query and clones the page rows.
    pub fn run_cloned(&self, source: &[T]) -> GridResult<T>
    where
        T: Clone,
    {
        self.run(source).map(T::clone)
    }
}

/// Compiles `query` with default settings and runs it against `source`.
pub fn run<'a, T: Gridable>(source: &'a [T], query: &GridQuery) -> Result<GridResult<&'a T>> {
    Ok(query.compile::<T>()?.run(source))
}

/// One page of results plus paging metadata.
///
/// Serializes in the grid's response shape:
/// `{ "total": .., "page": .., "records": .., "rows": [..] }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridResult<T> {
    #[serde(rename = "total")]
    pub total_pages: usize,
    #[serde(rename = "page")]
    pub current_page: usize,
    #[serde(rename = "records")]
    pub total_records: usize,
    pub rows: Vec<T>,
}

impl<T> GridResult<T> {
    /// Converts the rows, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> GridResult<U>
    where
        F: FnMut(T) -> U,
    {
        GridResult {
            total_pages: self.total_pages,
            current_page: self.current_page,
            total_records: self.total_records,
            rows: self.rows.into_iter().map(f).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
