//! Request adapter: grid query-string parameters to a [`GridQuery`].
//!
//! The grid sends its state as flat key/value pairs:
//!
//! ```text
//! _search=true&page=2&rows=10&sidx=name&sord=asc
//!     &filters={"groupOp":"AND","rules":[...]}
//! ```
//!
//! or, for the single-field search box,
//!
//! ```text
//! _search=true&searchField=name&searchOper=bw&searchString=Bo
//! ```
//!
//! Unknown keys are ignored.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::filter::{Rule, RuleGroup};
use crate::grid::GridQuery;
use crate::op::Op;
use crate::ordering::Dir;

/// Opaque identifiers carried through from the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestContext {
    pub client_id: i64,
    pub request_id: i64,
}

/// Parses grid parameters with default settings.
///
/// # Example
///
/// ```
/// use gridquery::{parse_grid_query, Dir};
///
/// let query = parse_grid_query([
///     ("page", "2"),
///     ("sidx", "name"),
///     ("sord", "desc"),
/// ])
/// .unwrap();
/// assert_eq!(query.page, 2);
/// assert_eq!(query.sort_dir, Dir::Desc);
/// ```
pub fn parse_grid_query<I, K, V>(pairs: I) -> Result<GridQuery>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    parse_grid_query_with(pairs, &GridConfig::default())
}

/// Parses grid parameters.
///
/// Missing or non-positive `page` and `rows` become page 1 and
/// `config.default_page_size`. A non-empty `filters` payload wins over the
/// quick-search triple.
pub fn parse_grid_query_with<I, K, V>(pairs: I, config: &GridConfig) -> Result<GridQuery>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut params = Params::default();
    for (key, value) in pairs {
        params.set(key.as_ref(), value.as_ref());
    }

    let search = match params.search.as_deref() {
        None => false,
        Some(raw) => parse_bool("_search", raw)?,
    };
    let page = positive("page", params.page.as_deref())?.unwrap_or(1);
    let rows = positive("rows", params.rows.as_deref())?.unwrap_or(config.default_page_size);
    let sort_dir = params.sord.as_deref().map(Dir::parse).unwrap_or_default();
    let context = RequestContext {
        client_id: integer("client_id", params.client_id.as_deref())?,
        request_id: integer("request_id", params.request_id.as_deref())?,
    };

    let filter = match params.filters.as_deref().map(str::trim) {
        Some(json) if !json.is_empty() => Some(RuleGroup::from_json(json)?),
        _ => quick_search(&params)?,
    };

    debug!(
        search,
        page,
        rows,
        sidx = params.sidx.as_deref().unwrap_or_default(),
        sord = %sort_dir,
        has_filter = filter.is_some(),
        "parsed grid request"
    );

    Ok(GridQuery {
        search,
        filter,
        sort_field: params.sidx.unwrap_or_default(),
        sort_dir,
        page,
        rows,
        context,
    })
}

#[derive(Default)]
struct Params {
    search: Option<String>,
    page: Option<String>,
    rows: Option<String>,
    sidx: Option<String>,
    sord: Option<String>,
    filters: Option<String>,
    search_field: Option<String>,
    search_oper: Option<String>,
    search_string: Option<String>,
    client_id: Option<String>,
    request_id: Option<String>,
}

impl Params {
    fn set(&mut self, key: &str, value: &str) {
        let slot = match key {
            "_search" => &mut self.search,
            "page" => &mut self.page,
            "rows" => &mut self.rows,
            "sidx" => &mut self.sidx,
            "sord" => &mut self.sord,
            "filters" => &mut self.filters,
            "searchField" => &mut self.search_field,
            "searchOper" => &mut self.search_oper,
            "searchString" => &mut self.search_string,
            "client_id" => &mut self.client_id,
            "request_id" => &mut self.request_id,
            _ => return,
        };
        *slot = Some(value.to_string());
    }
}

/// Builds a one-rule AND group from the search-box parameters.
fn quick_search(params: &Params) -> Result<Option<RuleGroup>> {
    let field = params.search_field.as_deref().map(str::trim).unwrap_or_default();
    if field.is_empty() {
        return Ok(None);
    }
    let op = match params.search_oper.as_deref().map(str::trim) {
        None | Some("") => Op::Eq,
        Some(code) => code.parse()?,
    };
    let mut group = RuleGroup::and();
    group
        .rules
        .push(Rule::new(field, op, params.search_string.as_deref()));
    Ok(Some(group))
}

fn malformed(name: &'static str, value: &str) -> GridError {
    GridError::MalformedParameter {
        name,
        value: value.to_string(),
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool> {
    match raw.trim() {
        t if t.eq_ignore_ascii_case("true") => Ok(true),
        t if t.eq_ignore_ascii_case("false") || t.is_empty() => Ok(false),
        _ => Err(malformed(name, raw)),
    }
}

/// Parses a page number or size. Zero and negative values mean "use the
/// default" and yield `None`.
fn positive(name: &'static str, raw: Option<&str>) -> Result<Option<usize>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let text = raw.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let n: i64 = text.parse().map_err(|_| malformed(name, raw))?;
    if n <= 0 {
        return Ok(None);
    }
    usize::try_from(n).map(Some).map_err(|_| malformed(name, raw))
}

fn integer(name: &'static str, raw: Option<&str>) -> Result<i64> {
    match raw.map(str::trim) {
        None | Some("") => Ok(0),
        Some(text) => text.parse().map_err(|_| malformed(name, text)),
    }
}
