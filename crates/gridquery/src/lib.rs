//! Gridquery - server-side filtering, sorting and paging for data grids.
//!
//! Gridquery turns the query a data-grid widget sends (a rule-tree filter,
//! one sort column and a page window) into a compiled query over an
//! in-memory collection of typed records, and returns one page plus the
//! paging metadata the grid needs. It supports:
//!
//! - Field paths through nested records (`customer.region.name`)
//! - Reference fields that collapse to the referenced record's identity
//! - Operand text coerced to the field's native type, with a text fallback
//! - AND/OR rule groups, nested groups and the jqGrid operator codes
//! - One-based paging with defaults for missing parameters
//!
//! # Quick Start
//!
//! ```rust
//! use gridquery::{
//!     parse_grid_query, FieldDef, FieldKind, Gridable, Number, NumberKind, Schema, Value,
//! };
//!
//! struct Task {
//!     id: i64,
//!     name: &'static str,
//! }
//!
//! static TASK: Schema = Schema::new(
//!     "Task",
//!     Some("id"),
//!     &[
//!         FieldDef::new("id", FieldKind::Number(NumberKind::Signed)),
//!         FieldDef::new("name", FieldKind::String),
//!     ],
//! );
//!
//! impl Gridable for Task {
//!     fn grid_schema() -> &'static Schema {
//!         &TASK
//!     }
//!     fn grid_field(&self, field: &str) -> Value<'_> {
//!         match field {
//!             "id" => Value::Number(Number::I64(self.id)),
//!             "name" => Value::String(self.name),
//!             _ => Value::None,
//!         }
//!     }
//! }
//!
//! let tasks = vec![
//!     Task { id: 1, name: "Write docs" },
//!     Task { id: 2, name: "Fix bug" },
//!     Task { id: 3, name: "Fix docs" },
//! ];
//!
//! let query = parse_grid_query([
//!     ("_search", "true"),
//!     ("searchField", "name"),
//!     ("searchOper", "bw"),
//!     ("searchString", "fix"),
//!     ("sidx", "name"),
//!     ("sord", "desc"),
//! ])
//! .unwrap();
//!
//! let page = gridquery::run(&tasks, &query).unwrap();
//! assert_eq!(page.total_records, 2);
//! assert_eq!(page.rows[0].name, "Fix docs");
//! ```
//!
//! # Operators
//!
//! | Code | Meaning | Code | Meaning |
//! |------|---------|------|---------|
//! | `eq` | equal (text: ignores case) | `ne` | not equal |
//! | `lt` `le` `gt` `ge` | ordering | `nu` `nn` | is / is not null |
//! | `bw` `bn` | begins / does not begin with | `ew` `en` | ends / does not end with |
//! | `cn` `nc` | contains / does not contain | `in` `ni` | in / not in a comma list |
//!
//! # Reference Fields
//!
//! A path that ends on a reference compares the referenced record's
//! identity: `customer eq 42` means `customer.id eq 42`. A reference rule
//! whose operand is the configured sentinel (`-1` by default) means "no
//! selection" and is ignored.

mod clause;
mod coerce;
mod config;
mod error;
mod filter;
mod grid;
mod op;
mod ordering;
mod request;
mod schema;
mod traits;
mod value;

// Re-export public API
pub use clause::{Clause, ClauseValue};
pub use coerce::{coerce, coerce_list, Coerced};
pub use config::GridConfig;
pub use error::{GridError, Result};
pub use filter::{compile_filter, Filter, GroupOp, Rule, RuleGroup};
pub use grid::{run, CompiledGrid, GridQuery, GridResult};
pub use op::Op;
pub use ordering::{compare_values, Dir, OrderBy};
pub use request::{parse_grid_query, parse_grid_query_with, RequestContext};
pub use schema::{resolve, EnumVariant, FieldAccessor, FieldDef, FieldKind, FieldPath, Schema};
pub use traits::{GridEnum, GridNumber, GridTimestamp, Gridable};
pub use value::{Number, NumberKind, Timestamp, Value};

#[cfg(feature = "derive")]
pub use gridquery_macros::Gridable;
