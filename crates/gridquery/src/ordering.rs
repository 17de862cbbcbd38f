//! Sort direction and the single-key sort compiler.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GridConfig;
use crate::error::Result;
use crate::schema::{FieldAccessor, FieldPath, Schema};
use crate::traits::Gridable;
use crate::value::{Number, Value};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Reads a direction from request text.
    ///
    /// Only `desc` (any case) selects descending order; anything else,
    /// including unrecognized text, is ascending.
    pub fn parse(text: &str) -> Dir {
        if text.trim().eq_ignore_ascii_case("desc") {
            Dir::Desc
        } else {
            Dir::Asc
        }
    }

    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the wire name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A compiled sort key: a resolved field and a direction.
#[derive(Debug, Clone)]
pub struct OrderBy {
    accessor: FieldAccessor,
    dir: Dir,
}

impl OrderBy {
    pub fn new(accessor: FieldAccessor, dir: Dir) -> Self {
        OrderBy { accessor, dir }
    }

    /// Resolves a sort path against a schema.
    ///
    /// An empty `field` sorts by `config.default_sort_field`. A path that
    /// ends on a reference sorts by the referenced record's identity.
    pub fn compile(schema: &Schema, field: &str, dir: Dir, config: &GridConfig) -> Result<OrderBy> {
        let field = match field.trim() {
            "" => config.default_sort_field.as_str(),
            field => field,
        };
        let accessor = schema.resolve(&FieldPath::parse(field)?)?;
        debug!(schema = schema.name, field, dir = %dir, "compiled sort key");
        Ok(OrderBy::new(accessor, dir))
    }

    pub fn accessor(&self) -> &FieldAccessor {
        &self.accessor
    }

    pub fn dir(&self) -> Dir {
        self.dir
    }

    /// Compares two records by this key.
    ///
    /// This is a total order: NaN sorts with absent values, and values of
    /// different types order by type.
    pub fn compare(&self, a: &dyn Gridable, b: &dyn Gridable) -> Ordering {
        let a = self.accessor.read(a);
        let b = self.accessor.read(b);
        self.dir.apply(sort_order(&a, &b))
    }

    /// Stable-sorts records by this key.
    pub fn sort<T: Gridable>(&self, items: &mut [&T]) {
        items.sort_by(|a, b| self.compare(*a, *b));
    }
}

/// Compares two values of the same type.
///
/// Absent values sort after present ones. Returns `None` if the types
/// don't match or comparison is not possible (NaN).
pub fn compare_values<'a>(a: &Value<'a>, b: &Value<'a>) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.compare(*b),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),

        (Value::None, Value::None) => Some(Ordering::Equal),
        (Value::None, _) => Some(Ordering::Greater),
        (_, Value::None) => Some(Ordering::Less),

        _ => None,
    }
}

/// Total order over sort keys, built on [`compare_values`].
fn sort_order(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    let a = sort_key(a);
    let b = sort_key(b);
    compare_values(&a, &b).unwrap_or_else(|| type_rank(&a).cmp(&type_rank(&b)))
}

fn sort_key<'a>(value: &Value<'a>) -> Value<'a> {
    match value {
        Value::Number(Number::F64(n)) if n.is_nan() => Value::None,
        other => *other,
    }
}

fn type_rank(value: &Value<'_>) -> u8 {
    match value {
        Value::String(_) => 0,
        Value::Number(_) => 1,
        Value::Timestamp(_) => 2,
        Value::Enum(_) => 3,
        Value::Bool(_) => 4,
        Value::Record(_) => 5,
        Value::None => 6,
    }
}
