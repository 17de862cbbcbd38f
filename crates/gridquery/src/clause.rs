//! Compiled clauses: one resolved field, one operator, one coerced operand.

use crate::op::Op;
use crate::ordering::compare_values;
use crate::schema::{FieldAccessor, FieldKind};
use crate::traits::Gridable;
use crate::value::{Number, Timestamp, Value};

/// A single compiled filter predicate.
///
/// Built by the filter compiler from a wire rule; see
/// [`compile_filter`](crate::compile_filter).
#[derive(Debug, Clone)]
pub struct Clause {
    accessor: FieldAccessor,
    op: Op,
    value: ClauseValue,
    fallback: bool,
}

impl Clause {
    /// Creates a new clause.
    pub fn new(accessor: FieldAccessor, op: Op, value: impl Into<ClauseValue>) -> Self {
        Clause {
            accessor,
            op,
            value: value.into(),
            fallback: false,
        }
    }

    /// Marks the operand as a text fallback for a non-text field.
    pub(crate) fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn accessor(&self) -> &FieldAccessor {
        &self.accessor
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn value(&self) -> &ClauseValue {
        &self.value
    }

    /// Whether the operand could not be coerced to the field's type and the
    /// field is compared through its text form.
    ///
    /// Informational only. Evaluation follows the operand itself: a
    /// [`ClauseValue::String`] operand always takes the text path, so this
    /// flag never changes what [`matches`](Clause::matches) returns.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Reads the field from a record and evaluates the clause.
    pub fn evaluate(&self, record: &dyn Gridable) -> bool {
        self.matches(&self.accessor.read(record))
    }

    /// Evaluates this clause against a field value.
    pub fn matches(&self, field: &Value<'_>) -> bool {
        if let Some((positive, negated)) = self.op.positive() {
            return self.match_text(positive, field) != negated;
        }

        match self.op {
            Op::IsNull => field.is_none(),
            Op::IsNotNull => !field.is_none(),
            Op::In => self.match_list(field),
            Op::NotIn => !self.match_list(field),
            op => match_value(op, &self.value, field, self.accessor.kind()),
        }
    }

    fn match_text(&self, op: Op, field: &Value<'_>) -> bool {
        let ClauseValue::String(pattern) = &self.value else {
            return false;
        };
        let Some(text) = field.to_text(self.accessor.kind()) else {
            return false;
        };
        let text = text.to_lowercase();
        let pattern = pattern.to_lowercase();
        match op {
            Op::BeginsWith => text.starts_with(&pattern),
            Op::EndsWith => text.ends_with(&pattern),
            Op::Contains => text.contains(&pattern),
            _ => false,
        }
    }

    fn match_list(&self, field: &Value<'_>) -> bool {
        match &self.value {
            ClauseValue::List(items) => items
                .iter()
                .any(|item| match_value(Op::Eq, item, field, self.accessor.kind())),
            _ => false,
        }
    }
}

/// Equality and ordering against one operand.
///
/// Text operands compare the field's text form: `eq` ignores case, the
/// rest are ordinal. An absent field satisfies only `ne` against a
/// non-null operand.
fn match_value(op: Op, value: &ClauseValue, field: &Value<'_>, kind: &FieldKind) -> bool {
    match value {
        ClauseValue::Null => match op {
            Op::Eq => field.is_none(),
            Op::Ne => !field.is_none(),
            _ => false,
        },
        ClauseValue::String(operand) => {
            let Some(text) = field.to_text(kind) else {
                return op == Op::Ne;
            };
            match op {
                Op::Eq => text.to_lowercase() == operand.to_lowercase(),
                Op::Ne => text != operand.as_str(),
                _ => op.eval_ordering(text[..].cmp(operand.as_str())),
            }
        }
        ClauseValue::List(_) => false,
        native => {
            if field.is_none() {
                return op == Op::Ne;
            }
            match native.as_value().and_then(|v| compare_values(field, &v)) {
                Some(ordering) => op.eval_ordering(ordering),
                // Unordered (NaN, mismatched types): only inequality holds.
                None => op == Op::Ne,
            }
        }
    }
}

/// Owned, coerced operand stored in a clause.
#[derive(Debug, Clone, PartialEq)]
pub enum ClauseValue {
    /// No operand (`data: null`).
    Null,
    /// Text operand: a string field, or a coercion fallback.
    String(String),
    /// Numeric value.
    Number(Number),
    /// Timestamp value.
    Timestamp(Timestamp),
    /// Enum discriminant.
    Enum(u32),
    /// Boolean value.
    Bool(bool),
    /// Operand list for `in` / `ni`.
    List(Vec<ClauseValue>),
}

impl ClauseValue {
    /// Borrows a native operand as a [`Value`] for comparison with field
    /// values. `Null`, `List` and text have no native form.
    pub fn as_value(&self) -> Option<Value<'_>> {
        match self {
            ClauseValue::Number(n) => Some(Value::Number(*n)),
            ClauseValue::Timestamp(t) => Some(Value::Timestamp(*t)),
            ClauseValue::Enum(d) => Some(Value::Enum(*d)),
            ClauseValue::Bool(b) => Some(Value::Bool(*b)),
            ClauseValue::Null | ClauseValue::String(_) | ClauseValue::List(_) => None,
        }
    }

    /// Returns `true` for text operands.
    pub fn is_text(&self) -> bool {
        matches!(self, ClauseValue::String(_))
    }
}

impl From<String> for ClauseValue {
    fn from(s: String) -> Self {
        ClauseValue::String(s)
    }
}

impl From<&str> for ClauseValue {
    fn from(s: &str) -> Self {
        ClauseValue::String(s.to_string())
    }
}

impl From<Number> for ClauseValue {
    fn from(n: Number) -> Self {
        ClauseValue::Number(n)
    }
}

impl From<Timestamp> for ClauseValue {
    fn from(t: Timestamp) -> Self {
        ClauseValue::Timestamp(t)
    }
}

impl From<bool> for ClauseValue {
    fn from(b: bool) -> Self {
        ClauseValue::Bool(b)
    }
}

impl From<Vec<ClauseValue>> for ClauseValue {
    fn from(items: Vec<ClauseValue>) -> Self {
        ClauseValue::List(items)
    }
}
