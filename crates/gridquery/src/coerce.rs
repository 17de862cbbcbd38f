//! Operand coercion.
//!
//! Rule operands always arrive as text. [`coerce`] converts that text into
//! the native type of the resolved field. When the text does not parse as
//! that type the operand stays text and the field is compared through its
//! text rendering instead; this is reported through [`Coerced::fallback`]
//! and is never an error.

use crate::clause::ClauseValue;
use crate::schema::{EnumVariant, FieldKind};
use crate::value::{Number, Timestamp};

/// The result of coercing one operand.
#[derive(Debug, Clone)]
pub struct Coerced {
    pub value: ClauseValue,
    /// The text did not parse as the field's type and was kept as text.
    pub fallback: bool,
}

impl Coerced {
    fn native(value: ClauseValue) -> Self {
        Coerced {
            value,
            fallback: false,
        }
    }

    fn text(raw: &str) -> Self {
        Coerced {
            value: ClauseValue::String(raw.to_string()),
            fallback: true,
        }
    }
}

/// Converts operand text into the native type of `kind`.
///
/// `None` becomes [`ClauseValue::Null`]. String fields take the text as is.
///
/// # Example
///
/// ```
/// use gridquery::{coerce, ClauseValue, FieldKind, Number, NumberKind};
///
/// let kind = FieldKind::Number(NumberKind::Signed);
/// let coerced = coerce(Some("42"), &kind);
/// assert!(matches!(coerced.value, ClauseValue::Number(Number::I64(42))));
///
/// let coerced = coerce(Some("forty-two"), &kind);
/// assert!(coerced.fallback);
/// ```
pub fn coerce(raw: Option<&str>, kind: &FieldKind) -> Coerced {
    let Some(raw) = raw else {
        return Coerced::native(ClauseValue::Null);
    };

    let native = match kind {
        FieldKind::String => Some(ClauseValue::String(raw.to_string())),
        FieldKind::Number(number_kind) => {
            Number::parse(raw, *number_kind).map(ClauseValue::Number)
        }
        FieldKind::Bool => parse_bool(raw).map(ClauseValue::Bool),
        FieldKind::Timestamp => Timestamp::parse(raw).map(ClauseValue::Timestamp),
        FieldKind::Enum(variants) => parse_enum(raw, variants).map(ClauseValue::Enum),
        // Accessors collapse references before coercion; nothing to parse into.
        FieldKind::Reference(_) => None,
    };

    match native {
        Some(value) => Coerced::native(value),
        None => Coerced::text(raw),
    }
}

/// Coerces a comma-separated operand list for `in` / `ni`.
///
/// Each element is trimmed and coerced on its own. If any element falls
/// back to text the whole list is kept as text, so every member compares
/// the same way.
pub fn coerce_list(raw: Option<&str>, kind: &FieldKind) -> Coerced {
    let Some(raw) = raw else {
        return Coerced::native(ClauseValue::List(Vec::new()));
    };

    let items: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect();
    let coerced: Vec<Coerced> = items.iter().map(|item| coerce(Some(item), kind)).collect();

    if coerced.iter().any(|c| c.fallback) {
        let text = items
            .iter()
            .map(|item| ClauseValue::String(item.to_string()))
            .collect();
        return Coerced {
            value: ClauseValue::List(text),
            fallback: true,
        };
    }

    Coerced::native(ClauseValue::List(
        coerced.into_iter().map(|c| c.value).collect(),
    ))
}

fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_enum(raw: &str, variants: &[EnumVariant]) -> Option<u32> {
    let raw = raw.trim();
    EnumVariant::lookup(variants, raw).or_else(|| {
        raw.parse::<u32>()
            .ok()
            .filter(|d| EnumVariant::name_of(variants, *d).is_some())
    })
}
