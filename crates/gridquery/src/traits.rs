//! Traits a record type implements to be queried.
//!
//! [`Gridable`] is the capability interface the compilers resolve paths
//! against. It is usually generated by `#[derive(Gridable)]` from the
//! `gridquery-macros` crate; the helper traits below cover field types the
//! derive cannot handle on its own.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};

use crate::schema::{EnumVariant, Schema};
use crate::value::{Number, NumberKind, Timestamp, Value};

/// Trait for record types that can be filtered, sorted and paged.
///
/// # Derive Usage
///
/// ```ignore
/// use gridquery::Gridable;
///
/// #[derive(Gridable)]
/// #[grid(identity = "id")]
/// struct Customer {
///     #[grid(Number)]
///     id: i64,
///     #[grid(String)]
///     name: String,
/// }
/// ```
///
/// # Manual Implementation
///
/// ```
/// use gridquery::{FieldDef, FieldKind, Gridable, Number, NumberKind, Schema, Value};
///
/// struct Customer {
///     id: i64,
///     name: String,
/// }
///
/// static CUSTOMER: Schema = Schema::new(
///     "Customer",
///     Some("id"),
///     &[
///         FieldDef::new("id", FieldKind::Number(NumberKind::Signed)),
///         FieldDef::new("name", FieldKind::String),
///     ],
/// );
///
/// impl Gridable for Customer {
///     fn grid_schema() -> &'static Schema {
///         &CUSTOMER
///     }
///
///     fn grid_field(&self, field: &str) -> Value<'_> {
///         match field {
///             "id" => Value::Number(Number::I64(self.id)),
///             "name" => Value::String(&self.name),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Gridable {
    /// Returns the schema descriptor for this record type.
    ///
    /// The descriptor is built once per type and shared by every query.
    fn grid_schema() -> &'static Schema
    where
        Self: Sized;

    /// Returns the value of a field, or [`Value::None`] when the field is
    /// unknown or currently absent.
    ///
    /// Reference fields return [`Value::Record`].
    fn grid_field(&self, field: &str) -> Value<'_>;
}

/// Helper trait for enum fields.
///
/// `VARIANTS` lists the names operand text may use; matching is
/// case-insensitive. Discriminants should be stable values rather than
/// declaration order.
///
/// # Example
///
/// ```
/// use gridquery::{EnumVariant, GridEnum};
///
/// enum Status {
///     Pending,
///     Active,
/// }
///
/// impl GridEnum for Status {
///     const VARIANTS: &'static [EnumVariant] =
///         &[EnumVariant::new("Pending", 0), EnumVariant::new("Active", 1)];
///
///     fn discriminant(&self) -> u32 {
///         match self {
///             Status::Pending => 0,
///             Status::Active => 1,
///         }
///     }
/// }
/// ```
pub trait GridEnum {
    /// Named variants and their discriminants.
    const VARIANTS: &'static [EnumVariant];

    /// Returns the discriminant value for this variant.
    fn discriminant(&self) -> u32;
}

/// Helper trait for converting date/time types to timestamps.
pub trait GridTimestamp {
    /// Converts this value to a [`Timestamp`] for comparison.
    fn grid_timestamp(&self) -> Timestamp;
}

impl GridTimestamp for i64 {
    fn grid_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl GridTimestamp for u64 {
    fn grid_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

impl<Tz: TimeZone> GridTimestamp for DateTime<Tz> {
    fn grid_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(self.timestamp_millis())
    }
}

impl GridTimestamp for NaiveDateTime {
    fn grid_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(self.and_utc().timestamp_millis())
    }
}

impl GridTimestamp for NaiveDate {
    fn grid_timestamp(&self) -> Timestamp {
        match self.and_hms_opt(0, 0, 0) {
            Some(midnight) => midnight.grid_timestamp(),
            None => Timestamp::from_millis(0),
        }
    }
}

/// Helper trait for numeric fields: how operand text is parsed for the
/// field, and how the field is widened to a [`Number`].
pub trait GridNumber: Copy {
    /// The parse kind used for operand text.
    const KIND: NumberKind;

    /// Widens the value to a [`Number`].
    fn to_number(self) -> Number;
}

macro_rules! grid_number {
    ($kind:ident; $($t:ty),*) => {
        $(
            impl GridNumber for $t {
                const KIND: NumberKind = NumberKind::$kind;

                fn to_number(self) -> Number {
                    Number::from(self)
                }
            }
        )*
    };
}

grid_number!(Signed; i8, i16, i32, i64, isize);
grid_number!(Unsigned; u8, u16, u32, u64, usize);
grid_number!(Float; f32, f64);
