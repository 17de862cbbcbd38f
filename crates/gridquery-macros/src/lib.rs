//! Proc macros for gridquery.
//!
//! - [`Gridable`] - Generate a schema descriptor and field accessor from
//!   struct field annotations

mod grid;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Gridable` trait for record structs.
///
/// Only annotated fields become part of the schema; everything else is
/// invisible to filters and sorting.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `String` | Text field; the type must implement `AsRef<str>` |
/// | `Number` | Numeric field; the type must implement `GridNumber` |
/// | `Timestamp` | Date/time field; the type must implement `GridTimestamp` |
/// | `Enum` | Enum field; the type must implement `GridEnum` |
/// | `Bool` | Boolean field |
/// | `Reference` | Nested record; the type must implement `Gridable` |
/// | `skip` | Exclude this field |
/// | `rename = "..."` | Use a custom name in filter paths |
/// | `ty = "..."` | Give the type as a string (for keywords such as `enum`) |
///
/// A field typed `Option<T>` is declared nullable and reads as absent when
/// it is `None`.
///
/// # Struct Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `identity = "..."` | Field compared when another record refers to this one |
///
/// # Generated Code
///
/// 1. Field name constants (e.g., `Order::CUSTOMER`)
/// 2. `Gridable::grid_schema()` returning a static `Schema`
/// 3. `Gridable::grid_field()`
///
/// # Example
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
///
/// #[derive(Gridable)]
/// #[grid(identity = "id")]
/// struct Order {
///     #[grid(Number)]
///     id: i64,
///     #[grid(Reference)]
///     customer: Option<Customer>,
///     #[grid(skip)]
///     notes: String,
/// }
///
/// // "customer" filters by the customer's id, "customer.name" by its name.
/// assert_eq!(Order::CUSTOMER, "customer");
/// ```
#[proc_macro_derive(Gridable, attributes(grid))]
pub fn gridable_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    grid::gridable_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
