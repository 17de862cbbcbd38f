//! Schema descriptors and dotted-path resolution.
//!
//! A [`Schema`] is a static table of named, typed fields for one record
//! type. [`Schema::resolve`] walks a [`FieldPath`] through it, following
//! reference fields into their own schemas, and produces a
//! [`FieldAccessor`] that reads the leaf value from any record of that
//! type.
//!
//! A path that ends on a reference field is collapsed to the referenced
//! record's identity field: filtering or sorting on `customer` means
//! filtering or sorting on `customer.id`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{GridError, Result};
use crate::traits::Gridable;
use crate::value::{NumberKind, Value};

static SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("segment pattern is valid")
});

/// A dotted field path such as `customer.region.code`.
///
/// Always holds at least one segment, and every segment is an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a dotted path.
    ///
    /// Returns [`GridError::InvalidFieldPath`] for an empty string, an empty
    /// segment (`a..b`, `.a`) or a segment that is not an identifier.
    pub fn parse(text: &str) -> Result<FieldPath> {
        let text = text.trim();
        let segments: Vec<String> = text.split('.').map(str::to_string).collect();
        if text.is_empty() || !segments.iter().all(|s| SEGMENT.is_match(s)) {
            return Err(GridError::InvalidFieldPath(text.to_string()));
        }
        Ok(FieldPath { segments })
    }

    /// Returns the path segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`; a path has at least one segment.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// A named enum variant, used to coerce operand text and render values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: &'static str,
    pub discriminant: u32,
}

impl EnumVariant {
    pub const fn new(name: &'static str, discriminant: u32) -> Self {
        EnumVariant { name, discriminant }
    }

    /// Looks up a discriminant by variant name, ignoring case.
    pub fn lookup(variants: &[EnumVariant], name: &str) -> Option<u32> {
        variants
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
            .map(|v| v.discriminant)
    }

    /// Looks up the variant name for a discriminant.
    pub fn name_of(variants: &[EnumVariant], discriminant: u32) -> Option<&'static str> {
        variants
            .iter()
            .find(|v| v.discriminant == discriminant)
            .map(|v| v.name)
    }
}

/// The declared type of a field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Text.
    String,
    /// Integer or float, with the parse kind for operand text.
    Number(NumberKind),
    /// Boolean.
    Bool,
    /// Point in time.
    Timestamp,
    /// Enum with named variants.
    Enum(&'static [EnumVariant]),
    /// A nested record with its own identity.
    Reference(fn() -> &'static Schema),
}

impl FieldKind {
    /// Short type name for messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number(_) => "number",
            FieldKind::Bool => "bool",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Enum(_) => "enum",
            FieldKind::Reference(_) => "reference",
        }
    }

    /// Returns `true` for reference fields.
    pub fn is_reference(&self) -> bool {
        matches!(self, FieldKind::Reference(_))
    }
}

/// One field of a schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    /// The field may be absent on a record (an `Option` in Rust terms).
    pub nullable: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldDef {
            name,
            kind,
            nullable: false,
        }
    }

    /// Marks the field as possibly absent.
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// The field table of one record type.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    /// Name of the field that identifies a record of this type, used when
    /// another record refers to it.
    pub identity: Option<&'static str>,
    pub fields: &'static [FieldDef],
}

impl Schema {
    pub const fn new(
        name: &'static str,
        identity: Option<&'static str>,
        fields: &'static [FieldDef],
    ) -> Self {
        Schema {
            name,
            identity,
            fields,
        }
    }

    /// Looks up a field by name. An exact match wins; otherwise the first
    /// field whose name matches ignoring ASCII case is returned.
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        let fields: &'static [FieldDef] = self.fields;
        fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| fields.iter().find(|f| f.name.eq_ignore_ascii_case(name)))
    }

    /// Resolves a path against this schema.
    ///
    /// Every segment but the last must name a reference field. A final
    /// reference field is collapsed to the referenced schema's identity.
    pub fn resolve(&self, path: &FieldPath) -> Result<FieldAccessor> {
        let mut current: &Schema = self;
        let mut steps = Vec::with_capacity(path.len() + 1);
        let mut leaf: Option<&'static FieldDef> = None;

        for segment in path.segments() {
            let not_found = |schema: &'static str| GridError::FieldNotFound {
                schema,
                segment: segment.clone(),
                path: path.to_string(),
            };
            // Nothing can follow a scalar.
            if let Some(scalar) = leaf {
                return Err(not_found(scalar.kind.name()));
            }

            let def = current.field(segment).ok_or_else(|| not_found(current.name))?;
            steps.push(def.name);
            match def.kind {
                FieldKind::Reference(target) => current = target(),
                _ => leaf = Some(def),
            }
        }

        let collapsed = leaf.is_none();
        let leaf = match leaf {
            Some(def) => def,
            None => {
                let identity = current
                    .identity
                    .and_then(|name| current.field(name))
                    .filter(|def| !def.kind.is_reference())
                    .ok_or(GridError::MissingIdentity {
                        schema: current.name,
                    })?;
                steps.push(identity.name);
                identity
            }
        };

        Ok(FieldAccessor {
            path: path.clone(),
            steps,
            kind: leaf.kind,
            nullable: leaf.nullable,
            collapsed,
        })
    }
}

/// Resolves a dotted path against a record type's schema.
pub fn resolve<T: Gridable>(path: &str) -> Result<FieldAccessor> {
    T::grid_schema().resolve(&FieldPath::parse(path)?)
}

/// A resolved read path into a record.
#[derive(Debug, Clone)]
pub struct FieldAccessor {
    path: FieldPath,
    steps: Vec<&'static str>,
    kind: FieldKind,
    nullable: bool,
    collapsed: bool,
}

impl FieldAccessor {
    /// The path as requested.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// The resolved field names, including the implicit identity step of a
    /// collapsed reference.
    pub fn steps(&self) -> &[&'static str] {
        &self.steps
    }

    /// The declared kind of the leaf value.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether the leaf field itself is declared nullable.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether the path ended on a reference and now reads its identity.
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Reads the leaf value from a record.
    ///
    /// An absent record anywhere along the path yields [`Value::None`].
    pub fn read<'a>(&self, record: &'a dyn Gridable) -> Value<'a> {
        let Some((last, init)) = self.steps.split_last() else {
            return Value::None;
        };
        let mut current = record;
        for step in init {
            match current.grid_field(step) {
                Value::Record(next) => current = next,
                _ => return Value::None,
            }
        }
        current.grid_field(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    struct Region {
        code: String,
    }

    struct Customer {
        id: i64,
        region: Option<Region>,
    }

    struct Order {
        id: i64,
        customer: Customer,
    }

    static REGION: Schema = Schema::new(
        "Region",
        Some("code"),
        &[FieldDef::new("code", FieldKind::String)],
    );

    static CUSTOMER: Schema = Schema::new(
        "Customer",
        Some("id"),
        &[
            FieldDef::new("id", FieldKind::Number(NumberKind::Signed)),
            FieldDef::new("region", FieldKind::Reference(Region::grid_schema)).nullable(),
        ],
    );

    static ORDER: Schema = Schema::new(
        "Order",
        Some("id"),
        &[
            FieldDef::new("id", FieldKind::Number(NumberKind::Signed)),
            FieldDef::new("customer", FieldKind::Reference(Customer::grid_schema)),
        ],
    );

    impl Gridable for Region {
        fn grid_schema() -> &'static Schema {
            &REGION
        }
        fn grid_field(&self, field: &str) -> Value<'_> {
            match field {
                "code" => Value::String(&self.code),
                _ => Value::None,
            }
        }
    }

    impl Gridable for Customer {
        fn grid_schema() -> &'static Schema {
            &CUSTOMER
        }
        fn grid_field(&self, field: &str) -> Value<'_> {
            match field {
                "id" => Value::Number(Number::I64(self.id)),
                "region" => match &self.region {
                    Some(region) => Value::Record(region),
                    None => Value::None,
                },
                _ => Value::None,
            }
        }
    }

    impl Gridable for Order {
        fn grid_schema() -> &'static Schema {
            &ORDER
        }
        fn grid_field(&self, field: &str) -> Value<'_> {
            match field {
                "id" => Value::Number(Number::I64(self.id)),
                "customer" => Value::Record(&self.customer),
                _ => Value::None,
            }
        }
    }

    fn order(region: Option<&str>) -> Order {
        Order {
            id: 1,
            customer: Customer {
                id: 7,
                region: region.map(|code| Region { code: code.into() }),
            },
        }
    }

    #[test]
    fn path_parsing() {
        let path = FieldPath::parse("customer.region").unwrap();
        assert_eq!(path.segments(), ["customer", "region"]);
        assert_eq!(path.to_string(), "customer.region");

        assert!(FieldPath::parse("").is_err());
        assert!(FieldPath::parse("a..b").is_err());
        assert!(FieldPath::parse(".a").is_err());
        assert!(FieldPath::parse("a b").is_err());
        assert!(FieldPath::parse("1st").is_err());
    }

    #[test]
    fn resolves_scalar() {
        let accessor = resolve::<Order>("id").unwrap();
        assert_eq!(accessor.steps(), ["id"]);
        assert!(!accessor.is_collapsed());
        assert_eq!(accessor.read(&order(None)), Value::Number(Number::I64(1)));
    }

    #[test]
    fn reference_leaf_collapses_to_identity() {
        let accessor = resolve::<Order>("customer").unwrap();
        assert_eq!(accessor.steps(), ["customer", "id"]);
        assert!(accessor.is_collapsed());
        assert_eq!(accessor.read(&order(None)), Value::Number(Number::I64(7)));
    }

    #[test]
    fn nested_reference_collapses_to_its_own_identity() {
        let accessor = resolve::<Order>("customer.region").unwrap();
        assert_eq!(accessor.steps(), ["customer", "region", "code"]);
        assert!(accessor.is_collapsed());
        assert_eq!(accessor.read(&order(Some("EU"))), Value::String("EU"));
    }

    #[test]
    fn nested_scalar_through_reference() {
        let accessor = resolve::<Order>("customer.region.code").unwrap();
        assert!(!accessor.is_collapsed());
        assert_eq!(accessor.read(&order(Some("NA"))), Value::String("NA"));
    }

    #[test]
    fn absent_intermediate_reads_none() {
        let accessor = resolve::<Order>("customer.region.code").unwrap();
        assert_eq!(accessor.read(&order(None)), Value::None);
    }

    #[test]
    fn lookup_falls_back_to_case_insensitive() {
        let accessor = resolve::<Order>("Customer.ID").unwrap();
        assert_eq!(accessor.steps(), ["customer", "id"]);
    }

    #[test]
    fn unknown_segment_is_field_not_found() {
        match resolve::<Order>("customer.email") {
            Err(GridError::FieldNotFound { schema, segment, .. }) => {
                assert_eq!(schema, "Customer");
                assert_eq!(segment, "email");
            }
            other => panic!("unexpected: {:?}", other.map(|a| a.steps().to_vec())),
        }
    }

    #[test]
    fn walking_past_scalar_is_field_not_found() {
        match resolve::<Order>("id.value") {
            Err(GridError::FieldNotFound { schema, segment, .. }) => {
                assert_eq!(schema, "number");
                assert_eq!(segment, "value");
            }
            other => panic!("unexpected: {:?}", other.map(|a| a.steps().to_vec())),
        }
    }

    #[test]
    fn reference_without_identity_is_rejected() {
        static ANON: Schema = Schema::new("Anon", None, &[]);
        static HOLDER: Schema = Schema::new(
            "Holder",
            None,
            &[FieldDef::new("anon", FieldKind::Reference(anon_schema))],
        );
        fn anon_schema() -> &'static Schema {
            &ANON
        }

        match HOLDER.resolve(&FieldPath::parse("anon").unwrap()) {
            Err(GridError::MissingIdentity { schema }) => assert_eq!(schema, "Anon"),
            other => panic!("unexpected: {:?}", other.map(|a| a.steps().to_vec())),
        }
    }
}
