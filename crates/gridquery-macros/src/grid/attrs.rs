//! Attribute parsing for the Gridable derive macro.
//!
//! Two forms share the `grid` attribute name:
//!
//! - on the struct, `#[grid(identity = "id")]` names the identity field;
//! - on a field, `#[grid(Number)]`, `#[grid(Reference, rename = "owner")]`
//!   and friends declare the field's kind.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Ident, Lit, LitStr, Meta, Result, Token,
};

/// The declared kind of a grid field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridType {
    String,
    Number,
    Timestamp,
    Enum,
    Bool,
    /// Nested record implementing `Gridable`.
    Reference,
}

const EXPECTED: &str = "String, Number, Timestamp, Enum, Bool, Reference";

impl GridType {
    pub fn from_ident(ident: &Ident) -> Result<Self> {
        Self::from_name(&ident.to_string(), ident.span())
    }

    pub fn from_name(name: &str, span: Span) -> Result<Self> {
        match name {
            "String" | "string" => Ok(GridType::String),
            "Number" | "number" => Ok(GridType::Number),
            "Timestamp" | "timestamp" => Ok(GridType::Timestamp),
            "Enum" | "enum" | "enumeration" => Ok(GridType::Enum),
            "Bool" | "bool" | "boolean" => Ok(GridType::Bool),
            "Reference" | "reference" | "Ref" => Ok(GridType::Reference),
            other => Err(Error::new(
                span,
                format!("unknown grid type: '{}'. Expected one of: {}", other, EXPECTED),
            )),
        }
    }
}

/// Field-level `#[grid(...)]`.
#[derive(Debug, Clone)]
pub struct FieldAttr {
    pub grid_type: Option<GridType>,
    pub skip: bool,
    /// Name used in filter paths (default: the Rust field name).
    pub rename: Option<String>,
    pub span: Span,
}

impl Default for FieldAttr {
    fn default() -> Self {
        FieldAttr {
            grid_type: None,
            skip: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

fn string_value(expr: &Expr, what: &str) -> Result<LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.clone()),
        other => Err(Error::new(
            other.span(),
            format!("{} must be a string literal", what),
        )),
    }
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) => {
                    if p.is_ident("skip") {
                        attr.skip = true;
                    } else if let Some(ident) = p.get_ident() {
                        attr.grid_type = Some(GridType::from_ident(ident)?);
                        attr.span = ident.span();
                    } else {
                        return Err(Error::new(
                            p.span(),
                            format!("expected grid type: {}, or skip", EXPECTED),
                        ));
                    }
                }

                Meta::NameValue(nv) => {
                    if nv.path.is_ident("rename") {
                        attr.rename = Some(string_value(&nv.value, "rename")?.value());
                    } else if nv.path.is_ident("ty") {
                        let lit = string_value(&nv.value, "ty")?;
                        attr.grid_type = Some(GridType::from_name(&lit.value(), lit.span())?);
                        attr.span = lit.span();
                    } else {
                        return Err(Error::new(
                            nv.path.span(),
                            "unknown attribute. Expected: rename or ty",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown grid attribute. Expected a grid type, skip, rename = \"...\", or ty = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Struct-level `#[grid(...)]`.
#[derive(Debug, Clone, Default)]
pub struct StructAttr {
    /// Field compared when another record refers to this one.
    pub identity: Option<String>,
}

impl Parse for StructAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = StructAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::NameValue(nv) if nv.path.is_ident("identity") => {
                    attr.identity = Some(string_value(&nv.value, "identity")?.value());
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown struct attribute. Expected: identity = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    for attr in attrs {
        if attr.path().is_ident("grid") {
            return attr.parse_args::<FieldAttr>();
        }
    }
    Ok(FieldAttr::default())
}

pub fn parse_struct_attrs(attrs: &[Attribute]) -> Result<StructAttr> {
    for attr in attrs {
        if attr.path().is_ident("grid") {
            return attr.parse_args::<StructAttr>();
        }
    }
    Ok(StructAttr::default())
}
