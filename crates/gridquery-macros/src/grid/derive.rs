//! Implementation of the `#[derive(Gridable)]` macro.
//!
//! For every annotated field the macro emits one `FieldDef` in a static
//! schema, one arm in `grid_field` and one name constant. `Option<T>`
//! fields are declared nullable and read as `Value::None` when empty.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    spanned::Spanned, Data, DeriveInput, Error, Fields, GenericArgument, PathArguments, Result,
    Type,
};

use super::attrs::{parse_field_attrs, parse_struct_attrs, GridType};

/// Main implementation of the Gridable derive macro.
pub fn gridable_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Gridable cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Gridable can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Gridable can only be derived for structs",
            ))
        }
    };

    let struct_attrs = parse_struct_attrs(&input.attrs)?;

    let mut field_defs: Vec<TokenStream> = Vec::new();
    let mut field_matches: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut names: Vec<String> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let grid_type = match attrs.grid_type {
            Some(t) => t,
            None => continue,
        };

        let query_name = attrs.rename.unwrap_or_else(|| field_name.to_string());
        if names.contains(&query_name) {
            return Err(Error::new(
                attrs.span,
                format!("duplicate grid field name '{}'", query_name),
            ));
        }
        names.push(query_name.clone());

        let (inner, nullable) = match option_inner(&field.ty) {
            Some(inner) => (inner, true),
            None => (&field.ty, false),
        };

        let const_name = format_ident!("{}", to_screaming_snake_case(&query_name));
        field_constants.push(quote! {
            /// Field name constant for building rules.
            pub const #const_name: &'static str = #query_name;
        });

        let kind = match grid_type {
            GridType::String => quote! { ::gridquery::FieldKind::String },
            GridType::Number => quote! {
                ::gridquery::FieldKind::Number(<#inner as ::gridquery::GridNumber>::KIND)
            },
            GridType::Timestamp => quote! { ::gridquery::FieldKind::Timestamp },
            GridType::Enum => quote! {
                ::gridquery::FieldKind::Enum(<#inner as ::gridquery::GridEnum>::VARIANTS)
            },
            GridType::Bool => quote! { ::gridquery::FieldKind::Bool },
            GridType::Reference => quote! {
                ::gridquery::FieldKind::Reference(<#inner as ::gridquery::Gridable>::grid_schema)
            },
        };
        field_defs.push(if nullable {
            quote! { ::gridquery::FieldDef::new(#query_name, #kind).nullable() }
        } else {
            quote! { ::gridquery::FieldDef::new(#query_name, #kind) }
        });

        let value_expr = match grid_type {
            GridType::String => quote! {
                ::gridquery::Value::String(::core::convert::AsRef::<str>::as_ref(v))
            },
            GridType::Number => quote! {
                ::gridquery::Value::Number(::gridquery::GridNumber::to_number(*v))
            },
            GridType::Timestamp => quote! {
                ::gridquery::Value::Timestamp(::gridquery::GridTimestamp::grid_timestamp(v))
            },
            GridType::Enum => quote! {
                ::gridquery::Value::Enum(::gridquery::GridEnum::discriminant(v))
            },
            GridType::Bool => quote! { ::gridquery::Value::Bool(*v) },
            GridType::Reference => quote! { ::gridquery::Value::Record(v) },
        };
        let read = if nullable {
            quote! {
                match &self.#field_name {
                    ::core::option::Option::Some(v) => #value_expr,
                    ::core::option::Option::None => ::gridquery::Value::None,
                }
            }
        } else {
            quote! {{
                let v = &self.#field_name;
                #value_expr
            }}
        };
        field_matches.push(quote! {
            #query_name => #read,
        });
    }

    let identity = match struct_attrs.identity {
        Some(identity) => {
            if !names.contains(&identity) {
                return Err(Error::new(
                    input.ident.span(),
                    format!("identity field '{}' is not a grid field", identity),
                ));
            }
            quote! { ::core::option::Option::Some(#identity) }
        }
        None => quote! { ::core::option::Option::None },
    };
    let schema_name = struct_name.to_string();

    let expanded = quote! {
        impl #struct_name {
            #(#field_constants)*
        }

        impl ::gridquery::Gridable for #struct_name {
            fn grid_schema() -> &'static ::gridquery::Schema {
                static SCHEMA: ::gridquery::Schema = ::gridquery::Schema::new(
                    #schema_name,
                    #identity,
                    &[#(#field_defs),*],
                );
                &SCHEMA
            }

            fn grid_field(&self, field: &str) -> ::gridquery::Value<'_> {
                match field {
                    #(#field_matches)*
                    _ => ::gridquery::Value::None,
                }
            }
        }
    };

    Ok(expanded)
}

/// Returns `T` for a field typed `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        }
    }

    result
}
