//! Implementation of the `#[derive(NamedTuple)]` macro.
//!
//! This module generates the `NamedTuple`, `IntoValue` and `FromValue`
//! implementations that move a struct in and out of a nestmap record.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, FieldsNamed, Generics, Ident, parse_macro_input, parse_quote};

/// Main implementation of the `NamedTuple` derive macro.
pub fn derive_named_tuple_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let expanded = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => generate_named_tuple(name, &input.generics, fields),
            Fields::Unnamed(_) => syn::Error::new_spanned(
                name,
                "NamedTuple can only be derived for structs with named fields, not tuple structs.",
            )
            .to_compile_error(),
            Fields::Unit => syn::Error::new_spanned(
                name,
                "NamedTuple cannot be derived for unit structs (structs with no fields).",
            )
            .to_compile_error(),
        },
        Data::Enum(_) => {
            syn::Error::new_spanned(name, "NamedTuple can only be derived for structs, not enums.")
                .to_compile_error()
        }
        Data::Union(_) => {
            syn::Error::new_spanned(name, "NamedTuple cannot be derived for unions.")
                .to_compile_error()
        }
    };

    TokenStream::from(expanded)
}

/// Generates the three trait implementations for a struct with named fields.
fn generate_named_tuple(name: &Ident, generics: &Generics, fields: &FieldsNamed) -> TokenStream2 {
    let name_literal = name.unraw().to_string();

    let field_idents: Vec<&Ident> = fields
        .named
        .iter()
        .map(|field| field.ident.as_ref().expect("Named field must have ident"))
        .collect();
    let field_literals: Vec<String> = field_idents
        .iter()
        .map(|ident| ident.unraw().to_string())
        .collect();
    let field_types: Vec<&syn::Type> = fields.named.iter().map(|field| &field.ty).collect();

    let mut generics = generics.clone();
    let where_clause = generics.make_where_clause();
    for field_type in &field_types {
        where_clause.predicates.push(parse_quote! {
            #field_type: ::nestmap::collection::IntoValue + ::nestmap::collection::FromValue
        });
    }
    let (impl_generics, type_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics ::nestmap::collection::NamedTuple for #name #type_generics #where_clause {
            #[inline]
            fn record_type() -> ::nestmap::collection::RecordType {
                ::nestmap::collection::RecordType::new(#name_literal, &[#(#field_literals),*])
            }

            fn into_record(self) -> ::nestmap::collection::Record {
                ::nestmap::collection::Record::from_derive(
                    <Self as ::nestmap::collection::NamedTuple>::record_type(),
                    [#(::nestmap::collection::IntoValue::into_value(self.#field_idents)),*],
                )
            }

            fn from_record(
                record: ::nestmap::collection::Record,
            ) -> ::core::result::Result<Self, ::nestmap::collection::FromValueError> {
                let expected = <Self as ::nestmap::collection::NamedTuple>::record_type();
                let actual = record.record_type();
                if actual != expected {
                    return ::core::result::Result::Err(
                        ::nestmap::collection::FromValueError::RecordType {
                            expected: expected.name(),
                            actual: actual.name(),
                        },
                    );
                }
                let mut __nestmap_values = record.into_values().into_iter();
                ::core::result::Result::Ok(Self {
                    #(
                        #field_idents: <#field_types as ::nestmap::collection::FromValue>::from_value(
                            __nestmap_values.next().unwrap_or_default(),
                        )
                        .map_err(|error| error.in_field(#name_literal, #field_literals))?,
                    )*
                })
            }
        }

        impl #impl_generics ::nestmap::collection::IntoValue for #name #type_generics #where_clause {
            #[inline]
            fn into_value(self) -> ::nestmap::collection::Value {
                ::nestmap::collection::Value::Record(
                    ::nestmap::collection::NamedTuple::into_record(self),
                )
            }
        }

        impl #impl_generics ::nestmap::collection::FromValue for #name #type_generics #where_clause {
            fn from_value(
                value: ::nestmap::collection::Value,
            ) -> ::core::result::Result<Self, ::nestmap::collection::FromValueError> {
                match value {
                    ::nestmap::collection::Value::Record(record) => {
                        <Self as ::nestmap::collection::NamedTuple>::from_record(record)
                    }
                    other => ::core::result::Result::Err(
                        ::nestmap::collection::FromValueError::mismatch(#name_literal, &other),
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn expand(source: &str) -> String {
        let input: DeriveInput = syn::parse_str(source).expect("valid struct");
        let Data::Struct(data_struct) = &input.data else {
            panic!("expected a struct");
        };
        let Fields::Named(fields) = &data_struct.fields else {
            panic!("expected named fields");
        };
        generate_named_tuple(&input.ident, &input.generics, fields).to_string()
    }

    #[rstest]
    fn test_expansion_lists_fields_in_order() {
        let expanded = expand("struct Point { x: i64, y: i64 }");
        assert!(expanded.contains("\"Point\""));
        let x = expanded.find("\"x\"").expect("x literal");
        let y = expanded.find("\"y\"").expect("y literal");
        assert!(x < y);
    }

    #[rstest]
    fn test_expansion_strips_raw_prefix() {
        let expanded = expand("struct Token { r#type: String }");
        assert!(expanded.contains("\"type\""));
        assert!(!expanded.contains("\"r#type\""));
    }

    #[rstest]
    fn test_expansion_bounds_generic_fields() {
        let expanded = expand("struct Pair<T> { left: T, right: T }");
        assert!(expanded.contains("where T :"));
    }
}
