//! Entity derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Result, Type};

use crate::case::underscore_name;

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let table_name = match struct_table_attr(&input)? {
        Some(explicit) if !explicit.is_empty() => explicit,
        _ => underscore_name(&name.to_string()),
    };

    let mut field_defs = Vec::with_capacity(fields.len());
    let mut blank_fields = Vec::with_capacity(fields.len());
    let mut get_arms = Vec::with_capacity(fields.len());
    let mut set_arms = Vec::with_capacity(fields.len());

    for field in fields.iter() {
        let ident = field.ident.as_ref().unwrap();
        let field_name = ident.to_string();
        let column = match field_column_attr(field)? {
            Some(explicit) if !explicit.is_empty() => explicit,
            _ => underscore_name(&field_name),
        };
        let (kind, nullable) = field_kind(&field.ty)?;

        field_defs.push(quote! {
            tinyorm::FieldDef {
                name: #field_name,
                column: #column,
                kind: #kind,
                nullable: #nullable,
                offset: ::core::mem::offset_of!(#name, #ident),
            }
        });
        blank_fields.push(quote! {
            #ident: ::core::default::Default::default()
        });
        get_arms.push(quote! {
            #field_name => ::core::option::Option::Some(
                tinyorm::Value::from(self.#ident.clone()),
            )
        });
        set_arms.push(quote! {
            #field_name => {
                self.#ident = tinyorm::FromValue::from_value(value)
                    .map_err(|msg| tinyorm::OrmError::decode(#field_name, msg))?;
                ::core::result::Result::Ok(())
            }
        });
    }

    Ok(quote! {
        impl tinyorm::Entity for #name {
            fn table_name() -> &'static str {
                #table_name
            }

            fn fields() -> &'static [tinyorm::FieldDef] {
                const FIELDS: &[tinyorm::FieldDef] = &[#(#field_defs),*];
                FIELDS
            }

            fn blank() -> Self {
                Self {
                    #(#blank_fields),*
                }
            }

            fn get(&self, field: &str) -> ::core::option::Option<tinyorm::Value> {
                match field {
                    #(#get_arms,)*
                    _ => ::core::option::Option::None,
                }
            }

            fn set(&mut self, field: &str, value: tinyorm::Value) -> tinyorm::OrmResult<()> {
                match field {
                    #(#set_arms)*
                    _ => ::core::result::Result::Err(tinyorm::OrmError::unknown_field(field)),
                }
            }
        }
    })
}

/// Parse `#[orm(table = "...")]` on the struct. Unknown keys are ignored.
fn struct_table_attr(input: &DeriveInput) -> Result<Option<String>> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: LitStr = meta.value()?.parse()?;
                table = Some(lit.value());
            } else {
                // Unrecognized keys are ignored, but must still be well
                // formed `key = value` pairs.
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        })?;
    }
    Ok(table)
}

/// Parse `#[orm(column = "...")]` on a field. Unknown keys are ignored.
fn field_column_attr(field: &syn::Field) -> Result<Option<String>> {
    let mut column = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                column = Some(lit.value());
            } else {
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        })?;
    }
    Ok(column)
}

/// Map a field type to its `FieldKind` plus a nullability flag.
fn field_kind(ty: &Type) -> Result<(TokenStream, bool)> {
    if let Some(inner) = option_inner(ty) {
        let (kind, nested) = field_kind(inner)?;
        if nested {
            return Err(syn::Error::new_spanned(
                ty,
                "nested Option fields are not supported",
            ));
        }
        return Ok((kind, true));
    }

    let kind = match type_ident(ty).as_deref() {
        Some("bool") => quote!(tinyorm::FieldKind::Bool),
        Some("i8") => quote!(tinyorm::FieldKind::I8),
        Some("i16") => quote!(tinyorm::FieldKind::I16),
        Some("i32") => quote!(tinyorm::FieldKind::I32),
        Some("i64") => quote!(tinyorm::FieldKind::I64),
        Some("u8") => quote!(tinyorm::FieldKind::U8),
        Some("u16") => quote!(tinyorm::FieldKind::U16),
        Some("u32") => quote!(tinyorm::FieldKind::U32),
        Some("u64") => quote!(tinyorm::FieldKind::U64),
        Some("f32") => quote!(tinyorm::FieldKind::F32),
        Some("f64") => quote!(tinyorm::FieldKind::F64),
        Some("String") => quote!(tinyorm::FieldKind::Text),
        _ if is_byte_vec(ty) => quote!(tinyorm::FieldKind::Bytes),
        _ => {
            return Err(syn::Error::new_spanned(
                ty,
                "unsupported entity field type; expected a scalar, String, \
                 Vec<u8>, or an Option of one of those",
            ));
        }
    };
    Ok((kind, false))
}

/// Return the inner type of `Option<T>`, if `ty` is one.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else { return None };
    let last = path.path.segments.last()?;
    if last.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    match args.args.first() {
        Some(syn::GenericArgument::Type(inner)) => Some(inner),
        _ => None,
    }
}

/// The identifier of a bare path type (`i64`, `String`), if `ty` is one.
fn type_ident(ty: &Type) -> Option<String> {
    let Type::Path(path) = ty else { return None };
    let last = path.path.segments.last()?;
    if !last.arguments.is_none() {
        return None;
    }
    Some(last.ident.to_string())
}

fn is_byte_vec(ty: &Type) -> bool {
    let Type::Path(path) = ty else { return false };
    let Some(last) = path.path.segments.last() else {
        return false;
    };
    if last.ident != "Vec" {
        return false;
    }
    let syn::PathArguments::AngleBracketed(args) = &last.arguments else {
        return false;
    };
    matches!(
        args.args.first(),
        Some(syn::GenericArgument::Type(inner)) if type_ident(inner).as_deref() == Some("u8")
    )
}
