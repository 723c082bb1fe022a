//! Derive macros for tinyorm
//!
//! Provides the `#[derive(Entity)]` macro that turns a plain struct into a
//! mappable entity: a static field descriptor table (names, column names,
//! semantic kinds, byte offsets) plus by-name value accessors.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod case;
mod entity;

/// Derive the `Entity` trait for a struct.
///
/// # Example
///
/// ```ignore
/// use tinyorm::Entity;
///
/// #[derive(Entity)]
/// struct TestModel {
///     id: i64,
///     #[orm(column = "first_name")]
///     first_name: String,
///     age: i8,
///     last_name: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(table = "name")]` on the struct overrides the derived table name
///   (the snake_cased type name). An empty string falls back to derivation.
/// - `#[orm(column = "name")]` on a field overrides the derived column name
///   (the snake_cased field name). An empty string falls back to derivation.
///
/// Unrecognized `key = value` pairs are ignored; a bare key with no value is
/// rejected at compile time.
///
/// # Supported field types
///
/// `bool`, the fixed-width integers (`i8`-`i64`, `u8`-`u64`), `f32`, `f64`,
/// `String`, `Vec<u8>`, and `Option` of any of those. Anything else is a
/// compile error.
#[proc_macro_derive(Entity, attributes(orm))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
