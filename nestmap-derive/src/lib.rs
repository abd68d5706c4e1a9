//! Derive macros for nestmap.
//!
//! # Available Derive Macros
//!
//! - [`NamedTuple`]: carries a struct through nestmap collections as a record
//!
//! # Example
//!
//! ```rust,ignore
//! use nestmap::collection::{map_leaves, IntoValue, FromValue};
//! use nestmap_derive::NamedTuple;
//!
//! #[derive(Clone, Debug, PartialEq, NamedTuple)]
//! struct Point {
//!     x: i64,
//!     y: i64,
//! }
//!
//! let value = Point { x: 1, y: 2 }.into_value();
//! let moved = map_leaves(value, |n: i64| n + 1).unwrap();
//! assert_eq!(Point::from_value(moved).unwrap(), Point { x: 2, y: 3 });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod named_tuple;

use proc_macro::TokenStream;

/// Derive macro implementing `NamedTuple`, `IntoValue` and `FromValue`.
///
/// The struct becomes a record whose type name is the struct name and whose
/// fields are the struct fields in declaration order. Every field type must
/// implement `IntoValue` and `FromValue`.
///
/// # Requirements
///
/// - The type must be a struct with named fields
///
/// # Generated Code
///
/// ```rust,ignore
/// impl NamedTuple for StructName {
///     fn record_type() -> RecordType { ... }
///     fn into_record(self) -> Record { ... }
///     fn from_record(record: Record) -> Result<Self, FromValueError> { ... }
/// }
/// impl IntoValue for StructName { ... }
/// impl FromValue for StructName { ... }
/// ```
///
/// # Generics
///
/// Generic structs are supported; the generated impls require each field
/// type to implement `IntoValue + FromValue`.
///
/// ```rust,ignore
/// #[derive(NamedTuple)]
/// struct Pair<T> {
///     left: T,
///     right: T,
/// }
/// ```
#[proc_macro_derive(NamedTuple)]
pub fn derive_named_tuple(input: TokenStream) -> TokenStream {
    named_tuple::derive_named_tuple_impl(input)
}
