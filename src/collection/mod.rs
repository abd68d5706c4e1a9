//! Nested collections and structure-preserving mapping over them.
//!
//! - [`Value`]: a node of a nested collection (leaf, mapping, record, sequence)
//! - [`LeafTypes`]: which nodes count as leaves for a given call
//! - [`apply_to_collection`]: applies a function to every matching leaf and
//!   rebuilds the surrounding containers
//! - [`IntoValue`], [`FromValue`], [`NamedTuple`]: typed conversions
//!
//! # Container shapes
//!
//! | Shape        | Variant             | Rebuilt as                           |
//! |--------------|---------------------|--------------------------------------|
//! | mapping      | [`Value::Mapping`]  | same [`MappingKind`], same key order |
//! | named tuple  | [`Value::Record`]   | same [`RecordType`], via `construct` |
//! | list, tuple  | [`Value::Sequence`] | a sequence                           |
//!
//! Strings are leaves and are never split into characters.
//!
//! # Examples
//!
//! ```rust
//! use nestmap::collection::{map_collection, LeafTypes, RecordType, Value};
//!
//! const POINT: RecordType = RecordType::new("Point", &["x", "y"]);
//!
//! let point = Value::Record(POINT.construct([Value::leaf(1_i64), Value::leaf(2_i64)]).unwrap());
//! let moved = map_collection(point, &LeafTypes::of::<i64>(), |value| {
//!     match value.into_leaf::<i64>() {
//!         Ok(number) => Value::leaf(number + 1),
//!         Err(other) => other,
//!     }
//! })
//! .unwrap();
//!
//! let record = moved.as_record().unwrap();
//! assert_eq!(record.record_type(), POINT);
//! assert_eq!(record.get("x"), Some(&Value::leaf(2_i64)));
//! assert_eq!(record.get("y"), Some(&Value::leaf(3_i64)));
//! ```

mod apply;
mod convert;
mod error;
mod leaf;
mod value;

pub use apply::{
    ApplyOptions, Arguments, apply_to_collection, apply_to_collection_with,
    apply_to_collection_with_options, map_collection, map_leaves,
};
pub use convert::{FromValue, IntoValue, NamedTuple};
pub use error::{ApplyError, FromValueError, ReconstructError};
pub use leaf::{LeafType, LeafTypes};
pub use value::{Element, Key, Mapping, MappingKind, Record, RecordType, Value};
