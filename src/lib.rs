//! # nestmap
//!
//! Structure-preserving mapping over nested collections.
//!
//! ## Overview
//!
//! A batch flowing through a training or inference loop is rarely a single
//! value: it is a mapping of sequences of records of tensors, or some other
//! nesting of the same few shapes. This library provides:
//!
//! - **Collections**: a [`Value`](collection::Value) tree of mappings, named
//!   tuples (records) and sequences around opaque leaves
//! - **Mapping**: [`apply_to_collection`](collection::apply_to_collection)
//!   applies a function to every leaf of a given type and rebuilds the same
//!   shape around the results
//! - **Device transfer**: [`move_batch_to_device`](device::move_batch_to_device)
//!   moves every tensor leaf of a batch to a target device
//! - **Derive**: `#[derive(NamedTuple)]` carries typed structs in and out of
//!   the tree as records
//!
//! ## Feature Flags
//!
//! - `derive` (default): `#[derive(NamedTuple)]`
//! - `device` (default): the `device` module
//! - `serde`: `Serialize`/`Deserialize` for `Key` and `Device`
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use nestmap::prelude::*;
//!
//! let batch = Value::from(Mapping::dict().with("a", 1_i64).with("b", 2_i64));
//! let doubled = map_leaves(batch, |number: i64| number * 2).unwrap();
//!
//! assert_eq!(doubled, Value::from(Mapping::dict().with("a", 2_i64).with("b", 4_i64)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use nestmap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::collection::*;

    #[cfg(feature = "device")]
    pub use crate::device::*;

    #[cfg(feature = "derive")]
    pub use nestmap_derive::NamedTuple;
}

pub mod collection;

#[cfg(feature = "device")]
pub mod device;

#[cfg(feature = "derive")]
pub use nestmap_derive::NamedTuple;
