//! Structure-preserving application of a function to matching leaves.
//!
//! [`apply_to_collection`] walks a [`Value`] depth-first and checks each node
//! in a fixed order:
//!
//! 1. the node matches the leaf predicate: return `function(node)`
//! 2. [`Value::Mapping`]: map every value, keep keys, order and [`MappingKind`]
//! 3. [`Value::Record`]: map every field, rebuild through [`RecordType::construct`]
//! 4. [`Value::Sequence`]: map every item into a new sequence
//! 5. anything else is returned unchanged
//!
//! Because the leaf check comes first, a container that matches the
//! predicate is handed to the function whole and never entered.
//!
//! # Laws
//!
//! For any predicate `types`:
//!
//! ```text
//! map_collection(v, types, |x| x) == v
//! map_collection(map_collection(v, types, f), types, g) == map_collection(v, types, |x| g(f(x)))
//! ```
//!
//! The second law holds when `f` maps matching leaves to matching leaves.
//!
//! # Examples
//!
//! ```rust
//! use nestmap::collection::{map_leaves, Mapping, Value};
//!
//! let batch = Value::from(Mapping::dict().with("a", vec![1_i64, 2]).with("tag", "keep"));
//! let bumped = map_leaves(batch, |number: i64| number + 1).unwrap();
//!
//! assert_eq!(
//!     bumped,
//!     Value::from(Mapping::dict().with("a", vec![2_i64, 3]).with("tag", "keep"))
//! );
//! ```
//!
//! [`MappingKind`]: super::MappingKind
//! [`RecordType::construct`]: super::RecordType::construct

use std::convert::Infallible;

use super::convert::IntoValue;
use super::error::{ApplyError, ReconstructError};
use super::leaf::LeafTypes;
use super::value::{Element, Mapping, Value};

// =============================================================================
// Arguments and options
// =============================================================================

/// Extra positional and keyword arguments forwarded to every call of the
/// function in [`apply_to_collection_with`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    positional: Vec<Value>,
    keyword: Vec<(String, Value)>,
}

impl Arguments {
    /// Creates an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl IntoValue) -> Self {
        self.positional.push(value.into_value());
        self
    }

    /// Sets a keyword argument, replacing an earlier one with the same name.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl IntoValue) -> Self {
        let name = name.into();
        let value = value.into_value();
        match self.keyword.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.keyword.push((name, value)),
        }
        self
    }

    /// Returns the positional arguments.
    #[must_use]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Returns the positional argument at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Returns the keyword argument called `name`.
    #[must_use]
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keyword
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }
}

/// Options for [`apply_to_collection_with_options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    exclude: LeafTypes,
    include_null: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            exclude: LeafTypes::none(),
            include_null: true,
        }
    }
}

impl ApplyOptions {
    /// Creates the default options: nothing excluded, nulls kept.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes matching `exclude` are never handed to the function, even when
    /// they match the leaf predicate. Excluded containers are still entered.
    #[must_use]
    pub fn exclude(mut self, exclude: LeafTypes) -> Self {
        self.exclude = exclude;
        self
    }

    /// When `false`, mapping entries and sequence items whose mapped value is
    /// [`Value::Null`] are dropped. Record fields are always kept.
    #[must_use]
    pub const fn include_null(mut self, include_null: bool) -> Self {
        self.include_null = include_null;
        self
    }

    /// Returns the exclusion predicate.
    #[must_use]
    pub const fn excluded(&self) -> &LeafTypes {
        &self.exclude
    }

    /// Returns whether null results are kept.
    #[must_use]
    pub const fn includes_null(&self) -> bool {
        self.include_null
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Applies `function` to every node matching `leaf_types`, rebuilding the
/// containers around the results.
///
/// # Errors
///
/// Stops at the first failure in depth-first order and returns
/// [`ApplyError::Function`] for a function error or
/// [`ApplyError::Reconstruct`] for a container that cannot be rebuilt.
///
/// # Examples
///
/// ```rust
/// use nestmap::collection::{apply_to_collection, ApplyError, LeafTypes, Value};
///
/// let items = Value::sequence([1_i64, -2, 3]);
/// let result = apply_to_collection(items, &LeafTypes::of::<i64>(), |value| {
///     match value.into_leaf::<i64>() {
///         Ok(number) if number >= 0 => Ok(Value::leaf(number * 10)),
///         Ok(number) => Err(format!("negative: {number}")),
///         Err(other) => Ok(other),
///     }
/// });
///
/// assert_eq!(result, Err(ApplyError::Function("negative: -2".to_string())));
/// ```
pub fn apply_to_collection<F, E>(
    value: Value,
    leaf_types: &LeafTypes,
    function: F,
) -> Result<Value, ApplyError<E>>
where
    F: FnMut(Value) -> Result<Value, E>,
{
    apply_to_collection_with_options(value, leaf_types, &ApplyOptions::default(), function)
}

/// Like [`apply_to_collection`], passing `arguments` to every call.
///
/// # Errors
///
/// See [`apply_to_collection`].
///
/// # Examples
///
/// ```rust
/// use nestmap::collection::{apply_to_collection_with, Arguments, LeafTypes, Value};
///
/// let arguments = Arguments::new().kwarg("scale", 3_i64);
/// let scaled = apply_to_collection_with(
///     Value::sequence([1_i64, 2]),
///     &LeafTypes::of::<i64>(),
///     &arguments,
///     |value, arguments| {
///         let scale = arguments.keyword("scale").and_then(Value::downcast_ref::<i64>).copied();
///         let number = value.downcast_ref::<i64>().copied();
///         Ok::<_, ()>(Value::leaf(number.unwrap_or(0) * scale.unwrap_or(1)))
///     },
/// )
/// .unwrap();
///
/// assert_eq!(scaled, Value::sequence([3_i64, 6]));
/// ```
pub fn apply_to_collection_with<F, E>(
    value: Value,
    leaf_types: &LeafTypes,
    arguments: &Arguments,
    mut function: F,
) -> Result<Value, ApplyError<E>>
where
    F: FnMut(Value, &Arguments) -> Result<Value, E>,
{
    apply_to_collection(value, leaf_types, |leaf| function(leaf, arguments))
}

/// Like [`apply_to_collection`], honouring [`ApplyOptions`].
///
/// # Errors
///
/// See [`apply_to_collection`].
pub fn apply_to_collection_with_options<F, E>(
    value: Value,
    leaf_types: &LeafTypes,
    options: &ApplyOptions,
    mut function: F,
) -> Result<Value, ApplyError<E>>
where
    F: FnMut(Value) -> Result<Value, E>,
{
    Walker {
        leaf_types,
        options,
        function: &mut function,
    }
    .visit(value)
}

/// Infallible form of [`apply_to_collection`].
///
/// # Errors
///
/// Returns [`ReconstructError`] if a container cannot be rebuilt.
pub fn map_collection<F>(
    value: Value,
    leaf_types: &LeafTypes,
    mut function: F,
) -> Result<Value, ReconstructError>
where
    F: FnMut(Value) -> Value,
{
    apply_to_collection(value, leaf_types, |leaf| {
        Ok::<_, Infallible>(function(leaf))
    })
    .map_err(|error| match error {
        ApplyError::Function(never) => match never {},
        ApplyError::Reconstruct(error) => error,
    })
}

/// Maps every leaf of type `T` through a typed function.
///
/// # Errors
///
/// Returns [`ReconstructError`] if a container cannot be rebuilt.
pub fn map_leaves<T, U, F>(value: Value, mut function: F) -> Result<Value, ReconstructError>
where
    T: Element,
    U: IntoValue,
    F: FnMut(T) -> U,
{
    map_collection(value, &LeafTypes::of::<T>(), |leaf| {
        match leaf.into_leaf::<T>() {
            Ok(element) => function(element).into_value(),
            Err(other) => other,
        }
    })
}

impl Value {
    /// Method form of [`apply_to_collection`].
    ///
    /// # Errors
    ///
    /// See [`apply_to_collection`].
    pub fn apply<F, E>(self, leaf_types: &LeafTypes, function: F) -> Result<Self, ApplyError<E>>
    where
        F: FnMut(Self) -> Result<Self, E>,
    {
        apply_to_collection(self, leaf_types, function)
    }

    /// Method form of [`map_collection`].
    ///
    /// # Errors
    ///
    /// See [`map_collection`].
    pub fn map<F>(self, leaf_types: &LeafTypes, function: F) -> Result<Self, ReconstructError>
    where
        F: FnMut(Self) -> Self,
    {
        map_collection(self, leaf_types, function)
    }
}

// =============================================================================
// Traversal
// =============================================================================

struct Walker<'a, F> {
    leaf_types: &'a LeafTypes,
    options: &'a ApplyOptions,
    function: &'a mut F,
}

impl<F, E> Walker<'_, F>
where
    F: FnMut(Value) -> Result<Value, E>,
{
    fn visit(&mut self, value: Value) -> Result<Value, ApplyError<E>> {
        if self.leaf_types.matches(&value) && !self.options.exclude.matches(&value) {
            return (self.function)(value).map_err(ApplyError::Function);
        }

        match value {
            Value::Mapping(mapping) => {
                let mut rebuilt = Mapping::with_capacity(mapping.kind(), mapping.len());
                for (key, child) in mapping {
                    let mapped = self.visit(child)?;
                    if self.keeps(&mapped) {
                        rebuilt.push_unique(key, mapped);
                    }
                }
                Ok(Value::Mapping(rebuilt))
            }
            Value::Record(record) => {
                let record_type = record.record_type();
                let mapped = record
                    .into_values()
                    .into_iter()
                    .map(|child| self.visit(child))
                    .collect::<Result<Vec<Value>, _>>()?;
                record_type
                    .construct(mapped)
                    .map(Value::Record)
                    .map_err(|error| {
                        tracing::warn!(
                            record = %record_type,
                            %error,
                            "record reconstruction failed"
                        );
                        ApplyError::Reconstruct(error)
                    })
            }
            Value::Sequence(items) => {
                let mut rebuilt = Vec::with_capacity(items.len());
                for child in items {
                    let mapped = self.visit(child)?;
                    if self.keeps(&mapped) {
                        rebuilt.push(mapped);
                    }
                }
                Ok(Value::Sequence(rebuilt))
            }
            unmatched @ (Value::Null | Value::Leaf(_)) => Ok(unmatched),
        }
    }

    const fn keeps(&self, mapped: &Value) -> bool {
        self.options.include_null || !mapped.is_null()
    }
}
