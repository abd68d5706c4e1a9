//! The dynamic collection tree.
//!
//! A [`Value`] is either an opaque leaf or one of a closed set of container
//! shapes. The mapper in [`super::apply`] dispatches over exactly these
//! variants, in a fixed order.
//!
//! # Examples
//!
//! ```rust
//! use nestmap::collection::{Mapping, Value};
//!
//! let batch = Value::from(
//!     Mapping::dict()
//!         .with("input", vec![1_i64, 2, 3])
//!         .with("label", "cat"),
//! );
//!
//! let label = batch.as_mapping().and_then(|mapping| mapping.get("label"));
//! assert_eq!(label.and_then(Value::downcast_ref::<String>), Some(&"cat".to_string()));
//! ```

use std::any::{Any, TypeId};
use std::fmt;

use super::convert::IntoValue;
use super::error::ReconstructError;

// =============================================================================
// Element
// =============================================================================

/// An opaque leaf that can live inside a [`Value`].
///
/// Implemented for every `T: Any + Clone + Debug + PartialEq + Send + Sync`,
/// so numbers, strings, tensors and most user types qualify without any
/// extra code.
pub trait Element: Any + fmt::Debug + Send + Sync {
    /// Returns `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Converts the boxed element into `Box<dyn Any>` for owned downcasting.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;

    /// Clones the element behind a fresh box.
    fn clone_element(&self) -> Box<dyn Element>;

    /// Compares with another element; elements of different types are unequal.
    fn eq_element(&self, other: &dyn Element) -> bool;

    /// Returns the Rust type name of the element.
    fn type_name(&self) -> &'static str;
}

impl<T> Element for T
where
    T: Any + Clone + fmt::Debug + PartialEq + Send + Sync,
{
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }

    fn clone_element(&self) -> Box<dyn Element> {
        Box::new(self.clone())
    }

    fn eq_element(&self, other: &dyn Element) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

// =============================================================================
// Key
// =============================================================================

/// A mapping key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Key {
    /// A boolean key.
    Bool(bool),
    /// An integer key.
    Int(i64),
    /// A string key.
    Str(String),
}

impl fmt::Display for Key {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(formatter, "{value}"),
            Self::Int(value) => write!(formatter, "{value}"),
            Self::Str(value) => write!(formatter, "{value:?}"),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for Key {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

// =============================================================================
// Mapping
// =============================================================================

/// The concrete kind of a [`Mapping`], preserved across reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingKind {
    /// A plain dictionary. Equality ignores entry order.
    Dict,
    /// An ordered dictionary. Equality respects entry order.
    Ordered,
    /// A user mapping type, identified by name. Equality respects entry order.
    Named(&'static str),
}

impl fmt::Display for MappingKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dict => formatter.write_str("dict"),
            Self::Ordered => formatter.write_str("ordered"),
            Self::Named(name) => formatter.write_str(name),
        }
    }
}

/// A key-ordered mapping from [`Key`] to [`Value`].
///
/// Entries keep insertion order. Inserting an existing key replaces its value
/// in place.
#[derive(Debug, Clone)]
pub struct Mapping {
    kind: MappingKind,
    entries: Vec<(Key, Value)>,
}

impl Mapping {
    /// Creates an empty mapping of the given kind.
    #[must_use]
    pub const fn new(kind: MappingKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// Creates an empty mapping of the given kind with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(kind: MappingKind, capacity: usize) -> Self {
        Self {
            kind,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Creates an empty [`MappingKind::Dict`].
    #[must_use]
    pub const fn dict() -> Self {
        Self::new(MappingKind::Dict)
    }

    /// Creates an empty [`MappingKind::Ordered`].
    #[must_use]
    pub const fn ordered() -> Self {
        Self::new(MappingKind::Ordered)
    }

    /// Returns the kind of this mapping.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> MappingKind {
        self.kind
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the mapping has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts an entry, returning the previous value for the key if any.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl IntoValue) -> Option<Value> {
        let key = key.into();
        let value = value.into_value();
        match self.position(&key) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Builder form of [`Mapping::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<Key>, value: impl IntoValue) -> Self {
        self.insert(key, value);
        self
    }

    /// Looks up the value for a key.
    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        let key = key.into();
        self.position(&key).map(|index| &self.entries[index].1)
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        let key = key.into();
        self.position(&key).is_some()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }

    /// Appends an entry whose key is known to be absent.
    pub(crate) fn push_unique(&mut self, key: Key, value: Value) {
        debug_assert!(self.position(&key).is_none());
        self.entries.push((key, value));
    }

    fn position(&self, key: &Key) -> Option<usize> {
        self.entries.iter().position(|(candidate, _)| candidate == key)
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind || self.entries.len() != other.entries.len() {
            return false;
        }
        match self.kind {
            MappingKind::Dict => self.entries.iter().all(|(key, value)| {
                other
                    .position(key)
                    .is_some_and(|index| other.entries[index].1 == *value)
            }),
            MappingKind::Ordered | MappingKind::Named(_) => self.entries == other.entries,
        }
    }
}

impl IntoIterator for Mapping {
    type Item = (Key, Value);
    type IntoIter = std::vec::IntoIter<(Key, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Mapping
where
    K: Into<Key>,
    V: IntoValue,
{
    /// Collects into a [`MappingKind::Dict`]; later duplicates win.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Self::dict();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

// =============================================================================
// Record
// =============================================================================

/// The type of a named fixed-arity tuple: a name and ordered field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordType {
    name: &'static str,
    fields: &'static [&'static str],
}

impl RecordType {
    /// Creates a record type.
    #[must_use]
    pub const fn new(name: &'static str, fields: &'static [&'static str]) -> Self {
        Self { name, fields }
    }

    /// Returns the type name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the field names in declaration order.
    #[inline]
    #[must_use]
    pub const fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    /// Returns the number of fields.
    #[inline]
    #[must_use]
    pub const fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Builds a record positionally.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructError::Arity`] if the number of values differs
    /// from the number of fields.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nestmap::collection::{RecordType, Value};
    ///
    /// const POINT: RecordType = RecordType::new("Point", &["x", "y"]);
    ///
    /// let point = POINT.construct([Value::leaf(1_i64), Value::leaf(2_i64)]).unwrap();
    /// assert_eq!(point.get("y"), Some(&Value::leaf(2_i64)));
    ///
    /// assert!(POINT.construct([Value::leaf(1_i64)]).is_err());
    /// ```
    pub fn construct(
        self,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<Record, ReconstructError> {
        let values: Vec<Value> = values.into_iter().collect();
        if values.len() != self.arity() {
            return Err(ReconstructError::Arity {
                record: self.name,
                expected: self.arity(),
                actual: values.len(),
            });
        }
        Ok(Record {
            record_type: self,
            values,
        })
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}({})", self.name, self.fields.join(", "))
    }
}

/// A named fixed-arity tuple: a [`RecordType`] plus one value per field.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    record_type: RecordType,
    values: Vec<Value>,
}

impl Record {
    /// Used by `#[derive(NamedTuple)]`, whose field list and values come from
    /// the same struct definition.
    #[doc(hidden)]
    #[must_use]
    pub fn from_derive<const N: usize>(record_type: RecordType, values: [Value; N]) -> Self {
        debug_assert_eq!(record_type.arity(), N);
        Self {
            record_type,
            values: Vec::from(values),
        }
    }

    /// Returns the record type.
    #[inline]
    #[must_use]
    pub const fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// Looks up a field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record_type
            .fields
            .iter()
            .position(|name| *name == field)
            .and_then(|index| self.values.get(index))
    }

    /// Returns the values in field order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Iterates over `(field, value)` pairs in field order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.record_type.fields.iter().copied().zip(self.values.iter())
    }

    /// Consumes the record, returning its values in field order.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

// =============================================================================
// Value
// =============================================================================

/// A node of a nested collection.
///
/// Strings, numbers and every other [`Element`] are leaves. Only the three
/// container variants are recursed into by the mapper.
#[derive(Debug, Default)]
pub enum Value {
    /// The absent value.
    #[default]
    Null,
    /// An opaque leaf.
    Leaf(Box<dyn Element>),
    /// A key-ordered mapping.
    Mapping(Mapping),
    /// A named fixed-arity tuple.
    Record(Record),
    /// An ordered sequence. Plain tuples are sequences too.
    Sequence(Vec<Value>),
}

impl Value {
    /// Wraps an element as a leaf.
    ///
    /// A `Value`, [`Mapping`] or [`Record`] passed here is returned as that
    /// node, never wrapped. Any other type, including `Vec<T>`, becomes one
    /// opaque leaf the mapper does not enter; use [`Value::sequence`] or
    /// [`IntoValue::into_value`] to build a sequence.
    #[must_use]
    pub fn leaf<T: Element>(element: T) -> Self {
        let mut slot = Some(element);
        let any: &mut dyn Any = &mut slot;
        if let Some(value) = any.downcast_mut::<Option<Self>>() {
            return value.take().unwrap_or_default();
        }
        if let Some(mapping) = any.downcast_mut::<Option<Mapping>>() {
            return mapping.take().map_or(Self::Null, Self::Mapping);
        }
        if let Some(record) = any.downcast_mut::<Option<Record>>() {
            return record.take().map_or(Self::Null, Self::Record);
        }
        slot.map_or(Self::Null, |element| Self::Leaf(Box::new(element)))
    }

    /// Builds a sequence from anything convertible to values.
    #[must_use]
    pub fn sequence<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoValue,
    {
        Self::Sequence(items.into_iter().map(IntoValue::into_value).collect())
    }

    /// Returns `true` for [`Value::Null`].
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for [`Value::Leaf`].
    #[inline]
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Returns the mapping if this is one.
    #[must_use]
    pub const fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Returns the record if this is one.
    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the sequence items if this is one.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the `TypeId` of the leaf element, if this is a leaf.
    #[must_use]
    pub fn leaf_type_id(&self) -> Option<TypeId> {
        match self {
            Self::Leaf(element) => Some(element.as_any().type_id()),
            _ => None,
        }
    }

    /// Borrows the leaf as `T`, if it is a leaf of exactly that type.
    #[must_use]
    pub fn downcast_ref<T: Element>(&self) -> Option<&T> {
        match self {
            Self::Leaf(element) => element.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Takes the leaf out as `T`.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged if it is not a leaf of type `T`.
    pub fn into_leaf<T: Element>(self) -> Result<T, Self> {
        match self {
            Self::Leaf(element) if element.as_any().is::<T>() => element
                .into_any()
                .downcast::<T>()
                .map(|boxed| *boxed)
                .map_err(|_| Self::Null),
            other => Err(other),
        }
    }

    /// A short description of the node, used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Leaf(element) => element.type_name().to_string(),
            Self::Mapping(mapping) => format!("mapping<{}>", mapping.kind()),
            Self::Record(record) => format!("record<{}>", record.record_type().name()),
            Self::Sequence(_) => "sequence".to_string(),
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Self::Null => Self::Null,
            Self::Leaf(element) => Self::Leaf(element.clone_element()),
            Self::Mapping(mapping) => Self::Mapping(mapping.clone()),
            Self::Record(record) => Self::Record(record.clone()),
            Self::Sequence(items) => Self::Sequence(items.clone()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Leaf(left), Self::Leaf(right)) => left.eq_element(right.as_ref()),
            (Self::Mapping(left), Self::Mapping(right)) => left == right,
            (Self::Record(left), Self::Record(right)) => left == right,
            (Self::Sequence(left), Self::Sequence(right)) => left == right,
            _ => false,
        }
    }
}

impl From<Mapping> for Value {
    fn from(mapping: Mapping) -> Self {
        Self::Mapping(mapping)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::Sequence(items)
    }
}

impl<T: IntoValue> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::sequence(iter)
    }
}

static_assertions::assert_impl_all!(Value: Send, Sync, Clone);
