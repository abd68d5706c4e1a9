//! Conversions between typed Rust values and [`Value`] trees.
//!
//! - [`IntoValue`] / [`FromValue`]: leaves, `Option`, `Vec`, `BTreeMap`
//! - [`NamedTuple`]: typed records, usually derived with
//!   `#[derive(NamedTuple)]`
//! - [`leaf_value!`](crate::leaf_value): registers a user type as a leaf
//!
//! # Examples
//!
//! ```rust
//! use nestmap::collection::{FromValue, IntoValue, Value};
//!
//! let value = vec![Some(1_i64), None].into_value();
//! assert_eq!(
//!     value,
//!     Value::Sequence(vec![Value::leaf(1_i64), Value::Null])
//! );
//!
//! let back: Vec<Option<i64>> = FromValue::from_value(value).unwrap();
//! assert_eq!(back, vec![Some(1), None]);
//! ```

use std::collections::BTreeMap;

use super::error::FromValueError;
use super::value::{Key, Mapping, Record, RecordType, Value};

/// Conversion into a [`Value`] tree.
pub trait IntoValue {
    /// Converts `self` into a value.
    fn into_value(self) -> Value;
}

/// Conversion out of a [`Value`] tree.
pub trait FromValue: Sized {
    /// Converts a value back into `Self`.
    ///
    /// # Errors
    ///
    /// Returns [`FromValueError`] if the value does not have the expected shape.
    fn from_value(value: Value) -> Result<Self, FromValueError>;
}

/// A Rust struct that travels through the mapper as a [`Record`].
///
/// Derive it with `#[derive(NamedTuple)]`; the derive also implements
/// [`IntoValue`] and [`FromValue`] for the struct.
pub trait NamedTuple: Sized {
    /// The record type: struct name and field names in declaration order.
    fn record_type() -> RecordType;

    /// Converts the struct into a record.
    fn into_record(self) -> Record;

    /// Rebuilds the struct from a record.
    ///
    /// # Errors
    ///
    /// Returns [`FromValueError`] if the record type differs or a field has
    /// the wrong shape.
    fn from_record(record: Record) -> Result<Self, FromValueError>;
}

impl IntoValue for Value {
    #[inline]
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    #[inline]
    fn from_value(value: Value) -> Result<Self, FromValueError> {
        Ok(value)
    }
}

impl IntoValue for Mapping {
    fn into_value(self) -> Value {
        Value::Mapping(self)
    }
}

impl IntoValue for Record {
    fn into_value(self) -> Value {
        Value::Record(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::leaf(self.to_string())
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, FromValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::sequence(self)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, FromValueError> {
        match value {
            Value::Sequence(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(FromValueError::mismatch("sequence", &other)),
        }
    }
}

impl<K, T> IntoValue for BTreeMap<K, T>
where
    K: Into<Key>,
    T: IntoValue,
{
    fn into_value(self) -> Value {
        Value::Mapping(self.into_iter().collect())
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: Value) -> Result<Self, FromValueError> {
        let Value::Mapping(mapping) = value else {
            return Err(FromValueError::mismatch("mapping", &value));
        };
        mapping
            .into_iter()
            .map(|(key, value)| match key {
                Key::Str(key) => T::from_value(value).map(|value| (key, value)),
                other => Err(FromValueError::Key {
                    expected: "string",
                    actual: other,
                }),
            })
            .collect()
    }
}

/// Implements [`IntoValue`] and [`FromValue`] for types that are stored as
/// opaque leaves.
///
/// Any `Clone + Debug + PartialEq + Send + Sync + 'static` type can be a leaf;
/// this macro only adds the conversions used by `#[derive(NamedTuple)]` and
/// the typed helpers.
///
/// # Example
///
/// ```rust
/// use nestmap::collection::{FromValue, IntoValue, Value};
/// use nestmap::leaf_value;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Token(u32);
///
/// leaf_value!(Token);
///
/// let value = Token(7).into_value();
/// assert_eq!(value.downcast_ref::<Token>(), Some(&Token(7)));
/// assert_eq!(Token::from_value(value).unwrap(), Token(7));
/// ```
#[macro_export]
macro_rules! leaf_value {
    ($($leaf:ty),+ $(,)?) => {
        $(
            impl $crate::collection::IntoValue for $leaf {
                #[inline]
                fn into_value(self) -> $crate::collection::Value {
                    $crate::collection::Value::leaf(self)
                }
            }

            impl $crate::collection::FromValue for $leaf {
                fn from_value(
                    value: $crate::collection::Value,
                ) -> ::core::result::Result<Self, $crate::collection::FromValueError> {
                    value.into_leaf::<$leaf>().map_err(|other| {
                        $crate::collection::FromValueError::mismatch(
                            ::core::any::type_name::<$leaf>(),
                            &other,
                        )
                    })
                }
            }
        )+
    };
}

leaf_value!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::leaf(3_i64), Ok(3))]
    #[case(Value::leaf(3_i32), Err(()))]
    #[case(Value::Null, Err(()))]
    fn test_leaf_from_value(#[case] value: Value, #[case] expected: Result<i64, ()>) {
        assert_eq!(i64::from_value(value).map_err(|_| ()), expected);
    }

    #[rstest]
    fn test_str_becomes_string_leaf() {
        assert_eq!("hello".into_value(), Value::leaf("hello".to_string()));
    }

    #[rstest]
    fn test_option_maps_none_to_null() {
        assert_eq!(None::<i64>.into_value(), Value::Null);
        assert_eq!(Option::<i64>::from_value(Value::Null), Ok(None));
    }

    #[rstest]
    fn test_btreemap_round_trip() {
        let mut source = BTreeMap::new();
        source.insert("a".to_string(), 1_i64);
        source.insert("b".to_string(), 2_i64);

        let value = source.clone().into_value();
        assert_eq!(value.as_mapping().map(Mapping::len), Some(2));
        assert_eq!(BTreeMap::<String, i64>::from_value(value), Ok(source));
    }

    #[rstest]
    fn test_btreemap_rejects_non_string_keys() {
        let value = Value::from(Mapping::dict().with(1, 1_i64));
        assert_eq!(
            BTreeMap::<String, i64>::from_value(value),
            Err(FromValueError::Key {
                expected: "string",
                actual: Key::Int(1),
            })
        );
    }

    #[rstest]
    fn test_vec_rejects_mapping() {
        let error = Vec::<i64>::from_value(Value::from(Mapping::dict())).unwrap_err();
        assert_eq!(
            error,
            FromValueError::TypeMismatch {
                expected: "sequence",
                actual: "mapping<dict>".to_string(),
            }
        );
    }
}
