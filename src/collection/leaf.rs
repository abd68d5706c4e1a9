//! The leaf predicate: which nodes the mapper hands to the user function.

use std::any::TypeId;
use std::fmt;

use smallvec::SmallVec;

use super::convert::NamedTuple;
use super::value::{Element, RecordType, Value};

/// One alternative of a [`LeafTypes`] predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafType {
    /// A leaf element of exactly this Rust type.
    Of {
        /// The element's `TypeId`.
        id: TypeId,
        /// The element's type name, for display.
        name: &'static str,
    },
    /// [`Value::Null`].
    Null,
    /// Any mapping node, taken whole.
    Mapping,
    /// A record node, taken whole. `None` matches every record type.
    Record(Option<RecordType>),
    /// Any sequence node, taken whole.
    Sequence,
}

impl LeafType {
    /// The alternative matching leaves of type `T`.
    #[must_use]
    pub fn of<T: Element>() -> Self {
        Self::Of {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns `true` if `value` matches this alternative.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Of { id, .. }, Value::Leaf(_)) => value.leaf_type_id() == Some(*id),
            (Self::Null, Value::Null)
            | (Self::Mapping, Value::Mapping(_))
            | (Self::Record(None), Value::Record(_))
            | (Self::Sequence, Value::Sequence(_)) => true,
            (Self::Record(Some(record_type)), Value::Record(record)) => {
                record.record_type() == *record_type
            }
            _ => false,
        }
    }
}

impl fmt::Display for LeafType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Of { name, .. } => formatter.write_str(name),
            Self::Null => formatter.write_str("null"),
            Self::Mapping => formatter.write_str("mapping"),
            Self::Record(None) => formatter.write_str("record"),
            Self::Record(Some(record_type)) => write!(formatter, "record<{}>", record_type.name()),
            Self::Sequence => formatter.write_str("sequence"),
        }
    }
}

/// A "type or tuple of types": matches a node if any alternative does.
///
/// # Examples
///
/// ```rust
/// use nestmap::collection::{LeafTypes, Value};
///
/// let numbers = LeafTypes::of::<i64>().or::<f64>();
///
/// assert!(numbers.matches(&Value::leaf(1_i64)));
/// assert!(numbers.matches(&Value::leaf(1.5_f64)));
/// assert!(!numbers.matches(&Value::leaf("1".to_string())));
/// assert_eq!(numbers.to_string(), "(i64, f64)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafTypes {
    alternatives: SmallVec<[LeafType; 2]>,
}

impl LeafTypes {
    /// The empty predicate; matches nothing.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Matches leaves of type `T`.
    #[must_use]
    pub fn of<T: Element>() -> Self {
        Self::kind(LeafType::of::<T>())
    }

    /// Matches a single alternative.
    #[must_use]
    pub fn kind(alternative: LeafType) -> Self {
        Self::none().or_kind(alternative)
    }

    /// Matches records of the [`NamedTuple`] type `T`, taken whole.
    #[must_use]
    pub fn record<T: NamedTuple>() -> Self {
        Self::kind(LeafType::Record(Some(T::record_type())))
    }

    /// Adds leaves of type `U` as an alternative.
    #[must_use]
    pub fn or<U: Element>(self) -> Self {
        self.or_kind(LeafType::of::<U>())
    }

    /// Adds an alternative.
    #[must_use]
    pub fn or_kind(mut self, alternative: LeafType) -> Self {
        if !self.alternatives.contains(&alternative) {
            self.alternatives.push(alternative);
        }
        self
    }

    /// Returns `true` if no alternative is present.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Returns the alternatives in insertion order.
    #[inline]
    #[must_use]
    pub fn alternatives(&self) -> &[LeafType] {
        &self.alternatives
    }

    /// Returns `true` if any alternative matches `value`.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        self.alternatives
            .iter()
            .any(|alternative| alternative.matches(value))
    }
}

impl From<LeafType> for LeafTypes {
    fn from(alternative: LeafType) -> Self {
        Self::kind(alternative)
    }
}

impl FromIterator<LeafType> for LeafTypes {
    fn from_iter<I: IntoIterator<Item = LeafType>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), Self::or_kind)
    }
}

impl fmt::Display for LeafTypes {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alternatives.as_slice() {
            [single] => write!(formatter, "{single}"),
            alternatives => {
                formatter.write_str("(")?;
                for (index, alternative) in alternatives.iter().enumerate() {
                    if index > 0 {
                        formatter.write_str(", ")?;
                    }
                    write!(formatter, "{alternative}")?;
                }
                formatter.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Mapping;
    use rstest::rstest;

    const PAIR: RecordType = RecordType::new("Pair", &["left", "right"]);
    const OTHER: RecordType = RecordType::new("Other", &["left", "right"]);

    fn pair() -> Value {
        Value::Record(
            PAIR.construct([Value::leaf(1_i64), Value::leaf(2_i64)])
                .unwrap(),
        )
    }

    #[rstest]
    fn test_none_matches_nothing() {
        let types = LeafTypes::none();
        assert!(types.is_empty());
        assert!(!types.matches(&Value::Null));
        assert!(!types.matches(&Value::leaf(1_i64)));
    }

    #[rstest]
    #[case(Value::leaf(1_i64), true)]
    #[case(Value::leaf(1_i32), false)]
    #[case(Value::Sequence(vec![Value::leaf(1_i64)]), false)]
    fn test_of_matches_exact_type(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(LeafTypes::of::<i64>().matches(&value), expected);
    }

    #[rstest]
    fn test_container_kinds_match_whole_nodes() {
        assert!(LeafTypes::kind(LeafType::Mapping).matches(&Value::from(Mapping::dict())));
        assert!(LeafTypes::kind(LeafType::Sequence).matches(&Value::Sequence(vec![])));
        assert!(LeafTypes::kind(LeafType::Null).matches(&Value::Null));
        assert!(LeafTypes::kind(LeafType::Record(None)).matches(&pair()));
    }

    #[rstest]
    fn test_record_kind_checks_record_type() {
        assert!(LeafTypes::kind(LeafType::Record(Some(PAIR))).matches(&pair()));
        assert!(!LeafTypes::kind(LeafType::Record(Some(OTHER))).matches(&pair()));
    }

    #[rstest]
    fn test_or_kind_deduplicates() {
        let types = LeafTypes::of::<i64>().or::<i64>().or_kind(LeafType::Null);
        assert_eq!(types.alternatives().len(), 2);
    }

    #[rstest]
    fn test_display() {
        assert_eq!(LeafTypes::of::<i64>().to_string(), "i64");
        assert_eq!(
            LeafTypes::of::<bool>().or_kind(LeafType::Record(Some(PAIR))).to_string(),
            "(bool, record<Pair>)"
        );
        assert_eq!(LeafTypes::none().to_string(), "()");
    }

    #[rstest]
    fn test_from_iterator() {
        let types: LeafTypes = [LeafType::Null, LeafType::Sequence].into_iter().collect();
        assert!(types.matches(&Value::Null));
        assert!(types.matches(&Value::Sequence(vec![])));
        assert!(!types.matches(&Value::leaf(0_u8)));
    }
}
