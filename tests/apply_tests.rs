//! Scenario tests for the collection mapper.
//!
//! This module covers the documented behaviour of `apply_to_collection` and
//! `map_collection`:
//!
//! - Unmatched leaves pass through, matched leaves are transformed
//! - Mappings, records and sequences are rebuilt with the same shape
//! - Strings are never decomposed
//! - Nested structures recurse fully

use nestmap::collection::{
    ApplyError, LeafType, LeafTypes, Mapping, MappingKind, RecordType, Value, apply_to_collection,
    map_collection, map_leaves,
};
use rstest::rstest;

const POINT: RecordType = RecordType::new("Point", &["x", "y"]);

fn point(x: i64, y: i64) -> Value {
    Value::Record(
        POINT
            .construct([Value::leaf(x), Value::leaf(y)])
            .expect("arity matches"),
    )
}

fn ints() -> LeafTypes {
    LeafTypes::of::<i64>()
}

fn scale(factor: i64) -> impl FnMut(Value) -> Value {
    move |value| match value.into_leaf::<i64>() {
        Ok(number) => Value::leaf(number * factor),
        Err(other) => other,
    }
}

fn add(amount: i64) -> impl FnMut(Value) -> Value {
    move |value| match value.into_leaf::<i64>() {
        Ok(number) => Value::leaf(number + amount),
        Err(other) => other,
    }
}

// =============================================================================
// Leaves
// =============================================================================

#[rstest]
#[case(Value::leaf(1.5_f64))]
#[case(Value::leaf(true))]
#[case(Value::leaf("text".to_string()))]
#[case(Value::Null)]
fn unmatched_leaf_is_unchanged(#[case] value: Value) {
    let result = map_collection(value.clone(), &ints(), scale(2)).unwrap();
    assert_eq!(result, value);
}

#[rstest]
fn matched_leaf_is_function_result() {
    let result = map_collection(Value::leaf(7_i64), &ints(), scale(3)).unwrap();
    assert_eq!(result, Value::leaf(21_i64));
}

#[rstest]
fn function_may_change_leaf_type() {
    let result = map_leaves(Value::sequence([1_i64, 2]), |number: i64| number % 2 == 0).unwrap();
    assert_eq!(result, Value::sequence([false, true]));
}

// =============================================================================
// Mappings
// =============================================================================

#[rstest]
fn mapping_values_are_mapped_with_same_kind() {
    let source = Value::from(Mapping::dict().with("a", 1_i64).with("b", 2_i64));
    let result = map_collection(source, &ints(), scale(2)).unwrap();

    assert_eq!(
        result,
        Value::from(Mapping::dict().with("a", 2_i64).with("b", 4_i64))
    );
    assert_eq!(
        result.as_mapping().map(Mapping::kind),
        Some(MappingKind::Dict)
    );
}

#[rstest]
fn ordered_mapping_keeps_key_order() {
    let source = Value::from(
        Mapping::ordered()
            .with("z", 1_i64)
            .with("a", 2_i64)
            .with("m", 3_i64),
    );
    let result = map_collection(source, &ints(), scale(10)).unwrap();

    let keys: Vec<String> = result
        .as_mapping()
        .unwrap()
        .keys()
        .map(ToString::to_string)
        .collect();
    assert_eq!(keys, vec!["\"z\"", "\"a\"", "\"m\""]);
    assert_eq!(
        result.as_mapping().map(Mapping::kind),
        Some(MappingKind::Ordered)
    );
}

#[rstest]
fn integer_keys_are_preserved() {
    let source = Value::from(Mapping::dict().with(0, 1_i64).with(1, 2_i64));
    let result = map_collection(source, &ints(), add(1)).unwrap();
    assert_eq!(
        result,
        Value::from(Mapping::dict().with(0, 2_i64).with(1, 3_i64))
    );
}

// =============================================================================
// Records
// =============================================================================

#[rstest]
fn record_is_rebuilt_with_same_record_type() {
    let result = map_collection(point(1, 2), &ints(), add(1)).unwrap();

    assert_eq!(result, point(2, 3));
    let record = result.as_record().unwrap();
    assert_eq!(record.record_type(), POINT);
    assert_eq!(record.get("x"), Some(&Value::leaf(2_i64)));
}

#[rstest]
fn record_is_not_flattened_to_sequence() {
    let result = map_collection(point(0, 0), &ints(), add(1)).unwrap();
    assert!(result.as_sequence().is_none());
    assert!(result.as_record().is_some());
}

// =============================================================================
// Sequences
// =============================================================================

#[rstest]
fn sequence_maps_matching_items_only() {
    let source = Value::Sequence(vec![
        Value::leaf(1_i64),
        Value::leaf("keep".to_string()),
        Value::leaf(2_i64),
    ]);
    let result = map_collection(source, &ints(), scale(10)).unwrap();

    assert_eq!(
        result,
        Value::Sequence(vec![
            Value::leaf(10_i64),
            Value::leaf("keep".to_string()),
            Value::leaf(20_i64),
        ])
    );
}

#[rstest]
#[case(Value::Sequence(vec![]))]
#[case(Value::from(Mapping::dict()))]
#[case(Value::from(Mapping::new(MappingKind::Named("Batch"))))]
fn empty_containers_map_to_empty_containers(#[case] value: Value) {
    let result = map_collection(value.clone(), &ints(), scale(2)).unwrap();
    assert_eq!(result, value);
}

// =============================================================================
// Strings
// =============================================================================

#[rstest]
fn string_is_a_leaf_when_requested() {
    let result = map_collection(
        Value::leaf("hello".to_string()),
        &LeafTypes::of::<String>(),
        |value| match value.into_leaf::<String>() {
            Ok(text) => Value::leaf(text.to_uppercase()),
            Err(other) => other,
        },
    )
    .unwrap();
    assert_eq!(result, Value::leaf("HELLO".to_string()));
}

#[rstest]
fn string_is_never_decomposed() {
    let mut calls = 0;
    let result = map_collection(
        Value::leaf("hello".to_string()),
        &LeafTypes::of::<char>(),
        |value| {
            calls += 1;
            value
        },
    )
    .unwrap();
    assert_eq!(calls, 0);
    assert_eq!(result, Value::leaf("hello".to_string()));
}

// =============================================================================
// Nesting and priority
// =============================================================================

#[rstest]
fn nested_structures_recurse_fully() {
    let source = Value::from(Mapping::dict().with("a", vec![1_i64, 2]));
    let result = map_collection(source, &ints(), add(1)).unwrap();
    assert_eq!(
        result,
        Value::from(Mapping::dict().with("a", vec![2_i64, 3]))
    );
}

#[rstest]
fn deep_mixed_nesting() {
    let source = Value::Sequence(vec![
        Value::from(
            Mapping::ordered()
                .with("point", point(1, 2))
                .with("tags", vec!["a", "b"]),
        ),
        Value::Sequence(vec![Value::Sequence(vec![Value::leaf(5_i64)])]),
    ]);
    let expected = Value::Sequence(vec![
        Value::from(
            Mapping::ordered()
                .with("point", point(-1, -2))
                .with("tags", vec!["a", "b"]),
        ),
        Value::Sequence(vec![Value::Sequence(vec![Value::leaf(-5_i64)])]),
    ]);

    assert_eq!(map_collection(source, &ints(), scale(-1)).unwrap(), expected);
}

#[rstest]
fn leaf_match_takes_priority_over_structure() {
    let source = Value::from(Mapping::dict().with("inner", Mapping::dict().with("a", 1_i64)));
    let types = LeafTypes::kind(LeafType::Mapping);

    let result = map_collection(source, &types, |value| {
        Value::leaf(value.as_mapping().map_or(0, Mapping::len))
    })
    .unwrap();

    assert_eq!(result, Value::leaf(1_usize));
}

#[rstest]
fn multiple_leaf_types_are_alternatives() {
    let source = Value::Sequence(vec![
        Value::leaf(1_i64),
        Value::leaf(2.0_f64),
        Value::leaf("x".to_string()),
    ]);
    let types = LeafTypes::of::<i64>().or::<f64>();
    let result = map_collection(source, &types, |_| Value::Null).unwrap();
    assert_eq!(
        result,
        Value::Sequence(vec![Value::Null, Value::Null, Value::leaf("x".to_string())])
    );
}

// =============================================================================
// Failures
// =============================================================================

#[rstest]
fn function_error_propagates_unchanged() {
    let source = Value::from(Mapping::ordered().with("ok", 1_i64).with("bad", -1_i64));
    let result = apply_to_collection(source, &ints(), |value| {
        match value.downcast_ref::<i64>() {
            Some(number) if *number < 0 => Err(format!("negative value {number}")),
            _ => Ok(value),
        }
    });
    assert_eq!(
        result,
        Err(ApplyError::Function("negative value -1".to_string()))
    );
}
