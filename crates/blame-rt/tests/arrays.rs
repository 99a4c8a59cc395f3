//! Array contracts: lazy element checks, write blame, length growth,
//! and array operations seen through a guard.

use blame_rt::{array, wrap, Label, Type, Value};
use insta::assert_snapshot;

// ── Helpers ────────────────────────────────────────────────────────────

fn guard(value: Value, ty: &Type) -> Value {
    let p = Label::new(Some("p"));
    let q = Label::new(Some("q"));
    wrap(value, &p, &q, ty, ty).unwrap()
}

fn nums(ns: &[i32]) -> Value {
    Value::array(ns.iter().map(|n| Value::from(*n)).collect())
}

fn num_array(value: Value) -> Value {
    guard(value, &Type::arr(Type::num()))
}

// ── Laziness ───────────────────────────────────────────────────────────

#[test]
fn test_wrapping_ill_typed_array_is_lazy() {
    let arr = num_array(Value::array(vec![Value::from(1), Value::from("x")]));
    assert!(arr.is_array());
    assert_eq!(arr.len().unwrap(), 2);
    assert_eq!(arr.get(0).unwrap().as_num(), Some(1.0));
}

#[test]
fn test_reading_bad_element_blames_the_producer() {
    let arr = num_array(Value::array(vec![Value::from(1), Value::from("x")]));
    let err = arr.get(1).unwrap_err();
    assert!(err.is_violation());
    assert_snapshot!(err.to_string(), @r#"{+ p.get(1)} expected Num, got "x""#);
}

#[test]
fn test_string_index_is_checked_like_a_number() {
    let arr = num_array(Value::array(vec![Value::from("x")]));
    let err = arr.get("0").unwrap_err();
    assert_snapshot!(err.to_string(), @r#"{+ p.get(0)} expected Num, got "x""#);
}

#[test]
fn test_writing_bad_element_blames_the_consumer() {
    let arr = num_array(nums(&[1, 2]));
    let err = arr.set(0, Value::from("y")).unwrap_err();
    assert_snapshot!(err.to_string(), @r#"{+ q.set(0)} expected Num, got "y""#);
    // The rejected write never reached the array.
    assert_eq!(arr.get(0).unwrap().as_num(), Some(1.0));
    assert_eq!(arr.len().unwrap(), 2);
}

#[test]
fn test_good_writes_reach_the_target() {
    let raw = nums(&[1]);
    let arr = num_array(raw.clone());
    arr.set(1, Value::from(2)).unwrap();
    assert_eq!(raw.len().unwrap(), 2);
    assert_eq!(raw.get(1).unwrap().as_num(), Some(2.0));
}

#[test]
fn test_named_properties_pass_through() {
    let arr = num_array(nums(&[1]));
    arr.set("tag", Value::from("anything")).unwrap();
    assert_eq!(arr.get("tag").unwrap().as_str(), Some("anything"));
}

// ── Length ─────────────────────────────────────────────────────────────

#[test]
fn test_growing_length_with_undefined_blames_the_consumer() {
    let arr = num_array(nums(&[1, 2]));
    let err = arr.set_len(5).unwrap_err();
    assert_snapshot!(err.to_string(), @"{+ q.length} expected Num, got undefined");
    assert_eq!(arr.len().unwrap(), 2);
}

#[test]
fn test_shrinking_length_is_allowed() {
    let arr = num_array(nums(&[1, 2, 3]));
    arr.set_len(1).unwrap();
    assert_eq!(arr.len().unwrap(), 1);
}

#[test]
fn test_growing_length_is_fine_when_undefined_is_allowed() {
    let arr = guard(Value::array(vec![]), &Type::arr(Type::void()));
    arr.set_len(3).unwrap();
    assert_eq!(arr.len().unwrap(), 3);
}

// ── Nested ─────────────────────────────────────────────────────────────

#[test]
fn test_nested_arrays_accumulate_the_path() {
    let inner = Value::array(vec![Value::from(true)]);
    let arr = guard(Value::array(vec![inner]), &Type::arr(Type::arr(Type::num())));
    let row = arr.get(0).unwrap();
    let err = row.get(0).unwrap_err();
    assert_snapshot!(err.to_string(), @"{+ p.get(0).get(0)} expected Num, got true");
}

#[test]
fn test_array_of_functions_guards_each_element() {
    let id = Value::function("id", 1, |_, args| Ok(args[0].clone()));
    let ty = Type::arr(Type::fun(vec![Type::num()], Type::num()));
    let arr = guard(Value::array(vec![id]), &ty);
    let f = arr.get(0).unwrap();
    let err = f.call(vec![Value::from("s")]).unwrap_err();
    assert_snapshot!(err.to_string(), @r#"{- q.get(0).dom(0)} expected Num, got "s""#);
}

// ── Array operations ───────────────────────────────────────────────────

#[test]
fn test_map_reads_through_the_guard() {
    let arr = num_array(Value::array(vec![Value::from(1), Value::from("x")]));
    let double = Value::function("double", 1, |_, args| {
        Ok(Value::Num(args[0].as_num().unwrap_or(0.0) * 2.0))
    });
    let err = array::map(&arr, &double).unwrap_err();
    assert_snapshot!(err.to_string(), @r#"{+ p.get(1)} expected Num, got "x""#);
}

#[test]
fn test_map_result_is_unguarded() {
    let arr = num_array(nums(&[1, 2]));
    let double = Value::function("double", 1, |_, args| {
        Ok(Value::Num(args[0].as_num().unwrap_or(0.0) * 2.0))
    });
    let mapped = array::map(&arr, &double).unwrap();
    assert_eq!(array::join(&mapped, ",").unwrap(), "2,4");
    mapped.set(0, Value::from("free")).unwrap();
}

#[test]
fn test_push_checks_new_elements() {
    let arr = num_array(nums(&[1]));
    assert_eq!(array::push(&arr, vec![Value::from(2)]).unwrap(), 2);
    let err = array::push(&arr, vec![Value::from("z")]).unwrap_err();
    assert_snapshot!(err.to_string(), @r#"{+ q.set(2)} expected Num, got "z""#);
}

#[test]
fn test_pop_checks_the_removed_element() {
    let arr = num_array(Value::array(vec![Value::from(1), Value::from("x")]));
    let err = array::pop(&arr).unwrap_err();
    assert!(err.is_violation());
}

#[test]
fn test_concat_result_is_unguarded() {
    let arr = num_array(nums(&[1, 2]));
    let joined = array::concat(&arr, &[Value::array(vec![Value::from("x")])]).unwrap();
    assert_eq!(joined.len().unwrap(), 3);
    joined.set(0, Value::from("free")).unwrap();
    assert_eq!(array::join(&joined, "-").unwrap(), "free-2-x");
}

#[test]
fn test_reverse_returns_the_guarded_receiver() {
    let arr = num_array(nums(&[1, 2, 3]));
    let reversed = array::reverse(&arr).unwrap();
    assert!(reversed.is_same(&arr));
    assert_eq!(array::join(&reversed, ",").unwrap(), "3,2,1");
    assert!(reversed.set(0, Value::from("z")).is_err());
}

#[test]
fn test_filter_and_reduce_see_checked_elements() {
    let arr = num_array(nums(&[1, 2, 3, 4]));
    let even = Value::function("even", 1, |_, args| {
        Ok(Value::Bool(args[0].as_num().is_some_and(|n| n % 2.0 == 0.0)))
    });
    let evens = array::filter(&arr, &even).unwrap();
    assert_eq!(array::join(&evens, ",").unwrap(), "2,4");
    let sum = Value::function("sum", 2, |_, args| {
        Ok(Value::Num(args[0].as_num().unwrap_or(0.0) + args[1].as_num().unwrap_or(0.0)))
    });
    assert_eq!(array::reduce(&arr, &sum, None).unwrap().as_num(), Some(10.0));
}

#[test]
fn test_index_of_and_slice_through_the_guard() {
    let arr = num_array(nums(&[5, 6, 7]));
    assert_eq!(array::index_of(&arr, &Value::from(6)).unwrap(), Some(1));
    assert_eq!(array::index_of(&arr, &Value::from(9)).unwrap(), None);
    let tail = array::slice(&arr, 1, None).unwrap();
    assert_eq!(array::join(&tail, ",").unwrap(), "6,7");
}

#[test]
fn test_to_json_reads_through_the_guard() {
    let arr = num_array(Value::array(vec![Value::from(1), Value::from("x")]));
    assert!(arr.to_json().unwrap_err().is_violation());
    let ok = num_array(nums(&[1, 2]));
    assert_eq!(ok.to_json().unwrap(), serde_json::json!([1, 2]));
}
