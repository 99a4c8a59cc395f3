//! Recursive contracts built through the lazy type registry.

use blame_rt::{wrap, BlameError, ConfigError, Label, LazyTypeCache, Type, Value};
use insta::assert_snapshot;

// ── Helpers ────────────────────────────────────────────────────────────

fn check(value: Value, ty: &Type) -> Result<Value, BlameError> {
    let p = Label::new(Some("p"));
    let q = Label::new(Some("q"));
    wrap(value, &p, &q, ty, ty)
}

/// `List = {head: Num, tail: List | Null}`
fn list_type(cache: &mut LazyTypeCache) -> Type {
    let list = cache.get("List");
    let tail = Type::union(vec![list, Type::null()]).unwrap();
    cache
        .set("List", Type::obj([("head", Type::num()), ("tail", tail)]))
        .unwrap();
    cache.get("List")
}

fn cons(head: Value, tail: Value) -> Value {
    Value::object([("head", head), ("tail", tail)])
}

// ── Registry ───────────────────────────────────────────────────────────

#[test]
fn test_registry_verification() {
    let mut cache = LazyTypeCache::new();
    assert!(cache.verify());
    let _ = cache.get("T");
    assert!(!cache.verify());
    cache.set("T", Type::num()).unwrap();
    let _ = cache.get("T");
    let _ = cache.get("T");
    assert!(cache.verify());
}

// ── Wrapping ───────────────────────────────────────────────────────────

#[test]
fn test_well_typed_list_reads_cleanly() {
    let mut cache = LazyTypeCache::new();
    let ty = list_type(&mut cache);
    let list = cons(Value::from(1), cons(Value::from(2), Value::Null));
    let list = check(list, &ty).unwrap();
    let second = list.get("tail").unwrap();
    assert_eq!(second.get("head").unwrap().as_num(), Some(2.0));
    assert!(matches!(second.get("tail").unwrap(), Value::Null));
}

#[test]
fn test_deep_violation_carries_the_whole_path() {
    let mut cache = LazyTypeCache::new();
    let ty = list_type(&mut cache);
    let list = cons(Value::from(1), cons(Value::from("x"), Value::Null));
    let list = check(list, &ty).unwrap();
    let err = list.get("tail").unwrap().get("head").unwrap_err();
    assert_snapshot!(err.to_string(), @r#"{+ p.get(tail).get(head)} expected Num, got "x""#);
}

#[test]
fn test_bad_tail_fails_branch_selection() {
    let mut cache = LazyTypeCache::new();
    let ty = list_type(&mut cache);
    let list = check(cons(Value::from(1), Value::from(0)), &ty).unwrap();
    let err = list.get("tail").unwrap_err();
    assert_snapshot!(
        err.to_string(),
        @"{+ p.get(tail).union} no matching union branch, expected List | Null, got 0"
    );
}

#[test]
fn test_recursive_array_type() {
    // Tree = [Num | Tree]
    let mut cache = LazyTypeCache::new();
    let tree = cache.get("Tree");
    let node = Type::union(vec![Type::num(), tree]).unwrap();
    cache.set("Tree", Type::arr(node)).unwrap();
    let tree = cache.get("Tree");
    let value = Value::array(vec![
        Value::from(1),
        Value::array(vec![Value::from(2), Value::from(true)]),
    ]);
    let value = check(value, &tree).unwrap();
    let inner = value.get(1).unwrap();
    assert_eq!(inner.get(0).unwrap().as_num(), Some(2.0));
    let err = inner.get(1).unwrap_err();
    assert_snapshot!(
        err.to_string(),
        @"{+ p.get(1).get(1).union} no matching union branch, expected Num | Tree, got true"
    );
}

#[test]
fn test_self_reference_through_union_is_rejected_before_wrapping() {
    let mut cache = LazyTypeCache::new();
    let x = cache.get("X");
    let err = cache
        .set("X", Type::union(vec![x, Type::null()]).unwrap())
        .unwrap_err();
    assert_eq!(err, ConfigError::UnguardedRecursion("X".into()));
    // The name stays unbound, so wrapping through it is a configuration
    // error rather than an endless probe.
    let err = check(Value::from(1), &cache.get("X")).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_self_reference_through_hybrid_is_rejected() {
    let mut cache = LazyTypeCache::new();
    let x = cache.get("X");
    let err = cache.set("X", Type::hybrid(x, Type::num())).unwrap_err();
    assert_eq!(err, ConfigError::UnguardedRecursion("X".into()));
    assert!(!cache.verify());
}

#[test]
fn test_unresolved_type_is_a_configuration_error() {
    let mut cache = LazyTypeCache::new();
    let pending = cache.get("Pending");
    let err = check(Value::from(1), &pending).unwrap_err();
    assert!(err.is_configuration());
    assert!(matches!(
        err,
        BlameError::Config(ConfigError::UnresolvedLazyType(ref name)) if name == "Pending"
    ));
}

#[test]
fn test_unresolved_type_deep_inside_fails_on_access() {
    let mut cache = LazyTypeCache::new();
    let ty = Type::arr(cache.get("Later"));
    let arr = check(Value::array(vec![Value::from(1)]), &ty).unwrap();
    assert!(arr.get(0).unwrap_err().is_configuration());
    cache.set("Later", Type::num()).unwrap();
    assert_eq!(arr.get(0).unwrap().as_num(), Some(1.0));
}
