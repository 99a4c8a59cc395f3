//! Union branch selection.
//!
//! Choosing a union member must not disturb the value, so members are
//! tested with a shallow probe that only looks at what is visible right
//! now: base predicates, the shape of a reference value, and for object
//! members the presence of the declared keys. Element and field types
//! are never inspected, which is why two array members always tie.

use blame_common::{BlameError, ConfigError, Label};
use blame_types::Type;
use blame_value::Value;

use crate::wrap::{blame, incompatible, wrap};

/// Whether `ty` accepts `value` on the surface.
pub fn accepts(value: &Value, ty: &Type) -> Result<bool, BlameError> {
    let ty = ty.resolve()?;
    let ok = match &ty {
        Type::Any => true,
        Type::Base(base) => base.accepts(value),
        Type::Function(_) | Type::Forall(_) => value.is_callable(),
        Type::Array(_) => value.is_array(),
        Type::Object(obj) => {
            value.is_object() && obj.fields().iter().all(|(name, _)| value.has(name.as_str()))
        }
        Type::Dict(_) => value.is_object(),
        Type::Hybrid(left, right) => accepts(value, left)? && accepts(value, right)?,
        Type::Union(members) => {
            for m in members.iter() {
                if accepts(value, m)? {
                    return Ok(true);
                }
            }
            false
        }
        Type::Bound(bv) => value.as_token().is_some_and(|t| bv.store().owns(t)),
        Type::Var(name) => return Err(ConfigError::UnboundTypeVariable(name.to_string()).into()),
        Type::Lazy(_) => {
            return Err(ConfigError::UnresolvedLazyType(ty.description()).into())
        }
    };
    Ok(ok)
}

/// Guard `value` against the single member of `union` that accepts it.
pub(crate) fn wrap_union(
    value: Value,
    p: &Label,
    q: &Label,
    union: &Type,
    asserted: &[Type],
    expected: &[Type],
) -> Result<Value, BlameError> {
    if asserted.len() != expected.len() {
        return Err(incompatible(union, &Type::Union(expected.to_vec().into())));
    }
    let mut matches = Vec::new();
    for (i, member) in asserted.iter().enumerate() {
        if accepts(&value, member)? {
            matches.push(i);
        }
    }
    match matches.as_slice() {
        [] => Err(blame(
            &p.l(),
            format!(
                "no matching union branch, expected {}, got {}",
                union,
                value.preview()
            ),
        )),
        [i] => wrap(value, p, q, &asserted[*i], &expected[*i]),
        _ => Err(ConfigError::AmbiguousUnion {
            label: p.l(),
            union: union.description(),
            matches: matches.len(),
            value: value.preview(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probes_are_shallow() {
        let arr = Value::array(vec![Value::from("not a number")]);
        assert!(accepts(&arr, &Type::arr(Type::num())).unwrap());
        // Arrays are objects, so a dict member accepts them too.
        assert!(accepts(&arr, &Type::dict(Type::num())).unwrap());
        assert!(!accepts(&Value::from(1), &Type::arr(Type::num())).unwrap());
    }

    #[test]
    fn object_probe_checks_declared_keys() {
        let point = Value::object([("x", Value::from(1))]);
        assert!(accepts(&point, &Type::obj([("x", Type::str())])).unwrap());
        assert!(!accepts(&point, &Type::obj([("y", Type::num())])).unwrap());
    }

    #[test]
    fn unresolved_lazy_member_is_a_configuration_error() {
        let mut cache = blame_types::LazyTypeCache::new();
        let later = cache.get("Later");
        let err = accepts(&Value::from(1), &later).unwrap_err();
        assert_eq!(err, BlameError::from(ConfigError::UnresolvedLazyType("Later".into())));
    }

    #[test]
    fn probe_of_free_variable_is_a_configuration_error() {
        let err = accepts(&Value::from(1), &Type::tyvar("X")).unwrap_err();
        assert!(err.is_configuration());
    }
}
