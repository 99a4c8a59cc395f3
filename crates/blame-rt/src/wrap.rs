//! The wrap engine.
//!
//! `wrap(value, p, q, A, B)` guards `value` so that it behaves as `A`
//! claims (blaming the producer `p` when it does not) while being used
//! only as `B` allows (blaming the consumer `q` when it is not).
//! Primitives are checked on the spot and returned as they are; reference
//! values come back inside a guard of the same shape that checks every
//! later access.
//!
//! Dispatch is on the pair of (lazily resolved) types:
//!
//! | asserted / expected | result |
//! |---|---|
//! | `any` / `any` | the value |
//! | `any` / bound `X` | the value sealed in `X`'s store |
//! | bound `X` / `any` | the value unsealed from `X`'s store |
//! | `any` / `T`, `T` / `any` | guarded as `T` / `T` |
//! | same kind, compatible | checked or guarded per kind |
//! | anything else | configuration error |

use blame_common::{BlameError, ConfigError, Label};
use blame_types::{compatible, BoundVar, Type};
use blame_value::{Class, ObjectRef, Value};
use tracing::{debug, trace};

use crate::guard::{ArrayGuard, DictGuard, ForallGuard, FunctionGuard, ObjectGuard};
use crate::probe;

/// Guard `value`, asserted by `p` to be an `a`, for use by `q` as a `b`.
pub fn wrap(value: Value, p: &Label, q: &Label, a: &Type, b: &Type) -> Result<Value, BlameError> {
    let a = a.resolve()?;
    let b = b.resolve()?;
    trace!(asserted = %a, expected = %b, value = %value, "wrap");
    match (&a, &b) {
        (Type::Var(name), _) | (_, Type::Var(name)) => {
            Err(ConfigError::UnboundTypeVariable(name.to_string()).into())
        }
        (Type::Any, Type::Any) => Ok(value),
        (Type::Any, Type::Bound(bv)) => Ok(Value::Token(bv.store().seal(value))),
        (Type::Bound(bv), Type::Any) => unseal(value, p, bv),
        (Type::Bound(x), Type::Bound(y)) if x.same(y) => Ok(value),
        (Type::Bound(_), _) | (_, Type::Bound(_)) => Err(incompatible(&a, &b)),
        (Type::Any, _) => wrap_same_kind(value, p, q, &b, &b),
        (_, Type::Any) => wrap_same_kind(value, p, q, &a, &a),
        _ if !compatible(&a, &b) => Err(incompatible(&a, &b)),
        _ => wrap_same_kind(value, p, q, &a, &b),
    }
}

/// Both types are resolved, of the same kind, and compatible.
fn wrap_same_kind(
    value: Value,
    p: &Label,
    q: &Label,
    a: &Type,
    b: &Type,
) -> Result<Value, BlameError> {
    match (a, b) {
        (Type::Base(base), Type::Base(_)) => {
            if base.accepts(&value) {
                Ok(value)
            } else {
                Err(blame(p, expected(a, &value)))
            }
        }
        (Type::Function(fa), Type::Function(fb)) => {
            let target = require(value, Class::Function, p, a)?;
            Ok(Value::Object(FunctionGuard::new(target, p, q, fa, fb)))
        }
        (Type::Forall(fa), Type::Forall(fb)) => {
            let target = require(value, Class::Function, p, a)?;
            Ok(Value::Object(ForallGuard::new(target, p, q, fa, fb)))
        }
        (Type::Array(ea), Type::Array(eb)) => {
            let target = require(value, Class::Array, p, a)?;
            Ok(Value::Object(ArrayGuard::new(target, p, q, ea, eb)))
        }
        (Type::Object(oa), Type::Object(ob)) => {
            let target = require_object(value, p, a)?;
            Ok(Value::Object(ObjectGuard::new(target, p, q, oa, ob)))
        }
        (Type::Dict(va), Type::Dict(vb)) => {
            let target = require_object(value, p, a)?;
            Ok(Value::Object(DictGuard::new(target, p, q, va, vb)))
        }
        (Type::Hybrid(la, ra), Type::Hybrid(lb, rb)) => {
            let left = wrap(value, p, q, la, lb)?;
            wrap(left, p, q, ra, rb)
        }
        (Type::Union(ma), Type::Union(mb)) => probe::wrap_union(value, p, q, a, ma, mb),
        _ => Err(incompatible(a, b)),
    }
}

fn unseal(value: Value, p: &Label, bv: &BoundVar) -> Result<Value, BlameError> {
    bv.store().unseal(&value).map_err(|err| {
        debug!(label = %p, var = bv.name(), store = bv.store().id(), "seal violation");
        BlameError::seal_violation(p, err.to_string())
    })
}

fn require(value: Value, class: Class, p: &Label, ty: &Type) -> Result<ObjectRef, BlameError> {
    match value {
        Value::Object(obj) if obj.class() == class => Ok(obj),
        other => Err(blame(p, expected(ty, &other))),
    }
}

fn require_object(value: Value, p: &Label, ty: &Type) -> Result<ObjectRef, BlameError> {
    match value {
        Value::Object(obj) => Ok(obj),
        other => Err(blame(p, expected(ty, &other))),
    }
}

pub(crate) fn expected(ty: &Type, value: &Value) -> String {
    format!("expected {}, got {}", ty, value.preview())
}

/// Raise a contract violation at `label`.
pub(crate) fn blame(label: &Label, note: String) -> BlameError {
    debug!(label = %label, note = %note, "contract violation");
    BlameError::Violation {
        label: label.clone(),
        note,
    }
}

pub(crate) fn incompatible(a: &Type, b: &Type) -> BlameError {
    ConfigError::IncompatibleTypes {
        left: a.description(),
        right: b.description(),
    }
    .into()
}
