//! Runtime contract enforcement with blame.
//!
//! [`wrap`] attaches a contract to a value. The result behaves like the
//! original value, but every observation made through it is checked
//! against the asserted type `A` and the expected type `B`; a failed
//! check names the party at fault with a [`Label`] whose path says where
//! inside the value the failure happened.
//!
//! ```text
//! let f = wrap(f, &p, &q, &Type::fun(vec![Type::num()], Type::num()), ..)?;
//! f.call(vec![Value::from("x")])  // Err: {- q.dom(0)} expected Num, got "x"
//! ```
//!
//! Polymorphic contracts (`forall X. ...`) are enforced by sealing: every
//! call of a guarded function gets its own store, so the function can
//! only hand back the values it was given by that very call.
//!
//! ## Modules
//!
//! - `wrap`: dispatch on the (asserted, expected) type pair
//! - `guard`: the decorators for functions, arrays, objects and dicts
//! - [`probe`]: shallow union branch selection

mod guard;
pub mod probe;
mod wrap;

pub use blame_common::{config, BlameError, ConfigError, EngineConfig, Key, Label, Polarity};
pub use blame_types::{FunctionType, LazyTypeCache, Type};
pub use blame_value::{array, Object, ObjectRef, SealStore, Token, Value};
pub use wrap::wrap;

/// Wrap with a fresh anonymous label as producer and its negation as
/// consumer: `value` is both asserted and expected to be a `ty`.
pub fn simple_wrap(value: Value, ty: &Type) -> Result<Value, BlameError> {
    let p = Label::new(None);
    let q = p.negated();
    wrap(value, &p, &q, ty, ty)
}
