//! Dynamic values for the blame contract engine.
//!
//! Contracts are enforced over a small JavaScript-like value universe:
//! primitives, plus shared reference values (plain objects, arrays and
//! native functions) that all expose one capability surface, the
//! [`Object`] trait. Guards in `blame-rt` implement the same trait, so a
//! guarded array is indexed, and a guarded function called, exactly like
//! the value it decorates.
//!
//! ## Modules
//!
//! - [`value`]: the `Value` enum and its access helpers
//! - [`object`]: the `Object` trait and its plain implementations
//! - [`array`]: array operations written against the capability surface
//! - [`json`]: conversion to and from `serde_json::Value`
//! - [`seal`]: sealing stores and the opaque tokens they hand out

pub mod array;
pub mod json;
pub mod object;
pub mod seal;
pub mod value;

pub use object::{Class, NativeFunction, Object, ObjectRef, PlainArray, PlainObject};
pub use seal::{SealError, SealStore, Token};
pub use value::Value;
