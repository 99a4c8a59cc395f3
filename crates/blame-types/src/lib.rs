//! Contract types.
//!
//! - [`ty`]: the `Type` enum, constructors, descriptions, compatibility
//! - [`subst`]: capture-avoiding substitution and free variables
//! - [`lazy`]: the registry that makes recursive definitions possible

pub mod lazy;
pub mod subst;
pub mod ty;

pub use lazy::{LazyType, LazyTypeCache};
pub use ty::{compatible, BaseType, BoundVar, ForallType, FunctionType, ObjectType, Type};
