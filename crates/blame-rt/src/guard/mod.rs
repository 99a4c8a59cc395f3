//! Guards: decorators that enforce a contract on every access.
//!
//! Each guard owns the value it decorates plus the two blame labels and
//! the asserted/expected types for its shape. It implements the whole
//! [`Object`](blame_value::Object) surface, checks the operations its
//! contract covers, and forwards everything else untouched. Guards are
//! themselves values, so they nest: a hybrid contract is simply one
//! guard wrapped around another.

mod array;
mod function;
mod object;

pub use array::ArrayGuard;
pub use function::{ForallGuard, FunctionGuard};
pub use object::{DictGuard, ObjectGuard};
