use std::rc::Rc;

use blame_common::{BlameError, Key, Label};
use blame_types::Type;
use blame_value::{Class, Object, ObjectRef, Value};

use crate::wrap::wrap;

/// Guard for `Array`/`Array` contracts.
///
/// Element reads are covariant (`p.get(i)`), element writes contravariant
/// (`q.set(i)`). Named properties and the length pass through, except
/// that growing the array by writing its length must not introduce
/// `undefined` elements the element type rejects.
pub struct ArrayGuard {
    target: ObjectRef,
    p: Label,
    q: Label,
    elem_a: Type,
    elem_b: Type,
}

impl ArrayGuard {
    pub fn new(target: ObjectRef, p: &Label, q: &Label, elem_a: &Type, elem_b: &Type) -> ObjectRef {
        Rc::new(ArrayGuard {
            target,
            p: p.clone(),
            q: q.clone(),
            elem_a: elem_a.clone(),
            elem_b: elem_b.clone(),
        })
    }
}

impl Object for ArrayGuard {
    fn class(&self) -> Class {
        self.target.class()
    }

    fn name(&self) -> Option<String> {
        self.target.name()
    }

    fn get(&self, key: &Key) -> Result<Value, BlameError> {
        let value = self.target.get(key)?;
        match key {
            Key::Index(i) => wrap(value, &self.p.get(*i), &self.q.get(*i), &self.elem_a, &self.elem_b),
            Key::Name(_) => Ok(value),
        }
    }

    fn set(&self, key: &Key, value: Value) -> Result<(), BlameError> {
        match key {
            Key::Index(i) => {
                let checked =
                    wrap(value, &self.q.set(*i), &self.p.set(*i), &self.elem_b, &self.elem_a)?;
                self.target.set(key, checked)
            }
            Key::Name(_) => self.target.set(key, value),
        }
    }

    fn has(&self, key: &Key) -> bool {
        self.target.has(key)
    }

    fn keys(&self) -> Vec<Key> {
        self.target.keys()
    }

    fn length(&self) -> usize {
        self.target.length()
    }

    fn set_length(&self, len: usize) -> Result<(), BlameError> {
        if len > self.target.length() {
            wrap(
                Value::Undefined,
                &self.q.length(),
                &self.p.length(),
                &self.elem_b,
                &self.elem_a,
            )?;
        }
        self.target.set_length(len)
    }

    fn call(&self, this: Value, args: Vec<Value>) -> Result<Value, BlameError> {
        self.target.call(this, args)
    }

    fn construct_with(&self, this: Value, args: Vec<Value>) -> Result<Value, BlameError> {
        self.target.construct_with(this, args)
    }
}
