use std::rc::Rc;

use blame_common::{BlameError, Key, Label};
use blame_types::{ObjectType, Type};
use blame_value::{Class, Object, ObjectRef, Value};

use crate::wrap::wrap;

/// Guard for `Object`/`Object` contracts.
///
/// Only declared properties are checked; the contract is open, so any
/// other property is read and written unguarded.
pub struct ObjectGuard {
    target: ObjectRef,
    p: Label,
    q: Label,
    a: Rc<ObjectType>,
    b: Rc<ObjectType>,
}

impl ObjectGuard {
    pub fn new(
        target: ObjectRef,
        p: &Label,
        q: &Label,
        a: &Rc<ObjectType>,
        b: &Rc<ObjectType>,
    ) -> ObjectRef {
        Rc::new(ObjectGuard {
            target,
            p: p.clone(),
            q: q.clone(),
            a: a.clone(),
            b: b.clone(),
        })
    }

    fn field(&self, key: &Key) -> Option<(&Type, &Type)> {
        let name = key.to_name();
        Some((self.a.field(&name)?, self.b.field(&name)?))
    }
}

impl Object for ObjectGuard {
    fn class(&self) -> Class {
        self.target.class()
    }

    fn name(&self) -> Option<String> {
        self.target.name()
    }

    fn get(&self, key: &Key) -> Result<Value, BlameError> {
        let value = self.target.get(key)?;
        match self.field(key) {
            Some((ta, tb)) => wrap(value, &self.p.get(key.clone()), &self.q.get(key.clone()), ta, tb),
            None => Ok(value),
        }
    }

    fn set(&self, key: &Key, value: Value) -> Result<(), BlameError> {
        match self.field(key) {
            Some((ta, tb)) => {
                let checked =
                    wrap(value, &self.q.set(key.clone()), &self.p.set(key.clone()), tb, ta)?;
                self.target.set(key, checked)
            }
            None => self.target.set(key, value),
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
        self.target.set_length(len)
    }

    fn call(&self, this: Value, args: Vec<Value>) -> Result<Value, BlameError> {
        self.target.call(this, args)
    }

    fn construct_with(&self, this: Value, args: Vec<Value>) -> Result<Value, BlameError> {
        self.target.construct_with(this, args)
    }
}

/// Guard for `Dict`/`Dict` contracts: every key is checked.
pub struct DictGuard {
    target: ObjectRef,
    p: Label,
    q: Label,
    value_a: Type,
    value_b: Type,
}

impl DictGuard {
    pub fn new(target: ObjectRef, p: &Label, q: &Label, value_a: &Type, value_b: &Type) -> ObjectRef {
        Rc::new(DictGuard {
            target,
            p: p.clone(),
            q: q.clone(),
            value_a: value_a.clone(),
            value_b: value_b.clone(),
        })
    }
}

impl Object for DictGuard {
    fn class(&self) -> Class {
        self.target.class()
    }

    fn name(&self) -> Option<String> {
        self.target.name()
    }

    fn get(&self, key: &Key) -> Result<Value, BlameError> {
        let value = self.target.get(key)?;
        wrap(
            value,
            &self.p.get(key.clone()),
            &self.q.get(key.clone()),
            &self.value_a,
            &self.value_b,
        )
    }

    fn set(&self, key: &Key, value: Value) -> Result<(), BlameError> {
        let checked = wrap(
            value,
            &self.q.set(key.clone()),
            &self.p.set(key.clone()),
            &self.value_b,
            &self.value_a,
        )?;
        self.target.set(key, checked)
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
        self.target.set_length(len)
    }

    fn call(&self, this: Value, args: Vec<Value>) -> Result<Value, BlameError> {
        self.target.call(this, args)
    }

    fn construct_with(&self, this: Value, args: Vec<Value>) -> Result<Value, BlameError> {
        self.target.construct_with(this, args)
    }
}
