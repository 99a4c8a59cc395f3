//! The reference-value capability surface and its plain implementations.
//!
//! Every reference value, guarded or not, is an `Rc<dyn Object>`. The
//! trait is the whole surface a guard can intercept: keyed reads and
//! writes, array length, calls and construction. A guard implements the
//! methods it checks and forwards the rest to the value it decorates.
//!
//! Keys reaching these methods are canonical (see [`Key::canonical`]):
//! a name that spells an index always arrives as `Key::Index`.

use std::cell::RefCell;
use std::rc::Rc;

use blame_common::{BlameError, Key, MAX_LENGTH};
use indexmap::IndexMap;

use crate::value::Value;

pub type ObjectRef = Rc<dyn Object>;

/// The body of a native function: `(this, args) -> result`.
pub type NativeFn = dyn Fn(Value, Vec<Value>) -> Result<Value, BlameError>;

/// The shape of a reference value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Class {
    Object,
    Array,
    Function,
}

pub trait Object {
    fn class(&self) -> Class;

    /// Function name, for messages.
    fn name(&self) -> Option<String> {
        None
    }

    fn get(&self, key: &Key) -> Result<Value, BlameError>;

    fn set(&self, key: &Key, value: Value) -> Result<(), BlameError>;

    fn has(&self, key: &Key) -> bool;

    /// Own keys: element indices first, then named properties in
    /// insertion order.
    fn keys(&self) -> Vec<Key>;

    fn length(&self) -> usize {
        0
    }

    fn set_length(&self, _len: usize) -> Result<(), BlameError> {
        Err(BlameError::runtime("cannot set the length of a non-array"))
    }

    fn call(&self, _this: Value, _args: Vec<Value>) -> Result<Value, BlameError> {
        Err(BlameError::runtime("value is not a function"))
    }

    /// Run this value as a constructor against the receiver `this`.
    ///
    /// Returns the produced instance: the body's result when it is an
    /// object, otherwise the receiver.
    fn construct_with(&self, _this: Value, _args: Vec<Value>) -> Result<Value, BlameError> {
        Err(BlameError::runtime("value is not a constructor"))
    }
}

/// Named properties shared by every plain value.
#[derive(Default)]
struct Props(RefCell<IndexMap<String, Value>>);

impl Props {
    fn get(&self, key: &Key) -> Value {
        self.0
            .borrow()
            .get(&key.to_name())
            .cloned()
            .unwrap_or(Value::Undefined)
    }

    fn set(&self, key: &Key, value: Value) {
        self.0.borrow_mut().insert(key.to_name(), value);
    }

    fn has(&self, key: &Key) -> bool {
        self.0.borrow().contains_key(&key.to_name())
    }

    fn keys(&self) -> Vec<Key> {
        self.0
            .borrow()
            .keys()
            .map(|k| Key::Name(k.clone()).canonical())
            .collect()
    }
}

/// An insertion-ordered bag of properties.
#[derive(Default)]
pub struct PlainObject {
    props: Props,
}

impl PlainObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_props<K: Into<String>>(props: impl IntoIterator<Item = (K, Value)>) -> Self {
        let obj = PlainObject::new();
        for (k, v) in props {
            obj.props.set(&Key::Name(k.into()), v);
        }
        obj
    }
}

impl Object for PlainObject {
    fn class(&self) -> Class {
        Class::Object
    }

    fn get(&self, key: &Key) -> Result<Value, BlameError> {
        Ok(self.props.get(key))
    }

    fn set(&self, key: &Key, value: Value) -> Result<(), BlameError> {
        self.props.set(key, value);
        Ok(())
    }

    fn has(&self, key: &Key) -> bool {
        self.props.has(key)
    }

    fn keys(&self) -> Vec<Key> {
        self.props.keys()
    }
}

/// A growable array. Also carries named properties, so it can satisfy
/// an array-with-extra-properties contract.
#[derive(Default)]
pub struct PlainArray {
    elems: RefCell<Vec<Value>>,
    props: Props,
}

impl PlainArray {
    pub fn new(elems: Vec<Value>) -> Self {
        PlainArray {
            elems: RefCell::new(elems),
            props: Props::default(),
        }
    }
}

impl Object for PlainArray {
    fn class(&self) -> Class {
        Class::Array
    }

    fn get(&self, key: &Key) -> Result<Value, BlameError> {
        match key {
            Key::Index(i) => Ok(self.elems.borrow().get(*i).cloned().unwrap_or(Value::Undefined)),
            Key::Name(_) => Ok(self.props.get(key)),
        }
    }

    fn set(&self, key: &Key, value: Value) -> Result<(), BlameError> {
        match key {
            Key::Index(i) => {
                let mut elems = self.elems.borrow_mut();
                if *i >= elems.len() {
                    grow(&mut elems, i.saturating_add(1))?;
                }
                elems[*i] = value;
            }
            Key::Name(_) => self.props.set(key, value),
        }
        Ok(())
    }

    fn has(&self, key: &Key) -> bool {
        match key {
            Key::Index(i) => *i < self.elems.borrow().len(),
            Key::Name(_) => self.props.has(key),
        }
    }

    fn keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = (0..self.elems.borrow().len()).map(Key::Index).collect();
        keys.extend(self.props.keys());
        keys
    }

    fn length(&self) -> usize {
        self.elems.borrow().len()
    }

    fn set_length(&self, len: usize) -> Result<(), BlameError> {
        let mut elems = self.elems.borrow_mut();
        if len > elems.len() {
            grow(&mut elems, len)
        } else {
            elems.truncate(len);
            Ok(())
        }
    }
}

/// Extend `elems` to `len` with `undefined`, failing instead of aborting
/// when the length is out of range or cannot be allocated.
fn grow(elems: &mut Vec<Value>, len: usize) -> Result<(), BlameError> {
    if len > MAX_LENGTH {
        return Err(BlameError::runtime(format!("invalid array length {}", len)));
    }
    elems
        .try_reserve(len - elems.len())
        .map_err(|_| BlameError::runtime(format!("cannot allocate an array of length {}", len)))?;
    elems.resize(len, Value::Undefined);
    Ok(())
}

/// A function implemented in Rust.
pub struct NativeFunction {
    name: String,
    arity: usize,
    body: Box<NativeFn>,
    props: Props,
}

impl NativeFunction {
    pub fn new<F>(name: &str, arity: usize, body: F) -> Self
    where
        F: Fn(Value, Vec<Value>) -> Result<Value, BlameError> + 'static,
    {
        NativeFunction {
            name: name.to_string(),
            arity,
            body: Box::new(body),
            props: Props::default(),
        }
    }

    /// Declared parameter count.
    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl Object for NativeFunction {
    fn class(&self) -> Class {
        Class::Function
    }

    fn name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn get(&self, key: &Key) -> Result<Value, BlameError> {
        Ok(self.props.get(key))
    }

    fn set(&self, key: &Key, value: Value) -> Result<(), BlameError> {
        self.props.set(key, value);
        Ok(())
    }

    fn has(&self, key: &Key) -> bool {
        self.props.has(key)
    }

    fn keys(&self) -> Vec<Key> {
        self.props.keys()
    }

    fn call(&self, this: Value, args: Vec<Value>) -> Result<Value, BlameError> {
        (self.body)(this, args)
    }

    fn construct_with(&self, this: Value, args: Vec<Value>) -> Result<Value, BlameError> {
        let result = (self.body)(this.clone(), args)?;
        Ok(if result.is_object() { result } else { this })
    }
}
