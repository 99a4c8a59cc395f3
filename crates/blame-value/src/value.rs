//! The dynamic `Value` type.

use std::fmt;
use std::rc::Rc;

use blame_common::{config, BlameError, Key};

use crate::object::{Class, NativeFunction, ObjectRef, PlainArray, PlainObject};
use crate::seal::Token;

/// A dynamic value.
///
/// Primitives are compared by value; `Object` holds a shared reference
/// and is compared by identity (see [`Value::is_same`]).
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Num(f64),
    Str(Rc<str>),
    Object(ObjectRef),
    /// A value sealed by a forall instantiation.
    Token(Token),
}

impl Value {
    pub fn str(s: &str) -> Value {
        Value::Str(Rc::from(s))
    }

    /// A new plain array holding `items`.
    pub fn array(items: Vec<Value>) -> Value {
        Value::Object(Rc::new(PlainArray::new(items)))
    }

    /// A new plain object with the given properties, in order.
    pub fn object<K: Into<String>>(props: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::Object(Rc::new(PlainObject::from_props(props)))
    }

    /// A native function. `body` receives the `this` receiver and the
    /// argument list.
    pub fn function<F>(name: &str, arity: usize, body: F) -> Value
    where
        F: Fn(Value, Vec<Value>) -> Result<Value, BlameError> + 'static,
    {
        Value::Object(Rc::new(NativeFunction::new(name, arity, body)))
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn class(&self) -> Option<Class> {
        self.as_object().map(|o| o.class())
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_array(&self) -> bool {
        self.class() == Some(Class::Array)
    }

    pub fn is_callable(&self) -> bool {
        self.class() == Some(Class::Function)
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Value::Token(t) => Some(t),
            _ => None,
        }
    }

    /// The `typeof` tag of this value.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::Object(o) if o.class() == Class::Function => "function",
            Value::Object(_) => "object",
            Value::Token(_) => "sealed",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Num(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Object(_) | Value::Token(_) => true,
        }
    }

    /// SameValue identity: primitives by value (NaN is the same as NaN),
    /// reference values and tokens by identity.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => {
                (a.is_nan() && b.is_nan()) || (a == b && a.is_sign_negative() == b.is_sign_negative())
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Token(a), Value::Token(b)) => a == b,
            _ => false,
        }
    }

    fn receiver(&self, action: &str) -> Result<&ObjectRef, BlameError> {
        self.as_object().ok_or_else(|| {
            BlameError::runtime(format!("cannot {} {}", action, self.preview()))
        })
    }

    pub fn get(&self, key: impl Into<Key>) -> Result<Value, BlameError> {
        let key = key.into().canonical();
        self.receiver(&format!("read property {} of", key))?.get(&key)
    }

    pub fn set(&self, key: impl Into<Key>, value: Value) -> Result<(), BlameError> {
        let key = key.into().canonical();
        self.receiver(&format!("set property {} of", key))?.set(&key, value)
    }

    pub fn has(&self, key: impl Into<Key>) -> bool {
        let key = key.into().canonical();
        self.as_object().is_some_and(|o| o.has(&key))
    }

    pub fn keys(&self) -> Result<Vec<Key>, BlameError> {
        Ok(self.receiver("list the keys of")?.keys())
    }

    /// Array length; zero for non-array objects.
    pub fn len(&self) -> Result<usize, BlameError> {
        Ok(self.receiver("read the length of")?.length())
    }

    pub fn set_len(&self, len: usize) -> Result<(), BlameError> {
        self.receiver("set the length of")?.set_length(len)
    }

    /// Call with an `undefined` receiver.
    pub fn call(&self, args: Vec<Value>) -> Result<Value, BlameError> {
        self.call_with(Value::Undefined, args)
    }

    pub fn call_with(&self, this: Value, args: Vec<Value>) -> Result<Value, BlameError> {
        self.receiver("call")?.call(this, args)
    }

    /// Use this value as a constructor on a fresh plain object.
    pub fn construct(&self, args: Vec<Value>) -> Result<Value, BlameError> {
        self.construct_with(Value::object(Vec::<(String, Value)>::new()), args)
    }

    pub fn construct_with(&self, this: Value, args: Vec<Value>) -> Result<Value, BlameError> {
        self.receiver("construct")?.construct_with(this, args)
    }

    /// Short rendering used in blame messages.
    pub fn preview(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Num(n) => format_num(*n),
            Value::Str(s) => {
                let limit = config::current().preview_limit;
                if s.chars().count() > limit {
                    let shown: String = s.chars().take(limit).collect();
                    format!("{:?}...", shown)
                } else {
                    format!("{:?}", s)
                }
            }
            Value::Object(o) => match o.class() {
                Class::Array => "[array]".to_string(),
                Class::Object => "[object]".to_string(),
                Class::Function => match o.name() {
                    Some(name) if !name.is_empty() => format!("[function {}]", name),
                    _ => "[function]".to_string(),
                },
            },
            Value::Token(_) => "<sealed>".to_string(),
        }
    }

    /// String conversion used by `join`.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Undefined | Value::Null => String::new(),
            Value::Str(s) => s.to_string(),
            other => other.preview(),
        }
    }
}

pub(crate) fn format_num(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.preview())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.preview())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Num(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}
