//! JSON interop.
//!
//! `from_json` builds plain, unguarded values. `to_json` walks a value
//! through its `Object` surface, so converting a guarded value checks
//! every element and property it reaches.

use blame_common::{BlameError, Key};
use serde_json::{Map, Number};

use crate::object::Class;
use crate::value::Value;

impl Value {
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Num(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::str(s),
            serde_json::Value::Array(items) => {
                Value::array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(props) => {
                Value::object(props.iter().map(|(k, v)| (k.clone(), Value::from_json(v))))
            }
        }
    }

    /// Convert to JSON. `undefined` and non-finite numbers become `null`
    /// inside arrays; `undefined` properties are omitted.
    pub fn to_json(&self) -> Result<serde_json::Value, BlameError> {
        match self {
            Value::Undefined | Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Value::Num(n) => Ok(num_to_json(*n)),
            Value::Str(s) => Ok(serde_json::Value::String(s.to_string())),
            Value::Token(_) => Err(BlameError::runtime("cannot convert a sealed value to JSON")),
            Value::Object(obj) => match obj.class() {
                Class::Function => Err(BlameError::runtime(format!(
                    "cannot convert {} to JSON",
                    self.preview()
                ))),
                Class::Array => {
                    let items = (0..obj.length())
                        .map(|i| obj.get(&Key::Index(i))?.to_json())
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(serde_json::Value::Array(items))
                }
                Class::Object => {
                    let mut map = Map::new();
                    for key in obj.keys() {
                        let v = obj.get(&key)?;
                        if matches!(v, Value::Undefined) {
                            continue;
                        }
                        map.insert(key.to_name(), v.to_json()?);
                    }
                    Ok(serde_json::Value::Object(map))
                }
            },
        }
    }
}

fn num_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        serde_json::Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}
