//! Array operations.
//!
//! Every operation reads and writes elements through the receiver's
//! [`Object`](crate::Object) surface, never around it. When the receiver
//! is a guarded array each element it touches is therefore checked, and
//! callbacks only ever see checked (and, for higher-order element types,
//! guarded) elements.
//!
//! `map`, `filter`, `concat` and `slice` build new plain arrays that
//! carry no contract. `push`, `pop` and `reverse` work in place, and
//! `reverse` hands back the receiver itself, guard included.

use blame_common::BlameError;

use crate::object::ObjectRef;
use crate::value::Value;

fn receiver<'a>(arr: &'a Value, op: &str) -> Result<&'a ObjectRef, BlameError> {
    match arr.as_object() {
        Some(obj) if arr.is_array() => Ok(obj),
        _ => Err(BlameError::runtime(format!(
            "{} called on non-array {}",
            op,
            arr.preview()
        ))),
    }
}

fn elements(arr: &Value, op: &str) -> Result<Vec<Value>, BlameError> {
    let obj = receiver(arr, op)?;
    let len = obj.length();
    (0..len).map(|i| arr.get(i)).collect()
}

/// Append `items`, returning the new length.
pub fn push(arr: &Value, items: Vec<Value>) -> Result<usize, BlameError> {
    let mut len = receiver(arr, "push")?.length();
    for item in items {
        arr.set(len, item)?;
        len += 1;
    }
    Ok(len)
}

/// Remove and return the last element (`undefined` when empty).
pub fn pop(arr: &Value) -> Result<Value, BlameError> {
    let len = receiver(arr, "pop")?.length();
    if len == 0 {
        return Ok(Value::Undefined);
    }
    let last = arr.get(len - 1)?;
    arr.set_len(len - 1)?;
    Ok(last)
}

/// `callback(element, index, array)` for each element, collected into a
/// new plain array.
pub fn map(arr: &Value, callback: &Value) -> Result<Value, BlameError> {
    let mut out = Vec::new();
    for (i, x) in elements(arr, "map")?.into_iter().enumerate() {
        out.push(callback.call(vec![x, Value::Num(i as f64), arr.clone()])?);
    }
    Ok(Value::array(out))
}

/// Elements for which `callback(element, index, array)` is truthy.
pub fn filter(arr: &Value, callback: &Value) -> Result<Value, BlameError> {
    let mut out = Vec::new();
    for (i, x) in elements(arr, "filter")?.into_iter().enumerate() {
        if callback
            .call(vec![x.clone(), Value::Num(i as f64), arr.clone()])?
            .is_truthy()
        {
            out.push(x);
        }
    }
    Ok(Value::array(out))
}

pub fn for_each(arr: &Value, callback: &Value) -> Result<(), BlameError> {
    for (i, x) in elements(arr, "forEach")?.into_iter().enumerate() {
        callback.call(vec![x, Value::Num(i as f64), arr.clone()])?;
    }
    Ok(())
}

/// Left fold with `callback(acc, element, index, array)`. Without an
/// initial value the first element seeds the fold.
pub fn reduce(arr: &Value, callback: &Value, init: Option<Value>) -> Result<Value, BlameError> {
    let mut elems = elements(arr, "reduce")?.into_iter().enumerate();
    let mut acc = match init {
        Some(v) => v,
        None => match elems.next() {
            Some((_, first)) => first,
            None => {
                return Err(BlameError::runtime(
                    "reduce of empty array with no initial value",
                ))
            }
        },
    };
    for (i, x) in elems {
        acc = callback.call(vec![acc, x, Value::Num(i as f64), arr.clone()])?;
    }
    Ok(acc)
}

/// A new plain array: the receiver's elements, then each of `others`
/// (arrays are spread, anything else is appended as one element).
pub fn concat(arr: &Value, others: &[Value]) -> Result<Value, BlameError> {
    let mut out = elements(arr, "concat")?;
    for other in others {
        if other.is_array() {
            out.extend(elements(other, "concat")?);
        } else {
            out.push(other.clone());
        }
    }
    Ok(Value::array(out))
}

/// A new plain array holding elements `start..end` (clamped).
pub fn slice(arr: &Value, start: usize, end: Option<usize>) -> Result<Value, BlameError> {
    let len = receiver(arr, "slice")?.length();
    let end = end.unwrap_or(len).min(len);
    let out = (start.min(end)..end)
        .map(|i| arr.get(i))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::array(out))
}

/// Reverse in place and return the receiver.
pub fn reverse(arr: &Value) -> Result<Value, BlameError> {
    let elems = elements(arr, "reverse")?;
    for (i, x) in elems.into_iter().rev().enumerate() {
        arr.set(i, x)?;
    }
    Ok(arr.clone())
}

/// Position of the first element that is the same value as `needle`.
pub fn index_of(arr: &Value, needle: &Value) -> Result<Option<usize>, BlameError> {
    let len = receiver(arr, "indexOf")?.length();
    for i in 0..len {
        if arr.get(i)?.is_same(needle) {
            return Ok(Some(i));
        }
    }
    Ok(None)
}

pub fn join(arr: &Value, sep: &str) -> Result<String, BlameError> {
    let parts: Vec<String> = elements(arr, "join")?
        .iter()
        .map(Value::to_display_string)
        .collect();
    Ok(parts.join(sep))
}
