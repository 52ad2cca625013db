use std::collections::HashMap;
use std::rc::Rc;

use crate::environment::Frame;
use crate::error::WispError;
use crate::value::{Primitive, PrimitiveFn, Value};

fn integer_pair(name: &str, arguments: &[Value]) -> Result<(i64, i64), WispError> {
    match arguments {
        [Value::Integer(a), Value::Integer(b)] => Ok((*a, *b)),
        [_, _] => Err(WispError::Type(format!("{} needs two integers", name))),
        _ => Err(WispError::Type(format!(
            "{} takes exactly two arguments, got {}",
            name,
            arguments.len()
        ))),
    }
}

fn builtin_add(arguments: &[Value]) -> Result<Value, WispError> {
    let (a, b) = integer_pair("+", arguments)?;
    Ok(Value::Integer(a.wrapping_add(b)))
}

fn builtin_sub(arguments: &[Value]) -> Result<Value, WispError> {
    let (a, b) = integer_pair("-", arguments)?;
    Ok(Value::Integer(a.wrapping_sub(b)))
}

fn builtin_mul(arguments: &[Value]) -> Result<Value, WispError> {
    let (a, b) = integer_pair("*", arguments)?;
    Ok(Value::Integer(a.wrapping_mul(b)))
}

fn builtin_less(arguments: &[Value]) -> Result<Value, WispError> {
    let (a, b) = integer_pair("<", arguments)?;
    Ok(Value::Boolean(a < b))
}

fn builtin_eq(arguments: &[Value]) -> Result<Value, WispError> {
    let (a, b) = integer_pair("=", arguments)?;
    Ok(Value::Boolean(a == b))
}

fn primitive(name: &'static str, func: PrimitiveFn) -> Value {
    Value::Primitive(Primitive { name, func })
}

/// The global frame a session starts from. The language has no boolean
/// literal syntax: `true` and `false` are ordinary bindings here, and
/// user code can shadow or overwrite them like any other name.
pub(crate) fn builtin_frame() -> Rc<Frame> {
    Frame::root(HashMap::from([
        ("true".to_string(), Value::Boolean(true)),
        ("false".to_string(), Value::Boolean(false)),

        ("+".to_string(), primitive("+", builtin_add)),
        ("-".to_string(), primitive("-", builtin_sub)),
        ("*".to_string(), primitive("*", builtin_mul)),
        ("<".to_string(), primitive("<", builtin_less)),
        ("=".to_string(), primitive("=", builtin_eq)),
    ]))
}
