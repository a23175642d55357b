use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::Interpreter;
use crate::value::{value_to_string, Value};

use super::require_args;

pub fn builtin_len(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "len");
    let len = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::Array(arr) => arr.borrow().len(),
        Value::Record(rec) => rec.borrow().len(),
        other => {
            return Err(RuntimeError::builtin_error(
                "len",
                format!("requires a string, array or record, got {}", other.type_name()),
            ))
        }
    };
    Ok(Value::Number(len as f64))
}

/// `range(end)`, `range(start, end)` or `range(start, end, step)`.
pub fn builtin_range(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "range");
    if args.len() > 3 {
        return Err(RuntimeError::builtin_error(
            "range",
            "takes at most 3 arguments",
        ));
    }

    let mut bounds = [0.0f64; 3];
    for (i, arg) in args.iter().enumerate() {
        match arg {
            Value::Number(n) => bounds[i] = *n,
            other => {
                return Err(RuntimeError::builtin_error(
                    "range",
                    format!("requires number arguments, got {}", other.type_name()),
                ))
            }
        }
    }

    let (start, end, step) = match args.len() {
        1 => (0.0, bounds[0], 1.0),
        2 => (bounds[0], bounds[1], 1.0),
        _ => (bounds[0], bounds[1], bounds[2]),
    };

    if step == 0.0 {
        return Err(RuntimeError::builtin_error("range", "step must not be zero"));
    }

    let mut values = Vec::new();
    let mut current = start;
    if step > 0.0 {
        while current < end {
            values.push(Value::Number(current));
            current += step;
        }
    } else {
        while current > end {
            values.push(Value::Number(current));
            current += step;
        }
    }
    Ok(Value::array(values))
}

pub fn builtin_keys(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "keys");
    match &args[0] {
        Value::Record(rec) => {
            let keys = rec.borrow().keys().map(Value::string).collect();
            Ok(Value::array(keys))
        }
        other => Err(RuntimeError::builtin_error(
            "keys",
            format!("requires a record, got {}", other.type_name()),
        )),
    }
}

pub fn builtin_values(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "values");
    match &args[0] {
        Value::Record(rec) => {
            let values = rec.borrow().values().cloned().collect();
            Ok(Value::array(values))
        }
        other => Err(RuntimeError::builtin_error(
            "values",
            format!("requires a record, got {}", other.type_name()),
        )),
    }
}

/// Appends in place and returns the array, so pushes chain through the
/// shared reference.
pub fn builtin_push(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 2, "push");
    match &args[0] {
        Value::Array(arr) => {
            arr.borrow_mut().push(args[1].clone());
            Ok(args[0].clone())
        }
        other => Err(RuntimeError::builtin_error(
            "push",
            format!("requires an array, got {}", other.type_name()),
        )),
    }
}

pub fn builtin_pop(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "pop");
    match &args[0] {
        Value::Array(arr) => Ok(arr.borrow_mut().pop().unwrap_or(Value::Null)),
        other => Err(RuntimeError::builtin_error(
            "pop",
            format!("requires an array, got {}", other.type_name()),
        )),
    }
}

pub fn builtin_join(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 2, "join");
    match (&args[0], &args[1]) {
        (Value::Array(arr), Value::String(sep)) => {
            let parts: Vec<String> = arr.borrow().iter().map(value_to_string).collect();
            Ok(Value::string(parts.join(sep.as_ref())))
        }
        _ => Err(RuntimeError::builtin_error(
            "join",
            "requires an array and a separator string",
        )),
    }
}
