use std::time::{SystemTime, UNIX_EPOCH};

use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::Interpreter;
use crate::value::Value;

/// Wall-clock seconds since the Unix epoch.
pub fn builtin_clock(_interp: &mut Interpreter, _args: &[Value]) -> Result<Value, RuntimeError> {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    Ok(Value::Number(seconds))
}
