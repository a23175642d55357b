use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::Interpreter;
use crate::value::Value;

use super::require_args;

/// Synchronous HTTP GET. Blocks the caller; the body comes back as a string
/// and any transport or read failure is a throw.
pub fn builtin_http_get(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "http_get");
    let url = match &args[0] {
        Value::String(s) => s.as_ref(),
        other => {
            return Err(RuntimeError::builtin_error(
                "http_get",
                format!("requires a URL string, got {}", other.type_name()),
            ))
        }
    };

    let response = reqwest::blocking::get(url)
        .map_err(|e| RuntimeError::builtin_error("http_get", format!("GET {} failed: {}", url, e)))?;
    let body = response
        .text()
        .map_err(|e| RuntimeError::builtin_error("http_get", format!("reading body: {}", e)))?;
    Ok(Value::string(body))
}
