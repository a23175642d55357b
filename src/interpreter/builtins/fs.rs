use indexmap::IndexMap;
use std::path::Path;

use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::Interpreter;
use crate::value::Value;

use super::require_args;

fn string_arg<'a>(args: &'a [Value], name: &'static str) -> Result<&'a str, RuntimeError> {
    match &args[0] {
        Value::String(s) => Ok(s.as_ref()),
        other => Err(RuntimeError::builtin_error(
            name,
            format!("requires a string path, got {}", other.type_name()),
        )),
    }
}

pub fn builtin_read_file(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "read_file");
    let path = string_arg(args, "read_file")?;
    let content = std::fs::read_to_string(path)
        .map_err(|e| RuntimeError::builtin_error("read_file", format!("{}: {}", path, e)))?;
    Ok(Value::string(content))
}

pub fn builtin_write_file(
    _interp: &mut Interpreter,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    require_args!(args, 2, "write_file");
    let path = string_arg(args, "write_file")?;
    let content = match &args[1] {
        Value::String(s) => s.to_string(),
        other => crate::value::value_to_string(other),
    };
    std::fs::write(path, content)
        .map_err(|e| RuntimeError::builtin_error("write_file", format!("{}: {}", path, e)))?;
    Ok(Value::Null)
}

pub fn builtin_exists(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "exists");
    let path = string_arg(args, "exists")?;
    Ok(Value::Bool(Path::new(path).exists()))
}

pub fn builtin_cwd(_interp: &mut Interpreter, _args: &[Value]) -> Result<Value, RuntimeError> {
    let dir = std::env::current_dir()
        .map_err(|e| RuntimeError::builtin_error("cwd", e.to_string()))?;
    Ok(Value::string(dir.display().to_string()))
}

pub fn builtin_home(_interp: &mut Interpreter, _args: &[Value]) -> Result<Value, RuntimeError> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| RuntimeError::builtin_error("home", "no home directory in the environment"))?;
    Ok(Value::string(home))
}

/// The process environment as a record.
pub fn builtin_env(_interp: &mut Interpreter, _args: &[Value]) -> Result<Value, RuntimeError> {
    let mut map = IndexMap::new();
    for (key, value) in std::env::vars() {
        map.insert(key, Value::string(value));
    }
    Ok(Value::record(map))
}
