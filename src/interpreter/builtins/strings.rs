//! Exports of the `strings` host module.

use indexmap::IndexMap;

use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::Interpreter;
use crate::value::Value;

use super::{builtin_value, require_args};

fn str_arg<'a>(
    args: &'a [Value],
    index: usize,
    label: &'static str,
) -> Result<&'a str, RuntimeError> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s.as_ref()),
        Some(other) => Err(RuntimeError::builtin_error(
            label,
            format!("requires a string, got {}", other.type_name()),
        )),
        None => Err(RuntimeError::builtin_error(label, "missing argument")),
    }
}

fn builtin_upper(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "upper");
    Ok(Value::string(str_arg(args, 0, "upper")?.to_uppercase()))
}

fn builtin_lower(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "lower");
    Ok(Value::string(str_arg(args, 0, "lower")?.to_lowercase()))
}

fn builtin_trim(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "trim");
    Ok(Value::string(str_arg(args, 0, "trim")?.trim()))
}

fn builtin_split(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 2, "split");
    let text = str_arg(args, 0, "split")?;
    let separator = str_arg(args, 1, "split")?;
    let parts: Vec<Value> = if separator.is_empty() {
        text.chars().map(|c| Value::string(c.to_string())).collect()
    } else {
        text.split(separator).map(Value::string).collect()
    };
    Ok(Value::array(parts))
}

fn builtin_contains(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 2, "contains");
    let text = str_arg(args, 0, "contains")?;
    let needle = str_arg(args, 1, "contains")?;
    Ok(Value::Bool(text.contains(needle)))
}

fn builtin_starts_with(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 2, "starts_with");
    let text = str_arg(args, 0, "starts_with")?;
    let prefix = str_arg(args, 1, "starts_with")?;
    Ok(Value::Bool(text.starts_with(prefix)))
}

fn builtin_ends_with(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 2, "ends_with");
    let text = str_arg(args, 0, "ends_with")?;
    let suffix = str_arg(args, 1, "ends_with")?;
    Ok(Value::Bool(text.ends_with(suffix)))
}

fn builtin_replace(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 3, "replace");
    let text = str_arg(args, 0, "replace")?;
    let from = str_arg(args, 1, "replace")?;
    let to = str_arg(args, 2, "replace")?;
    Ok(Value::string(text.replace(from, to)))
}

pub fn exports() -> IndexMap<String, Value> {
    let mut exports = IndexMap::new();
    exports.insert("upper".to_string(), builtin_value("upper", builtin_upper));
    exports.insert("lower".to_string(), builtin_value("lower", builtin_lower));
    exports.insert("trim".to_string(), builtin_value("trim", builtin_trim));
    exports.insert("split".to_string(), builtin_value("split", builtin_split));
    exports.insert(
        "contains".to_string(),
        builtin_value("contains", builtin_contains),
    );
    exports.insert(
        "starts_with".to_string(),
        builtin_value("starts_with", builtin_starts_with),
    );
    exports.insert(
        "ends_with".to_string(),
        builtin_value("ends_with", builtin_ends_with),
    );
    exports.insert(
        "replace".to_string(),
        builtin_value("replace", builtin_replace),
    );
    exports
}
