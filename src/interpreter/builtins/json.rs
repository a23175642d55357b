use indexmap::IndexMap;

use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::Interpreter;
use crate::value::Value;

use super::require_args;

pub fn builtin_json_parse(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "json_parse");
    let text = match &args[0] {
        Value::String(s) => s.as_ref(),
        other => {
            return Err(RuntimeError::builtin_error(
                "json_parse",
                format!("requires a string, got {}", other.type_name()),
            ))
        }
    };
    let parsed: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| RuntimeError::builtin_error("json_parse", e.to_string()))?;
    Ok(json_to_value(parsed))
}

/// `json_stringify(value)` is compact; `json_stringify(value, true)` indents
/// with two spaces.
pub fn builtin_json_stringify(
    _interp: &mut Interpreter,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "json_stringify");
    let pretty = args.get(1).map(Value::is_truthy).unwrap_or(false);
    let indent = if pretty { Some(0) } else { None };
    Ok(Value::string(format_json(&args[0], indent)))
}

fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => Value::string(s),
        serde_json::Value::Array(items) => {
            Value::array(items.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(entries) => {
            let mut map = IndexMap::new();
            for (key, value) in entries {
                map.insert(key, json_to_value(value));
            }
            Value::record(map)
        }
    }
}

fn escape_json_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

fn format_json(value: &Value, indent: Option<usize>) -> String {
    const INDENT_SIZE: usize = 2;

    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if n.is_finite() {
                crate::value::number_to_string(*n)
            } else {
                "null".to_string()
            }
        }
        Value::String(s) => format!("\"{}\"", escape_json_string(s)),
        Value::Function(_) | Value::Class(_) | Value::Builtin(_) | Value::Host(_) => {
            format!("\"{}\"", crate::value::value_to_string(value))
        }
        Value::Array(array) => {
            let items = array.borrow();
            if items.is_empty() {
                return "[]".to_string();
            }
            match indent {
                None => {
                    let elements: Vec<String> =
                        items.iter().map(|item| format_json(item, None)).collect();
                    format!("[{}]", elements.join(","))
                }
                Some(level) => {
                    let indent_str = " ".repeat(level * INDENT_SIZE);
                    let next_indent = " ".repeat((level + 1) * INDENT_SIZE);
                    let elements: Vec<String> = items
                        .iter()
                        .map(|item| format!("{}{}", next_indent, format_json(item, Some(level + 1))))
                        .collect();
                    format!("[\n{}\n{}]", elements.join(",\n"), indent_str)
                }
            }
        }
        Value::Record(record) => {
            let map = record.borrow();
            if map.is_empty() {
                return "{}".to_string();
            }
            match indent {
                None => {
                    let fields: Vec<String> = map
                        .iter()
                        .map(|(k, v)| {
                            format!("\"{}\":{}", escape_json_string(k), format_json(v, None))
                        })
                        .collect();
                    format!("{{{}}}", fields.join(","))
                }
                Some(level) => {
                    let indent_str = " ".repeat(level * INDENT_SIZE);
                    let next_indent = " ".repeat((level + 1) * INDENT_SIZE);
                    let fields: Vec<String> = map
                        .iter()
                        .map(|(k, v)| {
                            format!(
                                "{}\"{}\": {}",
                                next_indent,
                                escape_json_string(k),
                                format_json(v, Some(level + 1))
                            )
                        })
                        .collect();
                    format!("{{\n{}\n{}}}", fields.join(",\n"), indent_str)
                }
            }
        }
    }
}
