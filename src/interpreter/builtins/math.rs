//! Exports of the `math` host module.

use indexmap::IndexMap;

use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::Interpreter;
use crate::value::Value;

use super::{builtin_value, require_args};

macro_rules! unary_math {
    ($name:ident, $label:expr, $op:expr) => {
        fn $name(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
            require_args!(args, 1, $label);
            match &args[0] {
                Value::Number(n) => {
                    let f: fn(f64) -> f64 = $op;
                    Ok(Value::Number(f(*n)))
                }
                other => Err(RuntimeError::builtin_error(
                    $label,
                    format!("requires a number, got {}", other.type_name()),
                )),
            }
        }
    };
}

unary_math!(builtin_abs, "abs", f64::abs);
unary_math!(builtin_floor, "floor", f64::floor);
unary_math!(builtin_ceil, "ceil", f64::ceil);
unary_math!(builtin_round, "round", f64::round);
unary_math!(builtin_sqrt, "sqrt", f64::sqrt);

macro_rules! binary_math {
    ($name:ident, $label:expr, $op:expr) => {
        fn $name(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
            require_args!(args, 2, $label);
            match (&args[0], &args[1]) {
                (Value::Number(a), Value::Number(b)) => {
                    let f: fn(f64, f64) -> f64 = $op;
                    Ok(Value::Number(f(*a, *b)))
                }
                _ => Err(RuntimeError::builtin_error($label, "requires two numbers")),
            }
        }
    };
}

binary_math!(builtin_pow, "pow", f64::powf);
binary_math!(builtin_min, "min", f64::min);
binary_math!(builtin_max, "max", f64::max);

pub fn exports() -> IndexMap<String, Value> {
    let mut exports = IndexMap::new();
    exports.insert("abs".to_string(), builtin_value("abs", builtin_abs));
    exports.insert("floor".to_string(), builtin_value("floor", builtin_floor));
    exports.insert("ceil".to_string(), builtin_value("ceil", builtin_ceil));
    exports.insert("round".to_string(), builtin_value("round", builtin_round));
    exports.insert("sqrt".to_string(), builtin_value("sqrt", builtin_sqrt));
    exports.insert("pow".to_string(), builtin_value("pow", builtin_pow));
    exports.insert("min".to_string(), builtin_value("min", builtin_min));
    exports.insert("max".to_string(), builtin_value("max", builtin_max));
    exports
}
