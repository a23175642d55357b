use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::Interpreter;
use crate::value::Value;

use super::require_args;

pub fn builtin_typeof(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "typeof");
    Ok(Value::string(args[0].type_name()))
}
