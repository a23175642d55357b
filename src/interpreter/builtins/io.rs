use std::io::Write;

use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::Interpreter;
use crate::value::{value_to_string, Value};

pub fn builtin_print(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    if args.is_empty() {
        println!();
    } else {
        let output: Vec<String> = args.iter().map(value_to_string).collect();
        println!("{}", output.join(" "));
    }
    std::io::stdout().flush().ok();
    Ok(Value::Null)
}
