use std::process::Command;

use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::Interpreter;
use crate::value::Value;

use super::require_args;

/// Run a subprocess and return its captured stdout. The command string is
/// split on whitespace: first part program, rest arguments. Spawn failures
/// and non-zero exits are throws.
pub fn builtin_exec(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "exec");
    let command = match &args[0] {
        Value::String(s) => s.as_ref(),
        other => {
            return Err(RuntimeError::builtin_error(
                "exec",
                format!("requires a command string, got {}", other.type_name()),
            ))
        }
    };

    let parts: Vec<&str> = command.split_whitespace().collect();
    let Some((program, rest)) = parts.split_first() else {
        return Err(RuntimeError::builtin_error("exec", "empty command"));
    };

    let output = Command::new(program)
        .args(rest)
        .output()
        .map_err(|e| RuntimeError::builtin_error("exec", format!("{}: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RuntimeError::builtin_error(
            "exec",
            format!(
                "`{}` exited with {}: {}",
                command,
                output.status,
                stderr.trim()
            ),
        ));
    }

    Ok(Value::string(String::from_utf8_lossy(&output.stdout)))
}
