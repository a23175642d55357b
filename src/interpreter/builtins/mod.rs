//! Built-in functions installed into the root environment at interpreter
//! construction, plus the host-module registry consulted by `require` for
//! non-path specifiers.
//!
//! Every builtin obeys the uniform invocation contract
//! `fn(&mut Interpreter, &[Value]) -> Result<Value, RuntimeError>`.

mod collections;
mod fs;
mod io;
mod json;
mod math;
mod net;
mod process;
mod strings;
mod time;
mod types;

use std::collections::HashMap;
use std::rc::Rc;

use crate::value::{Builtin, BuiltinFn, HostModule, Value};

use super::environment::Environment;
use super::error::RuntimeError;
use super::evaluator::Interpreter;

macro_rules! require_args {
    ($args:expr, $n:expr, $name:expr) => {
        if $args.len() < $n {
            return Err(RuntimeError::builtin_error(
                $name,
                format!("requires {} argument(s)", $n),
            ));
        }
    };
}

pub(crate) use require_args;

/// Register every builtin as a const binding in the root environment.
pub fn install(globals: &Environment) {
    let table: &[(&'static str, BuiltinFn)] = &[
        ("print", io::builtin_print),
        ("len", collections::builtin_len),
        ("typeof", types::builtin_typeof),
        ("clock", time::builtin_clock),
        ("range", collections::builtin_range),
        ("keys", collections::builtin_keys),
        ("values", collections::builtin_values),
        ("push", collections::builtin_push),
        ("pop", collections::builtin_pop),
        ("join", collections::builtin_join),
        ("read_file", fs::builtin_read_file),
        ("write_file", fs::builtin_write_file),
        ("exists", fs::builtin_exists),
        ("cwd", fs::builtin_cwd),
        ("home", fs::builtin_home),
        ("env", fs::builtin_env),
        ("http_get", net::builtin_http_get),
        ("exec", process::builtin_exec),
        ("require", builtin_require),
        ("host_module", builtin_host_module),
        ("json_parse", json::builtin_json_parse),
        ("json_stringify", json::builtin_json_stringify),
    ];

    for &(name, func) in table {
        let builtin = Value::Builtin(Rc::new(Builtin { name, func }));
        globals
            .define(name, builtin, true)
            .expect("builtin registered twice");
    }
}

/// The host's module resolver: opaque export tables handed out by `require`
/// for bare specifiers.
pub fn host_modules() -> HashMap<&'static str, Value> {
    let mut modules = HashMap::new();
    modules.insert(
        "math",
        Value::Host(Rc::new(HostModule {
            name: Rc::from("math"),
            exports: math::exports(),
        })),
    );
    modules.insert(
        "strings",
        Value::Host(Rc::new(HostModule {
            name: Rc::from("strings"),
            exports: strings::exports(),
        })),
    );
    modules
}

fn builtin_require(interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "require");
    match &args[0] {
        Value::String(spec) => interp.require(spec),
        other => Err(RuntimeError::builtin_error(
            "require",
            format!("requires a string specifier, got {}", other.type_name()),
        )),
    }
}

fn builtin_host_module(interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "host_module");
    match &args[0] {
        Value::String(name) => interp.host_module(name),
        other => Err(RuntimeError::builtin_error(
            "host_module",
            format!("requires a string name, got {}", other.type_name()),
        )),
    }
}

/// Helper shared by the host-module export tables.
pub(crate) fn builtin_value(name: &'static str, func: BuiltinFn) -> Value {
    Value::Builtin(Rc::new(Builtin { name, func }))
}
