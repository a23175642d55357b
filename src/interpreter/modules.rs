use indexmap::IndexMap;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::value::Value;

use super::error::RuntimeError;
use super::evaluator::{parse_source, Interpreter};

/// Specifiers that name a source file on disk rather than a host module.
fn is_path_spec(spec: &str) -> bool {
    spec.starts_with("./") || spec.starts_with("../") || spec.starts_with('/')
}

impl Interpreter {
    /// Resolve a module specifier. Path specifiers load aurora source with
    /// per-interpreter caching; anything else defers to the host-module
    /// registry and yields an opaque host object.
    pub fn require(&mut self, spec: &str) -> Result<Value, RuntimeError> {
        if is_path_spec(spec) {
            self.load_file_module(spec)
        } else {
            self.host_module(spec)
        }
    }

    pub fn host_module(&mut self, name: &str) -> Result<Value, RuntimeError> {
        self.host_modules
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::module_error(format!("no host module named `{}`", name)))
    }

    fn load_file_module(&mut self, spec: &str) -> Result<Value, RuntimeError> {
        let resolved: PathBuf = std::env::current_dir()
            .map_err(|e| RuntimeError::module_error(format!("cannot resolve `{}`: {}", spec, e)))?
            .join(spec);
        let path = resolved.canonicalize().map_err(|e| {
            RuntimeError::module_error(format!("cannot resolve module `{}`: {}", spec, e))
        })?;

        if let Some(cached) = self.module_cache.get(&path) {
            return Ok(cached.clone());
        }

        let source = std::fs::read_to_string(&path).map_err(|e| {
            RuntimeError::module_error(format!("cannot read module `{}`: {}", spec, e))
        })?;

        // A syntax error in a required module surfaces to the requiring
        // program as a catchable module-load failure
        let file_tag = path.display().to_string();
        let program = parse_source(&source, &file_tag)
            .map_err(|e| RuntimeError::module_error(e.to_string()))?;

        // The module runs in a fresh scope parented to the root environment,
        // with `exports` and `module` sharing one record
        let module_env = self.globals.child();
        let exports = Value::record(IndexMap::new());
        let mut module_slots = IndexMap::new();
        module_slots.insert("exports".to_string(), exports.clone());
        let module_record = Rc::new(RefCell::new(module_slots));
        module_env.define_unchecked("exports", exports.clone());
        module_env.define_unchecked("module", Value::Record(module_record.clone()));

        // Published before evaluation: a cyclic require observes the
        // exports populated so far
        self.module_cache.insert(path.clone(), exports);

        let previous = std::mem::replace(&mut self.env, module_env);
        self.frames.push(format!("module {}", spec));
        let result = self.run_module_body(&program);
        self.env = previous;
        self.frames.pop();

        if let Err(err) = result {
            self.module_cache.remove(&path);
            return Err(err);
        }

        // The final value of `module.exports` wins, so reassignment (not
        // just mutation) propagates to the cache
        let final_exports = module_record
            .borrow()
            .get("exports")
            .cloned()
            .unwrap_or(Value::Null);
        self.module_cache.insert(path, final_exports.clone());
        Ok(final_exports)
    }

    fn run_module_body(&mut self, program: &[crate::ast::Stmt]) -> Result<(), RuntimeError> {
        let mut result = self.run_program(program).map(|_| ());
        if let Err(err) = &mut result {
            if err.trace.is_empty() {
                err.trace = self.frames.iter().rev().cloned().collect();
            }
        }
        result
    }
}
