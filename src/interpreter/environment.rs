use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::value::Value;

/// Outcome of an `assign` that did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignError {
    NotFound,
    Const,
}

#[derive(Debug)]
struct Scope {
    values: RefCell<HashMap<String, Value>>,
    consts: RefCell<HashSet<String>>,
    parent: Option<Environment>,
}

/// One node in the environment chain. Cloning an `Environment` clones the
/// handle: closures capture the node that was active at their construction,
/// and those nodes outlive the frames that created them.
#[derive(Debug, Clone)]
pub struct Environment {
    scope: Rc<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scope: Rc::new(Scope {
                values: RefCell::new(HashMap::new()),
                consts: RefCell::new(HashSet::new()),
                parent: None,
            }),
        }
    }

    /// A fresh scope whose parent is `self`.
    pub fn child(&self) -> Self {
        Self {
            scope: Rc::new(Scope {
                values: RefCell::new(HashMap::new()),
                consts: RefCell::new(HashSet::new()),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Introduce a binding in this scope. Redefining a name already present
    /// in the same scope fails; shadowing an outer binding is fine.
    pub fn define(&self, name: &str, value: Value, constant: bool) -> Result<(), ()> {
        let mut values = self.scope.values.borrow_mut();
        if values.contains_key(name) {
            return Err(());
        }
        values.insert(name.to_string(), value);
        if constant {
            self.scope.consts.borrow_mut().insert(name.to_string());
        }
        Ok(())
    }

    /// Overwrite-or-insert without the redefinition check. Used for the
    /// handful of implicit bindings the interpreter owns (`this`, call
    /// parameters), never for user declarations.
    pub fn define_unchecked(&self, name: &str, value: Value) {
        self.scope
            .values
            .borrow_mut()
            .insert(name.to_string(), value);
    }

    /// Walk the chain to the defining scope and update the binding there.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), AssignError> {
        if self.scope.values.borrow().contains_key(name) {
            if self.scope.consts.borrow().contains(name) {
                return Err(AssignError::Const);
            }
            self.scope
                .values
                .borrow_mut()
                .insert(name.to_string(), value);
            return Ok(());
        }
        match &self.scope.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(AssignError::NotFound),
        }
    }

    /// Resolve a name through the chain, innermost scope first.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.scope.values.borrow().get(name) {
            return Some(value.clone());
        }
        self.scope.parent.as_ref().and_then(|p| p.get(name))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
