use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::Stmt;
use crate::interpreter::environment::Environment;
use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::Interpreter;

/// Runtime values. Containers are shared by reference: cloning a `Value`
/// clones the handle, not the contents, so aliasing an array or record
/// through a closure or a module boundary observes mutations.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
    Record(Rc<RefCell<IndexMap<String, Value>>>),
    Function(Rc<Function>),
    Class(Rc<Class>),
    Builtin(Rc<Builtin>),
    Host(Rc<HostModule>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other)
    }
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn record(map: IndexMap<String, Value>) -> Self {
        Value::Record(Rc::new(RefCell::new(map)))
    }

    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    pub fn as_number(&self) -> Option<f64> {
        if let Value::Number(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s.as_ref())
        } else {
            None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// `null` and `false` are falsy; every other value is truthy, including
    /// zero, the empty string and empty containers.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    /// Runtime tag name, as reported by the `typeof` builtin.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
            Value::Function(_) => "function",
            Value::Class(_) => "class",
            Value::Builtin(_) => "builtin",
            Value::Host(_) => "host",
        }
    }
}

/// A closure: parameter names, body, and the environment captured at the
/// point of construction. `this` is set when the closure was installed as an
/// instance method slot.
pub struct Function {
    pub name: Option<Rc<str>>,
    pub params: Vec<Rc<str>>,
    pub body: Rc<Vec<Stmt>>,
    pub env: Environment,
    pub this: Option<Value>,
}

// The captured environment can reach back to the function itself (any
// recursive closure does), so Debug must not walk it
impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self.name.as_deref().unwrap_or("<anonymous>");
        write!(f, "Function({}, {} param(s))", name, self.params.len())
    }
}

impl Function {
    /// A copy of this function bound to an instance. Used when `new`
    /// populates an instance record with its method slots.
    pub fn bind(&self, this: Value) -> Function {
        Function {
            name: self.name.clone(),
            params: self.params.clone(),
            body: self.body.clone(),
            env: self.env.clone(),
            this: Some(this),
        }
    }
}

/// A class declaration: its ordered methods and the environment that was
/// active when the declaration ran (methods close over it).
#[derive(Debug)]
pub struct Class {
    pub name: Rc<str>,
    pub methods: Vec<(Rc<str>, Rc<Function>)>,
}

impl Class {
    pub fn method(&self, name: &str) -> Option<&Rc<Function>> {
        self.methods
            .iter()
            .find(|(method_name, _)| method_name.as_ref() == name)
            .map(|(_, f)| f)
    }
}

pub type BuiltinFn = fn(&mut Interpreter, &[Value]) -> Result<Value, RuntimeError>;

/// A host-provided callable installed into the root environment at
/// interpreter construction.
#[derive(Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

/// An opaque host object: a named export table produced by the host's module
/// resolver for non-path `require` specifiers.
#[derive(Debug)]
pub struct HostModule {
    pub name: Rc<str>,
    pub exports: IndexMap<String, Value>,
}

impl HostModule {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.exports.get(name)
    }
}

/// Structural equality: scalars by value, arrays element-wise, records by
/// key-set and element-wise values. Functions, classes, builtins and host
/// objects compare by identity.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(arr_a), Value::Array(arr_b)) => {
            if Rc::ptr_eq(arr_a, arr_b) {
                return true;
            }
            let arr_a = arr_a.borrow();
            let arr_b = arr_b.borrow();
            arr_a.len() == arr_b.len()
                && arr_a.iter().zip(arr_b.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Value::Record(rec_a), Value::Record(rec_b)) => {
            if Rc::ptr_eq(rec_a, rec_b) {
                return true;
            }
            let rec_a = rec_a.borrow();
            let rec_b = rec_b.borrow();
            rec_a.len() == rec_b.len()
                && rec_a.iter().all(|(key, x)| match rec_b.get(key) {
                    Some(y) => values_equal(x, y),
                    None => false,
                })
        }
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
        (Value::Builtin(a), Value::Builtin(b)) => Rc::ptr_eq(a, b),
        (Value::Host(a), Value::Host(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

/// Display repr: what `print` writes. Strings render raw at the top level
/// and quoted inside containers.
pub fn value_to_string(val: &Value) -> String {
    match val {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(*n),
        Value::String(s) => s.to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.borrow().iter().map(value_to_display).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Record(rec) => {
            let fields: Vec<String> = rec
                .borrow()
                .iter()
                .map(|(k, v)| format!("{}: {}", k, value_to_display(v)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        Value::Function(f) => match &f.name {
            Some(name) => format!("<fun {}>", name),
            None => "<fun>".to_string(),
        },
        Value::Class(c) => format!("<class {}>", c.name),
        Value::Builtin(b) => format!("<builtin {}>", b.name),
        Value::Host(m) => format!("<host {}>", m.name),
    }
}

pub fn value_to_display(val: &Value) -> String {
    match val {
        Value::String(s) => format!("\"{}\"", s),
        _ => value_to_string(val),
    }
}

pub fn number_to_string(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}
