use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::ast::{BinaryOp, Expr, ExprKind, Literal, LogicalOp, Stmt, UnaryOp};
use crate::diagnostic::Span;
use crate::lexer::tokenize;
use crate::value::{value_to_string, values_equal, Function, Value};

use super::builtins;
use super::control_flow::ControlFlow;
use super::environment::{AssignError, Environment};
use super::error::{RuntimeError, SyntaxError};
use super::parser::TokenParser;

/// The tree-walking evaluator. Holds the root environment with the builtin
/// registry, the environment active for the statement being executed, the
/// module cache, and the call-frame descriptions used for back-traces.
pub struct Interpreter {
    pub(crate) globals: Environment,
    pub(crate) env: Environment,
    pub(crate) module_cache: HashMap<PathBuf, Value>,
    pub(crate) host_modules: HashMap<&'static str, Value>,
    pub(crate) frames: Vec<String>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Environment::new();
        builtins::install(&globals);
        let env = globals.child();
        Self {
            globals,
            env,
            module_cache: HashMap::new(),
            host_modules: builtins::host_modules(),
            frames: Vec::new(),
        }
    }

    /// Execute a whole program. A stray `return`, `break` or `continue`
    /// leaking to the top level is a runtime error. The program's value is
    /// the value of its last expression statement, null otherwise.
    pub fn run_program(&mut self, stmts: &[Stmt]) -> Result<Value, RuntimeError> {
        let mut last = Value::Null;
        for stmt in stmts {
            match self.execute_statement(stmt)? {
                ControlFlow::Value(val) => last = val,
                ControlFlow::Next => {}
                ControlFlow::Return(_) => {
                    return Err(RuntimeError::control_flow(
                        "`return` outside of a function",
                        Span::NONE,
                    ))
                }
                ControlFlow::Break | ControlFlow::Continue => {
                    return Err(RuntimeError::control_flow(
                        "`break` or `continue` outside of a loop",
                        Span::NONE,
                    ))
                }
            }
        }
        Ok(last)
    }

    fn execute_statement(&mut self, statement: &Stmt) -> Result<ControlFlow, RuntimeError> {
        match statement {
            Stmt::Let { name, init, span } => {
                let value = match init {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                self.env
                    .define(name, value, false)
                    .map_err(|_| RuntimeError::redeclare(name, *span))?;
                Ok(ControlFlow::Next)
            }
            Stmt::Const { name, init, span } => {
                let value = match init {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                self.env
                    .define(name, value, true)
                    .map_err(|_| RuntimeError::redeclare(name, *span))?;
                Ok(ControlFlow::Next)
            }
            Stmt::Function {
                name,
                params,
                body,
                span,
            } => {
                let function = Function {
                    name: Some(name.clone()),
                    params: params.clone(),
                    body: body.clone(),
                    env: self.env.clone(),
                    this: None,
                };
                self.env
                    .define(name, Value::Function(Rc::new(function)), true)
                    .map_err(|_| RuntimeError::redeclare(name, *span))?;
                Ok(ControlFlow::Next)
            }
            Stmt::Class {
                name,
                methods,
                span,
            } => {
                let class_methods = methods
                    .iter()
                    .map(|m| {
                        let function = Function {
                            name: Some(m.name.clone()),
                            params: m.params.clone(),
                            body: m.body.clone(),
                            env: self.env.clone(),
                            this: None,
                        };
                        (m.name.clone(), Rc::new(function))
                    })
                    .collect();
                let class = crate::value::Class {
                    name: name.clone(),
                    methods: class_methods,
                };
                self.env
                    .define(name, Value::Class(Rc::new(class)), true)
                    .map_err(|_| RuntimeError::redeclare(name, *span))?;
                Ok(ControlFlow::Next)
            }
            Stmt::Import { local, path, span } => {
                let exports = self.require(path).map_err(|e| e.with_span(*span))?;
                if let Some(local) = local {
                    self.env
                        .define(local, exports, true)
                        .map_err(|_| RuntimeError::redeclare(local, *span))?;
                }
                Ok(ControlFlow::Next)
            }
            Stmt::Expr(expr) => {
                let value = self.evaluate(expr)?;
                // Assignments are side-effect statements, not result values
                if matches!(expr.kind, ExprKind::Assign { .. }) {
                    Ok(ControlFlow::Next)
                } else {
                    Ok(ControlFlow::Value(value))
                }
            }
            Stmt::Block(stmts) => {
                let child = self.env.child();
                self.execute_block(stmts, child)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute_statement(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_statement(else_branch)
                } else {
                    Ok(ControlFlow::Next)
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute_statement(body)? {
                        ControlFlow::Return(val) => return Ok(ControlFlow::Return(val)),
                        ControlFlow::Break => break,
                        ControlFlow::Continue | ControlFlow::Value(_) | ControlFlow::Next => {}
                    }
                }
                Ok(ControlFlow::Next)
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => {
                // One enclosing scope for init/test/update/body
                let previous = self.env.clone();
                self.env = previous.child();
                let result = self.execute_for(init, condition, update, body);
                self.env = previous;
                result
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                Ok(ControlFlow::Return(value))
            }
            Stmt::Break(_) => Ok(ControlFlow::Break),
            Stmt::Continue(_) => Ok(ControlFlow::Continue),
            Stmt::Try {
                body,
                catch_name,
                catch_body,
            } => {
                let child = self.env.child();
                match self.execute_block(body, child) {
                    Ok(flow) => Ok(flow),
                    Err(err) => {
                        let Some(catch_body) = catch_body else {
                            // A bare `try` block swallows the throw
                            return Ok(ControlFlow::Next);
                        };
                        let catch_env = self.env.child();
                        if let Some(name) = catch_name {
                            catch_env.define_unchecked(name, err.value);
                        }
                        self.execute_block(catch_body, catch_env)
                    }
                }
            }
            Stmt::Throw { value, span } => {
                let value = self.evaluate(value)?;
                Err(RuntimeError::thrown(value, *span))
            }
        }
    }

    /// Run the statements of a block in the given environment, restoring the
    /// previous environment afterwards even when an error unwinds.
    fn execute_block(
        &mut self,
        stmts: &[Stmt],
        env: Environment,
    ) -> Result<ControlFlow, RuntimeError> {
        let previous = std::mem::replace(&mut self.env, env);
        let mut result = Ok(ControlFlow::Next);
        for stmt in stmts {
            match self.execute_statement(stmt) {
                Ok(ControlFlow::Value(_)) | Ok(ControlFlow::Next) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }
        self.env = previous;
        result
    }

    fn execute_for(
        &mut self,
        init: &Option<Box<Stmt>>,
        condition: &Option<Expr>,
        update: &Option<Expr>,
        body: &Stmt,
    ) -> Result<ControlFlow, RuntimeError> {
        if let Some(init) = init {
            self.execute_statement(init)?;
        }

        loop {
            if let Some(condition) = condition {
                if !self.evaluate(condition)?.is_truthy() {
                    break;
                }
            }

            match self.execute_statement(body)? {
                ControlFlow::Return(val) => return Ok(ControlFlow::Return(val)),
                ControlFlow::Break => break,
                ControlFlow::Continue | ControlFlow::Value(_) | ControlFlow::Next => {}
            }

            if let Some(update) = update {
                self.evaluate(update)?;
            }
        }

        Ok(ControlFlow::Next)
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(match literal {
                Literal::Null => Value::Null,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Number(n) => Value::Number(*n),
                Literal::Str(s) => Value::String(s.clone()),
            }),

            ExprKind::Identifier(name) => self
                .env
                .get(name)
                .ok_or_else(|| RuntimeError::undefined_variable(name, expr.span)),

            ExprKind::This => self
                .env
                .get("this")
                .ok_or_else(|| RuntimeError::undefined_variable("this", expr.span)),

            ExprKind::Array { elements } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(Value::array(values))
            }

            ExprKind::Object { fields } => {
                let mut map = IndexMap::new();
                for (key, value) in fields {
                    let value = self.evaluate(value)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::record(map))
            }

            ExprKind::Function { name, params, body } => {
                let function = Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                    env: self.env.clone(),
                    this: None,
                };
                Ok(Value::Function(Rc::new(function)))
            }

            ExprKind::Property { object, name } => {
                let object = self.evaluate(object)?;
                self.get_property(&object, name, expr.span)
            }

            ExprKind::Index { object, index } => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                self.get_index(&object, &index, expr.span)
            }

            ExprKind::Call { callee, args } => {
                // A property callee evaluates its object once and binds it
                // as `this` in the invoked frame
                if let ExprKind::Property { object, name } = &callee.kind {
                    let receiver = self.evaluate(object)?;
                    let slot = self.get_property(&receiver, name, callee.span)?;
                    let args = self.evaluate_args(args)?;
                    return self.call_value(&slot, args, Some(receiver), expr.span);
                }

                let callee_val = self.evaluate(callee)?;
                let args = self.evaluate_args(args)?;
                self.call_value(&callee_val, args, None, expr.span)
            }

            ExprKind::New { callee } => {
                let (class_expr, arg_exprs): (&Expr, &[Expr]) = match &callee.kind {
                    ExprKind::Call { callee, args } => (callee.as_ref(), args.as_slice()),
                    _ => (callee.as_ref(), &[]),
                };
                let class = match self.evaluate(class_expr)? {
                    Value::Class(class) => class,
                    other => {
                        return Err(RuntimeError::type_error_at(
                            format!("`new` expects a class, got {}", other.type_name()),
                            expr.span,
                        ))
                    }
                };
                let args = self.evaluate_args(arg_exprs)?;
                self.construct(&class, args, expr.span)
            }

            ExprKind::Assign { target, value } => {
                let value = self.evaluate(value)?;
                self.perform_assignment(target, value)
            }

            ExprKind::Logical { op, left, right } => {
                let left_val = self.evaluate(left)?;
                match op {
                    LogicalOp::Or => {
                        if left_val.is_truthy() {
                            Ok(left_val)
                        } else {
                            self.evaluate(right)
                        }
                    }
                    LogicalOp::And => {
                        if left_val.is_truthy() {
                            self.evaluate(right)
                        } else {
                            Ok(left_val)
                        }
                    }
                }
            }

            ExprKind::Binary { op, left, right } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                eval_binary_op(&left_val, *op, &right_val, expr.span)
            }

            ExprKind::Unary { op, expr: operand } => {
                let value = self.evaluate(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    UnaryOp::Neg => match value {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        other => Err(RuntimeError::type_error_at(
                            format!("cannot negate {}", other.type_name()),
                            expr.span,
                        )),
                    },
                }
            }
        }
    }

    fn evaluate_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate(arg)?);
        }
        Ok(values)
    }

    fn get_property(
        &self,
        object: &Value,
        name: &str,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        match object {
            Value::Record(rec) => Ok(rec.borrow().get(name).cloned().unwrap_or(Value::Null)),
            Value::Host(module) => module.get(name).cloned().ok_or_else(|| {
                RuntimeError::type_error_at(
                    format!("host module `{}` has no export `{}`", module.name, name),
                    span,
                )
            }),
            other => Err(RuntimeError::type_error_at(
                format!("cannot read property `{}` of {}", name, other.type_name()),
                span,
            )),
        }
    }

    fn get_index(&self, object: &Value, index: &Value, span: Span) -> Result<Value, RuntimeError> {
        match object {
            Value::Array(items) => {
                let Value::Number(n) = index else {
                    return Ok(Value::Null);
                };
                let items = items.borrow();
                if *n < 0.0 || n.fract() != 0.0 || *n >= items.len() as f64 {
                    return Ok(Value::Null);
                }
                Ok(items[*n as usize].clone())
            }
            // Records index by the string form of the key
            Value::Record(rec) => {
                let key = index_key(index);
                Ok(rec.borrow().get(&key).cloned().unwrap_or(Value::Null))
            }
            Value::String(s) => {
                let Value::Number(n) = index else {
                    return Ok(Value::Null);
                };
                if *n < 0.0 || n.fract() != 0.0 {
                    return Ok(Value::Null);
                }
                Ok(s.chars()
                    .nth(*n as usize)
                    .map(|c| Value::string(c.to_string()))
                    .unwrap_or(Value::Null))
            }
            other => Err(RuntimeError::type_error_at(
                format!("cannot index into {}", other.type_name()),
                span,
            )),
        }
    }

    fn set_index(
        &self,
        object: &Value,
        index: &Value,
        value: Value,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        match object {
            Value::Array(items) => {
                let Value::Number(n) = index else {
                    return Err(RuntimeError::type_error_at(
                        format!("array index must be a number, got {}", index.type_name()),
                        span,
                    ));
                };
                if *n < 0.0 || n.fract() != 0.0 {
                    return Err(RuntimeError::type_error_at(
                        "array index must be a non-negative integer",
                        span,
                    ));
                }
                let idx = *n as usize;
                let mut items = items.borrow_mut();
                if idx >= items.len() {
                    // Writing past the end extends, padding with nulls
                    items.resize(idx + 1, Value::Null);
                }
                items[idx] = value.clone();
                Ok(value)
            }
            Value::Record(rec) => {
                let key = index_key(index);
                rec.borrow_mut().insert(key, value.clone());
                Ok(value)
            }
            other => Err(RuntimeError::type_error_at(
                format!("cannot index into {}", other.type_name()),
                span,
            )),
        }
    }

    fn perform_assignment(&mut self, target: &Expr, value: Value) -> Result<Value, RuntimeError> {
        match &target.kind {
            ExprKind::Identifier(name) => match self.env.assign(name, value.clone()) {
                Ok(()) => Ok(value),
                Err(AssignError::NotFound) => {
                    Err(RuntimeError::undefined_variable(name, target.span))
                }
                Err(AssignError::Const) => Err(RuntimeError::const_reassign(name, target.span)),
            },
            ExprKind::Property { object, name } => {
                let object = self.evaluate(object)?;
                match object {
                    Value::Record(rec) => {
                        rec.borrow_mut().insert(name.clone(), value.clone());
                        Ok(value)
                    }
                    other => Err(RuntimeError::type_error_at(
                        format!("cannot set property `{}` on {}", name, other.type_name()),
                        target.span,
                    )),
                }
            }
            ExprKind::Index { object, index } => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                self.set_index(&object, &index, value, target.span)
            }
            // The parser only produces the three shapes above
            _ => Err(RuntimeError::type_error_at(
                "invalid assignment target",
                target.span,
            )),
        }
    }

    /// Dispatch over the callable variants. `this` is the receiver of a
    /// property-call site; a method slot's own bound instance is the
    /// fallback.
    pub fn call_value(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        this: Option<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(function) => self.call_function(function, args, this, span),
            Value::Builtin(builtin) => {
                self.frames.push(format!("{}()", builtin.name));
                let mut result = (builtin.func)(self, &args);
                if let Err(err) = &mut result {
                    if err.trace.is_empty() {
                        err.trace = self.frames.iter().rev().cloned().collect();
                    }
                }
                self.frames.pop();
                result.map_err(|e| e.with_span(span))
            }
            Value::Class(class) => Err(RuntimeError::type_error_at(
                format!("class {} must be constructed with `new`", class.name),
                span,
            )),
            other => Err(RuntimeError::not_callable(other.type_name(), span)),
        }
    }

    pub fn call_function(
        &mut self,
        function: &Rc<Function>,
        args: Vec<Value>,
        this: Option<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        if args.len() != function.params.len() {
            return Err(RuntimeError::arity(function.params.len(), args.len(), span));
        }

        let frame = function.env.child();
        for (param, arg) in function.params.iter().zip(args) {
            frame.define_unchecked(param, arg);
        }
        if let Some(this_val) = this.or_else(|| function.this.clone()) {
            frame.define_unchecked("this", this_val);
        }

        let label = match &function.name {
            Some(name) => format!("{}()", name),
            None => "<anonymous>()".to_string(),
        };
        self.frames.push(label);

        let previous = std::mem::replace(&mut self.env, frame);
        let mut result = self.run_function_body(&function.body);
        self.env = previous;

        if let Err(err) = &mut result {
            if err.trace.is_empty() {
                err.trace = self.frames.iter().rev().cloned().collect();
            }
        }
        self.frames.pop();

        result
    }

    /// A function body that completes without `return` yields the value of
    /// its last expression statement, null when there is none.
    fn run_function_body(&mut self, body: &[Stmt]) -> Result<Value, RuntimeError> {
        let mut last = Value::Null;
        for stmt in body {
            match self.execute_statement(stmt)? {
                ControlFlow::Return(val) => return Ok(val),
                ControlFlow::Value(val) => last = val,
                ControlFlow::Next => {}
                ControlFlow::Break | ControlFlow::Continue => {
                    return Err(RuntimeError::control_flow(
                        "`break` or `continue` outside of a loop",
                        Span::NONE,
                    ))
                }
            }
        }
        Ok(last)
    }

    /// `new`: build an instance record, install every method as a slot bound
    /// to the instance, then run `constructor` when one exists.
    fn construct(
        &mut self,
        class: &Rc<crate::value::Class>,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        let instance = Value::record(IndexMap::new());

        if let Value::Record(rec) = &instance {
            for (name, method) in &class.methods {
                let bound = method.bind(instance.clone());
                rec.borrow_mut()
                    .insert(name.to_string(), Value::Function(Rc::new(bound)));
            }
        }

        let constructor = match &instance {
            Value::Record(rec) => rec.borrow().get("constructor").cloned(),
            _ => None,
        };
        if let Some(constructor) = constructor {
            self.call_value(&constructor, args, Some(instance.clone()), span)?;
        }

        Ok(instance)
    }
}

/// The string form of an index key used for records: strings pass through,
/// everything else goes through the display repr.
fn index_key(index: &Value) -> String {
    match index {
        Value::String(s) => s.to_string(),
        other => value_to_string(other),
    }
}

fn eval_binary_op(
    left: &Value,
    op: BinaryOp,
    right: &Value,
    span: Span,
) -> Result<Value, RuntimeError> {
    match (left, op, right) {
        (Value::Number(a), BinaryOp::Add, Value::Number(b)) => Ok(Value::Number(a + b)),
        // `+` with a string operand concatenates, coercing the other side
        // through the display repr
        (Value::String(_), BinaryOp::Add, _) | (_, BinaryOp::Add, Value::String(_)) => {
            let mut combined = value_to_string(left);
            combined.push_str(&value_to_string(right));
            Ok(Value::string(combined))
        }
        (Value::Number(a), BinaryOp::Sub, Value::Number(b)) => Ok(Value::Number(a - b)),
        (Value::Number(a), BinaryOp::Mul, Value::Number(b)) => Ok(Value::Number(a * b)),
        // Division by zero follows IEEE-754: +/-inf or NaN, never a throw
        (Value::Number(a), BinaryOp::Div, Value::Number(b)) => Ok(Value::Number(a / b)),
        (Value::Number(a), BinaryOp::Mod, Value::Number(b)) => Ok(Value::Number(a % b)),
        (Value::Number(a), BinaryOp::Pow, Value::Number(b)) => Ok(Value::Number(a.powf(*b))),
        (left, BinaryOp::Eq, right) => Ok(Value::Bool(values_equal(left, right))),
        (left, BinaryOp::NotEq, right) => Ok(Value::Bool(!values_equal(left, right))),
        (Value::Number(a), BinaryOp::Less, Value::Number(b)) => Ok(Value::Bool(a < b)),
        (Value::Number(a), BinaryOp::LessEq, Value::Number(b)) => Ok(Value::Bool(a <= b)),
        (Value::Number(a), BinaryOp::Greater, Value::Number(b)) => Ok(Value::Bool(a > b)),
        (Value::Number(a), BinaryOp::GreaterEq, Value::Number(b)) => Ok(Value::Bool(a >= b)),
        (Value::String(a), BinaryOp::Less, Value::String(b)) => Ok(Value::Bool(a < b)),
        (Value::String(a), BinaryOp::LessEq, Value::String(b)) => Ok(Value::Bool(a <= b)),
        (Value::String(a), BinaryOp::Greater, Value::String(b)) => Ok(Value::Bool(a > b)),
        (Value::String(a), BinaryOp::GreaterEq, Value::String(b)) => Ok(Value::Bool(a >= b)),
        _ => Err(RuntimeError::type_error_at(
            format!(
                "cannot apply `{}` to {} and {}",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ),
            span,
        )),
    }
}

/// Lex and parse a source unit.
pub fn parse_source(source: &str, file: &str) -> Result<Vec<Stmt>, SyntaxError> {
    let tokens = tokenize(source, file)?;
    TokenParser::new(tokens).parse()
}

/// Convenience entry used throughout the test suites: run a source string in
/// a fresh interpreter, stringifying either error kind.
pub fn parse_and_run(source: &str) -> Result<Value, String> {
    let stmts = parse_source(source, "test").map_err(|e| e.to_string())?;
    let mut interpreter = Interpreter::new();
    interpreter.run_program(&stmts).map_err(|e| e.to_string())
}
