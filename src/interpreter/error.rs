use std::fmt;
use std::rc::Rc;

use crate::diagnostic::{Diagnostic, Label, Span};
use crate::value::{value_to_string, Value};

/// A lex or parse error. These abort compilation of the source unit before
/// evaluation begins, so they are never catchable by `try`/`catch`.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub file: Rc<str>,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(
        message: impl Into<String>,
        line: usize,
        column: usize,
        file: Rc<str>,
    ) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            file,
            span: Span::NONE,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.message.clone()).with_code("E0101");
        if self.span.is_none() {
            diag.with_note(format!(
                "at {}:{}:{}",
                self.file, self.line, self.column
            ))
        } else {
            diag.with_label(Label::new(self.span, self.message.clone()))
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}:{}",
            self.message, self.file, self.line, self.column
        )
    }
}

impl std::error::Error for SyntaxError {}

/// A throw in flight. Runtime errors and user `throw`s travel the same
/// channel: the payload is what a `catch` clause binds. For runtime errors
/// the payload is an error record with `kind` and `message` slots; for user
/// throws it is whatever the thrown expression evaluated to.
///
/// `trace` captures the innermost call frames at the point the throw was
/// raised, newest first.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub value: Value,
    pub span: Option<Span>,
    pub trace: Vec<String>,
}

impl RuntimeError {
    fn record(kind: &str, message: String, span: Option<Span>) -> Self {
        let mut map = indexmap::IndexMap::new();
        map.insert("kind".to_string(), Value::string(kind));
        map.insert("message".to_string(), Value::string(&message));
        Self {
            value: Value::record(map),
            span,
            trace: Vec::new(),
        }
    }

    pub fn thrown(value: Value, span: Span) -> Self {
        Self {
            value,
            span: Some(span),
            trace: Vec::new(),
        }
    }

    pub fn undefined_variable(name: &str, span: Span) -> Self {
        Self::record(
            "ReferenceError",
            format!("undefined variable `{}`", name),
            Some(span),
        )
    }

    pub fn redeclare(name: &str, span: Span) -> Self {
        Self::record(
            "ReferenceError",
            format!("`{}` is already defined in this scope", name),
            Some(span),
        )
    }

    pub fn const_reassign(name: &str, span: Span) -> Self {
        Self::record(
            "ConstError",
            format!("cannot reassign constant `{}`", name),
            Some(span),
        )
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::record("TypeError", message.into(), None)
    }

    pub fn type_error_at(message: impl Into<String>, span: Span) -> Self {
        Self::record("TypeError", message.into(), Some(span))
    }

    pub fn arity(expected: usize, got: usize, span: Span) -> Self {
        Self::record(
            "ArityError",
            format!("expected {} argument(s), got {}", expected, got),
            Some(span),
        )
    }

    pub fn not_callable(type_name: &str, span: Span) -> Self {
        Self::record(
            "TypeError",
            format!("value of type {} is not callable", type_name),
            Some(span),
        )
    }

    pub fn module_error(message: impl Into<String>) -> Self {
        Self::record("ModuleError", message.into(), None)
    }

    pub fn builtin_error(name: &str, message: impl Into<String>) -> Self {
        Self::record(
            "Error",
            format!("{}: {}", name, message.into()),
            None,
        )
    }

    pub fn control_flow(message: impl Into<String>, span: Span) -> Self {
        Self::record("SyntaxError", message.into(), Some(span))
    }

    pub fn with_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    /// The `kind` slot of an error record, when the payload is one.
    pub fn kind(&self) -> Option<String> {
        if let Value::Record(rec) = &self.value {
            if let Some(Value::String(kind)) = rec.borrow().get("kind") {
                return Some(kind.to_string());
            }
        }
        None
    }

    /// Human-readable message: the `message` slot of an error record, or the
    /// display repr of whatever was thrown.
    pub fn message(&self) -> String {
        if let Value::Record(rec) = &self.value {
            if let Some(Value::String(msg)) = rec.borrow().get("message") {
                return msg.to_string();
            }
        }
        value_to_string(&self.value)
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self.kind().as_deref() {
            Some("ReferenceError") => Some("E0201"),
            Some("TypeError") => Some("E0202"),
            Some("ConstError") => Some("E0203"),
            Some("ArityError") => Some("E0204"),
            Some("ModuleError") => Some("E0205"),
            Some("SyntaxError") => Some("E0206"),
            _ => None,
        };

        let mut diag = Diagnostic::error(self.message());
        if let Some(code) = code {
            diag = diag.with_code(code);
        }
        if let Some(span) = self.span {
            if !span.is_none() {
                diag = diag.with_label(Label::new(span, self.message()));
            }
        }
        for frame in self.trace.iter().take(5) {
            diag = diag.with_note(format!("in {}", frame));
        }
        diag
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for RuntimeError {}
