//! Interactive shell. Line-oriented: balanced input evaluates immediately,
//! unbalanced input accumulates until its delimiters close or a `;;` line
//! forces the buffer through. Input history persists across sessions in the
//! user's home directory.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use crate::diagnostic::render_diagnostics;
use crate::interpreter::{parse_source, Interpreter};
use crate::value::{value_to_display, Value};

const HISTORY_FILE: &str = ".aurora_history";

pub struct Repl {
    interpreter: Interpreter,
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    color_enabled: bool,
}

impl Repl {
    pub fn new(color_enabled: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let mut editor = DefaultEditor::new()?;
        let history_path = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(|home| PathBuf::from(home).join(HISTORY_FILE));
        if let Some(path) = &history_path {
            // Missing history is fine on first run
            let _ = editor.load_history(path);
        }
        Ok(Repl {
            interpreter: Interpreter::new(),
            editor,
            history_path,
            color_enabled,
        })
    }

    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        println!("aurora {} -- .help for commands, .exit to quit", env!("CARGO_PKG_VERSION"));

        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() {
                "aurora> "
            } else {
                "......> "
            };

            match self.editor.readline(prompt) {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());
                    let trimmed = line.trim();

                    if buffer.is_empty() && trimmed.starts_with('.') {
                        if !self.handle_command(trimmed) {
                            break;
                        }
                        continue;
                    }

                    // A lone `;;` flushes the accumulated multi-line buffer
                    if trimmed == ";;" {
                        if !buffer.trim().is_empty() {
                            let input = std::mem::take(&mut buffer);
                            self.eval_input(&input);
                        }
                        continue;
                    }

                    buffer.push_str(&line);
                    buffer.push('\n');

                    if is_input_complete(&buffer) {
                        let input = std::mem::take(&mut buffer);
                        if !input.trim().is_empty() {
                            self.eval_input(&input);
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    buffer.clear();
                    println!("^C");
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("error: {}", err);
                    break;
                }
            }
        }

        self.save_history();
        Ok(())
    }

    /// Dot commands. Returns false when the session should end.
    fn handle_command(&mut self, command: &str) -> bool {
        if command == ".exit" {
            return false;
        }
        if command == ".help" {
            println!(".exit          quit and persist history");
            println!(".help          show this message");
            println!(".load <path>   evaluate a file in the current session");
            println!(";;             evaluate the pending multi-line buffer");
            return true;
        }
        if let Some(path) = command.strip_prefix(".load ") {
            self.load_file(path.trim());
            return true;
        }
        println!("unknown command: {} (try .help)", command);
        true
    }

    fn load_file(&mut self, path: &str) {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("error: cannot read {}: {}", path, err);
                return;
            }
        };
        self.eval_source(&source, path);
    }

    fn eval_input(&mut self, input: &str) {
        if let Some(value) = self.eval_source(input, "repl") {
            if value != Value::Null {
                println!("=> {}", value_to_display(&value));
            }
        }
    }

    fn eval_source(&mut self, source: &str, file: &str) -> Option<Value> {
        let program = match parse_source(source, file) {
            Ok(program) => program,
            Err(err) => {
                eprint!(
                    "{}",
                    render_diagnostics(source, file, &[err.to_diagnostic()], self.color_enabled)
                );
                return None;
            }
        };

        match self.interpreter.run_program(&program) {
            Ok(value) => Some(value),
            Err(err) => {
                eprintln!("error: {}", err.message());
                for frame in err.trace.iter().take(5) {
                    eprintln!("  in {}", frame);
                }
                None
            }
        }
    }

    fn save_history(&mut self) {
        if let Some(path) = &self.history_path {
            let _ = self.editor.save_history(path);
        }
    }
}

/// True when every brace, bracket and parenthesis outside a string or a
/// line comment is balanced.
fn is_input_complete(input: &str) -> bool {
    let mut depth: i32 = 0;
    let mut in_string: Option<char> = None;
    let mut escape_next = false;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if let Some(quote) = in_string {
            match ch {
                '\\' => escape_next = true,
                c if c == quote => in_string = None,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' | '\'' => in_string = Some(ch),
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => depth -= 1,
            _ => {}
        }
    }

    in_string.is_none() && depth <= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_input_is_complete() {
        assert!(is_input_complete("let x = 5;"));
        assert!(is_input_complete("fun f() { return 1; }"));
        assert!(is_input_complete(""));
    }

    #[test]
    fn test_open_delimiters_are_incomplete() {
        assert!(!is_input_complete("fun f() {"));
        assert!(!is_input_complete("let a = [1, 2,"));
        assert!(!is_input_complete("print(\"unclosed"));
    }

    #[test]
    fn test_braces_inside_strings_do_not_count() {
        assert!(is_input_complete("let s = \"{[(\";"));
        assert!(is_input_complete("let s = '}';"));
    }

    #[test]
    fn test_comments_do_not_count() {
        assert!(is_input_complete("let x = 1; // open { brace"));
    }
}
