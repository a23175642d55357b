use owo_colors::OwoColorize;

/// Byte range of a lexeme or construct within its source unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Placeholder for positions the evaluator cannot attribute to source,
    /// such as a stray signal surfacing at the top level.
    pub const NONE: Span = Span { start: 0, end: 0 };

    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both operands; how expression spans grow as
    /// the parser folds binary and postfix forms.
    pub fn union(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Span::NONE
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A caret-underlined region with its annotation.
#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// One reportable error. Aurora never emits warnings, so there is no
/// severity axis: a diagnostic is an error with an optional code, labelled
/// source regions, and free-form notes.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: Option<&'static str>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.notes.push(format!("help: {}", help.into()));
        self
    }
}

/// 1-based line and column of a byte offset. Columns count characters, not
/// bytes, matching the positions the lexer stamps on tokens.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let clamped = offset.min(source.len());
    let before = &source[..clamped];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

fn line_content(source: &str, line_num: usize) -> Option<&str> {
    source.lines().nth(line_num.saturating_sub(1))
}

pub struct DiagnosticRenderer<'a> {
    source: &'a str,
    file_name: &'a str,
    use_color: bool,
}

impl<'a> DiagnosticRenderer<'a> {
    pub fn new(source: &'a str, file_name: &'a str, use_color: bool) -> Self {
        Self {
            source,
            file_name,
            use_color,
        }
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();

        self.render_header(&mut output, diagnostic);

        let first_label = diagnostic.labels.iter().find(|l| !l.span.is_none());
        let Some(primary) = first_label else {
            for note in &diagnostic.notes {
                output.push_str(&format!("  {} {}\n", self.frame("="), note));
            }
            return output;
        };

        let (line, col) = line_col(self.source, primary.span.start);
        output.push_str(&format!(
            "  {} {}:{}:{}\n",
            self.frame("-->"),
            self.file_name,
            line,
            col
        ));

        let line_num_width = line.to_string().len();
        let gutter = " ".repeat(line_num_width + 1);
        output.push_str(&format!("{} {}\n", gutter, self.frame("|")));

        if let Some(content) = line_content(self.source, line) {
            output.push_str(&format!(
                "{:>width$} {} {}\n",
                self.frame(&line.to_string()),
                self.frame("|"),
                content,
                width = line_num_width + 1
            ));

            // Underline at most to the end of the line; a span continuing
            // onto later lines is carted as one caret run here
            let line_len = content.chars().count();
            let carets = primary
                .span
                .len()
                .max(1)
                .min(line_len.saturating_sub(col - 1).max(1));
            let mut underline = " ".repeat(col.saturating_sub(1));
            underline.push_str(&"^".repeat(carets));
            output.push_str(&format!(
                "{} {} {}",
                gutter,
                self.frame("|"),
                self.accent(&underline)
            ));
            if !primary.message.is_empty() {
                output.push(' ');
                output.push_str(&self.accent(&primary.message));
            }
            output.push('\n');
        }

        output.push_str(&format!("{} {}\n", gutter, self.frame("|")));

        for note in &diagnostic.notes {
            let marker = if note.starts_with("help:") {
                self.hint("=")
            } else {
                self.frame("=")
            };
            output.push_str(&format!("  {} {}\n", marker, note));
        }

        output
    }

    fn render_header(&self, output: &mut String, diagnostic: &Diagnostic) {
        let heading = match diagnostic.code {
            Some(code) => format!("error[{}]", code),
            None => "error".to_string(),
        };
        output.push_str(&format!(
            "{}: {}\n",
            self.heading(&heading),
            self.emphasis(&diagnostic.message)
        ));
    }

    fn heading(&self, text: &str) -> String {
        if self.use_color {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn accent(&self, text: &str) -> String {
        if self.use_color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    fn frame(&self, text: &str) -> String {
        if self.use_color {
            text.blue().to_string()
        } else {
            text.to_string()
        }
    }

    fn hint(&self, text: &str) -> String {
        if self.use_color {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    fn emphasis(&self, text: &str) -> String {
        if self.use_color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

pub fn render_diagnostics(
    source: &str,
    file_name: &str,
    diagnostics: &[Diagnostic],
    use_color: bool,
) -> String {
    let renderer = DiagnosticRenderer::new(source, file_name, use_color);
    let mut output = String::new();

    for diagnostic in diagnostics {
        output.push_str(&renderer.render(diagnostic));
        output.push('\n');
    }

    if !diagnostics.is_empty() {
        output.push_str(&format!(
            "error: aborting due to {} error{}\n",
            diagnostics.len(),
            if diagnostics.len() == 1 { "" } else { "s" }
        ));
    }

    output
}
