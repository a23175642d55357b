use std::iter::Peekable;
use std::rc::Rc;
use std::str::CharIndices;

use crate::diagnostic::Span;
use crate::interpreter::error::SyntaxError;
use crate::token::{keyword, Token, TokenKind};

/// Hand-written lexer. Walks the source character by character, tracking
/// 1-based line and column so every token carries the position of its first
/// character. The token stream always ends with an `Eof` token.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    file: Rc<str>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: &str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            file: Rc::from(file),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia();

            let (start, line, column) = (self.offset(), self.line, self.column);
            let Some(&(_, ch)) = self.chars.peek() else {
                tokens.push(self.make_token(TokenKind::Eof, start, line, column));
                break;
            };

            let kind = match ch {
                '"' | '\'' => self.lex_string(ch, start, line, column)?,
                '0'..='9' => self.lex_number(),
                'a'..='z' | 'A'..='Z' | '_' => self.lex_ident(),
                _ => self.lex_operator(start, line, column)?,
            };

            tokens.push(self.make_token(kind, start, line, column));
        }

        Ok(tokens)
    }

    fn offset(&mut self) -> usize {
        match self.chars.peek() {
            Some(&(i, _)) => i,
            None => self.source.len(),
        }
    }

    fn advance(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn make_token(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) -> Token {
        let end = self.offset();
        Token {
            kind,
            lexeme: self.source[start..end].to_string(),
            line,
            column,
            file: self.file.clone(),
            span: Span::new(start, end),
        }
    }

    /// Discard whitespace and comments. `//` runs to end of line; `/* */`
    /// does not nest and an unterminated block comment simply consumes the
    /// rest of the input.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    match lookahead.peek().map(|&(_, c)| c) {
                        Some('/') => {
                            while let Some(c) = self.peek_char() {
                                if c == '\n' {
                                    break;
                                }
                                self.advance();
                            }
                        }
                        Some('*') => {
                            self.advance();
                            self.advance();
                            while let Some(c) = self.advance() {
                                if c == '*' && self.peek_char() == Some('/') {
                                    self.advance();
                                    break;
                                }
                            }
                        }
                        _ => return,
                    }
                }
                _ => return,
            }
        }
    }

    fn lex_string(
        &mut self,
        quote: char,
        start: usize,
        line: usize,
        column: usize,
    ) -> Result<TokenKind, SyntaxError> {
        let unterminated = |lexer: &Lexer<'_>| {
            SyntaxError::new(
                "unterminated string literal",
                line,
                column,
                lexer.file.clone(),
            )
            .with_span(Span::new(start, start + 1))
        };

        self.advance();
        let mut decoded = String::new();

        loop {
            match self.advance() {
                Some(c) if c == quote => return Ok(TokenKind::Str(decoded)),
                Some('\\') => match self.advance() {
                    Some('n') => decoded.push('\n'),
                    Some('t') => decoded.push('\t'),
                    Some('r') => decoded.push('\r'),
                    // Unknown escapes pass the escaped character through
                    // verbatim, which also covers \\ \" \'
                    Some(other) => decoded.push(other),
                    None => return Err(unterminated(self)),
                },
                Some(c) => decoded.push(c),
                None => return Err(unterminated(self)),
            }
        }
    }

    fn lex_number(&mut self) -> TokenKind {
        let start = self.offset();
        while matches!(self.peek_char(), Some('0'..='9')) {
            self.advance();
        }

        // A dot only belongs to the number when a digit follows it;
        // otherwise it is a property access on the literal.
        if self.peek_char() == Some('.') {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            if matches!(lookahead.peek().map(|&(_, c)| c), Some('0'..='9')) {
                self.advance();
                while matches!(self.peek_char(), Some('0'..='9')) {
                    self.advance();
                }
            }
        }

        let end = self.offset();
        let value: f64 = self.source[start..end].parse().unwrap_or(0.0);
        TokenKind::Number(value)
    }

    fn lex_ident(&mut self) -> TokenKind {
        let start = self.offset();
        while matches!(self.peek_char(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        let text = &self.source[start..self.offset()];
        keyword(text).unwrap_or_else(|| TokenKind::Ident(text.to_string()))
    }

    fn lex_operator(
        &mut self,
        start: usize,
        line: usize,
        column: usize,
    ) -> Result<TokenKind, SyntaxError> {
        let ch = self.advance().expect("caller peeked a character");
        let unexpected = |lexer: &mut Lexer<'_>, ch: char| {
            let end = lexer.offset();
            SyntaxError::new(
                format!("unexpected character `{}`", ch),
                line,
                column,
                lexer.file.clone(),
            )
            .with_span(Span::new(start, end.max(start + 1)))
        };
        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => {
                if self.eat('*') {
                    TokenKind::StarStar
                } else {
                    TokenKind::Star
                }
            }
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => {
                if self.eat('=') {
                    TokenKind::Eq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::LessEq
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::GreaterEq
                } else {
                    TokenKind::Greater
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::And
                } else {
                    return Err(unexpected(self, '&'));
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::Or
                } else {
                    return Err(unexpected(self, '|'));
                }
            }
            '?' => TokenKind::Question,
            '~' => TokenKind::Tilde,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            other => return Err(unexpected(self, other)),
        };
        Ok(kind)
    }
}

/// Convenience wrapper used by the interpreter, the module loader and tests.
pub fn tokenize(source: &str, file: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer::new(source, file).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<TokenKind> {
        let mut kinds: Vec<TokenKind> = tokenize(source, "test")
            .expect("lexer failed")
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(kinds.pop(), Some(TokenKind::Eof));
        kinds
    }

    #[test]
    fn test_keywords() {
        assert_eq!(lex("let"), vec![TokenKind::Let]);
        assert_eq!(lex("const"), vec![TokenKind::Const]);
        assert_eq!(lex("fun"), vec![TokenKind::Fun]);
        assert_eq!(lex("class"), vec![TokenKind::Class]);
        assert_eq!(lex("new"), vec![TokenKind::New]);
        assert_eq!(lex("this"), vec![TokenKind::This]);
        assert_eq!(lex("true"), vec![TokenKind::True]);
        assert_eq!(lex("false"), vec![TokenKind::False]);
        assert_eq!(lex("null"), vec![TokenKind::Null]);
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(lex("foo"), vec![TokenKind::Ident("foo".to_string())]);
        assert_eq!(lex("bar123"), vec![TokenKind::Ident("bar123".to_string())]);
        assert_eq!(lex("_test"), vec![TokenKind::Ident("_test".to_string())]);
        // `from` is contextual, not a keyword
        assert_eq!(lex("from"), vec![TokenKind::Ident("from".to_string())]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(lex("42"), vec![TokenKind::Number(42.0)]);
        assert_eq!(lex("0"), vec![TokenKind::Number(0.0)]);
        assert_eq!(lex("3.14"), vec![TokenKind::Number(3.14)]);
        assert_eq!(lex("123.456"), vec![TokenKind::Number(123.456)]);
    }

    #[test]
    fn test_number_followed_by_dot() {
        // `1.` is a number then a dot, not a malformed literal
        assert_eq!(
            lex("1.foo"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Dot,
                TokenKind::Ident("foo".to_string())
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(lex(r#""hello""#), vec![TokenKind::Str("hello".to_string())]);
        assert_eq!(lex("'world'"), vec![TokenKind::Str("world".to_string())]);
        assert_eq!(lex(r#""""#), vec![TokenKind::Str(String::new())]);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            lex(r#""a\nb""#),
            vec![TokenKind::Str("a\nb".to_string())]
        );
        assert_eq!(
            lex(r#""tab\there""#),
            vec![TokenKind::Str("tab\there".to_string())]
        );
        assert_eq!(
            lex(r#""quote\"here""#),
            vec![TokenKind::Str("quote\"here".to_string())]
        );
        assert_eq!(
            lex(r#""back\\slash""#),
            vec![TokenKind::Str("back\\slash".to_string())]
        );
        // Unknown escapes pass through verbatim
        assert_eq!(lex(r#""\q""#), vec![TokenKind::Str("q".to_string())]);
    }

    #[test]
    fn test_unterminated_string_position() {
        let err = tokenize("let s = \"oops", "test").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 9);
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("let x = #;", "test").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 9);
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(lex("=="), vec![TokenKind::Eq]);
        assert_eq!(lex("!="), vec![TokenKind::NotEq]);
        assert_eq!(lex("<="), vec![TokenKind::LessEq]);
        assert_eq!(lex(">="), vec![TokenKind::GreaterEq]);
        assert_eq!(lex("&&"), vec![TokenKind::And]);
        assert_eq!(lex("||"), vec![TokenKind::Or]);
        assert_eq!(lex("**"), vec![TokenKind::StarStar]);
    }

    #[test]
    fn test_greedy_star_star() {
        assert_eq!(
            lex("2**3"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::StarStar,
                TokenKind::Number(3.0)
            ]
        );
        assert_eq!(
            lex("2 * 3"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::Star,
                TokenKind::Number(3.0)
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            lex("// a comment\nlet x = 5;"),
            vec![
                TokenKind::Let,
                TokenKind::Ident("x".to_string()),
                TokenKind::Assign,
                TokenKind::Number(5.0),
                TokenKind::Semicolon
            ]
        );
        assert_eq!(
            lex("/* block */ let x = 5;"),
            vec![
                TokenKind::Let,
                TokenKind::Ident("x".to_string()),
                TokenKind::Assign,
                TokenKind::Number(5.0),
                TokenKind::Semicolon
            ]
        );
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let tokens = tokenize("/* one\ntwo */ x", "test").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Ident("x".to_string()));
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[0].column, 8);
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("let x = 5;\n  x = 6;", "test").unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1)); // let
        assert_eq!((tokens[1].line, tokens[1].column), (1, 5)); // x
        assert_eq!((tokens[3].line, tokens[3].column), (1, 9)); // 5
        assert_eq!((tokens[5].line, tokens[5].column), (2, 3)); // x
    }

    #[test]
    fn test_eof_token() {
        let tokens = tokenize("", "test").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
    }

    #[test]
    fn test_statement_stream() {
        assert_eq!(
            lex("arr[0].name"),
            vec![
                TokenKind::Ident("arr".to_string()),
                TokenKind::LBracket,
                TokenKind::Number(0.0),
                TokenKind::RBracket,
                TokenKind::Dot,
                TokenKind::Ident("name".to_string())
            ]
        );
    }

    #[test]
    fn test_lexeme_preserved() {
        let tokens = tokenize("\"hi\\n\"", "test").unwrap();
        assert_eq!(tokens[0].lexeme, "\"hi\\n\"");
        assert_eq!(tokens[0].kind, TokenKind::Str("hi\n".to_string()));
    }
}
