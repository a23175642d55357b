use std::rc::Rc;

use crate::ast::{BinaryOp, Expr, ExprKind, Literal, LogicalOp, MethodDef, Stmt, UnaryOp};
use crate::interpreter::error::SyntaxError;
use crate::token::{Token, TokenKind};

/// Recursive-descent parser over the lexed token vector. Precedence is
/// encoded in the method hierarchy; assignment and `**` associate to the
/// right, every other binary operator to the left.
pub struct TokenParser {
    tokens: Vec<Token>,
    current: usize,
}

impl TokenParser {
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| &t.kind),
            Some(TokenKind::Eof)
        ));
        Self { tokens, current: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.at_end() {
            self.current += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek().is(kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!(
                "expected {}, found {}",
                kind.describe(),
                self.peek().kind.describe()
            )))
        }
    }

    fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        let token = self.peek();
        SyntaxError::new(message, token.line, token.column, token.file.clone())
            .with_span(token.span)
    }

    fn expect_ident(&mut self, what: &str) -> Result<Rc<str>, SyntaxError> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = Rc::from(name.as_str());
                self.advance();
                Ok(name)
            }
            other => Err(self.error_here(format!(
                "expected {}, found {}",
                what,
                other.describe()
            ))),
        }
    }

    pub fn parse(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut statements = Vec::new();
        while !self.at_end() {
            statements.push(self.parse_declaration()?);
        }
        Ok(statements)
    }

    fn parse_declaration(&mut self) -> Result<Stmt, SyntaxError> {
        match self.peek().kind {
            TokenKind::Let | TokenKind::Const => {
                let decl = self.parse_var_decl()?;
                self.eat(&TokenKind::Semicolon);
                Ok(decl)
            }
            // `fun name(...)` declares; a bare `fun (...)` is an expression
            TokenKind::Fun if matches!(self.peek_next(), TokenKind::Ident(_)) => {
                self.parse_function_decl()
            }
            TokenKind::Class => self.parse_class_decl(),
            TokenKind::Import => self.parse_import(),
            _ => self.parse_statement(),
        }
    }

    fn peek_next(&self) -> &TokenKind {
        let idx = (self.current + 1).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    /// Variable declaration without the trailing semicolon, so `for` can
    /// reuse it for its init clause.
    fn parse_var_decl(&mut self) -> Result<Stmt, SyntaxError> {
        let keyword = self.advance();
        let name = self.expect_ident("a variable name")?;
        let init = if self.eat(&TokenKind::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let span = keyword.span;
        match keyword.kind {
            TokenKind::Let => Ok(Stmt::Let { name, init, span }),
            TokenKind::Const => Ok(Stmt::Const { name, init, span }),
            _ => unreachable!("caller checked for let/const"),
        }
    }

    fn parse_function_decl(&mut self) -> Result<Stmt, SyntaxError> {
        let keyword = self.advance();
        let name = self.expect_ident("a function name")?;
        let params = self.parse_params()?;
        let body = Rc::new(self.parse_block()?);
        Ok(Stmt::Function {
            name,
            params,
            body,
            span: keyword.span,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Rc<str>>, SyntaxError> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.expect_ident("a parameter name")?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_class_decl(&mut self) -> Result<Stmt, SyntaxError> {
        let keyword = self.advance();
        let name = self.expect_ident("a class name")?;
        self.expect(TokenKind::LBrace)?;

        let mut methods = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let method_name = self.expect_ident("a method name")?;
            let params = self.parse_params()?;
            let body = Rc::new(self.parse_block()?);
            methods.push(MethodDef {
                name: method_name,
                params,
                body,
            });
        }
        self.expect(TokenKind::RBrace)?;

        Ok(Stmt::Class {
            name,
            methods,
            span: keyword.span,
        })
    }

    fn parse_import(&mut self) -> Result<Stmt, SyntaxError> {
        let keyword = self.advance();

        // Named form: `import X from "path"` -- `from` is contextual
        if let TokenKind::Ident(_) = self.peek().kind {
            let local = self.expect_ident("a binding name")?;
            match &self.peek().kind {
                TokenKind::Ident(word) if word == "from" => {
                    self.advance();
                }
                other => {
                    return Err(self.error_here(format!(
                        "expected `from`, found {}",
                        other.describe()
                    )))
                }
            }
            let path = self.expect_string("a module path")?;
            self.eat(&TokenKind::Semicolon);
            return Ok(Stmt::Import {
                local: Some(local),
                path,
                span: keyword.span,
            });
        }

        let path = self.expect_string("a module path")?;
        self.eat(&TokenKind::Semicolon);
        Ok(Stmt::Import {
            local: None,
            path,
            span: keyword.span,
        })
    }

    fn expect_string(&mut self, what: &str) -> Result<String, SyntaxError> {
        match &self.peek().kind {
            TokenKind::Str(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            other => Err(self.error_here(format!(
                "expected {}, found {}",
                what,
                other.describe()
            ))),
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt, SyntaxError> {
        match self.peek().kind {
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::Break => {
                let token = self.advance();
                self.eat(&TokenKind::Semicolon);
                Ok(Stmt::Break(token.span))
            }
            TokenKind::Continue => {
                let token = self.advance();
                self.eat(&TokenKind::Semicolon);
                Ok(Stmt::Continue(token.span))
            }
            _ => {
                let expr = self.parse_expression()?;
                self.eat(&TokenKind::Semicolon);
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        self.expect(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            statements.push(self.parse_declaration()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(statements)
    }

    fn parse_if(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance();
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance();
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::While { condition, body })
    }

    fn parse_for(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance();
        self.expect(TokenKind::LParen)?;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if matches!(self.peek().kind, TokenKind::Let | TokenKind::Const) {
            Some(Box::new(self.parse_var_decl()?))
        } else {
            Some(Box::new(Stmt::Expr(self.parse_expression()?)))
        };
        self.expect(TokenKind::Semicolon)?;

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::RParen)?;

        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For {
            init,
            condition,
            update,
            body,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, SyntaxError> {
        let keyword = self.advance();
        let value = if matches!(
            self.peek().kind,
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        ) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.eat(&TokenKind::Semicolon);
        Ok(Stmt::Return {
            value,
            span: keyword.span,
        })
    }

    fn parse_try(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance();
        let body = self.parse_block()?;

        let mut catch_name = None;
        let mut catch_body = None;
        if self.eat(&TokenKind::Catch) {
            if self.eat(&TokenKind::LParen) {
                catch_name = Some(self.expect_ident("a catch binding")?);
                self.expect(TokenKind::RParen)?;
            }
            catch_body = Some(self.parse_block()?);
        }

        Ok(Stmt::Try {
            body,
            catch_name,
            catch_body,
        })
    }

    fn parse_throw(&mut self) -> Result<Stmt, SyntaxError> {
        let keyword = self.advance();
        let value = self.parse_expression()?;
        self.eat(&TokenKind::Semicolon);
        Ok(Stmt::Throw {
            value,
            span: keyword.span,
        })
    }

    fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, SyntaxError> {
        let left = self.parse_or()?;

        if self.check(&TokenKind::Assign) {
            if !matches!(
                left.kind,
                ExprKind::Identifier(_) | ExprKind::Property { .. } | ExprKind::Index { .. }
            ) {
                return Err(self.error_here("invalid assignment target"));
            }
            self.advance();
            let value = self.parse_assignment()?;
            let span = left.span.union(value.span);
            return Ok(Expr::new(
                ExprKind::Assign {
                    target: Box::new(left),
                    value: Box::new(value),
                },
                span,
            ));
        }

        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            let span = left.span.union(right.span);
            left = Expr::new(
                ExprKind::Logical {
                    op: LogicalOp::Or,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_equality()?;
            let span = left.span.union(right.span);
            left = Expr::new(
                ExprKind::Logical {
                    op: LogicalOp::And,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Eq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            let span = left.span.union(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Less => BinaryOp::Less,
                TokenKind::LessEq => BinaryOp::LessEq,
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::GreaterEq => BinaryOp::GreaterEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            let span = left.span.union(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            let span = left.span.union(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_power()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_power()?;
            let span = left.span.union(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `**` is right-associative: `2 ** 3 ** 2` is `2 ** (3 ** 2)`.
    fn parse_power(&mut self) -> Result<Expr, SyntaxError> {
        let left = self.parse_unary()?;
        if self.eat(&TokenKind::StarStar) {
            let right = self.parse_power()?;
            let span = left.span.union(right.span);
            return Ok(Expr::new(
                ExprKind::Binary {
                    op: BinaryOp::Pow,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            ));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek().kind {
            TokenKind::Bang => {
                let token = self.advance();
                let expr = self.parse_unary()?;
                let span = token.span.union(expr.span);
                Ok(Expr::new(
                    ExprKind::Unary {
                        op: UnaryOp::Not,
                        expr: Box::new(expr),
                    },
                    span,
                ))
            }
            TokenKind::Minus => {
                let token = self.advance();
                let expr = self.parse_unary()?;
                let span = token.span.union(expr.span);
                Ok(Expr::new(
                    ExprKind::Unary {
                        op: UnaryOp::Neg,
                        expr: Box::new(expr),
                    },
                    span,
                ))
            }
            TokenKind::New => {
                let token = self.advance();
                // The operand is typically a call; construction pulls the
                // class and arguments out of it at evaluation time.
                let callee = self.parse_unary()?;
                let span = token.span.union(callee.span);
                Ok(Expr::new(
                    ExprKind::New {
                        callee: Box::new(callee),
                    },
                    span,
                ))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek().kind {
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(&TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expression()?);
                            if !self.eat(&TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    let close = self.expect(TokenKind::RParen)?;
                    let span = expr.span.union(close.span);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_ident("a property name")?;
                    let span = expr.span.union(self.previous_span());
                    expr = Expr::new(
                        ExprKind::Property {
                            object: Box::new(expr),
                            name: name.to_string(),
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    let close = self.expect(TokenKind::RBracket)?;
                    let span = expr.span.union(close.span);
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn previous_span(&self) -> crate::diagnostic::Span {
        let idx = self.current.saturating_sub(1);
        self.tokens[idx].span
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.peek().clone();
        let span = token.span;

        let kind = match token.kind {
            TokenKind::Number(n) => {
                self.advance();
                ExprKind::Literal(Literal::Number(n))
            }
            TokenKind::Str(ref s) => {
                let s: Rc<str> = Rc::from(s.as_str());
                self.advance();
                ExprKind::Literal(Literal::Str(s))
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Literal(Literal::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Literal(Literal::Bool(false))
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Literal(Literal::Null)
            }
            TokenKind::This => {
                self.advance();
                ExprKind::This
            }
            TokenKind::Ident(ref name) => {
                let name: Rc<str> = Rc::from(name.as_str());
                self.advance();
                ExprKind::Identifier(name)
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                return Ok(expr);
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(&TokenKind::RBracket) {
                    loop {
                        elements.push(self.parse_expression()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let close = self.expect(TokenKind::RBracket)?;
                return Ok(Expr::new(
                    ExprKind::Array { elements },
                    span.union(close.span),
                ));
            }
            TokenKind::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                if !self.check(&TokenKind::RBrace) {
                    loop {
                        let key = match &self.peek().kind {
                            TokenKind::Ident(name) => {
                                let key = name.clone();
                                self.advance();
                                key
                            }
                            TokenKind::Str(s) => {
                                let key = s.clone();
                                self.advance();
                                key
                            }
                            other => {
                                return Err(self.error_here(format!(
                                    "expected an object key, found {}",
                                    other.describe()
                                )))
                            }
                        };
                        self.expect(TokenKind::Colon)?;
                        let value = self.parse_expression()?;
                        fields.push((key, value));
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let close = self.expect(TokenKind::RBrace)?;
                return Ok(Expr::new(
                    ExprKind::Object { fields },
                    span.union(close.span),
                ));
            }
            TokenKind::Fun => {
                self.advance();
                let name = if let TokenKind::Ident(_) = self.peek().kind {
                    Some(self.expect_ident("a function name")?)
                } else {
                    None
                };
                let params = self.parse_params()?;
                let body = Rc::new(self.parse_block()?);
                return Ok(Expr::new(
                    ExprKind::Function { name, params, body },
                    span.union(self.previous_span()),
                ));
            }
            ref other => {
                return Err(self.error_here(format!(
                    "unexpected {} in expression",
                    other.describe()
                )))
            }
        };

        Ok(Expr::new(kind, span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(source: &str) -> Vec<Stmt> {
        let tokens = tokenize(source, "test").expect("lexer failed");
        TokenParser::new(tokens).parse().expect("parser failed")
    }

    fn parse_err(source: &str) -> SyntaxError {
        let tokens = tokenize(source, "test").expect("lexer failed");
        TokenParser::new(tokens).parse().unwrap_err()
    }

    #[test]
    fn test_var_declarations() {
        let stmts = parse("let x = 5; const y = 2; let z;");
        assert_eq!(stmts.len(), 3);
        assert!(matches!(&stmts[0], Stmt::Let { init: Some(_), .. }));
        assert!(matches!(&stmts[1], Stmt::Const { init: Some(_), .. }));
        assert!(matches!(&stmts[2], Stmt::Let { init: None, .. }));
    }

    #[test]
    fn test_power_is_right_associative() {
        let stmts = parse("2 ** 3 ** 2;");
        let Stmt::Expr(expr) = &stmts[0] else {
            panic!("expected expression statement");
        };
        let ExprKind::Binary { op, right, .. } = &expr.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Pow);
        assert!(matches!(
            right.kind,
            ExprKind::Binary {
                op: BinaryOp::Pow,
                ..
            }
        ));
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let stmts = parse("1 + 2 * 3;");
        let Stmt::Expr(expr) = &stmts[0] else {
            panic!("expected expression statement");
        };
        let ExprKind::Binary { op, right, .. } = &expr.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(
            right.kind,
            ExprKind::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = parse_err("1 + 2 = 3;");
        assert!(err.message.contains("invalid assignment target"));
    }

    #[test]
    fn test_property_call_shape() {
        let stmts = parse("obj.method(1, 2);");
        let Stmt::Expr(expr) = &stmts[0] else {
            panic!("expected expression statement");
        };
        let ExprKind::Call { callee, args } = &expr.kind else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 2);
        assert!(matches!(callee.kind, ExprKind::Property { .. }));
    }

    #[test]
    fn test_new_wraps_call() {
        let stmts = parse("new Point(1, 2);");
        let Stmt::Expr(expr) = &stmts[0] else {
            panic!("expected expression statement");
        };
        let ExprKind::New { callee } = &expr.kind else {
            panic!("expected new expression");
        };
        assert!(matches!(callee.kind, ExprKind::Call { .. }));
    }

    #[test]
    fn test_class_with_methods() {
        let stmts = parse("class P { constructor(x) { this.x = x; } get() { return this.x; } }");
        let Stmt::Class { name, methods, .. } = &stmts[0] else {
            panic!("expected class declaration");
        };
        assert_eq!(name.as_ref(), "P");
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].name.as_ref(), "constructor");
        assert_eq!(methods[1].name.as_ref(), "get");
    }

    #[test]
    fn test_import_forms() {
        let stmts = parse("import \"./lib.aur\"; import util from \"./util.aur\";");
        assert!(matches!(&stmts[0], Stmt::Import { local: None, .. }));
        let Stmt::Import {
            local: Some(local), ..
        } = &stmts[1]
        else {
            panic!("expected named import");
        };
        assert_eq!(local.as_ref(), "util");
    }

    #[test]
    fn test_for_with_decl_init() {
        let stmts = parse("for (let i = 0; i < 3; i = i + 1) { print(i); }");
        let Stmt::For {
            init,
            condition,
            update,
            ..
        } = &stmts[0]
        else {
            panic!("expected for statement");
        };
        assert!(init.is_some());
        assert!(condition.is_some());
        assert!(update.is_some());
    }

    #[test]
    fn test_for_with_empty_clauses() {
        let stmts = parse("for (;;) break;");
        let Stmt::For {
            init,
            condition,
            update,
            ..
        } = &stmts[0]
        else {
            panic!("expected for statement");
        };
        assert!(init.is_none());
        assert!(condition.is_none());
        assert!(update.is_none());
    }

    #[test]
    fn test_try_catch_forms() {
        let stmts = parse("try { x; } catch (e) { y; } try { x; } catch { y; } try { x; }");
        assert!(matches!(
            &stmts[0],
            Stmt::Try {
                catch_name: Some(_),
                catch_body: Some(_),
                ..
            }
        ));
        assert!(matches!(
            &stmts[1],
            Stmt::Try {
                catch_name: None,
                catch_body: Some(_),
                ..
            }
        ));
        assert!(matches!(
            &stmts[2],
            Stmt::Try {
                catch_name: None,
                catch_body: None,
                ..
            }
        ));
    }

    #[test]
    fn test_anonymous_function_expression() {
        let stmts = parse("let f = fun(a, b) { return a + b; };");
        let Stmt::Let {
            init: Some(init), ..
        } = &stmts[0]
        else {
            panic!("expected let with init");
        };
        let ExprKind::Function { name, params, .. } = &init.kind else {
            panic!("expected function expression");
        };
        assert!(name.is_none());
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_error_carries_position() {
        let err = parse_err("let = 5;");
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 5);
    }

    #[test]
    fn test_export_is_reserved() {
        assert!(parse_err("export x;").message.contains("unexpected"));
    }
}
