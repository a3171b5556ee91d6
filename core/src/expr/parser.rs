//! Recursive-descent parser for expression tokens.
//!
//! Grammar, lowest to highest precedence:
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := unary (('*' | '/') unary)*
//! unary      := '-' unary | factor
//! factor     := primary ('^' unary)?
//! primary    := NUMBER | 'pi' | 'e' | VAR
//!             | ('sin' | 'cos' | 'tan') '(' expression ')'
//!             | '(' expression ')'
//! ```
//!
//! Negation wraps a whole power chain (`-2^2` is `-(2^2)`), while the exponent
//! re-enters through `unary` so `2^-3` and `2^3^2 = 2^(3^2)` both parse.

use super::ast::{BinaryOperator, Expr, Function};
use super::lexer::{Token, TokenKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const EXPECTED_PRIMARY: &str = "number, variable, function (sin/cos/tan) or '('";

/// Parse error with location info
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty expression")]
    EmptyExpression,
    #[error("Unexpected {} at position {position}, expected {expected_description}", .found.describe())]
    UnexpectedToken {
        position: usize,
        found: Token,
        expected_description: String,
    },
    #[error("Unexpected tokens after expression, starting with {} at position {position}", .found.describe())]
    TrailingTokens { position: usize, found: Token },
    #[error("Expression nested deeper than {limit} levels at position {position}")]
    NestingTooDeep { position: usize, limit: usize },
}

/// Parser settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Maximum tree height: nested groups, calls, negations, exponents and
    /// each extra operand of a `+ - * /` chain all count one level
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Parser for expressions
struct Parser<'a> {
    tokens: &'a [Token],
    index: usize,
    /// Stands in for a missing trailing `Eof`
    eof: Token,
    depth: usize,
    options: ParseOptions,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], options: ParseOptions) -> Self {
        let end = tokens
            .last()
            .map(|t| t.position + t.text.chars().count())
            .unwrap_or(0);
        Self {
            tokens,
            index: 0,
            eof: Token::new(TokenKind::Eof, "", end),
            depth: 0,
            options,
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.index).unwrap_or(&self.eof)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn advance(&mut self) {
        if self.index < self.tokens.len() {
            self.index += 1;
        }
    }

    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        let found = self.current().clone();
        ParseError::UnexpectedToken {
            position: found.position,
            found,
            expected_description: expected.into(),
        }
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(ParseError::NestingTooDeep {
                position: self.current().position,
                limit: self.options.max_depth,
            });
        }
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<(), ParseError> {
        if !self.check(kind) {
            return Err(self.unexpected(expected));
        }
        self.advance();
        Ok(())
    }

    fn parse(&mut self) -> Result<Expr, ParseError> {
        if self.check(TokenKind::Eof) {
            return Err(ParseError::EmptyExpression);
        }

        let expr = self.parse_expression()?;

        if !self.check(TokenKind::Eof) {
            let found = self.current().clone();
            return Err(ParseError::TrailingTokens {
                position: found.position,
                found,
            });
        }
        Ok(expr)
    }

    // Expression: term (('+' | '-') term)*
    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        let mut levels = 0;

        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Sub,
                _ => break,
            };
            self.advance();
            // Each operand deepens the left spine by one
            self.descend()?;
            levels += 1;
            let right = self.parse_term()?;
            left = Expr::binary(op, left, right);
        }

        self.depth -= levels;
        Ok(left)
    }

    // Term: unary (('*' | '/') unary)*
    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        let mut levels = 0;

        loop {
            let op = match self.current().kind {
                TokenKind::Multi => BinaryOperator::Mul,
                TokenKind::Div => BinaryOperator::Div,
                _ => break,
            };
            self.advance();
            self.descend()?;
            levels += 1;
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }

        self.depth -= levels;
        Ok(left)
    }

    // Unary: '-' unary | factor
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        self.descend()?;

        let result = if self.check(TokenKind::Minus) {
            self.advance();
            self.parse_unary().map(Expr::negate)
        } else {
            self.parse_factor()
        };

        self.depth -= 1;
        result
    }

    // Factor: primary ('^' unary)?  (right associative)
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_primary()?;

        if self.check(TokenKind::Pow) {
            self.advance();
            // The exponent's own factor picks up any further '^'
            let exp = self.parse_unary()?;
            Ok(Expr::binary(BinaryOperator::Pow, base, exp))
        } else {
            Ok(base)
        }
    }

    // Primary: number | pi | e | var | function '(' expression ')' | '(' expression ')'
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current();
        match token.kind {
            TokenKind::Number => {
                let value = token
                    .text
                    .parse::<f64>()
                    .map_err(|_| self.unexpected("a valid number"))?;
                self.advance();
                Ok(Expr::Number(value))
            }
            TokenKind::Pi => {
                self.advance();
                Ok(Expr::Number(std::f64::consts::PI))
            }
            TokenKind::EConst => {
                self.advance();
                Ok(Expr::Number(std::f64::consts::E))
            }
            TokenKind::Var => {
                let name = token.text.clone();
                self.advance();
                Ok(Expr::Variable(name))
            }
            TokenKind::Sin | TokenKind::Cos | TokenKind::Tan => {
                let function = match token.kind {
                    TokenKind::Sin => Function::Sin,
                    TokenKind::Cos => Function::Cos,
                    _ => Function::Tan,
                };
                self.advance();

                self.expect(TokenKind::LPar, &format!("'(' after function '{}'", function))?;
                let arg = self.parse_expression()?;
                self.expect(TokenKind::RPar, &format!("')' to close function '{}'", function))?;

                Ok(Expr::call(function, arg))
            }
            TokenKind::LPar => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RPar, "')' to close parenthesis")?;
                Ok(expr)
            }
            _ => Err(self.unexpected(EXPECTED_PRIMARY)),
        }
    }
}

/// Parse a token sequence into an AST with default options
pub fn parse(tokens: &[Token]) -> Result<Expr, ParseError> {
    parse_with(tokens, &ParseOptions::default())
}

/// Parse a token sequence into an AST
pub fn parse_with(tokens: &[Token], options: &ParseOptions) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(tokens, *options);
    let expr = parser.parse()?;
    tracing::debug!("parsed {}", expr);
    Ok(expr)
}
