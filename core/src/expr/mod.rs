//! Arithmetic and trigonometric expressions.
//!
//! Three independent stages, each with its own error type:
//! - [`tokenize`]: text to tokens
//! - [`parse`]: tokens to [`Expr`]
//! - [`evaluate`]: [`Expr`] plus an [`Environment`] to a number
//!
//! [`calculate`] chains all three for callers that do not need the
//! intermediate results.

pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod parser;

#[cfg(test)]
mod tests;

pub use ast::{BinaryOperator, Expr, Function};
pub use evaluator::{
    collect_variables, evaluate, missing_variables, Environment, EvalContext, EvalError,
};
pub use lexer::{tokenize, LexError, Token, TokenKind};
pub use parser::{parse, parse_with, ParseError, ParseOptions};

use thiserror::Error;

/// Failure of any pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("Lexical error: {0}")]
    Lex(#[from] LexError),
    #[error("Syntax error: {0}")]
    Parse(#[from] ParseError),
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
}

/// Tokenize and parse an expression string
pub fn parse_expression(input: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(input)?;
    Ok(parse(&tokens)?)
}

/// Tokenize, parse and evaluate an expression string
pub fn calculate(input: &str, env: &Environment) -> Result<f64, ExprError> {
    let expr = parse_expression(input)?;
    Ok(evaluate(&expr, env)?)
}
