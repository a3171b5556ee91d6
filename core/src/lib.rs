pub mod expr;

pub use expr::{
    calculate, collect_variables, evaluate, missing_variables, parse, parse_expression,
    parse_with, tokenize, BinaryOperator, Environment, EvalContext, EvalError, Expr, ExprError,
    Function, LexError, ParseError, ParseOptions, Token, TokenKind,
};
