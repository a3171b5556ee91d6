//! Expression evaluator with variable binding.

use super::ast::{BinaryOperator, Expr};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Variable bindings supplied by the caller
pub type Environment = HashMap<String, f64>;

/// Evaluation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Reference to a variable missing from the environment
    #[error("Undefined variable: '{name}'")]
    UndefinedVariable { name: String },
    /// Right operand of '/' evaluated to zero
    #[error("Division by zero")]
    DivisionByZero,
}

/// Evaluation context
pub struct EvalContext<'a> {
    env: &'a Environment,
}

impl<'a> EvalContext<'a> {
    pub fn new(env: &'a Environment) -> Self {
        Self { env }
    }

    fn eval_variable(&self, name: &str) -> Result<f64, EvalError> {
        let value = self
            .env
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UndefinedVariable {
                name: name.to_string(),
            })?;
        tracing::trace!("{} = {}", name, value);
        Ok(value)
    }

    /// Evaluate an expression, left operand first
    pub fn eval_expr(&self, expr: &Expr) -> Result<f64, EvalError> {
        match expr {
            Expr::Number(n) => Ok(*n),

            Expr::Variable(name) => self.eval_variable(name),

            Expr::Unary { operand } => Ok(-self.eval_expr(operand)?),

            Expr::Binary { op, left, right } => {
                let l = self.eval_expr(left)?;
                let r = self.eval_expr(right)?;

                match op {
                    BinaryOperator::Add => Ok(l + r),
                    BinaryOperator::Sub => Ok(l - r),
                    BinaryOperator::Mul => Ok(l * r),
                    BinaryOperator::Div => {
                        if r == 0.0 {
                            Err(EvalError::DivisionByZero)
                        } else {
                            Ok(l / r)
                        }
                    }
                    BinaryOperator::Pow => Ok(l.powf(r)),
                }
            }

            Expr::Call { function, arg } => Ok(function.apply(self.eval_expr(arg)?)),
        }
    }
}

/// Evaluate an AST against the given variable bindings
pub fn evaluate(expr: &Expr, env: &Environment) -> Result<f64, EvalError> {
    let value = EvalContext::new(env).eval_expr(expr)?;
    tracing::debug!("{} => {}", expr, value);
    Ok(value)
}

/// Every distinct variable name referenced by `expr`
pub fn collect_variables(expr: &Expr) -> BTreeSet<String> {
    fn walk(node: &Expr, out: &mut BTreeSet<String>) {
        match node {
            Expr::Number(_) => {}
            Expr::Variable(name) => {
                if !out.contains(name) {
                    out.insert(name.clone());
                }
            }
            Expr::Unary { operand } => walk(operand, out),
            Expr::Binary { left, right, .. } => {
                walk(left, out);
                walk(right, out);
            }
            Expr::Call { arg, .. } => walk(arg, out),
        }
    }

    let mut out = BTreeSet::new();
    walk(expr, &mut out);
    out
}

/// Variables referenced by `expr` that `env` does not bind
pub fn missing_variables(expr: &Expr, env: &Environment) -> BTreeSet<String> {
    collect_variables(expr)
        .into_iter()
        .filter(|name| !env.contains_key(name))
        .collect()
}
