//! End-to-end scenarios for the expression pipeline.

use super::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn calc(input: &str) -> f64 {
    init_tracing();
    calculate(input, &Environment::new()).unwrap()
}

fn calc_with(input: &str, vars: &[(&str, f64)]) -> f64 {
    init_tracing();
    let env: Environment = vars.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    calculate(input, &env).unwrap()
}

fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() < tol,
        "expected {} (±{}), got {}",
        expected,
        tol,
        actual
    );
}

#[test]
fn test_precedence() {
    assert_close(calc("3 + 4 * 2"), 11.0, 1e-10);
    assert_close(calc("(3 + 4) * 2"), 14.0, 1e-10);
}

#[test]
fn test_unary_minus_and_power() {
    assert_close(calc("-2^2"), -4.0, 1e-10);
    assert_close(calc("2^3^2"), 512.0, 1e-10);
    assert_close(calc("2^-1"), 0.5, 1e-10);
    assert_close(calc("-(-5)"), 5.0, 1e-10);
    assert_close(calc("--3"), 3.0, 1e-10);
}

#[test]
fn test_functions_and_constants() {
    assert_close(calc("sin(pi/2)"), 1.0, 1e-4);
    assert_close(calc("cos(0) + sin(pi)"), 1.0, 1e-4);
    assert_close(calc("tan(pi/4)"), 1.0, 1e-4);
    assert_close(calc("e^1"), std::f64::consts::E, 1e-5);
    assert_close(calc("2*pi"), 2.0 * std::f64::consts::PI, 1e-5);
    assert_close(calc("2^(1/2)"), 1.41421356, 1e-5);
}

#[test]
fn test_variables() {
    let expr = parse_expression("x*2+y").unwrap();
    let vars: Vec<_> = collect_variables(&expr).into_iter().collect();
    assert_eq!(vars, vec!["x", "y"]);

    assert_close(calc_with("x*2+y", &[("x", 3.0), ("y", 4.0)]), 10.0, 1e-10);
    assert_close(calc_with("cos(x)^2 + sin(x)^2", &[("x", 0.5)]), 1.0, 1e-4);
    assert_close(calc_with("sin(cos(x))", &[("x", 0.0)]), 0.8414709848, 1e-4);
}

#[test]
fn test_decimal_forms() {
    assert_close(calc("3.5 * 2.0 + .5"), 7.5, 1e-10);
}

#[test]
fn test_lexical_errors() {
    let env = Environment::new();
    assert!(matches!(
        calculate("5..3", &env),
        Err(ExprError::Lex(LexError::MalformedNumber { .. }))
    ));
    assert!(matches!(
        calculate("3 + .", &env),
        Err(ExprError::Lex(LexError::MalformedNumber { .. }))
    ));
    assert!(matches!(
        calculate("3 @ 4", &env),
        Err(ExprError::Lex(LexError::UnknownCharacter { character: '@', .. }))
    ));
}

#[test]
fn test_syntax_errors() {
    let env = Environment::new();
    assert!(matches!(
        calculate("(3+4", &env),
        Err(ExprError::Parse(ParseError::UnexpectedToken { .. }))
    ));
    assert!(matches!(
        calculate("3+4)", &env),
        Err(ExprError::Parse(ParseError::TrailingTokens { .. }))
    ));
    assert!(matches!(
        calculate("", &env),
        Err(ExprError::Parse(ParseError::EmptyExpression))
    ));
    for input in ["3 + * 4", "2^", "sin 1", "3 ++ 4", "()", "sin()", "* 3"] {
        assert!(
            matches!(
                calculate(input, &env),
                Err(ExprError::Parse(ParseError::UnexpectedToken { .. }))
            ),
            "input {:?}",
            input
        );
    }
}

#[test]
fn test_evaluation_errors() {
    let env = Environment::new();
    assert_eq!(
        calculate("1/0", &env),
        Err(ExprError::Eval(EvalError::DivisionByZero))
    );
    assert_eq!(
        calculate("a + 3", &env),
        Err(ExprError::Eval(EvalError::UndefinedVariable {
            name: "a".to_string()
        }))
    );
}

#[test]
fn test_lex_error_stops_pipeline_before_parse() {
    // Would also be a syntax error, but lexing fails first
    let err = calculate("(3 @", &Environment::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Lexical error: Unknown character '@' at position 3"
    );
}

#[test]
fn test_evaluation_is_repeatable() {
    init_tracing();
    let expr = parse_expression("sin(x)^2 / 3 - e^x").unwrap();
    let mut env = Environment::new();
    env.insert("x".to_string(), 0.7);

    let first = evaluate(&expr, &env).unwrap();
    let second = evaluate(&expr, &env).unwrap();
    assert_eq!(first.to_bits(), second.to_bits());
}

#[test]
fn test_long_operator_chain_is_rejected_not_overflowed() {
    let env = Environment::new();
    for n in [5_000, 20_000, 50_000] {
        let input = vec!["1"; n].join("+");
        assert!(
            matches!(
                calculate(&input, &env),
                Err(ExprError::Parse(ParseError::NestingTooDeep { .. }))
            ),
            "chain of {} terms",
            n
        );
    }
    assert_close(calc(&vec!["1"; 200].join("+")), 200.0, 1e-10);
}
