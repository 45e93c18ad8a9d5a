use std::collections::HashMap;

use exprsolve::calculus::differentiate;
use exprsolve::roots::Solution;
use exprsolve::shunting::{eval_str, Evaluator};
use exprsolve::system::{solve_linear_system, LinearEquation};
use exprsolve::{solve_equation, solve_equation_with_evaluator};

#[test]
fn test_eval_str()
{
    let my_expr = "sin(-1 + 2 + 2 + 0.14)";
    let about_zero = eval_str(my_expr).unwrap().abs();

    assert!(about_zero < 0.01)
}

#[test]
fn test_direct_arithmetic()
{
    assert_eq!(eval_str("2+3*4").unwrap(), 14.0);
    assert_eq!(eval_str("(2+3)*4").unwrap(), 20.0);
    assert_eq!(eval_str("2^3^2").unwrap(), 512.0);
    assert_eq!(eval_str("10 ÷ 4").unwrap(), 2.5);
    assert_eq!(eval_str("3 × 4").unwrap(), 12.0);
}

#[test]
fn test_implicit_multiplication_with_bound_variable()
{
    let mut evaluator = Evaluator::new();
    let vars = HashMap::from([("x".to_string(), 5.0)]);

    assert_eq!(evaluator.evaluate("2x", &vars).unwrap(), 10.0);
}

#[test]
fn test_cache_is_idempotent_and_unbounded()
{
    let mut evaluator = Evaluator::new();
    let no_vars = HashMap::new();

    let first = evaluator.evaluate("2+3*4", &no_vars).unwrap();
    let second = evaluator.evaluate("2+3*4", &no_vars).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, 14.0);

    // The cache never evicts: distinct (expression, bindings) keys pile up
    // for the evaluator's whole lifetime. Known limitation of the design.
    for i in 0..100
    {
        let vars = HashMap::from([("x".to_string(), i as f64)]);
        evaluator.evaluate("x + 1", &vars).unwrap();
    }
    assert_eq!(evaluator.cache_len(), 101);
}

#[test]
fn test_undefined_variable_is_rejected()
{
    let mut evaluator = Evaluator::new();

    assert!(evaluator.evaluate("2x", &HashMap::new()).is_err());
}

#[test]
fn test_division_by_zero_is_rejected()
{
    assert!(eval_str("1/0").is_err());
}

#[test]
fn test_mismatched_parentheses_are_rejected()
{
    assert!(eval_str("(1+2").is_err());
}

#[test]
fn test_derivative_of_square_matches_slope()
{
    let derivative = differentiate("x^2", "x").unwrap();

    for x in [-3.0, -1.0, 0.0, 2.0, 10.0]
    {
        let vars = HashMap::from([("x".to_string(), x)]);
        let slope = Evaluator::new().evaluate(&derivative, &vars).unwrap();
        assert!((slope - 2.0 * x).abs() < 1e-12);
    }
}

#[test]
fn test_derivative_of_sin_at_zero()
{
    let derivative = differentiate("sin(x)", "x").unwrap();
    let vars = HashMap::from([("x".to_string(), 0.0)]);

    let slope = Evaluator::new().evaluate(&derivative, &vars).unwrap();
    assert!((slope - 1.0).abs() < 1e-12);
}

#[test]
fn test_rendered_derivative_round_trips_through_the_tokenizer()
{
    // ln, sqrt, and the power rule all appear in the rendered output
    let derivative = differentiate("sqrt(x) + ln(x) + x^3", "x").unwrap();
    let x = 4.0;
    let vars = HashMap::from([("x".to_string(), x)]);

    let slope = Evaluator::new().evaluate(&derivative, &vars).unwrap();
    let expected = 1.0 / (2.0 * x.sqrt()) + 1.0 / x + 3.0 * x * x;
    assert!((slope - expected).abs() < 1e-9);
}

#[test]
fn test_solve_linear_equation()
{
    let soln = solve_equation("x + 3 = 7").unwrap();
    assert_eq!(soln, Solution::Unique(4.0));
}

#[test]
fn test_solve_quadratic_equation()
{
    let soln = solve_equation("x^2 - 5x + 6 = 0").unwrap();
    assert_eq!(soln, Solution::TwoRoots(3.0, 2.0));
}

#[test]
fn test_solve_identity_and_contradiction()
{
    assert_eq!(solve_equation("x = x").unwrap(), Solution::AllReals);
    assert!(solve_equation("x = x + 1").is_err());
}

#[test]
fn test_solve_quadratic_with_no_real_roots()
{
    assert_eq!(solve_equation("x^2 + 1 = 0").unwrap(), Solution::NoRealRoots);
}

#[test]
fn test_equation_format_is_checked()
{
    assert!(solve_equation("x + 1").is_err());
    assert!(solve_equation("x = 1 = 2").is_err());
}

#[test]
fn test_solver_shares_the_evaluator_cache()
{
    let mut evaluator = Evaluator::new();

    let first = solve_equation_with_evaluator("x + 3 = 7", &mut evaluator).unwrap();
    let cached_entries = evaluator.cache_len();
    assert!(cached_entries > 0);

    // same equation again: every sample is a cache hit
    let second = solve_equation_with_evaluator("x + 3 = 7", &mut evaluator).unwrap();
    assert_eq!(first, second);
    assert_eq!(evaluator.cache_len(), cached_entries);
}

#[test]
fn test_linear_system_solution_satisfies_both_equations()
{
    let system = [
        LinearEquation::new(&[("x", 2.0), ("y", 3.0)], 8.0),
        LinearEquation::new(&[("x", 1.0), ("y", -1.0)], -1.0),
    ];

    let soln = solve_linear_system(&system).unwrap();

    assert!((2.0 * soln[0] + 3.0 * soln[1] - 8.0).abs() < 1e-9);
    assert!((soln[0] - soln[1] + 1.0).abs() < 1e-9);
}

#[test]
fn test_singular_linear_system_is_rejected()
{
    let system = [
        LinearEquation::new(&[("x", 1.0), ("y", 2.0)], 3.0),
        LinearEquation::new(&[("x", 2.0), ("y", 4.0)], 6.0),
    ];

    assert!(solve_linear_system(&system).is_err());
}
