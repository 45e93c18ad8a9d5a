/// Contains symbolic differentiation over expression trees and the per-function derivative rules.
pub mod calculus;
/// Contains error types for different errors that this crate may throw.
pub mod errors;
/// Contains finite-difference model fitting and closed-form root finding for equation-solving tools.
pub mod roots;
/// Contains a basic shunting yard algorithm for evaluating strings as mathematical expressions.
pub mod shunting;
/// Contains a Gaussian-elimination solver for square systems of linear equations.
pub mod system;
/// Contains token types for the shunting yard algorithm. This is re-exported by the `shunting` module.
mod token;
/// Contains the owned expression tree built from postfix token sequences.
pub mod tree;

use std::collections::HashMap;

use errors::EquationSolverError;
use roots::{fit_model, solve_model, Solution};
use shunting::Evaluator;

/// An internal function for splitting an equation into its two sides prior to tokenization
pub (in crate) fn split_equation(equation: &str) -> anyhow::Result<(&str, &str)>
{
    let sides: Vec<&str> = equation.split('=').collect();
    match sides.len()
    {
        2 => Ok((sides[0].trim(), sides[1].trim())),
        _ => Err(EquationSolverError::InvalidEquationFormat.into()),
    }
}

/// Solves an equation in the variable `x`, sampling `LHS - RHS` through the
/// given evaluator so repeated solves share its memoized results.
///
/// The equation is classified from finite differences at x = 0, 1, 2 and
/// solved in closed form. Only linear and quadratic models exist: an
/// equation with a non-negligible second difference is treated as quadratic
/// even when it is actually cubic or transcendental, and such equations are
/// solved incorrectly. This is a limitation of the sampling heuristic.
///
/// # Example
/// ```
/// use exprsolve::solve_equation_with_evaluator;
/// use exprsolve::roots::Solution;
/// use exprsolve::shunting::Evaluator;
///
/// let mut evaluator = Evaluator::new();
///
/// let soln = solve_equation_with_evaluator("x + 3 = 7", &mut evaluator)
///     .expect("failed to find a solution");
///
/// assert_eq!(soln, Solution::Unique(4.0));
/// ```
pub fn solve_equation_with_evaluator(equation: &str, evaluator: &mut Evaluator) -> anyhow::Result<Solution>
{
    let (left, right) = split_equation(equation)?;

    let model = fit_model(|x| {
        let vars = HashMap::from([("x".to_string(), x)]);
        Ok(evaluator.evaluate(left, &vars)? - evaluator.evaluate(right, &vars)?)
    })?;

    solve_model(model)
}

/// Solves an equation in the variable `x` given as a string containing
/// exactly one `=` sign, using a fresh single-use evaluator.
///
/// # Example
/// ```
/// use exprsolve::solve_equation;
/// use exprsolve::roots::Solution;
///
/// let soln = solve_equation("x^2 - 5x + 6 = 0").unwrap();
///
/// assert_eq!(soln, Solution::TwoRoots(3.0, 2.0));
/// ```
pub fn solve_equation(equation: &str) -> anyhow::Result<Solution>
{
    let mut evaluator = Evaluator::new();
    solve_equation_with_evaluator(equation, &mut evaluator)
}
