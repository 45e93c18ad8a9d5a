use crate::errors::EquationSolverError;
use anyhow;

const _EPS_: f64 = 1e-8;

/// A fitted model of `f(x) = LHS(x) - RHS(x)` classified from its finite
/// differences at x = 0, 1, 2.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EquationModel
{
    Linear { slope: f64, intercept: f64 },
    Quadratic { a: f64, b: f64, c: f64 },
}

/// The result of solving a fitted equation model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Solution
{
    /// The single root of a linear equation.
    Unique(f64),

    /// The repeated root of a quadratic with a vanishing discriminant.
    DoubleRoot(f64),

    /// Both quadratic roots, `(-b + √disc) / 2a` first.
    TwoRoots(f64, f64),

    /// A quadratic with a negative discriminant.
    NoRealRoots,

    /// An identity: every real number satisfies the equation.
    AllReals,
}

/// Samples `f` at 0, 1, and 2 and fits a linear or quadratic model from the
/// finite differences.
///
/// This is an approximation scheme, not symbolic solving: any `f` whose
/// second finite difference is non-negligible is modeled as quadratic, even
/// when it is actually cubic or transcendental. Such equations are solved
/// incorrectly; the closed-form solvers only know the two models below.
///
/// # Example
/// ```
/// use exprsolve::roots::{fit_model, EquationModel};
///
/// let model = fit_model(|x| Ok(2.0 * x + 1.0)).unwrap();
///
/// assert_eq!(model, EquationModel::Linear { slope: 2.0, intercept: 1.0 });
/// ```
pub fn fit_model(mut f: impl FnMut(f64) -> anyhow::Result<f64>) -> anyhow::Result<EquationModel>
{
    let f0 = f(0.0)?;
    let f1 = f(1.0)?;
    let f2 = f(2.0)?;

    let second_diff = f2 - 2.0 * f1 + f0;
    if second_diff.abs() < _EPS_
    {
        return Ok(EquationModel::Linear { slope: f1 - f0, intercept: f0 });
    }

    let a = second_diff / 2.0;
    Ok(EquationModel::Quadratic { a, b: f1 - f0 - a, c: f0 })
}

/// Solves a fitted model with the closed-form linear or quadratic formula.
pub fn solve_model(model: EquationModel) -> anyhow::Result<Solution>
{
    match model
    {
        EquationModel::Linear { slope, intercept } => {
            if slope.abs() < _EPS_
            {
                if intercept.abs() < _EPS_
                {
                    return Ok(Solution::AllReals);
                }
                return Err(EquationSolverError::NoSolution.into());
            }
            Ok(Solution::Unique(-intercept / slope))
        },

        EquationModel::Quadratic { a, b, c } => {
            let disc = b * b - 4.0 * a * c;
            if disc < 0.0
            {
                return Ok(Solution::NoRealRoots);
            }
            if disc.abs() < _EPS_
            {
                return Ok(Solution::DoubleRoot(-b / (2.0 * a)));
            }
            Ok(Solution::TwoRoots(
                (-b + disc.sqrt()) / (2.0 * a),
                (-b - disc.sqrt()) / (2.0 * a),
            ))
        },
    }
}

#[test]
fn test_fit_quadratic_model()
{
    let model = fit_model(|x| Ok(x * x - 5.0 * x + 6.0)).unwrap();
    assert_eq!(model, EquationModel::Quadratic { a: 1.0, b: -5.0, c: 6.0 });
}

#[test]
fn test_solve_linear_model()
{
    let soln = solve_model(EquationModel::Linear { slope: 2.0, intercept: -8.0 }).unwrap();
    assert_eq!(soln, Solution::Unique(4.0));
}

#[test]
fn test_degenerate_linear_models()
{
    let identity = EquationModel::Linear { slope: 0.0, intercept: 0.0 };
    assert_eq!(solve_model(identity).unwrap(), Solution::AllReals);

    let contradiction = EquationModel::Linear { slope: 0.0, intercept: 3.0 };
    assert!(solve_model(contradiction).is_err());
}

#[test]
fn test_quadratic_discriminant_cases()
{
    // x^2 + 1 = 0
    let no_roots = EquationModel::Quadratic { a: 1.0, b: 0.0, c: 1.0 };
    assert_eq!(solve_model(no_roots).unwrap(), Solution::NoRealRoots);

    // (x - 1)^2 = 0
    let double = EquationModel::Quadratic { a: 1.0, b: -2.0, c: 1.0 };
    assert_eq!(solve_model(double).unwrap(), Solution::DoubleRoot(1.0));

    // x^2 - 5x + 6 = 0, positive root of the formula first
    let two = EquationModel::Quadratic { a: 1.0, b: -5.0, c: 6.0 };
    assert_eq!(solve_model(two).unwrap(), Solution::TwoRoots(3.0, 2.0));
}
