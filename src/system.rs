use crate::errors::LinearSystemError;
use anyhow;

const _EPS_: f64 = 1e-8;

/// One linear equation, written as ordered `(variable, coefficient)` pairs
/// plus the constant on the right-hand side.
///
/// The first equation of a system fixes the variable order for the whole
/// solve; later equations are looked up by variable name, and a variable a
/// row does not mention contributes a zero coefficient.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearEquation
{
    pub coefficients: Vec<(String, f64)>,
    pub constant: f64,
}

impl LinearEquation
{
    pub fn new(coefficients: &[(&str, f64)], constant: f64) -> LinearEquation
    {
        LinearEquation
        {
            coefficients: coefficients.iter()
                .map(|(name, val)| (name.to_string(), *val))
                .collect(),
            constant,
        }
    }

    fn coefficient(&self, var: &str) -> f64
    {
        self.coefficients.iter()
            .find(|(name, _)| name == var)
            .map(|(_, val)| *val)
            .unwrap_or(0.0)
    }
}

/// Solves a square linear system by Gaussian elimination with partial
/// pivoting, returning the solution vector in the first equation's variable
/// order.
///
/// Each pivot column selects the remaining row with the largest absolute
/// value in that column; a selected pivot below `1e-8` in magnitude rejects
/// the system as singular.
///
/// # Example
/// ```
/// use exprsolve::system::{solve_linear_system, LinearEquation};
///
/// let system = [
///     LinearEquation::new(&[("x", 1.0), ("y", 1.0)], 9.0),
///     LinearEquation::new(&[("x", 1.0), ("y", -1.0)], 5.0),
/// ];
///
/// let soln = solve_linear_system(&system).unwrap();
///
/// assert!((soln[0] - 7.0).abs() < 1e-9);
/// assert!((soln[1] - 2.0).abs() < 1e-9);
/// ```
pub fn solve_linear_system(system: &[LinearEquation]) -> anyhow::Result<Vec<f64>>
{
    let n = system.len();
    if n == 0
    {
        return Err(LinearSystemError::ImproperlyConstrainedSystem.into());
    }

    let vars: Vec<&str> = system[0].coefficients.iter()
        .map(|(name, _)| name.as_str())
        .collect();
    if vars.len() != n
    {
        return Err(LinearSystemError::ImproperlyConstrainedSystem.into());
    }

    // Augmented matrix in the fixed variable order
    let mut matrix: Vec<Vec<f64>> = system.iter()
        .map(|eq| {
            let mut row: Vec<f64> = vars.iter()
                .map(|var| eq.coefficient(var))
                .collect();
            row.push(eq.constant);
            row
        })
        .collect();

    // Forward elimination with partial pivoting
    for i in 0..n
    {
        let mut pivot_row = i;
        for j in (i + 1)..n
        {
            if matrix[j][i].abs() > matrix[pivot_row][i].abs()
            {
                pivot_row = j;
            }
        }
        matrix.swap(i, pivot_row);

        if matrix[i][i].abs() < _EPS_
        {
            return Err(LinearSystemError::SingularMatrix.into());
        }

        for j in (i + 1)..n
        {
            let factor = matrix[j][i] / matrix[i][i];
            for k in i..=n
            {
                matrix[j][k] -= factor * matrix[i][k];
            }
        }
    }

    // Back substitution, last row upward
    let mut solution = vec![0.0; n];
    for i in (0..n).rev()
    {
        let mut value = matrix[i][n];
        for j in (i + 1)..n
        {
            value -= matrix[i][j] * solution[j];
        }
        solution[i] = value / matrix[i][i];
    }

    Ok(solution)
}

#[test]
fn test_three_by_three_system()
{
    let system = [
        LinearEquation::new(&[("x", 2.0), ("y", 1.0), ("z", -1.0)], 8.0),
        LinearEquation::new(&[("x", -3.0), ("y", -1.0), ("z", 2.0)], -11.0),
        LinearEquation::new(&[("x", -2.0), ("y", 1.0), ("z", 2.0)], -3.0),
    ];

    let soln = solve_linear_system(&system).unwrap();

    assert!((soln[0] - 2.0).abs() < 1e-9);
    assert!((soln[1] - 3.0).abs() < 1e-9);
    assert!((soln[2] + 1.0).abs() < 1e-9);
}

#[test]
fn test_partial_pivoting_handles_zero_leading_coefficient()
{
    let system = [
        LinearEquation::new(&[("x", 0.0), ("y", 1.0)], 2.0),
        LinearEquation::new(&[("x", 1.0), ("y", 0.0)], 3.0),
    ];

    let soln = solve_linear_system(&system).unwrap();

    assert!((soln[0] - 3.0).abs() < 1e-9);
    assert!((soln[1] - 2.0).abs() < 1e-9);
}

#[test]
fn test_singular_system_is_rejected()
{
    let system = [
        LinearEquation::new(&[("x", 1.0), ("y", 1.0)], 4.0),
        LinearEquation::new(&[("x", 2.0), ("y", 2.0)], 8.0),
    ];

    assert!(solve_linear_system(&system).is_err());
}

#[test]
fn test_wrong_equation_count_is_rejected()
{
    let system = [
        LinearEquation::new(&[("x", 1.0), ("y", 1.0)], 4.0),
    ];

    assert!(solve_linear_system(&system).is_err());
}

#[test]
fn test_missing_coefficient_reads_as_zero()
{
    let system = [
        LinearEquation::new(&[("x", 1.0), ("y", 2.0)], 5.0),
        LinearEquation::new(&[("y", 1.0)], 1.0),
    ];

    let soln = solve_linear_system(&system).unwrap();

    assert!((soln[0] - 3.0).abs() < 1e-9);
    assert!((soln[1] - 1.0).abs() < 1e-9);
}
