use std::f64::consts::LN_10;

use crate::errors::DifferentiationError;
use crate::shunting::{parse_to_rpn, tokenize};
use crate::token::{BinOp, Func};
use crate::tree::{build_tree, Node};
use anyhow;

/// The symbolic derivative rule for a recognized function, applied with the
/// inner argument `u` and its already-differentiated form `du` (the chain
/// rule). Each rule encodes the outer derivative shape only.
fn function_derivative(func: Func, u: &Node, du: Node) -> Node
{
    let u = u.clone();
    match func
    {
        // sin(u)' = cos(u) * du
        Func::Sin => Node::op(BinOp::Mul, Node::func(Func::Cos, u), du),

        // cos(u)' = (-1 * sin(u)) * du
        Func::Cos => Node::op(
            BinOp::Mul,
            Node::op(BinOp::Mul, Node::num(-1.0), Node::func(Func::Sin, u)),
            du,
        ),

        // tan(u)' = sec(u)^2 * du
        Func::Tan => Node::op(
            BinOp::Mul,
            Node::op(BinOp::Pow, Node::func(Func::Sec, u), Node::num(2.0)),
            du,
        ),

        // ln(u)' = du / u
        Func::Ln => Node::op(BinOp::Div, du, u),

        // log10(u)' = du / (u * ln(10))
        Func::Log => Node::op(
            BinOp::Div,
            du,
            Node::op(BinOp::Mul, u, Node::num(LN_10)),
        ),

        // sqrt(u)' = du / (2 * sqrt(u))
        Func::Sqrt => Node::op(
            BinOp::Div,
            du,
            Node::op(BinOp::Mul, Node::num(2.0), Node::func(Func::Sqrt, u)),
        ),

        // exp(u)' = exp(u) * du
        Func::Exp => Node::op(BinOp::Mul, Node::func(Func::Exp, u), du),

        // sec(u)' = (sec(u) * tan(u)) * du
        Func::Sec => Node::op(
            BinOp::Mul,
            Node::op(
                BinOp::Mul,
                Node::func(Func::Sec, u.clone()),
                Node::func(Func::Tan, u),
            ),
            du,
        ),
    }
}

/// Symbolically differentiates an expression tree with respect to `variable`,
/// returning a freshly built tree.
///
/// No simplification pass is performed: the result may contain `+ 0` and
/// `* 1` terms. Simplicity of the rewrite rules is favored over minimal
/// output.
pub fn differentiate_tree(node: &Node, variable: &str) -> anyhow::Result<Node>
{
    let derivative = match node
    {
        Node::Num(_) => Node::num(0.0),

        Node::Var(name) => {
            if name == variable
            {
                Node::num(1.0)
            }
            else
            {
                Node::num(0.0)
            }
        },

        Node::Op(op, u, v) => {
            let du = differentiate_tree(u, variable)?;
            let dv = differentiate_tree(v, variable)?;

            match op
            {
                BinOp::Add => Node::op(BinOp::Add, du, dv),

                BinOp::Sub => Node::op(BinOp::Sub, du, dv),

                // product rule: du*v + u*dv
                BinOp::Mul => Node::op(
                    BinOp::Add,
                    Node::op(BinOp::Mul, du, (**v).clone()),
                    Node::op(BinOp::Mul, (**u).clone(), dv),
                ),

                // quotient rule: (du*v - u*dv) / v^2
                BinOp::Div => Node::op(
                    BinOp::Div,
                    Node::op(
                        BinOp::Sub,
                        Node::op(BinOp::Mul, du, (**v).clone()),
                        Node::op(BinOp::Mul, (**u).clone(), dv),
                    ),
                    Node::op(BinOp::Pow, (**v).clone(), Node::num(2.0)),
                ),

                BinOp::Pow => power_rule(u, v, du, dv),

                BinOp::Eq => return Err(DifferentiationError::UnsupportedOperator.into()),
            }
        },

        Node::Func(func, u) => {
            let du = differentiate_tree(u, variable)?;
            function_derivative(*func, u, du)
        },
    };

    Ok(derivative)
}

/// The three power-rule cases, checked in priority order: numeric exponent,
/// then numeric base, then the fully symbolic general rule.
fn power_rule(u: &Node, v: &Node, du: Node, dv: Node) -> Node
{
    if let Node::Num(c) = v
    {
        // u^c: c * u^(c-1) * du
        return Node::op(
            BinOp::Mul,
            Node::op(
                BinOp::Mul,
                v.clone(),
                Node::op(BinOp::Pow, u.clone(), Node::num(c - 1.0)),
            ),
            du,
        );
    }

    if let Node::Num(_) = u
    {
        // c^v: c^v * ln(c) * dv
        return Node::op(
            BinOp::Mul,
            Node::op(BinOp::Pow, u.clone(), v.clone()),
            Node::op(BinOp::Mul, Node::func(Func::Ln, u.clone()), dv),
        );
    }

    // u^v: u^v * (dv*ln(u) + v*du/u)
    Node::op(
        BinOp::Mul,
        Node::op(BinOp::Pow, u.clone(), v.clone()),
        Node::op(
            BinOp::Add,
            Node::op(BinOp::Mul, dv, Node::func(Func::Ln, u.clone())),
            Node::op(
                BinOp::Div,
                Node::op(BinOp::Mul, v.clone(), du),
                u.clone(),
            ),
        ),
    )
}

/// Symbolically differentiates an expression with respect to `variable` and
/// renders the resulting tree back to canonical text.
///
/// # Example
/// ```
/// use exprsolve::calculus::differentiate;
///
/// let derivative = differentiate("x^2", "x").unwrap();
///
/// assert_eq!(derivative, "((2 * (x ^ 1)) * 1)");
/// ```
pub fn differentiate(expr: &str, variable: &str) -> anyhow::Result<String>
{
    let rpn = parse_to_rpn(tokenize(expr)?)?;
    let tree = build_tree(&rpn)?;
    let derivative = differentiate_tree(&tree, variable)?;
    Ok(derivative.to_string())
}

#[cfg(test)]
use std::collections::HashMap;

/// Numerically evaluates a rendered derivative at a given point.
#[cfg(test)]
fn sample(derivative: &str, x: f64) -> f64
{
    use crate::shunting::Evaluator;

    let vars = HashMap::from([("x".to_string(), x)]);
    Evaluator::new().evaluate(derivative, &vars).unwrap()
}

#[test]
fn test_power_rule_matches_numeric_slope()
{
    let derivative = differentiate("x^2", "x").unwrap();
    for x in [-2.0, 0.0, 0.5, 3.0]
    {
        assert!((sample(&derivative, x) - 2.0 * x).abs() < 1e-12);
    }
}

#[test]
fn test_sin_derivative_is_cos()
{
    let derivative = differentiate("sin(x)", "x").unwrap();
    assert!((sample(&derivative, 0.0) - 1.0).abs() < 1e-12);
    assert!((sample(&derivative, 1.0) - 1.0f64.cos()).abs() < 1e-12);
}

#[test]
fn test_product_rule()
{
    // (x * sin(x))' = sin(x) + x*cos(x)
    let derivative = differentiate("x * sin(x)", "x").unwrap();
    let x: f64 = 0.7;
    let expected = x.sin() + x * x.cos();
    assert!((sample(&derivative, x) - expected).abs() < 1e-12);
}

#[test]
fn test_quotient_rule()
{
    // (1 / x)' = -1 / x^2
    let derivative = differentiate("1 / x", "x").unwrap();
    let x = 2.0;
    assert!((sample(&derivative, x) + 1.0 / (x * x)).abs() < 1e-12);
}

#[test]
fn test_exponential_rule_with_numeric_base()
{
    // (2^x)' = 2^x * ln(2)
    let derivative = differentiate("2^x", "x").unwrap();
    let x = 3.0;
    let expected = 2.0f64.powf(x) * 2.0f64.ln();
    assert!((sample(&derivative, x) - expected).abs() < 1e-12);
}

#[test]
fn test_general_power_rule()
{
    // (x^x)' = x^x * (ln(x) + 1)
    let derivative = differentiate("x^x", "x").unwrap();
    let x: f64 = 2.0;
    let expected = x.powf(x) * (x.ln() + 1.0);
    assert!((sample(&derivative, x) - expected).abs() < 1e-12);
}

#[test]
fn test_tan_rule_uses_sec()
{
    let derivative = differentiate("tan(x)", "x").unwrap();
    assert!(derivative.contains("sec(x)"));

    // tan' = sec^2 = 1/cos^2
    let x: f64 = 0.3;
    let expected = 1.0 / (x.cos() * x.cos());
    assert!((sample(&derivative, x) - expected).abs() < 1e-12);
}

#[test]
fn test_sec_rule()
{
    // sec(x)' = sec(x) * tan(x)
    let derivative = differentiate("sec(x)", "x").unwrap();
    let x: f64 = 0.4;
    let expected = (1.0 / x.cos()) * x.tan();
    assert!((sample(&derivative, x) - expected).abs() < 1e-12);
}

#[test]
fn test_no_simplification_is_performed()
{
    // constants keep their literal zero derivative terms
    let derivative = differentiate("x + 3", "x").unwrap();
    assert_eq!(derivative, "(1 + 0)");
}

#[test]
fn test_constant_and_foreign_variable()
{
    assert_eq!(differentiate("7", "x").unwrap(), "0");
    assert_eq!(differentiate("y", "x").unwrap(), "0");
}

#[test]
fn test_equals_sign_has_no_differentiation_rule()
{
    // '=' survives tokenization but carries no rewrite rule
    assert!(differentiate("x = 1", "x").is_err());
}
