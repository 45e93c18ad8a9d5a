use std::fmt;
use std::fmt::Display;

use crate::errors::ShuntingYardError;
use crate::token::{BinOp, Func, Token};
use anyhow;

/// A node in an owned expression tree. Every non-leaf node exclusively owns
/// its children; trees are finite and acyclic by construction.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Num(f64),
    Var(String),
    Func(Func, Box<Node>),
    Op(BinOp, Box<Node>, Box<Node>),
}

impl Node
{
    pub fn num(value: f64) -> Node
    {
        Node::Num(value)
    }

    pub fn var(name: &str) -> Node
    {
        Node::Var(name.to_string())
    }

    pub fn func(func: Func, arg: Node) -> Node
    {
        Node::Func(func, Box::new(arg))
    }

    pub fn op(op: BinOp, left: Node, right: Node) -> Node
    {
        Node::Op(op, Box::new(left), Box::new(right))
    }
}

/// Builds an expression tree from a reverse-polish token sequence.
///
/// Mirrors the postfix stack machine in `shunting::eval_rpn`, but pushes and
/// pops tree nodes instead of numbers: operators pop their right operand
/// first, functions wrap a single popped argument.
///
/// # Example
/// ```
/// use exprsolve::shunting::{parse_to_rpn, tokenize};
/// use exprsolve::tree::build_tree;
///
/// let rpn = parse_to_rpn(tokenize("x + 1").unwrap()).unwrap();
/// let tree = build_tree(&rpn).unwrap();
///
/// assert_eq!(tree.to_string(), "(x + 1)");
/// ```
pub fn build_tree(rpn: &[Token]) -> anyhow::Result<Node>
{
    let mut stack: Vec<Node> = Vec::new();

    for token in rpn
    {
        match token
        {
            Token::Num(num) => stack.push(Node::Num(*num)),

            Token::Var(name) => stack.push(Node::Var(name.clone())),

            Token::Func(func) => {
                if let Some(arg) = stack.pop()
                {
                    stack.push(Node::func(*func, arg));
                }
                else
                {
                    return Err(ShuntingYardError::MalformedExpression.into());
                }
            },

            Token::Op(op) => {
                if let (Some(right), Some(left)) = (stack.pop(), stack.pop())
                {
                    stack.push(Node::op(*op, left, right));
                }
                else
                {
                    return Err(ShuntingYardError::MalformedExpression.into());
                }
            },

            _ => return Err(ShuntingYardError::MalformedExpression.into()),
        }
    }

    if stack.len() != 1
    {
        return Err(ShuntingYardError::MalformedExpression.into());
    }
    Ok(stack.remove(0))
}

/// Renders a tree in canonical text form: every binary operator is fully
/// parenthesized as `(left op right)` and functions render as `name(arg)`.
///
/// The output is canonical but not algebraically minimal; derivative trees
/// keep their `+ 0` and `* 1` terms.
impl Display for Node
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        match self
        {
            Node::Num(num) => write!(f, "{num}"),
            Node::Var(name) => write!(f, "{name}"),
            Node::Func(func, arg) => write!(f, "{}({arg})", func.name()),
            Node::Op(op, left, right) => write!(f, "({left} {} {right})", op.symbol()),
        }
    }
}

#[cfg(test)]
fn tree_of(expr: &str) -> Node
{
    use crate::shunting::{parse_to_rpn, tokenize};
    build_tree(&parse_to_rpn(tokenize(expr).unwrap()).unwrap()).unwrap()
}

#[test]
fn test_build_tree_operand_order()
{
    let tree = tree_of("x - 3");
    assert_eq!(
        tree,
        Node::op(BinOp::Sub, Node::var("x"), Node::num(3.0))
    );
}

#[test]
fn test_build_tree_function_wrapping()
{
    let tree = tree_of("sin(2x)");
    assert_eq!(
        tree,
        Node::func(
            Func::Sin,
            Node::op(BinOp::Mul, Node::num(2.0), Node::var("x")),
        )
    );
}

#[test]
fn test_render_is_fully_parenthesized()
{
    assert_eq!(tree_of("1 + 2 * 3").to_string(), "(1 + (2 * 3))");
    assert_eq!(tree_of("sqrt(x)/2").to_string(), "(sqrt(x) / 2)");
}

#[test]
fn test_malformed_rpn_is_rejected()
{
    use crate::shunting::tokenize;

    // raw infix tokens are not a legal postfix sequence
    let not_rpn = tokenize("1 + + 2").unwrap();
    assert!(build_tree(&not_rpn).is_err());
}
