use anyhow;

use crate::errors::ShuntingYardError;

/// A lexical unit of a mathematical expression, produced in left-to-right
/// source order by `shunting::tokenize`.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Num(f64),
    Var(String),
    Func(Func),
    Op(BinOp),
    Comma,
    LeftParenthesis,
    RightParenthesis,
}

/// A binary operator. The alternate multiplication glyphs `·` and `×` and the
/// division glyph `÷` are folded into `Mul` and `Div` at tokenization time.
///
/// `Eq` exists because `=` is a legal character in expression text (the
/// equation solver splits on it before tokenizing); it carries no evaluation
/// rule and is rejected if it ever reaches the postfix stack machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
}

impl BinOp
{
    pub fn from_char(c: char) -> Option<BinOp>
    {
        match c
        {
            '+' => Some(BinOp::Add),
            '-' => Some(BinOp::Sub),
            '*' | '·' | '×' => Some(BinOp::Mul),
            '/' | '÷' => Some(BinOp::Div),
            '^' => Some(BinOp::Pow),
            '=' => Some(BinOp::Eq),
             _  => None,
        }
    }

    pub fn precedence(&self) -> i32
    {
        match self
        {
            BinOp::Pow => 4,
            BinOp::Mul => 3,
            BinOp::Div => 3,
            BinOp::Add => 2,
            BinOp::Sub => 2,
            BinOp::Eq  => 1,
        }
    }

    pub fn is_right_associative(&self) -> bool
    {
        *self == BinOp::Pow
    }

    pub fn symbol(&self) -> &'static str
    {
        match self
        {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
            BinOp::Eq  => "=",
        }
    }

    /// Applies the operator to two popped operands. The divisor is checked
    /// for exact zero before dividing.
    pub fn apply(&self, a: f64, b: f64) -> anyhow::Result<f64>
    {
        match self
        {
            BinOp::Add => Ok(a + b),
            BinOp::Sub => Ok(a - b),
            BinOp::Mul => Ok(a * b),
            BinOp::Div => {
                if b == 0.0
                {
                    return Err(ShuntingYardError::DivisionByZero.into());
                }
                Ok(a / b)
            },
            BinOp::Pow => Ok(a.powf(b)),
            BinOp::Eq  => Err(ShuntingYardError::UnknownOperator.into()),
        }
    }
}

/// The fixed set of recognized single-argument functions. An identifier is
/// classified as a function token when its lowercased form matches one of
/// these names; all other identifiers are variables.
///
/// `Sec` is defined for differentiation purposes only (it appears in the
/// derivative of `tan`) but evaluates numerically like the rest.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Ln,
    Log,
    Sqrt,
    Exp,
    Sec,
}

impl Func
{
    pub fn from_name(name: &str) -> Option<Func>
    {
        match name.to_lowercase().as_str()
        {
            "sin"  => Some(Func::Sin),
            "cos"  => Some(Func::Cos),
            "tan"  => Some(Func::Tan),
            "ln"   => Some(Func::Ln),
            "log"  => Some(Func::Log),
            "sqrt" => Some(Func::Sqrt),
            "exp"  => Some(Func::Exp),
            "sec"  => Some(Func::Sec),
            _      => None,
        }
    }

    pub fn name(&self) -> &'static str
    {
        match self
        {
            Func::Sin  => "sin",
            Func::Cos  => "cos",
            Func::Tan  => "tan",
            Func::Ln   => "ln",
            Func::Log  => "log",
            Func::Sqrt => "sqrt",
            Func::Exp  => "exp",
            Func::Sec  => "sec",
        }
    }

    /// The numeric implementation applied during postfix evaluation.
    /// `log` is base 10.
    pub fn eval(&self, x: f64) -> f64
    {
        match self
        {
            Func::Sin  => x.sin(),
            Func::Cos  => x.cos(),
            Func::Tan  => x.tan(),
            Func::Ln   => x.ln(),
            Func::Log  => x.log10(),
            Func::Sqrt => x.sqrt(),
            Func::Exp  => x.exp(),
            Func::Sec  => 1.0 / x.cos(),
        }
    }
}

#[test]
fn test_glyph_folding()
{
    assert_eq!(BinOp::from_char('·'), Some(BinOp::Mul));
    assert_eq!(BinOp::from_char('×'), Some(BinOp::Mul));
    assert_eq!(BinOp::from_char('÷'), Some(BinOp::Div));
    assert_eq!(BinOp::from_char('!'), None);
}

#[test]
fn test_function_recognition_is_case_insensitive()
{
    assert_eq!(Func::from_name("SIN"), Some(Func::Sin));
    assert_eq!(Func::from_name("Sqrt"), Some(Func::Sqrt));
    assert_eq!(Func::from_name("foo"), None);
}
