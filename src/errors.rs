use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// More concise syntax for implementing `Error` and `Display` for both structs and enums
macro_rules! impl_err {
    ($s:ty, $e:expr) => {
        impl Error for $s {}
        impl Display for $s {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, $e)
            }
        }
    };
    ($s:ty, $($p:path, $e:expr),*) => {
        impl Error for $s {}
        impl Display for $s {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                match self {
                    $($p => write!(f, $e),)*
                }
            }
        }
    };
}

#[derive(Debug)]
pub enum ShuntingYardError {
    InvalidCharacter,
    MismatchedParentheses,
    MisplacedComma,
    UndefinedVariable,
    DivisionByZero,
    UnknownOperator,
    MalformedExpression,
}
impl_err! {
    ShuntingYardError,
    ShuntingYardError::InvalidCharacter, "found a character outside the legal expression alphabet",
    ShuntingYardError::MismatchedParentheses, "found a mismatched parenthesis while converting expression to reverse polish notation",
    ShuntingYardError::MisplacedComma, "found a comma outside of a parenthesized argument list",
    ShuntingYardError::UndefinedVariable, "found a variable in the expression with no bound value",
    ShuntingYardError::DivisionByZero, "tried to divide by zero during postfix evaluation",
    ShuntingYardError::UnknownOperator, "found an operator with no evaluation rule",
    ShuntingYardError::MalformedExpression, "expected to find exactly one value on the postfix evaluation stack"
}

#[derive(Debug)]
pub enum DifferentiationError {
    UnsupportedOperator,
    /// Part of the public error contract for callers matching on
    /// differentiation failures. Every `Func` variant currently carries a
    /// derivative rule, so this is only raised if a function is added
    /// without one.
    NoDerivativeRule,
}
impl_err! {
    DifferentiationError,
    DifferentiationError::UnsupportedOperator, "found an operator with no differentiation rule",
    DifferentiationError::NoDerivativeRule, "found a function with no derivative rule"
}

#[derive(Debug)]
pub enum EquationSolverError {
    InvalidEquationFormat,
    NoSolution,
}
impl_err! {
    EquationSolverError,
    EquationSolverError::InvalidEquationFormat, "expected an equation containing exactly one '=' sign",
    EquationSolverError::NoSolution, "no solution exists for the given equation"
}

#[derive(Debug)]
pub enum LinearSystemError {
    SingularMatrix,
    ImproperlyConstrainedSystem,
}
impl_err! {
    LinearSystemError,
    LinearSystemError::SingularMatrix, "found a singular coefficient matrix while eliminating the system",
    LinearSystemError::ImproperlyConstrainedSystem, "number of equations given did not match the number of variables"
}
