use std::collections::HashMap;
use crate::errors::ShuntingYardError;
pub use crate::token::{BinOp, Func, Token};
use anyhow;

use lazy_static::lazy_static;
use regex::Regex;

/// Splits an expression into typed tokens and inserts implicit
/// multiplication operators (e.g. `2x` lexes as `2 * x`).
///
/// Characters outside the legal expression alphabet (ASCII letters, digits,
/// whitespace, `+ - * / · × ÷ ^ ( ) , .` and `=`) are rejected. The `=` sign
/// is legal here because equation text passes through this function; it is
/// only split out by the equation-solving callers.
///
/// # Example
/// ```
/// use exprsolve::shunting::{tokenize, BinOp, Token};
///
/// let tokens = tokenize("2x").unwrap();
///
/// assert_eq!(tokens, vec![
///     Token::Num(2.0),
///     Token::Op(BinOp::Mul),
///     Token::Var("x".to_string()),
/// ]);
/// ```
pub fn tokenize(expr: &str) -> anyhow::Result<Vec<Token>>
{
    lazy_static!
    {
        static ref ILLEGAL: Regex = Regex::new(r"[^a-zA-Z0-9\s+\-*/·×÷^(),.=]").unwrap();
        static ref SCAN: Regex = Regex::new(r"(\d+\.?\d*|\.\d+)|([a-zA-Z_]+)|([+\-*/·×÷^(),=])").unwrap();
    }

    if ILLEGAL.is_match(expr)
    {
        return Err(ShuntingYardError::InvalidCharacter.into());
    }

    let mut tokens = Vec::new();
    for caps in SCAN.captures_iter(expr)
    {
        if let Some(num) = caps.get(1)
        {
            let value = num.as_str()
                .parse::<f64>()
                .map_err(|_| ShuntingYardError::InvalidCharacter)?;
            tokens.push(Token::Num(value));
        }
        else if let Some(word) = caps.get(2)
        {
            // Known function names become function tokens; anything else is
            // a variable with its spelling preserved.
            match Func::from_name(word.as_str())
            {
                Some(func) => tokens.push(Token::Func(func)),
                None => tokens.push(Token::Var(word.as_str().to_string())),
            }
        }
        else if let Some(punct) = caps.get(3)
        {
            let c = punct.as_str()
                .chars()
                .next()
                .ok_or(ShuntingYardError::InvalidCharacter)?;
            let token = match c
            {
                '(' => Token::LeftParenthesis,
                ')' => Token::RightParenthesis,
                ',' => Token::Comma,
                op => Token::Op(
                    BinOp::from_char(op).ok_or(ShuntingYardError::InvalidCharacter)?
                ),
            };
            tokens.push(token);
        }
    }

    Ok(insert_implicit_multiplication(tokens))
}

/// A single left-to-right pass over the classified token list. Inserted
/// operators are never re-examined.
fn insert_implicit_multiplication(tokens: Vec<Token>) -> Vec<Token>
{
    let mut processed: Vec<Token> = Vec::with_capacity(tokens.len());

    for (i, current) in tokens.iter().enumerate()
    {
        processed.push(current.clone());

        let next = match tokens.get(i + 1)
        {
            Some(t) => t,
            None => continue,
        };

        // number followed by variable, function, or open parenthesis
        let after_number = matches!(current, Token::Num(_))
            && matches!(next, Token::Var(_) | Token::Func(_) | Token::LeftParenthesis);

        // variable or closing parenthesis followed by an operand
        let after_operand = matches!(current, Token::Var(_) | Token::RightParenthesis)
            && matches!(next, Token::Num(_) | Token::Var(_) | Token::Func(_) | Token::LeftParenthesis);

        if after_number || after_operand
        {
            processed.push(Token::Op(BinOp::Mul));
        }
    }

    processed
}

/// Rearranges an infix token sequence into reverse polish notation.
///
/// See shunting yard implementation details at:
/// https://en.wikipedia.org/wiki/Shunting_yard_algorithm
///
/// Functions bind to their just-closed argument list; commas only drain the
/// operator stack back to the nearest open parenthesis. A `-` in operand
/// position is treated as a unary minus by emitting a `-1` and a stacked
/// multiplication.
pub fn parse_to_rpn(tokens: Vec<Token>) -> anyhow::Result<Vec<Token>>
{
    let mut stack: Vec<Token> = Vec::new();
    let mut queue: Vec<Token> = Vec::new();
    let mut unary_minus = true; // Indicator for whether the next '-' token is a unary operator

    for token in tokens
    {
        match token
        {
            Token::Num(_) | Token::Var(_) => {
                queue.push(token);
                unary_minus = false;
            },

            Token::Func(_) => {
                stack.push(token);
                unary_minus = true;
            },

            Token::Comma => {
                loop
                {
                    match stack.pop()
                    {
                        // the parenthesis stays on the stack for its closing ')'
                        Some(Token::LeftParenthesis) => {
                            stack.push(Token::LeftParenthesis);
                            break;
                        },
                        Some(op) => queue.push(op),
                        None => return Err(ShuntingYardError::MisplacedComma.into()),
                    }
                }
                unary_minus = true;
            },

            Token::LeftParenthesis => {
                stack.push(token);
                unary_minus = true;
            },

            Token::RightParenthesis => {
                loop
                {
                    match stack.pop()
                    {
                        Some(Token::LeftParenthesis) => break,
                        Some(op) => queue.push(op),
                        None => return Err(ShuntingYardError::MismatchedParentheses.into()),
                    }
                }
                // bind a pending function to its just-closed argument
                if let Some(&Token::Func(func)) = stack.last()
                {
                    queue.push(Token::Func(func));
                    stack.pop();
                }
                unary_minus = false;
            },

            Token::Op(o1) => {
                // if we find a minus and we're expecting a unary operator...
                if unary_minus && o1 == BinOp::Sub
                {
                    queue.push(Token::Num(-1.0));
                    stack.push(Token::Op(BinOp::Mul));
                }
                else
                {
                    while let Some(&Token::Op(o2)) = stack.last()
                    {
                        let pops = o2.precedence() > o1.precedence()
                            || (o2.precedence() == o1.precedence() && !o1.is_right_associative());
                        if !pops
                        {
                            break;
                        }
                        queue.push(Token::Op(o2));
                        stack.pop();
                    }
                    stack.push(Token::Op(o1));
                    unary_minus = true;
                }
            },
        }
    }

    while let Some(token) = stack.pop()
    {
        if let Token::LeftParenthesis | Token::RightParenthesis = token
        {
            return Err(ShuntingYardError::MismatchedParentheses.into());
        }
        queue.push(token);
    }

    Ok(queue)
}

/// Evaluates a reverse-polish token sequence with a stack machine, reading
/// variable values out of `vars`.
pub fn eval_rpn(rpn: &[Token], vars: &HashMap<String, f64>) -> anyhow::Result<f64>
{
    let mut stack: Vec<f64> = Vec::new();

    for token in rpn
    {
        match token
        {
            Token::Num(num) => stack.push(*num),

            Token::Var(name) => {
                match vars.get(name)
                {
                    Some(val) => stack.push(*val),
                    None => return Err(ShuntingYardError::UndefinedVariable.into()),
                }
            },

            Token::Func(func) => {
                if let Some(arg) = stack.pop()
                {
                    stack.push(func.eval(arg));
                }
                else
                {
                    return Err(ShuntingYardError::MalformedExpression.into());
                }
            },

            Token::Op(op) => {
                if let (Some(arg2), Some(arg1)) = (stack.pop(), stack.pop())
                {
                    stack.push(op.apply(arg1, arg2)?);
                }
                else
                {
                    return Err(ShuntingYardError::MalformedExpression.into());
                }
            },

            _ => return Err(ShuntingYardError::MalformedExpression.into()),
        }
    }

    match stack.len()
    {
        1 => Ok(stack[0]),
        _ => Err(ShuntingYardError::MalformedExpression.into()),
    }
}

/// An expression evaluator that memoizes results keyed on the expression
/// text and a canonical serialization of the variable bindings.
///
/// The cache lives exactly as long as the `Evaluator` and is never evicted
/// automatically; callers that need to bound it can call
/// [`clear_cache`](Evaluator::clear_cache). The evaluator holds no other
/// state and performs no synchronization.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use exprsolve::shunting::Evaluator;
///
/// let mut evaluator = Evaluator::new();
/// let vars = HashMap::from([("x".to_string(), 5.0)]);
///
/// assert_eq!(evaluator.evaluate("2x", &vars).unwrap(), 10.0);
/// assert_eq!(evaluator.cache_len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Evaluator
{
    cache: HashMap<String, f64>,
}

impl Evaluator
{
    pub fn new() -> Evaluator
    {
        Evaluator { cache: HashMap::new() }
    }

    /// Evaluates `expr` with the given variable bindings. A cache hit
    /// short-circuits the whole tokenize/convert/evaluate pipeline.
    pub fn evaluate(&mut self, expr: &str, vars: &HashMap<String, f64>) -> anyhow::Result<f64>
    {
        let key = cache_key(expr, vars);
        if let Some(cached) = self.cache.get(&key)
        {
            return Ok(*cached);
        }

        let rpn = parse_to_rpn(tokenize(expr)?)?;
        let result = eval_rpn(&rpn, vars)?;

        self.cache.insert(key, result);
        Ok(result)
    }

    /// The number of memoized results currently held.
    pub fn cache_len(&self) -> usize
    {
        self.cache.len()
    }

    /// Drops every memoized result.
    pub fn clear_cache(&mut self)
    {
        self.cache.clear();
    }
}

fn cache_key(expr: &str, vars: &HashMap<String, f64>) -> String
{
    let mut bindings: Vec<(&str, f64)> = vars.iter()
        .map(|(name, val)| (name.as_str(), *val))
        .collect();
    bindings.sort_by(|a, b| a.0.cmp(b.0));

    let serialized: Vec<String> = bindings.iter()
        .map(|(name, val)| format!("{name}={val}"))
        .collect();

    format!("{expr}|{}", serialized.join(";"))
}

/// Evaluates a string as a mathematical expression with built in functions
/// including logarithms, trig functions, and square roots.
///
/// # Example
/// ```
/// use exprsolve::shunting::eval_str;
///
/// let my_expr = "sin(-1 + 2 + 2 + 0.14)";
/// let about_zero = eval_str(my_expr).unwrap().abs();
///
/// assert!(about_zero < 0.01);
/// ```
pub fn eval_str(expr: &str) -> anyhow::Result<f64>
{
    eval_rpn(&parse_to_rpn(tokenize(expr)?)?, &HashMap::new())
}

#[test]
fn test_tokenize()
{
    let tokens = tokenize("3+4").unwrap();
    assert_eq!(tokens, vec![Token::Num(3.0), Token::Op(BinOp::Add), Token::Num(4.0)]);
}

#[test]
fn test_tokenize_rejects_illegal_characters()
{
    assert!(tokenize("3 + #4").is_err());
    assert!(tokenize("2x + 1 = 5").is_ok()); // '=' is part of the legal alphabet
}

#[test]
fn test_implicit_multiplication()
{
    let tokens = tokenize("2sin(x)").unwrap();
    assert_eq!(tokens, vec![
        Token::Num(2.0),
        Token::Op(BinOp::Mul),
        Token::Func(Func::Sin),
        Token::LeftParenthesis,
        Token::Var("x".to_string()),
        Token::RightParenthesis,
    ]);

    let tokens = tokenize("(1+2)(3+4)").unwrap();
    assert_eq!(tokens[5], Token::Op(BinOp::Mul));
}

#[test]
fn test_rpnify()
{
    let rpn = parse_to_rpn(tokenize("3+4").unwrap()).unwrap();
    assert_eq!(rpn, vec![Token::Num(3.0), Token::Num(4.0), Token::Op(BinOp::Add)]);
}

#[test]
fn test_unary_minus()
{
    let rpn = parse_to_rpn(tokenize("sin(-1 + 2 + 2 + 0.14)").unwrap()).unwrap();
    assert_eq!(rpn[0], Token::Num(-1.0));
}

#[test]
fn test_exponentiation_is_right_associative()
{
    assert_eq!(eval_str("2^3^2").unwrap(), 512.0);
}

#[test]
fn test_mismatched_parentheses()
{
    assert!(parse_to_rpn(tokenize("(1+2").unwrap()).is_err());
    assert!(parse_to_rpn(tokenize("1+2)").unwrap()).is_err());
}

#[test]
fn test_misplaced_comma()
{
    assert!(parse_to_rpn(tokenize("1, 2").unwrap()).is_err());
}

#[test]
fn test_equals_sign_has_no_evaluation_rule()
{
    // legal to tokenize, but '=' reaching the stack machine is rejected
    assert!(eval_str("1 = 1").is_err());
}

#[test]
fn test_leftover_operands_are_rejected()
{
    // two numbers with no joining operator leave two values on the stack
    assert!(eval_str("1 2").is_err());
}

#[test]
fn test_division_by_zero()
{
    assert!(eval_str("1/0").is_err());
}

#[test]
fn test_evaluator_caches_results()
{
    let mut evaluator = Evaluator::new();
    let no_vars = HashMap::new();

    assert_eq!(evaluator.evaluate("2+3*4", &no_vars).unwrap(), 14.0);
    assert_eq!(evaluator.evaluate("2+3*4", &no_vars).unwrap(), 14.0);
    assert_eq!(evaluator.cache_len(), 1);

    evaluator.clear_cache();
    assert_eq!(evaluator.cache_len(), 0);
}
