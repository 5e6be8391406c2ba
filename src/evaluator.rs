use log::{debug, trace};

use crate::{
    error_code::ErrorCode,
    label::{canonical_label, is_valid_cell_label},
    spreadsheet::CellSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Subtract),
            "*" => Some(Operator::Multiply),
            "/" => Some(Operator::Divide),
            _ => None,
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Subtract => 1,
            Operator::Multiply | Operator::Divide => 2,
        }
    }
}

/// Outcome of one evaluation.
///
/// `value` is `None` when no result was produced. When `error` is set the
/// value is best-effort and should not be displayed as the cell's result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub value: Option<f64>,
    pub error: Option<ErrorCode>,
}

impl Evaluation {
    fn ok(value: f64) -> Self {
        Evaluation {
            value: Some(value),
            error: None,
        }
    }

    fn failed(error: ErrorCode, value: Option<f64>) -> Self {
        Evaluation {
            value,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'t> {
    Number(f64),
    Symbol(&'t str),
}

fn parse_number(token: &str) -> Option<f64> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// True if the token is a finite numeric literal.
pub fn is_number(token: &str) -> bool {
    parse_number(token).is_some()
}

/// Evaluates token sequences against a fixed set of cells.
pub struct FormulaEvaluator<'s, S: ?Sized> {
    source: &'s S,
}

impl<'s, S: CellSource + ?Sized> FormulaEvaluator<'s, S> {
    pub fn new(source: &'s S) -> Self {
        FormulaEvaluator { source }
    }

    pub fn evaluate<T: AsRef<str>>(&self, tokens: &[T]) -> Evaluation {
        if tokens.is_empty() {
            return Evaluation::failed(ErrorCode::EmptyFormula, None);
        }

        let mut error = None;
        let infix = self.substitute(tokens, &mut error);
        let postfix = to_postfix(infix, &mut error);
        debug!("postfix queue: {postfix:?}");

        if let [Token::Number(n)] = postfix[..] {
            return Evaluation { value: Some(n), error };
        }

        evaluate_postfix(&postfix, error)
    }

    /// Replaces cell references with their values. Every failed reference
    /// overwrites `error`; successful ones leave it alone.
    fn substitute<'t, T: AsRef<str>>(
        &self,
        tokens: &'t [T],
        error: &mut Option<ErrorCode>,
    ) -> Vec<Token<'t>> {
        tokens
            .iter()
            .map(|token| {
                let token = token.as_ref().trim();
                if is_valid_cell_label(token) {
                    let (value, cell_error) = self.cell_value(token);
                    debug!("{token} -> {value} ({cell_error:?})");
                    if cell_error.is_some() {
                        *error = cell_error;
                    }
                    Token::Number(value)
                } else if let Some(n) = parse_number(token) {
                    Token::Number(n)
                } else {
                    Token::Symbol(token)
                }
            })
            .collect()
    }

    fn cell_value(&self, label: &str) -> (f64, Option<ErrorCode>) {
        let label = canonical_label(label);
        match self.source.cell(&label) {
            Some(cell) if matches!(cell.error, Some(e) if e != ErrorCode::EmptyFormula) => {
                (0.0, cell.error)
            }
            Some(cell) if !cell.is_blank() => (cell.value, None),
            _ => (0.0, Some(ErrorCode::InvalidCell)),
        }
    }
}

/// Evaluates `tokens` against `source` without keeping an evaluator around.
pub fn evaluate<S, T>(tokens: &[T], source: &S) -> Evaluation
where
    S: CellSource + ?Sized,
    T: AsRef<str>,
{
    FormulaEvaluator::new(source).evaluate(tokens)
}

/// Shunting-Yard. Symbols that are not known operators are passed through
/// untouched and rejected when the postfix queue is evaluated.
fn to_postfix<'t>(infix: Vec<Token<'t>>, error: &mut Option<ErrorCode>) -> Vec<Token<'t>> {
    let mut operators: Vec<&'t str> = Vec::new();
    let mut output: Vec<Token<'t>> = Vec::new();

    for token in infix {
        match token {
            Token::Number(_) => output.push(token),
            Token::Symbol("(") => operators.push("("),
            Token::Symbol(")") => {
                if closes_empty_group(&operators, &output) {
                    *error = Some(ErrorCode::MissingParentheses);
                }
                // an unmatched `)` just drains the stack
                while let Some(top) = operators.pop() {
                    if top == "(" {
                        break;
                    }
                    output.push(Token::Symbol(top));
                }
            }
            Token::Symbol(symbol) => {
                while let Some(&top) = operators.last() {
                    if !pops_before(top, symbol) {
                        break;
                    }
                    output.push(Token::Symbol(top));
                    operators.pop();
                }
                operators.push(symbol);
            }
        }
    }

    output.extend(operators.into_iter().rev().map(Token::Symbol));
    output
}

/// Only known operators compare; `(` and unknown symbols never pop.
fn pops_before(top: &str, incoming: &str) -> bool {
    match (Operator::from_symbol(top), Operator::from_symbol(incoming)) {
        (Some(top), Some(incoming)) => top.precedence() >= incoming.precedence(),
        _ => false,
    }
}

/// A `)` closing a `(` before anything has reached the output queue.
///
/// This only catches an empty group at the start of a formula: `1 + ()`
/// slips through and fails later as an operand underflow.
fn closes_empty_group(operators: &[&str], output: &[Token]) -> bool {
    operators.last() == Some(&"(") && output.is_empty()
}

fn evaluate_postfix(postfix: &[Token], error: Option<ErrorCode>) -> Evaluation {
    let mut values: Vec<f64> = Vec::new();

    for token in postfix {
        let symbol = match *token {
            Token::Number(n) => {
                values.push(n);
                continue;
            }
            Token::Symbol(symbol) => symbol,
        };

        // a leftover `(` still takes operands, so it can fail as an underflow
        let operator = Operator::from_symbol(symbol);
        if operator.is_none() && symbol != "(" {
            return Evaluation::failed(ErrorCode::InvalidOperator, None);
        }

        let b = values.pop();
        let a = values.pop();
        let (Some(a), Some(b)) = (a, b) else {
            if let Some(b) = b {
                values.push(b);
            }
            return Evaluation::failed(ErrorCode::InvalidFormula, values.last().copied());
        };

        let result = match operator {
            Some(Operator::Add) => a + b,
            Some(Operator::Subtract) => a - b,
            Some(Operator::Multiply) => a * b,
            Some(Operator::Divide) if b == 0.0 => {
                return Evaluation::failed(ErrorCode::DivideByZero, Some(f64::INFINITY));
            }
            Some(Operator::Divide) => a / b,
            None => return Evaluation::failed(ErrorCode::InvalidOperator, None),
        };
        trace!("{a} {symbol} {b} = {result}");
        values.push(result);
    }

    if error.is_some() {
        return Evaluation { value: None, error };
    }

    match values[..] {
        [value] => Evaluation::ok(value),
        _ => Evaluation::failed(ErrorCode::InvalidFormula, values.last().copied()),
    }
}
