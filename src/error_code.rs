use thiserror::Error;

/// Error codes a cell can display. Shared by the evaluator and the sheet so
/// a propagated error renders the same everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorCode {
    #[error("#EMPTY!")]
    EmptyFormula,
    #[error("#DIV/0!")]
    DivideByZero,
    /// Reference to a blank cell.
    #[error("#REF!")]
    InvalidCell,
    /// Too few operands for an operator.
    #[error("#ERR")]
    InvalidFormula,
    #[error("#ERR")]
    InvalidNumber,
    #[error("#ERR")]
    InvalidOperator,
    #[error("#ERR")]
    MissingParentheses,
}
