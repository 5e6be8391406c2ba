pub mod error_code;
pub mod evaluator;
pub mod get;
pub mod label;
pub mod set;
pub mod spreadsheet;

pub use error_code::ErrorCode;
pub use evaluator::{evaluate, Evaluation, FormulaEvaluator};
pub use spreadsheet::{CellContent, CellSource, Sheet, Spreadsheet};
