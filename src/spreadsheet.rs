use std::collections::{HashMap, HashSet};

use crate::error_code::ErrorCode;

/// A stored cell. The default is a blank cell: no formula, no error.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellContent {
    pub formula: Vec<String>,
    pub value: f64,
    pub error: Option<ErrorCode>,
}

impl CellContent {
    pub fn is_blank(&self) -> bool {
        self.formula.is_empty()
    }
}

pub type Spreadsheet = HashMap<String, CellContent>;

/// Read-only view the evaluator resolves references against.
///
/// Labels passed in are canonical (see [`crate::label::canonical_label`]).
/// `None` is treated as a blank cell.
pub trait CellSource {
    fn cell(&self, label: &str) -> Option<&CellContent>;
}

impl CellSource for Spreadsheet {
    fn cell(&self, label: &str) -> Option<&CellContent> {
        self.get(label)
    }
}

/// Cells plus the dependency graph between them.
#[derive(Default)]
pub struct Sheet {
    pub cells: Spreadsheet,
    // key = A1, set = {A2} => A1 has a formula referencing A2
    pub depends_on: HashMap<String, HashSet<String>>,
    // key = A2, set = {A1} => A1 has a formula referencing A2
    pub depends_by: HashMap<String, HashSet<String>>,
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }
}
