use std::collections::HashSet;

use log::info;

use crate::{
    evaluator::evaluate,
    label::{canonical_label, is_valid_cell_label},
    spreadsheet::{CellContent, Sheet, Spreadsheet},
};

/// Everything needed to update a cell after evaluation
pub struct PreparedSet {
    pub label: String,
    pub content: CellContent,
    pub new_depends_on: HashSet<String>,
}

/// Canonical labels of every cell a formula references.
pub fn referenced_labels<T: AsRef<str>>(formula: &[T]) -> HashSet<String> {
    formula
        .iter()
        .map(|token| token.as_ref().trim())
        .filter(|token| is_valid_cell_label(token))
        .map(canonical_label)
        .collect()
}

/// Step 1: evaluate the formula against a snapshot of the cells
pub fn prepare_set(label: &str, formula: Vec<String>, snapshot: &Spreadsheet) -> PreparedSet {
    let evaluation = evaluate(&formula, snapshot);
    let new_depends_on = referenced_labels(&formula);

    let content = CellContent {
        value: evaluation.value.unwrap_or(0.0),
        error: evaluation.error,
        formula,
    };

    PreparedSet {
        label: canonical_label(label),
        content,
        new_depends_on,
    }
}

/// Step 2: store the result and recalculate everything that depends on it
pub fn apply_set(prepared: PreparedSet, sheet: &mut Sheet) {
    let mut in_progress = HashSet::new();
    apply_tracked(prepared, sheet, &mut in_progress);
}

fn apply_tracked(prepared: PreparedSet, sheet: &mut Sheet, in_progress: &mut HashSet<String>) {
    let label = prepared.label;

    // Remove old dependencies
    if let Some(old) = sheet.depends_on.get(&label) {
        for var in old {
            if let Some(dependents) = sheet.depends_by.get_mut(var) {
                dependents.remove(&label);
            }
        }
    }

    // Add new dependencies
    for var in &prepared.new_depends_on {
        sheet
            .depends_by
            .entry(var.clone())
            .or_default()
            .insert(label.clone());
    }
    sheet
        .depends_on
        .insert(label.clone(), prepared.new_depends_on);

    sheet.cells.insert(label.clone(), prepared.content);

    // Recalculate dependents; a cell already on this path is a cycle, leave it
    in_progress.insert(label.clone());
    let dependents = sheet.depends_by.get(&label).cloned().unwrap_or_default();
    for dep in dependents {
        if in_progress.contains(&dep) {
            continue;
        }
        let Some(formula) = sheet.cells.get(&dep).map(|c| c.formula.clone()) else {
            continue;
        };
        info!("recalculating {dep} after {label} changed");
        let prepared_dep = prepare_set(&dep, formula, &sheet.cells);
        apply_tracked(prepared_dep, sheet, in_progress);
    }
    in_progress.remove(&label);
}

pub fn set_cell(label: &str, formula: Vec<String>, sheet: &mut Sheet) {
    let prepared = prepare_set(label, formula, &sheet.cells);
    apply_set(prepared, sheet);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error_code::ErrorCode;

    fn formula(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    fn value_of(sheet: &Sheet, label: &str) -> (f64, Option<ErrorCode>) {
        let cell = &sheet.cells[label];
        (cell.value, cell.error)
    }

    #[test]
    fn stores_evaluated_value() {
        let mut sheet = Sheet::new();
        set_cell("A1", formula("2 * 3"), &mut sheet);
        assert_eq!(value_of(&sheet, "A1"), (6.0, None));
        assert_eq!(sheet.cells["A1"].formula, formula("2 * 3"));
    }

    #[test]
    fn empty_formula_is_stored_with_its_error() {
        let mut sheet = Sheet::new();
        set_cell("A1", Vec::new(), &mut sheet);
        assert_eq!(value_of(&sheet, "A1"), (0.0, Some(ErrorCode::EmptyFormula)));

        set_cell("B1", formula("A1 + 1"), &mut sheet);
        assert_eq!(value_of(&sheet, "B1"), (0.0, Some(ErrorCode::InvalidCell)));
    }

    #[test]
    fn records_dependencies() {
        let mut sheet = Sheet::new();
        set_cell("c3", formula("A1 + b2 * a1"), &mut sheet);
        assert_eq!(
            sheet.depends_on["C3"],
            HashSet::from(["A1".to_string(), "B2".to_string()])
        );
        assert!(sheet.depends_by["A1"].contains("C3"));
        assert!(sheet.depends_by["B2"].contains("C3"));

        set_cell("C3", formula("B2"), &mut sheet);
        assert!(!sheet.depends_by["A1"].contains("C3"));
        assert!(sheet.depends_by["B2"].contains("C3"));
    }

    #[test]
    fn padded_references_are_dependencies() {
        let labels = referenced_labels(&[" a1 ", "+", "B2"]);
        assert_eq!(labels, HashSet::from(["A1".to_string(), "B2".to_string()]));
    }

    #[test]
    fn recalculates_dependents_transitively() {
        let mut sheet = Sheet::new();
        set_cell("A1", formula("1"), &mut sheet);
        set_cell("B1", formula("A1 + 1"), &mut sheet);
        set_cell("C1", formula("B1 * 10"), &mut sheet);
        assert_eq!(value_of(&sheet, "C1"), (20.0, None));

        set_cell("A1", formula("4"), &mut sheet);
        assert_eq!(value_of(&sheet, "B1"), (5.0, None));
        assert_eq!(value_of(&sheet, "C1"), (50.0, None));
    }

    #[test]
    fn errors_flow_to_dependents() {
        let mut sheet = Sheet::new();
        set_cell("A1", formula("1"), &mut sheet);
        set_cell("B1", formula("A1 + 1"), &mut sheet);

        set_cell("A1", formula("1 / 0"), &mut sheet);
        assert_eq!(value_of(&sheet, "B1"), (0.0, Some(ErrorCode::DivideByZero)));

        set_cell("A1", formula("2"), &mut sheet);
        assert_eq!(value_of(&sheet, "B1"), (3.0, None));
    }

    #[test]
    fn cycles_terminate() {
        let mut sheet = Sheet::new();
        set_cell("A1", formula("1"), &mut sheet);
        set_cell("B1", formula("A1 + 1"), &mut sheet);
        set_cell("A1", formula("B1 + 1"), &mut sheet);
        set_cell("A1", formula("B1 + 1"), &mut sheet);

        assert!(sheet.depends_by["A1"].contains("B1"));
        assert!(sheet.depends_by["B1"].contains("A1"));
    }
}
