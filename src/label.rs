use once_cell::sync::Lazy;
use regex::Regex;
use rsheet_lib::cells::column_name_to_number;

static CELL_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+[1-9][0-9]*$").expect("cell label pattern"));

/// Column letters followed by a one-based row number, e.g. `A1` or `ab12`.
///
/// Row `0` and zero-padded rows such as `A01` are rejected so each cell has
/// exactly one label; such tokens fall through to the operator path.
pub fn is_valid_cell_label(token: &str) -> bool {
    CELL_LABEL.is_match(token)
}

/// Labels are stored upper-cased so `a1` and `A1` name the same cell.
pub fn canonical_label(label: &str) -> String {
    label.to_ascii_uppercase()
}

/// Zero-based `(col, row)` of a label, or `None` if it is not a cell label.
pub fn cell_position(label: &str) -> Option<(u32, u32)> {
    if !is_valid_cell_label(label) {
        return None;
    }

    let col_name: String = label
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let row: u32 = label
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .ok()?;

    Some((column_name_to_number(&col_name), row - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_letters_then_digits() {
        assert!(is_valid_cell_label("A1"));
        assert!(is_valid_cell_label("AB123"));
        assert!(is_valid_cell_label("c7"));
    }

    #[test]
    fn rejects_other_tokens() {
        for token in ["", "1", "A", "1A", "A0", "A01", "A1B", "+", "(", "A 1", "3.5"] {
            assert!(!is_valid_cell_label(token), "{token:?} accepted");
        }
    }

    #[test]
    fn positions_order_by_row_then_column() {
        let a2 = cell_position("A2").unwrap();
        let b1 = cell_position("b1").unwrap();
        let a10 = cell_position("A10").unwrap();
        assert_eq!(a2.1, 1);
        assert_eq!(a10.1, 9);
        assert_eq!(a2.0, b1.0 - 1);
        assert!((b1.1, b1.0) < (a2.1, a2.0));
        assert!((a2.1, a2.0) < (a10.1, a10.0));
        assert_eq!(cell_position("+"), None);
    }
}
