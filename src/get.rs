use std::fmt;

use crate::{error_code::ErrorCode, label::canonical_label, spreadsheet::Spreadsheet};

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Value(String, f64),
    Error(String, ErrorCode),
    Blank(String),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Value(label, value) => write!(f, "{label} = {value}"),
            Reply::Error(label, error) => write!(f, "{label} = {error}"),
            Reply::Blank(label) => write!(f, "{label} = "),
        }
    }
}

pub fn get_cell(label: &str, spreadsheet: &Spreadsheet) -> Reply {
    let label = canonical_label(label);

    match spreadsheet.get(&label) {
        Some(content) => match content.error {
            Some(error) => Reply::Error(label, error),
            None if content.is_blank() => Reply::Blank(label),
            None => Reply::Value(label, content.value),
        },
        None => Reply::Blank(label),
    }
}
