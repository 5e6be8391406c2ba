use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;

use cellcalc::{
    evaluate,
    get::get_cell,
    label::{canonical_label, cell_position, is_valid_cell_label},
    set::set_cell,
    Sheet,
};
use clap::Parser;
use log::info;

#[derive(Parser)]
#[command(name = "cellcalc")]
#[command(version, about = "Evaluate a tokenized spreadsheet formula")]
struct Cli {
    /// Set a cell before evaluating, e.g. `-c A1=5` or `-c "B1=A1 * 2"`
    #[arg(short, long = "cell", value_name = "LABEL=FORMULA", value_parser = parse_assignment)]
    cells: Vec<(String, Vec<String>)>,

    /// Print every stored cell after evaluating
    #[arg(long)]
    dump: bool,

    /// Formula tokens separated by whitespace
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

fn split_tokens(formula: &str) -> Vec<String> {
    formula.split_whitespace().map(String::from).collect()
}

fn parse_assignment(arg: &str) -> Result<(String, Vec<String>), String> {
    let (label, formula) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=FORMULA, got `{arg}`"))?;
    let label = label.trim();
    if !is_valid_cell_label(label) {
        return Err(format!("`{label}` is not a cell label"));
    }
    Ok((canonical_label(label), split_tokens(formula)))
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut sheet = Sheet::new();
    for (label, formula) in cli.cells {
        info!("setting {label} to {formula:?}");
        set_cell(&label, formula, &mut sheet);
    }

    let tokens: Vec<String> = cli.tokens.iter().flat_map(|t| split_tokens(t)).collect();
    let evaluation = evaluate(&tokens, &sheet.cells);

    let mut out = io::stdout().lock();
    match evaluation.error {
        Some(error) => writeln!(out, "{error} ({error:?})")?,
        None => writeln!(out, "= {}", evaluation.value.unwrap_or_default())?,
    }

    if cli.dump {
        let mut labels: Vec<&String> = sheet.cells.keys().collect();
        labels.sort_by_key(|label| cell_position(label).map(|(col, row)| (row, col)));
        for label in labels {
            writeln!(out, "{}", get_cell(label, &sheet.cells))?;
        }
    }

    Ok(if evaluation.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
