use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::classify::DEFAULT_MIN_RATIO;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Drop unwanted columns and normalize date columns in spreadsheets and CSV files",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Drop columns, normalize date columns to YYYY-MM-DD and write a cleaned copy
    Clean(CleanArgs),
    /// List columns with their kind and how strongly each looks like a date
    Detect(DetectArgs),
    /// Show the first rows of a file as a table
    Preview(PreviewArgs),
}

/// Options shared by every command that reads an input file.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input file (.csv, .tsv, .txt, .xlsx, .xlsm, .xlsb, .xls, .ods)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Field delimiter for delimited text (auto-detected when omitted; supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of delimited text input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Output file (.xlsx, .csv or .tsv); defaults to <input>_clean.xlsx next to the input
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Columns to remove before normalizing (unknown names are ignored)
    #[arg(short = 'd', long = "drop", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub drop: Vec<String>,
    /// Columns to normalize as dates; when omitted, date columns are detected automatically
    #[arg(short = 'D', long = "dates", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub dates: Vec<String>,
    /// Share of cells that must parse as dates for automatic detection
    #[arg(long = "min-ratio", default_value_t = DEFAULT_MIN_RATIO, value_parser = parse_ratio)]
    pub min_ratio: f64,
    /// Remove rows that repeat an earlier row across every column
    #[arg(long = "drop-duplicates")]
    pub drop_duplicates: bool,
    /// Value written into empty cells after cleaning (e.g. 0 or N/A)
    #[arg(long = "fill-missing", value_name = "VALUE")]
    pub fill_missing: Option<String>,
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Share of cells that must parse as dates for a column to be date-like
    #[arg(long = "min-ratio", default_value_t = DEFAULT_MIN_RATIO, value_parser = parse_ratio)]
    pub min_ratio: f64,
    /// Emit the column report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Number of rows to display
    #[arg(long, default_value_t = 5)]
    pub rows: usize,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" | "\\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

pub fn parse_ratio(value: &str) -> Result<f64, String> {
    let ratio: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if !(0.0..=1.0).contains(&ratio) {
        return Err(format!("Ratio must be between 0 and 1, got {ratio}"));
    }
    Ok(ratio)
}
