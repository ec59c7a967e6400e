//! File boundary: format resolution, delimited text decoding/encoding,
//! delimiter sniffing and text encodings.
//!
//! - **Formats** are resolved from the file extension; anything unknown is
//!   rejected with [`TableIoError::UnsupportedFormat`].
//! - **Delimiters** are sniffed from the first records with `csv-nose`
//!   unless given explicitly.
//! - **Encoding** defaults to UTF-8 (a byte-order mark is stripped); other
//!   labels are resolved through `encoding_rs`.
//! - **Headers** follow the first-row convention: blank names become
//!   `Unnamed: <index>` and repeated names get `.1`, `.2`, ... suffixes.
//!
//! Spreadsheet decoding and encoding live in [`crate::spreadsheet`].

use std::{
    collections::HashSet,
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use csv_nose::{SampleSize, Sniffer};
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    data::{Value, type_raw_column},
    error::TableIoError,
    spreadsheet,
    table::{Column, Table},
};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';
pub const CLEAN_SUFFIX: &str = "_clean";

const SNIFF_RECORDS: usize = 20;

const DELIMITED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Delimited,
    Spreadsheet,
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableFormat::Delimited => f.write_str("delimited text"),
            TableFormat::Spreadsheet => f.write_str("spreadsheet"),
        }
    }
}

impl TableFormat {
    /// Input format implied by the extension of `path`.
    pub fn from_path(path: &Path) -> Result<Self, TableIoError> {
        let ext = lowercase_extension(path);
        if DELIMITED_EXTENSIONS.contains(&ext.as_str()) {
            Ok(TableFormat::Delimited)
        } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            Ok(TableFormat::Spreadsheet)
        } else {
            Err(TableIoError::UnsupportedFormat(path.display().to_string()))
        }
    }

    /// Output format implied by the extension of `path`. Only `.xlsx` is
    /// written for spreadsheets.
    pub fn for_output(path: &Path) -> Result<Self, TableIoError> {
        match lowercase_extension(path).as_str() {
            "xlsx" => Ok(TableFormat::Spreadsheet),
            ext if DELIMITED_EXTENSIONS.contains(&ext) => Ok(TableFormat::Delimited),
            _ => Err(TableIoError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: UTF_8,
        }
    }
}

fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_output_delimiter(path: &Path) -> u8 {
    if lowercase_extension(path) == "tsv" {
        DEFAULT_TSV_DELIMITER
    } else {
        DEFAULT_CSV_DELIMITER
    }
}

/// `<stem>_clean.xlsx` next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}{CLEAN_SUFFIX}.xlsx"))
}

/// Reads and decodes the table stored at `path`.
pub fn load_table(path: &Path, options: &DecodeOptions) -> Result<Table> {
    let format = TableFormat::from_path(path)?;
    let bytes = fs::read(path).with_context(|| format!("Reading input file {path:?}"))?;
    let fallback = match lowercase_extension(path).as_str() {
        "tsv" => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    };
    let table = decode(&bytes, format, options, fallback)
        .with_context(|| format!("Loading {path:?}"))?;
    debug!(
        "Loaded {} column(s) x {} row(s) from {:?}",
        table.column_count(),
        table.row_count(),
        path
    );
    Ok(table)
}

/// Encodes `table` in the format implied by `path` and writes it there.
pub fn write_table(path: &Path, table: &Table) -> Result<(), TableIoError> {
    let format = TableFormat::for_output(path)?;
    let bytes = encode(table, format, resolve_output_delimiter(path))?;
    fs::write(path, bytes).map_err(|err| TableIoError::encode(format, format!("{path:?}: {err}")))
}

pub fn decode(
    bytes: &[u8],
    format: TableFormat,
    options: &DecodeOptions,
    fallback_delimiter: u8,
) -> Result<Table, TableIoError> {
    match format {
        TableFormat::Delimited => decode_delimited(bytes, options, fallback_delimiter),
        TableFormat::Spreadsheet => spreadsheet::decode_spreadsheet(bytes),
    }
}

pub fn encode(table: &Table, format: TableFormat, delimiter: u8) -> Result<Vec<u8>, TableIoError> {
    match format {
        TableFormat::Delimited => encode_delimited(table, delimiter),
        TableFormat::Spreadsheet => spreadsheet::encode_spreadsheet(table),
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String, TableIoError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(TableIoError::decode(
            TableFormat::Delimited,
            format!("input is not valid {}", encoding.name()),
        ))
    } else {
        Ok(text.into_owned())
    }
}

fn open_csv_reader(text: &str, delimiter: u8) -> csv::Reader<&[u8]> {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(text.as_bytes())
}

/// Sniffs the dialect of `text` and returns its delimiter. `None` when the
/// sniffer fails or finds a single-field layout, so callers fall back to the
/// extension default.
pub fn sniff_delimiter(text: &str) -> Option<u8> {
    let mut sniffer = Sniffer::new();
    sniffer.sample_size(SampleSize::Records(SNIFF_RECORDS));
    match sniffer.sniff_bytes(text.as_bytes()) {
        Ok(metadata) if metadata.num_fields > 1 => Some(metadata.dialect.delimiter),
        Ok(_) => None,
        Err(err) => {
            debug!("Delimiter sniffing failed: {err}");
            None
        }
    }
}

pub fn decode_delimited(
    bytes: &[u8],
    options: &DecodeOptions,
    fallback_delimiter: u8,
) -> Result<Table, TableIoError> {
    let text = decode_bytes(bytes, options.encoding)?;
    let delimiter = options
        .delimiter
        .or_else(|| sniff_delimiter(&text))
        .unwrap_or(fallback_delimiter);
    debug!("Reading delimited text with delimiter {:?}", delimiter as char);

    let fail = |reason: String| TableIoError::decode(TableFormat::Delimited, reason);
    let mut reader = open_csv_reader(&text, delimiter);
    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(|err| fail(err.to_string()))?,
        None => return Err(fail("no columns to parse from input".to_string())),
    };
    let headers = finalize_headers(header.iter().map(str::to_string).collect());
    let width = headers.len();

    let mut fields: Vec<Vec<String>> = vec![Vec::new(); width];
    for (idx, record) in records.enumerate() {
        let record = record.map_err(|err| fail(err.to_string()))?;
        if record.len() > width {
            return Err(fail(format!(
                "line {} has {} field(s) but the header has {}",
                idx + 2,
                record.len(),
                width
            )));
        }
        for (col, column) in fields.iter_mut().enumerate() {
            column.push(record.get(col).unwrap_or_default().to_string());
        }
    }
    let columns = headers
        .into_iter()
        .zip(fields)
        .map(|(name, raw)| Column::new(name, type_raw_column(&raw)))
        .collect();
    Table::new(columns).map_err(|err| fail(err.to_string()))
}

pub fn encode_delimited(table: &Table, delimiter: u8) -> Result<Vec<u8>, TableIoError> {
    let fail = |reason: String| TableIoError::encode(TableFormat::Delimited, reason);
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    let mut writer = builder.from_writer(Vec::new());
    writer
        .write_record(table.column_names())
        .map_err(|err| fail(err.to_string()))?;
    for idx in 0..table.row_count() {
        let cells = table
            .row(idx)
            .unwrap_or_default()
            .into_iter()
            .map(Value::as_display);
        writer
            .write_record(cells)
            .map_err(|err| fail(err.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|err| fail(err.error().to_string()))
}

/// Applies the header naming rules: blank names become `Unnamed: <index>`,
/// repeated names are suffixed with `.1`, `.2`, ... until unique.
pub fn finalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(raw.len());
    let mut headers = Vec::with_capacity(raw.len());
    for (idx, name) in raw.into_iter().enumerate() {
        let trimmed = name.trim();
        let base = if trimmed.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            trimmed.to_string()
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_reads_the_delimiter_from_the_dialect() {
        assert_eq!(
            sniff_delimiter("a;b;c\n1;2,5;3\n4;5;6\n7;8;9\n"),
            Some(b';')
        );
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3\n4,5,6\n"), Some(b','));
        assert_eq!(sniff_delimiter("a\tb\tc\n1\t2\t3\n4\t5\t6\n"), Some(b'\t'));
    }

    #[test]
    fn stray_boolean_stays_text_in_a_date_column() {
        let bytes = b"due\n2024-01-05\n2024-02-01\n2024-03-01\ntrue\n";
        let table = decode_delimited(bytes, &DecodeOptions::default(), b',').unwrap();
        assert!(!table.column("due").unwrap().has_boolean());
        assert_eq!(
            table.column("due").unwrap().values()[3],
            Value::Text("true".to_string())
        );
    }

    #[test]
    fn finalize_headers_names_blank_and_repeated_columns() {
        let headers = finalize_headers(vec![
            "date".to_string(),
            "".to_string(),
            "date".to_string(),
            "date".to_string(),
        ]);
        assert_eq!(headers, vec!["date", "Unnamed: 1", "date.1", "date.2"]);
    }

    #[test]
    fn format_resolution_follows_extension() {
        assert_eq!(
            TableFormat::from_path(Path::new("in.CSV")).unwrap(),
            TableFormat::Delimited
        );
        assert_eq!(
            TableFormat::from_path(Path::new("in.xls")).unwrap(),
            TableFormat::Spreadsheet
        );
        assert!(matches!(
            TableFormat::from_path(Path::new("in.json")),
            Err(TableIoError::UnsupportedFormat(_))
        ));
        assert!(TableFormat::for_output(Path::new("out.ods")).is_err());
    }

    #[test]
    fn default_output_path_appends_clean_suffix() {
        assert_eq!(
            default_output_path(Path::new("/data/report.csv")),
            PathBuf::from("/data/report_clean.xlsx")
        );
    }

    #[test]
    fn decode_pads_short_rows_and_rejects_long_ones() {
        let options = DecodeOptions::default();
        let table = decode_delimited(b"a,b\n1\n", &options, b',').unwrap();
        assert_eq!(table.column("b").unwrap().values(), &[Value::Missing]);

        let err = decode_delimited(b"a,b\n1,2,3\n", &options, b',').unwrap_err();
        assert!(matches!(err, TableIoError::Decode { .. }));
    }
}
