//! Spreadsheet decoding (first sheet only, via `calamine`) and `.xlsx`
//! encoding (via `rust_xlsxwriter`).

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_xlsxwriter::{Format, Workbook};

use crate::{
    data::{Value, is_missing_token},
    error::TableIoError,
    io_utils::{TableFormat, finalize_headers},
    table::Table,
};

/// Largest magnitude an `.xlsx` number cell holds without rounding.
const MAX_EXACT_INTEGER: i64 = 1 << 53;

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Decodes the first sheet of a workbook. The first row holds the column
/// names.
pub fn decode_spreadsheet(bytes: &[u8]) -> Result<Table, TableIoError> {
    let fail = |reason: String| TableIoError::decode(TableFormat::Spreadsheet, reason);
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|err| fail(err.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| fail("workbook has no sheets".to_string()))?
        .map_err(|err| fail(err.to_string()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Err(fail("first sheet is empty".to_string()));
    };
    let headers = finalize_headers(header.iter().map(|cell| cell.to_string()).collect());
    let body = rows
        .map(|row| row.iter().map(cell_value).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    Table::from_rows(headers, body).map_err(|err| fail(err.to_string()))
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::Integer(*i),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Boolean(*b),
        Data::String(s) => {
            if is_missing_token(s.trim()) {
                Value::Missing
            } else {
                Value::Text(s.clone())
            }
        }
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(datetime_value)
            .unwrap_or(Value::Missing),
        Data::DateTimeIso(s) => iso_value(s),
        Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(_) | Data::Empty => Value::Missing,
    }
}

// Midnight timestamps are plain dates in spreadsheets.
fn datetime_value(datetime: NaiveDateTime) -> Value {
    if datetime.time() == NaiveTime::MIN {
        Value::Date(datetime.date())
    } else {
        Value::DateTime(datetime)
    }
}

fn iso_value(raw: &str) -> Value {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        datetime_value(datetime)
    } else if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Value::Date(date)
    } else {
        Value::Text(raw.to_string())
    }
}

/// Writes `table` as a single-sheet `.xlsx` workbook: a header row, then the
/// data in column order, without an index column. Missing cells stay blank,
/// date cells keep a date number format, and integers too large for an exact
/// number cell are written as text.
pub fn encode_spreadsheet(table: &Table) -> Result<Vec<u8>, TableIoError> {
    let fail = |reason: String| TableIoError::encode(TableFormat::Spreadsheet, reason);
    let date_format = Format::new().set_num_format(DATE_FORMAT);
    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col_idx, column) in table.columns().iter().enumerate() {
        let col = u16::try_from(col_idx)
            .map_err(|_| fail(format!("too many columns ({})", table.column_count())))?;
        worksheet
            .write_string(0, col, column.name())
            .map_err(|err| fail(err.to_string()))?;
        for (row_idx, value) in column.values().iter().enumerate() {
            if value.is_missing() {
                continue;
            }
            let row = u32::try_from(row_idx + 1)
                .map_err(|_| fail(format!("too many rows ({})", table.row_count())))?;
            let written = match value {
                Value::Integer(i) if i.unsigned_abs() <= MAX_EXACT_INTEGER as u64 => {
                    worksheet.write_number(row, col, *i as f64)
                }
                Value::Float(f) => worksheet.write_number(row, col, *f),
                Value::Boolean(b) => worksheet.write_boolean(row, col, *b),
                Value::Date(date) => {
                    worksheet.write_datetime_with_format(row, col, date, &date_format)
                }
                Value::DateTime(datetime) => {
                    worksheet.write_datetime_with_format(row, col, datetime, &datetime_format)
                }
                other => worksheet.write_string(row, col, &other.as_display()),
            };
            written.map_err(|err| fail(err.to_string()))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|err| fail(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midnight_datetimes_become_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            datetime_value(date.and_hms_opt(0, 0, 0).unwrap()),
            Value::Date(date)
        );
        assert!(matches!(
            datetime_value(date.and_hms_opt(9, 15, 0).unwrap()),
            Value::DateTime(_)
        ));
    }

    #[test]
    fn iso_strings_are_typed() {
        assert!(matches!(iso_value("2024-03-01T00:00:00"), Value::Date(_)));
        assert!(matches!(iso_value("2024-03-01"), Value::Date(_)));
        assert!(matches!(iso_value("P1D"), Value::Text(_)));
    }

    #[test]
    fn string_cells_honour_missing_tokens() {
        assert_eq!(cell_value(&Data::String("N/A".to_string())), Value::Missing);
        assert_eq!(
            cell_value(&Data::String("42".to_string())),
            Value::Text("42".to_string())
        );
        assert_eq!(cell_value(&Data::Empty), Value::Missing);
    }
}
