use thiserror::Error;

use crate::io_utils::TableFormat;

/// Structural problems when assembling a [`crate::table::Table`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
    #[error("column '{column}' has {found} value(s) but the table has {expected} row(s)")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("row {row} has {found} field(s) but the header has {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Failures at the file boundary. An already-loaded table is never touched
/// by any of these.
#[derive(Debug, Error)]
pub enum TableIoError {
    #[error("unsupported file format '{0}' (expected .csv, .tsv, .txt, .xlsx, .xlsm, .xlsb, .xls or .ods)")]
    UnsupportedFormat(String),
    #[error("failed to decode {format} input: {reason}")]
    Decode { format: TableFormat, reason: String },
    #[error("failed to write {format} output: {reason}")]
    Encode { format: TableFormat, reason: String },
}

impl TableIoError {
    pub(crate) fn decode(format: TableFormat, reason: impl ToString) -> Self {
        TableIoError::Decode {
            format,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn encode(format: TableFormat, reason: impl ToString) -> Self {
        TableIoError::Encode {
            format,
            reason: reason.to_string(),
        }
    }
}

/// Why a column in the working set was not converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("column '{0}' is not in the table")]
    UnknownColumn(String),
    #[error("column '{column}' holds {kind} values that cannot be read as dates")]
    Incompatible { column: String, kind: &'static str },
}

impl ConversionError {
    pub fn column(&self) -> &str {
        match self {
            ConversionError::UnknownColumn(column) => column,
            ConversionError::Incompatible { column, .. } => column,
        }
    }
}
