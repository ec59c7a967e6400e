//! Rewrites date columns into canonical `YYYY-MM-DD` text.
//!
//! The working set is either the caller's explicit selection (used as given,
//! unknown names skipped) or, when the selection is absent or empty, every
//! non-numeric column the classifier accepts. Each column is converted on its
//! own: a cell that does not parse becomes [`Value::Missing`], and a column
//! that cannot be converted at all is skipped without affecting the others.

use log::{debug, warn};
use serde::Serialize;

use crate::{
    classify::{DEFAULT_MIN_RATIO, auto_candidates, score_column},
    data::Value,
    dates::{format_canonical, parse_cell_date},
    error::ConversionError,
    table::{Column, Table},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeOptions {
    /// Threshold used when the working set is auto-detected.
    pub min_ratio: f64,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            min_ratio: DEFAULT_MIN_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandledColumn {
    pub name: String,
    /// Cells rewritten to canonical form.
    pub converted: usize,
    /// Non-missing cells that did not parse and were blanked.
    pub blanked: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationReport {
    pub auto_detected: bool,
    pub handled: Vec<HandledColumn>,
    pub skipped: Vec<ConversionError>,
}

impl NormalizationReport {
    /// Names of the converted columns, in processing order.
    pub fn handled_columns(&self) -> Vec<&str> {
        self.handled.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn blanked_cells(&self) -> usize {
        self.handled.iter().map(|column| column.blanked).sum()
    }
}

/// Normalizes date columns using the default detection threshold. The input
/// table is left untouched; the converted copy is returned with the report.
pub fn normalize_dates(table: &Table, selected: Option<&[String]>) -> (Table, NormalizationReport) {
    normalize_dates_with(table, selected, &NormalizeOptions::default())
}

pub fn normalize_dates_with(
    table: &Table,
    selected: Option<&[String]>,
    options: &NormalizeOptions,
) -> (Table, NormalizationReport) {
    let auto_detected = selected.is_none_or(|names| names.is_empty());
    let working_set = resolve_working_set(table, selected, options.min_ratio);
    debug!("Date working set: {:?}", working_set);

    let mut output = table.clone();
    let mut report = NormalizationReport {
        auto_detected,
        ..NormalizationReport::default()
    };
    for name in working_set {
        let converted = table
            .column(&name)
            .ok_or_else(|| ConversionError::UnknownColumn(name.clone()))
            .and_then(convert_column);
        match converted {
            Ok((values, handled)) => {
                debug!(
                    "Column '{}': {} cell(s) converted, {} blanked",
                    handled.name, handled.converted, handled.blanked
                );
                if let Some(target) = output.column_mut(&name) {
                    target.replace_values(values);
                }
                report.handled.push(handled);
            }
            Err(err @ ConversionError::UnknownColumn(_)) => {
                debug!("Skipping date column: {err}");
                report.skipped.push(err);
            }
            Err(err) => {
                warn!("Skipping date column: {err}");
                report.skipped.push(err);
            }
        }
    }
    (output, report)
}

/// Resolves which columns to convert. A non-empty selection wins outright and
/// keeps its order (repeated names collapse to the first occurrence).
pub fn resolve_working_set(
    table: &Table,
    selected: Option<&[String]>,
    min_ratio: f64,
) -> Vec<String> {
    match selected {
        Some(names) if !names.is_empty() => {
            let mut working_set: Vec<String> = Vec::with_capacity(names.len());
            for name in names {
                if !working_set.contains(name) {
                    working_set.push(name.clone());
                }
            }
            working_set
        }
        _ => auto_candidates(table)
            .into_iter()
            .filter_map(|name| {
                let column = table.column(name)?;
                let scored = score_column(column.values(), min_ratio);
                debug!(
                    "Column '{}': {}/{} cell(s) parse as dates (ratio {:.2})",
                    name, scored.parsed, scored.total, scored.ratio
                );
                scored.is_date_like.then(|| name.to_string())
            })
            .collect(),
    }
}

/// Converts one column, or reports why it cannot be converted.
pub fn convert_column(column: &Column) -> Result<(Vec<Value>, HandledColumn), ConversionError> {
    if column.has_boolean() {
        return Err(ConversionError::Incompatible {
            column: column.name().to_string(),
            kind: "boolean",
        });
    }
    let mut converted = 0usize;
    let mut blanked = 0usize;
    let values = column
        .values()
        .iter()
        .map(|value| match parse_cell_date(value) {
            Some(date) => {
                converted += 1;
                Value::Text(format_canonical(date))
            }
            None => {
                if !value.is_missing() {
                    blanked += 1;
                }
                Value::Missing
            }
        })
        .collect();
    Ok((
        values,
        HandledColumn {
            name: column.name().to_string(),
            converted,
            blanked,
        },
    ))
}
