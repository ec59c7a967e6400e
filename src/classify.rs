//! Date plausibility scoring for a single column.
//!
//! A column is date-like when the share of its cells that parse as a date
//! reaches a threshold. Missing cells stay in the denominator, so sparse
//! columns score lower than their populated cells alone would.

use serde::Serialize;

use crate::{dates::parse_cell_date, data::Value, table::Table};

pub const DEFAULT_MIN_RATIO: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateClassification {
    pub parsed: usize,
    pub total: usize,
    pub ratio: f64,
    pub is_date_like: bool,
}

/// Returns `true` when at least `min_ratio` of `values` parse as dates.
/// An empty column is never date-like.
pub fn classify(values: &[Value], min_ratio: f64) -> bool {
    score_column(values, min_ratio).is_date_like
}

pub fn score_column(values: &[Value], min_ratio: f64) -> DateClassification {
    let total = values.len();
    if total == 0 {
        return DateClassification {
            parsed: 0,
            total: 0,
            ratio: 0.0,
            is_date_like: false,
        };
    }
    let parsed = values
        .iter()
        .filter(|value| parse_cell_date(value).is_some())
        .count();
    let ratio = parsed as f64 / total as f64;
    DateClassification {
        parsed,
        total,
        ratio,
        is_date_like: ratio >= min_ratio,
    }
}

/// Names of the columns eligible for automatic date detection, in table
/// order. Uniformly numeric columns are left out.
pub fn auto_candidates(table: &Table) -> Vec<&str> {
    table
        .columns()
        .iter()
        .filter(|column| !column.is_numeric())
        .map(|column| column.name())
        .collect()
}
