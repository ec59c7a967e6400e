//! The `detect` command: per-column date plausibility listing.

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    classify::{DateClassification, score_column},
    cli::DetectArgs,
    io_utils::{self, DecodeOptions},
    table::{self, Table},
};

#[derive(Debug, Clone, Serialize)]
pub struct ColumnReport {
    pub name: String,
    pub kind: &'static str,
    /// Numeric columns never take part in automatic date detection.
    pub numeric: bool,
    pub classification: Option<DateClassification>,
}

pub fn execute(args: &DetectArgs) -> Result<()> {
    let options = DecodeOptions {
        delimiter: args.source.delimiter,
        encoding: io_utils::resolve_encoding(args.source.input_encoding.as_deref())?,
    };
    let table = io_utils::load_table(&args.source.input, &options)?;
    let reports = column_reports(&table, args.min_ratio);

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&reports).context("Serializing column report")?;
        println!("{rendered}");
    } else {
        let headers = ["#", "column", "kind", "date ratio", "date-like"]
            .map(String::from)
            .to_vec();
        let rows = reports
            .iter()
            .enumerate()
            .map(|(idx, report)| {
                let (ratio, verdict) = match &report.classification {
                    Some(scored) => (
                        format!("{:.2}", scored.ratio),
                        String::from(if scored.is_date_like { "yes" } else { "no" }),
                    ),
                    None => ("-".to_string(), "excluded (numeric)".to_string()),
                };
                vec![
                    (idx + 1).to_string(),
                    report.name.clone(),
                    report.kind.to_string(),
                    ratio,
                    verdict,
                ]
            })
            .collect::<Vec<_>>();
        table::print_table(&headers, &rows);
    }

    let date_like = reports
        .iter()
        .filter(|report| report.classification.is_some_and(|c| c.is_date_like))
        .count();
    info!(
        "{} of {} column(s) look like dates in {:?}",
        date_like,
        reports.len(),
        args.source.input
    );
    Ok(())
}

pub fn column_reports(table: &Table, min_ratio: f64) -> Vec<ColumnReport> {
    table
        .columns()
        .iter()
        .map(|column| {
            let numeric = column.is_numeric();
            ColumnReport {
                name: column.name().to_string(),
                kind: column.kind(),
                numeric,
                classification: (!numeric).then(|| score_column(column.values(), min_ratio)),
            }
        })
        .collect()
}
