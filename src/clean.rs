//! The `clean` command: load, drop duplicate rows and unwanted columns,
//! normalize dates, fill empty cells, write.

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::CleanArgs,
    data::Value,
    io_utils::{self, DecodeOptions},
    normalize::{NormalizeOptions, normalize_dates_with},
};

pub fn execute(args: &CleanArgs) -> Result<()> {
    let options = DecodeOptions {
        delimiter: args.source.delimiter,
        encoding: io_utils::resolve_encoding(args.source.input_encoding.as_deref())?,
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| io_utils::default_output_path(&args.source.input));
    // Fail on an unwritable format before doing any work.
    io_utils::TableFormat::for_output(&output)?;

    info!("Cleaning '{}'", args.source.input.display());
    let table = io_utils::load_table(&args.source.input, &options)?;

    let table = if args.drop_duplicates {
        let before = table.row_count();
        let deduplicated = table.drop_duplicate_rows();
        info!(
            "Removed {} duplicate row(s)",
            before - deduplicated.row_count()
        );
        deduplicated
    } else {
        table
    };

    let drop = trimmed_names(&args.drop);
    let table = if drop.is_empty() {
        table
    } else {
        let before = table.column_count();
        let dropped = table.drop_columns(&drop);
        info!("Dropped {} column(s)", before - dropped.column_count());
        dropped
    };

    let dates = trimmed_names(&args.dates);
    let selection = (!dates.is_empty()).then_some(dates.as_slice());
    let normalize_options = NormalizeOptions {
        min_ratio: args.min_ratio,
    };
    let (cleaned, report) = normalize_dates_with(&table, selection, &normalize_options);

    // Runs after normalization so cells blanked there are filled as well.
    let cleaned = match args.fill_missing.as_deref() {
        Some(raw) => {
            info!("Filling {} empty cell(s) with '{raw}'", cleaned.missing_cells());
            cleaned.fill_missing(&Value::fill_value(raw))
        }
        None => cleaned,
    };

    io_utils::write_table(&output, &cleaned)
        .with_context(|| format!("Writing cleaned output to {output:?}"))?;
    info!(
        "Wrote {} column(s) x {} row(s)",
        cleaned.column_count(),
        cleaned.row_count()
    );

    println!("Cleaned file written: {}", output.display());
    if !report.handled.is_empty() {
        println!(
            "Date columns normalized: {}",
            report.handled_columns().join(", ")
        );
    }
    for column in report.handled.iter().filter(|column| column.blanked > 0) {
        println!(
            "  {}: {} unparseable cell(s) left empty",
            column.name, column.blanked
        );
    }
    Ok(())
}

fn trimmed_names(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
        .collect()
}
