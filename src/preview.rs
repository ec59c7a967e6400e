use anyhow::Result;
use log::info;

use crate::{
    cli::PreviewArgs,
    io_utils::{self, DecodeOptions},
    table,
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let options = DecodeOptions {
        delimiter: args.source.delimiter,
        encoding: io_utils::resolve_encoding(args.source.input_encoding.as_deref())?,
    };
    let loaded = io_utils::load_table(&args.source.input, &options)?;
    let headers = loaded
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let rows = loaded.head(args.rows);

    table::print_table(&headers, &rows);
    info!(
        "Displayed {} of {} row(s) from {:?}",
        rows.len(),
        loaded.row_count(),
        args.source.input
    );
    Ok(())
}
