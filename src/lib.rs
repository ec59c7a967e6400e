pub mod classify;
pub mod clean;
pub mod cli;
pub mod data;
pub mod dates;
pub mod detect;
pub mod error;
pub mod io_utils;
pub mod normalize;
pub mod preview;
pub mod spreadsheet;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use crate::{
    classify::{DEFAULT_MIN_RATIO, classify},
    normalize::{NormalizationReport, normalize_dates},
    table::{Column, Table},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheet_cleaner", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Clean(args) => clean::execute(&args),
        Commands::Detect(args) => detect::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
    }
}
