mod args;
mod returns;

use clap::Parser;
use log::{info, LevelFilter};
use snafu::ErrorCompat;

use crate::args::{Args, Command, DEFAULT_DATA_PATH};

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    info!("args: {:?}", args);

    let data_path =
        |d: &Option<String>| d.clone().unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());

    let res = match &args.command {
        Command::Ingest {
            config,
            data,
            reference,
        } => returns::run_ingest(config, &data_path(data), reference.as_deref()),
        Command::Normalize { data, config } => {
            returns::run_normalize(&data_path(data), config.as_deref())
        }
        Command::Report {
            data,
            contest,
            text_out,
            html_out,
            config,
        } => returns::run_report(
            &data_path(data),
            contest.as_deref().unwrap_or("president"),
            text_out.as_deref(),
            html_out.as_deref(),
            config.as_deref(),
        ),
        Command::Geojson {
            input,
            output,
            data,
        } => returns::run_geojson(input, output, &data_path(data)),
    };

    // Only run-level failures get here: a source that fails during ingest is a warning.
    if let Err(e) = res {
        eprintln!("An error occurred: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(e.as_ref()) {
            eprintln!("trace: {:?}", bt);
        }
        std::process::exit(1);
    }
}
