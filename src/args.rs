use clap::{Parser, Subcommand};

/// The default location of the dataset, relative to the directory of the scripts.
pub const DEFAULT_DATA_PATH: &str = "../data/election_results.json";

/// This is a program to clean, store and report on county-level election returns.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Reads the sources listed in a configuration file and merges them into the dataset.
    Ingest {
        /// (file path) The configuration file in JSON format. For more information about the
        /// file format, read the documentation of the `manual` module.
        #[clap(short, long, value_parser)]
        config: String,

        /// (file path, optional) The dataset to update. It is created if it does not exist.
        #[clap(short, long, value_parser)]
        data: Option<String>,

        /// (file path) A reference dataset in JSON format. If provided, countyret will
        /// check that the updated dataset matches the reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },

    /// Passes the candidate names stored in the dataset through the normalization again.
    Normalize {
        /// (file path, optional) The dataset to update.
        #[clap(short, long, value_parser)]
        data: Option<String>,

        /// (file path, optional) A configuration file, for its extra surnames and nominees.
        #[clap(short, long, value_parser)]
        config: Option<String>,
    },

    /// Prints the findings for a contest (swings, flips, bellwethers, ...).
    Report {
        /// (file path, optional) The dataset to read.
        #[clap(short, long, value_parser)]
        data: Option<String>,

        /// (default president) The category of the contest.
        #[clap(long, value_parser)]
        contest: Option<String>,

        /// (file path, optional) If specified, the text report is also written to this location.
        #[clap(long, value_parser)]
        text_out: Option<String>,

        /// (file path, optional) If specified, the findings are written as HTML cards to
        /// this location.
        #[clap(long, value_parser)]
        html_out: Option<String>,

        /// (file path, optional) A configuration file, for the groups of counties to follow.
        #[clap(short, long, value_parser)]
        config: Option<String>,
    },

    /// Adds a normalized `county` property to the features of a GeoJSON file.
    Geojson {
        /// (file path) The GeoJSON FeatureCollection with the county shapes.
        #[clap(short, long, value_parser)]
        input: String,

        /// (file path) Where to write the labelled collection.
        #[clap(short, long, value_parser)]
        output: String,

        /// (file path, optional) The dataset used to check the county names.
        #[clap(short, long, value_parser)]
        data: Option<String>,
    },
}
