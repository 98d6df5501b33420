use log::{debug, info, warn};

use county_returns::dataset::{Dataset, MergeOutcome};
use county_returns::*;
use snafu::{prelude::*, Snafu};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::returns::config_reader::*;

mod config_reader;
mod io_common;
mod io_csv;
mod io_dataset;
mod io_excel;
mod io_geojson;
mod render;

#[derive(Debug, Snafu)]
pub enum ReturnsError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing to JSON"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error opening the spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The spreadsheet {path} has no worksheet or no header"))]
    EmptyExcel { path: String },
    #[snafu(display("The spreadsheet {path} has no worksheet named {name}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("Error opening the CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading the header of {path}"))]
    CsvHeader { source: csv::Error, path: String },
    #[snafu(display("Column {column} not found in the header of {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Error parsing the GeoJSON content of {path}"))]
    ParsingGeoJson {
        source: geojson::Error,
        path: String,
    },
    #[snafu(display("{path} is not a GeoJSON FeatureCollection"))]
    NotFeatureCollection { path: String },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("The dataset {path} has no result for the contest {contest}"))]
    EmptyDataset { path: String, contest: String },
    #[snafu(display("Error merging the results of {contest}"))]
    Merging {
        source: ReturnsErrors,
        contest: String,
    },
    #[snafu(display("Difference detected between the dataset and the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReturnsResult<T> = Result<T, ReturnsError>;
pub type BReturnsResult<T> = Result<T, Box<ReturnsError>>;

fn read_source(path: &str, source: &FileSource) -> BReturnsResult<Vec<RawVoteRow>> {
    info!("read_source: reading {:?} ({})", path, source.provider);
    let rows = match source.provider()? {
        Provider::OpenElections => io_csv::read_csv_rows(path, &io_common::OPENELECTIONS_SCHEMA)?,
        Provider::Official => io_csv::read_csv_rows(path, &io_common::OFFICIAL_SCHEMA)?,
        Provider::OfficialXlsx => io_excel::read_excel_rows(path, source)?,
    };
    info!("read_source: {} rows in {:?}", rows.len(), path);
    Ok(rows)
}

/// Merges all the contests found in the rows of a source. Returns the number of
/// contests merged.
fn ingest_rows(
    dataset: &mut Dataset,
    rows: &[RawVoteRow],
    source: &FileSource,
    normalizer: &Normalizer,
) -> BReturnsResult<usize> {
    let mut merged = 0;
    for (contest, contest_rows) in
        partition_by_contest(rows, source.year, normalizer, source.offices.as_deref())
    {
        let results = aggregate_contest(&contest_rows, &contest, normalizer);
        let outcome = dataset
            .merge_contest(&contest, results)
            .context(MergingSnafu {
                contest: contest.instance_key(),
            })?;
        debug!("ingest_rows: {}: {:?}", contest.instance_key(), outcome);
        if outcome != MergeOutcome::Skipped {
            merged += 1;
        }
    }
    Ok(merged)
}

fn check_reference(dataset: &Dataset, reference_path: &str) -> BReturnsResult<()> {
    let reference = read_reference(reference_path)?;
    info!("check_reference: comparing with {:?}", reference_path);
    let pretty_reference =
        serde_json::to_string_pretty(&reference).context(SerializingJsonSnafu {})?;
    // Both sides are read back from their text form: same key order, same float parsing.
    let text = serde_json::to_string(dataset).context(SerializingJsonSnafu {})?;
    let computed: JSValue = serde_json::from_str(&text).context(ParsingJsonSnafu {
        path: reference_path,
    })?;
    let pretty_computed =
        serde_json::to_string_pretty(&computed).context(SerializingJsonSnafu {})?;
    if pretty_reference != pretty_computed {
        warn!("Found differences with the reference dataset");
        print_diff(pretty_reference.as_str(), pretty_computed.as_str(), "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail()
        .map_err(Box::new);
    }
    Ok(())
}

pub fn run_ingest(
    config_path: &str,
    data_path: &str,
    reference_path: Option<&str>,
) -> BReturnsResult<()> {
    let config = read_config(config_path)?;
    info!("config: {:?}", config);
    let tables = build_tables(&config)?;

    let root_p = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu {})?;

    let title = config.title.clone().unwrap_or_default();
    let mut dataset = io_dataset::load_dataset(data_path, &title)?;
    if !title.is_empty() {
        dataset.metadata.title = title;
    }

    let mut normalizer = Normalizer::new(tables);
    let mut num_merged = 0;
    // A failed source is reported and skipped: the others are still merged.
    let mut failed: Vec<String> = Vec::new();
    for source in config.sources.iter() {
        let p: PathBuf = root_p.join(&source.file_path);
        let p2 = p.as_path().display().to_string();
        if !p.exists() {
            warn!("run_ingest: source {:?} not found, skipping it", p2);
            failed.push(p2);
            continue;
        }
        // Counties stored by the previous sources keep their spelling.
        normalizer = normalizer.with_known_counties(dataset.known_counties().iter());
        let res = read_source(&p2, source)
            .and_then(|rows| ingest_rows(&mut dataset, &rows, source, &normalizer));
        match res {
            Ok(n) => num_merged += n,
            Err(e) => {
                warn!("run_ingest: source {:?} skipped: {}", p2, e);
                failed.push(p2);
            }
        }
    }
    info!(
        "run_ingest: {} contests merged, {} counties, years {:?}",
        num_merged, dataset.metadata.counties_count, dataset.metadata.years
    );
    if !failed.is_empty() {
        warn!(
            "run_ingest: {} of {} sources could not be loaded: {:?}",
            failed.len(),
            config.sources.len(),
            failed
        );
    }

    io_dataset::save_dataset(data_path, &dataset)?;

    if let Some(reference) = reference_path {
        check_reference(&dataset, reference)?;
    }
    Ok(())
}

pub fn run_normalize(data_path: &str, config_path: Option<&str>) -> BReturnsResult<()> {
    let tables = match config_path {
        Some(p) => build_tables(&read_config(p)?)?,
        None => NormalizationTables::default(),
    };
    let mut dataset = io_dataset::load_dataset(data_path, "")?;
    if dataset.is_empty() {
        warn!("run_normalize: nothing to normalize in {:?}", data_path);
        return Ok(());
    }
    let renames = dataset.renormalize_candidates(&Normalizer::new(tables));
    for (old, new) in renames.iter() {
        println!("{} -> {}", old, new);
    }
    if renames.is_empty() {
        println!("All the candidate names are already normalized.");
        return Ok(());
    }
    io_dataset::save_dataset(data_path, &dataset)
}

pub fn run_report(
    data_path: &str,
    contest: &str,
    text_out: Option<&str>,
    html_out: Option<&str>,
    config_path: Option<&str>,
) -> BReturnsResult<()> {
    let dataset = io_dataset::load_dataset(data_path, "")?;
    if dataset.contest_blocks(contest).is_empty() {
        return EmptyDatasetSnafu {
            path: data_path,
            contest,
        }
        .fail()
        .map_err(Box::new);
    }
    let cohorts: Vec<(String, Vec<String>)> = match config_path {
        Some(p) => read_config(p)?
            .cohorts
            .unwrap_or_default()
            .into_iter()
            .map(|c| (c.name, c.counties))
            .collect(),
        None => Vec::new(),
    };

    let findings = render::compute_findings(&dataset, contest, &cohorts);
    let text = render::render_text(&findings);
    println!("{}", text);
    if let Some(p) = text_out {
        io_common::write_text(p, &text)?;
        info!("run_report: text report written to {:?}", p);
    }
    if let Some(p) = html_out {
        io_common::write_text(p, &render::render_html(&findings))?;
        info!("run_report: HTML findings written to {:?}", p);
    }
    Ok(())
}

pub fn run_geojson(input_path: &str, output_path: &str, data_path: &str) -> BReturnsResult<()> {
    let mut collection = io_geojson::read_feature_collection(input_path)?;
    let dataset = io_dataset::load_dataset(data_path, "")?;
    let known = dataset.known_counties();
    let normalizer = Normalizer::default().with_known_counties(known.iter());

    let labels: BTreeSet<String> = io_geojson::label_counties(&mut collection, &normalizer)
        .into_iter()
        .collect();
    for l in labels.difference(&known) {
        if !known.is_empty() {
            warn!("run_geojson: county {:?} has no result in the dataset", l);
        }
    }
    for k in known.difference(&labels) {
        warn!("run_geojson: county {:?} has no shape", k);
    }
    io_geojson::write_feature_collection(output_path, collection)?;
    info!(
        "run_geojson: {} counties labelled in {:?}",
        labels.len(),
        output_path
    );
    Ok(())
}
