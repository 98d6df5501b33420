use crate::returns::*;

use std::collections::BTreeMap;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

/// The kinds of input files.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    OpenElections,
    Official,
    OfficialXlsx,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub year: i32,
    /// If set, only these offices are read from the file.
    pub offices: Option<Vec<String>>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    pub fn provider(&self) -> ReturnsResult<Provider> {
        match self.provider.as_str() {
            "openelections" => Ok(Provider::OpenElections),
            "official" => Ok(Provider::Official),
            "official_xlsx" => Ok(Provider::OfficialXlsx),
            x => whatever!("Provider not implemented {:?}", x),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OfficeConfig {
    pub name: String,
    pub category: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "runningMate")]
    pub running_mate: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct NomineeConfig {
    pub year: i32,
    pub contest: String,
    pub party: String,
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CohortConfig {
    pub name: String,
    pub counties: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReturnsConfig {
    pub title: Option<String>,
    #[serde(default)]
    pub sources: Vec<FileSource>,
    #[serde(rename = "partyCodes")]
    pub party_codes: Option<BTreeMap<String, String>>,
    pub offices: Option<Vec<OfficeConfig>>,
    pub surnames: Option<Vec<String>>,
    pub nominees: Option<Vec<NomineeConfig>>,
    pub cohorts: Option<Vec<CohortConfig>>,
}

pub fn read_config(path: &str) -> BReturnsResult<ReturnsConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: ReturnsConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    for source in config.sources.iter() {
        source.provider()?;
    }
    Ok(config)
}

pub fn read_reference(path: &str) -> BReturnsResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

fn validate_code(code: &str, what: &str) -> ReturnsResult<()> {
    if code.is_empty() || code.chars().any(|c| c.is_whitespace()) {
        whatever!("Invalid {} code in the configuration: {:?}", what, code)
    }
    Ok(())
}

/// Extends the built-in lookup tables with the entries of the configuration.
pub fn build_tables(config: &ReturnsConfig) -> ReturnsResult<NormalizationTables> {
    let mut tables = NormalizationTables::default();
    for (label, code) in config.party_codes.clone().unwrap_or_default() {
        validate_code(code.trim(), "party")?;
        tables = tables.with_party_code(&label, &code);
    }
    for o in config.offices.clone().unwrap_or_default() {
        validate_code(&o.category, "contest")?;
        let display_name = o.display_name.clone().unwrap_or_else(|| o.name.clone());
        let running_mate = o
            .running_mate
            .unwrap_or_else(|| normalize_office(&o.name, &tables).running_mate);
        tables = tables.with_office(&o.name, &o.category, &display_name, running_mate);
    }
    for s in config.surnames.clone().unwrap_or_default() {
        tables = tables.with_surname(&s);
    }
    for n in config.nominees.clone().unwrap_or_default() {
        validate_code(&n.contest, "contest")?;
        let party = normalize_party_code(&n.party, &tables);
        validate_code(&party, "party")?;
        tables = tables.with_nominee(n.year, &n.contest, &party, &n.name);
    }
    debug!(
        "build_tables: {} party codes, {} offices, {} nominees",
        tables.party_codes.len(),
        tables.offices.len(),
        tables.nominees.len()
    );
    Ok(tables)
}
