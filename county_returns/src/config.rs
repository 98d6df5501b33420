// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize};

/// One line of a source file, before any normalization.
///
/// Readers produce these rows regardless of the schema of the input (community
/// precinct files, official county exports, spreadsheets).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawVoteRow {
    pub county: String,
    pub office: String,
    pub party: String,
    pub candidate: String,
    pub votes: u64,
}

impl RawVoteRow {
    pub fn new(county: &str, office: &str, party: &str, candidate: &str, votes: u64) -> RawVoteRow {
        RawVoteRow {
            county: county.to_string(),
            office: office.to_string(),
            party: party.to_string(),
            candidate: candidate.to_string(),
            votes,
        }
    }
}

/// A single race in a given year, for example the presidential race of 2024.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Contest {
    pub year: i32,
    /// The short code of the office (`president`, `us_senate`, ...)
    pub category: String,
    /// The name of the office, for display.
    pub name: String,
    /// If true, the ballot lists a ticket (President/Vice President,
    /// Governor/Lieutenant Governor) and only the first name is kept.
    pub running_mate: bool,
}

impl Contest {
    /// The key of this contest inside its category, e.g. `president_2024`.
    pub fn instance_key(&self) -> String {
        format!("{}_{}", self.category, self.year)
    }
}

/// The votes accumulated for one county, before the margins are computed.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct VoteTally {
    pub dem_votes: u64,
    pub rep_votes: u64,
    pub other_votes: u64,
    pub dem_candidate: String,
    pub rep_candidate: String,
    pub all_parties: BTreeMap<String, u64>,
}

// ******** Output data structures *********

pub const DEM: &str = "DEM";
pub const REP: &str = "REP";
/// The bucket in `all_parties` for the votes that carry no party label.
pub const OTHER: &str = "OTHER";

/// The outcome of the two-party race in one place.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Winner {
    #[serde(rename = "DEM")]
    Dem,
    #[serde(rename = "REP")]
    Rep,
    #[serde(rename = "TIE")]
    Tie,
}

impl Winner {
    pub fn from_votes(dem_votes: u64, rep_votes: u64) -> Winner {
        match dem_votes.cmp(&rep_votes) {
            std::cmp::Ordering::Greater => Winner::Dem,
            std::cmp::Ordering::Less => Winner::Rep,
            std::cmp::Ordering::Equal => Winner::Tie,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Winner::Dem => DEM,
            Winner::Rep => REP,
            Winner::Tie => "TIE",
        }
    }
}

impl Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The side a competitiveness bucket leans to.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Lean {
    Democratic,
    Republican,
    Tossup,
}

/// A labelled bucket for a margin, with the color used on the maps.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Competitiveness {
    pub category: String,
    pub party: Lean,
    pub code: String,
    pub color: String,
}

/// The result of one contest in one county.
///
/// Invariant: `total_votes == dem_votes + rep_votes + other_votes`.
/// When neither major party received a vote, `margin_pct` is 0 and
/// `has_two_party_vote()` returns false.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionResult {
    pub county: String,
    pub contest: String,
    #[serde(deserialize_with = "year_from_number_or_string")]
    pub year: i32,
    pub dem_candidate: String,
    pub rep_candidate: String,
    pub dem_votes: u64,
    pub rep_votes: u64,
    pub other_votes: u64,
    pub total_votes: u64,
    #[serde(default)]
    pub two_party_total: u64,
    pub margin: i64,
    pub margin_pct: f64,
    #[serde(default)]
    pub dem_pct: f64,
    #[serde(default)]
    pub rep_pct: f64,
    pub winner: Winner,
    pub competitiveness: Competitiveness,
    #[serde(default)]
    pub all_parties: BTreeMap<String, u64>,
}

impl ElectionResult {
    pub fn has_two_party_vote(&self) -> bool {
        self.dem_votes + self.rep_votes > 0
    }
}

// Older documents store the year as a string.
fn year_from_number_or_string<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YearRepr {
        Number(i32),
        Text(String),
    }
    match YearRepr::deserialize(deserializer)? {
        YearRepr::Number(y) => Ok(y),
        YearRepr::Text(s) => s.trim().parse::<i32>().map_err(serde::de::Error::custom),
    }
}

/// Errors that prevent a batch of results from being stored.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ReturnsErrors {
    /// The same county appears twice in a batch once the names are normalized.
    DuplicateCounty { county: String, contest: String },
    /// A record does not belong to the contest it is merged into.
    MismatchedRecord {
        county: String,
        expected: String,
        found: String,
    },
    /// A county name is empty once normalized.
    EmptyCounty { contest: String },
    /// A county key is not in its canonical form, or another spelling of the
    /// same county is already stored.
    NonCanonicalCounty {
        county: String,
        expected: String,
        contest: String,
    },
}

impl Error for ReturnsErrors {}

impl Display for ReturnsErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnsErrors::DuplicateCounty { county, contest } => {
                write!(f, "county {} appears twice in contest {}", county, contest)
            }
            ReturnsErrors::MismatchedRecord {
                county,
                expected,
                found,
            } => write!(
                f,
                "record for {} belongs to {} but was merged into {}",
                county, found, expected
            ),
            ReturnsErrors::EmptyCounty { contest } => {
                write!(f, "empty county name in contest {}", contest)
            }
            ReturnsErrors::NonCanonicalCounty {
                county,
                expected,
                contest,
            } => write!(
                f,
                "county {:?} in contest {} should be spelled {:?}",
                county, contest, expected
            ),
        }
    }
}

// ********* Configuration **********

// The vocabularies below follow the labels found in the community (OpenElections)
// files and in the official county exports of the Department of State.

const DEFAULT_PARTY_CODES: [(&str, &str); 18] = [
    ("Dem", DEM),
    ("Democratic", DEM),
    ("Rep", REP),
    ("Republican", REP),
    ("Grn", "GRN"),
    ("Green", "GRN"),
    ("Green Party", "GRN"),
    ("Lib", "LIB"),
    ("Libertarian", "LIB"),
    ("Const", "CNST"),
    ("Constitution", "CNST"),
    ("Constitution Party", "CNST"),
    ("Ref", "REF"),
    ("Reform", "REF"),
    ("Forward", "FWD"),
    ("Forward Party", "FWD"),
    ("Keystone", "KEY"),
    ("Keystone Party", "KEY"),
];

// (office label in the sources, category, display name, ticket)
const DEFAULT_OFFICES: [(&str, &str, &str, bool); 10] = [
    ("President", "president", "President of the United States", true),
    (
        "President of the United States",
        "president",
        "President of the United States",
        true,
    ),
    ("U.S. Senate", "us_senate", "United States Senator", false),
    ("United States Senator", "us_senate", "United States Senator", false),
    ("Governor", "governor", "Governor", true),
    ("Attorney General", "attorney_general", "Attorney General", false),
    ("Auditor General", "auditor_general", "Auditor General", false),
    ("State Treasurer", "state_treasurer", "State Treasurer", false),
    ("Treasurer", "state_treasurer", "State Treasurer", false),
    ("U.S. Senator", "us_senate", "United States Senator", false),
];

const DEFAULT_SURNAMES: [&str; 2] = ["DePasquale", "DeFoor"];

// (year, party, name). The ballots list the tickets in many different ways.
const DEFAULT_PRESIDENTIAL_NOMINEES: [(i32, &str, &str); 14] = [
    (2000, DEM, "Al Gore"),
    (2000, REP, "George W. Bush"),
    (2004, DEM, "John F. Kerry"),
    (2004, REP, "George W. Bush"),
    (2008, DEM, "Barack Obama"),
    (2008, REP, "John McCain"),
    (2012, DEM, "Barack Obama"),
    (2012, REP, "Mitt Romney"),
    (2016, DEM, "Hillary Clinton"),
    (2016, REP, "Donald J. Trump"),
    (2020, DEM, "Joe Biden"),
    (2020, REP, "Donald J. Trump"),
    (2024, DEM, "Kamala Harris"),
    (2024, REP, "Donald J. Trump"),
];

/// How an office label found in a source maps to a contest category.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct OfficeMapping {
    pub label: String,
    pub category: String,
    pub display_name: String,
    pub running_mate: bool,
}

/// The canonical name of a nominee, used instead of the name on the ballot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Nominee {
    pub year: i32,
    pub category: String,
    pub party: String,
    pub name: String,
}

/// The lookup tables used by the normalizer.
///
/// The tables are plain values: build them once (usually from the defaults and
/// the configuration file) and pass them to a `Normalizer`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NormalizationTables {
    /// lowercased party label -> party code
    pub party_codes: BTreeMap<String, String>,
    pub offices: Vec<OfficeMapping>,
    /// Surnames with an inner capital letter (DePasquale), matched case-insensitively.
    pub surnames: Vec<String>,
    pub nominees: Vec<Nominee>,
}

impl NormalizationTables {
    /// Tables with no entry at all.
    pub fn empty() -> NormalizationTables {
        NormalizationTables {
            party_codes: BTreeMap::new(),
            offices: Vec::new(),
            surnames: Vec::new(),
            nominees: Vec::new(),
        }
    }

    pub fn with_party_code(mut self, label: &str, code: &str) -> NormalizationTables {
        self.party_codes
            .insert(label.trim().to_lowercase(), code.trim().to_uppercase());
        self
    }

    /// Adds an office label. Later mappings take precedence over the earlier ones.
    pub fn with_office(
        mut self,
        label: &str,
        category: &str,
        display_name: &str,
        running_mate: bool,
    ) -> NormalizationTables {
        self.offices.insert(
            0,
            OfficeMapping {
                label: label.trim().to_string(),
                category: category.to_string(),
                display_name: display_name.to_string(),
                running_mate,
            },
        );
        self
    }

    pub fn with_surname(mut self, surname: &str) -> NormalizationTables {
        self.surnames.push(surname.trim().to_string());
        self
    }

    pub fn with_nominee(
        mut self,
        year: i32,
        category: &str,
        party: &str,
        name: &str,
    ) -> NormalizationTables {
        self.nominees.retain(|n| {
            !(n.year == year && n.category == category && n.party == party.to_uppercase())
        });
        self.nominees.push(Nominee {
            year,
            category: category.to_string(),
            party: party.to_uppercase(),
            name: name.to_string(),
        });
        self
    }
}

impl Default for NormalizationTables {
    fn default() -> Self {
        let mut tables = NormalizationTables::empty();
        for (label, code) in DEFAULT_PARTY_CODES {
            tables = tables.with_party_code(label, code);
        }
        // Inserted in reverse so that the order of the table is the order of precedence.
        for (label, category, display_name, ticket) in DEFAULT_OFFICES.iter().rev() {
            tables = tables.with_office(label, category, display_name, *ticket);
        }
        for surname in DEFAULT_SURNAMES {
            tables = tables.with_surname(surname);
        }
        for (year, party, name) in DEFAULT_PRESIDENTIAL_NOMINEES {
            tables = tables.with_nominee(year, "president", party, name);
        }
        tables
    }
}
