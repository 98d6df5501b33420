use crate::returns::*;

use std::fs;
use std::path::Path;

/// The names of the columns of a tabular source, by order of preference.
pub struct Schema {
    pub name: &'static str,
    pub county: &'static [&'static str],
    pub office: &'static [&'static str],
    pub party: &'static [&'static str],
    pub candidate: &'static [&'static str],
    pub votes: &'static [&'static str],
}

pub const OPENELECTIONS_SCHEMA: Schema = Schema {
    name: "openelections",
    county: &["county"],
    office: &["office"],
    party: &["party"],
    candidate: &["candidate"],
    votes: &["votes"],
};

pub const OFFICIAL_SCHEMA: Schema = Schema {
    name: "official",
    county: &["County Name", "County"],
    office: &["Office Name", "Office"],
    party: &["Party Name", "Party"],
    candidate: &["Candidate Name", "Candidate"],
    votes: &["Votes", "Vote Count", "Total Votes"],
};

/// The positions of the columns in a given file.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Columns {
    county: usize,
    office: usize,
    // Some files have no party column.
    party: Option<usize>,
    candidate: usize,
    votes: usize,
}

fn find_column(header: &[String], names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| {
        header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    })
}

impl Schema {
    pub fn columns(&self, header: &[String], path: &str) -> BReturnsResult<Columns> {
        let required = |names: &'static [&'static str]| -> BReturnsResult<usize> {
            let idx = find_column(header, names).context(MissingColumnSnafu {
                column: names[0],
                path,
            })?;
            Ok(idx)
        };
        let cols = Columns {
            county: required(self.county)?,
            office: required(self.office)?,
            party: find_column(header, self.party),
            candidate: required(self.candidate)?,
            votes: required(self.votes)?,
        };
        debug!("columns: {} schema in {:?}: {:?}", self.name, path, cols);
        Ok(cols)
    }
}

impl Columns {
    /// Extracts a row from the cells of a line. Malformed lines are reported and
    /// dropped.
    pub fn row(&self, cells: &[String], lineno: usize, path: &str) -> Option<RawVoteRow> {
        let get = |idx: usize| cells.get(idx).map(|s| s.trim());
        let (county, office, candidate, votes_s) = match (
            get(self.county),
            get(self.office),
            get(self.candidate),
            get(self.votes),
        ) {
            (Some(c), Some(o), Some(cand), Some(v)) => (c, o, cand, v),
            _ => {
                warn!("{}:{}: line too short, skipping it: {:?}", path, lineno, cells);
                return None;
            }
        };
        let party = self.party.and_then(get).unwrap_or("");
        let votes = match parse_votes(votes_s) {
            Some(v) => v,
            None => {
                warn!(
                    "{}:{}: cannot read the votes {:?}, skipping the line",
                    path, lineno, votes_s
                );
                return None;
            }
        };
        Some(RawVoteRow::new(county, office, party, candidate, votes))
    }
}

/// Reads a vote count. Thousands separators are accepted, as well as the
/// integral floats written by spreadsheets ("1234.0").
pub fn parse_votes(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(v) = cleaned.parse::<u64>() {
        return Some(v);
    }
    match cleaned.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 && f.is_finite() => Some(f as u64),
        _ => None,
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

pub fn write_text(path: &str, content: &str) -> BReturnsResult<()> {
    fs::write(path, content).context(WritingFileSnafu { path })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn votes() {
        assert_eq!(parse_votes("1234"), Some(1234));
        assert_eq!(parse_votes(" 1,234,567 "), Some(1234567));
        assert_eq!(parse_votes("18207.0"), Some(18207));
        assert_eq!(parse_votes("12.5"), None);
        assert_eq!(parse_votes("-3"), None);
        assert_eq!(parse_votes(""), None);
        assert_eq!(parse_votes("n/a"), None);
    }

    #[test]
    fn official_columns() {
        let h = header(&["County Name", "Office Name", "District", "Party Name", "Candidate Name", "Votes"]);
        let cols = OFFICIAL_SCHEMA.columns(&h, "x.csv").unwrap();
        let row = cols
            .row(&header(&["ADAMS", "Governor", "", "Republican", "MASTRIANO, DOUG", "1,000"]), 2, "x.csv")
            .unwrap();
        assert_eq!(row, RawVoteRow::new("ADAMS", "Governor", "Republican", "MASTRIANO, DOUG", 1000));
        assert_eq!(cols.row(&header(&["ADAMS", "Governor"]), 3, "x.csv"), None);
    }

    #[test]
    fn missing_columns() {
        let h = header(&["county", "office", "candidate"]);
        let err = OPENELECTIONS_SCHEMA.columns(&h, "x.csv");
        assert!(matches!(
            err.map_err(|e| *e),
            Err(ReturnsError::MissingColumn { .. })
        ));
        // The party is optional.
        let h = header(&["county", "office", "candidate", "votes"]);
        let cols = OPENELECTIONS_SCHEMA.columns(&h, "x.csv").unwrap();
        let row = cols.row(&header(&["Adams", "President", "Write-In", "3"]), 2, "x.csv");
        assert_eq!(row.map(|r| r.party), Some("".to_string()));
    }

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("/data/2020/results.csv"), "results.csv");
    }
}
