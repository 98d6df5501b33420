// Primitives for reading CSV files.

use crate::returns::io_common::{simplify_file_name, Schema};
use crate::returns::*;

/// Reads all the vote rows of a CSV file with a header.
///
/// The lines that cannot be read are skipped with a warning: one bad line does
/// not invalidate a whole county export.
pub fn read_csv_rows(path: &str, schema: &Schema) -> BReturnsResult<Vec<RawVoteRow>> {
    let file_name = simplify_file_name(path);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let header: Vec<String> = rdr
        .headers()
        .context(CsvHeaderSnafu { path })?
        .iter()
        .map(|s| s.trim_start_matches('\u{feff}').to_string())
        .collect();
    let columns = schema.columns(&header, path)?;

    let mut res: Vec<RawVoteRow> = Vec::new();
    let mut skipped = 0;
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = match line_r {
            Ok(l) => l,
            Err(e) => {
                warn!("{}:{}: cannot parse the line: {}", file_name, lineno, e);
                skipped += 1;
                continue;
            }
        };
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        match columns.row(&cells, lineno, &file_name) {
            Some(row) => res.push(row),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("read_csv_rows: {}: {} lines skipped", file_name, skipped);
    }
    debug!("read_csv_rows: {}: {} rows", file_name, res.len());
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::io_common::{OFFICIAL_SCHEMA, OPENELECTIONS_SCHEMA};
    use std::env;
    use std::fs;

    fn fixture(name: &str, content: &str) -> String {
        let p = env::temp_dir().join(format!("countyret-{}-{}", std::process::id(), name));
        fs::write(&p, content).unwrap();
        p.display().to_string()
    }

    #[test]
    fn openelections_precincts() {
        let p = fixture(
            "oe.csv",
            "county,precinct,office,district,party,candidate,votes\n\
             Adams,P1,U.S. Senate,,DEM,Bob Casey,10\n\
             Adams,P2,U.S. Senate,,DEM,Bob Casey,\n\
             Adams,P2,U.S. Senate,,REP,Lou Barletta,12\n\
             Adams,P3\n",
        );
        let rows = read_csv_rows(&p, &OPENELECTIONS_SCHEMA).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], RawVoteRow::new("Adams", "U.S. Senate", "REP", "Lou Barletta", 12));
    }

    #[test]
    fn official_export() {
        let p = fixture(
            "official.csv",
            "\u{feff}County Name,Office Name,Party Name,Candidate Name,Votes\n\
             ALLEGHENY,Attorney General,Democratic,\"DePASQUALE, EUGENE\",\"412,003\"\n",
        );
        let rows = read_csv_rows(&p, &OFFICIAL_SCHEMA).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].votes, 412003);
        assert_eq!(rows[0].party, "Democratic");
    }

    #[test]
    fn wrong_schema() {
        let p = fixture("wrong.csv", "a,b,c\n1,2,3\n");
        assert!(read_csv_rows(&p, &OFFICIAL_SCHEMA).is_err());
        assert!(read_csv_rows("/does/not/exist.csv", &OFFICIAL_SCHEMA).is_err());
    }
}
