pub use crate::config::*;

use crate::normalize::Normalizer;

/// A builder for adding the rows of one contest, one at a time.
///
/// It is convenient for the readers that stream their input.
///
/// ```
/// pub use county_returns::builder::Builder;
/// # use county_returns::ReturnsErrors;
///
/// let mut builder = Builder::new(2022, "Governor")?;
///
/// builder.add_votes("Allegheny", "DEM", "Josh Shapiro / Austin Davis", 400)?;
/// builder.add_votes("Allegheny", "REP", "Doug Mastriano / Carrie DelRosso", 200)?;
/// builder.add_votes("Allegheny", "LIB", "Matt Hackenburg", 10)?;
///
/// let results = builder.build();
/// assert_eq!(results[0].dem_candidate, "Josh Shapiro");
/// assert_eq!(results[0].total_votes, 610);
///
/// # Ok::<(), ReturnsErrors>(())
/// ```
pub struct Builder {
    pub(crate) _normalizer: Normalizer,
    pub(crate) _contest: Contest,
    pub(crate) _rows: Vec<RawVoteRow>,
}

impl Builder {
    pub fn new(year: i32, office: &str) -> Result<Builder, ReturnsErrors> {
        Builder::with_normalizer(Normalizer::default(), year, office)
    }

    pub fn with_normalizer(
        normalizer: Normalizer,
        year: i32,
        office: &str,
    ) -> Result<Builder, ReturnsErrors> {
        let contest = normalizer.contest(year, office);
        Ok(Builder {
            _normalizer: normalizer,
            _contest: contest,
            _rows: Vec::new(),
        })
    }

    pub fn contest(&self) -> &Contest {
        &self._contest
    }

    /// Adds the votes of a candidate in a county.
    ///
    /// The names do not need to be normalized. A county that is blank after
    /// normalization is rejected.
    pub fn add_votes(
        &mut self,
        county: &str,
        party: &str,
        candidate: &str,
        votes: u64,
    ) -> Result<(), ReturnsErrors> {
        let row = RawVoteRow::new(county, &self._contest.name, party, candidate, votes);
        self.add_row(&row)
    }

    pub fn add_row(&mut self, row: &RawVoteRow) -> Result<(), ReturnsErrors> {
        if self._normalizer.county(&row.county).is_empty() {
            return Err(ReturnsErrors::EmptyCounty {
                contest: self._contest.instance_key(),
            });
        }
        self._rows.push(row.clone());
        Ok(())
    }

    /// The results for all the counties seen so far, sorted by county.
    pub fn build(&self) -> Vec<crate::ElectionResult> {
        crate::aggregate_contest(&self._rows, &self._contest, &self._normalizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_county() {
        let mut b = Builder::new(2020, "President").unwrap();
        assert!(b.add_votes(" county ", "DEM", "Joe Biden", 1).is_ok());
        let err = b.add_votes("  ", "DEM", "Joe Biden", 1);
        assert_eq!(
            err,
            Err(ReturnsErrors::EmptyCounty {
                contest: "president_2020".to_string()
            })
        );
    }

    #[test]
    fn builds_sorted_counties() {
        let mut b = Builder::new(2020, "President").unwrap();
        b.add_votes("York", "REP", "Donald Trump", 5).unwrap();
        b.add_votes("Adams", "DEM", "Joe Biden", 3).unwrap();
        let res = b.build();
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].county, "Adams");
        assert_eq!(res[1].rep_candidate, "Donald J. Trump");
        assert_eq!(b.contest().instance_key(), "president_2020");
    }
}
