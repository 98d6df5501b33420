//! The canonical dataset: every stored result, by year, contest and county.
//!
//! The layout is the one of the JSON document written to disk:
//!
//! ```text
//! { "metadata": {...},
//!   "results_by_year": { "2020": { "president": { "president_2020":
//!       { "contest_name": "...", "results": { "Adams": {...} } } } } } }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::*;
use crate::normalize::{normalize_county_name, Normalizer};

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub years: Vec<i32>,
    pub contests: Vec<String>,
    pub counties_count: usize,
}

/// All the results of one contest instance (e.g. `president_2020`).
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ContestBlock {
    pub contest_name: String,
    pub results: BTreeMap<String, ElectionResult>,
}

// year -> category -> instance key -> block
pub type ResultsByYear = BTreeMap<i32, BTreeMap<String, BTreeMap<String, ContestBlock>>>;

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub metadata: Metadata,
    pub results_by_year: ResultsByYear,
}

/// What a merge did to the dataset.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum MergeOutcome {
    /// The contest was not present before.
    Inserted,
    /// The previous block of the contest was replaced.
    Replaced,
    /// Nothing to merge: the dataset was left untouched.
    Skipped,
}

impl Dataset {
    pub fn new(title: &str) -> Dataset {
        Dataset {
            metadata: Metadata {
                title: title.to_string(),
                years: Vec::new(),
                contests: Vec::new(),
                counties_count: 0,
            },
            results_by_year: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results_by_year.is_empty()
    }

    /// The block of a contest instance, if present.
    pub fn contest_block(&self, year: i32, category: &str) -> Option<&ContestBlock> {
        self.results_by_year
            .get(&year)
            .and_then(|cats| cats.get(category))
            .and_then(|instances| instances.get(&format!("{}_{}", category, year)))
    }

    /// All the stored blocks of a contest category, by increasing year.
    pub fn contest_blocks(&self, category: &str) -> Vec<(i32, &ContestBlock)> {
        let mut res: Vec<(i32, &ContestBlock)> = Vec::new();
        for (year, cats) in self.results_by_year.iter() {
            if let Some(instances) = cats.get(category) {
                for block in instances.values() {
                    res.push((*year, block));
                }
            }
        }
        res
    }

    /// Every stored record, in a stable order.
    pub fn records(&self) -> impl Iterator<Item = &ElectionResult> {
        self.results_by_year
            .values()
            .flat_map(|cats| cats.values())
            .flat_map(|instances| instances.values())
            .flat_map(|block| block.results.values())
    }

    /// The canonical names of the counties already stored.
    pub fn known_counties(&self) -> BTreeSet<String> {
        self.records().map(|r| r.county.clone()).collect()
    }

    /// Recomputes the list of years, the list of contests and the number of counties.
    pub fn refresh_metadata(&mut self) {
        let mut years: BTreeSet<i32> = BTreeSet::new();
        let mut contests: BTreeSet<String> = BTreeSet::new();
        for (year, cats) in self.results_by_year.iter() {
            for (category, instances) in cats.iter() {
                if instances.values().any(|b| !b.results.is_empty()) {
                    years.insert(*year);
                    contests.insert(category.clone());
                }
            }
        }
        self.metadata.years = years.into_iter().collect();
        self.metadata.contests = contests.into_iter().collect();
        self.metadata.counties_count = self.known_counties().len();
    }

    /// Stores the results of a contest, replacing whatever was stored for it.
    ///
    /// Arguments:
    /// * `contest` the contest of the records
    /// * `records` the results, one per county
    ///
    /// All the records must belong to the contest and the counties must be
    /// distinct. An empty batch leaves the dataset unchanged: a failed download
    /// never erases the stored data.
    pub fn merge_contest(
        &mut self,
        contest: &Contest,
        records: Vec<ElectionResult>,
    ) -> Result<MergeOutcome, ReturnsErrors> {
        let key = contest.instance_key();
        if records.is_empty() {
            warn!("merge_contest: no records for {}, dataset unchanged", key);
            return Ok(MergeOutcome::Skipped);
        }

        // uppercased -> stored spelling
        let known: HashMap<String, String> = self
            .known_counties()
            .into_iter()
            .map(|c| (c.to_uppercase(), c))
            .collect();
        let mut seen: HashSet<String> = HashSet::new();
        let mut results: BTreeMap<String, ElectionResult> = BTreeMap::new();
        for r in records {
            if r.year != contest.year || r.contest != contest.category {
                return Err(ReturnsErrors::MismatchedRecord {
                    county: r.county.clone(),
                    expected: key,
                    found: format!("{}_{}", r.contest, r.year),
                });
            }
            if r.county.trim().is_empty() {
                return Err(ReturnsErrors::EmptyCounty { contest: key });
            }
            let canonical = normalize_county_name(&r.county);
            if canonical != r.county {
                return Err(ReturnsErrors::NonCanonicalCounty {
                    county: r.county.clone(),
                    expected: canonical,
                    contest: key,
                });
            }
            if let Some(stored) = known.get(&r.county.to_uppercase()) {
                if *stored != r.county {
                    return Err(ReturnsErrors::NonCanonicalCounty {
                        county: r.county.clone(),
                        expected: stored.clone(),
                        contest: key,
                    });
                }
            }
            if !seen.insert(r.county.to_uppercase()) {
                return Err(ReturnsErrors::DuplicateCounty {
                    county: r.county.clone(),
                    contest: key,
                });
            }
            results.insert(r.county.clone(), r);
        }

        let num_counties = results.len();
        let block = ContestBlock {
            contest_name: contest.name.clone(),
            results,
        };
        let previous = self
            .results_by_year
            .entry(contest.year)
            .or_default()
            .entry(contest.category.clone())
            .or_default()
            .insert(key.clone(), block);
        self.refresh_metadata();

        let outcome = match previous {
            Some(_) => MergeOutcome::Replaced,
            None => MergeOutcome::Inserted,
        };
        info!(
            "merge_contest: {}: {} counties ({:?})",
            key, num_counties, outcome
        );
        Ok(outcome)
    }

    /// Passes the stored candidate names through the normalizer again.
    ///
    /// Returns the distinct renames `(old, new)` that were applied.
    pub fn renormalize_candidates(&mut self, normalizer: &Normalizer) -> Vec<(String, String)> {
        let mut renames: BTreeSet<(String, String)> = BTreeSet::new();
        for (year, cats) in self.results_by_year.iter_mut() {
            for (category, instances) in cats.iter_mut() {
                let contest = normalizer.contest(*year, category);
                // The stored category may be a code; the ticket flag comes from the display name.
                let running_mate = contest.running_mate
                    || instances
                        .values()
                        .any(|b| normalizer.contest(*year, &b.contest_name).running_mate);
                let contest = Contest {
                    running_mate,
                    ..contest
                };
                for block in instances.values_mut() {
                    for r in block.results.values_mut() {
                        for name in [&mut r.dem_candidate, &mut r.rep_candidate] {
                            let fixed = normalizer.candidate(name, &contest);
                            if fixed != *name {
                                debug!("renormalize_candidates: {:?} -> {:?}", name, fixed);
                                renames.insert((name.clone(), fixed.clone()));
                                *name = fixed;
                            }
                        }
                    }
                }
            }
        }
        info!("renormalize_candidates: {} renames", renames.len());
        renames.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate_contest;

    fn president_2020() -> (Normalizer, Contest, Vec<ElectionResult>) {
        let n = Normalizer::default();
        let c = n.contest(2020, "President");
        let rows = vec![
            RawVoteRow::new("Adams", "President", "DEM", "Joe Biden", 18207),
            RawVoteRow::new("Adams", "President", "REP", "Donald Trump", 37523),
            RawVoteRow::new("Allegheny", "President", "DEM", "Joe Biden", 430759),
            RawVoteRow::new("Allegheny", "President", "REP", "Donald Trump", 282913),
        ];
        let records = aggregate_contest(&rows, &c, &n);
        (n, c, records)
    }

    #[test]
    fn merge_into_empty() {
        let (_, c, records) = president_2020();
        let mut d = Dataset::new("Pennsylvania");
        let outcome = d.merge_contest(&c, records);
        assert_eq!(outcome, Ok(MergeOutcome::Inserted));
        assert_eq!(d.metadata.years, vec![2020]);
        assert_eq!(d.metadata.contests, vec!["president".to_string()]);
        assert_eq!(d.metadata.counties_count, 2);
        let block = d.contest_block(2020, "president").unwrap();
        assert_eq!(block.contest_name, "President of the United States");
        assert_eq!(block.results["Adams"].rep_votes, 37523);
    }

    #[test]
    fn merge_twice_is_unchanged() {
        let (_, c, records) = president_2020();
        let mut d = Dataset::new("Pennsylvania");
        d.merge_contest(&c, records.clone()).unwrap();
        let before = d.clone();
        assert_eq!(d.merge_contest(&c, records), Ok(MergeOutcome::Replaced));
        assert_eq!(d, before);
    }

    #[test]
    fn merge_empty_batch_keeps_block() {
        let (_, c, records) = president_2020();
        let mut d = Dataset::new("Pennsylvania");
        d.merge_contest(&c, records).unwrap();
        let before = d.clone();
        assert_eq!(d.merge_contest(&c, Vec::new()), Ok(MergeOutcome::Skipped));
        assert_eq!(d, before);
    }

    #[test]
    fn merge_replaces_whole_block() {
        let (_, c, mut records) = president_2020();
        let mut d = Dataset::new("Pennsylvania");
        d.merge_contest(&c, records.clone()).unwrap();
        records.truncate(1);
        d.merge_contest(&c, records).unwrap();
        let block = d.contest_block(2020, "president").unwrap();
        assert_eq!(block.results.len(), 1);
        assert_eq!(d.metadata.counties_count, 1);
    }

    #[test]
    fn merge_rejects_duplicates() {
        let (_, c, mut records) = president_2020();
        let dup = records[0].clone();
        records.push(dup);
        let mut d = Dataset::new("Pennsylvania");
        assert_eq!(
            d.merge_contest(&c, records),
            Err(ReturnsErrors::DuplicateCounty {
                county: "Adams".to_string(),
                contest: "president_2020".to_string()
            })
        );
        assert!(d.is_empty());
    }

    #[test]
    fn merge_rejects_other_spellings() {
        let (n, c, records) = president_2020();
        let mut d = Dataset::new("Pennsylvania");
        d.merge_contest(&c, records.clone()).unwrap();

        let senate = n.contest(2020, "U.S. Senate");
        let mut r = aggregate_contest(
            &[RawVoteRow::new("Adams", "U.S. Senate", "DEM", "Bob Casey", 10)],
            &senate,
            &n,
        );
        r[0].county = "ADAMS COUNTY".to_string();
        assert_eq!(
            d.merge_contest(&senate, r.clone()),
            Err(ReturnsErrors::NonCanonicalCounty {
                county: "ADAMS COUNTY".to_string(),
                expected: "Adams".to_string(),
                contest: "us_senate_2020".to_string()
            })
        );

        // Canonical on its own, but the dataset already stores another spelling.
        let mut stored = d.clone();
        let block = stored
            .results_by_year
            .get_mut(&2020)
            .and_then(|cats| cats.get_mut("president"))
            .and_then(|i| i.get_mut("president_2020"))
            .unwrap();
        let adams = block.results.remove("Adams").unwrap();
        block.results.insert(
            "ADAMS".to_string(),
            ElectionResult {
                county: "ADAMS".to_string(),
                ..adams
            },
        );
        stored.refresh_metadata();
        r[0].county = "Adams".to_string();
        assert!(matches!(
            stored.merge_contest(&senate, r.clone()),
            Err(ReturnsErrors::NonCanonicalCounty { .. })
        ));

        assert_eq!(d.merge_contest(&senate, r), Ok(MergeOutcome::Inserted));
        assert_eq!(d.metadata.counties_count, 2);
        assert_eq!(d.known_counties().len(), 2);
        assert!(d.known_counties().contains("Adams"));
        assert!(!d.known_counties().contains("ADAMS COUNTY"));
    }

    #[test]
    fn merge_rejects_other_contests() {
        let (n, _, records) = president_2020();
        let senate = n.contest(2020, "U.S. Senate");
        let mut d = Dataset::new("Pennsylvania");
        let err = d.merge_contest(&senate, records);
        assert!(matches!(err, Err(ReturnsErrors::MismatchedRecord { .. })));
    }

    #[test]
    fn metadata_is_sorted() {
        let n = Normalizer::default();
        let mut d = Dataset::new("Pennsylvania");
        for (year, office) in [(2020, "U.S. Senate"), (2016, "President"), (2020, "President")] {
            let c = n.contest(year, office);
            let rows = vec![RawVoteRow::new("Adams", office, "DEM", "X", 1)];
            d.merge_contest(&c, aggregate_contest(&rows, &c, &n)).unwrap();
        }
        assert_eq!(d.metadata.years, vec![2016, 2020]);
        assert_eq!(
            d.metadata.contests,
            vec!["president".to_string(), "us_senate".to_string()]
        );
        assert_eq!(d.contest_blocks("president").len(), 2);
        assert_eq!(d.contest_blocks("president")[0].0, 2016);
    }

    #[test]
    fn json_round_trip() {
        let n = Normalizer::default();
        let c = n.contest(2020, "President");
        // Vote counts with exact percentages.
        let rows = vec![
            RawVoteRow::new("Adams", "President", "DEM", "Joe Biden", 4000),
            RawVoteRow::new("Adams", "President", "REP", "Donald Trump", 6000),
            RawVoteRow::new("Allegheny", "President", "DEM", "Joe Biden", 7000),
            RawVoteRow::new("Allegheny", "President", "REP", "Donald Trump", 3000),
        ];
        let mut d = Dataset::new("Pennsylvania");
        d.merge_contest(&c, aggregate_contest(&rows, &c, &n)).unwrap();
        let s = serde_json::to_string_pretty(&d).unwrap();
        assert!(s.contains("\"president_2020\""));
        assert!(s.contains("\"winner\": \"REP\""));
        let back: Dataset = serde_json::from_str(&s).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn reads_string_years() {
        let (_, c, records) = president_2020();
        let mut d = Dataset::new("Pennsylvania");
        d.merge_contest(&c, records).unwrap();
        let s = serde_json::to_string(&d)
            .unwrap()
            .replace("\"year\":2020", "\"year\":\"2020\"");
        let back: Dataset = serde_json::from_str(&s).unwrap();
        assert_eq!(back.contest_block(2020, "president").unwrap().results["Adams"].year, 2020);
    }

    #[test]
    fn renormalize() {
        let (n, c, mut records) = president_2020();
        records[0].dem_candidate = "JOSEPH R BIDEN / KAMALA HARRIS".to_string();
        let mut d = Dataset::new("Pennsylvania");
        d.merge_contest(&c, records).unwrap();
        let renames = d.renormalize_candidates(&n);
        assert_eq!(
            renames,
            vec![(
                "JOSEPH R BIDEN / KAMALA HARRIS".to_string(),
                "Joseph R. Biden".to_string()
            )]
        );
        assert!(d.renormalize_candidates(&n).is_empty());
        assert_eq!(d.known_counties().len(), 2);
    }
}
