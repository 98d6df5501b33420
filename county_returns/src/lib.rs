/*!

Data model and aggregation of county-level election returns.

The crate turns the rows of vote counts published by the election offices (one
row per county or precinct, per office, per party or candidate) into one
[`ElectionResult`] per county and per contest, classifies the competitiveness of
each result, stores the results in a canonical [`dataset::Dataset`] and derives
the usual statistics from it (swings, flipped counties, bellwethers).

```
use county_returns::*;

let normalizer = Normalizer::default();
let contest = normalizer.contest(2020, "President");
let rows = vec![
    RawVoteRow::new("ADAMS", "President", "DEM", "JOSEPH R BIDEN", 18207),
    RawVoteRow::new("ADAMS", "President", "REP", "DONALD J TRUMP", 37523),
    RawVoteRow::new("ADAMS", "President", "LIB", "JO JORGENSEN", 651),
];
let results = aggregate_contest(&rows, &contest, &normalizer);
assert_eq!(results[0].county, "Adams");
assert_eq!(results[0].winner, Winner::Rep);
assert_eq!(results[0].rep_candidate, "Donald J. Trump");
```

The long-form documentation is in the [`manual`] module.
*/

mod competitiveness;
mod config;
pub mod builder;
pub mod dataset;
pub mod manual;
pub mod normalize;
pub mod report;

use log::{debug, info, warn};

use std::collections::{BTreeMap, HashMap};

pub use crate::competitiveness::classify;
pub use crate::config::*;
pub use crate::normalize::{
    normalize_candidate_name, normalize_county_name, normalize_office, normalize_party_code,
    Normalizer,
};

/// The two-party margin of a result.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Margin {
    pub margin: i64,
    /// 0 when `two_party_total` is 0.
    pub margin_pct: f64,
    pub two_party_total: u64,
}

/// Computes the Democratic margin, in votes and in percent of the two-party vote.
///
/// The other parties never enter the denominator.
pub fn two_party_margin(dem_votes: u64, rep_votes: u64) -> Margin {
    let two_party_total = dem_votes + rep_votes;
    let margin = dem_votes as i64 - rep_votes as i64;
    if two_party_total == 0 {
        // No major-party vote: the percentage is undefined and reported as 0.
        return Margin {
            margin: 0,
            margin_pct: 0.0,
            two_party_total,
        };
    }
    Margin {
        margin,
        margin_pct: (margin as f64) * 100.0 / (two_party_total as f64),
        two_party_total,
    }
}

fn share_pct(votes: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (votes as f64) * 100.0 / (total as f64)
    }
}

impl ElectionResult {
    /// Builds the final record of a county from its accumulated votes.
    pub fn from_tally(contest: &Contest, county: &str, tally: VoteTally) -> ElectionResult {
        let total_votes = tally.dem_votes + tally.rep_votes + tally.other_votes;
        let m = two_party_margin(tally.dem_votes, tally.rep_votes);
        if m.two_party_total == 0 {
            warn!(
                "from_tally: {} {}: no vote for either major party",
                contest.instance_key(),
                county
            );
        }
        ElectionResult {
            county: county.to_string(),
            contest: contest.category.clone(),
            year: contest.year,
            dem_candidate: tally.dem_candidate,
            rep_candidate: tally.rep_candidate,
            dem_votes: tally.dem_votes,
            rep_votes: tally.rep_votes,
            other_votes: tally.other_votes,
            total_votes,
            two_party_total: m.two_party_total,
            margin: m.margin,
            margin_pct: m.margin_pct,
            dem_pct: share_pct(tally.dem_votes, total_votes),
            rep_pct: share_pct(tally.rep_votes, total_votes),
            winner: Winner::from_votes(tally.dem_votes, tally.rep_votes),
            competitiveness: classify(m.margin_pct),
            all_parties: tally.all_parties,
        }
    }
}

/// Splits the rows of a source file by contest, in order of first appearance.
///
/// Arguments:
/// * `rows` all the rows of a file, for all the offices
/// * `year` the year of the election
/// * `offices` if provided, only the contests of these offices are kept. The
/// offices are compared after normalization ("President" matches
/// "President of the United States").
pub fn partition_by_contest(
    rows: &[RawVoteRow],
    year: i32,
    normalizer: &Normalizer,
    offices: Option<&[String]>,
) -> Vec<(Contest, Vec<RawVoteRow>)> {
    let wanted: Option<Vec<String>> = offices.map(|os| {
        os.iter()
            .map(|o| normalizer.contest(year, o).category)
            .collect()
    });
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut res: Vec<(Contest, Vec<RawVoteRow>)> = Vec::new();
    for row in rows.iter() {
        let contest = normalizer.contest(year, &row.office);
        if let Some(w) = &wanted {
            if !w.contains(&contest.category) {
                continue;
            }
        }
        match positions.get(&contest.category) {
            Some(idx) => res[*idx].1.push(row.clone()),
            None => {
                positions.insert(contest.category.clone(), res.len());
                res.push((contest, vec![row.clone()]));
            }
        }
    }
    debug!(
        "partition_by_contest: {} rows -> {:?}",
        rows.len(),
        res.iter()
            .map(|(c, rs)| (c.instance_key(), rs.len()))
            .collect::<Vec<(String, usize)>>()
    );
    res
}

/// Aggregates the rows of one contest into one result per county.
///
/// Arguments:
/// * `rows` the rows of the contest, in the order of the source. Rows of another
/// office are ignored.
/// * `contest` the contest being aggregated
/// * `normalizer` the lookup tables used to clean up the names
///
/// Votes are summed per county and per party. Rows repeated for the same county,
/// party or candidate (precincts, write-ins, cross-filings) add up. The last
/// non-empty candidate name of a major party becomes the nominee of the county,
/// unless a canonical nominee is configured for the contest.
pub fn aggregate_contest(
    rows: &[RawVoteRow],
    contest: &Contest,
    normalizer: &Normalizer,
) -> Vec<ElectionResult> {
    info!(
        "aggregate_contest: processing {:?} rows for {}",
        rows.len(),
        contest.instance_key()
    );

    // Some rows carry a candidate but no party: recover the party from the other rows.
    let mut candidate_parties: HashMap<String, String> = HashMap::new();
    for row in rows.iter() {
        let party = normalizer.party(&row.party);
        let key = normalizer.candidate(&row.candidate, contest).to_lowercase();
        if !party.is_empty() && !key.is_empty() {
            candidate_parties.entry(key).or_insert(party);
        }
    }

    let dem_nominee = normalizer.nominee(contest, DEM);
    let rep_nominee = normalizer.nominee(contest, REP);

    let mut tallies: BTreeMap<String, VoteTally> = BTreeMap::new();
    for row in rows.iter() {
        if !row.office.trim().is_empty()
            && normalizer.contest(contest.year, &row.office).category != contest.category
        {
            debug!("aggregate_contest: skipping row of another office: {:?}", row);
            continue;
        }
        let county = normalizer.county(&row.county);
        if county.is_empty() {
            warn!("aggregate_contest: skipping row without county: {:?}", row);
            continue;
        }
        let candidate = normalizer.candidate(&row.candidate, contest);
        let mut party = normalizer.party(&row.party);
        if party.is_empty() {
            if let Some(p) = candidate_parties.get(&candidate.to_lowercase()) {
                debug!("aggregate_contest: party of {:?} set to {}", candidate, p);
                party = p.clone();
            }
        }

        let tally = tallies.entry(county).or_default();
        let party_key = if party.is_empty() {
            OTHER.to_string()
        } else {
            party.clone()
        };
        *tally.all_parties.entry(party_key).or_insert(0) += row.votes;

        match party.as_str() {
            DEM => {
                tally.dem_votes += row.votes;
                match dem_nominee {
                    Some(n) => tally.dem_candidate = n.to_string(),
                    None if !candidate.is_empty() => tally.dem_candidate = candidate,
                    None => {}
                }
            }
            REP => {
                tally.rep_votes += row.votes;
                match rep_nominee {
                    Some(n) => tally.rep_candidate = n.to_string(),
                    None if !candidate.is_empty() => tally.rep_candidate = candidate,
                    None => {}
                }
            }
            _ => {
                tally.other_votes += row.votes;
            }
        }
    }

    let res: Vec<ElectionResult> = tallies
        .into_iter()
        .map(|(county, tally)| ElectionResult::from_tally(contest, &county, tally))
        .collect();
    info!(
        "aggregate_contest: {}: {} counties",
        contest.instance_key(),
        res.len()
    );
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn senate_2018() -> (Normalizer, Contest) {
        let n = Normalizer::default();
        let c = n.contest(2018, "United States Senator");
        (n, c)
    }

    #[test]
    fn margin_uses_two_party_total() {
        let m = two_party_margin(6000, 4000);
        assert_eq!(m.margin, 2000);
        assert_eq!(m.margin_pct, 20.0);
        assert_eq!(m.two_party_total, 10000);
        let z = two_party_margin(0, 0);
        assert_eq!(z.margin_pct, 0.0);
        assert_eq!(z.two_party_total, 0);
    }

    #[test]
    fn aggregate_sums_rows() {
        init();
        let (n, c) = senate_2018();
        let rows = vec![
            RawVoteRow::new("Adams", "U.S. Senate", "DEM", "Bob Casey", 100),
            RawVoteRow::new("Adams", "U.S. Senate", "DEM", "Bob Casey", 50),
            RawVoteRow::new("ADAMS COUNTY", "U.S. Senate", "REP", "LOU BARLETTA", 300),
            RawVoteRow::new("Adams", "U.S. Senate", "GRN", "Neal Gale", 7),
            RawVoteRow::new("Adams", "U.S. Senate", "LIB", "Dale Kerns", 3),
            RawVoteRow::new("Adams", "U.S. Senate", "LIB", "Dale Kerns", 2),
        ];
        let res = aggregate_contest(&rows, &c, &n);
        assert_eq!(res.len(), 1);
        let r = &res[0];
        assert_eq!(r.county, "Adams");
        assert_eq!(r.contest, "us_senate");
        assert_eq!(r.year, 2018);
        assert_eq!(r.dem_votes, 150);
        assert_eq!(r.rep_votes, 300);
        assert_eq!(r.other_votes, 12);
        assert_eq!(r.total_votes, 462);
        assert_eq!(r.total_votes, r.dem_votes + r.rep_votes + r.other_votes);
        assert_eq!(r.margin, -150);
        assert_eq!(r.winner, Winner::Rep);
        assert_eq!(r.rep_candidate, "Lou Barletta");
        assert_eq!(r.all_parties.get("LIB"), Some(&5));
        assert_eq!(r.all_parties.get("GRN"), Some(&7));
        assert_eq!(r.all_parties.get("DEM"), Some(&150));
    }

    #[test]
    fn aggregate_is_deterministic() {
        let (n, c) = senate_2018();
        let rows = vec![
            RawVoteRow::new("Bedford", "U.S. Senate", "REP", "Lou Barletta", 15000),
            RawVoteRow::new("Allegheny", "U.S. Senate", "DEM", "Bob Casey", 400000),
            RawVoteRow::new("Bedford", "U.S. Senate", "DEM", "Bob Casey", 4000),
            RawVoteRow::new("Allegheny", "U.S. Senate", "REP", "Lou Barletta", 200000),
        ];
        let first = aggregate_contest(&rows, &c, &n);
        let second = aggregate_contest(&rows, &c, &n);
        assert_eq!(first, second);
        assert_eq!(first[0].county, "Allegheny");
        assert_eq!(first[1].county, "Bedford");
    }

    #[test]
    fn aggregate_infers_missing_party() {
        let (n, c) = senate_2018();
        let rows = vec![
            RawVoteRow::new("Blair", "U.S. Senate", "DEM", "Bob Casey", 10),
            RawVoteRow::new("Blair", "U.S. Senate", "", "BOB CASEY", 5),
            RawVoteRow::new("Blair", "U.S. Senate", "", "Write-In", 2),
        ];
        let res = aggregate_contest(&rows, &c, &n);
        assert_eq!(res[0].dem_votes, 15);
        assert_eq!(res[0].other_votes, 2);
        assert_eq!(res[0].all_parties.get(OTHER), Some(&2));
    }

    #[test]
    fn aggregate_skips_blank_counties_and_other_offices() {
        let (n, c) = senate_2018();
        let rows = vec![
            RawVoteRow::new("  ", "U.S. Senate", "DEM", "Bob Casey", 10),
            RawVoteRow::new("Berks", "Governor", "DEM", "Tom Wolf", 99),
            RawVoteRow::new("Berks", "U.S. Senate", "DEM", "Bob Casey", 1),
        ];
        let res = aggregate_contest(&rows, &c, &n);
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].dem_votes, 1);
    }

    #[test]
    fn aggregate_without_major_parties() {
        let (n, c) = senate_2018();
        let rows = vec![RawVoteRow::new("Cameron", "U.S. Senate", "LIB", "Dale Kerns", 4)];
        let res = aggregate_contest(&rows, &c, &n);
        let r = &res[0];
        assert!(!r.has_two_party_vote());
        assert_eq!(r.margin_pct, 0.0);
        assert_eq!(r.winner, Winner::Tie);
        assert_eq!(r.competitiveness.code, "TOSSUP");
        assert_eq!(r.total_votes, 4);
    }

    #[test]
    fn aggregate_uses_configured_nominees() {
        let n = Normalizer::default();
        let c = n.contest(2016, "President");
        let rows = vec![
            RawVoteRow::new("Centre", "President", "DEM", "HILLARY RODHAM CLINTON", 10),
            RawVoteRow::new("Centre", "President", "REP", "TRUMP, DONALD J.", 9),
        ];
        let res = aggregate_contest(&rows, &c, &n);
        assert_eq!(res[0].dem_candidate, "Hillary Clinton");
        assert_eq!(res[0].rep_candidate, "Donald J. Trump");
    }

    #[test]
    fn partition() {
        let n = Normalizer::default();
        let rows = vec![
            RawVoteRow::new("Adams", "President", "DEM", "A", 1),
            RawVoteRow::new("Adams", "Attorney General", "DEM", "B", 1),
            RawVoteRow::new("Adams", "President of the United States", "REP", "C", 1),
            RawVoteRow::new("Adams", "State House", "REP", "D", 1),
        ];
        let all = partition_by_contest(&rows, 2020, &n, None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].0.category, "president");
        assert_eq!(all[0].1.len(), 2);
        let wanted = vec!["President of the United States".to_string()];
        let some = partition_by_contest(&rows, 2020, &n, Some(&wanted));
        assert_eq!(some.len(), 1);
        assert_eq!(some[0].0.instance_key(), "president_2020");
    }
}
