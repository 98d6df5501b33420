//! Statistics derived from the canonical dataset.
//!
//! All the functions here are read-only views: they never modify the dataset.
//! The rendering of these views (text, HTML) is left to the callers.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::competitiveness::classify;
use crate::config::*;
use crate::dataset::Dataset;
use crate::two_party_margin;

/// The results of one county in one contest category, by increasing year.
#[derive(PartialEq, Debug, Clone)]
pub struct CountyTrend {
    pub county: String,
    pub contest: String,
    pub results: Vec<ElectionResult>,
}

impl CountyTrend {
    pub fn earliest(&self) -> Option<&ElectionResult> {
        self.results.first()
    }

    pub fn latest(&self) -> Option<&ElectionResult> {
        self.results.last()
    }
}

/// Groups the records of a contest category by county.
///
/// Records without any major-party vote carry no margin and are left out.
/// The trends are sorted by county name.
pub fn county_trends(dataset: &Dataset, contest: &str) -> Vec<CountyTrend> {
    let mut by_county: BTreeMap<String, Vec<ElectionResult>> = BTreeMap::new();
    for (_, block) in dataset.contest_blocks(contest) {
        for r in block.results.values() {
            if !r.has_two_party_vote() {
                debug!("county_trends: {} {} left out: no two-party vote", r.county, r.year);
                continue;
            }
            by_county.entry(r.county.clone()).or_default().push(r.clone());
        }
    }
    by_county
        .into_iter()
        .map(|(county, mut results)| {
            results.sort_by_key(|r| r.year);
            CountyTrend {
                county,
                contest: contest.to_string(),
                results,
            }
        })
        .collect()
}

/// The change of margin between the earliest and the latest result.
///
/// Positive values are a swing toward the Democrats. 0 with fewer than 2 results.
pub fn swing(trend: &CountyTrend) -> f64 {
    match (trend.earliest(), trend.latest()) {
        (Some(e), Some(l)) if trend.results.len() >= 2 => l.margin_pct - e.margin_pct,
        _ => 0.0,
    }
}

fn by_abs_desc(a: f64, b: f64) -> Ordering {
    b.abs().total_cmp(&a.abs())
}

#[derive(PartialEq, Debug, Clone)]
pub struct Flip {
    pub county: String,
    pub from: Winner,
    pub to: Winner,
    pub swing: f64,
    pub earliest_year: i32,
    pub latest_year: i32,
    pub earliest_margin: f64,
    pub latest_margin: f64,
}

/// The counties whose latest winner differs from their earliest winner.
///
/// Sorted by the size of the swing, largest first.
pub fn flipped_counties(trends: &[CountyTrend]) -> Vec<Flip> {
    let mut res: Vec<Flip> = Vec::new();
    for t in trends.iter() {
        if let (Some(e), Some(l)) = (t.earliest(), t.latest()) {
            if t.results.len() >= 2 && e.winner != l.winner {
                res.push(Flip {
                    county: t.county.clone(),
                    from: e.winner,
                    to: l.winner,
                    swing: swing(t),
                    earliest_year: e.year,
                    latest_year: l.year,
                    earliest_margin: e.margin_pct,
                    latest_margin: l.margin_pct,
                });
            }
        }
    }
    res.sort_by(|a, b| by_abs_desc(a.swing, b.swing).then_with(|| a.county.cmp(&b.county)));
    res
}

#[derive(PartialEq, Debug, Clone)]
pub struct Swing {
    pub county: String,
    pub swing: f64,
    pub earliest: ElectionResult,
    pub latest: ElectionResult,
}

/// The `n` counties with the largest swings, in either direction.
pub fn biggest_swings(trends: &[CountyTrend], n: usize) -> Vec<Swing> {
    let mut res: Vec<Swing> = Vec::new();
    for t in trends.iter() {
        if let (Some(e), Some(l)) = (t.earliest(), t.latest()) {
            if t.results.len() >= 2 {
                res.push(Swing {
                    county: t.county.clone(),
                    swing: swing(t),
                    earliest: e.clone(),
                    latest: l.clone(),
                });
            }
        }
    }
    res.sort_by(|a, b| by_abs_desc(a.swing, b.swing).then_with(|| a.county.cmp(&b.county)));
    res.truncate(n);
    res
}

/// The totals of a contest over all the counties.
#[derive(PartialEq, Debug, Clone)]
pub struct StatewideResult {
    pub year: i32,
    pub contest_name: String,
    pub dem_candidate: String,
    pub rep_candidate: String,
    pub dem_votes: u64,
    pub rep_votes: u64,
    pub other_votes: u64,
    pub total_votes: u64,
    pub margin: i64,
    pub margin_pct: f64,
    /// Share of the total vote.
    pub dem_pct: f64,
    pub rep_pct: f64,
    pub winner: Winner,
    pub competitiveness: Competitiveness,
}

// The name listed in most counties. Ties go to the first name in alphabetical order.
fn most_common(names: &[&str]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for n in names.iter().filter(|n| !n.is_empty()) {
        *counts.entry(*n).or_insert(0) += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for (name, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((name, count));
        }
    }
    best.map(|(n, _)| n.to_string()).unwrap_or_default()
}

/// The statewide totals of each instance of a contest category, by increasing year.
///
/// The margin is computed from the summed votes: the county margins are never averaged.
pub fn statewide_results(dataset: &Dataset, contest: &str) -> Vec<StatewideResult> {
    let mut res: Vec<StatewideResult> = Vec::new();
    for (year, block) in dataset.contest_blocks(contest) {
        let mut dem_votes: u64 = 0;
        let mut rep_votes: u64 = 0;
        let mut other_votes: u64 = 0;
        for r in block.results.values() {
            dem_votes += r.dem_votes;
            rep_votes += r.rep_votes;
            other_votes += r.other_votes;
        }
        let dem_names: Vec<&str> = block
            .results
            .values()
            .map(|r| r.dem_candidate.as_str())
            .collect();
        let rep_names: Vec<&str> = block
            .results
            .values()
            .map(|r| r.rep_candidate.as_str())
            .collect();
        let total_votes = dem_votes + rep_votes + other_votes;
        let m = two_party_margin(dem_votes, rep_votes);
        let pct = |v: u64| {
            if total_votes == 0 {
                0.0
            } else {
                (v as f64) * 100.0 / (total_votes as f64)
            }
        };
        res.push(StatewideResult {
            year,
            contest_name: block.contest_name.clone(),
            dem_candidate: most_common(&dem_names),
            rep_candidate: most_common(&rep_names),
            dem_votes,
            rep_votes,
            other_votes,
            total_votes,
            margin: m.margin,
            margin_pct: m.margin_pct,
            dem_pct: pct(dem_votes),
            rep_pct: pct(rep_votes),
            winner: Winner::from_votes(dem_votes, rep_votes),
            competitiveness: classify(m.margin_pct),
        });
    }
    res
}

#[derive(PartialEq, Debug, Clone)]
pub struct Bellwether {
    pub county: String,
    /// Between 0 and 1.
    pub accuracy: f64,
    pub matches: usize,
    pub elections: usize,
}

/// How often each county voted like the state.
///
/// Only the years with a statewide result count. Sorted by accuracy, then by name.
pub fn bellwethers(trends: &[CountyTrend], statewide: &[StatewideResult]) -> Vec<Bellwether> {
    let winners: HashMap<i32, Winner> = statewide.iter().map(|s| (s.year, s.winner)).collect();
    let mut res: Vec<Bellwether> = Vec::new();
    for t in trends.iter() {
        let mut matches = 0;
        let mut elections = 0;
        for r in t.results.iter() {
            if let Some(w) = winners.get(&r.year) {
                elections += 1;
                if *w == r.winner {
                    matches += 1;
                }
            }
        }
        if elections > 0 {
            res.push(Bellwether {
                county: t.county.clone(),
                accuracy: matches as f64 / elections as f64,
                matches,
                elections,
            });
        }
    }
    res.sort_by(|a, b| {
        b.accuracy
            .total_cmp(&a.accuracy)
            .then_with(|| a.county.cmp(&b.county))
    });
    res
}

/// The orderings of the latest results.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum StandingOrder {
    StrongestDemocratic,
    StrongestRepublican,
    MostCompetitive,
    Largest,
}

/// The latest result of each county, ordered.
pub fn latest_standings(trends: &[CountyTrend], order: StandingOrder) -> Vec<ElectionResult> {
    let mut res: Vec<ElectionResult> = trends.iter().filter_map(|t| t.latest().cloned()).collect();
    res.sort_by(|a, b| {
        let o = match order {
            StandingOrder::StrongestDemocratic => b.margin_pct.total_cmp(&a.margin_pct),
            StandingOrder::StrongestRepublican => a.margin_pct.total_cmp(&b.margin_pct),
            StandingOrder::MostCompetitive => a.margin_pct.abs().total_cmp(&b.margin_pct.abs()),
            StandingOrder::Largest => b.total_votes.cmp(&a.total_votes),
        };
        o.then_with(|| a.county.cmp(&b.county))
    });
    res
}

#[derive(PartialEq, Debug, Clone)]
pub struct YearOverYear {
    pub from_year: i32,
    pub to_year: i32,
    pub from_winner: Winner,
    pub to_winner: Winner,
    pub from_margin: f64,
    pub to_margin: f64,
    pub swing: f64,
}

/// The shifts of the statewide margin between consecutive elections.
pub fn year_over_year(statewide: &[StatewideResult]) -> Vec<YearOverYear> {
    statewide
        .windows(2)
        .map(|w| YearOverYear {
            from_year: w[0].year,
            to_year: w[1].year,
            from_winner: w[0].winner,
            to_winner: w[1].winner,
            from_margin: w[0].margin_pct,
            to_margin: w[1].margin_pct,
            swing: w[1].margin_pct - w[0].margin_pct,
        })
        .collect()
}

#[derive(PartialEq, Debug, Clone)]
pub struct CohortCycle {
    pub year: i32,
    pub dem_count: usize,
    pub rep_count: usize,
    pub average_margin: f64,
}

/// How a named group of counties voted over time.
#[derive(PartialEq, Debug, Clone)]
pub struct CohortSummary {
    pub name: String,
    /// The counties of the group without any stored result.
    pub missing: Vec<String>,
    /// (county, swing), most Republican swing first.
    pub swings: Vec<(String, f64)>,
    /// 0 when no county of the group has 2 results.
    pub average_swing: f64,
    pub flipped: Vec<String>,
    pub cycles: Vec<CohortCycle>,
}

pub fn cohort_summary(trends: &[CountyTrend], name: &str, counties: &[String]) -> CohortSummary {
    let by_name: HashMap<&str, &CountyTrend> =
        trends.iter().map(|t| (t.county.as_str(), t)).collect();
    let mut missing: Vec<String> = Vec::new();
    let mut swings: Vec<(String, f64)> = Vec::new();
    let mut flipped: Vec<String> = Vec::new();
    // year -> (dem, rep, margins)
    let mut cycles: BTreeMap<i32, (usize, usize, Vec<f64>)> = BTreeMap::new();

    for county in counties.iter() {
        let t = match by_name.get(county.as_str()) {
            Some(t) => t,
            None => {
                missing.push(county.clone());
                continue;
            }
        };
        if t.results.len() >= 2 {
            swings.push((t.county.clone(), swing(t)));
            if let (Some(e), Some(l)) = (t.earliest(), t.latest()) {
                if e.winner != l.winner {
                    flipped.push(t.county.clone());
                }
            }
        }
        for r in t.results.iter() {
            let cycle = cycles.entry(r.year).or_insert((0, 0, Vec::new()));
            match r.winner {
                Winner::Dem => cycle.0 += 1,
                Winner::Rep => cycle.1 += 1,
                Winner::Tie => {}
            }
            cycle.2.push(r.margin_pct);
        }
    }

    let average_swing = if swings.is_empty() {
        0.0
    } else {
        swings.iter().map(|(_, s)| s).sum::<f64>() / swings.len() as f64
    };
    swings.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    flipped.sort();

    CohortSummary {
        name: name.to_string(),
        missing,
        swings,
        average_swing,
        flipped,
        cycles: cycles
            .into_iter()
            .map(|(year, (dem_count, rep_count, margins))| CohortCycle {
                year,
                dem_count,
                rep_count,
                average_margin: margins.iter().sum::<f64>() / margins.len() as f64,
            })
            .collect(),
    }
}
