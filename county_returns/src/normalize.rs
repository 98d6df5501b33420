//! Canonical spellings for the names found in the sources.
//!
//! The same county, candidate or party is spelled in many ways across the years and
//! across the providers ("MCKEAN", "McKean County", "Mckean"). Everything stored in the
//! dataset goes through the functions of this module first.

use std::collections::HashMap;

use log::debug;

use crate::config::*;

const SUFFIX: &str = " county";

/// Canonical name of a county: no " County" suffix, title case, `Mc` prefixes fixed.
///
/// Blank inputs give an empty string.
pub fn normalize_county_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let cut = trimmed.len().saturating_sub(SUFFIX.len());
    let without_suffix = if trimmed.len() > SUFFIX.len()
        && trimmed.is_char_boundary(cut)
        && trimmed[cut..].eq_ignore_ascii_case(SUFFIX)
    {
        &trimmed[..cut]
    } else {
        trimmed
    };
    let collapsed = without_suffix.split_whitespace().collect::<Vec<&str>>().join(" ");
    if collapsed.is_empty() {
        return String::new();
    }
    fix_prefix_capitals(&title_case(&collapsed))
}

/// Canonical name of a candidate for the given office.
///
/// For the offices elected on a ticket (President, Governor), only the first name of
/// the ticket is kept.
/// The surnames with an inner capital (`DePasquale`) come from the default tables.
pub fn normalize_candidate_name(raw: &str, office: &str) -> String {
    let tables = NormalizationTables::default();
    normalize_candidate(raw, is_ticket_office(office), &tables.surnames)
}

/// Short uppercase code of a party. Unknown parties are kept, uppercased.
pub fn normalize_party_code(raw: &str, tables: &NormalizationTables) -> String {
    let p = raw.trim();
    if p.is_empty() {
        return String::new();
    }
    match tables.party_codes.get(&p.to_lowercase()) {
        Some(code) => code.clone(),
        None => p.to_uppercase(),
    }
}

/// Finds the contest category of an office label.
///
/// Unknown labels become a lowercase code with underscores (`Lieutenant Governor` ->
/// `lieutenant_governor`).
pub fn normalize_office(raw: &str, tables: &NormalizationTables) -> OfficeMapping {
    let label = raw.split_whitespace().collect::<Vec<&str>>().join(" ");
    if let Some(m) = tables
        .offices
        .iter()
        .find(|m| m.label.eq_ignore_ascii_case(&label))
    {
        return m.clone();
    }
    let category: String = label
        .to_lowercase()
        .replace('.', "")
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join("_");
    OfficeMapping {
        category,
        display_name: label.clone(),
        running_mate: is_ticket_office(&label),
        label,
    }
}

fn is_ticket_office(office: &str) -> bool {
    let o = office.trim().to_lowercase();
    o == "president"
        || o.starts_with("president of")
        || o == "governor"
        || o.starts_with("governor of")
}

fn normalize_candidate(raw: &str, running_mate: bool, surnames: &[String]) -> String {
    let name = raw.trim();
    if name.is_empty() {
        return String::new();
    }
    let name = if running_mate {
        first_on_ticket(name)
    } else {
        name.to_string()
    };

    let mut tokens: Vec<String> = name.split_whitespace().map(title_case).collect();
    let num_tokens = tokens.len();
    // "Casey, Jr" -> "Casey Jr."
    if num_tokens >= 2 && suffix_form(&tokens[num_tokens - 1]).is_some() {
        let prev = tokens[num_tokens - 2].trim_end_matches(',').to_string();
        tokens[num_tokens - 2] = prev;
    }

    let mut parts: Vec<String> = Vec::with_capacity(num_tokens);
    for (idx, token) in tokens.iter().enumerate() {
        if idx > 0 && idx == num_tokens - 1 {
            if let Some(s) = suffix_form(token) {
                parts.push(s.to_string());
                continue;
            }
        }
        let clean = token.trim_end_matches('.');
        if clean.chars().count() == 1 && clean.chars().all(char::is_alphabetic) {
            parts.push(format!("{}.", clean.to_uppercase()));
            continue;
        }
        let fixed = fix_prefix_capitals(token);
        // "Depasquale," in the "LAST, FIRST" layout keeps its comma.
        let core = fixed.trim_end_matches(|c: char| c == ',' || c == '.');
        let punct = &fixed[core.len()..];
        match surnames.iter().find(|s| s.eq_ignore_ascii_case(core)) {
            Some(s) => parts.push(format!("{}{}", s, punct)),
            None => parts.push(fixed.clone()),
        }
    }
    parts.join(" ")
}

// Keeps the part of the ticket before '/', '&' or a standalone 'and'.
fn first_on_ticket(name: &str) -> String {
    let head = match name.find(|c: char| c == '/' || c == '&') {
        Some(idx) => &name[..idx],
        None => name,
    };
    let mut kept: Vec<&str> = Vec::new();
    for word in head.split_whitespace() {
        if word.eq_ignore_ascii_case("and") {
            break;
        }
        kept.push(word);
    }
    kept.join(" ")
}

fn suffix_form(token: &str) -> Option<&'static str> {
    match token.trim_end_matches(|c: char| c == '.' || c == ',').to_lowercase().as_str() {
        "jr" => Some("Jr."),
        "sr" => Some("Sr."),
        "ii" => Some("II"),
        "iii" => Some("III"),
        "iv" => Some("IV"),
        "v" => Some("V"),
        "esq" => Some("Esq."),
        _ => None,
    }
}

// Uppercase at the start of every run of letters, lowercase elsewhere.
fn title_case(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                res.extend(c.to_lowercase());
            } else {
                res.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            res.push(c);
            in_word = false;
        }
    }
    res
}

// "Mccormick" -> "McCormick"
fn fix_prefix_capitals(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut res = String::with_capacity(name.len());
    for (idx, c) in chars.iter().enumerate() {
        let after_mc = idx >= 2
            && chars[idx - 2] == 'M'
            && chars[idx - 1] == 'c'
            && (idx == 2 || !chars[idx - 3].is_alphabetic());
        if after_mc && c.is_lowercase() {
            res.extend(c.to_uppercase());
        } else {
            res.push(*c);
        }
    }
    res
}

/// Applies the lookup tables to the raw strings of the sources.
#[derive(Debug, Clone)]
pub struct Normalizer {
    tables: NormalizationTables,
    // uppercased canonical name -> canonical name
    known_counties: HashMap<String, String>,
}

impl Normalizer {
    pub fn new(tables: NormalizationTables) -> Normalizer {
        Normalizer {
            tables,
            known_counties: HashMap::new(),
        }
    }

    /// Prefers the spelling of counties that are already stored when a name only
    /// differs by its case.
    pub fn with_known_counties<'a, I>(mut self, counties: I) -> Normalizer
    where
        I: IntoIterator<Item = &'a String>,
    {
        for c in counties {
            let key = normalize_county_name(c).to_uppercase();
            if !key.is_empty() {
                self.known_counties.insert(key, c.clone());
            }
        }
        debug!("Normalizer: {} known counties", self.known_counties.len());
        self
    }

    pub fn tables(&self) -> &NormalizationTables {
        &self.tables
    }

    pub fn county(&self, raw: &str) -> String {
        let name = normalize_county_name(raw);
        match self.known_counties.get(&name.to_uppercase()) {
            Some(known) => known.clone(),
            None => name,
        }
    }

    pub fn party(&self, raw: &str) -> String {
        normalize_party_code(raw, &self.tables)
    }

    pub fn contest(&self, year: i32, office: &str) -> Contest {
        let m = normalize_office(office, &self.tables);
        Contest {
            year,
            category: m.category,
            name: m.display_name,
            running_mate: m.running_mate,
        }
    }

    pub fn candidate(&self, raw: &str, contest: &Contest) -> String {
        normalize_candidate(raw, contest.running_mate, &self.tables.surnames)
    }

    /// The configured name of the nominee of a party, if any.
    pub fn nominee(&self, contest: &Contest, party_code: &str) -> Option<&str> {
        self.tables
            .nominees
            .iter()
            .find(|n| {
                n.year == contest.year && n.category == contest.category && n.party == party_code
            })
            .map(|n| n.name.as_str())
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::new(NormalizationTables::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn county_names() {
        assert_eq!(normalize_county_name("McKEAN County"), "McKean");
        assert_eq!(normalize_county_name("  philadelphia  "), "Philadelphia");
        assert_eq!(normalize_county_name("NORTHUMBERLAND"), "Northumberland");
        assert_eq!(normalize_county_name("mccormick  county"), "McCormick");
        assert_eq!(normalize_county_name("   "), "");
        assert_eq!(normalize_county_name(""), "");
    }

    #[test]
    fn county_names_keep_inner_words() {
        assert_eq!(normalize_county_name("snyder   county "), "Snyder");
        assert_eq!(normalize_county_name("st. lawrence county"), "St. Lawrence");
    }

    #[test]
    fn candidate_initials() {
        assert_eq!(
            normalize_candidate_name("donald j trump", "President"),
            "Donald J. Trump"
        );
        assert_eq!(
            normalize_candidate_name("DONALD J. TRUMP", "President"),
            "Donald J. Trump"
        );
    }

    #[test]
    fn candidate_running_mates() {
        assert_eq!(
            normalize_candidate_name("JOSEPH R BIDEN / KAMALA D HARRIS", "President"),
            "Joseph R. Biden"
        );
        assert_eq!(
            normalize_candidate_name("Josh Shapiro and Austin Davis", "Governor"),
            "Josh Shapiro"
        );
        assert_eq!(
            normalize_candidate_name("Tom Wolf & Mike Stack", "Governor"),
            "Tom Wolf"
        );
        // Only whole words split a ticket.
        assert_eq!(
            normalize_candidate_name("Sandra Anderson", "President"),
            "Sandra Anderson"
        );
        // No ticket for the other offices.
        assert_eq!(
            normalize_candidate_name("Smith/Jones", "Attorney General"),
            "Smith/Jones"
        );
    }

    #[test]
    fn candidate_suffixes_and_prefixes() {
        assert_eq!(
            normalize_candidate_name("ROBERT P CASEY JR", "U.S. Senate"),
            "Robert P. Casey Jr."
        );
        assert_eq!(
            normalize_candidate_name("Robert Casey, jr.", "U.S. Senate"),
            "Robert Casey Jr."
        );
        assert_eq!(
            normalize_candidate_name("john smith iii", "Attorney General"),
            "John Smith III"
        );
        assert_eq!(
            normalize_candidate_name("DAVE MCCORMICK", "U.S. Senate"),
            "Dave McCormick"
        );
        assert_eq!(
            normalize_candidate_name("conor o'brien", "State Treasurer"),
            "Conor O'Brien"
        );
        assert_eq!(normalize_candidate_name("  ", "Governor"), "");
    }

    #[test]
    fn candidate_surname_table() {
        let n = Normalizer::default();
        let c = n.contest(2012, "Auditor General");
        assert_eq!(n.candidate("EUGENE DEPASQUALE", &c), "Eugene DePasquale");
        // Common first names are left alone.
        assert_eq!(n.candidate("DENNIS DEAN", &c), "Dennis Dean");
        assert_eq!(n.candidate("DePASQUALE, EUGENE", &c), "DePasquale, Eugene");
        assert_eq!(n.candidate("Eugene DePasquale.", &c), "Eugene DePasquale.");
    }

    #[test]
    fn candidate_default_surnames() {
        assert_eq!(
            normalize_candidate_name("eugene depasquale", "Auditor General"),
            "Eugene DePasquale"
        );
        assert_eq!(
            normalize_candidate_name("DEPASQUALE, EUGENE", "Auditor General"),
            "DePasquale, Eugene"
        );
        assert_eq!(
            normalize_candidate_name("dennis deluca", "State Treasurer"),
            "Dennis Deluca"
        );
    }

    #[test]
    fn party_codes() {
        let tables = NormalizationTables::default();
        assert_eq!(normalize_party_code("Democratic", &tables), "DEM");
        assert_eq!(normalize_party_code("DEM", &tables), "DEM");
        assert_eq!(normalize_party_code(" Rep ", &tables), "REP");
        assert_eq!(normalize_party_code("Green Party", &tables), "GRN");
        assert_eq!(normalize_party_code("Socialist Workers", &tables), "SOCIALIST WORKERS");
        assert_eq!(normalize_party_code("", &tables), "");
        let custom = NormalizationTables::empty().with_party_code("Socialist Workers", "swp");
        assert_eq!(normalize_party_code("socialist workers", &custom), "SWP");
    }

    #[test]
    fn offices() {
        let tables = NormalizationTables::default();
        assert_eq!(
            normalize_office("President of the United States", &tables).category,
            "president"
        );
        assert_eq!(normalize_office("u.s. senate", &tables).category, "us_senate");
        let lg = normalize_office("Lieutenant  Governor", &tables);
        assert_eq!(lg.category, "lieutenant_governor");
        assert_eq!(lg.display_name, "Lieutenant Governor");
        assert!(!lg.running_mate);
        let overridden = tables.with_office("Governor", "governor", "Governor of Pennsylvania", true);
        assert_eq!(
            normalize_office("GOVERNOR", &overridden).display_name,
            "Governor of Pennsylvania"
        );
    }

    #[test]
    fn known_counties() {
        let known = vec!["McKean".to_string(), "Philadelphia".to_string()];
        let n = Normalizer::default().with_known_counties(known.iter());
        assert_eq!(n.county("MCKEAN"), "McKean");
        assert_eq!(n.county("Philadelphia County"), "Philadelphia");
        assert_eq!(n.county("adams"), "Adams");
    }

    #[test]
    fn nominees() {
        let n = Normalizer::default();
        let c = n.contest(2024, "President");
        assert_eq!(n.nominee(&c, DEM), Some("Kamala Harris"));
        assert_eq!(n.nominee(&c, "GRN"), None);
        let s = n.contest(2024, "U.S. Senate");
        assert_eq!(n.nominee(&s, DEM), None);
    }
}
