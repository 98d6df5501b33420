// Rendering of the findings: a plain-text report and an HTML fragment made of
// `finding-card` blocks.

use county_returns::report::*;

use crate::returns::*;

const RULE_WIDTH: usize = 80;

/// Everything the reports show about one contest category.
#[derive(Debug, Clone)]
pub struct Findings {
    pub title: String,
    pub contest: String,
    pub contest_name: String,
    pub statewide: Vec<StatewideResult>,
    pub swings: Vec<Swing>,
    pub flips: Vec<Flip>,
    pub bellwethers: Vec<Bellwether>,
    pub strongest_dem: Vec<ElectionResult>,
    pub strongest_rep: Vec<ElectionResult>,
    pub competitive: Vec<ElectionResult>,
    pub largest: Vec<ElectionResult>,
    pub year_over_year: Vec<YearOverYear>,
    pub cohorts: Vec<CohortSummary>,
}

impl Findings {
    // "2000-2024", or "" without any statewide result.
    fn span(&self) -> String {
        match (self.statewide.first(), self.statewide.last()) {
            (Some(f), Some(l)) => format!("{}-{}", f.year, l.year),
            _ => "".to_string(),
        }
    }
}

fn top(mut v: Vec<ElectionResult>, n: usize) -> Vec<ElectionResult> {
    v.truncate(n);
    v
}

pub fn compute_findings(
    dataset: &Dataset,
    contest: &str,
    cohorts: &[(String, Vec<String>)],
) -> Findings {
    let trends = county_trends(dataset, contest);
    let statewide = statewide_results(dataset, contest);
    let mut bells = bellwethers(&trends, &statewide);
    bells.truncate(15);
    let contest_name = statewide
        .last()
        .map(|s| s.contest_name.clone())
        .unwrap_or_else(|| contest.to_string());
    debug!(
        "compute_findings: {}: {} counties, {} elections",
        contest,
        trends.len(),
        statewide.len()
    );
    Findings {
        title: dataset.metadata.title.clone(),
        contest: contest.to_string(),
        contest_name,
        swings: biggest_swings(&trends, 15),
        flips: flipped_counties(&trends),
        bellwethers: bells,
        strongest_dem: top(
            latest_standings(&trends, StandingOrder::StrongestDemocratic),
            10,
        ),
        strongest_rep: top(
            latest_standings(&trends, StandingOrder::StrongestRepublican),
            10,
        ),
        competitive: top(latest_standings(&trends, StandingOrder::MostCompetitive), 10),
        largest: top(latest_standings(&trends, StandingOrder::Largest), 15),
        year_over_year: year_over_year(&statewide),
        cohorts: cohorts
            .iter()
            .map(|(name, counties)| cohort_summary(&trends, name, counties))
            .collect(),
        statewide,
    }
}

/// 1234567 -> "1,234,567"
fn thousands(v: i64) -> String {
    let digits = v.unsigned_abs().to_string();
    let mut res = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            res.push(',');
        }
        res.push(c);
    }
    if v < 0 {
        format!("-{}", res)
    } else {
        res
    }
}

/// A margin in the "D+3.2%" / "R+3.2%" notation.
fn lean(margin_pct: f64, precision: usize) -> String {
    let side = if margin_pct > 0.0 { "D" } else { "R" };
    format!("{}+{:.*}%", side, precision, margin_pct.abs())
}

fn direction(swing: f64) -> &'static str {
    if swing < 0.0 {
        "toward Republicans"
    } else {
        "toward Democrats"
    }
}

fn party_name(w: Winner) -> &'static str {
    match w {
        Winner::Dem => "Democratic",
        Winner::Rep => "Republican",
        Winner::Tie => "Tied",
    }
}

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push(title.to_string());
    lines.push("-".repeat(RULE_WIDTH));
}

pub fn render_text(f: &Findings) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("=".repeat(RULE_WIDTH));
    lines.push(format!("{} - {}", f.title, f.contest_name).to_uppercase());
    lines.push(format!("County findings for the {} contests", f.contest));
    lines.push("=".repeat(RULE_WIDTH));
    lines.push("".to_string());

    section(&mut lines, "STATEWIDE RESULTS");
    for s in f.statewide.iter() {
        lines.push(format!(
            "[{}] {}: {} {:.1}% vs {} {:.1}% | Margin: {} ({} votes)",
            s.winner.code(),
            s.year,
            s.dem_candidate,
            s.dem_pct,
            s.rep_candidate,
            s.rep_pct,
            lean(s.margin_pct, 2),
            thousands(s.margin)
        ));
    }
    lines.push("".to_string());

    section(
        &mut lines,
        &format!("TOP {} BIGGEST COUNTY SWINGS ({})", f.swings.len(), f.span()),
    );
    for (i, s) in f.swings.iter().enumerate() {
        lines.push(format!(
            "{}. {} County: {:+.1}% swing {}",
            i + 1,
            s.county,
            s.swing,
            direction(s.swing)
        ));
        for r in [&s.earliest, &s.latest] {
            lines.push(format!(
                "   {}: {} ({:+.1}%)",
                r.year, r.competitiveness.category, r.margin_pct
            ));
        }
        lines.push("".to_string());
    }

    section(&mut lines, "COUNTIES THAT FLIPPED PARTIES");
    for fl in f.flips.iter() {
        lines.push(format!(
            "{} County: {} to {} ({:+.1}% swing, {}-{})",
            fl.county,
            fl.from.code(),
            fl.to.code(),
            fl.swing,
            fl.earliest_year,
            fl.latest_year
        ));
    }
    if f.flips.is_empty() {
        lines.push("No county changed parties.".to_string());
    }
    lines.push("".to_string());

    section(&mut lines, "BELLWETHER COUNTIES (Tracking Statewide Winner)");
    for b in f.bellwethers.iter() {
        lines.push(format!(
            "{} County: {:.1}% accuracy ({}/{} elections)",
            b.county,
            b.accuracy * 100.0,
            b.matches,
            b.elections
        ));
    }
    lines.push("".to_string());

    let standings = [
        ("STRONGEST DEMOCRATIC COUNTIES (Latest Election)", &f.strongest_dem, 1),
        ("STRONGEST REPUBLICAN COUNTIES (Latest Election)", &f.strongest_rep, 1),
        ("MOST COMPETITIVE COUNTIES (Latest Election)", &f.competitive, 2),
    ];
    for (title, results, precision) in standings {
        section(&mut lines, title);
        for (i, r) in results.iter().enumerate() {
            lines.push(format!(
                "{}. {} County: {} | {} | {} votes",
                i + 1,
                r.county,
                lean(r.margin_pct, precision),
                r.competitiveness.category,
                thousands(r.total_votes as i64)
            ));
        }
        lines.push("".to_string());
    }

    section(&mut lines, "LARGEST COUNTIES BY TOTAL VOTES (Latest Election)");
    for (i, r) in f.largest.iter().enumerate() {
        let signed = if r.margin > 0 {
            format!("+{}", thousands(r.margin))
        } else {
            thousands(r.margin)
        };
        lines.push(format!(
            "{}. {} County: {} votes | {} ({} margin)",
            i + 1,
            r.county,
            thousands(r.total_votes as i64),
            lean(r.margin_pct, 1),
            signed
        ));
    }
    lines.push("".to_string());

    section(&mut lines, "YEAR-OVER-YEAR SWING ANALYSIS");
    for y in f.year_over_year.iter() {
        lines.push(format!(
            "{} -> {}: {:+.2}% swing | {} ({:+.1}%) -> {} ({:+.1}%)",
            y.from_year,
            y.to_year,
            y.swing,
            y.from_winner.code(),
            y.from_margin,
            y.to_winner.code(),
            y.to_margin
        ));
    }
    lines.push("".to_string());

    for c in f.cohorts.iter() {
        section(&mut lines, &format!("COHORT: {}", c.name.to_uppercase()));
        lines.push(format!(
            "Average swing: {:+.1}% {}",
            c.average_swing,
            direction(c.average_swing)
        ));
        lines.push(format!(
            "Flipped: {}/{} ({})",
            c.flipped.len(),
            c.swings.len(),
            c.flipped.join(", ")
        ));
        for cy in c.cycles.iter() {
            lines.push(format!(
                "{}: {} Democratic, {} Republican | {} average",
                cy.year,
                cy.dem_count,
                cy.rep_count,
                lean(cy.average_margin, 2)
            ));
        }
        for (county, s) in c.swings.iter().take(5) {
            lines.push(format!("   {}: {:+.1}%", county, s));
        }
        if !c.missing.is_empty() {
            lines.push(format!("No result for: {}", c.missing.join(", ")));
        }
        lines.push("".to_string());
    }

    lines.push("=".repeat(RULE_WIDTH));
    lines.push("END OF REPORT".to_string());
    lines.push("=".repeat(RULE_WIDTH));
    lines.join("\n")
}

fn escape_html(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => res.push_str("&amp;"),
            '<' => res.push_str("&lt;"),
            '>' => res.push_str("&gt;"),
            '"' => res.push_str("&quot;"),
            '\'' => res.push_str("&#39;"),
            _ => res.push(c),
        }
    }
    res
}

/// The HTML fragment inserted in the published page.
pub fn render_html(f: &Findings) -> String {
    let mut lines: Vec<String> = Vec::new();
    let span = f.span();

    lines.push("<div class=\"finding-card\">".to_string());
    lines.push(format!(
        "<h5>Top {} Counties by Electoral Swing ({})</h5>",
        f.swings.len(),
        span
    ));
    lines.push("<ul>".to_string());
    for s in f.swings.iter() {
        lines.push(format!(
            "<li><strong>{} County:</strong> {:.2}% swing {}<br><em>{}: {} ({:+.2}%) &rarr; {}: {} ({:+.2}%)</em></li>",
            escape_html(&s.county),
            s.swing.abs(),
            direction(s.swing),
            s.earliest.year,
            escape_html(&s.earliest.competitiveness.category),
            s.earliest.margin_pct,
            s.latest.year,
            escape_html(&s.latest.competitiveness.category),
            s.latest.margin_pct
        ));
    }
    lines.push("</ul>".to_string());
    lines.push("</div>".to_string());

    lines.push("<div class=\"finding-card\">".to_string());
    lines.push(format!("<h5>Counties That Changed Parties ({})</h5>", span));
    lines.push(format!(
        "<p><strong>{} counties</strong> flipped from one party to another.</p>",
        f.flips.len()
    ));
    lines.push("<ul>".to_string());
    for fl in f.flips.iter().take(20) {
        lines.push(format!(
            "<li><strong>{} County:</strong> Flipped from {} to {} ({:+.2}% swing from {} to {})</li>",
            escape_html(&fl.county),
            party_name(fl.from),
            party_name(fl.to),
            fl.swing,
            fl.earliest_year,
            fl.latest_year
        ));
    }
    lines.push("</ul>".to_string());
    lines.push("</div>".to_string());

    for c in f.cohorts.iter() {
        lines.push("<div class=\"finding-card\">".to_string());
        lines.push(format!("<h5>{} ({})</h5>", escape_html(&c.name), span));
        lines.push("<ul>".to_string());
        lines.push(format!(
            "<li><strong>Average swing:</strong> {:.2} percentage points {}</li>",
            c.average_swing.abs(),
            direction(c.average_swing)
        ));
        lines.push(format!(
            "<li><strong>Counties flipped:</strong> {} out of {}</li>",
            c.flipped.len(),
            c.swings.len()
        ));
        lines.push("</ul>".to_string());
        for cy in c.cycles.iter() {
            lines.push(format!(
                "<p><strong>{}:</strong> {} Democratic, {} Republican | {} average</p>",
                cy.year,
                cy.dem_count,
                cy.rep_count,
                lean(cy.average_margin, 2)
            ));
        }
        lines.push("<ol>".to_string());
        for (county, s) in c.swings.iter().take(10) {
            lines.push(format!(
                "<li><strong>{} County</strong>: {:.2}% shift {}</li>",
                escape_html(county),
                s.abs(),
                direction(*s)
            ));
        }
        lines.push("</ol>".to_string());
        lines.push("</div>".to_string());
    }
    lines.join("\n")
}
