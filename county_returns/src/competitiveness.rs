use crate::config::{Competitiveness, Lean};

// One band of the classification, on the absolute value of the margin.
struct Band {
    // Inclusive upper bound on |margin_pct|
    upper: f64,
    tier: &'static str,
    dem: (&'static str, &'static str),
    rep: (&'static str, &'static str),
}

// Ordered from the most competitive band outward. A margin exactly on a bound
// belongs to the inner band.
const BANDS: [Band; 7] = [
    Band {
        upper: 1.0,
        tier: "Tilt",
        dem: ("D_TILT", "#e1f5fe"),
        rep: ("R_TILT", "#fee8c8"),
    },
    Band {
        upper: 5.5,
        tier: "Lean",
        dem: ("D_LEAN", "#c6dbef"),
        rep: ("R_LEAN", "#fcae91"),
    },
    Band {
        upper: 10.0,
        tier: "Likely",
        dem: ("D_LIKELY", "#9ecae1"),
        rep: ("R_LIKELY", "#fb6a4a"),
    },
    Band {
        upper: 20.0,
        tier: "Safe",
        dem: ("D_SAFE", "#6baed6"),
        rep: ("R_SAFE", "#ef3b2c"),
    },
    Band {
        upper: 30.0,
        tier: "Stronghold",
        dem: ("D_STRONGHOLD", "#3182bd"),
        rep: ("R_STRONGHOLD", "#cb181d"),
    },
    Band {
        upper: 40.0,
        tier: "Dominant",
        dem: ("D_DOMINANT", "#08519c"),
        rep: ("R_DOMINANT", "#a50f15"),
    },
    Band {
        upper: f64::INFINITY,
        tier: "Annihilation",
        dem: ("D_ANNIHILATION", "#08306b"),
        rep: ("R_ANNIHILATION", "#67000d"),
    },
];

const TOSSUP_BOUND: f64 = 0.5;

/// Maps a signed Democratic margin (in percent of the two-party vote) to its
/// competitiveness bucket.
///
/// Every value gets exactly one bucket. NaN is treated as a tossup.
pub fn classify(margin_pct: f64) -> Competitiveness {
    let abs_margin = margin_pct.abs();
    if margin_pct.is_nan() || abs_margin <= TOSSUP_BOUND {
        return Competitiveness {
            category: "Tossup".to_string(),
            party: Lean::Tossup,
            code: "TOSSUP".to_string(),
            color: "#f7f7f7".to_string(),
        };
    }
    // The last band is unbounded: the scan always finds one.
    let band = BANDS
        .iter()
        .find(|b| abs_margin <= b.upper)
        .unwrap_or(&BANDS[BANDS.len() - 1]);
    let (party, party_name, (code, color)) = if margin_pct > 0.0 {
        (Lean::Democratic, "Democratic", band.dem)
    } else {
        (Lean::Republican, "Republican", band.rep)
    };
    Competitiveness {
        category: format!("{} {}", band.tier, party_name),
        party,
        code: code.to_string(),
        color: color.to_string(),
    }
}
