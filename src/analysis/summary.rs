use crate::api::models::{Outcome, Venue};

use super::deviation::round_to;
use super::table::{mean, MatchRow};

/// Number of most recent matches the summary tiles look at.
pub const RECENT_WINDOW: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub matches: usize,
    pub xg_open_play: f64,
    pub pass_opp_half: f64,
    pub weighted_deviation: f64,
    pub dispersion: f64,
}

/// Spread of the weighted deviation for one venue.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueSpread {
    pub venue: Venue,
    pub matches: usize,
    pub min: f64,
    pub median: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeGroup {
    pub result: Outcome,
    pub venue: Venue,
    pub opponents: Vec<String>,
    pub total_dispersion: f64,
    pub mean_weighted: f64,
}

/// Averages over the last five rows of a matchweek-ordered table.
pub fn summarize(rows: &[MatchRow]) -> Option<Summary> {
    if rows.is_empty() {
        return None;
    }

    let recent = &rows[rows.len().saturating_sub(RECENT_WINDOW)..];
    let avg = |f: fn(&MatchRow) -> f64| {
        let values: Vec<f64> = recent.iter().map(f).collect();
        round_to(mean(&values), 2)
    };

    Some(Summary {
        matches: recent.len(),
        xg_open_play: avg(|r| r.xg_open_play),
        pass_opp_half: avg(|r| r.pass_opp_half),
        weighted_deviation: avg(|r| r.weighted_deviation),
        dispersion: avg(|r| r.dispersion),
    })
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        0.0
    } else if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

pub fn venue_breakdown(rows: &[MatchRow]) -> Vec<VenueSpread> {
    [Venue::Home, Venue::Away]
        .into_iter()
        .filter_map(|venue| {
            let mut values: Vec<f64> = rows
                .iter()
                .filter(|r| r.venue == venue)
                .map(|r| r.weighted_deviation)
                .collect();
            if values.is_empty() {
                return None;
            }
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            Some(VenueSpread {
                venue,
                matches: values.len(),
                min: values[0],
                median: median(&values),
                max: values[values.len() - 1],
                mean: mean(&values),
            })
        })
        .collect()
}

/// Rows grouped by result, then venue. Groups without matches are left out.
pub fn outcome_breakdown(rows: &[MatchRow]) -> Vec<OutcomeGroup> {
    let mut groups = Vec::new();

    for result in [Outcome::Win, Outcome::Draw, Outcome::Loss] {
        for venue in [Venue::Home, Venue::Away] {
            let members: Vec<&MatchRow> = rows
                .iter()
                .filter(|r| r.result == result && r.venue == venue)
                .collect();
            if members.is_empty() {
                continue;
            }

            let weighted: Vec<f64> = members.iter().map(|r| r.weighted_deviation).collect();
            groups.push(OutcomeGroup {
                result,
                venue,
                opponents: members.iter().map(|r| r.opponent.clone()).collect(),
                total_dispersion: members.iter().map(|r| r.dispersion).sum(),
                mean_weighted: mean(&weighted),
            });
        }
    }

    groups
}
