use indicatif::ProgressBar;
use serde::Serialize;

use crate::api::models::{MatchRecord, Outcome, Statistic, Venue};
use crate::api::store::{CompetitionFilter, MatchStore};
use crate::error::AppError;

use super::baseline::compute_baseline;
use super::deviation::percent_deviation;
use super::matchweek::parse_matchweek;

/// Matches up to this week are left out of the table.
pub const MIN_MATCHWEEK: i64 = 5;

/// Weights for ball possession, pass opp half, xG open play and touches in
/// the opposition box. They add up to 1.09 and are applied as they are.
pub const DEVIATION_WEIGHTS: [f64; 4] = [0.12, 0.25, 0.40, 0.32];

/// How far the opponent fell from its own average in one match against the
/// selected squad. Percentages are lower-is-better, dispersion excepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRow {
    pub matchweek: i64,
    pub venue: Venue,
    pub result: Outcome,
    pub opponent: String,
    pub ball_possession: f64,
    pub pass_opp_half: f64,
    pub xg_open_play: f64,
    pub touch_opp_box: f64,
    pub overall_deviation: f64,
    pub weighted_deviation: f64,
    pub dispersion: f64,
}

impl MatchRow {
    fn new(
        matchweek: i64,
        venue: Venue,
        result: Outcome,
        opponent: String,
        deviations: [f64; 4],
    ) -> Self {
        let [ball_possession, pass_opp_half, xg_open_play, touch_opp_box] = deviations;
        MatchRow {
            matchweek,
            venue,
            result,
            opponent,
            ball_possession,
            pass_opp_half,
            xg_open_play,
            touch_opp_box,
            overall_deviation: mean(&deviations),
            weighted_deviation: weighted(&deviations),
            dispersion: sample_std_dev(&deviations),
        }
    }

    pub fn deviations(&self) -> [f64; 4] {
        [
            self.ball_possession,
            self.pass_opp_half,
            self.xg_open_play,
            self.touch_opp_box,
        ]
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn weighted(deviations: &[f64; 4]) -> f64 {
    deviations
        .iter()
        .zip(DEVIATION_WEIGHTS)
        .map(|(dev, weight)| dev * weight)
        .sum()
}

/// Standard deviation with an n - 1 denominator.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let var = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

pub fn build_table(
    store: &dyn MatchStore,
    matches: &[MatchRecord],
    target_team: &str,
    excluded: &CompetitionFilter,
) -> Result<Vec<MatchRow>, AppError> {
    build_table_with_progress(store, matches, target_team, excluded, &ProgressBar::hidden())
}

/// Builds one row per match of `target_team` after the opening weeks, ordered
/// by matchweek. The first failure aborts the whole table.
pub fn build_table_with_progress(
    store: &dyn MatchStore,
    matches: &[MatchRecord],
    target_team: &str,
    excluded: &CompetitionFilter,
    pb: &ProgressBar,
) -> Result<Vec<MatchRow>, AppError> {
    let mut rows = Vec::new();

    for record in matches {
        pb.inc(1);

        let matchweek = parse_matchweek(&record.general.round)?;
        if matchweek <= MIN_MATCHWEEK {
            continue;
        }

        let venue = record.venue_of(target_team);
        let opponent_venue = venue.opposite();
        let opponent = record.team_at(opponent_venue).to_string();
        let result = record.outcome_for(venue);

        let mut actual = [0.0; 4];
        for (slot, statistic) in actual.iter_mut().zip(Statistic::ALL) {
            *slot = record.stat(statistic, opponent_venue)?;
        }

        log::debug!("Baseline for {} before matchweek {}", opponent, matchweek);
        let baseline = compute_baseline(store, &opponent, matchweek, excluded)?;

        let mut deviations = [0.0; 4];
        for ((slot, statistic), value) in deviations.iter_mut().zip(Statistic::ALL).zip(actual) {
            *slot = percent_deviation(value, baseline.mean(statistic)?)?;
        }

        rows.push(MatchRow::new(matchweek, venue, result, opponent, deviations));
    }

    rows.sort_by_key(|row| row.matchweek);

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_deviation_is_not_normalized() {
        let row = MatchRow::new(8, Venue::Home, Outcome::Win, "Beta".to_string(), [10.0; 4]);
        assert!((row.weighted_deviation - 10.9).abs() < 1e-9);
        assert_eq!(row.overall_deviation, 10.0);
        assert_eq!(row.dispersion, 0.0);
    }

    #[test]
    fn dispersion_uses_sample_std_dev() {
        let row = MatchRow::new(
            8,
            Venue::Away,
            Outcome::Draw,
            "Beta".to_string(),
            [2.0, 4.0, 4.0, 6.0],
        );
        assert_eq!(row.overall_deviation, 4.0);
        // squared deviations sum to 8, over n - 1 = 3
        assert!((row.dispersion - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((row.weighted_deviation - (0.24 + 1.0 + 1.6 + 1.92)).abs() < 1e-9);
    }

    #[test]
    fn helpers_handle_short_inputs() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(sample_std_dev(&[3.0]), 0.0);
    }
}
