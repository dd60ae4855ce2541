use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::api::models::{MatchRecord, Statistic};
use crate::api::store::{CompetitionFilter, MatchStore};
use crate::error::AppError;

use super::matchweek::parse_matchweek;

/// A team's average for each tracked statistic over its earlier matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    pub team: String,
    pub cutoff: i64,
    pub matches_used: usize,
    means: BTreeMap<Statistic, f64>,
}

impl Baseline {
    pub fn mean(&self, statistic: Statistic) -> Result<f64, AppError> {
        self.means
            .get(&statistic)
            .copied()
            .ok_or_else(|| AppError::MissingStatistic {
                statistic: statistic.field().to_string(),
                venue: format!("{} baseline", self.team),
            })
    }
}

/// Fetches `team`'s own matches and averages them into a baseline.
pub fn compute_baseline(
    store: &dyn MatchStore,
    team: &str,
    cutoff: i64,
    excluded: &CompetitionFilter,
) -> Result<Baseline, AppError> {
    let history = store.fetch_matches(excluded, team)?;
    baseline_from_history(&history, team, cutoff)
}

/// Averages the matches in `history` played strictly before `cutoff`, reading
/// each statistic from the venue `team` occupied in that match.
pub fn baseline_from_history(
    history: &[MatchRecord],
    team: &str,
    cutoff: i64,
) -> Result<Baseline, AppError> {
    let mut samples: BTreeMap<Statistic, Vec<f64>> = BTreeMap::new();
    let mut matches_used = 0usize;

    for record in history {
        let matchweek = parse_matchweek(&record.general.round)?;
        if matchweek >= cutoff {
            continue;
        }

        let venue = record.venue_of(team);
        for statistic in Statistic::ALL {
            samples
                .entry(statistic)
                .or_default()
                .push(record.stat(statistic, venue)?);
        }
        matches_used += 1;
    }

    if matches_used == 0 {
        return Err(AppError::InsufficientHistory {
            team: team.to_string(),
            cutoff,
        });
    }

    let means = samples
        .into_iter()
        .map(|(statistic, values)| (statistic, exact_mean(&values)))
        .collect();

    Ok(Baseline {
        team: team.to_string(),
        cutoff,
        matches_used,
        means,
    })
}

/// Non-overlapping partial sums whose total is the exact sum of every value
/// added (Shewchuk's algorithm). Partials are kept in increasing magnitude.
#[derive(Debug, Clone, Default)]
struct Partials(Vec<f64>);

impl Partials {
    fn add(&mut self, mut x: f64) {
        let mut kept = 0;
        for i in 0..self.0.len() {
            let mut y = self.0[i];
            if x.abs() < y.abs() {
                std::mem::swap(&mut x, &mut y);
            }
            let hi = x + y;
            let lo = y - (hi - x);
            if lo != 0.0 {
                self.0[kept] = lo;
                kept += 1;
            }
            x = hi;
        }
        self.0.truncate(kept);
        self.0.push(x);
    }

    fn approx(&self) -> f64 {
        self.0.iter().rev().sum()
    }

    /// Sign of the exact total, read off the largest non-zero partial.
    fn sign(&self) -> Ordering {
        self.0
            .iter()
            .rev()
            .find(|p| **p != 0.0)
            .and_then(|p| p.partial_cmp(&0.0))
            .unwrap_or(Ordering::Equal)
    }
}

/// Adjacent double towards +inf (`up`) or -inf.
fn step(value: f64, up: bool) -> f64 {
    if value == 0.0 {
        let tiny = f64::from_bits(1);
        return if up { tiny } else { -tiny };
    }
    let bits = value.to_bits();
    if (value > 0.0) == up {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// Where `sum / n` lies relative to the midpoint of `a` and `b`: the sign of
/// `2 * sum - n * a - n * b`, evaluated without rounding.
fn midpoint_side(sum: &Partials, n: f64, a: f64, b: f64) -> Ordering {
    let mut diff = sum.clone();
    for &p in &sum.0 {
        diff.add(p);
    }
    for c in [a, b] {
        let hi = n * c;
        diff.add(-hi);
        diff.add(-n.mul_add(c, -hi));
    }
    diff.sign()
}

/// Arithmetic mean rounded once from the exact sum over `n`, ties to even.
fn exact_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sum = Partials::default();
    for &value in values {
        sum.add(value);
    }

    let n = values.len() as f64;
    let mut mean = sum.approx() / n;
    if !mean.is_finite() {
        return mean;
    }

    let odd = |x: f64| x.to_bits() & 1 == 1;
    loop {
        let above = step(mean, true);
        let below = step(mean, false);
        mean = match midpoint_side(&sum, n, mean, above) {
            Ordering::Greater => above,
            Ordering::Equal if odd(mean) => above,
            _ => match midpoint_side(&sum, n, mean, below) {
                Ordering::Less => below,
                Ordering::Equal if odd(mean) => below,
                _ => return mean,
            },
        };
    }
}
