use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

// Match document as stored in the stats collection. Per-venue values live
// under `stats.<field>.home` / `stats.<field>.away`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRecord {
    pub general: GeneralInfo,
    pub teams: MatchTeams,
    #[serde(default)]
    pub stats: HashMap<String, Value>,
    #[serde(default)]
    pub result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralInfo {
    pub round: RawRound,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Round as it comes out of the store: either `12` or `"Round 12"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawRound {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchTeams {
    pub home: TeamRef,
    pub away: TeamRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamRef {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    pub fn opposite(self) -> Venue {
        match self {
            Venue::Home => Venue::Away,
            Venue::Away => Venue::Home,
        }
    }

    /// Key used by the store for per-venue values and the `result` field.
    pub fn key(self) -> &'static str {
        match self {
            Venue::Home => "home",
            Venue::Away => "away",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Home => write!(f, "Home"),
            Venue::Away => write!(f, "Away"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => write!(f, "Win"),
            Outcome::Loss => write!(f, "Loss"),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Statistic {
    BallPossession,
    PassOppHalf,
    XgOpenPlay,
    TouchOppBox,
}

impl Statistic {
    pub const ALL: [Statistic; 4] = [
        Statistic::BallPossession,
        Statistic::PassOppHalf,
        Statistic::XgOpenPlay,
        Statistic::TouchOppBox,
    ];

    /// Field name inside the `stats` document.
    pub fn field(self) -> &'static str {
        match self {
            Statistic::BallPossession => "ball_possession",
            Statistic::PassOppHalf => "passes_opp_half_%",
            Statistic::XgOpenPlay => "xg_op_for_100_passes",
            Statistic::TouchOppBox => "touch_opp_box_100_passes",
        }
    }
}

impl MatchRecord {
    pub fn home_team(&self) -> &str {
        &self.teams.home.name
    }

    pub fn away_team(&self) -> &str {
        &self.teams.away.name
    }

    /// Venue `team` played at. Anything that is not the home side counts as away.
    pub fn venue_of(&self, team: &str) -> Venue {
        if self.home_team() == team {
            Venue::Home
        } else {
            Venue::Away
        }
    }

    pub fn team_at(&self, venue: Venue) -> &str {
        match venue {
            Venue::Home => self.home_team(),
            Venue::Away => self.away_team(),
        }
    }

    pub fn stat(&self, statistic: Statistic, venue: Venue) -> Result<f64, AppError> {
        self.stats
            .get(statistic.field())
            .and_then(|pair| pair.get(venue.key()))
            .and_then(Value::as_f64)
            .ok_or_else(|| AppError::MissingStatistic {
                statistic: statistic.field().to_string(),
                venue: venue.key().to_string(),
            })
    }

    /// Outcome for the side that played at `venue`.
    pub fn outcome_for(&self, venue: Venue) -> Outcome {
        if self.result == venue.key() {
            Outcome::Win
        } else if self.result == venue.opposite().key() {
            Outcome::Loss
        } else {
            Outcome::Draw
        }
    }
}

// Data API aggregate response
#[derive(Debug, Deserialize)]
pub struct AggregateResponse<T> {
    pub documents: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct TeamNameDoc {
    #[serde(rename = "_id")]
    pub name: String,
}
