use crate::error::AppError;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use super::models::MatchRecord;

const DEFAULT_EXCLUDED: [&str; 2] = ["INT", "INT-2"];

/// Competition codes (`general.country`) left out of every query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompetitionFilter {
    codes: BTreeSet<String>,
}

impl Default for CompetitionFilter {
    fn default() -> Self {
        CompetitionFilter::new(DEFAULT_EXCLUDED)
    }
}

impl CompetitionFilter {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CompetitionFilter {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma separated list such as `INT,INT-2`.
    pub fn parse_list(raw: &str) -> Self {
        CompetitionFilter::new(
            raw.split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty()),
        )
    }

    pub fn excludes(&self, country: Option<&str>) -> bool {
        country.map(|c| self.codes.contains(c)).unwrap_or(false)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    /// Stable string form, used as part of cache keys.
    pub fn cache_key(&self) -> String {
        self.codes.iter().cloned().collect::<Vec<_>>().join(",")
    }
}

pub trait MatchStore {
    /// Every match `team` played (home or away) outside the excluded competitions.
    /// Ordering is not guaranteed.
    fn fetch_matches(
        &self,
        excluded: &CompetitionFilter,
        team: &str,
    ) -> Result<Vec<MatchRecord>, AppError>;

    /// Distinct home team names, sorted.
    fn team_names(&self) -> Result<Vec<String>, AppError>;
}

impl<T: MatchStore + ?Sized> MatchStore for Box<T> {
    fn fetch_matches(
        &self,
        excluded: &CompetitionFilter,
        team: &str,
    ) -> Result<Vec<MatchRecord>, AppError> {
        (**self).fetch_matches(excluded, team)
    }

    fn team_names(&self) -> Result<Vec<String>, AppError> {
        (**self).team_names()
    }
}

fn matching(
    records: &[MatchRecord],
    excluded: &CompetitionFilter,
    team: &str,
) -> Vec<MatchRecord> {
    records
        .iter()
        .filter(|m| !excluded.excludes(m.general.country.as_deref()))
        .filter(|m| m.home_team() == team || m.away_team() == team)
        .cloned()
        .collect()
}

fn distinct_home_teams(records: &[MatchRecord]) -> Vec<String> {
    records
        .iter()
        .map(|m| m.home_team().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Store backed by records held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: Vec<MatchRecord>,
}

impl MemoryStore {
    pub fn new(records: Vec<MatchRecord>) -> Self {
        MemoryStore { records }
    }
}

impl MatchStore for MemoryStore {
    fn fetch_matches(
        &self,
        excluded: &CompetitionFilter,
        team: &str,
    ) -> Result<Vec<MatchRecord>, AppError> {
        Ok(matching(&self.records, excluded, team))
    }

    fn team_names(&self) -> Result<Vec<String>, AppError> {
        Ok(distinct_home_teams(&self.records))
    }
}

/// Store read from a JSON export of the match collection (an array of documents).
#[derive(Debug)]
pub struct JsonFileStore {
    inner: MemoryStore,
}

impl JsonFileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let records: Vec<MatchRecord> = serde_json::from_str(&content).map_err(|e| {
            AppError::JsonError(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        log::info!("Loaded {} match records from {}", records.len(), path.display());

        Ok(JsonFileStore {
            inner: MemoryStore::new(records),
        })
    }
}

impl MatchStore for JsonFileStore {
    fn fetch_matches(
        &self,
        excluded: &CompetitionFilter,
        team: &str,
    ) -> Result<Vec<MatchRecord>, AppError> {
        self.inner.fetch_matches(excluded, team)
    }

    fn team_names(&self) -> Result<Vec<String>, AppError> {
        self.inner.team_names()
    }
}
