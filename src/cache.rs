use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use chrono::{DateTime, Duration, Utc};
use crate::api::models::MatchRecord;
use crate::api::store::{CompetitionFilter, MatchStore};
use crate::error::AppError;

const CACHE_FILE: &str = "responses.json";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CachedResponse {
    pub matches: Vec<MatchRecord>,
    pub fetched_at: DateTime<Utc>,
}

/// Store responses keyed by excluded competitions and team.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseCache {
    pub ttl_mins: u64,
    pub last_updated: DateTime<Utc>,
    pub entries: HashMap<String, CachedResponse>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl ResponseCache {
    pub fn new(ttl_mins: u64) -> Self {
        ResponseCache {
            ttl_mins,
            last_updated: Utc::now(),
            entries: HashMap::new(),
            path: None,
        }
    }

    pub fn key(excluded: &CompetitionFilter, team: &str) -> String {
        format!("{}|{}", excluded.cache_key(), team)
    }

    pub fn get_cache_path() -> PathBuf {
        let cache_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".squad_report");

        cache_dir.join(CACHE_FILE)
    }

    pub fn load(ttl_mins: u64) -> Result<Self, AppError> {
        Self::load_from(Self::get_cache_path(), ttl_mins)
    }

    pub fn load_from(path: PathBuf, ttl_mins: u64) -> Result<Self, AppError> {
        let mut cache = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str::<ResponseCache>(&content).map_err(|e| {
                AppError::CacheError(format!("Failed to parse cache: {}", e))
            })?,
            // Cache doesn't exist yet
            Err(_) => ResponseCache::new(ttl_mins),
        };

        cache.ttl_mins = ttl_mins;
        cache.path = Some(path);
        cache.evict_stale();

        Ok(cache)
    }

    pub fn save(&self) -> Result<(), AppError> {
        let path = self.path.clone().unwrap_or_else(Self::get_cache_path);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                AppError::CacheError(format!("Failed to create cache dir: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| {
            AppError::CacheError(format!("Failed to serialize cache: {}", e))
        })?;

        fs::write(&path, json).map_err(|e| {
            AppError::CacheError(format!("Failed to write cache: {}", e))
        })?;

        Ok(())
    }

    fn is_fresh(&self, entry: &CachedResponse, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(entry.fetched_at);
        age < Duration::minutes(self.ttl_mins as i64)
    }

    pub fn get(&self, key: &str) -> Option<&[MatchRecord]> {
        let now = Utc::now();
        self.entries
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.matches.as_slice())
    }

    pub fn insert(&mut self, key: String, matches: Vec<MatchRecord>) {
        self.entries.insert(
            key,
            CachedResponse {
                matches,
                fetched_at: Utc::now(),
            },
        );
        self.last_updated = Utc::now();
    }

    pub fn evict_stale(&mut self) {
        let now = Utc::now();
        let ttl = Duration::minutes(self.ttl_mins as i64);
        self.entries
            .retain(|_, entry| now.signed_duration_since(entry.fetched_at) < ttl);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_updated = Utc::now();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serves repeated `(excluded, team)` queries from a [`ResponseCache`] and
/// forwards misses to the wrapped store.
pub struct CachedStore<S> {
    inner: S,
    cache: RefCell<ResponseCache>,
}

impl<S: MatchStore> CachedStore<S> {
    pub fn new(inner: S, cache: ResponseCache) -> Self {
        CachedStore {
            inner,
            cache: RefCell::new(cache),
        }
    }

    /// Drops every cached response.
    pub fn bust(&self) {
        self.cache.borrow_mut().clear();
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.cache.borrow().save()
    }

    #[cfg(test)]
    fn cached_entries(&self) -> usize {
        self.cache.borrow().len()
    }

    #[cfg(test)]
    fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: MatchStore> MatchStore for CachedStore<S> {
    fn fetch_matches(
        &self,
        excluded: &CompetitionFilter,
        team: &str,
    ) -> Result<Vec<MatchRecord>, AppError> {
        let key = ResponseCache::key(excluded, team);

        if let Some(hit) = self.cache.borrow().get(&key) {
            log::debug!("Cache hit for {}", key);
            return Ok(hit.to_vec());
        }

        log::debug!("Cache miss for {}", key);
        let matches = self.inner.fetch_matches(excluded, team)?;
        self.cache.borrow_mut().insert(key, matches.clone());

        Ok(matches)
    }

    fn team_names(&self) -> Result<Vec<String>, AppError> {
        self.inner.team_names()
    }
}
