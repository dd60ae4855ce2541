use crate::config::Config;
use crate::error::AppError;
use governor::{Quota, RateLimiter, state::{InMemoryState, NotKeyed}, clock::{Clock, DefaultClock}};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;

use super::endpoints::AGGREGATE_ACTION;
use super::models::{AggregateResponse, MatchRecord, TeamNameDoc};
use super::store::{CompetitionFilter, MatchStore};

const MAX_RETRIES: u32 = 3;
const REQUESTS_PER_SECOND: u32 = 10;

/// Match store reached through a document database's HTTP data API.
pub struct DocumentStoreClient {
    base_url: String,
    api_key: Option<String>,
    data_source: String,
    database: String,
    collection: String,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl DocumentStoreClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let base_url = config.require_store_url()?.trim_end_matches('/').to_string();
        let per_second = NonZeroU32::new(REQUESTS_PER_SECOND).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(DocumentStoreClient {
            base_url,
            api_key: config.api_key.clone(),
            data_source: config.data_source.clone(),
            database: config.database.clone(),
            collection: config.collection.clone(),
            rate_limiter,
        })
    }

    /// Pipeline selecting `team`'s matches outside the excluded competitions,
    /// projected down to the fields the report reads.
    pub fn matches_pipeline(excluded: &CompetitionFilter, team: &str) -> Value {
        let codes: Vec<&str> = excluded.codes().collect();
        json!([
            {
                "$match": {
                    "general.country": { "$nin": codes },
                    "$or": [
                        { "teams.home.name": team },
                        { "teams.away.name": team }
                    ]
                }
            },
            {
                "$project": {
                    "_id": 0,
                    "general.round": 1,
                    "general.league": 1,
                    "general.country": 1,
                    "teams.home.name": 1,
                    "teams.away.name": 1,
                    "stats": 1,
                    "result": 1
                }
            }
        ])
    }

    fn team_names_pipeline() -> Value {
        json!([
            { "$group": { "_id": "$teams.home.name" } },
            { "$sort": { "_id": 1 } }
        ])
    }

    fn wait_for_slot(&self) {
        let clock = DefaultClock::default();
        while let Err(not_until) = self.rate_limiter.check() {
            thread::sleep(not_until.wait_time_from(clock.now()));
        }
    }

    fn execute_aggregate<T: DeserializeOwned>(&self, pipeline: Value) -> Result<Vec<T>, AppError> {
        let url = format!("{}{}", self.base_url, AGGREGATE_ACTION);
        let body = json!({
            "dataSource": self.data_source,
            "database": self.database,
            "collection": self.collection,
            "pipeline": pipeline,
        });

        let mut retry_count = 0;

        loop {
            self.wait_for_slot();

            let mut request = ureq::post(&url)
                .set("User-Agent", "squad_report/0.1.0")
                .set("Content-Type", "application/json");
            if let Some(key) = &self.api_key {
                request = request.set("api-key", key);
            }

            match request.send_json(body.clone()) {
                Ok(resp) => {
                    let text = resp
                        .into_string()
                        .map_err(|e| AppError::HttpError(e.to_string()))?;
                    let parsed: AggregateResponse<T> = serde_json::from_str(&text)
                        .map_err(|e| AppError::JsonError(e.to_string()))?;
                    return Ok(parsed.documents);
                }
                Err(ureq::Error::Status(429, _)) => {
                    if retry_count >= MAX_RETRIES {
                        return Err(AppError::RateLimited);
                    }
                    let wait_ms = 2000 * (retry_count + 1) as u64;
                    log::warn!("Rate limited by store, waiting {}ms before retry", wait_ms);
                    thread::sleep(Duration::from_millis(wait_ms));
                    retry_count += 1;
                }
                Err(e) => {
                    return Err(AppError::HttpError(e.to_string()));
                }
            }
        }
    }
}

impl MatchStore for DocumentStoreClient {
    fn fetch_matches(
        &self,
        excluded: &CompetitionFilter,
        team: &str,
    ) -> Result<Vec<MatchRecord>, AppError> {
        log::debug!("Querying store for {} (excluding {})", team, excluded.cache_key());
        self.execute_aggregate(Self::matches_pipeline(excluded, team))
    }

    fn team_names(&self) -> Result<Vec<String>, AppError> {
        let docs: Vec<TeamNameDoc> = self.execute_aggregate(Self::team_names_pipeline())?;
        Ok(docs.into_iter().map(|d| d.name).collect())
    }
}
