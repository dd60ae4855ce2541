use crate::api::store::CompetitionFilter;
use crate::error::AppError;
use std::env;

const DEFAULT_TTL_MINS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub store_url: Option<String>,
    pub api_key: Option<String>,
    pub data_source: String,
    pub database: String,
    pub collection: String,
    pub excluded: CompetitionFilter,
    pub cache_ttl_mins: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let store_url = env::var("STORE_URL").ok().filter(|url| !url.is_empty());
        let api_key = env::var("STORE_API_KEY").ok().filter(|key| !key.is_empty());

        let data_source = env::var("STORE_DATA_SOURCE").unwrap_or_else(|_| "Cluster0".to_string());
        let database = env::var("STORE_DATABASE").unwrap_or_else(|_| "football_data".to_string());
        let collection = env::var("STORE_COLLECTION").unwrap_or_else(|_| "fotmob_stats".to_string());

        let excluded = match env::var("EXCLUDED_COMPETITIONS") {
            Ok(raw) => CompetitionFilter::parse_list(&raw),
            Err(_) => CompetitionFilter::default(),
        };

        let cache_ttl_mins = match env::var("CACHE_TTL_MINS") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                AppError::ConfigError(format!("CACHE_TTL_MINS must be a number, got '{}'", raw))
            })?,
            Err(_) => DEFAULT_TTL_MINS,
        };

        Ok(Config {
            store_url,
            api_key,
            data_source,
            database,
            collection,
            excluded,
            cache_ttl_mins,
        })
    }

    /// Base URL of the document store, required when no local dump is given.
    pub fn require_store_url(&self) -> Result<&str, AppError> {
        self.store_url.as_deref().ok_or_else(|| {
            AppError::ConfigError(
                "STORE_URL not found in .env file (or pass --data <FILE>)".to_string(),
            )
        })
    }
}
