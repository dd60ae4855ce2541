use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not enough history for {team} before matchweek {cutoff}")]
    InsufficientHistory { team: String, cutoff: i64 },

    #[error("Division by zero: baseline statistic is 0")]
    DivisionByZero,

    #[error("Invalid matchweek: {0}")]
    MatchweekParse(String),

    #[error("Missing statistic {statistic} ({venue})")]
    MissingStatistic { statistic: String, venue: String },

    #[error("No matches found for {0}")]
    NoMatches(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    #[error("Cache error: {0}")]
    CacheError(String),
}
