// Data API actions, appended to STORE_URL
pub const AGGREGATE_ACTION: &str = "/action/aggregate";
