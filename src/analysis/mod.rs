pub mod baseline;
pub mod deviation;
pub mod matchweek;
pub mod summary;
pub mod table;
