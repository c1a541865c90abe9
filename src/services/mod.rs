pub mod day_sync;
pub mod duration;
pub mod report;
