pub mod catalog;
pub mod misc;
pub mod plane;
pub mod report;
pub mod units;
