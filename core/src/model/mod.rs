pub mod catalog;
pub mod day;
pub mod standings;
pub mod summary;
