pub mod aggregator;
pub mod calculator;
pub mod dto;
pub mod fetcher;
pub mod selector;
